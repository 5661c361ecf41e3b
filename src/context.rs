use crate::api::client::MailClient;
use crate::auth::FileCredentialStore;
use crate::config::{self, AppPaths, Settings};
use crate::error::AppResult;
use crate::output::Output;

#[derive(Debug)]
pub struct AppContext {
    pub profile: String,
    pub verbose: u8,
    pub paths: AppPaths,
    pub settings: Settings,
    pub credentials: FileCredentialStore,
    pub mail: MailClient<FileCredentialStore>,
    pub output: Output,
}

impl AppContext {
    pub fn bootstrap(profile: String, json: bool, verbose: u8) -> AppResult<Self> {
        let profile = config::resolve_profile(&profile);
        let paths = AppPaths::discover()?;
        let settings = config::load_settings(&paths, &profile)?;
        let credentials = FileCredentialStore::new(paths.clone());
        let mail = MailClient::new(settings.clone(), credentials.clone(), &profile);
        let output = Output::new(json);

        Ok(Self {
            profile,
            verbose,
            paths,
            settings,
            credentials,
            mail,
            output,
        })
    }
}
