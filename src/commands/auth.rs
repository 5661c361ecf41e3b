use crate::auth::AuthService;
use crate::cli::AuthCommand;
use crate::context::AppContext;
use crate::error::{AppError, AppResult};

pub async fn run(ctx: &AppContext, command: AuthCommand) -> AppResult<()> {
    match command {
        AuthCommand::Login => {
            ensure_login_settings(ctx)?;
            let result =
                AuthService::login(&ctx.profile, &ctx.settings, &ctx.credentials).await?;

            let text = if let Some(email) = result.email.as_ref() {
                format!("{}: logged in as {}", result.profile, email)
            } else {
                format!("{}: {}", result.profile, result.note)
            };
            ctx.output.emit(&text, &result)
        }
        AuthCommand::Status => {
            let status = AuthService::status(&ctx.profile, &ctx.credentials).await?;
            let text = if status.logged_in {
                let refresh_hint = status
                    .has_refresh_token
                    .map(|has| {
                        if has {
                            " (refresh available)"
                        } else {
                            " (no refresh token)"
                        }
                    })
                    .unwrap_or_default();
                format!(
                    "{}: logged in{}{}",
                    status.profile,
                    status
                        .email
                        .as_ref()
                        .map(|email| format!(" as {email}"))
                        .unwrap_or_default(),
                    refresh_hint,
                )
            } else {
                format!("{}: logged out", status.profile)
            };

            ctx.output.emit(&text, &status)
        }
        AuthCommand::Logout => {
            let status = AuthService::logout(&ctx.profile, &ctx.credentials).await?;
            let text = format!("{}: logged out", status.profile);
            ctx.output.emit(&text, &status)
        }
    }
}

fn ensure_login_settings(ctx: &AppContext) -> AppResult<()> {
    let missing_client_id = ctx
        .settings
        .client_id
        .as_deref()
        .map(str::trim)
        .is_none_or(str::is_empty);

    if missing_client_id {
        let settings_path = ctx.paths.settings_file(&ctx.profile);
        return Err(AppError::Config(format!(
            "missing oauth client_id in {}. add client_id (and client_secret if your oauth client uses one), then rerun `triage auth login`",
            settings_path.display()
        )));
    }

    Ok(())
}
