pub mod oauth;
pub mod store;
pub mod token;

pub use oauth::{AuthLoginResult, AuthService, AuthStatus};
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use token::TokenSet;
