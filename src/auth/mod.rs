pub mod credential;
pub mod oauth;
pub mod provider;
pub mod token_store;

pub use credential::{Credential, CredentialFile};
pub use oauth::GoogleOAuth;
pub use provider::{AuthorizationFlow, CredentialProvider, TokenSource};
