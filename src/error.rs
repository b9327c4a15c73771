//! Error taxonomy shared by the adapters and the session controller.

use crate::domain::email::MessageId;

/// Credential acquisition or refresh failed. Fatal to the session.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid OAuth configuration: {0}")]
    Config(String),

    #[error("failed to bind OAuth callback server on {addr}: {message}")]
    Listener { addr: String, message: String },

    #[error("no authorization code received within {0} seconds")]
    ConsentTimeout(u64),

    #[error("authorization callback state did not match the request")]
    StateMismatch,

    #[error("token exchange failed: {0}")]
    Exchange(String),

    #[error("credential file error: {0}")]
    Storage(String),

    #[error("stored credential can no longer be refreshed; restart to sign in again")]
    Reauthenticate,
}

/// Mail provider call failed.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("message {0} no longer exists")]
    NotFound(MessageId),

    #[error("mail provider request failed: {0}")]
    Http(String),

    #[error("mail provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode mail provider response: {0}")]
    Decode(String),

    #[error("message is missing the {0} header")]
    MissingHeader(&'static str),

    #[error(transparent)]
    Token(#[from] AuthError),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ProviderError::Decode(e.to_string())
        } else {
            ProviderError::Http(e.to_string())
        }
    }
}

/// Summarization or text-generation call failed.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("{0} is not set")]
    MissingApiKey(&'static str),

    #[error("nothing to send to the model")]
    EmptyInput,

    #[error("model request failed: {0}")]
    Http(String),

    #[error("model returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected model response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ModelError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ModelError::Malformed(e.to_string())
        } else {
            ModelError::Http(e.to_string())
        }
    }
}

/// Anything an action handler can surface to the user.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("invalid state: {0}")]
    InvalidState(&'static str),
}

impl SessionError {
    /// True for a stale/deleted id, which the shell reports as "message unavailable".
    pub fn is_not_found(&self) -> bool {
        matches!(self, SessionError::Provider(ProviderError::NotFound(_)))
    }
}
