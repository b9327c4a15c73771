use crate::auth::credential::{Credential, CredentialFile, now_epoch};
use crate::error::AuthError;

/// The provider-facing half of credential acquisition.
pub trait AuthorizationFlow {
    /// Exchange a refresh token for a fresh access token.
    fn refresh(&self, refresh_token: &str) -> Result<Credential, AuthError>;

    /// Run interactive consent (browser + local callback listener).
    fn authorize(&self) -> Result<Credential, AuthError>;
}

/// Decides between the cached credential, a refresh, or interactive consent.
pub struct CredentialProvider<F: AuthorizationFlow> {
    flow: F,
    file: CredentialFile,
}

impl<F: AuthorizationFlow> CredentialProvider<F> {
    pub fn new(flow: F, file: CredentialFile) -> Self {
        Self { flow, file }
    }

    pub fn file(&self) -> &CredentialFile {
        &self.file
    }

    /// Returns a usable credential; anything newly acquired is persisted before returning.
    pub fn obtain(&self) -> Result<Credential, AuthError> {
        self.obtain_at(now_epoch(), true)
    }

    /// Like `obtain`, but never opens the browser; fails with `Reauthenticate` instead.
    pub fn renew(&self) -> Result<Credential, AuthError> {
        self.obtain_at(now_epoch(), false)
    }

    fn obtain_at(&self, now: i64, interactive: bool) -> Result<Credential, AuthError> {
        let cached = self.file.load();

        if let Some(c) = &cached
            && !c.is_expired(now)
        {
            log::info!("using cached access token");
            return Ok(c.clone());
        }

        let refreshed = match cached.as_ref().and_then(|c| c.refresh_token.clone()) {
            Some(rt) => {
                log::info!("access token expired; refreshing");
                match self.flow.refresh(&rt) {
                    // Google does not always rotate the refresh token
                    Ok(mut fresh) => {
                        if fresh.refresh_token.is_none() {
                            fresh.refresh_token = Some(rt);
                        }
                        Some(fresh)
                    }
                    Err(e) => {
                        log::warn!("refresh failed: {e}; falling back to interactive auth");
                        None
                    }
                }
            }
            None => None,
        };

        let credential = match refreshed {
            Some(c) => c,
            None if !interactive => return Err(AuthError::Reauthenticate),
            None => {
                log::info!("no usable credential; running interactive consent");
                self.flow.authorize()?
            }
        };

        self.file.save(&credential)?;
        Ok(credential)
    }
}

/// Supplies the bearer token for each provider request.
pub trait TokenSource {
    fn access_token(&self) -> Result<String, AuthError>;
}

impl TokenSource for String {
    fn access_token(&self) -> Result<String, AuthError> {
        Ok(self.clone())
    }
}

impl TokenSource for &'static str {
    fn access_token(&self) -> Result<String, AuthError> {
        Ok((*self).to_string())
    }
}

/// Reads the credential file per call and refreshes it once it expires.
impl<F: AuthorizationFlow> TokenSource for CredentialProvider<F> {
    fn access_token(&self) -> Result<String, AuthError> {
        self.renew().map(|c| c.access_token)
    }
}
