use anyhow::{Result, anyhow};
use keyring::{Entry, Error as KeyringError};

use crate::config::APP_DIR;

/// Save the OAuth client secret into the OS keyring, keyed by client_id
pub fn save_client_secret(client_id: &str, client_secret: &str) -> Result<()> {
    let entry = Entry::new(APP_DIR, client_id);
    entry?
        .set_password(client_secret)
        .map_err(|e| anyhow!(e.to_string()))?;
    Ok(())
}

/// Load the client secret from the keyring by client_id
pub fn load_client_secret(client_id: &str) -> Result<Option<String>> {
    let entry = Entry::new(APP_DIR, client_id);
    match entry?.get_password() {
        Ok(v) => Ok(Some(v)),
        Err(KeyringError::NoEntry) => Ok(None),
        Err(e) => Err(anyhow!(e.to_string())),
    }
}

/// Keyring first, then `OAUTH_CLIENT_SECRET`. A broken keyring is not fatal.
pub fn resolve_client_secret(client_id: &str) -> Option<String> {
    let from_keyring = match load_client_secret(client_id) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("keyring unavailable: {e}");
            None
        }
    };
    from_keyring.or_else(|| std::env::var("OAUTH_CLIENT_SECRET").ok())
}
