use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::AuthError;

/// Seconds subtracted from the expiry so a token is never used in its last minute.
const EXPIRY_SKEW_SECS: i64 = 60;

/// Token material persisted between runs in the credential file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at_epoch: Option<i64>, // epoch seconds
}

impl Credential {
    pub fn new(access_token: String, refresh_token: Option<String>, expires_in: Option<u64>) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at_epoch: expires_in.map(|s| now_epoch() + s as i64),
        }
    }

    /// A credential without a known expiry is treated as valid until the provider rejects it.
    pub fn is_expired(&self, now: i64) -> bool {
        match self.expires_at_epoch {
            Some(exp) => now >= exp - EXPIRY_SKEW_SECS,
            None => false,
        }
    }
}

pub fn now_epoch() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// The local credential file. Read at most once per start, rewritten on every acquisition.
#[derive(Debug, Clone)]
pub struct CredentialFile {
    path: PathBuf,
}

impl CredentialFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `None` when the file is absent or unreadable as a credential.
    pub fn load(&self) -> Option<Credential> {
        let s = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&s) {
            Ok(c) => Some(c),
            Err(e) => {
                log::warn!(
                    "ignoring unreadable credential file {}: {e}",
                    self.path.display()
                );
                None
            }
        }
    }

    pub fn save(&self, credential: &Credential) -> Result<(), AuthError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| AuthError::Storage(e.to_string()))?;
        }
        let s = serde_json::to_string_pretty(credential)
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        write_private(&self.path, &s).map_err(|e| AuthError::Storage(e.to_string()))?;
        // a file from an older run may predate the 0600 creation mode
        restrict_permissions(&self.path);
        log::debug!("saved credential to {}", self.path.display());
        Ok(())
    }

    /// Deletes the file; returns false when there was nothing to delete.
    pub fn remove(&self) -> Result<bool, AuthError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AuthError::Storage(e.to_string())),
        }
    }
}

fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut opts = OpenOptions::new();
    opts.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    opts.open(path)?.write_all(contents.as_bytes())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        log::warn!("could not restrict permissions on {}: {e}", path.display());
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}
