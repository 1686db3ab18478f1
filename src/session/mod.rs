//! Session persistence and role resolution.
//!
//! The session file holds the bearer token and the cached authenticated
//! user. `SessionStore` is the single authoritative mutation point:
//! login saves, logout clears, and any 401-equivalent API response clears
//! (see `api`). Writes go through a temp file + rename so a reader never
//! observes a half-written session.
//!
//! **Security**: the session file holds a credential, so it is created
//! with 0600 permissions (owner read/write only) on Unix.

use crate::config;
use crate::models::Session;
use crate::Result;
use std::path::{Path, PathBuf};

const SESSION_FILE: &str = "session.json";

/// Session file mode: owner read/write only (holds the auth token).
#[cfg(unix)]
pub const SESSION_FILE_MODE: u32 = 0o600;

/// Persisted session state for the current user.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store backed by the default data directory (`TB_DATA_DIR` aware).
    pub fn new() -> Result<Self> {
        Ok(Self::with_dir(&config::data_dir()?))
    }

    /// Store backed by an explicit directory (dependency injection for tests).
    pub fn with_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(SESSION_FILE),
        }
    }

    /// Read the persisted session.
    ///
    /// An absent or malformed file means unauthenticated - never an error.
    pub fn load(&self) -> Option<Session> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&contents).ok()
    }

    /// Persist a session atomically (temp file + rename, 0600 on Unix).
    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(session)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(SESSION_FILE_MODE))?;
        }
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Remove the persisted session. Idempotent.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// True iff the stored session's user has the admin flag set.
    pub fn is_admin(&self) -> bool {
        is_admin(self.load().as_ref())
    }
}

/// True iff the cached user's admin flag is exactly `true`.
///
/// Absence of a session (or of a user on it) is `false` - admin capability
/// is never inferred from missing data.
pub fn is_admin(session: Option<&Session>) -> bool {
    session.map(|s| s.user.is_admin).unwrap_or(false)
}
