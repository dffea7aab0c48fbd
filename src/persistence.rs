//! Remembered-session persistence
//!
//! A single "logged in" marker that survives restarts. The engine loads it
//! at construction, saves it on a successful login and clears it on
//! logout, eject and reboot.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};

/// Exact marker content recognised as "logged in"
pub const LOGGED_IN_MARKER: &str = "logged-in";

/// Storage capability for the remembered-session flag
pub trait SessionStore: Send + Sync {
    /// Whether a remembered session exists. Unreadable or malformed state is `false`.
    fn load(&self) -> bool;

    /// Record a remembered session
    fn save(&self) -> Result<()>;

    /// Forget any remembered session
    fn clear(&self) -> Result<()>;
}

/// Marker-file backed store
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Store the marker at `path`
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store the marker under the platform data directory
    pub fn at_default_location() -> Self {
        Self::new(Self::default_path())
    }

    /// `<data_dir>/omegaterm/session`, or `./.omegaterm_session` without a data dir
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .map(|dir| dir.join("omegaterm").join("session"))
            .unwrap_or_else(|| PathBuf::from(".omegaterm_session"))
    }

    /// Marker file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn failure(&self, err: std::io::Error) -> Error {
        Error::PersistenceFailed {
            path: self.path.clone(),
            reason: err.to_string(),
        }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> bool {
        match fs::read_to_string(&self.path) {
            Ok(content) => content.trim_end() == LOGGED_IN_MARKER,
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    debug!("Ignoring unreadable session marker {}: {}", self.path.display(), e);
                }
                false
            }
        }
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.failure(e))?;
        }
        fs::write(&self.path, LOGGED_IN_MARKER).map_err(|e| self.failure(e))?;

        // Owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))
                .map_err(|e| self.failure(e))?;
        }

        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.failure(e)),
        }
    }
}

/// In-memory store. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    flag: Arc<AtomicBool>,
}

impl MemorySessionStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that already holds a remembered session
    pub fn remembered() -> Self {
        let store = Self::default();
        store.flag.store(true, Ordering::SeqCst);
        store
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    fn save(&self) -> Result<()> {
        self.flag.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.flag.store(false, Ordering::SeqCst);
        Ok(())
    }
}
