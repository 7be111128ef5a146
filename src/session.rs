use crate::domain::models::Role;
use crate::error::Result;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub role: Role,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// Holds the current login. Reads are synchronous so the route guard can consult it
/// before every protected render.
pub trait SessionStore: Send + Sync {
    fn set_session(&self, session: Session) -> Result<()>;
    fn get_session(&self) -> Option<Session>;
    fn clear_session(&self) -> Result<()>;
}

pub type SessionHandle = Arc<dyn SessionStore>;

#[derive(Default)]
pub struct MemorySessionStore {
    current: RwLock<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle() -> SessionHandle {
        Arc::new(Self::new())
    }
}

impl SessionStore for MemorySessionStore {
    fn set_session(&self, session: Session) -> Result<()> {
        *self.current.write() = Some(session);
        Ok(())
    }

    fn get_session(&self) -> Option<Session> {
        self.current.read().clone()
    }

    fn clear_session(&self) -> Result<()> {
        *self.current.write() = None;
        Ok(())
    }
}

/// Session persisted as JSON so it survives between processes.
pub struct FileSessionStore {
    path: PathBuf,
    cached: RwLock<Option<Session>>,
}

impl FileSessionStore {
    /// Loads the file if present. A corrupt file is treated as logged out.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let cached = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Session>(&raw) {
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::warn!("Ignoring unreadable session file {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            cached: RwLock::new(cached),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn set_session(&self, session: Session) -> Result<()> {
        let raw = serde_json::to_string_pretty(&session)?;
        std::fs::write(&self.path, raw)?;
        *self.cached.write() = Some(session);
        Ok(())
    }

    fn get_session(&self) -> Option<Session> {
        self.cached.read().clone()
    }

    fn clear_session(&self) -> Result<()> {
        *self.cached.write() = None;
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
