//! The signed-in identity.
//!
//! [`SessionContext`] is created once at startup from the persisted session
//! file and handed to every component that needs identity. It changes only
//! through login, register and logout.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info, warn};

use educollab_store::User;

use crate::error::{ClientError, Result};

#[derive(Clone, Default)]
pub struct SessionContext {
    current: Arc<RwLock<Option<User>>>,
    path: Option<PathBuf>,
}

impl SessionContext {
    /// Restore the session persisted at `path`, if any.
    ///
    /// An unreadable or corrupt file starts a signed-out session.
    pub fn init(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let user = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<User>(&bytes) {
                Ok(user) => {
                    info!(user = %user.id, "restored session");
                    Some(user)
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring corrupt session file");
                    None
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read session file");
                None
            }
        };

        Self {
            current: Arc::new(RwLock::new(user)),
            path: Some(path),
        }
    }

    /// A session that is never written to disk.
    pub fn ephemeral() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn current_user(&self) -> Option<User> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// The signed-in user, or `Unauthorized`.
    pub fn require_user(&self) -> Result<User> {
        self.current_user()
            .ok_or_else(|| ClientError::Unauthorized("not signed in".into()))
    }

    pub fn set(&self, user: User) -> Result<()> {
        if let Some(path) = &self.path {
            let bytes = serde_json::to_vec_pretty(&user)?;
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ClientError::SessionStorage(e.to_string()))?;
            }
            std::fs::write(path, bytes).map_err(|e| ClientError::SessionStorage(e.to_string()))?;
        }
        debug!(user = %user.id, "session set");
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(user);
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        if let Some(path) = &self.path {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(ClientError::SessionStorage(e.to_string())),
            }
        }
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
        debug!("session cleared");
        Ok(())
    }
}
