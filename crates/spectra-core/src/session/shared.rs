//! Thread-safe handle for hosts that run engine work off the UI thread.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::Session;
use crate::config::EngineConfig;

/// Cloneable handle to one [`Session`].
///
/// Mutating operations take the write lock for their whole duration, so a
/// reader never observes a spectrum that disagrees with its displays.
#[derive(Debug, Clone, Default)]
pub struct SharedSession {
    inner: Arc<RwLock<Session>>,
}

impl SharedSession {
    pub fn new(config: EngineConfig) -> Self {
        Self::from(Session::new(config))
    }

    /// Shared access for rendering.
    pub fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.inner.read()
    }

    /// Exclusive access for one operation.
    pub fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.inner.write()
    }

    /// Run `f` under the write lock and return its result.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        f(&mut self.inner.write())
    }
}

impl From<Session> for SharedSession {
    fn from(session: Session) -> Self {
        Self {
            inner: Arc::new(RwLock::new(session)),
        }
    }
}
