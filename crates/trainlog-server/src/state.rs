//! Shared application state for the Axum server.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::debug;
use trainlog_core::{Session, TrainlogConfig};
use uuid::Uuid;

/// Sessions untouched for this long are dropped when a new one opens.
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(12 * 60 * 60);

struct SessionSlot {
    session: Session,
    last_used: Instant,
}

#[derive(Clone)]
pub struct AppState {
    pub store_path: Arc<PathBuf>,
    /// One pending-set buffer per dashboard session
    sessions: Arc<Mutex<HashMap<Uuid, SessionSlot>>>,
    idle_timeout: Duration,
}

impl AppState {
    pub fn new(store_path: PathBuf) -> Self {
        Self::with_idle_timeout(store_path, SESSION_IDLE_TIMEOUT)
    }

    pub fn with_idle_timeout(store_path: PathBuf, idle_timeout: Duration) -> Self {
        Self {
            store_path: Arc::new(store_path),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            idle_timeout,
        }
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<Uuid, SessionSlot>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open an empty session, dropping any that have sat idle past the timeout.
    pub fn open_session(&self) -> Uuid {
        let mut slots = self.slots();
        let before = slots.len();
        slots.retain(|_, slot| slot.last_used.elapsed() < self.idle_timeout);
        let expired = before - slots.len();
        if expired > 0 {
            debug!(expired, "Dropped idle sessions");
        }

        let id = Uuid::new_v4();
        slots.insert(
            id,
            SessionSlot {
                session: Session::new(),
                last_used: Instant::now(),
            },
        );
        id
    }

    /// Run `f` on a live session and mark it used. `None` if the id is unknown.
    pub fn with_session<R>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        let mut slots = self.slots();
        let slot = slots.get_mut(&id)?;
        slot.last_used = Instant::now();
        Some(f(&mut slot.session))
    }

    pub fn close_session(&self, id: Uuid) -> bool {
        self.slots().remove(&id).is_some()
    }
}

/// Configuration for the web server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub store_path: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from(&TrainlogConfig::default())
    }
}

impl From<&TrainlogConfig> for ServerConfig {
    fn from(config: &TrainlogConfig) -> Self {
        Self {
            store_path: config.store_path.clone(),
            host: config.host.clone(),
            port: config.port,
        }
    }
}
