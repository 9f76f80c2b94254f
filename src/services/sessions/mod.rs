pub mod memory;
pub mod sqlite;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::OwnedMutexGuard;

use crate::errors::AppError;
use crate::models::Session;

pub use memory::MemorySessionStore;
pub use sqlite::SqliteSessionStore;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the stored session for `phone`, or a fresh empty one.
    async fn get(&self, phone: &str) -> Result<Session, AppError>;

    /// Stamps `session.last_seen` with the current time and overwrites any prior value.
    async fn save(&self, session: &mut Session) -> Result<(), AppError>;

    async fn list_all(&self) -> Result<Vec<Session>, AppError>;

    /// Deletes every session, returning how many were removed.
    async fn clear_all(&self) -> Result<usize, AppError>;

    fn backend(&self) -> &'static str;
}

/// Picks the session backend once at startup. An empty `database_url` or an
/// unreachable database selects the in-process store for the process lifetime.
pub fn connect(database_url: &str) -> Arc<dyn SessionStore> {
    if database_url.is_empty() {
        tracing::info!("no session database configured, using in-memory session store");
        return Arc::new(MemorySessionStore::default());
    }

    match SqliteSessionStore::open(database_url) {
        Ok(store) => {
            tracing::info!(url = database_url, "session store connected");
            Arc::new(store)
        }
        Err(e) => {
            tracing::warn!(error = %e, "falling back to in-memory session store");
            Arc::new(MemorySessionStore::default())
        }
    }
}

/// Per-phone async locks; holding one serializes the get/append/save cycle
/// for that phone number.
#[derive(Default)]
pub struct PhoneLocks {
    inner: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl PhoneLocks {
    pub async fn lock(&self, phone: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            // only the map holds idle entries
            map.retain(|_, l| Arc::strong_count(l) > 1);
            Arc::clone(map.entry(phone.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
