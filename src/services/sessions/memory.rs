use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::SessionStore;
use crate::errors::AppError;
use crate::models::Session;

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl MemorySessionStore {
    fn map(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Session>>, AppError> {
        self.sessions
            .lock()
            .map_err(|_| AppError::StoreUnavailable("in-memory session map poisoned".to_string()))
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, phone: &str) -> Result<Session, AppError> {
        Ok(self
            .map()?
            .get(phone)
            .cloned()
            .unwrap_or_else(|| Session::new(phone)))
    }

    async fn save(&self, session: &mut Session) -> Result<(), AppError> {
        session.touch();
        self.map()?.insert(session.phone.clone(), session.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Session>, AppError> {
        let mut sessions: Vec<Session> = self.map()?.values().cloned().collect();
        sessions.sort_by(|a, b| b.last_seen.cmp(&a.last_seen).then_with(|| a.phone.cmp(&b.phone)));
        Ok(sessions)
    }

    async fn clear_all(&self) -> Result<usize, AppError> {
        let mut map = self.map()?;
        let count = map.len();
        map.clear();
        Ok(count)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
