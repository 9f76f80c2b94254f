use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::Connection;

use super::SessionStore;
use crate::db;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::Session;

pub struct SqliteSessionStore {
    conn: Mutex<Connection>,
}

impl SqliteSessionStore {
    pub fn open(path: &str) -> Result<Self, AppError> {
        let conn = db::init_db(path).map_err(|e| AppError::StoreUnavailable(format!("{e:#}")))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, AppError> {
        self.conn
            .lock()
            .map_err(|_| AppError::StoreUnavailable("session database lock poisoned".to_string()))
    }
}

fn store_error(e: anyhow::Error) -> AppError {
    AppError::StoreUnavailable(format!("{e:#}"))
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn get(&self, phone: &str) -> Result<Session, AppError> {
        let conn = self.conn()?;
        let session = queries::get_session(&conn, phone).map_err(store_error)?;
        Ok(session.unwrap_or_else(|| Session::new(phone)))
    }

    async fn save(&self, session: &mut Session) -> Result<(), AppError> {
        session.touch();
        let conn = self.conn()?;
        queries::save_session(&conn, session).map_err(store_error)
    }

    async fn list_all(&self) -> Result<Vec<Session>, AppError> {
        let conn = self.conn()?;
        queries::list_sessions(&conn).map_err(store_error)
    }

    async fn clear_all(&self) -> Result<usize, AppError> {
        let conn = self.conn()?;
        queries::clear_sessions(&conn).map_err(store_error)
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[tokio::test]
    async fn test_save_then_get_round_trip() {
        let store = SqliteSessionStore::open(":memory:").unwrap();
        let mut s = store.get("+39333").await.unwrap();
        assert!(s.exchanges.is_empty());

        s.push("dove parcheggio?", "Parcheggio in via Roma.");
        let stale = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        s.last_seen = stale;
        store.save(&mut s).await.unwrap();

        let loaded = store.get("+39333").await.unwrap();
        assert_eq!(loaded.exchanges, s.exchanges);
        assert_eq!(loaded.phone, "+39333");
        assert!(loaded.last_seen > stale);
    }

    #[tokio::test]
    async fn test_list_and_clear() {
        let store = SqliteSessionStore::open(":memory:").unwrap();
        store.save(&mut Session::new("+391")).await.unwrap();
        store.save(&mut Session::new("+392")).await.unwrap();

        let phones: Vec<String> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.phone)
            .collect();
        assert_eq!(phones.len(), 2);
        assert!(phones.contains(&"+391".to_string()));

        assert_eq!(store.clear_all().await.unwrap(), 2);
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[test]
    fn test_open_unreachable_path_is_store_unavailable() {
        let err = SqliteSessionStore::open("/nonexistent-dir/x/y.db").err().unwrap();
        assert!(matches!(err, AppError::StoreUnavailable(_)));
    }
}
