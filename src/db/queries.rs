use anyhow::Context;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::{Exchange, Session};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ── Sessions ──

pub fn get_session(conn: &Connection, phone: &str) -> anyhow::Result<Option<Session>> {
    let row = conn
        .query_row(
            "SELECT phone, exchanges, last_seen FROM sessions WHERE phone = ?1",
            params![phone],
            read_session_row,
        )
        .optional()?;

    row.map(decode_session).transpose()
}

pub fn save_session(conn: &Connection, session: &Session) -> anyhow::Result<()> {
    let exchanges_json = serde_json::to_string(&session.exchanges)?;
    let last_seen = session.last_seen.format(TIMESTAMP_FORMAT).to_string();

    conn.execute(
        "INSERT INTO sessions (phone, exchanges, last_seen)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(phone) DO UPDATE SET
           exchanges = excluded.exchanges,
           last_seen = excluded.last_seen",
        params![session.phone, exchanges_json, last_seen],
    )?;
    Ok(())
}

pub fn list_sessions(conn: &Connection) -> anyhow::Result<Vec<Session>> {
    let mut stmt = conn.prepare(
        "SELECT phone, exchanges, last_seen FROM sessions ORDER BY last_seen DESC, phone ASC",
    )?;
    let rows = stmt.query_map([], read_session_row)?;

    let mut sessions = vec![];
    for row in rows {
        sessions.push(decode_session(row?)?);
    }
    Ok(sessions)
}

pub fn clear_sessions(conn: &Connection) -> anyhow::Result<usize> {
    let count = conn.execute("DELETE FROM sessions", [])?;
    Ok(count)
}

type SessionRow = (String, String, String);

fn read_session_row(row: &Row<'_>) -> rusqlite::Result<SessionRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}

fn decode_session((phone, exchanges_json, last_seen_str): SessionRow) -> anyhow::Result<Session> {
    let exchanges: Vec<Exchange> = serde_json::from_str(&exchanges_json)
        .with_context(|| format!("invalid exchanges for session {phone}"))?;
    let last_seen = NaiveDateTime::parse_from_str(&last_seen_str, TIMESTAMP_FORMAT)
        .with_context(|| format!("invalid last_seen {last_seen_str:?} for session {phone}"))?;

    Ok(Session {
        phone,
        exchanges,
        last_seen,
    })
}
