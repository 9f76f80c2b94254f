use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Client {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reservation {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(alias = "id_client", deserialize_with = "string_or_number")]
    pub client_id: String,
    #[serde(alias = "room_name", alias = "apartment")]
    pub property_name: String,
    #[serde(alias = "arrival", alias = "date_from", deserialize_with = "date_prefix")]
    pub start_date: NaiveDate,
    #[serde(alias = "status_code", deserialize_with = "string_or_number")]
    pub status: String,
}

impl Reservation {
    pub fn is_confirmed(&self, confirmed_status: &str) -> bool {
        self.status == confirmed_status
    }
}

/// Gateway identifiers and status codes arrive either as JSON strings or numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// Accepts `2025-06-01` as well as `2025-06-01T15:00:00` / `2025-06-01 15:00:00`.
fn date_prefix<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let date = raw.trim().get(..10).unwrap_or(raw.trim());
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(serde::de::Error::custom)
}
