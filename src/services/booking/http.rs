use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::BookingGateway;
use crate::errors::AppError;
use crate::models::{Client, Reservation};
use crate::services::reservation::confirmed_for_client;

pub struct HttpBookingGateway {
    base_url: String,
    username: String,
    password: String,
    confirmed_status: String,
    window: (String, String),
    client: reqwest::Client,
}

impl HttpBookingGateway {
    pub fn new(base_url: String, username: String, password: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            username,
            password,
            confirmed_status: "confirmed".to_string(),
            window: ("2023-01-01".to_string(), "2026-01-01".to_string()),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_confirmed_status(mut self, status: String) -> Self {
        self.confirmed_status = status;
        self
    }

    pub fn with_window(mut self, from: String, to: String) -> Self {
        self.window = (from, to);
        self
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)], token: &str) -> Result<Value, AppError> {
        let resp = self
            .client
            .get(format!("{}{path}", self.base_url))
            .query(query)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::Gateway(format!("GET {path} failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::Gateway(format!("GET {path} returned {status}: {body}")));
        }

        resp.json()
            .await
            .map_err(|e| AppError::Gateway(format!("GET {path} returned invalid JSON: {e}")))
    }
}

#[async_trait]
impl BookingGateway for HttpBookingGateway {
    async fn authenticate(&self) -> Result<String, AppError> {
        let resp = self
            .client
            .post(format!("{}/login", self.base_url))
            .json(&json!({
                "username": self.username,
                "password": self.password,
            }))
            .send()
            .await
            .map_err(|e| AppError::Auth(format!("login request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::Auth(format!("login rejected ({status})")));
        }

        let data: Value = resp
            .json()
            .await
            .map_err(|e| AppError::Auth(format!("invalid login response: {e}")))?;

        data.get("token")
            .or_else(|| data.get("access_token"))
            .and_then(Value::as_str)
            .map(|s| s.to_string())
            .ok_or_else(|| AppError::Auth("missing token in login response".to_string()))
    }

    async fn find_client_by_phone(
        &self,
        phone: &str,
        token: &str,
    ) -> Result<Option<Client>, AppError> {
        let data = self
            .get_json("/clients/paginated", &[("search", phone)], token)
            .await?;

        let clients: Vec<Client> = parse_items(data, "client");
        tracing::debug!(phone = %phone, matches = clients.len(), "client search");
        Ok(clients.into_iter().next())
    }

    async fn list_confirmed_reservations(
        &self,
        client_id: &str,
        token: &str,
    ) -> Result<Vec<Reservation>, AppError> {
        let (from, to) = &self.window;
        let data = self
            .get_json("/reservations", &[("from", from.as_str()), ("to", to.as_str())], token)
            .await?;

        let reservations: Vec<Reservation> = parse_items(data, "reservation");
        let total = reservations.len();
        let confirmed = confirmed_for_client(reservations, client_id, &self.confirmed_status);
        tracing::debug!(client_id, total, confirmed = confirmed.len(), "reservations fetched");
        Ok(confirmed)
    }
}

/// Listing endpoints answer with either a bare array or `{ "data": [...] }`.
/// Entries that do not deserialize are skipped.
fn parse_items<T: DeserializeOwned>(data: Value, kind: &str) -> Vec<T> {
    let items = match data {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("data") {
            Some(Value::Array(items)) => items,
            _ => vec![],
        },
        _ => vec![],
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!(error = %e, kind, "skipping malformed gateway entry");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn gateway(server: &MockServer) -> HttpBookingGateway {
        HttpBookingGateway::new(server.uri(), "concierge".into(), "s3cret".into())
    }

    #[tokio::test]
    async fn test_authenticate_returns_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .and(body_json(json!({"username": "concierge", "password": "s3cret"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "tok-1"})))
            .mount(&server)
            .await;

        assert_eq!(gateway(&server).authenticate().await.unwrap(), "tok-1");
    }

    #[tokio::test]
    async fn test_authenticate_accepts_access_token_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok-2"})))
            .mount(&server)
            .await;

        assert_eq!(gateway(&server).authenticate().await.unwrap(), "tok-2");
    }

    #[tokio::test]
    async fn test_rejected_credentials_are_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = gateway(&server).authenticate().await.unwrap_err();
        assert!(matches!(err, AppError::Auth(_)), "got: {err}");
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_auth_error() {
        let gw = HttpBookingGateway::new("http://127.0.0.1:1".into(), "u".into(), "p".into());
        assert!(matches!(gw.authenticate().await, Err(AppError::Auth(_))));
    }

    #[tokio::test]
    async fn test_find_client_takes_first_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/clients/paginated"))
            .and(query_param("search", "391234567"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"id": 17, "name": "Mario Rossi"}, {"id": 18}]
            })))
            .mount(&server)
            .await;

        let client = gateway(&server)
            .find_client_by_phone("391234567", "tok")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(client.id, "17");
        assert_eq!(client.name.as_deref(), Some("Mario Rossi"));
    }

    #[tokio::test]
    async fn test_find_client_none_when_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/clients/paginated"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let found = gateway(&server).find_client_by_phone("000", "tok").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_reservations_filtered_client_side() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reservations"))
            .and(query_param("from", "2023-01-01"))
            .and(query_param("to", "2026-01-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "client_id": 17, "property_name": "Privilege Pisa Tuscany", "start_date": "2025-05-01", "status": "confirmed"},
                {"id": 2, "client_id": 17, "property_name": "Casa Lucca Mura", "start_date": "2025-06-01", "status": "cancelled"},
                {"id": 3, "client_id": 99, "property_name": "Casa Lucca Mura", "start_date": "2025-06-01", "status": "confirmed"},
                {"id": 4, "client_id": 17, "start_date": "2025-07-01", "status": "confirmed"}
            ])))
            .mount(&server)
            .await;

        let reservations = gateway(&server)
            .list_confirmed_reservations("17", "tok")
            .await
            .unwrap();
        assert_eq!(reservations.len(), 1);
        assert_eq!(reservations[0].property_name, "Privilege Pisa Tuscany");
    }

    #[tokio::test]
    async fn test_reservation_http_error_is_gateway_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reservations"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = gateway(&server)
            .list_confirmed_reservations("17", "tok")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Gateway(_)), "got: {err}");
    }
}
