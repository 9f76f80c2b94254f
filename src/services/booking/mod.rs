pub mod http;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::{Client, Reservation};

#[async_trait]
pub trait BookingGateway: Send + Sync {
    /// Logs in with the configured credentials and returns a bearer token.
    async fn authenticate(&self) -> Result<String, AppError>;

    async fn find_client_by_phone(
        &self,
        phone: &str,
        token: &str,
    ) -> Result<Option<Client>, AppError>;

    /// Confirmed reservations owned by `client_id` inside the configured date window.
    async fn list_confirmed_reservations(
        &self,
        client_id: &str,
        token: &str,
    ) -> Result<Vec<Reservation>, AppError>;
}
