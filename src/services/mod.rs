pub mod ai;
pub mod booking;
pub mod concierge;
pub mod knowledge;
pub mod reservation;
pub mod sessions;
