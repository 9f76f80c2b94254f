pub mod property;
pub mod reservation;
pub mod session;

pub use property::{FaqEntry, PropertyRecord};
pub use reservation::{Client, Reservation};
pub use session::{Exchange, Session};
