//! Booking session: busy-data fetch cycle, caching, derived availability

pub mod cache;
pub mod error;
pub mod month;
pub mod session;

pub use cache::{BusyData, DigestKey, FetchKey};
pub use error::{SessionError, SessionResult};
pub use month::VisibleMonth;
pub use session::{BookingSelection, BookingSession, FetchOutcome, FetchRequest};
