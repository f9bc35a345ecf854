//! Error types for the booking session.

use thiserror::Error;

use meetslot_core::policy::PolicyError;
use meetslot_core::roster::RosterError;

/// Errors from booking-session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The scheduling policy failed validation.
    #[error("invalid scheduling policy: {0}")]
    Policy(#[from] PolicyError),

    /// A roster mutation referenced an unknown attendee.
    #[error(transparent)]
    Roster(#[from] RosterError),
}

/// A specialized Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
