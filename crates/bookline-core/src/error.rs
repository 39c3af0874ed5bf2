// Error types for the booking flow

use crate::session::SessionStatus;
use thiserror::Error;
use uuid::Uuid;

/// Result type alias for booking-flow operations
pub type Result<T> = std::result::Result<T, BookingError>;

/// Errors that can occur while driving the booking flow
#[derive(Debug, Error)]
pub enum BookingError {
    /// No session with this id in the store
    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    /// Transition not allowed by the status state machine
    #[error("Invalid status transition for session {session_id}: {from} -> {to}")]
    InvalidTransition {
        session_id: Uuid,
        from: SessionStatus,
        to: SessionStatus,
    },

    /// Session has left the editable statuses and cannot be removed
    #[error("Session {session_id} is {status} and can no longer be removed")]
    SessionLocked {
        session_id: Uuid,
        status: SessionStatus,
    },

    /// Session needs a date and a reserved time before this operation
    #[error("Session {0} has no selected time")]
    MissingTime(Uuid),

    /// No cart to reserve against
    #[error("No cart present; nothing could be attempted")]
    MissingCart,

    /// No session is active for scheduling
    #[error("No active session")]
    MissingActiveSession,

    /// Booking platform error (reserve, add item, checkout)
    #[error("Booking platform error: {0}")]
    Platform(String),

    /// Client directory error
    #[error("Client directory error: {0}")]
    Directory(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl BookingError {
    /// Create a booking platform error
    pub fn platform(msg: impl Into<String>) -> Self {
        BookingError::Platform(msg.into())
    }

    /// Create a client directory error
    pub fn directory(msg: impl Into<String>) -> Self {
        BookingError::Directory(msg.into())
    }

    /// Create a session not found error
    pub fn not_found(session_id: Uuid) -> Self {
        BookingError::SessionNotFound(session_id)
    }

    /// Whether this error is a precondition failure, meaning the operation
    /// refused to start and no state was touched.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            BookingError::MissingCart
                | BookingError::MissingActiveSession
                | BookingError::MissingTime(_)
                | BookingError::SessionNotFound(_)
        )
    }
}
