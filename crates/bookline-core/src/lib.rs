// Booking Flow Abstraction
//
// This crate provides an SDK-agnostic implementation of a multi-session
// appointment booking flow: build up a cart of independent appointment
// sessions, schedule each one, and drive them through reservation against an
// external booking platform.
//
// Key design decisions:
// - Uses traits (BookingPlatform, CartIdStore, ClientDirectory) for pluggable backends
// - The session store validates every mutation; unknown ids and illegal
//   status transitions are reported errors, never silent no-ops
// - Active-session reconciliation is one pure function, re-derived after
//   every store mutation
// - Reservations run strictly sequentially and tolerate partial failure
// - Session ids come from an injected IdGenerator (deterministic in tests)

// Domain entity types
pub mod cart;
pub mod session;

pub mod error;
pub mod orchestrator;
pub mod search;
pub mod selector;
pub mod store;
pub mod traits;

// In-memory implementations for examples and testing
pub mod memory;

// Re-exports for convenience
pub use cart::{Appointment, Cart, CartFlow, Reservation};
pub use error::{BookingError, Result};
pub use orchestrator::{CancelSignal, CheckoutOutcome, FailedReservation, ReservationOrchestrator};
pub use search::{ClientSearch, ClientSummary, SearchOutcome};
pub use selector::select_default_active;
pub use session::{
    BookableItem, BookableTime, ConfirmationDetails, NewSession, Session, SessionPatch,
    SessionStatus, StaffSelection,
};
pub use store::SessionStore;
pub use traits::{BookingPlatform, CartIdStore, ClientDirectory, IdGenerator, LoadingIndicator};
