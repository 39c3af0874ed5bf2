// Core traits for external collaborators
//
// These traits keep the flow logic decoupled from concrete backends:
// - The real booking platform SDK in production
// - Scripted mocks for unit and integration tests (see memory.rs)

use async_trait::async_trait;
use uuid::Uuid;

use crate::cart::{Appointment, Cart, Reservation};
use crate::error::Result;
use crate::search::ClientSummary;
use crate::session::{BookableItem, BookableTime};

// ============================================================================
// BookingPlatform - the external cart/reservation SDK
// ============================================================================

/// External booking platform operations consumed by the flow.
///
/// Every method mutates or reads shared cart state on the platform side, so
/// callers must never issue concurrent calls against the same cart.
#[async_trait]
pub trait BookingPlatform: Send + Sync {
    /// Create a fresh cart
    async fn create_cart(&self) -> Result<Cart>;

    /// Look up an existing cart by id; `None` when the platform no longer
    /// knows the id (expired or foreign)
    async fn get_cart(&self, cart_id: &str) -> Result<Option<Cart>>;

    /// Add a service to a cart, returning the updated cart
    async fn add_bookable_item(&self, cart: &Cart, item: &BookableItem) -> Result<Cart>;

    /// Hold a specific time slot against a cart.
    ///
    /// Returns the updated cart together with the platform's booking
    /// reference; any error means nothing was reserved.
    async fn reserve_time(&self, cart: &Cart, time: &BookableTime) -> Result<Reservation>;

    /// Finalize a cart with no outstanding payment requirement
    async fn checkout(&self, cart: &Cart) -> Result<Vec<Appointment>>;
}

// ============================================================================
// LoadingIndicator - UI affordance toggled around async work
// ============================================================================

/// Loading indicator toggled before and after orchestrator work.
///
/// Implementations must tolerate redundant toggles; the orchestrator
/// guarantees the indicator is cleared on every exit path.
pub trait LoadingIndicator: Send + Sync {
    fn set_loading(&self, visible: bool);
}

// ============================================================================
// CartIdStore - the one persisted value
// ============================================================================

/// Read/write access to the single persisted cart id, used to resume a cart
/// across page reloads.
#[async_trait]
pub trait CartIdStore: Send + Sync {
    async fn get(&self) -> Result<Option<String>>;
    async fn set(&self, cart_id: &str) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}

// ============================================================================
// ClientDirectory - text search over the business's client list
// ============================================================================

/// Client directory search backend.
///
/// The debounce and supersession policy lives in [`crate::search::ClientSearch`];
/// implementations just answer one query.
#[async_trait]
pub trait ClientDirectory: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<ClientSummary>>;
}

// ============================================================================
// IdGenerator - injected id source
// ============================================================================

/// Session id source.
///
/// Injected so tests can use deterministic ids while production uses
/// time-ordered UUIDs (see memory.rs for both).
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> Uuid;
}
