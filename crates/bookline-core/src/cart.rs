// Cart types and the cart lifecycle flow
//
// The cart itself lives on the booking platform; this module only carries
// the opaque handle, the typed results of platform calls, and the small
// create/resume flow built on the persisted cart id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::Result;
use crate::session::BookableItem;
use crate::traits::{BookingPlatform, CartIdStore};

/// Opaque handle to a platform cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Cart {
    pub id: String,
}

impl Cart {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Result of successfully holding a time slot: the updated cart plus the
/// platform's booking reference for that hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub cart: Cart,
    pub reference: String,
}

/// One appointment returned by checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Appointment {
    pub id: String,
    pub start_time: DateTime<Utc>,
}

/// Create/resume lifecycle for the cart, backed by the single persisted
/// cart id.
pub struct CartFlow<P: BookingPlatform> {
    platform: Arc<P>,
    cart_ids: Arc<dyn CartIdStore>,
}

impl<P: BookingPlatform> CartFlow<P> {
    pub fn new(platform: Arc<P>, cart_ids: Arc<dyn CartIdStore>) -> Self {
        Self { platform, cart_ids }
    }

    /// Create a fresh cart and persist its id for later resumption.
    pub async fn create_cart(&self) -> Result<Cart> {
        let cart = self.platform.create_cart().await?;
        self.cart_ids.set(&cart.id).await?;
        info!(cart_id = %cart.id, "Cart created");
        Ok(cart)
    }

    /// Resume the cart recorded by the persisted id.
    ///
    /// `Ok(None)` when nothing is persisted. A persisted id the platform no
    /// longer recognizes is stale; it is cleared so the next flow starts
    /// clean.
    pub async fn current_cart(&self) -> Result<Option<Cart>> {
        let Some(id) = self.cart_ids.get().await? else {
            return Ok(None);
        };
        match self.platform.get_cart(&id).await? {
            Some(cart) => Ok(Some(cart)),
            None => {
                debug!(cart_id = %id, "Persisted cart id is stale, clearing");
                self.cart_ids.clear().await?;
                Ok(None)
            }
        }
    }

    /// Add an independent bookable item to the cart for one appointment
    /// session, returning the updated cart.
    pub async fn add_session_item(&self, cart: &Cart, item: &BookableItem) -> Result<Cart> {
        let updated = self.platform.add_bookable_item(cart, item).await?;
        debug!(cart_id = %updated.id, service = %item.name, "Bookable item added");
        Ok(updated)
    }

    /// Forget the persisted cart id.
    pub async fn reset(&self) -> Result<()> {
        self.cart_ids.clear().await
    }
}
