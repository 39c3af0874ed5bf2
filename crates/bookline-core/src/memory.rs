// In-memory implementations for examples and testing
//
// These implementations keep all data in memory, making them perfect for:
// - Unit tests and the crate's integration tests
// - Downstream crates that need a scriptable booking platform
// - Quick prototyping without real platform credentials

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::cart::{Appointment, Cart, Reservation};
use crate::error::{BookingError, Result};
use crate::search::ClientSummary;
use crate::session::{BookableItem, BookableTime};
use crate::traits::{BookingPlatform, CartIdStore, ClientDirectory, IdGenerator, LoadingIndicator};

// ============================================================================
// Id generators
// ============================================================================

/// Production id source: time-ordered UUID v7.
#[derive(Debug, Default, Clone)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn generate(&self) -> Uuid {
        Uuid::now_v7()
    }
}

/// Deterministic id source for tests: 1, 2, 3, ... as UUIDs.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn generate(&self) -> Uuid {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        Uuid::from_u128(n as u128)
    }
}

// ============================================================================
// InMemoryCartIdStore - the persisted cart id, un-persisted
// ============================================================================

/// In-memory cart id store
#[derive(Debug, Default, Clone)]
pub struct InMemoryCartIdStore {
    id: Arc<RwLock<Option<String>>>,
}

impl InMemoryCartIdStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a cart id (useful for testing resumption)
    pub async fn seed(&self, cart_id: impl Into<String>) {
        *self.id.write().await = Some(cart_id.into());
    }
}

#[async_trait]
impl CartIdStore for InMemoryCartIdStore {
    async fn get(&self) -> Result<Option<String>> {
        Ok(self.id.read().await.clone())
    }

    async fn set(&self, cart_id: &str) -> Result<()> {
        *self.id.write().await = Some(cart_id.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.id.write().await = None;
        Ok(())
    }
}

// ============================================================================
// MockBookingPlatform - scripted platform responses
// ============================================================================

/// Scriptable booking platform for tests.
///
/// Reservations succeed with distinct references unless a slot has been
/// marked to fail; every call is logged.
#[derive(Debug, Default)]
pub struct MockBookingPlatform {
    known_carts: Arc<RwLock<HashSet<String>>>,
    failing_slots: Arc<RwLock<HashMap<String, String>>>,
    checkout_error: Arc<RwLock<Option<String>>>,
    reserved: Arc<RwLock<Vec<BookableTime>>>,
    reserve_log: Arc<RwLock<Vec<(String, String)>>>,
    counter: AtomicU64,
}

impl MockBookingPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make reservations of this slot id fail with the given error text
    pub async fn fail_slot(&self, slot_id: impl Into<String>, error: impl Into<String>) {
        self.failing_slots
            .write()
            .await
            .insert(slot_id.into(), error.into());
    }

    /// Make checkout fail with the given error text
    pub async fn fail_checkout(&self, error: impl Into<String>) {
        *self.checkout_error.write().await = Some(error.into());
    }

    /// Register a cart id the platform should recognize
    pub async fn seed_cart(&self, cart_id: impl Into<String>) {
        self.known_carts.write().await.insert(cart_id.into());
    }

    /// (cart id, slot id) pairs, in call order
    pub async fn reserve_calls(&self) -> Vec<(String, String)> {
        self.reserve_log.read().await.clone()
    }

    fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait]
impl BookingPlatform for MockBookingPlatform {
    async fn create_cart(&self) -> Result<Cart> {
        let cart = Cart::new(format!("cart-{}", self.next()));
        self.known_carts.write().await.insert(cart.id.clone());
        Ok(cart)
    }

    async fn get_cart(&self, cart_id: &str) -> Result<Option<Cart>> {
        Ok(self
            .known_carts
            .read()
            .await
            .contains(cart_id)
            .then(|| Cart::new(cart_id)))
    }

    async fn add_bookable_item(&self, cart: &Cart, _item: &BookableItem) -> Result<Cart> {
        Ok(cart.clone())
    }

    async fn reserve_time(&self, cart: &Cart, time: &BookableTime) -> Result<Reservation> {
        self.reserve_log
            .write()
            .await
            .push((cart.id.clone(), time.id.clone()));

        if let Some(error) = self.failing_slots.read().await.get(&time.id) {
            return Err(BookingError::platform(error.clone()));
        }

        self.reserved.write().await.push(time.clone());
        Ok(Reservation {
            cart: cart.clone(),
            reference: format!("resv-{}", self.next()),
        })
    }

    async fn checkout(&self, _cart: &Cart) -> Result<Vec<Appointment>> {
        if let Some(error) = self.checkout_error.read().await.clone() {
            return Err(BookingError::platform(error));
        }
        Ok(self
            .reserved
            .read()
            .await
            .iter()
            .enumerate()
            .map(|(n, time)| Appointment {
                id: format!("appt-{}", n + 1),
                start_time: time.start_time,
            })
            .collect())
    }
}

// ============================================================================
// Loading indicators
// ============================================================================

/// Loading indicator that does nothing
#[derive(Debug, Default, Clone)]
pub struct NoopLoadingIndicator;

impl LoadingIndicator for NoopLoadingIndicator {
    fn set_loading(&self, _visible: bool) {}
}

/// Loading indicator that records every toggle, for asserting the
/// set-then-clear guarantee.
#[derive(Debug, Default)]
pub struct RecordingLoadingIndicator {
    toggles: std::sync::Mutex<Vec<bool>>,
}

impl RecordingLoadingIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggles(&self) -> Vec<bool> {
        self.toggles.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// True when every `set_loading(true)` was matched by a clear and the
    /// indicator is currently off.
    pub fn is_cleared(&self) -> bool {
        self.toggles().last().copied() != Some(true)
    }
}

impl LoadingIndicator for RecordingLoadingIndicator {
    fn set_loading(&self, visible: bool) {
        self.toggles
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(visible);
    }
}

// ============================================================================
// Client directories
// ============================================================================

/// Directory returning the same canned rows for every query
#[derive(Debug)]
pub struct StaticClientDirectory {
    results: Vec<ClientSummary>,
    delay: Option<Duration>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl StaticClientDirectory {
    pub fn new(results: Vec<ClientSummary>) -> Self {
        Self {
            results,
            delay: None,
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Delay each answer, to exercise in-flight supersession
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queries received, in call order
    pub async fn calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl ClientDirectory for StaticClientDirectory {
    async fn search(&self, query: &str) -> Result<Vec<ClientSummary>> {
        self.calls.write().await.push(query.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.results.clone())
    }
}

/// Directory that always fails
#[derive(Debug)]
pub struct FailingClientDirectory {
    error: String,
}

impl FailingClientDirectory {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[async_trait]
impl ClientDirectory for FailingClientDirectory {
    async fn search(&self, _query: &str) -> Result<Vec<ClientSummary>> {
        Err(BookingError::directory(self.error.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cart_id_store_round_trip() {
        let store = InMemoryCartIdStore::new();
        assert_eq!(store.get().await.unwrap(), None);
        store.set("cart-7").await.unwrap();
        assert_eq!(store.get().await.unwrap(), Some("cart-7".to_string()));
        store.clear().await.unwrap();
        assert_eq!(store.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn mock_platform_scripts_slot_failures() {
        let platform = MockBookingPlatform::new();
        platform.fail_slot("slot-bad", "card declined").await;

        let cart = platform.create_cart().await.unwrap();
        let good = BookableTime::new("slot-ok", chrono::Utc::now());
        let bad = BookableTime::new("slot-bad", chrono::Utc::now());

        let reservation = platform.reserve_time(&cart, &good).await.unwrap();
        assert!(!reservation.reference.is_empty());

        let err = platform.reserve_time(&cart, &bad).await.unwrap_err();
        assert!(err.to_string().contains("card declined"));

        assert_eq!(platform.reserve_calls().await.len(), 2);
    }

    #[tokio::test]
    async fn checkout_reports_one_appointment_per_reservation() {
        let platform = MockBookingPlatform::new();
        let cart = platform.create_cart().await.unwrap();
        for slot in ["s1", "s2"] {
            platform
                .reserve_time(&cart, &BookableTime::new(slot, chrono::Utc::now()))
                .await
                .unwrap();
        }
        let appointments = platform.checkout(&cart).await.unwrap();
        assert_eq!(appointments.len(), 2);
    }

    #[test]
    fn sequential_ids_are_deterministic() {
        let ids = SequentialIdGenerator::new();
        assert_eq!(ids.generate(), Uuid::from_u128(1));
        assert_eq!(ids.generate(), Uuid::from_u128(2));
    }
}
