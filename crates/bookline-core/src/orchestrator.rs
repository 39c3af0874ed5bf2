// Reservation orchestrator
//
// Drives the per-session reservation attempts against the booking platform,
// strictly sequentially (each reservation mutates shared cart state on the
// platform, so concurrent calls against one cart would race), and records
// every outcome on the session store. One session's failure never aborts the
// rest of the batch.

use chrono::{DateTime, FixedOffset, NaiveDate};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cart::{Appointment, Cart, Reservation};
use crate::error::{BookingError, Result};
use crate::session::{BookableTime, ConfirmationDetails, SessionPatch, SessionStatus};
use crate::store::SessionStore;
use crate::traits::{BookingPlatform, LoadingIndicator};

/// Cooperative cancellation for an orchestrator run.
///
/// Checked between sessions, never mid-flight: an in-progress reservation
/// call always runs to completion, and a cancelled run leaves every
/// unattempted session's status untouched.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    cancelled: Arc<AtomicBool>,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A reservation attempt that failed, by session.
#[derive(Debug, Clone)]
pub struct FailedReservation {
    pub session_id: Uuid,
    pub error: String,
}

/// Aggregate result of a checkout run.
///
/// Callers use this to decide whether to advance to payment/confirmation or
/// let the user retry the failed sessions.
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub confirmed: Vec<Uuid>,
    pub failed: Vec<FailedReservation>,
    pub cancelled: bool,
    /// The cart as left by the last successful reservation
    pub cart: Cart,
}

impl CheckoutOutcome {
    pub fn all_confirmed(&self) -> bool {
        !self.cancelled && self.failed.is_empty()
    }
}

/// Sequential reservation driver over the session store.
pub struct ReservationOrchestrator<P: BookingPlatform> {
    platform: Arc<P>,
    loader: Arc<dyn LoadingIndicator>,
    cancel: CancelSignal,
}

impl<P: BookingPlatform> ReservationOrchestrator<P> {
    pub fn new(platform: Arc<P>, loader: Arc<dyn LoadingIndicator>) -> Self {
        Self {
            platform,
            loader,
            cancel: CancelSignal::new(),
        }
    }

    /// Handle the UI can use to cancel a run in progress.
    pub fn cancel_signal(&self) -> CancelSignal {
        self.cancel.clone()
    }

    /// Reserve the time slot the user just picked for one session, and move
    /// that session to `Pending`.
    ///
    /// On a platform failure the error is surfaced and the session keeps its
    /// prior status and fields - a failed selection is a message to the
    /// user, not a state change. Retrying a `Failed` session goes through
    /// here as well (`Failed -> Pending`).
    pub async fn schedule_session(
        &self,
        store: &SessionStore,
        session_id: Uuid,
        cart: Option<Cart>,
        date: NaiveDate,
        time: BookableTime,
        location_display_time: Option<DateTime<FixedOffset>>,
    ) -> Result<Reservation> {
        let cart = cart.ok_or(BookingError::MissingCart)?;
        let session = store
            .session(session_id)
            .await
            .ok_or(BookingError::SessionNotFound(session_id))?;
        if session.status == SessionStatus::Confirmed {
            // refuse before holding a slot the session could never take
            return Err(BookingError::SessionLocked {
                session_id,
                status: session.status,
            });
        }

        let reservation = self.platform.reserve_time(&cart, &time).await?;
        info!(
            session_id = %session_id,
            slot = %time.id,
            reference = %reservation.reference,
            "Time slot reserved"
        );

        store
            .update_session_details(
                session_id,
                SessionPatch {
                    date: Some(date),
                    selected_time: Some(time),
                    location_display_time,
                    status: (session.status != SessionStatus::Pending)
                        .then_some(SessionStatus::Pending),
                    ..Default::default()
                },
            )
            .await?;

        Ok(reservation)
    }

    /// Attempt to turn every `Pending` session into a confirmed reservation.
    ///
    /// Preconditions: a cart must be present - with no cart nothing is
    /// attempted and no session's status changes. The loading indicator is
    /// set before the loop and cleared on every exit path.
    pub async fn proceed_to_checkout(
        &self,
        store: &SessionStore,
        cart: Option<Cart>,
    ) -> Result<CheckoutOutcome> {
        let cart = cart.ok_or(BookingError::MissingCart)?;

        self.loader.set_loading(true);
        let result = self.reserve_pending(store, cart).await;
        self.loader.set_loading(false);
        result
    }

    async fn reserve_pending(&self, store: &SessionStore, cart: Cart) -> Result<CheckoutOutcome> {
        let sessions = store.sessions().await;
        let mut outcome = CheckoutOutcome {
            confirmed: Vec::new(),
            failed: Vec::new(),
            cancelled: false,
            cart,
        };

        for session in sessions {
            if session.status != SessionStatus::Pending {
                continue;
            }
            if self.cancel.is_cancelled() {
                warn!(session_id = %session.id, "Checkout cancelled before this session");
                outcome.cancelled = true;
                break;
            }

            // The store refuses to mark a session Pending without a time,
            // so this only fires on a corrupted store.
            let time = session
                .selected_time
                .as_ref()
                .ok_or(BookingError::MissingTime(session.id))?;

            match self.platform.reserve_time(&outcome.cart, time).await {
                Ok(reservation) => {
                    store
                        .update_session_status(
                            session.id,
                            SessionStatus::Confirmed,
                            Some(ConfirmationDetails::confirmed(reservation.reference.clone())),
                        )
                        .await?;
                    info!(
                        session_id = %session.id,
                        reference = %reservation.reference,
                        "Session confirmed"
                    );
                    outcome.confirmed.push(session.id);
                    outcome.cart = reservation.cart;
                }
                Err(err) => {
                    let message = err.to_string();
                    store
                        .update_session_status(
                            session.id,
                            SessionStatus::Failed,
                            Some(ConfirmationDetails::failed(message.clone())),
                        )
                        .await?;
                    warn!(session_id = %session.id, error = %message, "Reservation failed");
                    outcome.failed.push(FailedReservation {
                        session_id: session.id,
                        error: message,
                    });
                }
            }
        }

        info!(
            confirmed = outcome.confirmed.len(),
            failed = outcome.failed.len(),
            cancelled = outcome.cancelled,
            "Checkout run finished"
        );
        Ok(outcome)
    }

    /// Finalize a fully-reserved cart, returning the appointments the
    /// platform created.
    pub async fn complete_checkout(&self, cart: &Cart) -> Result<Vec<Appointment>> {
        let appointments = self.platform.checkout(cart).await?;
        info!(
            cart_id = %cart.id,
            appointments = appointments.len(),
            "Cart checked out"
        );
        Ok(appointments)
    }
}
