// Session store
//
// Single source of truth for the ordered session collection and the active
// session id. Every mutation is validated (unknown ids and illegal status
// transitions are reported, never swallowed) and the active id is re-derived
// from the reconciliation rule after each change.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::{BookingError, Result};
use crate::selector::select_default_active;
use crate::session::{ConfirmationDetails, NewSession, Session, SessionPatch, SessionStatus};
use crate::traits::IdGenerator;

#[derive(Debug, Default)]
struct StoreInner {
    sessions: Vec<Session>,
    active: Option<Uuid>,
}

/// Ordered collection of sessions plus the active-session pointer.
///
/// Cheap to clone; all clones share state. Mutations happen on the caller's
/// task - last write wins for back-to-back updates, which the UI guards
/// against by disabling in-flight controls.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<StoreInner>>,
    ids: Arc<dyn IdGenerator>,
}

impl SessionStore {
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreInner::default())),
            ids,
        }
    }

    /// Append a new session with a fresh id and `NotSelected` status.
    ///
    /// Pure append: no error conditions. Returns the new id.
    pub async fn add_session(&self, data: NewSession) -> Uuid {
        let mut inner = self.inner.write().await;
        let id = self.ids.generate();
        inner.sessions.push(Session {
            id,
            service: data.service,
            staff: data.staff,
            date: data.date,
            selected_time: data.selected_time,
            location_display_time: data.location_display_time,
            status: SessionStatus::NotSelected,
            confirmation: None,
            created_at: chrono::Utc::now(),
        });
        inner.active = select_default_active(&inner.sessions, inner.active);
        debug!(session_id = %id, count = inner.sessions.len(), "Session added");
        id
    }

    /// Remove a session.
    ///
    /// `Ok(true)` when removed, `Ok(false)` when no such id (absence is
    /// reported, not an error). A session that has left the editable
    /// statuses cannot be removed; there is no undo flow for a completed
    /// reservation.
    pub async fn remove_session(&self, id: Uuid) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let Some(index) = inner.sessions.iter().position(|s| s.id == id) else {
            return Ok(false);
        };
        let status = inner.sessions[index].status;
        if status.is_terminal() {
            return Err(BookingError::SessionLocked {
                session_id: id,
                status,
            });
        }
        inner.sessions.remove(index);
        inner.active = select_default_active(&inner.sessions, inner.active);
        debug!(session_id = %id, count = inner.sessions.len(), "Session removed");
        Ok(true)
    }

    /// Merge a partial update into a session.
    ///
    /// Unknown ids are a reported error. A status in the patch goes through
    /// the same transition validation as `update_session_status`; restating
    /// the current status is a no-op, not a transition.
    pub async fn update_session_details(&self, id: Uuid, patch: SessionPatch) -> Result<()> {
        let mut inner = self.inner.write().await;
        let session = inner
            .sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(BookingError::SessionNotFound(id))?;

        if session.status == SessionStatus::Confirmed {
            return Err(BookingError::SessionLocked {
                session_id: id,
                status: session.status,
            });
        }

        // Merge into a scratch copy so a rejected transition leaves the
        // stored session untouched; the Pending gate sees the merged fields.
        let mut updated = session.clone();
        if let Some(staff) = patch.staff {
            updated.staff = Some(staff);
        }
        if let Some(date) = patch.date {
            updated.date = Some(date);
        }
        if let Some(time) = patch.selected_time {
            updated.selected_time = Some(time);
        }
        if let Some(display) = patch.location_display_time {
            updated.location_display_time = Some(display);
        }
        if let Some(status) = patch.status {
            apply_transition(&mut updated, status)?;
        }
        *session = updated;

        inner.active = select_default_active(&inner.sessions, inner.active);
        Ok(())
    }

    /// Set a session's status, optionally replacing its confirmation
    /// details. Other fields are untouched.
    pub async fn update_session_status(
        &self,
        id: Uuid,
        status: SessionStatus,
        confirmation: Option<ConfirmationDetails>,
    ) -> Result<()> {
        let mut inner = self.inner.write().await;
        let session = inner
            .sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(BookingError::SessionNotFound(id))?;

        apply_transition(session, status)?;
        if let Some(details) = confirmation {
            session.confirmation = Some(details);
        }

        inner.active = select_default_active(&inner.sessions, inner.active);
        Ok(())
    }

    /// Empty the collection and clear the active id.
    pub async fn clear_sessions(&self) {
        let mut inner = self.inner.write().await;
        inner.sessions.clear();
        inner.active = None;
        debug!("Sessions cleared");
    }

    /// Explicit user selection of the session to schedule.
    pub async fn set_active(&self, id: Uuid) -> Result<()> {
        let mut inner = self.inner.write().await;
        if !inner.sessions.iter().any(|s| s.id == id) {
            return Err(BookingError::SessionNotFound(id));
        }
        inner.active = Some(id);
        Ok(())
    }

    /// Snapshot of all sessions in insertion order.
    pub async fn sessions(&self) -> Vec<Session> {
        self.inner.read().await.sessions.clone()
    }

    pub async fn session(&self, id: Uuid) -> Option<Session> {
        self.inner
            .read()
            .await
            .sessions
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    pub async fn active_id(&self) -> Option<Uuid> {
        self.inner.read().await.active
    }

    pub async fn active_session(&self) -> Option<Session> {
        let inner = self.inner.read().await;
        let id = inner.active?;
        inner.sessions.iter().find(|s| s.id == id).cloned()
    }

    /// 0-based position of a session, for "session i of N" display.
    pub async fn position(&self, id: Uuid) -> Option<usize> {
        self.inner
            .read()
            .await
            .sessions
            .iter()
            .position(|s| s.id == id)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.sessions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.sessions.is_empty()
    }

    /// Whether every session has a selected time - the gate for the
    /// "continue to next step" affordance.
    pub async fn all_scheduled(&self) -> bool {
        let inner = self.inner.read().await;
        !inner.sessions.is_empty() && inner.sessions.iter().all(|s| s.has_scheduled_time())
    }
}

/// Apply a validated status change in place.
///
/// Restating the current status is not a transition and passes through so
/// callers can replace confirmation details idempotently. Entering `Pending`
/// requires a date and a selected time; `Confirmed`/`Failed` are only
/// reachable from `Pending`, so the scheduled-time invariant holds for them
/// transitively.
fn apply_transition(session: &mut Session, next: SessionStatus) -> Result<()> {
    if session.status == next {
        return Ok(());
    }
    if !session.status.can_transition_to(next) {
        return Err(BookingError::InvalidTransition {
            session_id: session.id,
            from: session.status,
            to: next,
        });
    }
    if next == SessionStatus::Pending && (session.selected_time.is_none() || session.date.is_none())
    {
        return Err(BookingError::MissingTime(session.id));
    }
    session.status = next;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::SequentialIdGenerator;
    use crate::session::{BookableItem, BookableTime};
    use chrono::Utc;

    fn store() -> SessionStore {
        SessionStore::new(Arc::new(SequentialIdGenerator::new()))
    }

    fn service(name: &str) -> NewSession {
        NewSession::for_service(BookableItem::new("svc", name, 30))
    }

    fn scheduled_patch() -> SessionPatch {
        SessionPatch {
            date: Some(Utc::now().date_naive()),
            selected_time: Some(BookableTime::new("slot-1", Utc::now())),
            status: Some(SessionStatus::Pending),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn add_assigns_unique_ids_in_insertion_order() {
        let store = store();
        let mut ids = Vec::new();
        for n in 0..5 {
            ids.push(store.add_session(service(&format!("svc-{n}"))).await);
        }
        let stored: Vec<Uuid> = store.sessions().await.iter().map(|s| s.id).collect();
        assert_eq!(stored, ids);
        let mut deduped = ids.clone();
        deduped.dedup();
        assert_eq!(deduped.len(), ids.len());
    }

    #[tokio::test]
    async fn removal_preserves_survivor_order() {
        let store = store();
        let a = store.add_session(service("a")).await;
        let b = store.add_session(service("b")).await;
        let c = store.add_session(service("c")).await;
        assert!(store.remove_session(b).await.unwrap());
        let stored: Vec<Uuid> = store.sessions().await.iter().map(|s| s.id).collect();
        assert_eq!(stored, vec![a, c]);
    }

    #[tokio::test]
    async fn removing_unknown_id_reports_absence() {
        let store = store();
        store.add_session(service("a")).await;
        assert!(!store.remove_session(Uuid::from_u128(99)).await.unwrap());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn completed_sessions_cannot_be_removed() {
        let store = store();
        let id = store.add_session(service("a")).await;
        store.update_session_details(id, scheduled_patch()).await.unwrap();
        store
            .update_session_status(id, SessionStatus::Confirmed, None)
            .await
            .unwrap();
        let err = store.remove_session(id).await.unwrap_err();
        assert!(matches!(err, BookingError::SessionLocked { .. }));
    }

    #[tokio::test]
    async fn update_on_unknown_id_is_an_error_not_a_noop() {
        let store = store();
        let err = store
            .update_session_details(Uuid::from_u128(7), SessionPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn pending_requires_date_and_time() {
        let store = store();
        let id = store.add_session(service("a")).await;
        let err = store
            .update_session_status(id, SessionStatus::Pending, None)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::MissingTime(_)));
        assert_eq!(
            store.session(id).await.unwrap().status,
            SessionStatus::NotSelected
        );
    }

    #[tokio::test]
    async fn illegal_transition_is_rejected() {
        let store = store();
        let id = store.add_session(service("a")).await;
        let err = store
            .update_session_status(id, SessionStatus::Confirmed, None)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn retry_reopens_a_failed_session() {
        let store = store();
        let id = store.add_session(service("a")).await;
        store.update_session_details(id, scheduled_patch()).await.unwrap();
        store
            .update_session_status(
                id,
                SessionStatus::Failed,
                Some(ConfirmationDetails::failed("card declined")),
            )
            .await
            .unwrap();
        store
            .update_session_status(id, SessionStatus::Pending, None)
            .await
            .unwrap();
        let session = store.session(id).await.unwrap();
        assert_eq!(session.status, SessionStatus::Pending);
        // details from the failed attempt survive until the next terminal transition
        assert!(session.confirmation.is_some());
    }

    #[tokio::test]
    async fn active_follows_reconciliation_on_add_and_remove() {
        let store = store();
        let s1 = store.add_session(service("a")).await;
        let s2 = store.add_session(service("b")).await;
        assert_eq!(store.active_id().await, Some(s1));

        store.update_session_details(s1, scheduled_patch()).await.unwrap();
        // rule 1: keep the session the user is editing
        assert_eq!(store.active_id().await, Some(s1));

        assert!(store.remove_session(s1).await.unwrap());
        assert_eq!(store.active_id().await, Some(s2));
    }

    #[tokio::test]
    async fn active_is_never_dangling() {
        let store = store();
        let s1 = store.add_session(service("a")).await;
        store.add_session(service("b")).await;
        store.set_active(s1).await.unwrap();
        store.remove_session(s1).await.unwrap();
        let active = store.active_id().await.unwrap();
        assert!(store.session(active).await.is_some());
    }

    #[tokio::test]
    async fn set_active_rejects_unknown_id() {
        let store = store();
        store.add_session(service("a")).await;
        let err = store.set_active(Uuid::from_u128(42)).await.unwrap_err();
        assert!(matches!(err, BookingError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn clear_sessions_resets_active() {
        let store = store();
        store.add_session(service("a")).await;
        assert!(store.active_id().await.is_some());
        store.clear_sessions().await;
        assert!(store.active_id().await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn all_scheduled_gate() {
        let store = store();
        assert!(!store.all_scheduled().await);
        let s1 = store.add_session(service("a")).await;
        let s2 = store.add_session(service("b")).await;
        assert!(!store.all_scheduled().await);
        store.update_session_details(s1, scheduled_patch()).await.unwrap();
        assert!(!store.all_scheduled().await);
        store.update_session_details(s2, scheduled_patch()).await.unwrap();
        assert!(store.all_scheduled().await);
    }

    #[tokio::test]
    async fn position_reports_display_ordinal() {
        let store = store();
        let s1 = store.add_session(service("a")).await;
        let s2 = store.add_session(service("b")).await;
        assert_eq!(store.position(s1).await, Some(0));
        assert_eq!(store.position(s2).await, Some(1));
        assert_eq!(store.position(Uuid::from_u128(5)).await, None);
    }
}
