// Active-session reconciliation
//
// Exactly one pure function decides which session the UI should present for
// scheduling next. The store re-derives it after every mutation; nothing is
// allowed to cache the result across mutations.

use uuid::Uuid;

use crate::session::Session;

/// Pick the session to present for scheduling.
///
/// Rules, in order:
/// 1. Keep the current active id if it still refers to a stored session
///    (never force-advance away from a session the user is editing, even if
///    it already has a time).
/// 2. Otherwise the first session without a scheduled time; if every session
///    already has one, the first session.
/// 3. Empty collection: no active session.
pub fn select_default_active(sessions: &[Session], current: Option<Uuid>) -> Option<Uuid> {
    if let Some(id) = current {
        if sessions.iter().any(|s| s.id == id) {
            return Some(id);
        }
    }

    sessions
        .iter()
        .find(|s| !s.has_scheduled_time())
        .or_else(|| sessions.first())
        .map(|s| s.id)
}
