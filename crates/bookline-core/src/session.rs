// Session domain types
//
// These types represent one appointment "session" within a multi-appointment
// booking flow, and its status lifecycle. Used by both the store and the
// reservation orchestrator.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Opaque handle to a purchasable service on the booking platform.
///
/// Name and duration are carried for display only; the platform interprets
/// the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BookableItem {
    pub id: String,
    pub name: String,
    pub duration_minutes: u32,
}

impl BookableItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, duration_minutes: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            duration_minutes,
        }
    }
}

/// Opaque handle to a reservable time slot on the booking platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BookableTime {
    pub id: String,
    pub start_time: DateTime<Utc>,
}

impl BookableTime {
    pub fn new(id: impl Into<String>, start_time: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            start_time,
        }
    }
}

/// Staff choice made for a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StaffSelection {
    pub id: String,
    pub name: String,
}

/// Outcome payload recorded on a terminal transition.
///
/// Overwritten when a failed session is retried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum ConfirmationDetails {
    /// The platform's booking reference for a confirmed reservation
    Confirmed { reference: String },
    /// Error text from a failed reservation attempt
    Failed { error: String },
}

impl ConfirmationDetails {
    pub fn confirmed(reference: impl Into<String>) -> Self {
        ConfirmationDetails::Confirmed {
            reference: reference.into(),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        ConfirmationDetails::Failed {
            error: error.into(),
        }
    }
}

/// Session status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    NotSelected,
    Pending,
    Confirmed,
    Failed,
}

impl SessionStatus {
    /// Legal edges of the status state machine.
    ///
    /// `Failed -> Pending` is the retry path (user re-selects a time).
    /// `Confirmed` is terminal.
    pub fn can_transition_to(self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (self, next),
            (NotSelected, Pending) | (Pending, Confirmed) | (Pending, Failed) | (Failed, Pending)
        )
    }

    /// Whether this status represents a finished reservation attempt.
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Confirmed | SessionStatus::Failed)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::NotSelected => write!(f, "not_selected"),
            SessionStatus::Pending => write!(f, "pending"),
            SessionStatus::Confirmed => write!(f, "confirmed"),
            SessionStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_selected" => Ok(SessionStatus::NotSelected),
            "pending" => Ok(SessionStatus::Pending),
            "confirmed" => Ok(SessionStatus::Confirmed),
            "failed" => Ok(SessionStatus::Failed),
            other => Err(format!("unknown session status: {other}")),
        }
    }
}

/// Session - one appointment-booking unit within a multi-appointment flow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Session {
    pub id: Uuid,
    pub service: BookableItem,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff: Option<StaffSelection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_time: Option<BookableTime>,
    /// Same instant as `selected_time`, expressed in the venue's local zone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_display_time: Option<DateTime<FixedOffset>>,
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<ConfirmationDetails>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Whether the user has picked a concrete time slot for this session.
    ///
    /// This drives both active-session reconciliation and the
    /// "all appointments scheduled" gate.
    pub fn has_scheduled_time(&self) -> bool {
        self.selected_time.is_some()
    }
}

/// Input for creating a session: everything except id, status and
/// confirmation details, which the store assigns.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub service: BookableItem,
    pub staff: Option<StaffSelection>,
    pub date: Option<NaiveDate>,
    pub selected_time: Option<BookableTime>,
    pub location_display_time: Option<DateTime<FixedOffset>>,
}

impl NewSession {
    pub fn for_service(service: BookableItem) -> Self {
        Self {
            service,
            staff: None,
            date: None,
            selected_time: None,
            location_display_time: None,
        }
    }

    pub fn with_staff(mut self, staff: StaffSelection) -> Self {
        self.staff = Some(staff);
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

/// Partial update applied to a stored session.
///
/// `None` fields are left untouched. A `status` change goes through the
/// full transition validation in the store.
#[derive(Debug, Clone, Default)]
pub struct SessionPatch {
    pub staff: Option<StaffSelection>,
    pub date: Option<NaiveDate>,
    pub selected_time: Option<BookableTime>,
    pub location_display_time: Option<DateTime<FixedOffset>>,
    pub status: Option<SessionStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legal_transitions() {
        use SessionStatus::*;
        assert!(NotSelected.can_transition_to(Pending));
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Failed));
        assert!(Failed.can_transition_to(Pending));
    }

    #[test]
    fn illegal_transitions_rejected() {
        use SessionStatus::*;
        assert!(!Confirmed.can_transition_to(NotSelected));
        assert!(!Confirmed.can_transition_to(Pending));
        assert!(!Confirmed.can_transition_to(Failed));
        assert!(!NotSelected.can_transition_to(Confirmed));
        assert!(!NotSelected.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Confirmed));
        assert!(!Pending.can_transition_to(NotSelected));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn status_round_trips_through_str() {
        use SessionStatus::*;
        for status in [NotSelected, Pending, Confirmed, Failed] {
            let parsed: SessionStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("running".parse::<SessionStatus>().is_err());
    }
}
