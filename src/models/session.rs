//! Session ledger entries.
//!
//! A session is one scheduled occurrence of a booked slot. Entries are
//! append-only: they are created exactly once by the booking engine and only
//! their status (and report text) changes afterwards, through a monotone
//! state machine.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::student::StudentId;
use super::teacher::TeacherId;
use super::time::{DayOfWeek, TimeRange};

/// Session identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session lifecycle state.
///
/// `scheduled -> attended | absent | deferral_requested`;
/// `deferral_requested -> scheduled` (rescheduling). `attended` and `absent`
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Scheduled,
    Attended,
    Absent,
    DeferralRequested,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Scheduled => "scheduled",
            SessionStatus::Attended => "attended",
            SessionStatus::Absent => "absent",
            SessionStatus::DeferralRequested => "deferral_requested",
        }
    }

    /// Whether no further transitions are allowed out of this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Attended | SessionStatus::Absent)
    }

    /// Whether the ledger permits moving from this state to `next`.
    pub fn can_transition_to(&self, next: SessionStatus) -> bool {
        match (self, next) {
            (SessionStatus::Scheduled, SessionStatus::Attended)
            | (SessionStatus::Scheduled, SessionStatus::Absent)
            | (SessionStatus::Scheduled, SessionStatus::DeferralRequested)
            | (SessionStatus::DeferralRequested, SessionStatus::Scheduled) => true,
            _ => false,
        }
    }
}

/// One scheduled occurrence in the append-only session ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub student_id: StudentId,
    /// The teacher authorized to transition this session's status.
    pub teacher_id: TeacherId,
    pub date: chrono::NaiveDate,
    pub day_of_week: DayOfWeek,
    pub time_range: TimeRange,
    pub status: SessionStatus,
    pub is_trial: bool,
    pub report: Option<String>,
}

impl Session {
    /// Create a freshly scheduled session for a booked slot.
    pub fn scheduled(
        student_id: StudentId,
        teacher_id: TeacherId,
        date: chrono::NaiveDate,
        day_of_week: DayOfWeek,
        time_range: TimeRange,
        is_trial: bool,
    ) -> Self {
        Self {
            id: SessionId::generate(),
            student_id,
            teacher_id,
            date,
            day_of_week,
            time_range,
            status: SessionStatus::Scheduled,
            is_trial,
            report: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduled_transitions() {
        let s = SessionStatus::Scheduled;
        assert!(s.can_transition_to(SessionStatus::Attended));
        assert!(s.can_transition_to(SessionStatus::Absent));
        assert!(s.can_transition_to(SessionStatus::DeferralRequested));
        assert!(!s.can_transition_to(SessionStatus::Scheduled));
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        for terminal in [SessionStatus::Attended, SessionStatus::Absent] {
            assert!(terminal.is_terminal());
            for next in [
                SessionStatus::Scheduled,
                SessionStatus::Attended,
                SessionStatus::Absent,
                SessionStatus::DeferralRequested,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_deferral_reenters_scheduled_only() {
        let d = SessionStatus::DeferralRequested;
        assert!(d.can_transition_to(SessionStatus::Scheduled));
        assert!(!d.can_transition_to(SessionStatus::Attended));
        assert!(!d.can_transition_to(SessionStatus::Absent));
        assert!(!d.is_terminal());
    }
}
