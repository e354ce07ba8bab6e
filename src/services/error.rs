//! Domain error taxonomy for booking and lifecycle operations.

use crate::db::repository::RepositoryError;
use crate::models::{DayOfWeek, SessionId, SessionStatus, StudentId, TimeRange};

/// Result type for service-layer operations.
pub type BookingResult<T> = Result<T, BookingError>;

/// Errors surfaced by the booking engine and the lifecycle services built on
/// top of it.
///
/// Validation failures carry enough detail (day, time, current holder) for
/// user-facing correction; persistence failures pass through as
/// [`BookingError::Repository`] and are surfaced generically.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// A requested slot is already booked by someone else.
    #[error("Slot {day} {time_range} is already booked{}", .held_by.as_deref().map(|h| format!(" by {}", h)).unwrap_or_default())]
    SlotUnavailable {
        day: DayOfWeek,
        time_range: TimeRange,
        /// Display name of the current holder, when known.
        held_by: Option<String>,
    },

    /// Attempt to release a slot held by a different student.
    #[error("Slot {day} {time_range} is not held by student {student_id}")]
    SlotNotOwned {
        day: DayOfWeek,
        time_range: TimeRange,
        student_id: StudentId,
    },

    /// Attempt to transition a session owned by another teacher.
    #[error("Session {session_id} belongs to another teacher")]
    SessionNotOwned { session_id: SessionId },

    /// The selected slot count doesn't match the subscription rules.
    #[error("Subscription expects {expected} slots, got {got}")]
    QuotaMismatch { expected: String, got: usize },

    /// Trial conversion attempted on a non-trial student.
    #[error("Student {student_id} is not on a trial subscription")]
    NotOnTrial { student_id: StudentId },

    /// Trial conversion attempted after the trial already concluded.
    #[error("Trial for student {student_id} already {status}")]
    TrialAlreadyConcluded {
        student_id: StudentId,
        status: &'static str,
    },

    /// Archive requested for an already-archived student.
    #[error("Student {student_id} is already archived")]
    AlreadyArchived { student_id: StudentId },

    /// Reservation requested for a student that already holds appointments.
    #[error("Student {student_id} already has scheduled appointments; rebook instead")]
    AlreadyScheduled { student_id: StudentId },

    /// Phone number uniqueness violation.
    #[error("Phone number {phone} already registered")]
    DuplicatePhone { phone: String },

    /// Disallowed session status transition.
    #[error("Cannot transition session from {} to {}", .from.as_str(), .to.as_str())]
    InvalidTransition {
        from: SessionStatus,
        to: SessionStatus,
    },

    /// Entity missing (teacher, student, session, or grid slot).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Persistence failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl BookingError {
    /// Machine-readable error code for the HTTP surface.
    pub fn code(&self) -> &'static str {
        match self {
            BookingError::SlotUnavailable { .. } => "SLOT_UNAVAILABLE",
            BookingError::SlotNotOwned { .. } | BookingError::SessionNotOwned { .. } => "NOT_OWNER",
            BookingError::QuotaMismatch { .. } => "QUOTA_MISMATCH",
            BookingError::NotOnTrial { .. } => "NOT_ON_TRIAL",
            BookingError::TrialAlreadyConcluded { .. } => "NOT_ON_TRIAL",
            BookingError::AlreadyArchived { .. } => "ALREADY_ARCHIVED",
            BookingError::AlreadyScheduled { .. } => "BAD_REQUEST",
            BookingError::DuplicatePhone { .. } => "PHONE_NUMBER_EXISTS",
            BookingError::InvalidTransition { .. } => "BAD_REQUEST",
            BookingError::NotFound(_) => "NOT_FOUND",
            BookingError::Repository(RepositoryError::NotFound(_)) => "NOT_FOUND",
            BookingError::Repository(_) => "REPOSITORY_ERROR",
        }
    }
}
