//! Data Transfer Objects for the HTTP API.
//!
//! Typed request/response structs per operation, validated before any
//! persisted state is touched. Slot positions travel as explicit
//! `{day_of_week, time_range}` objects.

use serde::{Deserialize, Serialize};

use crate::models::{
    DayOfWeek, SlotKey, Student, SubscriptionType, Teacher, TeacherSlot, TimeRange,
};
use crate::services::{DeclineDisposition, TrialOutcome};

/// One grid position in a request or response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotKeyDto {
    pub day_of_week: DayOfWeek,
    pub time_range: TimeRange,
}

impl From<SlotKeyDto> for SlotKey {
    fn from(dto: SlotKeyDto) -> Self {
        (dto.day_of_week, dto.time_range)
    }
}

impl From<SlotKey> for SlotKeyDto {
    fn from((day_of_week, time_range): SlotKey) -> Self {
        Self {
            day_of_week,
            time_range,
        }
    }
}

pub fn slot_keys(dtos: &[SlotKeyDto]) -> Vec<SlotKey> {
    dtos.iter().copied().map(Into::into).collect()
}

// =============================================================================
// Teachers
// =============================================================================

/// Request body for creating or editing a teacher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherUpsertRequest {
    pub name: String,
    pub session_rate: f64,
    /// Weekly grid positions
    #[serde(default)]
    pub slots: Vec<SlotKeyDto>,
}

/// Teacher profile in API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherDto {
    pub id: i64,
    pub name: String,
    pub session_rate: f64,
    /// Full grid, sorted by `(day, start)`
    pub slots: Vec<TeacherSlot>,
}

impl From<Teacher> for TeacherDto {
    fn from(teacher: Teacher) -> Self {
        let mut slots: Vec<TeacherSlot> = teacher.slots.into_values().collect();
        slots.sort_by(|a, b| crate::models::slot_key_order(&a.key(), &b.key()));
        Self {
            id: teacher.id.value(),
            name: teacher.name,
            session_rate: teacher.session_rate,
            slots,
        }
    }
}

/// Free slots of one teacher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableSlotsResponse {
    pub teacher_id: i64,
    pub slots: Vec<SlotKeyDto>,
}

// =============================================================================
// Students
// =============================================================================

/// Request body for creating a student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStudentRequest {
    pub name: String,
    pub phone: String,
    pub subscription_type: SubscriptionType,
    /// Teacher to book against immediately, when already assigned
    #[serde(default)]
    pub teacher_id: Option<i64>,
    #[serde(default)]
    pub scheduled_appointments: Vec<SlotKeyDto>,
}

/// Request body for editing a student. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateStudentRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub subscription_type: Option<SubscriptionType>,
    #[serde(default)]
    pub teacher_id: Option<i64>,
    #[serde(default)]
    pub scheduled_appointments: Option<Vec<SlotKeyDto>>,
}

/// Student record in API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentDto {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub subscription_type: SubscriptionType,
    pub teacher_id: Option<i64>,
    pub scheduled_appointments: Vec<SlotKeyDto>,
    pub trial_status: crate::models::TrialStatus,
    pub is_archived: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<Student> for StudentDto {
    fn from(student: Student) -> Self {
        let (archived_reason, archived_at) = match student.archive_info {
            Some(info) => (Some(info.reason), Some(info.archived_at)),
            None => (None, None),
        };
        Self {
            id: student.id.value(),
            name: student.name,
            phone: student.phone,
            subscription_type: student.subscription_type,
            teacher_id: student.teacher_id.map(|t| t.value()),
            scheduled_appointments: student
                .scheduled_appointments
                .into_iter()
                .map(Into::into)
                .collect(),
            trial_status: student.trial_status,
            is_archived: student.is_archived,
            archived_reason,
            archived_at,
        }
    }
}

/// Request body for archiving a student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveRequest {
    pub reason: String,
}

// =============================================================================
// Trial conversion
// =============================================================================

/// Decline disposition over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclineDispositionDto {
    Archive,
    RetryWithNewTeacher,
    CoolOff,
}

impl From<DeclineDispositionDto> for DeclineDisposition {
    fn from(dto: DeclineDispositionDto) -> Self {
        match dto {
            DeclineDispositionDto::Archive => DeclineDisposition::Archive,
            DeclineDispositionDto::RetryWithNewTeacher => DeclineDisposition::RetryWithNewTeacher,
            DeclineDispositionDto::CoolOff => DeclineDisposition::CoolOff,
        }
    }
}

/// Request body for the trial-conversion endpoint, tagged by `action`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TrialConversionRequest {
    Convert {
        new_teacher_id: i64,
        new_subscription_type: SubscriptionType,
        new_slots: Vec<SlotKeyDto>,
    },
    Decline {
        reason: String,
        disposition: DeclineDispositionDto,
    },
}

impl From<TrialConversionRequest> for TrialOutcome {
    fn from(req: TrialConversionRequest) -> Self {
        match req {
            TrialConversionRequest::Convert {
                new_teacher_id,
                new_subscription_type,
                new_slots,
            } => TrialOutcome::Convert {
                new_teacher_id: crate::models::TeacherId(new_teacher_id),
                new_subscription_type,
                new_slots: slot_keys(&new_slots),
            },
            TrialConversionRequest::Decline {
                reason,
                disposition,
            } => TrialOutcome::Decline {
                reason,
                disposition: disposition.into(),
            },
        }
    }
}

// =============================================================================
// Sessions
// =============================================================================

/// Request body for a session status update. `teacher_id` is the acting
/// teacher (the bearer credential resolves to it upstream).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSessionStatusRequest {
    pub teacher_id: i64,
    pub status: crate::models::SessionStatus,
    #[serde(default)]
    pub report: Option<String>,
}

// =============================================================================
// Settlement
// =============================================================================

/// Request body for the manual monthly-summary trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerMonthlySummaryRequest {
    pub year: i32,
    pub month: u32,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Repository connection status
    pub database: String,
}
