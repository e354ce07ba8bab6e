//! Student records, subscription plans and trial lifecycle state.
//!
//! Subscription labels are kept exactly as the academy stores them (Arabic
//! plan names); each plan maps to a slot quota rule that the booking engine
//! enforces on every reservation.

use serde::{Deserialize, Serialize};

use super::teacher::TeacherId;
use super::time::SlotKey;

/// Student identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StudentId(pub i64);

impl StudentId {
    pub fn new(v: i64) -> Self {
        Self(v)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for StudentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for StudentId {
    fn from(v: i64) -> Self {
        StudentId(v)
    }
}

/// Maximum slot count for the flexible ("مخصص") plan.
pub const MAX_CUSTOM_SLOTS: usize = 30;

/// Subscription plan, determining the weekly slot quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubscriptionType {
    /// "تجريبي" — one trial lesson.
    #[serde(rename = "تجريبي")]
    Trial,
    /// "نصف ساعة / 4 حصص" — four half-hour sessions.
    #[serde(rename = "نصف ساعة / 4 حصص")]
    HalfHourFour,
    /// "نصف ساعة / 8 حصص" — eight half-hour sessions.
    #[serde(rename = "نصف ساعة / 8 حصص")]
    HalfHourEight,
    /// "ساعة / 4 حصص" — four one-hour sessions.
    #[serde(rename = "ساعة / 4 حصص")]
    HourFour,
    /// "ساعة / 8 حصص" — eight one-hour sessions.
    #[serde(rename = "ساعة / 8 حصص")]
    HourEight,
    /// "مخصص" — flexible count, bounded.
    #[serde(rename = "مخصص")]
    Custom,
    /// "أخرى" — unconstrained.
    #[serde(rename = "أخرى")]
    Other,
}

/// Slot quota rule attached to a subscription plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotQuota {
    /// The reservation must contain exactly this many slots.
    Exact(usize),
    /// The reservation count must fall within this inclusive range.
    Bounded { min: usize, max: usize },
    /// Any count is accepted.
    Unconstrained,
}

impl SlotQuota {
    /// Whether the given slot count satisfies this rule.
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            SlotQuota::Exact(n) => count == *n,
            SlotQuota::Bounded { min, max } => count >= *min && count <= *max,
            SlotQuota::Unconstrained => true,
        }
    }

    /// Human-readable expectation, used in quota error messages.
    pub fn expectation(&self) -> String {
        match self {
            SlotQuota::Exact(n) => format!("exactly {}", n),
            SlotQuota::Bounded { min, max } => format!("between {} and {}", min, max),
            SlotQuota::Unconstrained => "any count".to_string(),
        }
    }
}

impl SubscriptionType {
    /// The quota rule this plan imposes on reservations.
    pub fn quota(&self) -> SlotQuota {
        match self {
            SubscriptionType::Trial => SlotQuota::Exact(1),
            SubscriptionType::HalfHourFour => SlotQuota::Exact(4),
            SubscriptionType::HalfHourEight => SlotQuota::Exact(8),
            SubscriptionType::HourFour => SlotQuota::Exact(4),
            SubscriptionType::HourEight => SlotQuota::Exact(8),
            SubscriptionType::Custom => SlotQuota::Bounded {
                min: 1,
                max: MAX_CUSTOM_SLOTS,
            },
            SubscriptionType::Other => SlotQuota::Unconstrained,
        }
    }

    pub fn is_trial(&self) -> bool {
        matches!(self, SubscriptionType::Trial)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionType::Trial => "تجريبي",
            SubscriptionType::HalfHourFour => "نصف ساعة / 4 حصص",
            SubscriptionType::HalfHourEight => "نصف ساعة / 8 حصص",
            SubscriptionType::HourFour => "ساعة / 4 حصص",
            SubscriptionType::HourEight => "ساعة / 8 حصص",
            SubscriptionType::Custom => "مخصص",
            SubscriptionType::Other => "أخرى",
        }
    }
}

/// Trial lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrialStatus {
    Pending,
    Completed,
    Converted,
    Declined,
}

impl TrialStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrialStatus::Pending => "pending",
            TrialStatus::Completed => "completed",
            TrialStatus::Converted => "converted",
            TrialStatus::Declined => "declined",
        }
    }
}

/// Archival metadata, present only while a student is archived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveInfo {
    pub reason: String,
    pub archived_at: chrono::DateTime<chrono::Utc>,
}

/// Per-period counters for a student, zeroed by the settlement engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentCounters {
    pub sessions_this_period: u32,
    pub absences_this_period: u32,
    pub renewal_due: bool,
}

/// A student record.
///
/// `scheduled_appointments` mirrors the slots the current teacher has marked
/// booked-by this student, kept sorted by `(day index, start minutes)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    /// Unique across all students, archived or not.
    pub phone: String,
    pub subscription_type: SubscriptionType,
    pub teacher_id: Option<TeacherId>,
    pub scheduled_appointments: Vec<SlotKey>,
    pub trial_status: TrialStatus,
    pub is_archived: bool,
    pub archive_info: Option<ArchiveInfo>,
    #[serde(default)]
    pub counters: StudentCounters,
}

impl Student {
    /// Create an unarchived, unscheduled student.
    pub fn new(
        id: StudentId,
        name: impl Into<String>,
        phone: impl Into<String>,
        subscription_type: SubscriptionType,
    ) -> Self {
        let trial_status = if subscription_type.is_trial() {
            TrialStatus::Pending
        } else {
            TrialStatus::Converted
        };
        Self {
            id,
            name: name.into(),
            phone: phone.into(),
            subscription_type,
            teacher_id: None,
            scheduled_appointments: Vec::new(),
            trial_status,
            is_archived: false,
            archive_info: None,
            counters: StudentCounters::default(),
        }
    }

    pub fn is_on_trial(&self) -> bool {
        self.subscription_type.is_trial()
    }

    /// Replace the appointment mirror, keeping it deterministically sorted.
    pub fn set_appointments(&mut self, mut slots: Vec<SlotKey>) {
        slots.sort_by(super::time::slot_key_order);
        self.scheduled_appointments = slots;
    }
}
