//! Domain models for the academy scheduling system.
//!
//! This module provides the core data structures: weekday/time-range value
//! types, teacher slot grids, students with subscription plans, the
//! append-only session ledger, and financial records.

pub mod finance;
pub mod session;
pub mod student;
pub mod teacher;
pub mod time;

pub use finance::{AccountingSummary, MonthKey, Transaction, TransactionCategory, TransactionId};
pub use session::{Session, SessionId, SessionStatus};
pub use student::{
    ArchiveInfo, SlotQuota, Student, StudentCounters, StudentId, SubscriptionType, TrialStatus,
    MAX_CUSTOM_SLOTS,
};
pub use teacher::{Teacher, TeacherCounters, TeacherId, TeacherSlot};
pub use time::{slot_key_order, DayOfWeek, SlotKey, TimeRange};
