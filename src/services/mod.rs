//! High-level business logic services.
//!
//! Each service works against the repository traits, so any backend can sit
//! underneath. The booking engine owns the per-teacher serialization that
//! every slot mutation must pass through; the lifecycle services (students,
//! trial conversion, archival) compose it rather than touching grids
//! directly. The settlement engine runs on its own schedule and never
//! touches slot grids.

pub mod archive;
pub mod booking;
pub mod error;
pub mod sessions;
pub mod settlement;
pub mod slots;
pub mod students;
pub mod teachers;
pub mod trial;

pub use archive::ArchiveService;
pub use booking::{BookingEngine, TeacherLockRegistry};
pub use error::{BookingError, BookingResult};
pub use sessions::{update_status, SessionStatusUpdate};
pub use settlement::{SettlementEngine, SettlementOutcome};
pub use students::{NewStudent, StudentService, StudentUpdate};
pub use teachers::{TeacherService, TeacherUpsert};
pub use trial::{DeclineDisposition, TrialConversionService, TrialOutcome};
