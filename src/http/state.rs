//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repo_config::BookingPolicy;
use crate::db::repository::FullRepository;
use crate::services::{
    ArchiveService, BookingEngine, SettlementEngine, StudentService, TeacherService,
    TrialConversionService,
};

/// Shared application state passed to all handlers.
///
/// All services share one booking engine (and thus one per-teacher lock
/// registry), which is what serializes concurrent grid mutations.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for storage operations
    pub repository: Arc<dyn FullRepository>,
    pub booking: BookingEngine,
    pub teachers: TeacherService,
    pub students: StudentService,
    pub archive: ArchiveService,
    pub trial: TrialConversionService,
    pub settlement: SettlementEngine,
    pub policy: BookingPolicy,
}

impl AppState {
    /// Wire up the full service graph over the given repository.
    pub fn new(repository: Arc<dyn FullRepository>, policy: BookingPolicy) -> Self {
        let booking = BookingEngine::new(repository.clone());
        let teachers = TeacherService::new(repository.clone(), booking.locks());
        let students = StudentService::new(repository.clone(), booking.clone());
        let archive = ArchiveService::new(repository.clone(), booking.clone());
        let trial = TrialConversionService::new(repository.clone(), booking.clone(), archive.clone());
        let settlement = SettlementEngine::new(repository.clone());

        Self {
            repository,
            booking,
            teachers,
            students,
            archive,
            trial,
            settlement,
            policy,
        }
    }
}
