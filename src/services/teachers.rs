//! Teacher profile creation and grid edits.
//!
//! Grid edits hold the teacher's serialization lock so a merge cannot
//! interleave with an in-flight booking on the same grid.

use std::sync::Arc;

use log::{info, warn};

use super::booking::TeacherLockRegistry;
use super::error::BookingResult;
use crate::db::repository::{FullRepository, TeacherRepository};
use crate::models::{SlotKey, Teacher, TeacherId};

/// Input for creating or editing a teacher profile.
#[derive(Debug, Clone)]
pub struct TeacherUpsert {
    pub name: String,
    pub session_rate: f64,
    pub grid: Vec<SlotKey>,
}

/// Teacher profile service.
#[derive(Clone)]
pub struct TeacherService {
    repo: Arc<dyn FullRepository>,
    locks: TeacherLockRegistry,
}

impl TeacherService {
    pub fn new(repo: Arc<dyn FullRepository>, locks: TeacherLockRegistry) -> Self {
        Self { repo, locks }
    }

    /// Create a teacher with an all-free grid.
    pub async fn create(&self, upsert: TeacherUpsert) -> BookingResult<Teacher> {
        let teacher = Teacher::new(TeacherId(0), upsert.name, upsert.session_rate, &upsert.grid);
        let teacher_id = self.repo.store_teacher(&teacher).await?;
        let teacher = self.repo.get_teacher(teacher_id).await?;
        info!(
            "Created teacher {} ({}) with {} slots",
            teacher_id,
            teacher.name,
            teacher.slots.len()
        );
        Ok(teacher)
    }

    /// Edit a teacher profile, merging the new grid.
    ///
    /// Booked slots are always retained; free slots absent from the new grid
    /// are dropped; new positions are added free.
    pub async fn update(&self, teacher_id: TeacherId, upsert: TeacherUpsert) -> BookingResult<Teacher> {
        let _guard = self.locks.acquire(teacher_id).await;

        let mut teacher = self.repo.get_teacher(teacher_id).await?;

        // A slot whose booked/booked_by pair drifted apart is reset to free
        // before the merge, so the inconsistency cannot survive an edit.
        let repaired = teacher.repair_slot_grid();
        if !repaired.is_empty() {
            warn!(
                "Teacher {}: repaired {} inconsistent slots",
                teacher_id,
                repaired.len()
            );
        }

        teacher.name = upsert.name;
        teacher.session_rate = upsert.session_rate;
        teacher.merge_grid(&upsert.grid);
        self.repo.update_teacher(&teacher).await?;

        info!("Updated teacher {} ({} slots)", teacher_id, teacher.slots.len());
        Ok(teacher)
    }
}
