//! Archival workflow: reversible hard reset of a student's scheduling state.

use std::sync::Arc;

use log::info;

use super::booking::BookingEngine;
use super::error::{BookingError, BookingResult};
use crate::db::repository::{FullRepository, StudentRepository};
use crate::models::{ArchiveInfo, Student, StudentId};

/// Archive and unarchive students, releasing slots through the booking
/// engine's serialized release path.
#[derive(Clone)]
pub struct ArchiveService {
    repo: Arc<dyn FullRepository>,
    booking: BookingEngine,
}

impl ArchiveService {
    pub fn new(repo: Arc<dyn FullRepository>, booking: BookingEngine) -> Self {
        Self { repo, booking }
    }

    /// Freeze a student: release every held slot, then mark archived.
    ///
    /// # Errors
    /// [`BookingError::AlreadyArchived`] when the student is archived.
    pub async fn archive(
        &self,
        student_id: StudentId,
        reason: impl Into<String>,
    ) -> BookingResult<Student> {
        let student = self.repo.get_student(student_id).await?;
        if student.is_archived {
            return Err(BookingError::AlreadyArchived { student_id });
        }

        self.booking.release_all(&student).await?;

        // Re-read: the release updated the appointment mirror.
        let mut student = self.repo.get_student(student_id).await?;
        student.is_archived = true;
        student.archive_info = Some(ArchiveInfo {
            reason: reason.into(),
            archived_at: chrono::Utc::now(),
        });
        student.teacher_id = None;
        student.scheduled_appointments.clear();
        self.repo.update_student(&student).await?;

        info!("Archived student {}", student_id);
        Ok(student)
    }

    /// Reverse archival. Does not re-book any slots: the student re-enters
    /// teacher-less and must go through scheduling again.
    ///
    /// Idempotent: unarchiving a non-archived student returns it unchanged.
    pub async fn unarchive(&self, student_id: StudentId) -> BookingResult<Student> {
        let mut student = self.repo.get_student(student_id).await?;
        if !student.is_archived {
            return Ok(student);
        }

        student.is_archived = false;
        student.archive_info = None;
        self.repo.update_student(&student).await?;

        info!("Unarchived student {}", student_id);
        Ok(student)
    }
}
