//! Trial conversion state machine.
//!
//! A trial student's outcome is an explicit tagged variant: convert onto a
//! paid plan, or decline with one of three dispositions. Invalid flag
//! combinations are unrepresentable by construction.

use std::sync::Arc;

use log::info;

use super::archive::ArchiveService;
use super::booking::BookingEngine;
use super::error::{BookingError, BookingResult};
use crate::db::repository::{FullRepository, StudentRepository};
use crate::models::{SlotKey, Student, StudentId, SubscriptionType, TeacherId, TrialStatus};

/// What happens to a declined trial student.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclineDisposition {
    /// Archive the student (slots released, record frozen).
    Archive,
    /// Release everything and return to `pending` for a fresh trial with a
    /// new teacher.
    RetryWithNewTeacher,
    /// Explicit resting state: declined, teacher-less, not archived.
    CoolOff,
}

/// Outcome of a trial.
#[derive(Debug, Clone)]
pub enum TrialOutcome {
    /// Subscribe: move onto a paid plan with a new teacher and slots.
    Convert {
        new_teacher_id: TeacherId,
        new_subscription_type: SubscriptionType,
        new_slots: Vec<SlotKey>,
    },
    /// Not subscribing; the disposition decides the rest.
    Decline {
        reason: String,
        disposition: DeclineDisposition,
    },
}

/// Applies trial outcomes atop the booking engine and archival workflow.
#[derive(Clone)]
pub struct TrialConversionService {
    repo: Arc<dyn FullRepository>,
    booking: BookingEngine,
    archive: ArchiveService,
}

impl TrialConversionService {
    pub fn new(
        repo: Arc<dyn FullRepository>,
        booking: BookingEngine,
        archive: ArchiveService,
    ) -> Self {
        Self {
            repo,
            booking,
            archive,
        }
    }

    /// Apply a trial outcome to a student.
    ///
    /// # Errors
    /// * [`BookingError::NotOnTrial`] for non-trial subscriptions.
    /// * [`BookingError::TrialAlreadyConcluded`] when the trial already
    ///   converted or declined.
    /// * Conversion propagates booking failures (`SlotUnavailable`,
    ///   `QuotaMismatch`) with the student left `pending`, original slots
    ///   untouched.
    pub async fn apply(
        &self,
        student_id: StudentId,
        outcome: TrialOutcome,
    ) -> BookingResult<Student> {
        let student = self.repo.get_student(student_id).await?;
        self.check_eligibility(&student)?;

        match outcome {
            TrialOutcome::Convert {
                new_teacher_id,
                new_subscription_type,
                new_slots,
            } => {
                self.convert(student_id, new_teacher_id, new_subscription_type, &new_slots)
                    .await
            }
            TrialOutcome::Decline {
                reason,
                disposition,
            } => self.decline(student_id, reason, disposition).await,
        }
    }

    fn check_eligibility(&self, student: &Student) -> BookingResult<()> {
        if student.is_archived {
            return Err(BookingError::AlreadyArchived {
                student_id: student.id,
            });
        }
        if !student.is_on_trial() {
            return Err(BookingError::NotOnTrial {
                student_id: student.id,
            });
        }
        match student.trial_status {
            TrialStatus::Pending | TrialStatus::Completed => Ok(()),
            TrialStatus::Converted => Err(BookingError::TrialAlreadyConcluded {
                student_id: student.id,
                status: "converted",
            }),
            TrialStatus::Declined => Err(BookingError::TrialAlreadyConcluded {
                student_id: student.id,
                status: "declined",
            }),
        }
    }

    async fn convert(
        &self,
        student_id: StudentId,
        new_teacher_id: TeacherId,
        new_subscription_type: SubscriptionType,
        new_slots: &[SlotKey],
    ) -> BookingResult<Student> {
        // The rebook validates the new reservation before releasing the
        // trial slots; a failure leaves the student pending and untouched.
        self.booking
            .rebook(
                student_id,
                new_teacher_id,
                new_slots,
                Some(new_subscription_type),
            )
            .await?;

        let mut student = self.repo.get_student(student_id).await?;
        student.trial_status = TrialStatus::Converted;
        self.repo.update_student(&student).await?;

        info!(
            "Trial student {} converted to {} with teacher {}",
            student_id,
            new_subscription_type.as_str(),
            new_teacher_id
        );
        Ok(student)
    }

    async fn decline(
        &self,
        student_id: StudentId,
        reason: String,
        disposition: DeclineDisposition,
    ) -> BookingResult<Student> {
        let student = self.repo.get_student(student_id).await?;
        self.booking.release_all(&student).await?;

        match disposition {
            DeclineDisposition::Archive => {
                let mut student = self.repo.get_student(student_id).await?;
                student.trial_status = TrialStatus::Declined;
                student.teacher_id = None;
                self.repo.update_student(&student).await?;

                let archived = self.archive.archive(student_id, reason).await?;
                info!("Trial student {} declined and archived", student_id);
                Ok(archived)
            }
            DeclineDisposition::RetryWithNewTeacher => {
                let mut student = self.repo.get_student(student_id).await?;
                student.trial_status = TrialStatus::Pending;
                student.teacher_id = None;
                self.repo.update_student(&student).await?;

                info!(
                    "Trial student {} declined ({}); pending a new teacher",
                    student_id, reason
                );
                Ok(student)
            }
            DeclineDisposition::CoolOff => {
                let mut student = self.repo.get_student(student_id).await?;
                student.trial_status = TrialStatus::Declined;
                student.teacher_id = None;
                self.repo.update_student(&student).await?;

                info!(
                    "Trial student {} declined ({}); resting unarchived",
                    student_id, reason
                );
                Ok(student)
            }
        }
    }
}
