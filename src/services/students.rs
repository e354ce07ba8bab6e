//! Student creation and edit orchestration.
//!
//! Creation and edits route scheduling changes through the booking engine so
//! the quota and availability rules hold on every path.

use std::sync::Arc;

use log::{info, warn};

use super::booking::BookingEngine;
use super::error::{BookingError, BookingResult};
use crate::db::repository::{FullRepository, RepositoryError, StudentRepository};
use crate::models::{SlotKey, Student, StudentId, SubscriptionType, TeacherId};

/// Input for creating a student.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub name: String,
    pub phone: String,
    pub subscription_type: SubscriptionType,
    /// Teacher and slots to book immediately, when already assigned.
    pub teacher_id: Option<TeacherId>,
    pub scheduled_appointments: Vec<SlotKey>,
}

/// Edits applied to an existing student. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct StudentUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub subscription_type: Option<SubscriptionType>,
    pub teacher_id: Option<TeacherId>,
    pub scheduled_appointments: Option<Vec<SlotKey>>,
}

impl StudentUpdate {
    fn changes_schedule(&self) -> bool {
        self.teacher_id.is_some()
            || self.scheduled_appointments.is_some()
            || self.subscription_type.is_some()
    }
}

/// Student lifecycle orchestration over the booking engine.
#[derive(Clone)]
pub struct StudentService {
    repo: Arc<dyn FullRepository>,
    booking: BookingEngine,
}

impl StudentService {
    pub fn new(repo: Arc<dyn FullRepository>, booking: BookingEngine) -> Self {
        Self { repo, booking }
    }

    /// Create a student, booking their initial slots when a teacher is given.
    ///
    /// All-or-nothing: when the reservation is rejected the student record
    /// is removed again, so a failed creation leaves no trace.
    pub async fn create(&self, new: NewStudent) -> BookingResult<Student> {
        let student = Student::new(StudentId(0), new.name, new.phone, new.subscription_type);
        let student_id = self
            .repo
            .store_student(&student)
            .await
            .map_err(|e| map_phone_conflict(&student.phone, e))?;

        if let Some(teacher_id) = new.teacher_id {
            if let Err(e) = self
                .booking
                .reserve(teacher_id, student_id, &new.scheduled_appointments)
                .await
            {
                // Compensate: the student must not survive a failed booking.
                if let Err(del) = self.repo.delete_student(student_id).await {
                    warn!(
                        "Failed to roll back student {} after rejected booking: {}",
                        student_id, del
                    );
                }
                return Err(e);
            }
        }

        let student = self.repo.get_student(student_id).await?;
        info!("Created student {} ({})", student_id, student.name);
        Ok(student)
    }

    /// Edit a student. Teacher or slot changes go through rebook semantics:
    /// the new reservation is validated before the old slots are released.
    pub async fn update(
        &self,
        student_id: StudentId,
        update: StudentUpdate,
    ) -> BookingResult<Student> {
        let student = self.repo.get_student(student_id).await?;
        if student.is_archived {
            return Err(BookingError::AlreadyArchived { student_id });
        }

        // Surface phone conflicts before any scheduling side effect.
        if let Some(phone) = &update.phone {
            if let Some(other) = self.repo.find_student_by_phone(phone).await? {
                if other.id != student_id {
                    return Err(BookingError::DuplicatePhone {
                        phone: phone.clone(),
                    });
                }
            }
        }

        if update.changes_schedule() {
            let target_teacher = update
                .teacher_id
                .or(student.teacher_id)
                .ok_or_else(|| {
                    BookingError::NotFound(format!(
                        "Student {} has no teacher to schedule against",
                        student_id
                    ))
                })?;
            let slots = update
                .scheduled_appointments
                .clone()
                .unwrap_or_else(|| student.scheduled_appointments.clone());

            self.booking
                .rebook(student_id, target_teacher, &slots, update.subscription_type)
                .await?;
        }

        let mut student = self.repo.get_student(student_id).await?;
        if let Some(name) = update.name {
            student.name = name;
        }
        if let Some(phone) = update.phone {
            student.phone = phone;
        }
        self.repo
            .update_student(&student)
            .await
            .map_err(|e| map_phone_conflict(&student.phone, e))?;

        info!("Updated student {}", student_id);
        Ok(student)
    }
}

fn map_phone_conflict(phone: &str, e: RepositoryError) -> BookingError {
    match e {
        RepositoryError::Conflict(_) => BookingError::DuplicatePhone {
            phone: phone.to_string(),
        },
        other => BookingError::Repository(other),
    }
}
