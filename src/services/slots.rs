//! Slot grid read model.
//!
//! Pure reads over a teacher's slot collection; no side effects.

use super::error::{BookingError, BookingResult};
use crate::db::repository::{FullRepository, TeacherRepository};
use crate::models::{DayOfWeek, TeacherId, TeacherSlot, TimeRange};

/// Free slots of one teacher, sorted by `(day index, start minutes)`.
pub async fn list_available(
    repo: &dyn FullRepository,
    teacher_id: TeacherId,
) -> BookingResult<Vec<TeacherSlot>> {
    let teacher = repo.get_teacher(teacher_id).await?;
    Ok(teacher.free_slots())
}

/// Look up a single slot in a teacher's grid.
pub async fn find_slot(
    repo: &dyn FullRepository,
    teacher_id: TeacherId,
    day: DayOfWeek,
    time_range: TimeRange,
) -> BookingResult<TeacherSlot> {
    let teacher = repo.get_teacher(teacher_id).await?;
    teacher
        .find_slot(&(day, time_range))
        .cloned()
        .ok_or_else(|| {
            BookingError::NotFound(format!(
                "Slot {} {} not in teacher {} grid",
                day, time_range, teacher_id
            ))
        })
}
