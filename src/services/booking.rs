//! Booking engine: slot reservation, release and rebooking.
//!
//! All mutations of a teacher's slot grid funnel through this engine, which
//! serializes them per teacher via an in-process lock registry. Two
//! concurrent reservations of the same slot therefore cannot both observe it
//! free: the loser fails with `SlotUnavailable` after the winner commits.
//!
//! Multi-slot operations are all-or-nothing: every requested slot is
//! validated before the first one is mutated, so no partial booking survives
//! a failure. Cross-teacher rebooks acquire both teacher locks in ascending
//! teacher-id order to prevent deadlock.

use std::collections::HashMap;
use std::sync::Arc;

use log::info;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::error::{BookingError, BookingResult};
use crate::db::repository::{
    FullRepository, SessionRepository, StudentRepository, TeacherRepository,
};
use crate::models::{
    slot_key_order, Session, SlotKey, Student, StudentId, SubscriptionType, Teacher, TeacherId,
};

/// Per-teacher serialization locks.
///
/// The outer map is guarded by a `parking_lot` lock (held only long enough
/// to fetch or insert an entry); the per-teacher `tokio::sync::Mutex` is
/// held across the whole validate-and-commit critical section.
#[derive(Clone, Default)]
pub struct TeacherLockRegistry {
    locks: Arc<parking_lot::RwLock<HashMap<TeacherId, Arc<Mutex<()>>>>>,
}

impl TeacherLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, teacher_id: TeacherId) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.read().get(&teacher_id) {
            return lock.clone();
        }
        self.locks
            .write()
            .entry(teacher_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Acquire the serialization lock for one teacher.
    pub async fn acquire(&self, teacher_id: TeacherId) -> OwnedMutexGuard<()> {
        self.entry(teacher_id).lock_owned().await
    }

    /// Acquire locks for two distinct teachers, lower id first.
    pub async fn acquire_pair(
        &self,
        a: TeacherId,
        b: TeacherId,
    ) -> (OwnedMutexGuard<()>, OwnedMutexGuard<()>) {
        debug_assert_ne!(a, b);
        let (first, second) = if a.value() < b.value() { (a, b) } else { (b, a) };
        let g1 = self.acquire(first).await;
        let g2 = self.acquire(second).await;
        (g1, g2)
    }
}

/// The booking engine.
///
/// Cheap to clone; clones share the same lock registry, which is what makes
/// the per-teacher serialization process-wide.
#[derive(Clone)]
pub struct BookingEngine {
    repo: Arc<dyn FullRepository>,
    locks: TeacherLockRegistry,
}

impl BookingEngine {
    pub fn new(repo: Arc<dyn FullRepository>) -> Self {
        Self {
            repo,
            locks: TeacherLockRegistry::new(),
        }
    }

    /// The lock registry this engine serializes grid mutations through.
    ///
    /// Shared with any other service that mutates teacher documents (e.g.
    /// grid edits), so all of them respect the same critical sections.
    pub fn locks(&self) -> TeacherLockRegistry {
        self.locks.clone()
    }

    /// Reserve slots on a teacher's grid for a currently unscheduled student.
    ///
    /// Validates existence and availability of every requested slot and the
    /// student's subscription quota, then commits: marks the slots booked,
    /// mirrors them into the student's `scheduled_appointments`, and appends
    /// one `scheduled` session per slot.
    ///
    /// # Returns
    /// The sessions appended to the ledger, in slot order.
    pub async fn reserve(
        &self,
        teacher_id: TeacherId,
        student_id: StudentId,
        requested: &[SlotKey],
    ) -> BookingResult<Vec<Session>> {
        let _guard = self.locks.acquire(teacher_id).await;
        self.reserve_locked(teacher_id, student_id, requested).await
    }

    /// Release slots held by a student on a teacher's grid.
    ///
    /// Idempotent: releasing an already-free slot is a no-op. Releasing a
    /// slot held by a different student fails with `SlotNotOwned` and
    /// mutates nothing.
    pub async fn release(
        &self,
        teacher_id: TeacherId,
        student_id: StudentId,
        slots: &[SlotKey],
    ) -> BookingResult<()> {
        let _guard = self.locks.acquire(teacher_id).await;
        self.release_locked(teacher_id, student_id, slots).await
    }

    /// Release every slot the student currently holds with their teacher.
    ///
    /// No-op for a teacher-less or unscheduled student.
    pub async fn release_all(&self, student: &Student) -> BookingResult<()> {
        match student.teacher_id {
            Some(teacher_id) if !student.scheduled_appointments.is_empty() => {
                self.release(teacher_id, student.id, &student.scheduled_appointments)
                    .await
            }
            _ => Ok(()),
        }
    }

    /// Move a student onto a (possibly different) teacher's slots, optionally
    /// switching subscription plan at the same time.
    ///
    /// Two-phase: the new slots' availability and quota are validated before
    /// the old slots are released, so the release only happens once the
    /// reservation is guaranteed to succeed. When the teacher changes, both
    /// teacher locks are held (ascending id order) for the whole operation.
    ///
    /// # Returns
    /// The sessions appended for newly acquired slots. Slots the student
    /// already held with the same teacher are carried over without a second
    /// ledger entry.
    pub async fn rebook(
        &self,
        student_id: StudentId,
        new_teacher_id: TeacherId,
        new_slots: &[SlotKey],
        new_subscription: Option<SubscriptionType>,
    ) -> BookingResult<Vec<Session>> {
        // Peek at the student to learn which locks are needed; state is
        // re-read under the locks before any decision is committed.
        let peek = self.repo.get_student(student_id).await?;
        let old_teacher_id = peek.teacher_id;

        let _guards = match old_teacher_id {
            Some(old) if old != new_teacher_id => {
                let (a, b) = self.locks.acquire_pair(old, new_teacher_id).await;
                (Some(a), b)
            }
            _ => (None, self.locks.acquire(new_teacher_id).await),
        };

        self.rebook_locked(student_id, new_teacher_id, new_slots, new_subscription)
            .await
    }

    // ==================== Internals (caller holds locks) ====================

    async fn reserve_locked(
        &self,
        teacher_id: TeacherId,
        student_id: StudentId,
        requested: &[SlotKey],
    ) -> BookingResult<Vec<Session>> {
        let mut teacher = self.repo.get_teacher(teacher_id).await?;
        let mut student = self.repo.get_student(student_id).await?;

        if student.is_archived {
            return Err(BookingError::AlreadyArchived { student_id });
        }
        if !student.scheduled_appointments.is_empty() {
            return Err(BookingError::AlreadyScheduled { student_id });
        }

        let keys = normalize_keys(requested);
        self.check_quota(student.subscription_type, keys.len())?;
        self.check_availability(&teacher, &keys, None).await?;

        // Commit: grid, student mirror, ledger.
        book_slots(&mut teacher, &keys, student_id);
        student.teacher_id = Some(teacher_id);
        student.set_appointments(keys.clone());

        let sessions = self.build_sessions(&student, teacher_id, &keys);

        self.repo.update_teacher(&teacher).await?;
        self.repo.update_student(&student).await?;
        self.repo.append_sessions(&sessions).await?;

        info!(
            "Booked {} slots on teacher {} for student {}",
            keys.len(),
            teacher_id,
            student_id
        );
        Ok(sessions)
    }

    async fn release_locked(
        &self,
        teacher_id: TeacherId,
        student_id: StudentId,
        slots: &[SlotKey],
    ) -> BookingResult<()> {
        let mut teacher = self.repo.get_teacher(teacher_id).await?;
        let keys = normalize_keys(slots);

        // Validate the whole batch before touching anything.
        for key in &keys {
            match teacher.find_slot(key) {
                None => {
                    return Err(BookingError::NotFound(format!(
                        "Slot {} {} not in teacher {} grid",
                        key.0, key.1, teacher_id
                    )))
                }
                Some(slot) if slot.is_booked && slot.booked_by != Some(student_id) => {
                    return Err(BookingError::SlotNotOwned {
                        day: key.0,
                        time_range: key.1,
                        student_id,
                    })
                }
                Some(_) => {}
            }
        }

        for key in &keys {
            if let Some(slot) = teacher.slots.get_mut(key) {
                slot.is_booked = false;
                slot.booked_by = None;
            }
        }
        self.repo.update_teacher(&teacher).await?;

        // Keep the student's appointment mirror in sync.
        let mut student = self.repo.get_student(student_id).await?;
        let before = student.scheduled_appointments.len();
        student
            .scheduled_appointments
            .retain(|k| !keys.contains(k));
        if student.scheduled_appointments.len() != before {
            self.repo.update_student(&student).await?;
        }

        info!(
            "Released {} slots on teacher {} for student {}",
            keys.len(),
            teacher_id,
            student_id
        );
        Ok(())
    }

    async fn rebook_locked(
        &self,
        student_id: StudentId,
        new_teacher_id: TeacherId,
        new_slots: &[SlotKey],
        new_subscription: Option<SubscriptionType>,
    ) -> BookingResult<Vec<Session>> {
        let mut student = self.repo.get_student(student_id).await?;
        if student.is_archived {
            return Err(BookingError::AlreadyArchived { student_id });
        }

        let old_teacher_id = student.teacher_id;
        let old_slots = student.scheduled_appointments.clone();
        let subscription = new_subscription.unwrap_or(student.subscription_type);

        let keys = normalize_keys(new_slots);
        self.check_quota(subscription, keys.len())?;

        // Phase 1: validate against the new teacher's grid. Slots the student
        // already holds there count as available to them.
        let mut new_teacher = self.repo.get_teacher(new_teacher_id).await?;
        self.check_availability(&new_teacher, &keys, Some(student_id))
            .await?;

        // Phase 2: commit. Release the old slots first, then book the new
        // set; validation above guarantees the booking cannot fail.
        match old_teacher_id {
            Some(old_id) if old_id != new_teacher_id => {
                let mut old_teacher = self.repo.get_teacher(old_id).await?;
                free_slots(&mut old_teacher, &old_slots, student_id);
                self.repo.update_teacher(&old_teacher).await?;
            }
            Some(_) => {
                free_slots(&mut new_teacher, &old_slots, student_id);
            }
            None => {}
        }

        book_slots(&mut new_teacher, &keys, student_id);
        self.repo.update_teacher(&new_teacher).await?;

        // Ledger entries only for genuinely new occurrences.
        let carried_over = old_teacher_id == Some(new_teacher_id);
        let fresh: Vec<SlotKey> = keys
            .iter()
            .filter(|k| !carried_over || !old_slots.contains(k))
            .copied()
            .collect();

        student.subscription_type = subscription;
        student.teacher_id = Some(new_teacher_id);
        student.set_appointments(keys.clone());

        let sessions = self.build_sessions(&student, new_teacher_id, &fresh);

        self.repo.update_student(&student).await?;
        self.repo.append_sessions(&sessions).await?;

        info!(
            "Rebooked student {} onto teacher {} ({} slots, {} new sessions)",
            student_id,
            new_teacher_id,
            keys.len(),
            sessions.len()
        );
        Ok(sessions)
    }

    // ==================== Validation helpers ====================

    fn check_quota(&self, subscription: SubscriptionType, count: usize) -> BookingResult<()> {
        let quota = subscription.quota();
        if !quota.accepts(count) {
            return Err(BookingError::QuotaMismatch {
                expected: quota.expectation(),
                got: count,
            });
        }
        Ok(())
    }

    /// Every key must exist in the grid and be free (or held by `allow_held_by`).
    async fn check_availability(
        &self,
        teacher: &Teacher,
        keys: &[SlotKey],
        allow_held_by: Option<StudentId>,
    ) -> BookingResult<()> {
        for key in keys {
            let slot = teacher.find_slot(key).ok_or_else(|| {
                BookingError::NotFound(format!(
                    "Slot {} {} not in teacher {} grid",
                    key.0, key.1, teacher.id
                ))
            })?;
            if slot.is_booked {
                let holder = slot.booked_by;
                if holder.is_some() && holder == allow_held_by {
                    continue;
                }
                let held_by = match holder {
                    Some(id) => Some(
                        self.repo
                            .get_student(id)
                            .await
                            .map(|s| s.name)
                            .unwrap_or_else(|_| id.to_string()),
                    ),
                    None => None,
                };
                return Err(BookingError::SlotUnavailable {
                    day: key.0,
                    time_range: key.1,
                    held_by,
                });
            }
        }
        Ok(())
    }

    fn build_sessions(
        &self,
        student: &Student,
        teacher_id: TeacherId,
        keys: &[SlotKey],
    ) -> Vec<Session> {
        let today = chrono::Utc::now().date_naive();
        keys.iter()
            .map(|(day, range)| {
                Session::scheduled(
                    student.id,
                    teacher_id,
                    day.next_occurrence(today),
                    *day,
                    *range,
                    student.is_on_trial(),
                )
            })
            .collect()
    }
}

/// Sort by `(day index, start minutes)` and drop duplicates, making the
/// stored order deterministic and a duplicated request key count once.
fn normalize_keys(keys: &[SlotKey]) -> Vec<SlotKey> {
    let mut sorted = keys.to_vec();
    sorted.sort_by(slot_key_order);
    sorted.dedup();
    sorted
}

fn book_slots(teacher: &mut Teacher, keys: &[SlotKey], student_id: StudentId) {
    for key in keys {
        if let Some(slot) = teacher.slots.get_mut(key) {
            slot.is_booked = true;
            slot.booked_by = Some(student_id);
        }
    }
}

fn free_slots(teacher: &mut Teacher, keys: &[SlotKey], student_id: StudentId) {
    for key in keys {
        if let Some(slot) = teacher.slots.get_mut(key) {
            if slot.booked_by == Some(student_id) {
                slot.is_booked = false;
                slot.booked_by = None;
            }
        }
    }
}
