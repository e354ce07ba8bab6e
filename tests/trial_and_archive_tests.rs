//! Integration tests for the trial conversion state machine and the
//! archival workflow.

use std::str::FromStr;
use std::sync::Arc;

use academy_backend::db::repositories::LocalRepository;
use academy_backend::db::repository::{FullRepository, StudentRepository, TeacherRepository};
use academy_backend::models::{
    DayOfWeek, SlotKey, Student, StudentId, SubscriptionType, Teacher, TeacherId, TimeRange,
    TrialStatus,
};
use academy_backend::services::{
    ArchiveService, BookingEngine, BookingError, DeclineDisposition, TrialConversionService,
    TrialOutcome,
};

fn key(day: DayOfWeek, range: &str) -> SlotKey {
    (day, TimeRange::from_str(range).unwrap())
}

struct Fixture {
    repo: Arc<LocalRepository>,
    booking: BookingEngine,
    archive: ArchiveService,
    trial: TrialConversionService,
}

fn fixture() -> Fixture {
    let repo = Arc::new(LocalRepository::new());
    let full: Arc<dyn FullRepository> = repo.clone();
    let booking = BookingEngine::new(full.clone());
    let archive = ArchiveService::new(full.clone(), booking.clone());
    let trial = TrialConversionService::new(full, booking.clone(), archive.clone());
    Fixture {
        repo,
        booking,
        archive,
        trial,
    }
}

/// Trial student holding one slot with their trial teacher.
async fn trial_student(f: &Fixture) -> (TeacherId, StudentId, SlotKey) {
    let slot = key(DayOfWeek::Wednesday, "17:00-17:30");
    let teacher_id = f
        .repo
        .store_teacher(&Teacher::new(TeacherId(0), "Huda", 50.0, &[slot]))
        .await
        .unwrap();
    let student_id = f
        .repo
        .store_student(&Student::new(
            StudentId(0),
            "Omar",
            "0100000000",
            SubscriptionType::Trial,
        ))
        .await
        .unwrap();
    f.booking
        .reserve(teacher_id, student_id, &[slot])
        .await
        .unwrap();
    (teacher_id, student_id, slot)
}

#[tokio::test]
async fn test_conversion_moves_student_onto_paid_plan() {
    let f = fixture();
    let (trial_teacher, student_id, trial_slot) = trial_student(&f).await;

    let new_grid = vec![
        key(DayOfWeek::Sunday, "09:00-09:30"),
        key(DayOfWeek::Sunday, "09:30-10:00"),
        key(DayOfWeek::Tuesday, "18:00-18:30"),
        key(DayOfWeek::Thursday, "18:00-18:30"),
    ];
    let new_teacher = f
        .repo
        .store_teacher(&Teacher::new(TeacherId(0), "Sara", 60.0, &new_grid))
        .await
        .unwrap();

    let student = f
        .trial
        .apply(
            student_id,
            TrialOutcome::Convert {
                new_teacher_id: new_teacher,
                new_subscription_type: SubscriptionType::HalfHourFour,
                new_slots: new_grid.clone(),
            },
        )
        .await
        .unwrap();

    assert_eq!(student.trial_status, TrialStatus::Converted);
    assert_eq!(student.subscription_type, SubscriptionType::HalfHourFour);
    assert_eq!(student.teacher_id, Some(new_teacher));
    assert_eq!(student.scheduled_appointments.len(), 4);

    // Trial slot released back to the old teacher
    let old = f.repo.get_teacher(trial_teacher).await.unwrap();
    assert!(!old.find_slot(&trial_slot).unwrap().is_booked);

    // New slots all booked by the student
    let new = f.repo.get_teacher(new_teacher).await.unwrap();
    for k in &new_grid {
        assert_eq!(new.find_slot(k).unwrap().booked_by, Some(student_id));
    }
}

#[tokio::test]
async fn test_decline_with_archive_releases_everything() {
    let f = fixture();
    let (trial_teacher, student_id, trial_slot) = trial_student(&f).await;

    let student = f
        .trial
        .apply(
            student_id,
            TrialOutcome::Decline {
                reason: "not interested".to_string(),
                disposition: DeclineDisposition::Archive,
            },
        )
        .await
        .unwrap();

    assert!(student.is_archived);
    assert_eq!(student.trial_status, TrialStatus::Declined);
    assert!(student.scheduled_appointments.is_empty());
    assert!(student.teacher_id.is_none());

    // Zero booked slots held by the student across all teachers
    for teacher in f.repo.list_teachers().await.unwrap() {
        assert!(teacher.slots_booked_by(student_id).is_empty());
    }
    let old = f.repo.get_teacher(trial_teacher).await.unwrap();
    assert!(!old.find_slot(&trial_slot).unwrap().is_booked);
}

#[tokio::test]
async fn test_archive_unarchive_round_trip_never_rebooks() {
    let f = fixture();
    let (teacher_id, student_id, slot) = trial_student(&f).await;

    f.archive.archive(student_id, "long vacation").await.unwrap();
    let restored = f.archive.unarchive(student_id).await.unwrap();

    assert!(!restored.is_archived);
    assert!(restored.archive_info.is_none());
    assert!(restored.teacher_id.is_none());
    assert!(restored.scheduled_appointments.is_empty());

    // The previously held slot stays free
    let teacher = f.repo.get_teacher(teacher_id).await.unwrap();
    assert!(!teacher.find_slot(&slot).unwrap().is_booked);
}

#[tokio::test]
async fn test_archived_student_cannot_book() {
    let f = fixture();
    let (teacher_id, student_id, slot) = trial_student(&f).await;
    f.archive.archive(student_id, "left").await.unwrap();

    let result = f.booking.reserve(teacher_id, student_id, &[slot]).await;
    assert!(matches!(result, Err(BookingError::AlreadyArchived { .. })));
}

#[tokio::test]
async fn test_decline_retry_allows_fresh_trial_with_new_teacher() {
    let f = fixture();
    let (_, student_id, _) = trial_student(&f).await;

    f.trial
        .apply(
            student_id,
            TrialOutcome::Decline {
                reason: "schedule clash".to_string(),
                disposition: DeclineDisposition::RetryWithNewTeacher,
            },
        )
        .await
        .unwrap();

    // A fresh trial reservation with another teacher succeeds
    let slot = key(DayOfWeek::Saturday, "11:00-11:30");
    let next_teacher = f
        .repo
        .store_teacher(&Teacher::new(TeacherId(0), "Sara", 60.0, &[slot]))
        .await
        .unwrap();
    f.booking
        .reserve(next_teacher, student_id, &[slot])
        .await
        .unwrap();

    let student = f.repo.get_student(student_id).await.unwrap();
    assert_eq!(student.trial_status, TrialStatus::Pending);
    assert_eq!(student.teacher_id, Some(next_teacher));
}
