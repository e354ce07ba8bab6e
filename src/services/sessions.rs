//! Session ledger status transitions.
//!
//! Transitions are monotone (see [`crate::models::SessionStatus`]) and only
//! the teacher recorded on the session may perform them. Attendance marking
//! drives the per-period counters that the settlement engine later resets.

use log::info;

use super::error::{BookingError, BookingResult};
use crate::db::repo_config::BookingPolicy;
use crate::db::repository::{
    FullRepository, SessionRepository, StudentRepository, TeacherRepository,
};
use crate::models::{Session, SessionId, SessionStatus, TeacherId};

/// Requested status change for one session.
#[derive(Debug, Clone)]
pub struct SessionStatusUpdate {
    pub status: SessionStatus,
    /// Report text, attached when marking `attended`.
    pub report: Option<String>,
}

/// Transition a session's status on behalf of `caller`.
///
/// # Errors
/// * [`BookingError::SessionNotOwned`] when `caller` is not the session's
///   recorded teacher.
/// * [`BookingError::InvalidTransition`] when the lifecycle forbids the move
///   (terminal states reject everything).
pub async fn update_status(
    repo: &dyn FullRepository,
    policy: &BookingPolicy,
    session_id: SessionId,
    caller: TeacherId,
    update: SessionStatusUpdate,
) -> BookingResult<Session> {
    let mut session = repo.get_session(session_id).await?;

    if session.teacher_id != caller {
        return Err(BookingError::SessionNotOwned { session_id });
    }
    if !session.status.can_transition_to(update.status) {
        return Err(BookingError::InvalidTransition {
            from: session.status,
            to: update.status,
        });
    }

    let previous = session.status;
    session.status = update.status;
    if update.status == SessionStatus::Attended {
        if let Some(report) = update.report {
            session.report = Some(report);
        }
    }

    apply_counters(repo, policy, &session).await?;
    repo.update_session(&session).await?;

    info!(
        "Session {}: {} -> {}",
        session_id,
        previous.as_str(),
        session.status.as_str()
    );
    Ok(session)
}

/// Counter upkeep for a just-applied transition.
///
/// Attended: session counters on both sides, plus the teacher's per-period
/// earnings at their session rate. Absent: absence counters. A deferral only
/// consumes quota when the policy says so.
async fn apply_counters(
    repo: &dyn FullRepository,
    policy: &BookingPolicy,
    session: &Session,
) -> BookingResult<()> {
    match session.status {
        SessionStatus::Attended => {
            let mut student = repo.get_student(session.student_id).await?;
            student.counters.sessions_this_period += 1;
            repo.update_student(&student).await?;

            let mut teacher = repo.get_teacher(session.teacher_id).await?;
            teacher.counters.sessions_this_period += 1;
            teacher.counters.earnings_this_period += teacher.session_rate;
            repo.update_teacher(&teacher).await?;
        }
        SessionStatus::Absent => {
            let mut student = repo.get_student(session.student_id).await?;
            student.counters.absences_this_period += 1;
            repo.update_student(&student).await?;

            let mut teacher = repo.get_teacher(session.teacher_id).await?;
            teacher.counters.absences_this_period += 1;
            repo.update_teacher(&teacher).await?;
        }
        SessionStatus::DeferralRequested => {
            if policy.deferral_consumes_quota {
                let mut student = repo.get_student(session.student_id).await?;
                student.counters.sessions_this_period += 1;
                repo.update_student(&student).await?;
            }
        }
        SessionStatus::Scheduled => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::db::repository::{SessionRepository, StudentRepository, TeacherRepository};
    use crate::models::{DayOfWeek, Student, StudentId, SubscriptionType, Teacher, TimeRange};
    use std::str::FromStr;

    async fn setup(repo: &LocalRepository) -> (TeacherId, StudentId, SessionId) {
        let teacher_id = repo
            .store_teacher(&Teacher::new(TeacherId(0), "Huda", 50.0, &[]))
            .await
            .unwrap();
        let student_id = repo
            .store_student(&Student::new(
                StudentId(0),
                "Omar",
                "0100000000",
                SubscriptionType::HalfHourFour,
            ))
            .await
            .unwrap();

        let session = Session::scheduled(
            student_id,
            teacher_id,
            chrono::NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
            DayOfWeek::Sunday,
            TimeRange::from_str("09:00-09:30").unwrap(),
            false,
        );
        repo.append_sessions(std::slice::from_ref(&session))
            .await
            .unwrap();
        (teacher_id, student_id, session.id)
    }

    #[tokio::test]
    async fn test_attended_updates_counters_and_report() {
        let repo = LocalRepository::new();
        let (teacher_id, student_id, session_id) = setup(&repo).await;

        let session = update_status(
            &repo,
            &BookingPolicy::default(),
            session_id,
            teacher_id,
            SessionStatusUpdate {
                status: SessionStatus::Attended,
                report: Some("Covered surah Al-Fatiha".to_string()),
            },
        )
        .await
        .unwrap();

        assert_eq!(session.status, SessionStatus::Attended);
        assert_eq!(session.report.as_deref(), Some("Covered surah Al-Fatiha"));

        let student = repo.get_student(student_id).await.unwrap();
        assert_eq!(student.counters.sessions_this_period, 1);
        let teacher = repo.get_teacher(teacher_id).await.unwrap();
        assert_eq!(teacher.counters.sessions_this_period, 1);
        assert_eq!(teacher.counters.earnings_this_period, 50.0);
    }

    #[tokio::test]
    async fn test_non_owner_rejected() {
        let repo = LocalRepository::new();
        let (_teacher_id, _student_id, session_id) = setup(&repo).await;
        let intruder = repo
            .store_teacher(&Teacher::new(TeacherId(0), "Sara", 40.0, &[]))
            .await
            .unwrap();

        let result = update_status(
            &repo,
            &BookingPolicy::default(),
            session_id,
            intruder,
            SessionStatusUpdate {
                status: SessionStatus::Attended,
                report: None,
            },
        )
        .await;
        assert!(matches!(result, Err(BookingError::SessionNotOwned { .. })));
    }

    #[tokio::test]
    async fn test_terminal_state_rejects_further_updates() {
        let repo = LocalRepository::new();
        let (teacher_id, _student_id, session_id) = setup(&repo).await;
        let policy = BookingPolicy::default();

        update_status(
            &repo,
            &policy,
            session_id,
            teacher_id,
            SessionStatusUpdate {
                status: SessionStatus::Absent,
                report: None,
            },
        )
        .await
        .unwrap();

        let result = update_status(
            &repo,
            &policy,
            session_id,
            teacher_id,
            SessionStatusUpdate {
                status: SessionStatus::Attended,
                report: None,
            },
        )
        .await;
        assert!(matches!(result, Err(BookingError::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn test_deferral_roundtrip_and_quota_policy() {
        let repo = LocalRepository::new();
        let (teacher_id, student_id, session_id) = setup(&repo).await;
        let policy = BookingPolicy {
            deferral_consumes_quota: true,
        };

        update_status(
            &repo,
            &policy,
            session_id,
            teacher_id,
            SessionStatusUpdate {
                status: SessionStatus::DeferralRequested,
                report: None,
            },
        )
        .await
        .unwrap();

        // Policy enabled: the deferral consumed one period session
        let student = repo.get_student(student_id).await.unwrap();
        assert_eq!(student.counters.sessions_this_period, 1);

        // Rescheduling re-enters the scheduled state
        let session = update_status(
            &repo,
            &policy,
            session_id,
            teacher_id,
            SessionStatusUpdate {
                status: SessionStatus::Scheduled,
                report: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(session.status, SessionStatus::Scheduled);
    }
}
