//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the service
//! layer for business logic.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    slot_keys, ArchiveRequest, AvailableSlotsResponse, CreateStudentRequest, HealthResponse,
    StudentDto, TeacherDto, TeacherUpsertRequest, TrialConversionRequest,
    TriggerMonthlySummaryRequest, UpdateSessionStatusRequest, UpdateStudentRequest,
};
use super::error::AppError;
use super::state::AppState;
use crate::db::repository::{FinanceRepository, StudentRepository, TeacherRepository};
use crate::models::{AccountingSummary, MonthKey, SessionId, StudentId, TeacherId};
use crate::services::{
    slots, update_status, NewStudent, SessionStatusUpdate, SettlementOutcome, StudentUpdate,
    TeacherUpsert,
};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the repository
/// is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Teachers
// =============================================================================

/// POST /v1/teachers
///
/// Create a teacher profile with its weekly grid.
pub async fn create_teacher(
    State(state): State<AppState>,
    Json(request): Json<TeacherUpsertRequest>,
) -> Result<(StatusCode, Json<TeacherDto>), AppError> {
    let teacher = state
        .teachers
        .create(TeacherUpsert {
            name: request.name,
            session_rate: request.session_rate,
            grid: slot_keys(&request.slots),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(teacher.into())))
}

/// PUT /v1/teachers/{id}
///
/// Edit a teacher profile; the grid is merged (booked slots always retained).
pub async fn update_teacher(
    State(state): State<AppState>,
    Path(teacher_id): Path<i64>,
    Json(request): Json<TeacherUpsertRequest>,
) -> HandlerResult<TeacherDto> {
    let teacher = state
        .teachers
        .update(
            TeacherId(teacher_id),
            TeacherUpsert {
                name: request.name,
                session_rate: request.session_rate,
                grid: slot_keys(&request.slots),
            },
        )
        .await?;
    Ok(Json(teacher.into()))
}

/// GET /v1/teachers/{id}/available-slots
///
/// Free slots only.
pub async fn available_slots(
    State(state): State<AppState>,
    Path(teacher_id): Path<i64>,
) -> HandlerResult<AvailableSlotsResponse> {
    let free = slots::list_available(state.repository.as_ref(), TeacherId(teacher_id)).await?;
    Ok(Json(AvailableSlotsResponse {
        teacher_id,
        slots: free.into_iter().map(|s| s.key().into()).collect(),
    }))
}

// =============================================================================
// Students
// =============================================================================

/// GET /v1/students/{id}
pub async fn get_student(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
) -> HandlerResult<StudentDto> {
    let student = state.repository.get_student(StudentId(student_id)).await?;
    Ok(Json(student.into()))
}

/// POST /v1/students
///
/// Create a student, booking the given slots when a teacher is assigned.
pub async fn create_student(
    State(state): State<AppState>,
    Json(request): Json<CreateStudentRequest>,
) -> Result<(StatusCode, Json<StudentDto>), AppError> {
    let student = state
        .students
        .create(NewStudent {
            name: request.name,
            phone: request.phone,
            subscription_type: request.subscription_type,
            teacher_id: request.teacher_id.map(TeacherId),
            scheduled_appointments: slot_keys(&request.scheduled_appointments),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(student.into())))
}

/// PUT /v1/students/{id}
///
/// Edit a student; teacher/slot changes go through rebook semantics.
pub async fn update_student(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
    Json(request): Json<UpdateStudentRequest>,
) -> HandlerResult<StudentDto> {
    let student = state
        .students
        .update(
            StudentId(student_id),
            StudentUpdate {
                name: request.name,
                phone: request.phone,
                subscription_type: request.subscription_type,
                teacher_id: request.teacher_id.map(TeacherId),
                scheduled_appointments: request
                    .scheduled_appointments
                    .as_deref()
                    .map(slot_keys),
            },
        )
        .await?;
    Ok(Json(student.into()))
}

/// POST /v1/students/{id}/archive
pub async fn archive_student(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
    Json(request): Json<ArchiveRequest>,
) -> HandlerResult<StudentDto> {
    let student = state
        .archive
        .archive(StudentId(student_id), request.reason)
        .await?;
    Ok(Json(student.into()))
}

/// PUT /v1/students/{id}/unarchive
pub async fn unarchive_student(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
) -> HandlerResult<StudentDto> {
    let student = state.archive.unarchive(StudentId(student_id)).await?;
    Ok(Json(student.into()))
}

/// POST /v1/students/{id}/trial-conversion
pub async fn trial_conversion(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
    Json(request): Json<TrialConversionRequest>,
) -> HandlerResult<StudentDto> {
    let student = state
        .trial
        .apply(StudentId(student_id), request.into())
        .await?;
    Ok(Json(student.into()))
}

// =============================================================================
// Sessions
// =============================================================================

/// PUT /v1/teachers/sessions/{session_id}/update-status
///
/// 403 when the acting teacher doesn't own the session.
pub async fn update_session_status(
    State(state): State<AppState>,
    Path(session_id): Path<uuid::Uuid>,
    Json(request): Json<UpdateSessionStatusRequest>,
) -> HandlerResult<crate::models::Session> {
    let session = update_status(
        state.repository.as_ref(),
        &state.policy,
        SessionId(session_id),
        TeacherId(request.teacher_id),
        SessionStatusUpdate {
            status: request.status,
            report: request.report,
        },
    )
    .await?;
    Ok(Json(session))
}

// =============================================================================
// Settlement
// =============================================================================

/// POST /v1/finance/reports/trigger-monthly-summary
///
/// Manual re-run of the financial aggregation job. 409 when a settlement run
/// is already in flight.
pub async fn trigger_monthly_summary(
    State(state): State<AppState>,
    Json(request): Json<TriggerMonthlySummaryRequest>,
) -> HandlerResult<AccountingSummary> {
    let month = MonthKey::new(request.year, request.month)
        .map_err(AppError::BadRequest)?;

    match state.settlement.aggregate_month(month).await? {
        SettlementOutcome::Completed(summary) => Ok(Json(summary)),
        SettlementOutcome::Skipped => Err(AppError::SettlementBusy),
    }
}

/// GET /v1/finance/reports/monthly-summary/{year}/{month}
pub async fn get_monthly_summary(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> HandlerResult<AccountingSummary> {
    let key = MonthKey::new(year, month).map_err(AppError::BadRequest)?;
    let summary = state
        .repository
        .get_summary(key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No summary for {}", key)))?;
    Ok(Json(summary))
}
