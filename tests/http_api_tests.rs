//! End-to-end tests for the REST API over the in-memory repository.

use std::str::FromStr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use academy_backend::db::repo_config::BookingPolicy;
use academy_backend::db::repositories::LocalRepository;
use academy_backend::db::repository::{FullRepository, SessionRepository, TeacherRepository};
use academy_backend::http::{create_router, AppState};
use academy_backend::models::{
    DayOfWeek, Session, SlotKey, Teacher, TeacherId, TimeRange,
};

struct TestApp {
    router: Router,
    repo: Arc<LocalRepository>,
}

fn app() -> TestApp {
    let repo = Arc::new(LocalRepository::new());
    let full: Arc<dyn FullRepository> = repo.clone();
    let state = AppState::new(full, BookingPolicy::default());
    TestApp {
        router: create_router(state),
        repo,
    }
}

fn key(day: DayOfWeek, range: &str) -> SlotKey {
    (day, TimeRange::from_str(range).unwrap())
}

async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let request = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn sunday_quad() -> serde_json::Value {
    serde_json::json!([
        {"day_of_week": "sunday", "time_range": "09:00-09:30"},
        {"day_of_week": "sunday", "time_range": "09:30-10:00"},
        {"day_of_week": "tuesday", "time_range": "18:00-18:30"},
        {"day_of_week": "thursday", "time_range": "18:00-18:30"},
    ])
}

async fn create_teacher(app: &TestApp) -> i64 {
    let (status, body) = send(
        &app.router,
        "POST",
        "/v1/teachers",
        Some(serde_json::json!({
            "name": "Huda",
            "session_rate": 50.0,
            "slots": sunday_quad(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = send(&app.router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_create_student_with_booking_and_available_slots() {
    let app = app();
    let teacher_id = create_teacher(&app).await;

    let uri = format!("/v1/teachers/{}/available-slots", teacher_id);
    let (status, body) = send(&app.router, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slots"].as_array().unwrap().len(), 4);

    let (status, body) = send(
        &app.router,
        "POST",
        "/v1/students",
        Some(serde_json::json!({
            "name": "Omar",
            "phone": "0100000000",
            "subscription_type": "نصف ساعة / 4 حصص",
            "teacher_id": teacher_id,
            "scheduled_appointments": sunday_quad(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["teacher_id"].as_i64().unwrap(), teacher_id);
    assert_eq!(body["scheduled_appointments"].as_array().unwrap().len(), 4);

    // The whole grid is now booked
    let (_, body) = send(&app.router, "GET", &uri, None).await;
    assert_eq!(body["slots"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_quota_mismatch_is_bad_request() {
    let app = app();
    let teacher_id = create_teacher(&app).await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/v1/students",
        Some(serde_json::json!({
            "name": "Omar",
            "phone": "0100000000",
            "subscription_type": "نصف ساعة / 4 حصص",
            "teacher_id": teacher_id,
            "scheduled_appointments": [
                {"day_of_week": "sunday", "time_range": "09:00-09:30"},
            ],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "QUOTA_MISMATCH");
}

#[tokio::test]
async fn test_slot_unavailable_reports_holder() {
    let app = app();
    let teacher_id = create_teacher(&app).await;

    let student = serde_json::json!({
        "name": "Omar",
        "phone": "0100000000",
        "subscription_type": "نصف ساعة / 4 حصص",
        "teacher_id": teacher_id,
        "scheduled_appointments": sunday_quad(),
    });
    let (status, _) = send(&app.router, "POST", "/v1/students", Some(student)).await;
    assert_eq!(status, StatusCode::CREATED);

    let rival = serde_json::json!({
        "name": "Ali",
        "phone": "0100000001",
        "subscription_type": "نصف ساعة / 4 حصص",
        "teacher_id": teacher_id,
        "scheduled_appointments": sunday_quad(),
    });
    let (status, body) = send(&app.router, "POST", "/v1/students", Some(rival)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "SLOT_UNAVAILABLE");
    assert!(body["message"].as_str().unwrap().contains("Omar"));
}

#[tokio::test]
async fn test_duplicate_phone_conflict() {
    let app = app();

    let student = serde_json::json!({
        "name": "Omar",
        "phone": "0100000000",
        "subscription_type": "أخرى",
    });
    let (status, _) = send(&app.router, "POST", "/v1/students", Some(student.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app.router, "POST", "/v1/students", Some(student)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "PHONE_NUMBER_EXISTS");
}

#[tokio::test]
async fn test_archive_twice_is_rejected() {
    let app = app();
    let (status, body) = send(
        &app.router,
        "POST",
        "/v1/students",
        Some(serde_json::json!({
            "name": "Omar",
            "phone": "0100000000",
            "subscription_type": "أخرى",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let student_id = body["id"].as_i64().unwrap();

    let uri = format!("/v1/students/{}/archive", student_id);
    let reason = serde_json::json!({"reason": "moved away"});
    let (status, body) = send(&app.router, "POST", &uri, Some(reason.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_archived"], true);
    assert_eq!(body["archived_reason"], "moved away");

    let (status, body) = send(&app.router, "POST", &uri, Some(reason)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "ALREADY_ARCHIVED");

    // Unarchive restores the record
    let uri = format!("/v1/students/{}/unarchive", student_id);
    let (status, body) = send(&app.router, "PUT", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_archived"], false);
}

#[tokio::test]
async fn test_trial_conversion_on_non_trial_student() {
    let app = app();
    let (_, body) = send(
        &app.router,
        "POST",
        "/v1/students",
        Some(serde_json::json!({
            "name": "Omar",
            "phone": "0100000000",
            "subscription_type": "أخرى",
        })),
    )
    .await;
    let student_id = body["id"].as_i64().unwrap();

    let uri = format!("/v1/students/{}/trial-conversion", student_id);
    let (status, body) = send(
        &app.router,
        "POST",
        &uri,
        Some(serde_json::json!({
            "action": "decline",
            "reason": "n/a",
            "disposition": "cool_off",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "NOT_ON_TRIAL");
}

#[tokio::test]
async fn test_session_status_update_requires_owning_teacher() {
    let app = app();

    // Seed a session directly in the repository
    let owner = app
        .repo
        .store_teacher(&Teacher::new(TeacherId(0), "Huda", 50.0, &[]))
        .await
        .unwrap();
    let intruder = app
        .repo
        .store_teacher(&Teacher::new(TeacherId(0), "Sara", 60.0, &[]))
        .await
        .unwrap();
    let session = Session::scheduled(
        academy_backend::models::StudentId(1),
        owner,
        chrono::NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
        DayOfWeek::Sunday,
        key(DayOfWeek::Sunday, "09:00-09:30").1,
        false,
    );
    app.repo.append_sessions(&[session.clone()]).await.unwrap();

    let uri = format!("/v1/teachers/sessions/{}/update-status", session.id.0);
    let (status, body) = send(
        &app.router,
        "PUT",
        &uri,
        Some(serde_json::json!({
            "teacher_id": intruder.value(),
            "status": "attended",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "NOT_OWNER");
}

#[tokio::test]
async fn test_monthly_summary_trigger_and_fetch() {
    let app = app();

    use academy_backend::db::repository::FinanceRepository;
    use academy_backend::models::{Transaction, TransactionCategory, TransactionId};
    app.repo
        .add_transaction(&Transaction {
            id: TransactionId(0),
            date: chrono::NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
            category: TransactionCategory::Revenue,
            amount: 1200.0,
            description: "subscriptions".to_string(),
        })
        .await
        .unwrap();

    // Nothing stored yet
    let (status, _) = send(
        &app.router,
        "GET",
        "/v1/finance/reports/monthly-summary/2024/5",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app.router,
        "POST",
        "/v1/finance/reports/trigger-monthly-summary",
        Some(serde_json::json!({"year": 2024, "month": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["revenue"].as_f64().unwrap(), 1200.0);

    let (status, body) = send(
        &app.router,
        "GET",
        "/v1/finance/reports/monthly-summary/2024/5",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["net_profit"].as_f64().unwrap(), 1200.0);

    // Invalid month is rejected up front
    let (status, _) = send(
        &app.router,
        "POST",
        "/v1/finance/reports/trigger-monthly-summary",
        Some(serde_json::json!({"year": 2024, "month": 13})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
