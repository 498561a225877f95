//! Typed endpoint round-trips: modules, assignments, dashboards, and the
//! optimistic message flow.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use traindesk::models::{MessageLog, NewModule};
use traindesk::ApiError;

fn module_json(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": "Safe operation basics",
        "content": "Long form content...",
        "duration_minutes": 45,
        "created_by": common::user_json(2, "coach", "instructor"),
        "is_active": true,
        "created_at": "2025-02-01T08:00:00Z",
        "updated_at": "2025-02-01T08:00:00Z",
    })
}

#[tokio::test]
async fn module_create_and_list_round_trip() {
    let received = Arc::new(Mutex::new(None::<Value>));
    let sink = Arc::clone(&received);

    let app = Router::new()
        .route(
            "/api/modules/",
            post(move |Json(body): Json<Value>| {
                let sink = Arc::clone(&sink);
                async move {
                    *sink.lock().unwrap() = Some(body);
                    (StatusCode::CREATED, Json(module_json(3, "Forklift Safety")))
                }
            })
            .get(|| async { Json(json!([module_json(3, "Forklift Safety")])) }),
        );

    let base = common::serve(app).await;
    let dir = tempfile::tempdir().unwrap();
    let manager = common::manager_at(&base, dir.path());
    common::establish(&manager, "a1", Some("r1"));

    let new_module = NewModule {
        title: "Forklift Safety".to_string(),
        description: "Safe operation basics".to_string(),
        content: "Long form content...".to_string(),
        duration_minutes: 45,
    };
    let created = manager.client().create_module(&new_module).await.unwrap();
    assert_eq!(created.id, 3);
    assert_eq!(created.created_by.role, traindesk::models::Role::Instructor);

    let body = received.lock().unwrap().clone().unwrap();
    assert_eq!(body["title"], "Forklift Safety");
    assert_eq!(body["duration_minutes"], 45);

    let modules = manager.client().list_modules().await.unwrap();
    assert_eq!(modules.len(), 1);
    assert_eq!(modules[0].title, "Forklift Safety");
}

#[tokio::test]
async fn module_delete_hits_the_right_path() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);

    let app = Router::new().route(
        "/api/modules/3/",
        delete(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                StatusCode::NO_CONTENT
            }
        }),
    );

    let base = common::serve(app).await;
    let dir = tempfile::tempdir().unwrap();
    let manager = common::manager_at(&base, dir.path());
    common::establish(&manager, "a1", Some("r1"));

    manager.client().delete_module(3).await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn bulk_assignment_outcome_is_reported() {
    let app = Router::new().route(
        "/api/modules/3/assign/",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["trainee_ids"], json!([11, 12, 99]));
            (
                StatusCode::CREATED,
                Json(json!({
                    "assigned": [201, 202],
                    "total_requested": 3,
                    "successfully_assigned": 2,
                    "errors": ["Trainee with ID 99 not found"],
                })),
            )
        }),
    );

    let base = common::serve(app).await;
    let dir = tempfile::tempdir().unwrap();
    let manager = common::manager_at(&base, dir.path());
    common::establish(&manager, "a1", Some("r1"));

    let outcome = manager
        .client()
        .assign_module(3, &[11, 12, 99])
        .await
        .unwrap();
    assert!(!outcome.all_assigned());
    assert_eq!(outcome.assigned, vec![201, 202]);
    assert_eq!(outcome.errors.len(), 1);
}

#[tokio::test]
async fn dashboards_parse_server_shapes() {
    let app = Router::new()
        .route(
            "/api/dashboard/trainee/",
            get(|| async {
                Json(json!({
                    "user": common::user_json(1, "alice", "trainee"),
                    "progress": {
                        "total_assigned": 4,
                        "completed": 1,
                        "pending": 3,
                        "completion_percentage": 25.0,
                    },
                    "assigned_modules": [{
                        "id": 201,
                        "module": module_json(3, "Forklift Safety"),
                        "is_completed": false,
                        "assigned_at": "2025-02-02T08:00:00Z",
                        "completed_at": null,
                    }],
                }))
            }),
        )
        .route(
            "/api/dashboard/instructor/",
            get(|| async {
                Json(json!({
                    "total_trainees": 2,
                    "total_modules": 1,
                    "assigned_modules_count": 1,
                    "unassigned_modules_count": 0,
                    "trainees": [
                        {"id": 1, "username": "alice", "completion_percentage": 25},
                        {"id": 4, "username": "dana", "completion_percentage": 100},
                    ],
                    "modules": [{
                        "id": 3,
                        "title": "Forklift Safety",
                        "assigned_count": 2,
                        "completed_count": 1,
                        "completion_rate": 50.0,
                    }],
                    "progress_distribution": {"0": 0, "25": 1, "50": 0, "75": 0, "100": 1},
                    "assignment_status_summary": {
                        "completed": 1,
                        "in_progress": 0,
                        "not_started": 1,
                        "total": 2,
                    },
                }))
            }),
        );

    let base = common::serve(app).await;
    let dir = tempfile::tempdir().unwrap();
    let manager = common::manager_at(&base, dir.path());
    common::establish(&manager, "a1", Some("r1"));

    let trainee = manager.client().trainee_dashboard().await.unwrap();
    assert_eq!(trainee.progress.total_assigned, 4);
    assert_eq!(trainee.assigned_modules.len(), 1);
    assert!(!trainee.assigned_modules[0].is_completed);

    let instructor = manager.client().instructor_dashboard().await.unwrap();
    assert_eq!(instructor.total_trainees, 2);
    assert_eq!(instructor.progress_distribution.quarter, 1);
    assert_eq!(instructor.progress_distribution.complete, 1);
    assert_eq!(instructor.assignment_status_summary.total, 2);
}

#[tokio::test]
async fn role_mismatch_surfaces_as_forbidden() {
    let app = Router::new().route(
        "/api/trainees/",
        get(|| async {
            (
                StatusCode::FORBIDDEN,
                Json(json!({"error": "Only instructors can view trainees."})),
            )
        }),
    );

    let base = common::serve(app).await;
    let dir = tempfile::tempdir().unwrap();
    let manager = common::manager_at(&base, dir.path());
    common::establish(&manager, "a1", Some("r1"));

    let err = manager.client().list_trainees().await.unwrap_err();
    match err {
        ApiError::Forbidden(message) => {
            assert_eq!(message, "Only instructors can view trainees.")
        }
        other => panic!("expected Forbidden, got {:?}", other),
    }
}

#[tokio::test]
async fn progress_fan_out_covers_every_trainee() {
    let app = Router::new().route(
        "/api/instructor/trainees/:id/progress/",
        get(|Path(id): Path<i64>| async move {
            Json(json!({
                "trainee": common::user_json(id, &format!("trainee{}", id), "trainee"),
                "total_assigned": 2,
                "completed": 1,
                "pending": 1,
                "completion_percentage": 50.0,
                "assignments": [],
            }))
        }),
    );

    let base = common::serve(app).await;
    let dir = tempfile::tempdir().unwrap();
    let manager = common::manager_at(&base, dir.path());
    common::establish(&manager, "a1", Some("r1"));

    let reports = manager
        .client()
        .fetch_all_trainee_progress(&[1, 4, 7])
        .await
        .unwrap();
    assert_eq!(reports.len(), 3);
    let mut ids: Vec<i64> = reports.iter().map(|r| r.trainee.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 4, 7]);
}

#[tokio::test]
async fn optimistic_message_confirmed_after_send_and_fetch() {
    // The stub keeps a conversation thread: sends append, fetches return it.
    let thread = Arc::new(Mutex::new(Vec::<Value>::new()));

    let send_thread = Arc::clone(&thread);
    let fetch_thread = Arc::clone(&thread);

    let app = Router::new()
        .route(
            "/api/messages/send/",
            post(move |Json(body): Json<Value>| {
                let thread = Arc::clone(&send_thread);
                async move {
                    let mut thread = thread.lock().unwrap();
                    let id = thread.len() as i64 + 1;
                    thread.push(json!({
                        "id": id,
                        "sender": 1,
                        "recipient": 2,
                        "content": body["content"].clone(),
                        "timestamp": Utc::now().to_rfc3339(),
                    }));
                    (
                        StatusCode::CREATED,
                        Json(json!({"message": "Message sent to all instructors."})),
                    )
                }
            }),
        )
        .route(
            "/api/messages/my/",
            get(move || {
                let thread = Arc::clone(&fetch_thread);
                async move { Json(Value::Array(thread.lock().unwrap().clone())) }
            }),
        );

    let base = common::serve(app).await;
    let dir = tempfile::tempdir().unwrap();
    let manager = common::manager_at(&base, dir.path());
    common::establish(&manager, "a1", Some("r1"));

    let mut log = MessageLog::new();
    log.push_pending("When is the next safety session?");
    assert_eq!(log.pending_count(), 1);

    manager
        .client()
        .send_message("When is the next safety session?")
        .await
        .unwrap();

    let authoritative = manager.client().my_messages().await.unwrap();
    log.reconcile(authoritative);

    // The local entry was matched to the server's copy.
    assert_eq!(log.entries().len(), 1);
    assert_eq!(log.pending_count(), 0);
    assert_eq!(log.entries()[0].content(), "When is the next safety session?");
}

#[tokio::test]
async fn instructor_reply_round_trip() {
    let app = Router::new().route(
        "/api/messages/5/reply/",
        post(|Json(body): Json<Value>| async move {
            (
                StatusCode::CREATED,
                Json(json!({
                    "id": 6,
                    "sender": 2,
                    "recipient": 1,
                    "content": body["content"].clone(),
                    "timestamp": "2025-03-02T10:00:00Z",
                })),
            )
        }),
    );

    let base = common::serve(app).await;
    let dir = tempfile::tempdir().unwrap();
    let manager = common::manager_at(&base, dir.path());
    common::establish(&manager, "a1", Some("r1"));

    let reply = manager
        .client()
        .reply(5, "Thursday at 9am.")
        .await
        .unwrap();
    assert_eq!(reply.id, 6);
    assert_eq!(reply.recipient, 1);
    assert_eq!(reply.content, "Thursday at 9am.");
}
