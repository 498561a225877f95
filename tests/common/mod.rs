//! Shared helpers for integration tests: an in-process stub of the
//! Traindesk backend plus session fixtures.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::http::{header, HeaderMap};
use axum::Router;
use chrono::Utc;

use traindesk::auth::SessionData;
use traindesk::models::{Role, UserProfile};
use traindesk::{ApiClient, SessionManager, SessionStore};

/// Install a subscriber once so `RUST_LOG=debug` surfaces gateway traces
/// when a test misbehaves.
fn init_logging() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Serve a stub router on an OS-assigned port and return the API base URL.
/// The server task lives until the test process exits.
pub async fn serve(router: Router) -> String {
    init_logging();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub listener addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("stub server");
    });
    format!("http://{}/api", addr)
}

/// Extract the bearer token from a request, if any.
pub fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|s| s.to_string())
}

pub fn sample_profile(role: Role) -> UserProfile {
    UserProfile {
        id: 1,
        username: "alice".to_string(),
        email: "alice@example.com".to_string(),
        first_name: "Alice".to_string(),
        last_name: "Nguyen".to_string(),
        role,
        is_active: true,
        created_at: Utc::now(),
    }
}

/// Wire-shaped user object for stub responses.
pub fn user_json(id: i64, username: &str, role: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "username": username,
        "email": format!("{}@example.com", username),
        "first_name": "Alice",
        "last_name": "Nguyen",
        "role": role,
        "is_active": true,
        "created_at": "2025-03-01T09:30:00Z",
    })
}

/// Build a manager whose session files live under `dir`.
pub fn manager_at(base_url: &str, dir: &Path) -> SessionManager {
    let store = Arc::new(SessionStore::new(dir.to_path_buf()));
    let client = ApiClient::new(base_url, Arc::clone(&store)).expect("api client");
    SessionManager::new(client, store)
}

/// Install an already-authenticated session, as if login had succeeded.
pub fn establish(manager: &SessionManager, access: &str, refresh: Option<&str>) {
    manager
        .store()
        .establish(SessionData {
            access_token: access.to_string(),
            refresh_token: refresh.map(String::from),
            user: sample_profile(Role::Trainee),
        })
        .expect("establish session");
}
