//! Typed client for the Traindesk REST API.
//!
//! Thin endpoint methods over the [`Gateway`]; every call inherits bearer
//! attachment and the single refresh-and-retry cycle. Statuses other than
//! 401 surface as [`ApiError`] values for the caller to interpret.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::auth::SessionStore;
use crate::models::{
    AssignmentOutcome, InstructorDashboard, Message, ModuleAssignment, NewModule, ProfileUpdate,
    Registration, TraineeDashboard, TraineeProgressReport, TrainingModule, UserProfile,
};

use super::{ApiError, Gateway};

/// Maximum concurrent API requests for fan-out fetches.
/// Keeps bulk progress lookups from overwhelming the backend.
const MAX_CONCURRENT_REQUESTS: usize = 10;

/// Successful authentication payload. The session layer takes ownership of
/// the tokens; registration discards them.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub user: UserProfile,
}

/// API client for the training platform.
/// Clone is cheap - the gateway (and its connection pool) is shared.
#[derive(Clone)]
pub struct ApiClient {
    gateway: Arc<Gateway>,
}

impl ApiClient {
    pub fn new(base_url: &str, store: Arc<SessionStore>) -> Result<Self, ApiError> {
        Ok(Self {
            gateway: Arc::new(Gateway::new(base_url, store)?),
        })
    }

    /// Register the callback fired on irrecoverable authentication failure.
    pub fn on_session_expired(&self, hook: impl Fn() + Send + Sync + 'static) {
        self.gateway.on_session_expired(hook);
    }

    // ===== Authentication =====

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        self.gateway
            .post(
                "auth/login/",
                &serde_json::json!({ "username": username, "password": password }),
            )
            .await
    }

    pub async fn register(&self, registration: &Registration) -> Result<LoginResponse, ApiError> {
        self.gateway.post("auth/register/", registration).await
    }

    /// Ask the server to invalidate a refresh token.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), ApiError> {
        let _: Value = self
            .gateway
            .post("auth/logout/", &serde_json::json!({ "refresh": refresh_token }))
            .await?;
        Ok(())
    }

    // ===== Profile =====

    pub async fn fetch_profile(&self) -> Result<UserProfile, ApiError> {
        self.gateway.get("user/profile/").await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ApiError> {
        self.gateway.put("user/profile/", update).await
    }

    pub async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        let _: Value = self
            .gateway
            .post(
                "user/change-password/",
                &serde_json::json!({
                    "old_password": old_password,
                    "new_password": new_password,
                }),
            )
            .await?;
        Ok(())
    }

    // ===== Training modules =====

    pub async fn list_modules(&self) -> Result<Vec<TrainingModule>, ApiError> {
        self.gateway.get("modules/").await
    }

    pub async fn fetch_module(&self, module_id: i64) -> Result<TrainingModule, ApiError> {
        self.gateway.get(&format!("modules/{}/", module_id)).await
    }

    pub async fn create_module(&self, module: &NewModule) -> Result<TrainingModule, ApiError> {
        self.gateway.post("modules/", module).await
    }

    pub async fn update_module(
        &self,
        module_id: i64,
        module: &NewModule,
    ) -> Result<TrainingModule, ApiError> {
        self.gateway
            .put(&format!("modules/{}/", module_id), module)
            .await
    }

    pub async fn delete_module(&self, module_id: i64) -> Result<(), ApiError> {
        self.gateway.delete(&format!("modules/{}/", module_id)).await
    }

    /// Assign a module to a set of trainees in one call.
    pub async fn assign_module(
        &self,
        module_id: i64,
        trainee_ids: &[i64],
    ) -> Result<AssignmentOutcome, ApiError> {
        debug!(module_id, count = trainee_ids.len(), "Assigning module");
        self.gateway
            .post(
                &format!("modules/{}/assign/", module_id),
                &serde_json::json!({ "trainee_ids": trainee_ids }),
            )
            .await
    }

    pub async fn list_assignments(
        &self,
        module_id: Option<i64>,
    ) -> Result<Vec<ModuleAssignment>, ApiError> {
        let path = match module_id {
            Some(id) => format!("assignments/?module_id={}", id),
            None => "assignments/".to_string(),
        };
        self.gateway.get(&path).await
    }

    // ===== Trainee =====

    pub async fn trainee_dashboard(&self) -> Result<TraineeDashboard, ApiError> {
        self.gateway.get("dashboard/trainee/").await
    }

    pub async fn trainee_modules(&self) -> Result<Vec<ModuleAssignment>, ApiError> {
        self.gateway.get("trainee/modules/").await
    }

    pub async fn mark_completed(&self, assignment_id: i64) -> Result<ModuleAssignment, ApiError> {
        self.gateway
            .post(
                &format!("trainee/complete/{}/", assignment_id),
                &serde_json::json!({}),
            )
            .await
    }

    // ===== Instructor =====

    pub async fn instructor_dashboard(&self) -> Result<InstructorDashboard, ApiError> {
        self.gateway.get("dashboard/instructor/").await
    }

    pub async fn list_trainees(&self) -> Result<Vec<UserProfile>, ApiError> {
        self.gateway.get("trainees/").await
    }

    pub async fn trainee_progress(
        &self,
        trainee_id: i64,
    ) -> Result<TraineeProgressReport, ApiError> {
        self.gateway
            .get(&format!("instructor/trainees/{}/progress/", trainee_id))
            .await
    }

    pub async fn delete_trainee(&self, trainee_id: i64) -> Result<(), ApiError> {
        self.gateway
            .delete(&format!("trainees/{}/delete/", trainee_id))
            .await
    }

    /// Fetch progress reports for many trainees with bounded concurrency.
    /// The reports come back in completion order, not input order.
    pub async fn fetch_all_trainee_progress(
        &self,
        trainee_ids: &[i64],
    ) -> Result<Vec<TraineeProgressReport>, ApiError> {
        let results: Vec<Result<TraineeProgressReport, ApiError>> =
            stream::iter(trainee_ids.iter().copied())
                .map(|id| self.trainee_progress(id))
                .buffer_unordered(MAX_CONCURRENT_REQUESTS)
                .collect()
                .await;
        results.into_iter().collect()
    }

    // ===== Messages =====

    /// Send a message to the instructors (trainee side).
    pub async fn send_message(&self, content: &str) -> Result<(), ApiError> {
        let _: Value = self
            .gateway
            .post("messages/send/", &serde_json::json!({ "content": content }))
            .await?;
        Ok(())
    }

    /// Messages received by the current instructor.
    pub async fn inbox(&self) -> Result<Vec<Message>, ApiError> {
        self.gateway.get("messages/inbox/").await
    }

    /// Reply to a received message (instructor side).
    pub async fn reply(&self, message_id: i64, content: &str) -> Result<Message, ApiError> {
        self.gateway
            .post(
                &format!("messages/{}/reply/", message_id),
                &serde_json::json!({ "content": content }),
            )
            .await
    }

    /// Messages received by the current trainee.
    pub async fn my_messages(&self) -> Result<Vec<Message>, ApiError> {
        self.gateway.get("messages/my/").await
    }
}
