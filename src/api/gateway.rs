//! Authenticated request gateway.
//!
//! Every outbound API call goes through the [`Gateway`]: it attaches the
//! current access token as a bearer credential and transparently recovers
//! from access-token expiry with a single refresh-and-retry cycle per
//! request. Requests are only ever built against the configured base
//! origin, so the token never leaves it.
//!
//! When recovery is impossible (no refresh token, or the refresh call
//! itself fails) the gateway clears the session store and fires the
//! registered session-expired hook; the consuming frontend uses the hook
//! to navigate to its login entry point.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::auth::SessionStore;

use super::ApiError;

/// HTTP request timeout in seconds.
/// Matches the platform's interactive feel: fail fast rather than hang.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Token refresh endpoint. Called with the refresh token in the body and
/// no bearer header.
const REFRESH_PATH: &str = "auth/token/refresh/";

/// Callback fired when the session cannot be recovered. Registered by the
/// frontend, which cannot assume any particular view is mounted when the
/// failure happens.
pub type SessionExpiredHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
}

/// A single in-flight request plus its retry state.
///
/// However many times the server answers 401, a given request is retried
/// at most once.
struct PendingRequest {
    method: Method,
    url: String,
    body: Option<Value>,
    /// Bearer token attached to the most recent attempt, if any.
    bearer: Option<String>,
    retried: bool,
}

pub struct Gateway {
    http: Client,
    base_url: String,
    store: Arc<SessionStore>,
    /// Serializes refresh attempts so a burst of concurrent 401s results
    /// in one refresh call.
    refresh_lock: Mutex<()>,
    expired_hook: RwLock<Option<SessionExpiredHook>>,
}

impl Gateway {
    pub fn new(base_url: &str, store: Arc<SessionStore>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
            refresh_lock: Mutex::new(()),
            expired_hook: RwLock::new(None),
        })
    }

    /// Register the callback fired on irrecoverable authentication failure.
    pub fn on_session_expired(&self, hook: impl Fn() + Send + Sync + 'static) {
        let mut slot = self
            .expired_hook
            .write()
            .unwrap_or_else(|e| e.into_inner());
        *slot = Some(Arc::new(hook));
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.execute(Method::GET, path, None).await?;
        Ok(response.json().await?)
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body)?;
        let response = self.execute(Method::POST, path, Some(body)).await?;
        Ok(response.json().await?)
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body)?;
        let response = self.execute(Method::PUT, path, Some(body)).await?;
        Ok(response.json().await?)
    }

    /// DELETE, discarding any response body (the backend answers 204).
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(Method::DELETE, path, None).await?;
        Ok(())
    }

    /// Send a request, running the refresh protocol on 401.
    ///
    /// The refresh is awaited to completion before the retry is issued,
    /// and the loop runs at most twice per request.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<reqwest::Response, ApiError> {
        let mut pending = PendingRequest {
            method,
            url: self.url_for(path),
            body,
            bearer: None,
            retried: false,
        };

        loop {
            let response = self.send(&mut pending).await?;

            if response.status() == StatusCode::UNAUTHORIZED && !pending.retried {
                pending.retried = true;
                debug!(url = %pending.url, "Access token rejected, attempting refresh");
                self.refresh_access_token(pending.bearer.as_deref()).await?;
                continue;
            }

            return Self::check(response).await;
        }
    }

    async fn send(&self, pending: &mut PendingRequest) -> Result<reqwest::Response, ApiError> {
        let mut request = self.http.request(pending.method.clone(), &pending.url);

        pending.bearer = self.store.access_token();
        if let Some(ref token) = pending.bearer {
            request = request.bearer_auth(token);
        }
        if let Some(ref body) = pending.body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// `stale` is the access token the failed attempt carried. Refreshes
    /// are serialized; a caller that acquires the lock after the stored
    /// token already changed skips the network call and just retries.
    async fn refresh_access_token(&self, stale: Option<&str>) -> Result<(), ApiError> {
        let _guard = self.refresh_lock.lock().await;

        if self.store.access_token().as_deref() != stale {
            debug!("Access token already refreshed by a concurrent request");
            return Ok(());
        }

        let Some(refresh_token) = self.store.refresh_token() else {
            warn!("No refresh token available, clearing session");
            self.store.clear();
            self.notify_expired();
            return Err(ApiError::Unauthorized);
        };

        let result = self
            .http
            .post(self.url_for(REFRESH_PATH))
            .json(&serde_json::json!({ "refresh": refresh_token }))
            .send()
            .await;

        let refreshed: Result<RefreshResponse, ApiError> = match result {
            Ok(response) if response.status().is_success() => {
                response.json().await.map_err(ApiError::from)
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                Err(ApiError::from_status(status, &body))
            }
            Err(e) => Err(e.into()),
        };

        match refreshed {
            Ok(r) => {
                if let Err(e) = self.store.replace_access_token(&r.access) {
                    // The in-memory token is still good; worst case the
                    // next startup validation lands in Anonymous.
                    warn!(error = %e, "Failed to persist refreshed access token");
                }
                debug!("Access token refreshed");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, clearing session");
                self.store.clear();
                self.notify_expired();
                Err(e)
            }
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn notify_expired(&self) {
        let hook = self
            .expired_hook
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        if let Some(hook) = hook {
            hook();
        }
    }
}
