//! Session lifecycle operations.
//!
//! `SessionManager` ties the [`SessionStore`] to the API client and owns
//! the authentication flows: login, registration, logout, startup
//! validation, and profile maintenance. It is an explicit context object;
//! construct one at process start and inject it where needed.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::config::Config;
use crate::models::{ProfileUpdate, Registration, UserProfile};

use super::{CredentialStore, SessionData, SessionState, SessionStore};

pub struct SessionManager {
    store: Arc<SessionStore>,
    client: ApiClient,
}

impl SessionManager {
    pub fn new(client: ApiClient, store: Arc<SessionStore>) -> Self {
        Self { store, client }
    }

    /// Build a manager with the configured API origin and session directory.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = Arc::new(SessionStore::new(config.session_dir()?));
        let client = ApiClient::new(&config.api_url, Arc::clone(&store))?;
        Ok(Self::new(client, store))
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn state(&self) -> SessionState {
        self.store.state()
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.store.user()
    }

    /// Authenticate and install the session atomically.
    ///
    /// On failure the store is left untouched and the server's error is
    /// returned.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserProfile> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(ApiError::validation("Username and password are required").into());
        }

        let response = self
            .client
            .login(username, password)
            .await
            .context("Login failed")?;

        let user = response.user.clone();
        self.store
            .establish(SessionData {
                access_token: response.access,
                refresh_token: Some(response.refresh),
                user: response.user,
            })
            .context("Failed to persist session")?;

        info!(username, "Logged in");
        Ok(user)
    }

    /// Login using a password previously stored with [`Self::remember`].
    pub async fn login_remembered(&self, username: &str) -> Result<UserProfile> {
        let password = CredentialStore::get_password(username)?;
        self.login(username, &password).await
    }

    /// Store the password in the OS keychain for [`Self::login_remembered`].
    pub fn remember(&self, username: &str, password: &str) -> Result<()> {
        CredentialStore::store(username, password)
    }

    /// Remove a remembered password from the OS keychain.
    pub fn forget(&self, username: &str) -> Result<()> {
        CredentialStore::delete(username)
    }

    /// Create an account. Succeeding does NOT log the new user in; the
    /// tokens in the server's response are discarded and the caller must
    /// login explicitly.
    pub async fn register(&self, registration: &Registration) -> Result<()> {
        if registration.username.trim().is_empty()
            || registration.email.trim().is_empty()
            || registration.password.is_empty()
            || registration.first_name.trim().is_empty()
            || registration.last_name.trim().is_empty()
        {
            return Err(ApiError::validation("All registration fields are required").into());
        }

        let _ = self
            .client
            .register(registration)
            .await
            .context("Registration failed")?;
        Ok(())
    }

    /// Log out. The server-side refresh-token invalidation is best effort;
    /// local state is cleared unconditionally.
    pub async fn logout(&self) {
        if let Some(refresh) = self.store.refresh_token() {
            if let Err(e) = self.client.logout(&refresh).await {
                warn!(error = %e, "Server-side logout failed");
            }
        }
        self.store.clear();
        info!("Logged out");
    }

    /// Validate any persisted session against the server.
    ///
    /// Every path lands in a definite state: `Authenticated` when the
    /// stored token still works (the profile is refreshed from the server),
    /// `Anonymous` otherwise, with all persisted keys cleared.
    pub async fn validate_on_startup(&self) -> SessionState {
        match self.store.load() {
            Ok(true) => {}
            Ok(false) => {
                // Remove any partial leftovers, e.g. an orphaned token file.
                self.store.clear();
                return SessionState::Anonymous;
            }
            Err(e) => {
                warn!(error = %e, "Failed to load persisted session");
                self.store.clear();
                return SessionState::Anonymous;
            }
        }

        match self.client.fetch_profile().await {
            Ok(user) => {
                if let Err(e) = self.store.replace_user(user) {
                    warn!(error = %e, "Failed to persist refreshed profile");
                }
                self.store.confirm_authenticated();
                info!("Restored session from disk");
                SessionState::Authenticated
            }
            Err(e) => {
                debug!(error = %e, "Startup validation failed, clearing session");
                self.store.clear();
                SessionState::Anonymous
            }
        }
    }

    /// Update the profile; the stored record is replaced as a whole.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile> {
        let user = self
            .client
            .update_profile(update)
            .await
            .context("Profile update failed")?;
        self.store
            .replace_user(user.clone())
            .context("Failed to persist updated profile")?;
        Ok(user)
    }

    pub async fn change_password(&self, old_password: &str, new_password: &str) -> Result<()> {
        if old_password.is_empty() || new_password.is_empty() {
            return Err(ApiError::validation("Both passwords are required").into());
        }
        self.client
            .change_password(old_password, new_password)
            .await
            .context("Password change failed")?;
        Ok(())
    }
}
