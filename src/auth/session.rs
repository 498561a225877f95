//! Session state for the current user.
//!
//! `SessionStore` is the single source of truth for "is a user logged in,
//! and as whom". It holds the session in memory behind a lock and persists
//! it under a data directory as three independently removable files: the
//! access token, the refresh token, and the serialized user profile.

use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::UserProfile;

/// Access token file name in the session directory
const ACCESS_TOKEN_FILE: &str = "access_token";

/// Refresh token file name in the session directory
const REFRESH_TOKEN_FILE: &str = "refresh_token";

/// Serialized user profile file name in the session directory
const USER_FILE: &str = "user.json";

/// The authenticated identity and credentials held for the current user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub access_token: String,
    /// Absent when the persisted session predates the refresh token or the
    /// file was removed; the gateway then cannot recover from expiry.
    pub refresh_token: Option<String>,
    pub user: UserProfile,
}

/// Authentication lifecycle state.
///
/// `Unknown` is the startup state: a persisted session may exist but has
/// not been validated against the server yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unknown,
    Anonymous,
    Authenticated,
}

struct StoreInner {
    state: SessionState,
    session: Option<SessionData>,
}

pub struct SessionStore {
    session_dir: PathBuf,
    inner: RwLock<StoreInner>,
}

impl SessionStore {
    pub fn new(session_dir: PathBuf) -> Self {
        Self {
            session_dir,
            inner: RwLock::new(StoreInner {
                state: SessionState::Unknown,
                session: None,
            }),
        }
    }

    pub fn state(&self) -> SessionState {
        self.read().state
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().state == SessionState::Authenticated
    }

    pub fn access_token(&self) -> Option<String> {
        self.read()
            .session
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read()
            .session
            .as_ref()
            .and_then(|s| s.refresh_token.clone())
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.read().session.as_ref().map(|s| s.user.clone())
    }

    /// Load a persisted session into memory without validating it.
    ///
    /// Returns `Ok(true)` when an access token and user profile were found;
    /// the state stays `Unknown` until the caller validates the token.
    pub fn load(&self) -> Result<bool> {
        let access = self.read_file(ACCESS_TOKEN_FILE)?;
        let user_json = self.read_file(USER_FILE)?;
        let (Some(access_token), Some(user_json)) = (access, user_json) else {
            return Ok(false);
        };
        let user: UserProfile =
            serde_json::from_str(&user_json).context("Failed to parse stored user profile")?;
        let refresh_token = self.read_file(REFRESH_TOKEN_FILE)?;

        self.write().session = Some(SessionData {
            access_token,
            refresh_token,
            user,
        });
        Ok(true)
    }

    /// Install a freshly-authenticated session and persist it.
    pub fn establish(&self, data: SessionData) -> Result<()> {
        {
            let mut inner = self.write();
            inner.session = Some(data.clone());
            inner.state = SessionState::Authenticated;
        }
        self.persist(&data)
    }

    /// Mark the in-memory session as validated.
    pub fn confirm_authenticated(&self) {
        let mut inner = self.write();
        inner.state = if inner.session.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        };
    }

    /// Replace the access token in place, keeping the rest of the session.
    pub fn replace_access_token(&self, token: &str) -> Result<()> {
        {
            let mut inner = self.write();
            if let Some(ref mut session) = inner.session {
                session.access_token = token.to_string();
            }
        }
        self.write_file(ACCESS_TOKEN_FILE, token)
    }

    /// Replace the stored user profile in place.
    pub fn replace_user(&self, user: UserProfile) -> Result<()> {
        let contents = serde_json::to_string_pretty(&user)?;
        {
            let mut inner = self.write();
            if let Some(ref mut session) = inner.session {
                session.user = user;
            }
        }
        self.write_file(USER_FILE, &contents)
    }

    /// Unconditionally clear the session, in memory and on disk.
    ///
    /// Removal failures are logged, not surfaced: after `clear` the store is
    /// Anonymous no matter what.
    pub fn clear(&self) {
        {
            let mut inner = self.write();
            inner.session = None;
            inner.state = SessionState::Anonymous;
        }
        for name in [ACCESS_TOKEN_FILE, REFRESH_TOKEN_FILE, USER_FILE] {
            let path = self.session_dir.join(name);
            if path.exists() {
                if let Err(e) = std::fs::remove_file(&path) {
                    warn!(file = name, error = %e, "Failed to remove session file");
                }
            }
        }
    }

    fn persist(&self, data: &SessionData) -> Result<()> {
        self.write_file(ACCESS_TOKEN_FILE, &data.access_token)?;
        if let Some(ref refresh) = data.refresh_token {
            self.write_file(REFRESH_TOKEN_FILE, refresh)?;
        }
        let user_json = serde_json::to_string_pretty(&data.user)?;
        self.write_file(USER_FILE, &user_json)
    }

    fn read_file(&self, name: &str) -> Result<Option<String>> {
        let path = self.session_dir.join(name);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read session file: {}", name))?;
        Ok(Some(contents))
    }

    fn write_file(&self, name: &str, contents: &str) -> Result<()> {
        std::fs::create_dir_all(&self.session_dir)
            .context("Failed to create session directory")?;
        std::fs::write(self.session_dir.join(name), contents)
            .with_context(|| format!("Failed to write session file: {}", name))
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}
