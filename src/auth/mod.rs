//! Authentication module for managing user sessions and credentials.
//!
//! This module provides:
//! - `SessionStore`: durable session state with a defined lifecycle
//! - `SessionManager`: login/logout/registration/startup-validation flows
//! - `CredentialStore`: secure OS-level credential storage via keyring

pub mod credentials;
pub mod manager;
pub mod session;

pub use credentials::CredentialStore;
pub use manager::SessionManager;
pub use session::{SessionData, SessionState, SessionStore};
