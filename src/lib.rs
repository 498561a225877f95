//! Client core for the Traindesk training platform.
//!
//! This crate is the non-UI half of a Traindesk client: it owns the
//! authenticated session, talks to the platform's REST API, and exposes
//! typed domain models. A frontend builds on top of:
//!
//! - [`auth::SessionManager`] / [`auth::SessionStore`]: login, logout,
//!   registration, startup validation, and durable session state
//! - [`api::ApiClient`]: typed endpoint methods routed through the
//!   authenticated gateway with transparent access-token refresh
//! - [`models`]: users, training modules, assignments, dashboards, messages

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError};
pub use auth::{CredentialStore, SessionManager, SessionState, SessionStore};
pub use config::Config;
