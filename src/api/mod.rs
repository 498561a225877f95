//! REST API client module for the Traindesk platform.
//!
//! This module provides the authenticated [`Gateway`] (bearer attachment
//! plus the single refresh-and-retry protocol) and the typed [`ApiClient`]
//! built on top of it.
//!
//! The API uses JWT bearer authentication; access tokens are short-lived
//! and renewed through the refresh endpoint.

pub mod client;
pub mod error;
pub mod gateway;

pub use client::{ApiClient, LoginResponse};
pub use error::ApiError;
pub use gateway::{Gateway, SessionExpiredHook};
