use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Rejected locally, before any network call.
    #[error("{0}")]
    Validation(String),

    #[error("Unauthorized - session may be expired")]
    Unauthorized,

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Fallback when the server provides no readable message
const GENERIC_FAILURE: &str = "Request failed";

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..MAX_ERROR_BODY_LENGTH],
                body.len()
            )
        }
    }

    /// Extract the human-readable message the backend embeds in error
    /// bodies, checking the keys it actually uses.
    fn server_message(body: &str) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        for key in ["error", "message", "detail"] {
            if let Some(message) = value.get(key).and_then(|v| v.as_str()) {
                if !message.is_empty() {
                    return Some(message.to_string());
                }
            }
        }
        None
    }

    fn display_message(body: &str) -> String {
        Self::server_message(body).unwrap_or_else(|| {
            if body.trim().is_empty() {
                GENERIC_FAILURE.to_string()
            } else {
                Self::truncate_body(body)
            }
        })
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            400 => ApiError::BadRequest(Self::display_message(body)),
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden(Self::display_message(body)),
            404 => ApiError::NotFound(Self::display_message(body)),
            500..=599 => ApiError::ServerError(Self::display_message(body)),
            _ => ApiError::InvalidResponse(format!(
                "Status {}: {}",
                status,
                Self::display_message(body)
            )),
        }
    }
}
