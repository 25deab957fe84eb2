//! # Client Error Types
//!
//! Errors raised while talking to the backend, loading configuration, or
//! driving the register dialog, plus the notice shape the UI displays.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Backend             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Http           │  │  Unauthorized/Forbidden │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │  NotFound / Validation  │ │
//! │  │  ConfigLoad/Save│  │                 │  │  Server / InvalidResp.  │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │     Scope       │  │     Domain      │   all of them ──► UserNotice │
//! │  │                 │  │                 │                              │
//! │  │  ScopeChanged   │  │  Core           │                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use kaha_core::{CoreError, ValidationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // =========================================================================
    // Backend Errors
    // =========================================================================
    #[error("Not signed in or session expired")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// 400/422 with the backend's message.
    #[error("{0}")]
    Validation(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    // =========================================================================
    // Scope & Domain Errors
    // =========================================================================
    /// The branch/tenant changed while the request was in flight; the
    /// response was dropped.
    #[error("Scope changed while loading {resource}; response discarded")]
    ScopeChanged { resource: &'static str },

    #[error(transparent)]
    Core(#[from] CoreError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<ValidationError> for ClientError {
    fn from(err: ValidationError) -> Self {
        ClientError::Core(CoreError::Validation(err))
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::InvalidResponse(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// Returns true if repeating the same call may succeed.
    ///
    /// ## Retryable Errors
    /// - Connection failures and timeouts
    /// - 5xx responses
    /// - Responses dropped because the scope changed
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Http(err) => err.is_timeout() || err.is_connect() || err.is_request(),
            ClientError::Server { status, .. } => *status >= 500,
            ClientError::ScopeChanged { .. } => true,
            _ => false,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::InvalidUrl(_)
                | ClientError::ConfigLoadFailed(_)
                | ClientError::ConfigSaveFailed(_)
        )
    }

    /// Builds an error from a non-success HTTP status and the backend's message.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => ClientError::Unauthorized,
            403 => ClientError::Forbidden(message),
            404 => ClientError::NotFound(message),
            400 | 422 => ClientError::Validation(message),
            _ => ClientError::Server { status, message },
        }
    }
}

// =============================================================================
// User Notice
// =============================================================================

/// What the UI shows when an operation fails or degrades.
///
/// ```json
/// { "code": "VALIDATION_ERROR", "message": "cash register is required" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserNotice {
    pub code: NoticeCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoticeCode {
    /// Local check failed; nothing was sent.
    ValidationError,
    /// The backend could not be reached.
    NetworkError,
    /// The backend answered with an error.
    ServerError,
    NotFound,
    /// The dialog is not in a state that allows the action.
    InvalidState,
}

impl UserNotice {
    pub fn new(code: NoticeCode, message: impl Into<String>) -> Self {
        UserNotice {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        UserNotice::new(NoticeCode::ValidationError, message)
    }
}

impl std::fmt::Display for UserNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<CoreError> for UserNotice {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => UserNotice::validation(v.to_string()),
            CoreError::RegisterNotFound(id) => {
                UserNotice::new(NoticeCode::NotFound, format!("Cash register not found: {id}"))
            }
            err @ CoreError::InvalidDialogState { .. } => {
                UserNotice::new(NoticeCode::InvalidState, err.to_string())
            }
        }
    }
}

impl From<ClientError> for UserNotice {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Core(core) => core.into(),
            ClientError::Validation(message) => UserNotice::validation(message),
            ClientError::NotFound(message) => UserNotice::new(NoticeCode::NotFound, message),
            ClientError::Http(e) => {
                tracing::warn!(error = %e, "Backend unreachable");
                UserNotice::new(NoticeCode::NetworkError, "Could not reach the server")
            }
            ClientError::Server { status, message } => {
                tracing::error!(status, %message, "Backend error");
                UserNotice::new(NoticeCode::ServerError, message)
            }
            other => UserNotice::new(NoticeCode::ServerError, other.to_string()),
        }
    }
}
