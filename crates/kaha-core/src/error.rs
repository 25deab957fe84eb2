//! # Error Types
//!
//! Domain-specific error types for kaha-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kaha-core errors (this file)                                          │
//! │  ├── CoreError        - Dialog/state violations                        │
//! │  └── ValidationError  - Input validation failures (pre-network)        │
//! │                                                                         │
//! │  kaha-client errors (separate crate)                                   │
//! │  ├── ClientError      - HTTP, config and scope failures                │
//! │  └── UserNotice       - What the UI shows (serialized)                 │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ClientError → UserNotice          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The requested register is not in the loaded register list.
    #[error("Cash register not found: {0}")]
    RegisterNotFound(i64),

    /// An operation was attempted in a dialog state that does not allow it.
    ///
    /// ## When This Occurs
    /// - Editing counts while an open/close request is in flight
    /// - Confirming a shortage when no confirmation is pending
    /// - Submitting while the dialog is closed
    #[error("Cannot {operation} while the register dialog is {state}")]
    InvalidDialogState {
        operation: &'static str,
        state: &'static str,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    MustBeNonNegative { field: String },

    /// Invalid format (e.g., a non-numeric amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;
