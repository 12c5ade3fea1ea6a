//! Error types for the care-task and notification subsystem.
//!
//! Each variant carries a stable error code (SCREAMING_SNAKE_CASE) that is
//! included in the Display output and accessible via [`CareError::code()`].

use crate::notifications::types::PermissionStatus;

/// Stable error codes for programmatic error handling.
pub mod error_codes {
    /// Invalid recurrence rule or date input.
    pub const RULE_INVALID: &str = "RULE_INVALID";

    /// A task could not be turned into a notification payload.
    pub const BUILD_FAILED: &str = "BUILD_FAILED";

    /// An operation on the external notification scheduler failed.
    pub const SCHEDULER_FAILED: &str = "SCHEDULER_FAILED";

    /// Notifications are not authorized.
    pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";

    /// Invalid or unreadable configuration.
    pub const CONFIG_INVALID: &str = "CONFIG_INVALID";

    /// The task repository failed.
    pub const STORAGE_FAILED: &str = "STORAGE_FAILED";

    /// Filesystem I/O failed.
    pub const IO_ERROR: &str = "IO_ERROR";
}

/// Errors produced by the care calendar and notification components.
#[derive(Debug, thiserror::Error)]
pub enum CareError {
    /// Invalid recurrence or date input. A caller bug, never retried.
    #[error("[{}] {}", error_codes::RULE_INVALID, .0)]
    Rule(String),

    /// A task reached the payload builder with unusable data.
    #[error("[{}] {}", error_codes::BUILD_FAILED, .0)]
    Build(String),

    /// The external scheduler rejected or failed an operation.
    #[error("[{}] {}", error_codes::SCHEDULER_FAILED, .0)]
    Scheduler(String),

    /// Notification permission is not granted.
    #[error(
        "[{}] notifications permission not granted (status: {})",
        error_codes::PERMISSION_DENIED,
        .0
    )]
    Permission(PermissionStatus),

    /// Configuration could not be loaded, saved, or validated.
    #[error("[{}] {}", error_codes::CONFIG_INVALID, .0)]
    Config(String),

    /// Task repository failure.
    #[error("[{}] {}", error_codes::STORAGE_FAILED, .0)]
    Storage(String),

    /// I/O error.
    #[error("[{}] {}", error_codes::IO_ERROR, .0)]
    Io(#[from] std::io::Error),
}

impl CareError {
    /// Returns the stable error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Rule(_) => error_codes::RULE_INVALID,
            Self::Build(_) => error_codes::BUILD_FAILED,
            Self::Scheduler(_) => error_codes::SCHEDULER_FAILED,
            Self::Permission(_) => error_codes::PERMISSION_DENIED,
            Self::Config(_) => error_codes::CONFIG_INVALID,
            Self::Storage(_) => error_codes::STORAGE_FAILED,
            Self::Io(_) => error_codes::IO_ERROR,
        }
    }

    /// Returns true if a later attempt may succeed without any caller change.
    ///
    /// Scheduler failures self-heal on the next reconciliation pass. Rule,
    /// build and permission errors need the caller to act first.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Scheduler(_) | Self::Io(_))
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, CareError>;
