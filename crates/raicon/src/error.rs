//! Error types for registration and dispatch.

/// Errors that can occur while registering a handler or dispatching a page.
///
/// None of these are recovered internally: each aborts the current
/// registration or ready callback at the point of failure. A controller
/// mismatch is not an error.
#[derive(Debug, thiserror::Error)]
pub enum RaiconError {
    /// A registration was attempted without a target controller or handler.
    #[error("invalid arguments: missing {missing}")]
    InvalidArguments { missing: &'static str },

    /// The supplied handler is neither a constructor nor an instance.
    #[error("invalid handler for controller `{controller}`: got a value of type {found}")]
    InvalidHandler {
        controller: String,
        found: &'static str,
    },

    /// The handler has no callable member for the required action.
    #[error("invalid action `{action}` in handler for controller `{controller}`")]
    InvalidAction { action: String, controller: String },

    /// A handler action failed. The error is passed through untouched.
    #[error(transparent)]
    Handler(#[from] anyhow::Error),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[source] serde_json::Error),
}

impl RaiconError {
    /// Create an invalid-arguments error for the named missing input.
    pub fn missing(what: &'static str) -> Self {
        Self::InvalidArguments { missing: what }
    }

    /// Create an invalid-action error.
    pub fn invalid_action(action: impl Into<String>, controller: impl Into<String>) -> Self {
        Self::InvalidAction {
            action: action.into(),
            controller: controller.into(),
        }
    }
}

/// Result type used throughout the crate.
pub type Result<T, E = RaiconError> = std::result::Result<T, E>;
