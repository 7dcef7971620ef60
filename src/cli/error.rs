//! Errors caused by what the user typed or configured
//!
//! These are reported on stderr without the logged error trail that
//! internal failures get.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    /// A plugin name that no discovered manifest declares
    #[error("Unknown plugin '{name}'. Available plugins: {available}")]
    UnknownPlugin { name: String, available: String },

    /// Flag or setting value that cannot be used
    #[error("{message}")]
    InvalidArgument { message: String },
}

impl UsageError {
    pub fn unknown_plugin<S: Into<String>>(name: S, available: &[&str]) -> Self {
        Self::UnknownPlugin {
            name: name.into(),
            available: available.join(", "),
        }
    }

    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument { message: message.into() }
    }
}

/// True when `error`, or anything it wraps, is a [`UsageError`]
pub fn is_usage_error(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| cause.downcast_ref::<UsageError>().is_some())
}
