//! CLI module containing argument parsing

pub mod args;
pub mod error;

pub use args::{parse_args, validate_args, Args, Command, PluginsCommand};
pub use error::{is_usage_error, UsageError};
