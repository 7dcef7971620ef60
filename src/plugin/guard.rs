//! Panic isolation for plugin code
//!
//! Plugin constructors, hooks and event handlers run behind `guarded` so a
//! panicking plugin is reported as an ordinary `PluginError` instead of
//! unwinding through the host loop.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use super::error::{PluginError, PluginResult};

/// Run `f`, converting a panic into `PluginError::Panicked`.
///
/// `context` names what was running (for example `"daytime.on_update"`)
/// and ends up in the error message.
pub fn guarded<T, F>(context: &str, f: F) -> PluginResult<T>
where
    F: FnOnce() -> PluginResult<T>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(PluginError::panicked(context, panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
