//! Built-in Plugin Implementations
//!
//! Plugins shipped with the shell. Each is registered under a
//! `builtin.<name>` module reference and still needs a manifest in the
//! plugin directory to be discovered.

pub mod calendar;
pub mod daytime;
pub mod fps_display;

// Re-export built-in plugins
pub use calendar::CalendarPlugin;
pub use daytime::{DaytimeModel, DaytimePlugin};
pub use fps_display::FpsDisplayPlugin;

use super::context::HostContext;
use super::error::PluginResult;
use super::traits::Plugin;

/// Constructor signature shared by the built-in plugins
pub type BuiltinFactory = fn(&HostContext) -> PluginResult<Box<dyn Plugin>>;

/// Module references and factories for every built-in plugin
pub fn factories() -> Vec<(&'static str, BuiltinFactory)> {
    vec![
        ("builtin.daytime", daytime::create),
        ("builtin.calendar", calendar::create),
        ("builtin.fps_display", fps_display::create),
    ]
}
