//! gameshell: plugin host for a small 2D game shell.
//!
//! The [`plugin`] module is the core: manifest discovery, dependency
//! ordering, runtime enable/disable and lifecycle dispatch. [`events`] is
//! the host-side event bus plugins talk through.

pub mod app;
pub mod cli;
pub mod config;
pub mod display;
pub mod events;
pub mod logging;
pub mod plugin;
