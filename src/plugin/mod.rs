//! Plugin System Module
//!
//! Discovers plugin manifests, orders plugins by dependency, builds them
//! from a factory registry and dispatches lifecycle hooks to the active set.
//!
//! # Example Usage
//!
//! ```no_run
//! use gameshell::plugin::{HostContext, PluginFactoryRegistry, PluginManager, TextSurface};
//!
//! let mut manager = PluginManager::from_directory(
//!     "plugins",
//!     PluginFactoryRegistry::with_builtins(),
//!     HostContext::new(),
//! );
//! manager.load_enabled();
//! manager.on_start();
//!
//! let mut surface = TextSurface::new();
//! manager.on_update(1.0 / 60.0);
//! manager.on_render(&mut surface);
//! manager.on_shutdown();
//! ```

pub mod builtin;
pub mod context;
pub mod discovery;
pub mod error;
pub mod graph;
pub mod guard;
pub mod manager;
pub mod manifest;
pub mod registry;
pub mod traits;

#[cfg(test)]
pub mod tests;

// Re-export core types for easier access
pub use context::{HostClock, HostContext, PluginCommand, RenderSurface, TextSurface};
pub use error::{PluginError, PluginResult};
pub use traits::{Hook, Manifest, Plugin, PluginDescriptor, PluginState};

// Discovery, persistence and ordering
pub use discovery::{ManifestDiscovery, ManifestParser, PluginDiscovery};
pub use graph::{build_dependents, resolve_load_order, DependentsIndex};
pub use manifest::{ManifestStore, YamlManifestStore};

// Registry and management
pub use manager::PluginManager;
pub use registry::{PluginFactory, PluginFactoryRegistry};
