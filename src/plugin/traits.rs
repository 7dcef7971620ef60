//! Core Plugin Traits
//!
//! Defines the plugin capability interface, the manifest-derived descriptor
//! and the lifecycle bookkeeping types shared by the manager.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use log::warn;
use serde::{Deserialize, Serialize};

use super::context::RenderSurface;
use super::error::PluginResult;
use crate::events::Event;

/// Plugin capability interface.
///
/// Every hook has a no-op default so a plugin only overrides what it uses.
/// Hooks are called on the host thread, once per dispatch, in load order.
/// Returning an error (or panicking) is logged against the plugin and does
/// not affect any other plugin.
pub trait Plugin {
    /// Called once, right after construction, before the plugin becomes active
    fn on_init(&mut self) -> PluginResult<()> {
        Ok(())
    }

    /// Called when the host loop is about to start
    fn on_start(&mut self) -> PluginResult<()> {
        Ok(())
    }

    /// Called for each host event
    fn on_event(&mut self, _event: &Event) -> PluginResult<()> {
        Ok(())
    }

    /// Called every frame before rendering; `dt` is in seconds
    fn on_update(&mut self, _dt: f64) -> PluginResult<()> {
        Ok(())
    }

    /// Called every frame after the scene has been drawn
    fn on_render(&mut self, _surface: &mut dyn RenderSurface) -> PluginResult<()> {
        Ok(())
    }

    /// Called when the plugin is disabled or the host exits
    fn on_shutdown(&mut self) -> PluginResult<()> {
        Ok(())
    }
}

/// Lifecycle hooks the manager can dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    Init,
    Start,
    Event,
    Update,
    Render,
    Shutdown,
}

impl Hook {
    pub fn name(self) -> &'static str {
        match self {
            Hook::Init => "on_init",
            Hook::Start => "on_start",
            Hook::Event => "on_event",
            Hook::Update => "on_update",
            Hook::Render => "on_render",
            Hook::Shutdown => "on_shutdown",
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// On-disk manifest layout
///
/// ```yaml
/// name: calendar
/// module: builtin.calendar
/// enabled: true
/// depends: [daytime]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    pub module: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub depends: Vec<String>,
}

/// Static record for a discoverable plugin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDescriptor {
    /// Unique plugin name
    pub name: String,

    /// Registry key used to construct the implementation
    pub module_reference: String,

    /// Persisted enablement flag; the only field that changes after discovery
    pub enabled: bool,

    /// Names this plugin depends on, in declaration order, without duplicates
    pub depends: Vec<String>,

    /// Manifest file this descriptor was read from
    pub manifest_location: PathBuf,
}

impl PluginDescriptor {
    /// Build a descriptor from a parsed manifest.
    ///
    /// Duplicate dependency names are dropped; a self-reference is dropped
    /// with a warning.
    pub fn from_manifest(manifest: Manifest, manifest_location: PathBuf) -> Self {
        let mut seen = HashSet::new();
        let mut depends = Vec::with_capacity(manifest.depends.len());
        for dep in manifest.depends {
            if dep == manifest.name {
                warn!("Plugin '{}' lists itself as a dependency; ignoring", manifest.name);
                continue;
            }
            if seen.insert(dep.clone()) {
                depends.push(dep);
            }
        }

        Self {
            name: manifest.name,
            module_reference: manifest.module,
            enabled: manifest.enabled,
            depends,
            manifest_location,
        }
    }
}

/// Where a descriptor is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginState {
    /// Manifest parsed, no instance has been created yet
    Discovered,

    /// Instance exists and its init hook succeeded
    Loaded,

    /// Instance was shut down and dropped
    Unloaded,

    /// The last load attempt failed
    Failed(String),
}

impl fmt::Display for PluginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginState::Discovered => f.write_str("discovered"),
            PluginState::Loaded => f.write_str("loaded"),
            PluginState::Unloaded => f.write_str("unloaded"),
            PluginState::Failed(_) => f.write_str("failed"),
        }
    }
}
