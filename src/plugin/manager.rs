//! Plugin Manager
//!
//! Central coordinator for plugin lifecycle. Owns the discovered
//! descriptors and every live plugin instance, decides the load order,
//! keeps manifests in step with runtime enable/disable, and fans lifecycle
//! hooks out to active plugins.
//!
//! Per-plugin failures never escape: construction errors, init errors, hook
//! errors and panics are all logged against the plugin and the manager
//! carries on with the rest.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use log::{debug, error, info, warn};

use super::context::{HostContext, PluginCommand, RenderSurface};
use super::discovery::{ManifestDiscovery, PluginDiscovery};
use super::error::PluginResult;
use super::graph::{build_dependents, resolve_load_order, DependentsIndex};
use super::guard::guarded;
use super::manifest::{ManifestStore, YamlManifestStore};
use super::registry::PluginFactoryRegistry;
use super::traits::{Hook, Plugin, PluginDescriptor, PluginState};
use crate::events::Event;

/// Upper bound on command-drain rounds after a dispatch
const MAX_COMMAND_ROUNDS: usize = 16;

/// A live plugin instance and the descriptor it was built from
struct LoadedPlugin {
    name: String,
    module_reference: String,
    instance: Box<dyn Plugin>,
}

pub struct PluginManager {
    context: HostContext,
    factories: PluginFactoryRegistry,
    store: Box<dyn ManifestStore>,
    descriptors: Vec<PluginDescriptor>,
    dependents: DependentsIndex,
    states: HashMap<String, PluginState>,
    /// Active plugins in load order; the only owner of instances
    active: Vec<LoadedPlugin>,
}

impl PluginManager {
    /// Create a manager over already discovered descriptors.
    ///
    /// The dependents index is built here, once. Only `enabled` changes are
    /// supported afterwards.
    pub fn new(
        descriptors: Vec<PluginDescriptor>,
        factories: PluginFactoryRegistry,
        context: HostContext,
    ) -> Self {
        let dependents = build_dependents(&descriptors);
        let states = descriptors
            .iter()
            .map(|d| (d.name.clone(), PluginState::Discovered))
            .collect();

        Self {
            context,
            factories,
            store: Box::new(YamlManifestStore::new()),
            descriptors,
            dependents,
            states,
            active: Vec::new(),
        }
    }

    /// Discover manifests under `root` and create a manager over them
    pub fn from_directory<P: AsRef<Path>>(
        root: P,
        factories: PluginFactoryRegistry,
        context: HostContext,
    ) -> Self {
        let descriptors = ManifestDiscovery::new(root).discover();
        Self::new(descriptors, factories, context)
    }

    /// Replace the manifest store used to persist `enabled` changes
    pub fn with_store(mut self, store: Box<dyn ManifestStore>) -> Self {
        self.store = store;
        self
    }

    pub fn context(&self) -> &HostContext {
        &self.context
    }

    /// Every discovered descriptor, in discovery order
    pub fn descriptors(&self) -> &[PluginDescriptor] {
        &self.descriptors
    }

    pub fn descriptor(&self, name: &str) -> Option<&PluginDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    pub fn state(&self, name: &str) -> Option<&PluginState> {
        self.states.get(name)
    }

    pub fn dependents(&self) -> &DependentsIndex {
        &self.dependents
    }

    /// Names of active plugins in dispatch order
    pub fn active_plugins(&self) -> Vec<&str> {
        self.active.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.active.iter().any(|p| p.name == name)
    }

    /// Module reference of the active instance for `name`
    pub fn loaded_module(&self, name: &str) -> Option<&str> {
        self.active
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.module_reference.as_str())
    }

    /// Order in which enabled plugins would be loaded now
    pub fn load_order(&self) -> Vec<String> {
        resolve_load_order(&self.descriptors, &self.dependents)
    }

    /// Load every enabled plugin in dependency order. Called once at startup.
    pub fn load_enabled(&mut self) {
        let order = self.load_order();
        info!("Loading {} enabled plugins", order.len());

        for name in order {
            if let Some(index) = self.index_of(&name) {
                self.load(index);
            }
        }
        self.apply_pending_commands();
    }

    /// Enable `name`, enabling its dependencies first, then persist and load it.
    ///
    /// Returns false if the plugin is unknown or already enabled.
    pub fn enable(&mut self, name: &str) -> bool {
        let mut visiting = HashSet::new();
        self.enable_with(name, &mut visiting)
    }

    /// Disable `name`, disabling its dependents first, then shut it down and persist.
    ///
    /// Returns false if the plugin is unknown or already disabled.
    pub fn disable(&mut self, name: &str) -> bool {
        let mut visiting = HashSet::new();
        self.disable_with(name, &mut visiting)
    }

    pub fn on_init(&mut self) {
        self.dispatch(Hook::Init, |plugin| plugin.on_init());
    }

    pub fn on_start(&mut self) {
        self.dispatch(Hook::Start, |plugin| plugin.on_start());
    }

    pub fn on_event(&mut self, event: &Event) {
        self.dispatch(Hook::Event, |plugin| plugin.on_event(event));
    }

    pub fn on_update(&mut self, dt: f64) {
        self.dispatch(Hook::Update, |plugin| plugin.on_update(dt));
    }

    pub fn on_render(&mut self, surface: &mut dyn RenderSurface) {
        self.dispatch(Hook::Render, |plugin| plugin.on_render(surface));
    }

    pub fn on_shutdown(&mut self) {
        self.dispatch(Hook::Shutdown, |plugin| plugin.on_shutdown());
    }

    /// Apply enable/disable requests plugins queued on the host context.
    ///
    /// Runs automatically after every dispatch. Commands queued while
    /// applying (from init or shutdown hooks) are applied in further rounds.
    /// Returns the number of commands applied.
    pub fn apply_pending_commands(&mut self) -> usize {
        let mut applied = 0;
        for _ in 0..MAX_COMMAND_ROUNDS {
            let commands = self.context.drain_commands();
            if commands.is_empty() {
                return applied;
            }
            for command in commands {
                debug!("Applying queued plugin command: {:?}", command);
                match command {
                    PluginCommand::Enable(name) => self.enable(&name),
                    PluginCommand::Disable(name) => self.disable(&name),
                };
                applied += 1;
            }
        }

        let pending = self.context.pending_commands();
        if pending > 0 {
            warn!(
                "{} plugin commands still queued after {} rounds; deferring to next dispatch",
                pending, MAX_COMMAND_ROUNDS
            );
        }
        applied
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.descriptors.iter().position(|d| d.name == name)
    }

    fn position_of(&self, name: &str) -> usize {
        self.index_of(name).unwrap_or(usize::MAX)
    }

    /// Construct and initialize the plugin for `descriptors[index]`.
    ///
    /// The instance joins the active list only after `on_init` succeeds.
    fn load(&mut self, index: usize) -> bool {
        let name = self.descriptors[index].name.clone();
        let module_reference = self.descriptors[index].module_reference.clone();

        if self.is_loaded(&name) {
            debug!("Plugin '{}' is already loaded", name);
            return true;
        }

        let context = &self.context;
        let result = self
            .factories
            .get(&module_reference)
            .and_then(|factory| guarded(&format!("{}.new", name), || (*factory)(context)))
            .and_then(|mut instance| {
                guarded(&format!("{}.{}", name, Hook::Init), || instance.on_init())?;
                Ok(instance)
            });

        match result {
            Ok(instance) => {
                self.active.push(LoadedPlugin {
                    name: name.clone(),
                    module_reference,
                    instance,
                });
                self.states.insert(name.clone(), PluginState::Loaded);
                info!("Loaded plugin: {}", name);
                true
            }
            Err(e) => {
                error!("Failed to load plugin '{}': {}", name, e);
                self.states.insert(name, PluginState::Failed(e.to_string()));
                false
            }
        }
    }

    /// Remove the instance for `name`, calling its shutdown hook
    fn unload(&mut self, name: &str) {
        if let Some(pos) = self.active.iter().position(|p| p.name == name) {
            let mut plugin = self.active.remove(pos);
            let hook = format!("{}.{}", name, Hook::Shutdown);
            match guarded(&hook, || plugin.instance.on_shutdown()) {
                Ok(()) => info!("Called on_shutdown for plugin: {}", name),
                Err(e) => error!("Error in on_shutdown of plugin '{}': {}", name, e),
            }
        }
        self.states.insert(name.to_string(), PluginState::Unloaded);
    }

    fn persist(&self, index: usize, enabled: bool) {
        let descriptor = &self.descriptors[index];
        if let Err(e) = self.store.set_enabled(&descriptor.manifest_location, enabled) {
            error!(
                "Failed to persist enabled={} for plugin '{}' to '{}': {}",
                enabled,
                descriptor.name,
                descriptor.manifest_location.display(),
                e
            );
        }
    }

    fn enable_with(&mut self, name: &str, visiting: &mut HashSet<String>) -> bool {
        let Some(index) = self.index_of(name) else {
            debug!("Cannot enable unknown plugin '{}'", name);
            return false;
        };
        if self.descriptors[index].enabled {
            return false;
        }
        if !visiting.insert(name.to_string()) {
            error!("Dependency cycle while enabling '{}'; not revisiting", name);
            return false;
        }

        let depends = self.descriptors[index].depends.clone();
        for dep in &depends {
            self.enable_with(dep, visiting);
        }

        self.descriptors[index].enabled = true;
        self.persist(index, true);
        self.load(index);
        info!("Enabled plugin: {}", name);
        true
    }

    fn disable_with(&mut self, name: &str, visiting: &mut HashSet<String>) -> bool {
        let Some(index) = self.index_of(name) else {
            debug!("Cannot disable unknown plugin '{}'", name);
            return false;
        };
        if !self.descriptors[index].enabled {
            return false;
        }
        if !visiting.insert(name.to_string()) {
            error!("Dependency cycle while disabling '{}'; not revisiting", name);
            return false;
        }

        let mut children: Vec<String> = self
            .dependents
            .get(name)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        children.sort_by_key(|child| self.position_of(child));
        for child in &children {
            self.disable_with(child, visiting);
        }

        self.unload(name);
        self.descriptors[index].enabled = false;
        self.persist(index, false);
        info!("Disabled plugin: {}", name);
        true
    }

    /// Call one hook on every active plugin, isolating failures per plugin.
    ///
    /// Plugins cannot reach the manager from inside a hook, so the active
    /// list is stable for the whole pass; toggles they request through the
    /// host context are applied once the pass is over.
    fn dispatch<F>(&mut self, hook: Hook, mut call: F)
    where
        F: FnMut(&mut dyn Plugin) -> PluginResult<()>,
    {
        for plugin in self.active.iter_mut() {
            let label = format!("{}.{}", plugin.name, hook);
            if let Err(e) = guarded(&label, || call(plugin.instance.as_mut())) {
                error!("Error in plugin '{}'.{}: {}", plugin.name, hook, e);
            }
        }
        self.apply_pending_commands();
    }
}
