//! Mock Plugin Implementations for Testing
//!
//! Every hook call is appended to a shared journal as `"<name>.<hook>"`, so
//! tests can assert on the exact order the manager drove the plugins in.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde_yaml::Mapping;

use crate::events::Event;
use crate::plugin::context::{HostContext, PluginCommand, RenderSurface};
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::manifest::{ManifestStore, YamlManifestStore};
use crate::plugin::registry::PluginFactoryRegistry;
use crate::plugin::traits::{Hook, Plugin};

/// Shared record of hook calls
pub type Journal = Rc<RefCell<Vec<String>>>;

pub fn new_journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

/// What a mock does besides recording
#[derive(Debug, Clone, Default)]
pub struct MockBehaviour {
    pub fail_on: Vec<Hook>,
    pub panic_on: Vec<Hook>,
    /// Queued on the host context the first time `on_update` runs
    pub command_on_update: Option<PluginCommand>,
}

impl MockBehaviour {
    pub fn failing(hook: Hook) -> Self {
        Self {
            fail_on: vec![hook],
            ..Self::default()
        }
    }

    pub fn panicking(hook: Hook) -> Self {
        Self {
            panic_on: vec![hook],
            ..Self::default()
        }
    }

    pub fn requesting(command: PluginCommand) -> Self {
        Self {
            command_on_update: Some(command),
            ..Self::default()
        }
    }
}

/// Mock plugin for testing manager behaviour
pub struct MockPlugin {
    name: String,
    journal: Journal,
    behaviour: MockBehaviour,
    context: HostContext,
}

impl MockPlugin {
    pub fn new(name: &str, journal: Journal, behaviour: MockBehaviour, context: HostContext) -> Self {
        Self {
            name: name.to_string(),
            journal,
            behaviour,
            context,
        }
    }

    fn record(&mut self, hook: Hook) -> PluginResult<()> {
        self.journal.borrow_mut().push(format!("{}.{}", self.name, hook));

        if self.behaviour.panic_on.contains(&hook) {
            panic!("{} panicked in {}", self.name, hook);
        }
        if self.behaviour.fail_on.contains(&hook) {
            return Err(PluginError::hook_failed(hook.name(), format!("{} failed", self.name)));
        }
        Ok(())
    }
}

impl Plugin for MockPlugin {
    fn on_init(&mut self) -> PluginResult<()> {
        self.record(Hook::Init)
    }

    fn on_start(&mut self) -> PluginResult<()> {
        self.record(Hook::Start)
    }

    fn on_event(&mut self, _event: &Event) -> PluginResult<()> {
        self.record(Hook::Event)
    }

    fn on_update(&mut self, _dt: f64) -> PluginResult<()> {
        if let Some(command) = self.behaviour.command_on_update.take() {
            match command {
                PluginCommand::Enable(name) => self.context.request_enable(name),
                PluginCommand::Disable(name) => self.context.request_disable(name),
            }
        }
        self.record(Hook::Update)
    }

    fn on_render(&mut self, surface: &mut dyn RenderSurface) -> PluginResult<()> {
        surface.draw_text(0, 0, &self.name);
        self.record(Hook::Render)
    }

    fn on_shutdown(&mut self) -> PluginResult<()> {
        self.record(Hook::Shutdown)
    }
}

/// Module reference used for a mock plugin called `name`
pub fn mock_module(name: &str) -> String {
    format!("mock.{}", name)
}

/// Registry with one recording mock per name.
///
/// `behaviours` overrides the default (record only) behaviour per name.
pub fn mock_registry(
    names: &[&str],
    journal: &Journal,
    behaviours: &HashMap<&str, MockBehaviour>,
) -> PluginFactoryRegistry {
    let mut registry = PluginFactoryRegistry::new();
    for name in names {
        let plugin_name = name.to_string();
        let journal = journal.clone();
        let behaviour = behaviours.get(name).cloned().unwrap_or_default();
        registry
            .register(mock_module(name), move |context: &HostContext| {
                Ok(Box::new(MockPlugin::new(
                    &plugin_name,
                    journal.clone(),
                    behaviour.clone(),
                    context.clone(),
                )) as Box<dyn Plugin>)
            })
            .unwrap();
    }
    registry
}

/// Write `<root>/<name>/plugin.yaml` for a mock plugin and return its path
pub fn write_manifest(root: &Path, name: &str, enabled: bool, depends: &[&str]) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();

    let mut content = format!(
        "name: {}\nmodule: {}\nenabled: {}\n",
        name,
        mock_module(name),
        enabled
    );
    if !depends.is_empty() {
        content.push_str(&format!("depends: [{}]\n", depends.join(", ")));
    }
    content.push_str(&format!("description: Mock plugin {}\n", name));

    let path = dir.join("plugin.yaml");
    fs::write(&path, content).unwrap();
    path
}

/// Current `enabled` value stored in a manifest file
pub fn manifest_enabled(path: &Path) -> Option<bool> {
    YamlManifestStore::new()
        .read(path)
        .unwrap()
        .get("enabled")
        .and_then(serde_yaml::Value::as_bool)
}

/// Manifest store that counts writes, backed by the YAML store
#[derive(Debug, Clone, Default)]
pub struct CountingStore {
    inner: YamlManifestStore,
    pub writes: Rc<Cell<usize>>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ManifestStore for CountingStore {
    fn read(&self, path: &Path) -> PluginResult<Mapping> {
        self.inner.read(path)
    }

    fn set_enabled(&self, path: &Path, enabled: bool) -> PluginResult<()> {
        self.writes.set(self.writes.get() + 1);
        self.inner.set_enabled(path, enabled)
    }
}
