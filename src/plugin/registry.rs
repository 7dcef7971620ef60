//! Plugin Factory Registry
//!
//! Maps the `module` reference in a manifest to a function that builds the
//! plugin. This is how a manifest string becomes a live plugin object.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use super::builtin;
use super::context::HostContext;
use super::error::{PluginError, PluginResult};
use super::traits::Plugin;

/// Builds a plugin instance bound to the host
pub type PluginFactory = Rc<dyn Fn(&HostContext) -> PluginResult<Box<dyn Plugin>>>;

/// Registry of plugin factories by module reference
#[derive(Default, Clone)]
pub struct PluginFactoryRegistry {
    factories: BTreeMap<String, PluginFactory>,
}

impl PluginFactoryRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in plugins
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (module, factory) in builtin::factories() {
            // Built-in module names are unique, registration cannot clash
            let _ = registry.register(module, factory);
        }
        registry
    }

    /// Register a factory under `module`
    pub fn register<S, F>(&mut self, module: S, factory: F) -> PluginResult<()>
    where
        S: Into<String>,
        F: Fn(&HostContext) -> PluginResult<Box<dyn Plugin>> + 'static,
    {
        let module = module.into();
        if self.factories.contains_key(&module) {
            return Err(PluginError::plugin_already_registered(module));
        }
        self.factories.insert(module, Rc::new(factory));
        Ok(())
    }

    /// Look up the factory for `module`
    pub fn get(&self, module: &str) -> PluginResult<PluginFactory> {
        self.factories
            .get(module)
            .cloned()
            .ok_or_else(|| PluginError::unknown_module(module))
    }

    pub fn contains(&self, module: &str) -> bool {
        self.factories.contains_key(module)
    }

    /// Registered module references, sorted
    pub fn modules(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for PluginFactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginFactoryRegistry")
            .field("modules", &self.modules())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nothing;
    impl Plugin for Nothing {}

    fn make_nothing(_: &HostContext) -> PluginResult<Box<dyn Plugin>> {
        Ok(Box::new(Nothing))
    }

    #[test]
    fn test_registry_basic_operations() {
        let mut registry = PluginFactoryRegistry::new();
        assert!(registry.is_empty());

        registry.register("test.nothing", make_nothing).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("test.nothing"));
        assert!(registry.get("test.nothing").is_ok());

        let err = registry.get("test.missing").err().unwrap();
        assert!(matches!(err, PluginError::UnknownModule { .. }));
    }

    #[test]
    fn test_registry_duplicate_registration() {
        let mut registry = PluginFactoryRegistry::new();
        registry.register("test.nothing", make_nothing).unwrap();

        let result = registry.register("test.nothing", make_nothing);
        assert!(matches!(result.unwrap_err(), PluginError::PluginAlreadyRegistered { .. }));
    }

    #[test]
    fn test_builtins_are_registered() {
        let registry = PluginFactoryRegistry::with_builtins();
        assert_eq!(
            registry.modules(),
            vec!["builtin.calendar", "builtin.daytime", "builtin.fps_display"]
        );

        let factory = registry.get("builtin.daytime").unwrap();
        assert!((*factory)(&HostContext::new()).is_ok());
    }
}
