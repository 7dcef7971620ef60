//! Manifest persistence
//!
//! Writes `enabled` changes back to the manifest a descriptor came from.
//! Only that one key is touched: everything else in the file, including key
//! order, survives the round trip.

use std::fs;
use std::path::Path;

use log::debug;
use serde_yaml::{Mapping, Value};

use super::error::{PluginError, PluginResult};

const ENABLED_KEY: &str = "enabled";

/// Read/write access to persisted manifests
pub trait ManifestStore {
    /// Read the raw manifest mapping
    fn read(&self, location: &Path) -> PluginResult<Mapping>;

    /// Persist a new `enabled` flag, preserving all other keys
    fn set_enabled(&self, location: &Path, enabled: bool) -> PluginResult<()>;
}

/// YAML files on the local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlManifestStore;

impl YamlManifestStore {
    pub fn new() -> Self {
        Self
    }
}

impl ManifestStore for YamlManifestStore {
    fn read(&self, location: &Path) -> PluginResult<Mapping> {
        let content = fs::read_to_string(location).map_err(|e| {
            PluginError::persistence_error(format!("Failed to read {}: {}", location.display(), e))
        })?;

        // An empty file reads as an empty mapping
        if content.trim().is_empty() {
            return Ok(Mapping::new());
        }
        match serde_yaml::from_str::<Option<Mapping>>(&content)? {
            Some(mapping) => Ok(mapping),
            None => Ok(Mapping::new()),
        }
    }

    fn set_enabled(&self, location: &Path, enabled: bool) -> PluginResult<()> {
        let mut data = self.read(location)?;
        // Mapping::insert keeps the position of an existing key
        data.insert(Value::String(ENABLED_KEY.to_string()), Value::Bool(enabled));

        let content = serde_yaml::to_string(&data)?;
        fs::write(location, content).map_err(|e| {
            PluginError::persistence_error(format!("Failed to write {}: {}", location.display(), e))
        })?;

        debug!("Persisted enabled={} to {}", enabled, location.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(mapping: &Mapping) -> Vec<String> {
        mapping
            .keys()
            .filter_map(|k| k.as_str().map(str::to_string))
            .collect()
    }

    #[test]
    fn test_set_enabled_preserves_other_keys_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plugin.yaml");
        fs::write(
            &path,
            "name: calendar\nmodule: builtin.calendar\nenabled: false\ndepends:\n- daytime\nauthor: someone\n",
        )
        .unwrap();

        let store = YamlManifestStore::new();
        store.set_enabled(&path, true).unwrap();

        let data = store.read(&path).unwrap();
        assert_eq!(keys(&data), vec!["name", "module", "enabled", "depends", "author"]);
        assert_eq!(data.get("enabled"), Some(&Value::Bool(true)));
        assert_eq!(data.get("author"), Some(&Value::String("someone".into())));
        let depends = data.get("depends").and_then(Value::as_sequence).unwrap();
        assert_eq!(depends.len(), 1);
    }

    #[test]
    fn test_set_enabled_appends_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plugin.yaml");
        fs::write(&path, "name: fps\nmodule: builtin.fps_display\n").unwrap();

        let store = YamlManifestStore::new();
        store.set_enabled(&path, true).unwrap();

        let data = store.read(&path).unwrap();
        assert_eq!(keys(&data), vec!["name", "module", "enabled"]);
    }

    #[test]
    fn test_missing_manifest_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = YamlManifestStore::new();

        let err = store.set_enabled(&dir.path().join("absent.yaml"), true).unwrap_err();
        assert!(matches!(err, PluginError::PersistenceError { .. }));
    }

    #[test]
    fn test_empty_manifest_reads_as_empty_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plugin.yaml");
        fs::write(&path, "").unwrap();

        assert!(YamlManifestStore::new().read(&path).unwrap().is_empty());
    }
}
