//! Plugin Discovery
//!
//! Scans a plugin root for one manifest per sub-directory and turns each
//! into a [`PluginDescriptor`]. Discovery never fails as a whole: a missing
//! root yields no plugins, and a bad manifest is logged and skipped.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use super::error::{PluginError, PluginResult};
use super::traits::{Manifest, PluginDescriptor};

/// Manifest file names looked for in each plugin directory, in priority order
pub const MANIFEST_FILE_NAMES: [&str; 2] = ["plugin.yaml", "plugin.yml"];

/// Source of plugin descriptors
pub trait PluginDiscovery {
    /// Discover all available plugins, in a stable order
    fn discover(&self) -> Vec<PluginDescriptor>;

    /// Root being scanned
    fn plugin_directory(&self) -> &Path;
}

/// File-based discovery: `<root>/<plugin>/plugin.yaml`
#[derive(Debug)]
pub struct ManifestDiscovery {
    plugin_directory: PathBuf,
    parser: ManifestParser,
}

impl ManifestDiscovery {
    pub fn new<P: AsRef<Path>>(plugin_directory: P) -> Self {
        Self {
            plugin_directory: plugin_directory.as_ref().to_path_buf(),
            parser: ManifestParser::new(),
        }
    }

    /// Sub-directories of the root in lexical order
    fn plugin_dirs(&self) -> PluginResult<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.plugin_directory).map_err(|e| {
            PluginError::discovery_error(format!(
                "Failed to read directory {}: {}",
                self.plugin_directory.display(),
                e
            ))
        })?;

        let mut dirs = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) if entry.path().is_dir() => dirs.push(entry.path()),
                Ok(_) => {}
                Err(e) => warn!("Failed to read directory entry: {}", e),
            }
        }
        dirs.sort();
        Ok(dirs)
    }

    /// Manifest path inside a plugin directory, if there is one
    fn manifest_in(dir: &Path) -> Option<PathBuf> {
        MANIFEST_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Parse a descriptor from a manifest file
    pub fn parse_manifest_file(&self, file_path: &Path) -> PluginResult<PluginDescriptor> {
        let content = fs::read_to_string(file_path).map_err(|e| {
            PluginError::discovery_error(format!("Failed to read file {}: {}", file_path.display(), e))
        })?;

        let manifest = self.parser.parse_yaml(&content)?;
        self.parser.validate(&manifest)?;

        Ok(PluginDescriptor::from_manifest(manifest, file_path.to_path_buf()))
    }
}

impl PluginDiscovery for ManifestDiscovery {
    fn discover(&self) -> Vec<PluginDescriptor> {
        if !self.plugin_directory.is_dir() {
            warn!("Plugins directory '{}' not found.", self.plugin_directory.display());
            return Vec::new();
        }

        let dirs = match self.plugin_dirs() {
            Ok(dirs) => dirs,
            Err(e) => {
                error!("{}", e);
                return Vec::new();
            }
        };

        let mut names = HashSet::new();
        let mut descriptors = Vec::new();

        for dir in dirs {
            let Some(manifest) = Self::manifest_in(&dir) else {
                debug!("Skipping '{}': no manifest found.", dir.display());
                continue;
            };

            match self.parse_manifest_file(&manifest) {
                Ok(descriptor) => {
                    if !names.insert(descriptor.name.clone()) {
                        error!(
                            "Duplicate plugin name '{}' in '{}'; keeping the first one",
                            descriptor.name,
                            manifest.display()
                        );
                        continue;
                    }
                    info!("Discovered plugin: {}", descriptor.name);
                    descriptors.push(descriptor);
                }
                Err(e) => error!("Error reading manifest '{}': {}", manifest.display(), e),
            }
        }

        debug!(
            "ManifestDiscovery found {} plugins in {}",
            descriptors.len(),
            self.plugin_directory.display()
        );
        descriptors
    }

    fn plugin_directory(&self) -> &Path {
        &self.plugin_directory
    }
}

/// Parser for plugin manifests
#[derive(Debug, Default)]
pub struct ManifestParser {}

impl ManifestParser {
    pub fn new() -> Self {
        Self {}
    }

    /// Parse a YAML string into a manifest
    pub fn parse_yaml(&self, yaml_content: &str) -> PluginResult<Manifest> {
        serde_yaml::from_str(yaml_content)
            .map_err(|e| PluginError::manifest_parse_error(format!("Failed to parse YAML: {}", e)))
    }

    /// Reject manifests whose required fields are present but blank
    pub fn validate(&self, manifest: &Manifest) -> PluginResult<()> {
        if manifest.name.trim().is_empty() {
            return Err(PluginError::manifest_parse_error("Plugin name cannot be empty"));
        }

        if manifest.module.trim().is_empty() {
            return Err(PluginError::manifest_parse_error(format!(
                "Plugin '{}' has an empty module reference",
                manifest.name
            )));
        }

        Ok(())
    }
}
