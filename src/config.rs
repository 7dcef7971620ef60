use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use log::{debug, info};
use toml::Value;

use crate::cli::UsageError;

/// Default plugin root, relative to the working directory
pub const DEFAULT_PLUGINS_DIR: &str = "plugins";
pub const DEFAULT_FRAME_RATE: u32 = 60;
pub const DEFAULT_FRAMES: u64 = 300;

/// Configuration storage - section_name -> key -> value
pub type Configuration = HashMap<String, HashMap<String, String>>;

/// Configuration manager
#[derive(Debug, Default)]
pub struct ConfigManager {
    config: Configuration,
    config_file_path: Option<PathBuf>,
    selected_section: Option<String>,
}

impl ConfigManager {
    pub fn from_config(config: Configuration) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Load configuration using the discovery hierarchy
    pub fn load() -> Result<Self> {
        debug!("Starting configuration discovery");

        for path in discover_config_files() {
            debug!("Attempting to load config from: {}", path.display());
            if path.is_file() {
                return Self::load_from_file(path);
            }
        }

        info!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from explicit file path
    pub fn load_from_file(path: PathBuf) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = parse_toml_config(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        info!("Loaded configuration from: {}", path.display());
        Ok(Self {
            config,
            config_file_path: Some(path),
            selected_section: None,
        })
    }

    pub fn config_file_path(&self) -> Option<&PathBuf> {
        self.config_file_path.as_ref()
    }

    /// Get value from configuration with section fallback
    pub fn get_value(&self, section: &str, key: &str) -> Option<&String> {
        // Priority: selected_section -> specified section -> base
        if let Some(selected) = &self.selected_section {
            if let Some(value) = self.config.get(selected).and_then(|s| s.get(key)) {
                return Some(value);
            }
        }

        if let Some(value) = self.config.get(section).and_then(|s| s.get(key)) {
            return Some(value);
        }

        self.config.get("base").and_then(|s| s.get(key))
    }

    /// Select configuration section for --config-name
    pub fn select_section(&mut self, section: String) {
        debug!("Selecting configuration section: {}", section);
        self.selected_section = Some(section);
    }

    pub fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>> {
        match self.get_value(section, key) {
            Some(value) => match value.to_lowercase().as_str() {
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                _ => Err(anyhow::anyhow!("Invalid boolean value for {}.{}: {}", section, key, value)),
            },
            None => Ok(None),
        }
    }

    pub fn get_log_level(&self, section: &str, key: &str) -> Result<Option<log::LevelFilter>> {
        match self.get_value(section, key) {
            Some(value) => Ok(Some(crate::logging::parse_log_level(value)?)),
            None => Ok(None),
        }
    }

    pub fn get_path(&self, section: &str, key: &str) -> Option<PathBuf> {
        self.get_value(section, key).map(PathBuf::from)
    }

    /// Parse a numeric value, naming the key on failure
    pub fn get_number<T>(&self, section: &str, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match self.get_value(section, key) {
            Some(value) => value
                .parse::<T>()
                .map(Some)
                .with_context(|| format!("Invalid number for {}.{}: {}", section, key, value)),
            None => Ok(None),
        }
    }

    /// Plugin root from `[plugins] path`
    pub fn plugins_path(&self) -> PathBuf {
        self.get_path("plugins", "path")
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PLUGINS_DIR))
    }

    /// Target frame rate from `[screen] fps`
    pub fn frame_rate(&self) -> Result<u32> {
        let fps = self.get_number::<u32>("screen", "fps")?.unwrap_or(DEFAULT_FRAME_RATE);
        if fps == 0 {
            return Err(UsageError::invalid_argument("screen.fps must be greater than zero").into());
        }
        Ok(fps)
    }

    /// Number of frames a headless run lasts, from `[screen] frames`
    pub fn frames(&self) -> Result<u64> {
        Ok(self.get_number::<u64>("screen", "frames")?.unwrap_or(DEFAULT_FRAMES))
    }
}

/// Configuration files in order of precedence
fn discover_config_files() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = env::var("GAMESHELL_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("gameshell").join("config.toml"));
    }

    if let Some(home_dir) = dirs::home_dir() {
        paths.push(home_dir.join(".gameshell.toml"));
    }

    paths.push(PathBuf::from("./gameshell.toml"));

    debug!("Config discovery paths: {:?}", paths);
    paths
}

/// Parse TOML content to string-based configuration
fn parse_toml_config(content: &str) -> Result<Configuration> {
    let table: toml::Table = toml::from_str(content).context("Failed to parse TOML content")?;

    let mut config = Configuration::new();
    flatten_toml_table(&table, String::new(), &mut config);

    debug!("Parsed configuration: {:?}", config);
    Ok(config)
}

/// Flatten nested tables into `section.subsection` names
fn flatten_toml_table(table: &toml::Table, prefix: String, config: &mut Configuration) {
    for (key, value) in table {
        let section_name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            Value::Table(subtable) => {
                let (nested, leaves): (Vec<_>, Vec<_>) =
                    subtable.iter().partition(|(_, v)| matches!(v, Value::Table(_)));

                if !leaves.is_empty() {
                    let section = config.entry(section_name.clone()).or_default();
                    for (subkey, subvalue) in leaves {
                        section.insert(subkey.clone(), toml_value_to_string(subvalue));
                    }
                }
                if !nested.is_empty() {
                    let nested: toml::Table =
                        nested.into_iter().map(|(k, v)| (k.clone(), v.clone())).collect();
                    flatten_toml_table(&nested, section_name, config);
                }
            }
            // Top-level keys outside any table belong to base
            _ => {
                config
                    .entry("base".to_string())
                    .or_default()
                    .insert(section_name, toml_value_to_string(value));
            }
        }
    }
}

fn toml_value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Boolean(b) => b.to_string(),
        other => other.to_string(),
    }
}
