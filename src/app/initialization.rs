//! Application initialization and configuration

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Result;
use log::{debug, LevelFilter};

use crate::{cli, config, display, logging, plugin};

pub fn load_configuration(args: &cli::Args) -> Result<config::ConfigManager> {
    let mut manager = if let Some(config_file) = &args.config_file {
        debug!("Loading configuration from explicit file: {}", config_file.display());
        config::ConfigManager::load_from_file(config_file.clone())?
    } else {
        config::ConfigManager::load()?
    };

    if let Some(section_name) = &args.config_name {
        manager.select_section(section_name.clone());
    }

    Ok(manager)
}

/// Build the logger settings. CLI flags take precedence over `[base]` keys.
pub fn configure_logging(args: &cli::Args, config: &config::ConfigManager) -> Result<logging::LogConfig> {
    let console_level = if args.debug {
        LevelFilter::Trace
    } else if args.verbose {
        LevelFilter::Debug
    } else if args.quiet {
        LevelFilter::Error
    } else {
        config.get_log_level("base", "console-level")?.unwrap_or(LevelFilter::Info)
    };

    let format = match args.log_format.as_deref().or_else(|| config.get_value("base", "log-format").map(String::as_str)) {
        Some(format) => logging::LogFormat::from_str(format).map_err(|e| anyhow::anyhow!(e))?,
        None => logging::LogFormat::Text,
    };

    let log_file = args.log_file.clone().or_else(|| config.get_path("base", "log-file"));
    let file_level = match &args.log_file_level {
        Some(level) => Some(logging::parse_log_level(level)?),
        None => config.get_log_level("base", "file-log-level")?,
    };

    let (destination, file_level) = match log_file {
        // Without an explicit file level the file mirrors the console
        Some(path) => (
            logging::LogDestination::Both(path),
            Some(file_level.unwrap_or(console_level)),
        ),
        None => (logging::LogDestination::Console, None),
    };

    Ok(logging::LogConfig {
        console_level,
        file_level,
        format,
        destination,
    })
}

pub fn create_colour_manager(args: &cli::Args, config: &config::ConfigManager) -> Result<display::ColourManager> {
    let config_no_color = config.get_bool("base", "no-color")?;
    Ok(display::ColourManager::from_flags(args.no_color, config_no_color))
}

/// Plugin root: `--plugins-dir`, then `[plugins] path`, then `./plugins`
pub fn resolve_plugins_dir(args: &cli::Args, config: &config::ConfigManager) -> PathBuf {
    args.plugins_dir.clone().unwrap_or_else(|| config.plugins_path())
}

/// Discover plugins and build a manager over the built-in factories
pub fn create_plugin_manager(plugins_dir: &Path) -> plugin::PluginManager {
    debug!("Discovering plugins in {}", plugins_dir.display());
    plugin::PluginManager::from_directory(
        plugins_dir,
        plugin::PluginFactoryRegistry::with_builtins(),
        plugin::HostContext::new(),
    )
}
