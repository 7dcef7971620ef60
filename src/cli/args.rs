use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::debug;

use super::error::UsageError;

/// Headless 2D game shell with YAML-described plugins
#[derive(Parser, Debug)]
#[command(name = "gameshell")]
#[command(about = "Run the game shell and manage its plugins")]
#[command(version)]
pub struct Args {
    /// Verbose output (debug level logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet output (error level logging only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Debug output (trace level logging)
    #[arg(long, global = true)]
    pub debug: bool,

    /// Log format: text or json
    #[arg(long, value_name = "FORMAT", global = true)]
    pub log_format: Option<String>,

    /// Log file path for file output
    #[arg(long, value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Log level for file output (independent of console level)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_file_level: Option<String>,

    /// Configuration file path
    #[arg(long, value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Configuration section name
    #[arg(long, value_name = "SECTION", global = true)]
    pub config_name: Option<String>,

    /// Plugin root directory (one sub-directory per plugin)
    #[arg(short = 'p', long, value_name = "DIR", global = true)]
    pub plugins_dir: Option<PathBuf>,

    /// Disable coloured output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the shell loop for a fixed number of frames
    Run {
        /// Number of frames to simulate
        #[arg(long, value_name = "N")]
        frames: Option<u64>,

        /// Frames per second the clock advances at
        #[arg(long, value_name = "N")]
        fps: Option<u32>,
    },

    /// Inspect and toggle plugins
    #[command(subcommand)]
    Plugins(PluginsCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum PluginsCommand {
    /// List discovered plugins with their state and dependencies
    List,

    /// Enable a plugin and everything it depends on
    Enable {
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Disable a plugin and everything that depends on it
    Disable {
        #[arg(value_name = "NAME")]
        name: String,
    },
}

impl Args {
    /// Subcommand to execute; `run` with config defaults when none was given
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run {
            frames: None,
            fps: None,
        })
    }
}

/// Parse command line arguments
pub fn parse_args() -> Args {
    let args = Args::parse();
    debug!("Parsed CLI arguments: {:?}", args);
    args
}

/// Validate CLI argument combinations
pub fn validate_args(args: &Args) -> Result<()> {
    let log_flags_count = [args.verbose, args.quiet, args.debug]
        .iter()
        .filter(|&&flag| flag)
        .count();

    if log_flags_count > 1 {
        return Err(UsageError::invalid_argument(
            "Conflicting log level flags: only one of --verbose, --quiet, or --debug may be specified",
        )
        .into());
    }

    if let Some(format) = &args.log_format {
        match format.to_lowercase().as_str() {
            "text" | "json" => {}
            _ => {
                return Err(UsageError::invalid_argument(format!(
                    "Invalid log format '{}'. Valid options: text, json",
                    format
                ))
                .into())
            }
        }
    }

    if let Some(level) = &args.log_file_level {
        crate::logging::parse_log_level(level)
            .map_err(|e| UsageError::invalid_argument(e.to_string()))?;
    }

    if args.log_file_level.is_some() && args.log_file.is_none() {
        return Err(UsageError::invalid_argument("--log-file-level requires --log-file to be specified").into());
    }

    if let Some(Command::Run { fps: Some(0), .. }) = &args.command {
        return Err(UsageError::invalid_argument("--fps must be greater than zero").into());
    }

    Ok(())
}
