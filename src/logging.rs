// Logging for gameshell
//
// A small `log::Log` implementation shared by the shell and its plugins.
// Records go to stderr, to a file, or to both, with independent levels per
// destination. Each line is either text or a JSON object:
//
//   2026-01-04 09:15:02 [INFO] gameshell::plugin::manager: Loaded plugin: daytime
//   {"timestamp":"2026-01-04 09:15:02","level":"INFO","target":"...","message":"..."}
//
// Example usage:
// ```
// let config = LogConfig {
//     console_level: LevelFilter::Info,
//     file_level: Some(LevelFilter::Debug),
//     format: LogFormat::Json,
//     destination: LogDestination::Both(PathBuf::from("gameshell.log")),
// };
// init_logger(config)?;
// log::info!("Shell started");
// ```

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use log::{Level, LevelFilter, Metadata, Record};
use serde::{Deserialize, Serialize};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: {}. Valid options: text, json", s)),
        }
    }
}

/// Where log lines are written
#[derive(Debug, Clone, PartialEq)]
pub enum LogDestination {
    Console,
    File(PathBuf),
    Both(PathBuf),
}

impl LogDestination {
    fn file_path(&self) -> Option<&Path> {
        match self {
            LogDestination::Console => None,
            LogDestination::File(path) | LogDestination::Both(path) => Some(path),
        }
    }

    fn writes_console(&self) -> bool {
        !matches!(self, LogDestination::File(_))
    }
}

/// One JSON log line
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonLogEntry {
    pub timestamp: String,
    pub level: String,
    pub target: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub console_level: LevelFilter,
    pub file_level: Option<LevelFilter>,
    pub format: LogFormat,
    pub destination: LogDestination,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            console_level: LevelFilter::Info,
            file_level: None,
            format: LogFormat::Text,
            destination: LogDestination::Console,
        }
    }
}

impl LogConfig {
    /// Most verbose level any destination accepts
    pub fn max_level(&self) -> LevelFilter {
        let console = if self.destination.writes_console() {
            self.console_level
        } else {
            LevelFilter::Off
        };
        match self.file_level {
            Some(file) if self.destination.file_path().is_some() => console.max(file),
            _ => console,
        }
    }
}

pub struct ShellLogger {
    config: LogConfig,
    file: Option<Mutex<File>>,
}

impl ShellLogger {
    /// Create the logger, opening the log file up front if there is one
    pub fn new(config: LogConfig) -> Result<Self> {
        let file = match config.destination.file_path() {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("Failed to open log file: {}", path.display()))?;
                Some(Mutex::new(file))
            }
            None => None,
        };
        Ok(Self { config, file })
    }

    fn timestamp() -> String {
        let now: DateTime<Local> = Local::now();
        now.format(TIMESTAMP_FORMAT).to_string()
    }

    fn format_record(&self, level: Level, target: &str, message: &str) -> String {
        let timestamp = Self::timestamp();
        let level = level.to_string().to_uppercase();

        match self.config.format {
            LogFormat::Text => format!("{} [{}] {}: {}", timestamp, level, target, message),
            LogFormat::Json => {
                let entry = JsonLogEntry {
                    timestamp: timestamp.clone(),
                    level: level.clone(),
                    target: target.to_string(),
                    message: message.to_string(),
                };
                serde_json::to_string(&entry).unwrap_or_else(|e| {
                    format!("{} [{}] {}: {} (json error: {})", timestamp, level, target, message, e)
                })
            }
        }
    }

    fn console_accepts(&self, level: Level) -> bool {
        self.config.destination.writes_console() && level <= self.config.console_level
    }

    fn file_accepts(&self, level: Level) -> bool {
        self.file.is_some() && self.config.file_level.map_or(false, |file_level| level <= file_level)
    }

    fn write_file(&self, line: &str) -> io::Result<()> {
        if let Some(file) = &self.file {
            let mut file = file.lock().map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }
}

impl log::Log for ShellLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.console_accepts(metadata.level()) || self.file_accepts(metadata.level())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = self.format_record(record.level(), record.target(), &record.args().to_string());

        if self.console_accepts(record.level()) {
            let _ = writeln!(io::stderr(), "{}", line);
        }
        if self.file_accepts(record.level()) {
            if let Err(e) = self.write_file(&line) {
                eprintln!("File logging error: {}", e);
            }
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}

/// Install the logger as the global `log` backend
pub fn init_logger(config: LogConfig) -> Result<()> {
    let max_level = config.max_level();
    let logger = ShellLogger::new(config)?;

    log::set_boxed_logger(Box::new(logger)).context("Failed to set global logger")?;
    log::set_max_level(max_level);
    Ok(())
}

/// Convert string to LevelFilter
pub fn parse_log_level(level_str: &str) -> Result<LevelFilter> {
    level_str.parse::<LevelFilter>().map_err(|_| {
        anyhow::anyhow!(
            "Invalid log level: {}. Valid levels: error, warn, info, debug, trace, off",
            level_str
        )
    })
}
