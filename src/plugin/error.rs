//! Plugin Error Types
//!
//! Error handling for manifest discovery, persistence, plugin construction
//! and hook execution. None of these escape the manager under normal
//! operation; they are logged against the plugin that produced them.

use thiserror::Error;

/// Result type for plugin operations
pub type PluginResult<T> = Result<T, PluginError>;

/// Error types for plugin operations
#[derive(Error, Debug, Clone)]
pub enum PluginError {
    /// Plugin initialization failed
    #[error("Plugin initialization failed: {message}")]
    InitializationFailed { message: String },

    /// A lifecycle hook returned an error
    #[error("Plugin hook {hook} failed: {message}")]
    HookFailed { hook: String, message: String },

    /// A plugin hook or constructor panicked
    #[error("Plugin panicked in {context}: {message}")]
    Panicked { context: String, message: String },

    /// Plugin factory already registered
    #[error("Plugin already registered: {plugin_name}")]
    PluginAlreadyRegistered { plugin_name: String },

    /// No factory registered for a module reference
    #[error("Unknown plugin module: {module}")]
    UnknownModule { module: String },

    /// Plugin discovery error
    #[error("Discovery error: {message}")]
    DiscoveryError { message: String },

    /// Manifest parsing error
    #[error("Manifest parse error: {message}")]
    ManifestParseError { message: String },

    /// Manifest could not be written back
    #[error("Manifest persistence error: {message}")]
    PersistenceError { message: String },

    /// Generic plugin error
    #[error("Plugin error: {message}")]
    Generic { message: String },
}

impl PluginError {
    /// Create an initialization error
    pub fn initialization_failed<S: Into<String>>(message: S) -> Self {
        Self::InitializationFailed { message: message.into() }
    }

    /// Create a hook failure
    pub fn hook_failed<H: Into<String>, S: Into<String>>(hook: H, message: S) -> Self {
        Self::HookFailed { hook: hook.into(), message: message.into() }
    }

    /// Create a panic error
    pub fn panicked<C: Into<String>, S: Into<String>>(context: C, message: S) -> Self {
        Self::Panicked { context: context.into(), message: message.into() }
    }

    /// Create a plugin already registered error
    pub fn plugin_already_registered<S: Into<String>>(plugin_name: S) -> Self {
        Self::PluginAlreadyRegistered { plugin_name: plugin_name.into() }
    }

    /// Create an unknown module error
    pub fn unknown_module<S: Into<String>>(module: S) -> Self {
        Self::UnknownModule { module: module.into() }
    }

    /// Create a discovery error
    pub fn discovery_error<S: Into<String>>(message: S) -> Self {
        Self::DiscoveryError { message: message.into() }
    }

    /// Create a manifest parse error
    pub fn manifest_parse_error<S: Into<String>>(message: S) -> Self {
        Self::ManifestParseError { message: message.into() }
    }

    /// Create a persistence error
    pub fn persistence_error<S: Into<String>>(message: S) -> Self {
        Self::PersistenceError { message: message.into() }
    }

    /// Create a generic error
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic { message: message.into() }
    }

    /// Errors tied to manifest files on disk
    pub fn is_manifest_error(&self) -> bool {
        matches!(self,
            PluginError::DiscoveryError { .. } |
            PluginError::ManifestParseError { .. } |
            PluginError::PersistenceError { .. }
        )
    }
}

// Allow conversion from common error types
impl From<std::io::Error> for PluginError {
    fn from(err: std::io::Error) -> Self {
        PluginError::generic(format!("IO error: {}", err))
    }
}

impl From<serde_yaml::Error> for PluginError {
    fn from(err: serde_yaml::Error) -> Self {
        PluginError::manifest_parse_error(format!("YAML error: {}", err))
    }
}
