//! Application orchestration module

pub mod execution;
pub mod initialization;

pub use execution::{handle_plugin_command, run_shell, shell_options, ShellOptions};
pub use initialization::{
    configure_logging,
    create_colour_manager,
    create_plugin_manager,
    load_configuration,
    resolve_plugins_dir,
};
