//! Application execution: the headless shell loop and plugin commands

use anyhow::Result;
use log::{debug, info};

use crate::cli::{Command, PluginsCommand, UsageError};
use crate::display::{self, ColourManager};
use crate::events::Event;
use crate::plugin::{PluginManager, TextSurface};

/// Frame loop settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShellOptions {
    pub frames: u64,
    pub fps: u32,
}

impl ShellOptions {
    /// Fixed timestep in seconds
    pub fn timestep(&self) -> f64 {
        1.0 / f64::from(self.fps)
    }
}

/// Run the shell for `options.frames` frames.
///
/// Loads enabled plugins, starts them, then per frame ticks the clock,
/// updates and renders. Finishes by delivering `Quit` and shutting every
/// active plugin down. Returns the overlay drawn in the final frame.
pub fn run_shell(manager: &mut PluginManager, options: ShellOptions) -> TextSurface {
    manager.load_enabled();
    manager.on_start();
    info!(
        "Running {} frames at {} fps with plugins: {:?}",
        options.frames,
        options.fps,
        manager.active_plugins()
    );

    let dt = options.timestep();
    let mut surface = TextSurface::new();
    for frame in 0..options.frames {
        manager.context().clock().tick(dt);
        manager.on_update(dt);

        surface.clear();
        manager.on_render(&mut surface);
        debug!("Frame {} rendered {} lines", frame + 1, surface.lines().len());
    }

    manager.on_event(&Event::Quit);
    manager.on_shutdown();
    info!(
        "Shell stopped after {} frames ({:.2}s simulated)",
        manager.context().clock().frame(),
        manager.context().clock().elapsed()
    );
    surface
}

/// Execute a plugin management subcommand; the returned text is printed
pub fn handle_plugin_command(
    manager: &mut PluginManager,
    command: &PluginsCommand,
    colours: &ColourManager,
) -> Result<String> {
    match command {
        PluginsCommand::List => {
            if manager.descriptors().is_empty() {
                return Ok(format!("{}\n", colours.warning("No plugins found.")));
            }
            Ok(display::format_plugin_table(manager, colours))
        }
        PluginsCommand::Enable { name } => {
            ensure_known(manager, name)?;
            let before = enabled_names(manager);
            if !manager.enable(name) {
                return Ok(format!("Plugin '{}' is already enabled.\n", colours.highlight(name)));
            }
            Ok(describe_changes(&before, &enabled_names(manager), "Enabled", colours))
        }
        PluginsCommand::Disable { name } => {
            ensure_known(manager, name)?;
            let before = enabled_names(manager);
            if !manager.disable(name) {
                return Ok(format!("Plugin '{}' is already disabled.\n", colours.highlight(name)));
            }
            Ok(describe_changes(&before, &enabled_names(manager), "Disabled", colours))
        }
    }
}

fn ensure_known(manager: &PluginManager, name: &str) -> Result<()> {
    if manager.descriptor(name).is_none() {
        let known: Vec<&str> = manager.descriptors().iter().map(|d| d.name.as_str()).collect();
        return Err(UsageError::unknown_plugin(name, &known).into());
    }
    Ok(())
}

fn enabled_names(manager: &PluginManager) -> Vec<String> {
    manager
        .descriptors()
        .iter()
        .filter(|d| d.enabled)
        .map(|d| d.name.clone())
        .collect()
}

/// One line per plugin whose enabled flag flipped, in discovery order
fn describe_changes(before: &[String], after: &[String], verb: &str, colours: &ColourManager) -> String {
    let mut changed: Vec<&String> = after.iter().filter(|n| !before.contains(n)).collect();
    changed.extend(before.iter().filter(|n| !after.contains(n)));

    changed
        .into_iter()
        .map(|name| format!("{} plugin '{}'\n", colours.success(verb), colours.highlight(name)))
        .collect()
}

/// Resolve the frame loop settings for `run`: CLI first, then `[screen]`
pub fn shell_options(command: &Command, config: &crate::config::ConfigManager) -> Result<ShellOptions> {
    let (frames, fps) = match command {
        Command::Run { frames, fps } => (*frames, *fps),
        Command::Plugins(_) => (None, None),
    };
    let options = ShellOptions {
        frames: match frames {
            Some(frames) => frames,
            None => config.frames()?,
        },
        fps: match fps {
            Some(fps) => fps,
            None => config.frame_rate()?,
        },
    };
    if options.fps == 0 {
        return Err(UsageError::invalid_argument("Frame rate must be greater than zero").into());
    }
    Ok(options)
}
