use std::process;

use anyhow::Result;
use log::{debug, error};

use gameshell::cli::{self, Command};
use gameshell::{app, logging};

fn main() {
    if let Err(e) = run() {
        // Bad input from the user is reported without logging noise
        if cli::is_usage_error(&e) {
            eprintln!("{}", e);
        } else {
            error!("Application error: {:#}", e);
            eprintln!("Error: {:#}", e);
        }

        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = cli::parse_args();
    cli::validate_args(&args)?;

    let config_manager = app::load_configuration(&args)?;
    let log_config = app::configure_logging(&args, &config_manager)?;
    logging::init_logger(log_config)?;

    let plugins_dir = app::resolve_plugins_dir(&args, &config_manager);
    let mut manager = app::create_plugin_manager(&plugins_dir);

    match args.command() {
        command @ Command::Run { .. } => {
            let options = app::shell_options(&command, &config_manager)?;
            let surface = app::run_shell(&mut manager, options);
            for line in surface.text() {
                println!("{}", line);
            }
        }
        Command::Plugins(plugins_command) => {
            let colours = app::create_colour_manager(&args, &config_manager)?;
            let output = app::handle_plugin_command(&mut manager, &plugins_command, &colours);
            // Instances created by enable get their shutdown hook before exit
            manager.on_shutdown();
            print!("{}", output?);
        }
    }

    debug!("gameshell finished");
    Ok(())
}
