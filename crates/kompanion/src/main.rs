mod cli;
mod commands;
mod logging;

use std::process::ExitCode;

use clap::Parser;
use kompanion_core::Settings;

use crate::cli::CliArgs;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    if args.ping {
        println!("pong");
        return ExitCode::SUCCESS;
    }

    let Some(command) = args.command else {
        eprintln!("No command given. Run with --help for usage.");
        return ExitCode::FAILURE;
    };

    let settings = match Settings::load(args.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init_logging(&settings.log) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match commands::execute(command, settings).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::debug!("Command failed: {:?}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
