// src/bin/stagehand.rs

use clap::Parser;
use colored::*;
use stagehand::{
    cli::{Cli, dispatcher},
    core::error::ScriptError,
};

/// The main entry point of the `stagehand` application.
/// It sets up logging, parses arguments, dispatches to the correct handler,
/// and performs centralized error handling.
fn main() {
    env_logger::init();

    if let Err(e) = dispatcher::dispatch(Cli::parse()) {
        // A stop request exits quietly with the conventional interrupt code.
        if let Some(script_err) = e.downcast_ref::<ScriptError>() {
            if script_err.is_cancellation() {
                std::process::exit(130);
            }
        }

        eprintln!("\n{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}
