// src/cli/handlers/commons.rs

// Shared helpers for the action handlers.

use anyhow::{Context, Result, anyhow};
use colored::Colorize;
use std::fs;
use std::path::Path;

use crate::core::{context::EngineHandle, environments::EnvironmentStore};

/// Loads the user's environments, with the config location in the error message.
pub fn load_environments() -> Result<EnvironmentStore> {
    EnvironmentStore::load_default().context(t!("env.error.load"))
}

/// Reads a script file into memory.
pub fn read_script(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        anyhow!(
            t!("run.error.read_file"),
            path = path.display(),
            error = e
        )
    })
}

/// Routes Ctrl+C to the running engine's stop flag.
///
/// The first press asks the script to stop at its next checkpoint; running
/// processes are killed at the next poll.
pub fn install_interrupt_handler(handle: EngineHandle) -> Result<()> {
    ctrlc::set_handler(move || {
        if !handle.is_destroyed() {
            eprintln!("\n{}", t!("run.info.interrupt").yellow());
        }
        handle.destroy();
    })
    .context(t!("run.error.interrupt_handler"))
}
