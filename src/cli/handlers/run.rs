// src/cli/handlers/run.rs

use crate::{
    cli::{dispatcher::GlobalOptions, handlers::commons},
    commands::vars::validate_name,
    core::{
        context::{ConsoleListener, EngineContext},
        engine::Engine,
        error::ScriptError,
        parser,
    },
};
use anyhow::{Result, anyhow};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

#[derive(Parser, Debug)]
#[command(no_binary_name = true, name = "run", about = "Runs a script file.")]
struct RunArgs {
    /// The script to run.
    file: PathBuf,

    /// Preset a scalar variable before the script starts.
    #[arg(long = "var", short = 'D', value_name = "NAME=VALUE")]
    vars: Vec<String>,
}

/// Splits a `NAME=VALUE` preset.
fn parse_preset(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!(t!("run.error.invalid_var"), value = raw))?;
    validate_name("run", name)?;
    Ok((name.to_string(), value.to_string()))
}

/// Main entry point for the `run` action.
///
/// The script runs on a worker thread so that Ctrl+C can reach its stop flag
/// while the main thread waits.
pub fn handle(args: Vec<String>, options: GlobalOptions) -> Result<()> {
    let run_args = RunArgs::try_parse_from(&args)?;

    let source = commons::read_script(&run_args.file)?;
    let script = parser::parse_source(&source)?;
    log::info!(
        "Running '{}' ({} lines).",
        run_args.file.display(),
        script.line_count()
    );

    let mut ctx = EngineContext::for_script(Box::new(commons::load_environments()?))
        .with_listener(ConsoleListener)
        .with_verbose(options.verbose);
    for raw in &run_args.vars {
        let (name, value) = parse_preset(raw)?;
        ctx.variables.set(name, value);
    }

    commons::install_interrupt_handler(ctx.handle())?;

    let engine = Engine::new(Arc::new(script));
    let worker = thread::spawn(move || {
        let ok = engine.execute(&mut ctx);
        (ok, ctx)
    });
    let (ok, ctx) = worker
        .join()
        .map_err(|_| anyhow!(t!("run.error.worker_panicked")))?;

    if ok {
        return Ok(());
    }
    if ctx.is_cancelled() {
        return Err(ScriptError::Cancelled.into());
    }
    Err(anyhow!(ctx.errors().join("\n")).context(format!(
        t!("run.error.failed"),
        path = run_args.file.display()
    )))
}
