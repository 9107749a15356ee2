// src/cli/handlers/invoke.rs

use crate::{
    cli::{dispatcher::GlobalOptions, handlers::commons},
    core::{
        context::{ConsoleListener, EngineContext},
        engine,
    },
};
use anyhow::Result;

/// Runs a single general command straight from the command line,
/// e.g. `stagehand launch dev -- --port 8080`.
///
/// Script-only commands do not resolve here.
pub fn handle(args: Vec<String>, options: GlobalOptions) -> Result<()> {
    let mut ctx = EngineContext::for_command_line(Box::new(commons::load_environments()?))
        .with_listener(ConsoleListener)
        .with_verbose(options.verbose);

    let engine::Resolved {
        mut command,
        invocation,
    } = engine::resolve(&ctx, &args)?;

    commons::install_interrupt_handler(ctx.handle())?;
    log::debug!("Invoking '{}' from the command line.", command.name());
    command.execute(&mut ctx, invocation)?;
    Ok(())
}
