// src/commands/exec.rs

use crate::{
    core::{
        context::EngineContext,
        error::{ScriptError, ScriptResult},
        paths,
        registry::{Command, Invocation, parse_options},
    },
    filters::FilterChain,
    system::executor::{self, ExecutionError, ProcessSpec},
};
use clap::{CommandFactory, Parser};

#[derive(Parser, Debug)]
#[command(no_binary_name = true, name = "exec")]
struct ExecArgs {
    /// Store the filtered standard output in this variable instead of printing it.
    #[arg(long, value_name = "VAR")]
    into: Option<String>,

    /// With --into, store one list element per line instead of a single string.
    #[arg(long, requires = "into")]
    lines: bool,

    /// Directory to run the program in.
    #[arg(long, short = 'C', value_name = "DIR")]
    cwd: Option<String>,

    /// The program followed by its arguments.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

/// Runs a process, routing its filtered output to the context's listeners.
///
/// When `capture` is given, filtered stdout lines are collected there instead
/// of being emitted. Stderr is always emitted.
pub(crate) fn stream_process(
    ctx: &mut EngineContext,
    spec: &ProcessSpec<'_>,
    filters: &mut FilterChain,
    mut capture: Option<&mut Vec<String>>,
) -> Result<(), ExecutionError> {
    let token = ctx.cancellation_token().clone();
    executor::run_streaming(spec, &token, |line, is_stdout| {
        let Some(line) = filters.apply(line, is_stdout) else {
            return;
        };
        match capture.as_deref_mut() {
            Some(lines) if is_stdout => lines.push(line),
            _ => ctx.emit(&line, is_stdout),
        }
    })
}

#[derive(Debug, Default)]
pub struct Exec;

impl Command for Exec {
    fn name(&self) -> &'static str {
        "exec"
    }

    fn options(&self) -> Option<clap::Command> {
        Some(ExecArgs::command())
    }

    fn supports_filters(&self) -> bool {
        true
    }

    fn execute(&mut self, ctx: &mut EngineContext, mut inv: Invocation) -> ScriptResult<()> {
        let Some(args) = parse_options::<ExecArgs>(ctx, self.name(), &inv.args)? else {
            return Ok(());
        };
        let Some((program, program_args)) = args.command.split_first() else {
            return Err(ExecutionError::EmptyCommand.into());
        };
        let cwd = match args.cwd.as_deref() {
            Some(dir) => Some(paths::expand_path(dir).map_err(|e| ScriptError::Other(e.into()))?),
            None => None,
        };

        let spec = ProcessSpec {
            program,
            args: program_args,
            cwd: cwd.as_deref(),
            env: None,
        };

        let mut captured = Vec::new();
        let capture = args.into.is_some().then_some(&mut captured);
        stream_process(ctx, &spec, &mut inv.filters, capture)?;

        if let Some(var) = args.into {
            log::debug!("Captured {} line(s) into '{}'.", captured.len(), var);
            if args.lines {
                ctx.variables.set(var, captured);
            } else {
                ctx.variables.set(var, captured.join("\n"));
            }
        }
        Ok(())
    }
}

pub fn build() -> Box<dyn Command> {
    Box::new(Exec)
}
