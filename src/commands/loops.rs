// src/commands/loops.rs

//! Block-consuming commands. Each iteration runs the attached block in a child
//! engine that shares the caller's context, so the stop flag and variable
//! assignments flow both ways. The flag is checked before every iteration.

use crate::{
    commands::vars::validate_name,
    core::{
        commons::format_number,
        context::EngineContext,
        engine::Engine,
        error::{ScriptError, ScriptResult, StructuralError},
        registry::{BlockHandler, Command, Invocation, parse_options},
        tree::ScriptBlock,
    },
};
use clap::{CommandFactory, Parser};
use std::collections::VecDeque;

fn require_body(command: &str, body: &Option<ScriptBlock>) -> ScriptResult<ScriptBlock> {
    body.clone().ok_or_else(|| {
        StructuralError::MissingBlock {
            command: command.to_string(),
        }
        .into()
    })
}

fn check_cancelled(ctx: &EngineContext, command: &str) -> ScriptResult<()> {
    if ctx.is_cancelled() {
        log::info!("{}: stop requested, skipping remaining iterations.", command);
        return Err(ScriptError::Cancelled);
    }
    Ok(())
}

// --- for ---

#[derive(Parser, Debug)]
#[command(no_binary_name = true, name = "for", allow_negative_numbers = true)]
struct ForArgs {
    /// Variable receiving the current value.
    dest: String,

    /// First value.
    from: f64,

    /// Upper bound, excluded.
    to: f64,

    /// Increment between iterations. Must be positive.
    #[arg(long, short = 's', default_value_t = 1.0)]
    step: f64,
}

/// Counted loop over `[from, to)`.
#[derive(Debug, Default)]
pub struct ForLoop {
    body: Option<ScriptBlock>,
}

impl BlockHandler for ForLoop {
    fn attach_block(&mut self, block: ScriptBlock) {
        self.body = Some(block);
    }
}

impl Command for ForLoop {
    fn name(&self) -> &'static str {
        "for"
    }

    fn options(&self) -> Option<clap::Command> {
        Some(ForArgs::command())
    }

    fn as_block_handler(&mut self) -> Option<&mut dyn BlockHandler> {
        Some(self)
    }

    fn execute(&mut self, ctx: &mut EngineContext, inv: Invocation) -> ScriptResult<()> {
        let Some(args) = parse_options::<ForArgs>(ctx, self.name(), &inv.args)? else {
            return Ok(());
        };
        validate_name(self.name(), &args.dest)?;
        let body = require_body(self.name(), &self.body)?;
        if !args.from.is_finite() || !args.to.is_finite() {
            return Err(ScriptError::InvalidOptions {
                command: self.name().to_string(),
                message: format!("bounds must be finite numbers, got {} and {}", args.from, args.to),
            });
        }
        if !args.step.is_finite() || args.step <= 0.0 {
            return Err(ScriptError::InvalidOptions {
                command: self.name().to_string(),
                message: format!("step must be a positive number, got {}", args.step),
            });
        }

        let engine = Engine::for_block(body);
        let mut previous: Option<f64> = None;
        let mut index: u32 = 0;
        loop {
            // Derived from the counter, never accumulated.
            let current = args.from + f64::from(index) * args.step;
            if current >= args.to {
                break;
            }
            if previous.is_some_and(|p| current <= p) {
                return Err(self.stalled(&args));
            }
            check_cancelled(ctx, self.name())?;
            ctx.variables.set(args.dest.as_str(), format_number(current));
            engine.run(ctx)?;
            previous = Some(current);
            index = index.checked_add(1).ok_or_else(|| self.stalled(&args))?;
        }
        Ok(())
    }
}

impl ForLoop {
    fn stalled(&self, args: &ForArgs) -> ScriptError {
        ScriptError::InvalidOptions {
            command: self.name().to_string(),
            message: format!(
                "step {} is too small to advance from {} towards {}",
                args.step, args.from, args.to
            ),
        }
    }
}

pub fn build_for() -> Box<dyn Command> {
    Box::new(ForLoop::default())
}

// --- foreach ---

#[derive(Parser, Debug)]
#[command(no_binary_name = true, name = "foreach")]
struct ForeachArgs {
    /// Variable receiving the current element.
    dest: String,

    /// Name of the list variable to walk. A scalar counts as a one-element list.
    source: String,
}

/// Runs the body once per element of a list, working on a snapshot taken at
/// the start so the body may reassign the source freely.
#[derive(Debug, Default)]
pub struct Foreach {
    body: Option<ScriptBlock>,
}

impl BlockHandler for Foreach {
    fn attach_block(&mut self, block: ScriptBlock) {
        self.body = Some(block);
    }
}

impl Command for Foreach {
    fn name(&self) -> &'static str {
        "foreach"
    }

    fn options(&self) -> Option<clap::Command> {
        Some(ForeachArgs::command())
    }

    fn as_block_handler(&mut self) -> Option<&mut dyn BlockHandler> {
        Some(self)
    }

    fn execute(&mut self, ctx: &mut EngineContext, inv: Invocation) -> ScriptResult<()> {
        let Some(args) = parse_options::<ForeachArgs>(ctx, self.name(), &inv.args)? else {
            return Ok(());
        };
        validate_name(self.name(), &args.dest)?;
        let body = require_body(self.name(), &self.body)?;

        let mut pending: VecDeque<String> = ctx.variables.require(&args.source)?.to_list().into();
        log::debug!("foreach: {} element(s) from '{}'.", pending.len(), args.source);

        let engine = Engine::for_block(body);
        while let Some(item) = pending.pop_front() {
            check_cancelled(ctx, self.name())?;
            ctx.variables.set(args.dest.as_str(), item);
            engine.run(ctx)?;
        }
        Ok(())
    }
}

pub fn build_foreach() -> Box<dyn Command> {
    Box::new(Foreach::default())
}

#[cfg(test)]
mod tests {
    use crate::commands::test_support::{context, run};
    use crate::core::engine::{Engine, run_source};
    use crate::core::error::{ScriptError, StructuralError};
    use crate::core::parser::parse_source;
    use std::sync::Arc;

    #[test]
    fn test_for_with_step() {
        let (_, out) = run("for i 0 5 --step 2\n    echo ${i}\n");
        assert_eq!(out.stdout(), vec!["0", "2", "4"]);
    }

    #[test]
    fn test_for_negative_and_fractional() {
        let (_, out) = run("for i -1 1 --step 0.5\n    echo ${i}\n");
        assert_eq!(out.stdout(), vec!["-1", "-0.5", "0", "0.5"]);
    }

    #[test]
    fn test_for_empty_range_skips_body() {
        let (_, out) = run("for i 3 3\n    echo never\necho after\n");
        assert_eq!(out.stdout(), vec!["after"]);
    }

    #[test]
    fn test_for_rejects_non_positive_step() {
        let (mut ctx, _) = context();
        let err = run_source(&mut ctx, "for i 0 5 --step 0\n    echo x\n").unwrap_err();
        assert!(matches!(err.root_cause(), ScriptError::InvalidOptions { .. }));
    }

    #[test]
    fn test_for_step_below_float_spacing_fails_instead_of_spinning() {
        let (mut ctx, out) = context();
        let script = "for i 10000000000000000 10000000000000010\n    echo ${i}\n";
        let err = run_source(&mut ctx, script).unwrap_err();
        assert!(matches!(err.root_cause(), ScriptError::InvalidOptions { .. }));
        assert_eq!(out.stdout(), vec!["10000000000000000"]);
    }

    #[test]
    fn test_for_fractional_step_does_not_drift() {
        let (_, out) = run("for i 0 1 --step 0.1\n    echo ${i}\n");
        assert_eq!(out.stdout().len(), 10);
        assert_eq!(out.stdout().last().map(String::as_str), Some("0.9"));
    }

    #[test]
    fn test_loop_without_body_fails() {
        let (mut ctx, _) = context();
        let err = run_source(&mut ctx, "for i 0 2\necho after\n").unwrap_err();
        assert!(matches!(
            err.root_cause(),
            ScriptError::Structural(StructuralError::MissingBlock { command }) if command == "for"
        ));
    }

    #[test]
    fn test_nested_loops() {
        let script = "\
set --array rows a b
foreach row rows
    for col 0 2
        echo ${row}${col}
";
        let (_, out) = run(script);
        assert_eq!(out.stdout(), vec!["a0", "a1", "b0", "b1"]);
    }

    #[test]
    fn test_foreach_is_rerunnable() {
        let script = parse_source("set --array items a b c\nforeach item items\n    echo ${item}\n").unwrap();
        let engine = Engine::new(Arc::new(script));
        let (mut ctx, out) = context();
        engine.run(&mut ctx).unwrap();
        engine.run(&mut ctx).unwrap();
        assert_eq!(out.stdout(), vec!["a", "b", "c", "a", "b", "c"]);
    }

    #[test]
    fn test_foreach_works_on_snapshot() {
        let script = "\
set --array items a b
foreach item items
    set --array items z
    echo ${item}
";
        let (_, out) = run(script);
        assert_eq!(out.stdout(), vec!["a", "b"]);
    }

    #[test]
    fn test_foreach_missing_source() {
        let (mut ctx, _) = context();
        let err = run_source(&mut ctx, "foreach x nothing\n    echo ${x}\n").unwrap_err();
        assert!(matches!(err.root_cause(), ScriptError::VariableNotFound { .. }));
    }

    #[test]
    fn test_failure_inside_body_stops_loop() {
        let (mut ctx, out) = context();
        let script = "set --array items a b\nforeach item items\n    echo ${item}\n    bogus\n";
        let err = run_source(&mut ctx, script).unwrap_err();
        assert!(matches!(err.root_cause(), ScriptError::UnknownCommand { .. }));
        assert_eq!(out.stdout(), vec!["a"]);
        assert!(err.to_string().contains("line 2"));
        assert!(err.to_string().contains("line 4"));
    }

    #[test]
    fn test_pre_cancelled_loop_runs_nothing() {
        let (mut ctx, out) = context();
        ctx.destroy();
        let err = run_source(&mut ctx, "for i 0 3\n    echo ${i}\n").unwrap_err();
        assert!(err.is_cancellation());
        assert!(out.stdout().is_empty());
    }
}
