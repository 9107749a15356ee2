// src/core/engine.rs

//! # Execution Engine
//!
//! Walks one block of a parsed script, dispatching each line in order and
//! stopping at the first failure.
//!
//! Dispatching a line goes through these steps:
//!
//! 1. Expand `${}` and `@{}` references.
//! 2. Split into tokens with shell-like quoting.
//! 3. Look up the first token in the command registry.
//! 4. For commands that require one, take the next token as an environment name.
//! 5. Cut the remaining tokens at each standalone `|`; every later segment is a filter stage.
//! 6. For commands that accept passthrough, cut their own tokens at the first `--`.
//! 7. Hand the following nested block, if any, to a block-handling command. Other
//!    commands leave it in place and it fails as a stray block after they run.
//! 8. Execute.

use crate::{
    constants::{FILTER_PIPE, PASSTHROUGH_SEPARATOR},
    core::{
        context::EngineContext,
        error::{ScriptError, ScriptResult, StructuralError},
        parser,
        registry::{Command, Invocation},
        tree::{BlockId, Instruction, Script, ScriptBlock, ScriptLine},
    },
    filters::{self, FilterChain},
};
use anyhow::anyhow;
use colored::*;
use std::sync::Arc;

/// A command instance ready to run, with its invocation assembled.
#[derive(Debug)]
pub struct Resolved {
    pub command: Box<dyn Command>,
    pub invocation: Invocation,
}

/// Resolves a token list against the context's registry and environments.
pub fn resolve(ctx: &EngineContext, tokens: &[String]) -> ScriptResult<Resolved> {
    let (name, mut rest) = tokens
        .split_first()
        .ok_or_else(|| anyhow!("Nothing to execute."))?;

    let include_script = ctx.allows_script_commands();
    let definition = ctx
        .registry()
        .find(name, include_script)
        .ok_or_else(|| ScriptError::UnknownCommand {
            name: name.clone(),
            known: ctx.registry().names(include_script),
        })?;
    let command = (definition.constructor)();

    let environment = if command.requires_environment() {
        let env_name = match rest.split_first() {
            Some((first, tail)) if first != FILTER_PIPE => {
                rest = tail;
                first
            }
            _ => {
                return Err(ScriptError::MissingEnvironment {
                    command: command.name().to_string(),
                });
            }
        };
        let environment = ctx.environments().resolve(env_name).ok_or_else(|| {
            ScriptError::InvalidEnvironment {
                command: command.name().to_string(),
                name: env_name.clone(),
            }
        })?;
        Some(environment)
    } else {
        None
    };

    let mut segments = rest.split(|token| token == FILTER_PIPE);
    let own = segments.next().unwrap_or_default();

    let mut chain = FilterChain::new();
    for segment in segments {
        if !command.supports_filters() {
            return Err(StructuralError::FiltersNotSupported {
                command: command.name().to_string(),
            }
            .into());
        }
        chain.push(filters::build_stage(segment)?);
    }

    let (args, passthrough) = match own.iter().position(|t| t == PASSTHROUGH_SEPARATOR) {
        Some(index) if command.accepts_passthrough() => {
            let (head, tail) = own.split_at(index);
            (head.to_vec(), tail.iter().skip(1).cloned().collect())
        }
        _ => (own.to_vec(), Vec::new()),
    };

    Ok(Resolved {
        command,
        invocation: Invocation {
            args,
            passthrough,
            environment,
            filters: chain,
        },
    })
}

/// Runs the instructions of one block against a shared context.
#[derive(Debug, Clone)]
pub struct Engine {
    block: ScriptBlock,
}

impl Engine {
    /// An engine for the root block of a script.
    pub fn new(script: Arc<Script>) -> Self {
        Self {
            block: ScriptBlock::root(script),
        }
    }

    /// A child engine for a nested block.
    pub fn for_block(block: ScriptBlock) -> Self {
        Self { block }
    }

    /// Runs the block and reports success as a boolean.
    ///
    /// On failure the error message is pushed to the context's error sink.
    pub fn execute(&self, ctx: &mut EngineContext) -> bool {
        match self.run(ctx) {
            Ok(()) => true,
            Err(e) => {
                if e.is_cancellation() {
                    log::info!("Script stopped: {}", e);
                } else {
                    log::error!("Script failed: {}", e);
                }
                ctx.push_error(e.to_string());
                false
            }
        }
    }

    /// Runs every instruction in order, stopping at the first failure.
    pub fn run(&self, ctx: &mut EngineContext) -> ScriptResult<()> {
        let items = &self.block.block().items;
        let mut index = 0;

        while let Some(item) = items.get(index) {
            let line = match item {
                Instruction::Line(line) => line,
                Instruction::Block(id) => {
                    let line = self.block.script.first_line_number(*id).unwrap_or_default();
                    return Err(StructuralError::ExpectedCommand { line }.into());
                }
            };

            let nested = match items.get(index + 1) {
                Some(Instruction::Block(id)) => Some(*id),
                _ => None,
            };

            let consumed_block = self
                .dispatch(ctx, line, nested)
                .map_err(|e| e.at_line(line.number, &line.text))?;
            index += if consumed_block { 2 } else { 1 };
        }
        Ok(())
    }

    /// Dispatches one line. Returns whether the following block was handed to the command.
    ///
    /// A block offered to a command without a block handler is left in place; the
    /// command still runs and the block fails as a stray one on the next step.
    fn dispatch(
        &self,
        ctx: &mut EngineContext,
        line: &ScriptLine,
        nested: Option<BlockId>,
    ) -> ScriptResult<bool> {
        if ctx.is_verbose() {
            eprintln!("{} {}", "»".dimmed(), line.text.dimmed());
        }
        let expanded = ctx.variables.expand(&line.text)?;
        if ctx.is_verbose() {
            eprintln!("{} {}", "→".blue(), expanded.green());
        }

        let tokens = shlex::split(&expanded).ok_or_else(|| ScriptError::OptionSplit {
            line: expanded.clone(),
        })?;
        if tokens.is_empty() {
            log::debug!("Line {} expanded to nothing; skipping.", line.number);
            return Ok(false);
        }

        let Resolved {
            mut command,
            invocation,
        } = resolve(ctx, &tokens)?;

        let mut consumed_block = false;
        if let Some(id) = nested {
            match command.as_block_handler() {
                Some(handler) => {
                    handler.attach_block(ScriptBlock::new(self.block.script.clone(), id));
                    consumed_block = true;
                }
                None => log::debug!(
                    "Line {}: '{}' takes no block; running it without one.",
                    line.number,
                    command.name()
                ),
            }
        }

        log::debug!("Line {}: running '{}'.", line.number, command.name());
        command.execute(ctx, invocation)?;
        Ok(consumed_block)
    }
}

/// Parses and runs a script source against a context.
pub fn run_source(ctx: &mut EngineContext, source: &str) -> ScriptResult<()> {
    let script = parser::parse_source(source)?;
    Engine::new(Arc::new(script)).run(ctx)
}

/// Like [`run_source`], but records any failure in the context's error sink.
pub fn execute_source(ctx: &mut EngineContext, source: &str) -> bool {
    match parser::parse_source(source) {
        Ok(script) => Engine::new(Arc::new(script)).execute(ctx),
        Err(e) => {
            log::error!("Script could not be parsed: {}", e);
            ctx.push_error(e.to_string());
            false
        }
    }
}
