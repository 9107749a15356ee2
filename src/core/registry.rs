// src/core/registry.rs

use crate::{
    commands,
    core::{
        context::EngineContext,
        error::{ScriptError, ScriptResult},
        tree::ScriptBlock,
    },
    filters::FilterChain,
    models::EnvironmentConfig,
};
use clap::Parser;
use std::fmt;

// --- Command Interfaces ---

/// Everything a command receives for one invocation.
#[derive(Debug, Default)]
pub struct Invocation {
    /// Option tokens left after the command name, environment and filters are removed.
    pub args: Vec<String>,
    /// Raw tokens after `--`, for commands that accept passthrough arguments.
    pub passthrough: Vec<String>,
    /// The resolved environment, for commands that require one.
    pub environment: Option<EnvironmentConfig>,
    /// Filter stages from the `| ...` segments of the line.
    pub filters: FilterChain,
}

/// A command the engine can dispatch to.
///
/// A fresh instance is built for every invocation, so commands may keep
/// per-invocation state (a captured block, a working copy of a list).
pub trait Command: fmt::Debug + Send {
    fn name(&self) -> &'static str;

    /// Whether the first argument token names an environment.
    fn requires_environment(&self) -> bool {
        false
    }

    /// The command's own option grammar, if it has one.
    fn options(&self) -> Option<clap::Command> {
        None
    }

    /// Whether tokens after `--` are handed over untouched.
    fn accepts_passthrough(&self) -> bool {
        false
    }

    /// Whether `| filter ...` segments may follow the command.
    fn supports_filters(&self) -> bool {
        false
    }

    /// The block-handler capability, for commands that own a nested block.
    fn as_block_handler(&mut self) -> Option<&mut dyn BlockHandler> {
        None
    }

    fn execute(&mut self, ctx: &mut EngineContext, invocation: Invocation) -> ScriptResult<()>;
}

/// Implemented by commands that take the nested block following their line.
pub trait BlockHandler {
    fn attach_block(&mut self, block: ScriptBlock);
}

/// Parses a command's option tokens with its clap grammar.
///
/// Returns `Ok(None)` when help was requested; the help text has then been
/// emitted as output and the command has nothing left to do.
pub fn parse_options<T: Parser>(
    ctx: &mut EngineContext,
    command: &str,
    args: &[String],
) -> ScriptResult<Option<T>> {
    match T::try_parse_from(args) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e)
            if matches!(
                e.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            ) =>
        {
            for line in e.to_string().lines() {
                ctx.emit(line, true);
            }
            Ok(None)
        }
        Err(e) => Err(ScriptError::invalid_options(command, &e)),
    }
}

// --- Command Definition and Registry ---

/// Where a command may be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandScope {
    /// Available on the command line and inside scripts.
    General,
    /// Only resolvable while a script runs.
    Script,
}

/// Describes a command and how to build a fresh instance of it.
#[derive(Debug, Clone, Copy)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub scope: CommandScope,
    pub summary: &'static str,
    pub constructor: fn() -> Box<dyn Command>,
}

/// Name-to-constructor table consulted for every dispatched line.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    definitions: Vec<CommandDefinition>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl CommandRegistry {
    /// A registry with no commands at all.
    pub fn empty() -> Self {
        Self {
            definitions: Vec::new(),
        }
    }

    /// The built-in general and script-only commands.
    pub fn standard() -> Self {
        Self {
            definitions: commands::definitions().to_vec(),
        }
    }

    /// Adds a definition. A later definition shadows an earlier one with the same name.
    pub fn register(&mut self, definition: CommandDefinition) {
        self.definitions.insert(0, definition);
    }

    /// Finds a command definition by its name or alias.
    pub fn find(&self, name: &str, include_script: bool) -> Option<&CommandDefinition> {
        self.definitions.iter().find(|def| {
            (include_script || def.scope == CommandScope::General)
                && (def.name == name || def.aliases.contains(&name))
        })
    }

    /// Every resolvable definition, sorted by name.
    pub fn visible(&self, include_script: bool) -> Vec<&CommandDefinition> {
        let mut seen = std::collections::HashSet::new();
        let mut defs: Vec<_> = self
            .definitions
            .iter()
            .filter(|def| include_script || def.scope == CommandScope::General)
            .filter(|def| seen.insert(def.name))
            .collect();
        defs.sort_by_key(|def| def.name);
        defs
    }

    /// Names of every resolvable command, sorted.
    pub fn names(&self, include_script: bool) -> Vec<String> {
        self.visible(include_script)
            .into_iter()
            .map(|def| def.name.to_string())
            .collect()
    }
}
