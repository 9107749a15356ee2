// src/core/error.rs

use crate::system::executor::ExecutionError;
use thiserror::Error;

/// Structural problems in how a script's blocks line up with its commands.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    /// A nested block appears where a command line was expected, either at the
    /// start of a block or after a command that cannot own one.
    #[error("Expected command, found nested block (line {line}).")]
    ExpectedCommand { line: usize },
    /// Filter stages were attached to a command whose output cannot be filtered.
    #[error("Command '{command}' does not support filters.")]
    FiltersNotSupported { command: String },
    /// A block-consuming command was given no body.
    #[error("Command '{command}' requires a nested block.")]
    MissingBlock { command: String },
}

/// Every failure the script subsystem can report.
#[derive(Error, Debug)]
pub enum ScriptError {
    /// Mixed tabs and spaces in one indentation prefix, or a dedent to an unknown depth.
    #[error("Indentation error on line {line}: {reason}")]
    Indentation { line: usize, reason: String },

    #[error("Unknown command '{name}'. Known commands: {}", .known.join(", "))]
    UnknownCommand { name: String, known: Vec<String> },

    #[error("Command '{command}' requires an environment name.")]
    MissingEnvironment { command: String },

    #[error("Command '{command}': environment '{name}' does not exist.")]
    InvalidEnvironment { command: String, name: String },

    /// Unbalanced quotes while splitting a line into tokens.
    #[error("Could not split line into options (check quoting): {line}")]
    OptionSplit { line: String },

    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error("Variable '{name}' not found.")]
    VariableNotFound { name: String },

    #[error("Variable '{name}' must be {expected}.")]
    VariableType { name: String, expected: &'static str },

    #[error("Filter '{filter}' is misconfigured: {reason}")]
    FilterConfiguration { filter: String, reason: String },

    #[error("Unknown filter '{name}'. Known filters: {}", .known.join(", "))]
    UnknownFilter { name: String, known: Vec<String> },

    /// The command's own option grammar rejected its arguments.
    #[error("Invalid options for '{command}': {message}")]
    InvalidOptions { command: String, message: String },

    #[error(
        "Variable expansion exceeded {depth} passes. Check for variables that reference themselves."
    )]
    RecursiveExpansion { depth: u32 },

    #[error("Script was cancelled.")]
    Cancelled,

    /// A failure raised while running a specific script line.
    #[error("line {line} (`{text}`): {source}")]
    AtLine {
        line: usize,
        text: String,
        source: Box<ScriptError>,
    },

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScriptError {
    /// True when the failure is a consequence of a stop request rather than a fault.
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self.root_cause(),
            Self::Cancelled | Self::Execution(ExecutionError::Cancelled)
        )
    }

    /// The innermost error, with every line context peeled off.
    pub fn root_cause(&self) -> &ScriptError {
        let mut current = self;
        while let Self::AtLine { source, .. } = current {
            current = source;
        }
        current
    }

    /// Attaches the script line that was running when the error occurred.
    pub fn at_line(self, line: usize, text: &str) -> Self {
        Self::AtLine {
            line,
            text: text.to_string(),
            source: Box::new(self),
        }
    }

    /// Builds an [`ScriptError::InvalidOptions`] from a clap rejection.
    pub fn invalid_options(command: &str, err: &clap::Error) -> Self {
        Self::InvalidOptions {
            command: command.to_string(),
            message: err.to_string().trim().to_string(),
        }
    }
}

/// Result alias used across the script subsystem.
pub type ScriptResult<T> = Result<T, ScriptError>;
