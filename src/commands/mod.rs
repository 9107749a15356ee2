// src/commands/mod.rs

//! # Built-in Commands
//!
//! General commands work both on the command line and inside scripts.
//! Script-only commands manipulate the variable store or drive nested blocks,
//! so they only resolve while a script runs.
//!
//! Commands that write into a variable take the destination name first.

use crate::core::registry::{CommandDefinition, CommandScope};

pub mod calc;
pub mod echo;
pub mod env_info;
pub mod exec;
pub mod files;
pub mod launch;
pub mod loops;
pub mod text;
pub mod vars;

/// The single source of truth for all built-in commands.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    // --- General ---
    CommandDefinition {
        name: "echo",
        aliases: &["print"],
        scope: CommandScope::General,
        summary: "Print text as a line of output.",
        constructor: echo::build,
    },
    CommandDefinition {
        name: "env_info",
        aliases: &["info"],
        scope: CommandScope::General,
        summary: "Show how an environment is configured.",
        constructor: env_info::build,
    },
    CommandDefinition {
        name: "exec",
        aliases: &["run"],
        scope: CommandScope::General,
        summary: "Run an external program and stream its output.",
        constructor: exec::build,
    },
    CommandDefinition {
        name: "launch",
        aliases: &["start"],
        scope: CommandScope::General,
        summary: "Start the program configured for an environment.",
        constructor: launch::build,
    },
    // --- Script-only ---
    CommandDefinition {
        name: "calc",
        aliases: &[],
        scope: CommandScope::Script,
        summary: "Evaluate an arithmetic expression into a variable.",
        constructor: calc::build,
    },
    CommandDefinition {
        name: "delete_dir",
        aliases: &["rmdir"],
        scope: CommandScope::Script,
        summary: "Delete a directory and everything in it.",
        constructor: files::build_delete_dir,
    },
    CommandDefinition {
        name: "dump_vars",
        aliases: &["vars"],
        scope: CommandScope::Script,
        summary: "Print every variable and its value.",
        constructor: vars::build_dump,
    },
    CommandDefinition {
        name: "flatten",
        aliases: &["join"],
        scope: CommandScope::Script,
        summary: "Join a list variable into a single string.",
        constructor: text::build_flatten,
    },
    CommandDefinition {
        name: "for",
        aliases: &[],
        scope: CommandScope::Script,
        summary: "Run the nested block for each number in a range.",
        constructor: loops::build_for,
    },
    CommandDefinition {
        name: "foreach",
        aliases: &[],
        scope: CommandScope::Script,
        summary: "Run the nested block once per element of a list variable.",
        constructor: loops::build_foreach,
    },
    CommandDefinition {
        name: "list_dirs",
        aliases: &[],
        scope: CommandScope::Script,
        summary: "Collect the directories inside a directory.",
        constructor: files::build_list_dirs,
    },
    CommandDefinition {
        name: "list_files",
        aliases: &[],
        scope: CommandScope::Script,
        summary: "Collect the files inside a directory.",
        constructor: files::build_list_files,
    },
    CommandDefinition {
        name: "read_lines",
        aliases: &[],
        scope: CommandScope::Script,
        summary: "Read a text file into a list variable, one element per line.",
        constructor: files::build_read_lines,
    },
    CommandDefinition {
        name: "replace",
        aliases: &[],
        scope: CommandScope::Script,
        summary: "Find and replace inside a variable.",
        constructor: text::build_replace,
    },
    CommandDefinition {
        name: "replace_extension",
        aliases: &["ext"],
        scope: CommandScope::Script,
        summary: "Swap the extension of a path.",
        constructor: text::build_replace_extension,
    },
    CommandDefinition {
        name: "set",
        aliases: &[],
        scope: CommandScope::Script,
        summary: "Assign a scalar or list variable.",
        constructor: vars::build_set,
    },
    CommandDefinition {
        name: "split",
        aliases: &[],
        scope: CommandScope::Script,
        summary: "Split a string variable into a list.",
        constructor: text::build_split,
    },
    CommandDefinition {
        name: "unset",
        aliases: &[],
        scope: CommandScope::Script,
        summary: "Remove variables.",
        constructor: vars::build_unset,
    },
];

/// Every built-in command definition.
pub fn definitions() -> &'static [CommandDefinition] {
    COMMAND_REGISTRY
}
