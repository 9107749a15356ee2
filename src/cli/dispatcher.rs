// src/cli/dispatcher.rs

use anyhow::Result;

use crate::cli::{Cli, handlers};

/// Options shared by every action.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalOptions {
    pub verbose: bool,
}

/// Defines a CLI action, its aliases, and its handler.
struct ActionDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    handler: fn(Vec<String>, GlobalOptions) -> Result<()>,
}

/// The single source of truth for all CLI actions.
/// Anything else on the command line is treated as a one-off command invocation.
static ACTION_REGISTRY: &[ActionDefinition] = &[
    ActionDefinition {
        name: "check",
        aliases: &[],
        handler: handlers::check::handle,
    },
    ActionDefinition {
        name: "commands",
        aliases: &["cmds"],
        handler: handlers::list::handle_commands,
    },
    ActionDefinition {
        name: "filters",
        aliases: &[],
        handler: handlers::list::handle_filters,
    },
    ActionDefinition {
        name: "run",
        aliases: &["script"],
        handler: handlers::run::handle,
    },
];

/// Finds an action definition by its name or alias.
fn find_action(name: &str) -> Option<&'static ActionDefinition> {
    ACTION_REGISTRY
        .iter()
        .find(|action| action.name == name || action.aliases.contains(&name))
}

/// Routes the parsed command line to an action handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    log::debug!("Dispatching args: {:?}", cli.args);
    let options = GlobalOptions {
        verbose: cli.verbose,
    };

    let Some((first, rest)) = cli.args.split_first() else {
        println!("{}", t!("cli.info.no_action"));
        return Ok(());
    };

    match find_action(first) {
        Some(action) => (action.handler)(rest.to_vec(), options),
        None => handlers::invoke::handle(cli.args, options),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actions_resolve_by_name_and_alias() {
        assert_eq!(find_action("run").map(|a| a.name), Some("run"));
        assert_eq!(find_action("cmds").map(|a| a.name), Some("commands"));
        assert!(find_action("echo").is_none());
    }
}
