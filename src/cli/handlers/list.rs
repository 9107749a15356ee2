// src/cli/handlers/list.rs

use crate::{
    cli::dispatcher::GlobalOptions,
    core::registry::{CommandRegistry, CommandScope},
    filters,
};
use anyhow::Result;
use colored::*;

/// Describes a command's options as `--long/-s` flags and `<positional>` names.
fn describe_options(command: &clap::Command) -> String {
    command
        .get_arguments()
        .filter(|arg| !matches!(arg.get_id().as_str(), "help" | "version"))
        .map(|arg| match (arg.get_long(), arg.get_short()) {
            (Some(long), Some(short)) => format!("[--{}|-{}]", long, short),
            (Some(long), None) => format!("[--{}]", long),
            (None, Some(short)) => format!("[-{}]", short),
            (None, None) => format!("<{}>", arg.get_id()),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Main entry point for the `commands` action.
pub fn handle_commands(_args: Vec<String>, _options: GlobalOptions) -> Result<()> {
    let registry = CommandRegistry::standard();
    println!("\n{}", t!("list.header.commands").yellow().bold());

    for def in registry.visible(true) {
        let mut command = (def.constructor)();
        let mut line = format!("  {:<18}", def.name.cyan());
        if command.requires_environment() {
            line.push_str("<environment> ");
        }
        if let Some(options) = command.options() {
            line.push_str(&describe_options(&options));
        }
        if command.accepts_passthrough() {
            line.push_str(" [-- args...]");
        }
        println!("{}", line);

        let mut traits = Vec::new();
        if def.scope == CommandScope::Script {
            traits.push(t!("list.label.script_only"));
        }
        if command.supports_filters() {
            traits.push(t!("list.label.filters"));
        }
        if command.as_block_handler().is_some() {
            traits.push(t!("list.label.block"));
        }
        println!("  {:<18}{}", "", def.summary);
        if !def.aliases.is_empty() {
            println!(
                "  {:<18}{} {}",
                "",
                t!("list.label.aliases").dimmed(),
                def.aliases.join(", ")
            );
        }
        if !traits.is_empty() {
            println!("  {:<18}{}", "", traits.join(", ").dimmed());
        }
    }
    Ok(())
}

/// Main entry point for the `filters` action.
pub fn handle_filters(_args: Vec<String>, _options: GlobalOptions) -> Result<()> {
    println!("\n{}", t!("list.header.filters").yellow().bold());
    for def in filters::definitions() {
        println!("  {:<10}{}", def.name.cyan(), def.summary);
    }
    println!("\n{}", t!("list.info.filter_usage").dimmed());
    Ok(())
}
