// src/commands/vars.rs

use crate::{
    core::{
        context::EngineContext,
        error::{ScriptError, ScriptResult},
        registry::{Command, Invocation, parse_options},
    },
    models::Value,
};
use clap::{CommandFactory, Parser};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;

lazy_static! {
    static ref VAR_NAME_RE: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*$").unwrap();
}

/// Rejects names that could never be referenced as `${name}`.
pub(crate) fn validate_name(command: &str, name: &str) -> ScriptResult<()> {
    if VAR_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(ScriptError::InvalidOptions {
            command: command.to_string(),
            message: format!("'{}' is not a valid variable name", name),
        })
    }
}

// --- set ---

#[derive(Parser, Debug)]
#[command(no_binary_name = true, name = "set")]
struct SetArgs {
    /// Store the values as a list instead of joining them into one string.
    #[arg(long, short = 'a')]
    array: bool,

    /// Variable to assign.
    name: String,

    /// Value words. Without --array they are joined by single spaces.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    values: Vec<String>,
}

#[derive(Debug, Default)]
pub struct Set;

impl Command for Set {
    fn name(&self) -> &'static str {
        "set"
    }

    fn options(&self) -> Option<clap::Command> {
        Some(SetArgs::command())
    }

    fn execute(&mut self, ctx: &mut EngineContext, inv: Invocation) -> ScriptResult<()> {
        let Some(args) = parse_options::<SetArgs>(ctx, self.name(), &inv.args)? else {
            return Ok(());
        };
        validate_name(self.name(), &args.name)?;
        let value = if args.array {
            Value::Array(args.values)
        } else {
            Value::Scalar(args.values.join(" "))
        };
        log::debug!("set {} = {}", args.name, value);
        ctx.variables.set(args.name, value);
        Ok(())
    }
}

pub fn build_set() -> Box<dyn Command> {
    Box::new(Set)
}

// --- unset ---

#[derive(Parser, Debug)]
#[command(no_binary_name = true, name = "unset")]
struct UnsetArgs {
    /// Variables to remove. Names that do not exist are ignored.
    #[arg(required = true)]
    names: Vec<String>,
}

#[derive(Debug, Default)]
pub struct Unset;

impl Command for Unset {
    fn name(&self) -> &'static str {
        "unset"
    }

    fn options(&self) -> Option<clap::Command> {
        Some(UnsetArgs::command())
    }

    fn execute(&mut self, ctx: &mut EngineContext, inv: Invocation) -> ScriptResult<()> {
        let Some(args) = parse_options::<UnsetArgs>(ctx, self.name(), &inv.args)? else {
            return Ok(());
        };
        for name in &args.names {
            if ctx.variables.remove(name).is_none() {
                log::debug!("unset: '{}' was not set.", name);
            }
        }
        Ok(())
    }
}

pub fn build_unset() -> Box<dyn Command> {
    Box::new(Unset)
}

// --- dump_vars ---

#[derive(Parser, Debug)]
#[command(no_binary_name = true, name = "dump_vars")]
struct DumpArgs {
    /// Print the variables as a JSON object.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Default)]
pub struct DumpVars;

impl Command for DumpVars {
    fn name(&self) -> &'static str {
        "dump_vars"
    }

    fn options(&self) -> Option<clap::Command> {
        Some(DumpArgs::command())
    }

    fn supports_filters(&self) -> bool {
        true
    }

    fn execute(&mut self, ctx: &mut EngineContext, mut inv: Invocation) -> ScriptResult<()> {
        let Some(args) = parse_options::<DumpArgs>(ctx, self.name(), &inv.args)? else {
            return Ok(());
        };

        let lines: Vec<String> = if args.json {
            let sorted: BTreeMap<&String, &Value> = ctx.variables.sorted().into_iter().collect();
            let json = serde_json::to_string_pretty(&sorted)
                .map_err(|e| ScriptError::Other(e.into()))?;
            json.lines().map(str::to_string).collect()
        } else {
            ctx.variables
                .sorted()
                .into_iter()
                .map(|(name, value)| format!("{} = {}", name, value))
                .collect()
        };

        for line in lines {
            if let Some(line) = inv.filters.apply(line, true) {
                ctx.emit(&line, true);
            }
        }
        Ok(())
    }
}

pub fn build_dump() -> Box<dyn Command> {
    Box::new(DumpVars)
}

#[cfg(test)]
mod tests {
    use crate::commands::test_support::{context, run};
    use crate::core::engine::run_source;
    use crate::core::error::ScriptError;
    use crate::models::Value;

    #[test]
    fn test_set_scalar_joins_words() {
        let (ctx, _) = run("set greeting hello   big world\n");
        assert_eq!(ctx.variables.get("greeting"), Some(&Value::from("hello big world")));
    }

    #[test]
    fn test_set_array_and_negative_values() {
        let (ctx, _) = run("set --array nums 1 -2 3\n");
        assert_eq!(
            ctx.variables.get("nums"),
            Some(&Value::from(vec!["1".to_string(), "-2".to_string(), "3".to_string()]))
        );
    }

    #[test]
    fn test_set_without_values_is_empty_string() {
        let (ctx, _) = run("set blank\n");
        assert_eq!(ctx.variables.get("blank"), Some(&Value::from("")));
    }

    #[test]
    fn test_set_rejects_bad_name() {
        let (mut ctx, _) = context();
        let err = run_source(&mut ctx, "set \"two words\" x\n").unwrap_err();
        assert!(matches!(err.root_cause(), ScriptError::InvalidOptions { .. }));
    }

    #[test]
    fn test_unset_removes_and_ignores_missing() {
        let (ctx, _) = run("set a 1\nset b 2\nunset a missing\n");
        assert!(!ctx.variables.has("a"));
        assert!(ctx.variables.has("b"));
    }

    #[test]
    fn test_unset_requires_a_name() {
        let (mut ctx, _) = context();
        let err = run_source(&mut ctx, "unset\n").unwrap_err();
        assert!(matches!(err.root_cause(), ScriptError::InvalidOptions { command, .. } if command == "unset"));
    }

    #[test]
    fn test_dump_vars_sorted() {
        let (_, out) = run("set b 2\nset --array a x y\ndump_vars\n");
        assert_eq!(out.stdout(), vec!["a = [\"x\", \"y\"]", "b = \"2\""]);
    }

    #[test]
    fn test_dump_vars_json() {
        let (_, out) = run("set name demo\ndump_vars --json\n");
        let json: serde_json::Value = serde_json::from_str(&out.stdout().join("\n")).unwrap();
        assert_eq!(json["name"], "demo");
    }

    #[test]
    fn test_help_is_emitted_instead_of_failing() {
        let (_, out) = run("unset --help\n");
        assert!(out.stdout().iter().any(|line| line.contains("Usage")));
    }
}
