// src/commands/text.rs

//! String and list manipulation on variables.

use crate::{
    commands::vars::validate_name,
    core::{
        context::EngineContext,
        error::{ScriptError, ScriptResult},
        registry::{Command, Invocation, parse_options},
    },
    models::Value,
};
use clap::{CommandFactory, Parser};
use regex::Regex;
use std::path::Path;

fn compile(command: &str, pattern: &str) -> ScriptResult<Regex> {
    Regex::new(pattern).map_err(|e| ScriptError::InvalidOptions {
        command: command.to_string(),
        message: e.to_string(),
    })
}

// --- split ---

#[derive(Parser, Debug)]
#[command(no_binary_name = true, name = "split")]
struct SplitArgs {
    /// Variable receiving the list.
    dest: String,

    /// Name of the scalar variable to split.
    source: String,

    /// Separator between elements.
    #[arg(long, short = 's', default_value = ",")]
    separator: String,

    /// Treat the separator as a regular expression.
    #[arg(long, short = 'r')]
    regex: bool,

    /// Trim whitespace around each element and drop empty ones.
    #[arg(long, short = 't')]
    trim: bool,
}

#[derive(Debug, Default)]
pub struct Split;

impl Command for Split {
    fn name(&self) -> &'static str {
        "split"
    }

    fn options(&self) -> Option<clap::Command> {
        Some(SplitArgs::command())
    }

    fn execute(&mut self, ctx: &mut EngineContext, inv: Invocation) -> ScriptResult<()> {
        let Some(args) = parse_options::<SplitArgs>(ctx, self.name(), &inv.args)? else {
            return Ok(());
        };
        validate_name(self.name(), &args.dest)?;
        let text = ctx.variables.require_scalar(&args.source)?;

        let mut parts: Vec<String> = if text.is_empty() {
            Vec::new()
        } else if args.regex {
            compile(self.name(), &args.separator)?
                .split(text)
                .map(str::to_string)
                .collect()
        } else if args.separator.is_empty() {
            text.chars().map(String::from).collect()
        } else {
            text.split(args.separator.as_str()).map(str::to_string).collect()
        };

        if args.trim {
            parts = parts
                .into_iter()
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect();
        }
        ctx.variables.set(args.dest, parts);
        Ok(())
    }
}

pub fn build_split() -> Box<dyn Command> {
    Box::new(Split)
}

// --- flatten ---

#[derive(Parser, Debug)]
#[command(no_binary_name = true, name = "flatten")]
struct FlattenArgs {
    /// Variable receiving the joined string.
    dest: String,

    /// Name of the list variable to join. A scalar is copied as is.
    source: String,

    /// Text placed between elements.
    #[arg(long, short = 's', default_value = " ")]
    separator: String,
}

#[derive(Debug, Default)]
pub struct Flatten;

impl Command for Flatten {
    fn name(&self) -> &'static str {
        "flatten"
    }

    fn options(&self) -> Option<clap::Command> {
        Some(FlattenArgs::command())
    }

    fn execute(&mut self, ctx: &mut EngineContext, inv: Invocation) -> ScriptResult<()> {
        let Some(args) = parse_options::<FlattenArgs>(ctx, self.name(), &inv.args)? else {
            return Ok(());
        };
        validate_name(self.name(), &args.dest)?;
        let joined = ctx.variables.require(&args.source)?.to_list().join(&args.separator);
        ctx.variables.set(args.dest, joined);
        Ok(())
    }
}

pub fn build_flatten() -> Box<dyn Command> {
    Box::new(Flatten)
}

// --- replace ---

#[derive(Parser, Debug)]
#[command(no_binary_name = true, name = "replace")]
struct ReplaceArgs {
    /// Variable receiving the result.
    dest: String,

    /// Name of the variable to rewrite. Lists are rewritten element by element.
    source: String,

    /// Text (or regex with --regex) to look for.
    pattern: String,

    /// Replacement text. With --regex, `$1`-style group references are honored.
    #[arg(allow_hyphen_values = true)]
    replacement: String,

    /// Treat the pattern as a regular expression.
    #[arg(long, short = 'r')]
    regex: bool,

    /// Replace only the first occurrence in each string.
    #[arg(long, short = 'f')]
    first: bool,
}

#[derive(Debug, Default)]
pub struct Replace;

impl Command for Replace {
    fn name(&self) -> &'static str {
        "replace"
    }

    fn options(&self) -> Option<clap::Command> {
        Some(ReplaceArgs::command())
    }

    fn execute(&mut self, ctx: &mut EngineContext, inv: Invocation) -> ScriptResult<()> {
        let Some(args) = parse_options::<ReplaceArgs>(ctx, self.name(), &inv.args)? else {
            return Ok(());
        };
        validate_name(self.name(), &args.dest)?;

        let pattern = if args.regex {
            Some(compile(self.name(), &args.pattern)?)
        } else {
            None
        };
        let rewrite = |text: &str| -> String {
            match (&pattern, args.first) {
                (Some(re), true) => re.replace(text, args.replacement.as_str()).into_owned(),
                (Some(re), false) => re.replace_all(text, args.replacement.as_str()).into_owned(),
                (None, _) if args.pattern.is_empty() => text.to_string(),
                (None, true) => text.replacen(args.pattern.as_str(), &args.replacement, 1),
                (None, false) => text.replace(args.pattern.as_str(), &args.replacement),
            }
        };

        let result = match ctx.variables.require(&args.source)? {
            Value::Scalar(text) => Value::Scalar(rewrite(text)),
            Value::Array(items) => Value::Array(items.iter().map(|item| rewrite(item)).collect()),
        };
        ctx.variables.set(args.dest, result);
        Ok(())
    }
}

pub fn build_replace() -> Box<dyn Command> {
    Box::new(Replace)
}

// --- replace_extension ---

#[derive(Parser, Debug)]
#[command(no_binary_name = true, name = "replace_extension")]
struct ReplaceExtensionArgs {
    /// Variable receiving the new path.
    dest: String,

    /// The path whose extension changes.
    path: String,

    /// New extension, with or without the leading dot. Empty removes it.
    extension: String,
}

#[derive(Debug, Default)]
pub struct ReplaceExtension;

impl Command for ReplaceExtension {
    fn name(&self) -> &'static str {
        "replace_extension"
    }

    fn options(&self) -> Option<clap::Command> {
        Some(ReplaceExtensionArgs::command())
    }

    fn execute(&mut self, ctx: &mut EngineContext, inv: Invocation) -> ScriptResult<()> {
        let Some(args) = parse_options::<ReplaceExtensionArgs>(ctx, self.name(), &inv.args)?
        else {
            return Ok(());
        };
        validate_name(self.name(), &args.dest)?;
        let extension = args.extension.trim_start_matches('.');
        let path = Path::new(&args.path).with_extension(extension);
        ctx.variables
            .set(args.dest, path.to_string_lossy().into_owned());
        Ok(())
    }
}

pub fn build_replace_extension() -> Box<dyn Command> {
    Box::new(ReplaceExtension)
}

#[cfg(test)]
mod tests {
    use crate::commands::test_support::{context, run};
    use crate::core::engine::run_source;
    use crate::core::error::ScriptError;
    use crate::models::Value;

    fn list(items: &[&str]) -> Value {
        Value::from(items.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn test_split_default_separator() {
        let (ctx, _) = run("set csv a,b,,c\nsplit parts csv\n");
        assert_eq!(ctx.variables.get("parts"), Some(&list(&["a", "b", "", "c"])));
    }

    #[test]
    fn test_split_trim_and_regex() {
        let (ctx, _) = run("set text \"one ; two;;three \"\nsplit parts text --separator \";+\" --regex --trim\n");
        assert_eq!(ctx.variables.get("parts"), Some(&list(&["one", "two", "three"])));
    }

    #[test]
    fn test_split_empty_string_is_empty_list() {
        let (ctx, _) = run("set empty\nsplit parts empty\n");
        assert_eq!(ctx.variables.get("parts"), Some(&list(&[])));
    }

    #[test]
    fn test_split_requires_scalar() {
        let (mut ctx, _) = context();
        let err = run_source(&mut ctx, "set --array l a b\nsplit parts l\n").unwrap_err();
        assert!(matches!(err.root_cause(), ScriptError::VariableType { .. }));
    }

    #[test]
    fn test_flatten_with_separator() {
        let (ctx, _) = run("set --array l a b c\nflatten joined l --separator \", \"\nflatten same joined\n");
        assert_eq!(ctx.variables.get("joined"), Some(&Value::from("a, b, c")));
        assert_eq!(ctx.variables.get("same"), Some(&Value::from("a, b, c")));
    }

    #[test]
    fn test_flatten_missing_variable() {
        let (mut ctx, _) = context();
        let err = run_source(&mut ctx, "flatten out nothing\n").unwrap_err();
        assert!(matches!(err.root_cause(), ScriptError::VariableNotFound { name } if name == "nothing"));
    }

    #[test]
    fn test_replace_literal_all_and_first() {
        let (ctx, _) = run("set s banana\nreplace all s a o\nreplace one s a o --first\n");
        assert_eq!(ctx.variables.get("all"), Some(&Value::from("bonono")));
        assert_eq!(ctx.variables.get("one"), Some(&Value::from("bonana")));
    }

    #[test]
    fn test_replace_regex_over_list() {
        let (ctx, _) = run("set --array files a.txt b.txt\nreplace out files \"(\\w+)\\.txt\" \"$1.md\" --regex\n");
        assert_eq!(ctx.variables.get("out"), Some(&list(&["a.md", "b.md"])));
    }

    #[test]
    fn test_replace_extension() {
        let (ctx, _) = run(
            "replace_extension a /tmp/report.txt pdf\nreplace_extension b notes .md\nreplace_extension c archive.tar.gz \"\"\n",
        );
        assert_eq!(ctx.variables.get("a"), Some(&Value::from("/tmp/report.pdf")));
        assert_eq!(ctx.variables.get("b"), Some(&Value::from("notes.md")));
        assert_eq!(ctx.variables.get("c"), Some(&Value::from("archive.tar")));
    }
}
