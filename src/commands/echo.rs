// src/commands/echo.rs

use crate::core::{
    context::EngineContext,
    error::ScriptResult,
    registry::{Command, Invocation, parse_options},
};
use clap::{CommandFactory, Parser};

#[derive(Parser, Debug)]
#[command(no_binary_name = true, name = "echo")]
struct EchoArgs {
    /// Write to the error stream instead of standard output.
    #[arg(long, short = 'e')]
    stderr: bool,

    /// Words to print, joined by single spaces.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    text: Vec<String>,
}

#[derive(Debug, Default)]
pub struct Echo;

impl Command for Echo {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn options(&self) -> Option<clap::Command> {
        Some(EchoArgs::command())
    }

    fn supports_filters(&self) -> bool {
        true
    }

    fn execute(&mut self, ctx: &mut EngineContext, mut inv: Invocation) -> ScriptResult<()> {
        let Some(args) = parse_options::<EchoArgs>(ctx, self.name(), &inv.args)? else {
            return Ok(());
        };
        let is_stdout = !args.stderr;
        if let Some(line) = inv.filters.apply(args.text.join(" "), is_stdout) {
            ctx.emit(&line, is_stdout);
        }
        Ok(())
    }
}

pub fn build() -> Box<dyn Command> {
    Box::new(Echo)
}

#[cfg(test)]
mod tests {
    use crate::commands::test_support::run;

    #[test]
    fn test_joins_words() {
        let (_, out) = run("echo one   two \"three four\"\n");
        assert_eq!(out.stdout(), vec!["one two three four"]);
    }

    #[test]
    fn test_stderr_flag() {
        let (_, out) = run("echo --stderr oops\n");
        assert!(out.stdout().is_empty());
        assert_eq!(out.lines()[0].text, "oops");
    }

    #[test]
    fn test_empty_echo_prints_empty_line() {
        let (_, out) = run("echo\n");
        assert_eq!(out.stdout(), vec![""]);
    }
}
