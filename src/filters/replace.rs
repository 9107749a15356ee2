// src/filters/replace.rs

use crate::{
    core::error::{ScriptError, ScriptResult},
    filters::{Filter, options_error},
};
use clap::Parser;
use regex::Regex;

#[derive(Parser, Debug)]
#[command(no_binary_name = true, name = "replace")]
struct ReplaceArgs {
    /// Text (or regex with --regex) to look for.
    find: String,

    /// Replacement text. With --regex, `$1`-style group references are honored.
    with: String,

    /// Treat `find` as a regular expression.
    #[arg(long, short = 'r')]
    regex: bool,

    /// Replace every occurrence instead of only the first.
    #[arg(long, short = 'a')]
    all: bool,
}

#[derive(Debug)]
enum Finder {
    Literal(String),
    Pattern(Regex),
}

/// Rewrites each line with a literal or regex substitution.
#[derive(Debug)]
pub struct ReplaceFilter {
    finder: Finder,
    with: String,
    all: bool,
}

impl ReplaceFilter {
    pub fn literal(find: &str, with: &str, all: bool) -> Self {
        Self {
            finder: Finder::Literal(find.to_string()),
            with: with.to_string(),
            all,
        }
    }

    pub fn regex(find: &str, with: &str, all: bool) -> ScriptResult<Self> {
        let pattern = Regex::new(find).map_err(|e| ScriptError::FilterConfiguration {
            filter: "replace".to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            finder: Finder::Pattern(pattern),
            with: with.to_string(),
            all,
        })
    }
}

impl Filter for ReplaceFilter {
    fn intercept(&mut self, line: String, _is_stdout: bool) -> Option<String> {
        let replaced = match (&self.finder, self.all) {
            (Finder::Literal(find), _) if find.is_empty() => line,
            (Finder::Literal(find), true) => line.replace(find.as_str(), &self.with),
            (Finder::Literal(find), false) => line.replacen(find.as_str(), &self.with, 1),
            (Finder::Pattern(re), true) => re.replace_all(&line, self.with.as_str()).into_owned(),
            (Finder::Pattern(re), false) => re.replace(&line, self.with.as_str()).into_owned(),
        };
        Some(replaced)
    }
}

pub(crate) fn build(options: &[String]) -> ScriptResult<Box<dyn Filter>> {
    let args = ReplaceArgs::try_parse_from(options).map_err(|e| options_error("replace", &e))?;
    if args.regex {
        Ok(Box::new(ReplaceFilter::regex(&args.find, &args.with, args.all)?))
    } else {
        Ok(Box::new(ReplaceFilter::literal(&args.find, &args.with, args.all)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_first_match_only() {
        let mut filter = ReplaceFilter::literal("a", "o", false);
        assert_eq!(filter.intercept("banana".to_string(), true), Some("bonana".to_string()));
    }

    #[test]
    fn test_literal_all_matches() {
        let mut filter = ReplaceFilter::literal("a", "o", true);
        assert_eq!(filter.intercept("banana".to_string(), true), Some("bonono".to_string()));
    }

    #[test]
    fn test_regex_with_group_reference() {
        let mut filter = ReplaceFilter::regex(r"(\d+)ms", "${1} ms", true).unwrap();
        assert_eq!(
            filter.intercept("took 15ms then 30ms".to_string(), true),
            Some("took 15 ms then 30 ms".to_string())
        );
    }

    #[test]
    fn test_regex_chars_are_literal_without_flag() {
        let mut filter = ReplaceFilter::literal(".", "!", true);
        assert_eq!(filter.intercept("a.b".to_string(), false), Some("a!b".to_string()));
    }

    #[test]
    fn test_build_from_options() {
        let options: Vec<String> = ["--regex", "--all", "[0-9]", "#"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut filter = build(&options).unwrap();
        assert_eq!(filter.intercept("v1.2.3".to_string(), true), Some("v#.#.#".to_string()));
    }
}
