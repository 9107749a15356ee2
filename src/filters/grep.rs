// src/filters/grep.rs

use crate::{
    core::error::{ScriptError, ScriptResult},
    filters::{Filter, options_error},
};
use clap::Parser;
use regex::Regex;

#[derive(Parser, Debug)]
#[command(no_binary_name = true, name = "grep")]
struct GrepArgs {
    /// Regular expression searched for in each line.
    pattern: String,

    /// Drop matching lines instead of keeping them.
    #[arg(long, short = 'v')]
    invert: bool,
}

/// Keeps lines that match a pattern, or drops them when inverted.
#[derive(Debug)]
pub struct RegexFilter {
    pattern: Regex,
    invert: bool,
}

impl RegexFilter {
    pub fn new(pattern: &str, invert: bool) -> ScriptResult<Self> {
        let pattern = Regex::new(pattern).map_err(|e| ScriptError::FilterConfiguration {
            filter: "grep".to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { pattern, invert })
    }
}

impl Filter for RegexFilter {
    fn intercept(&mut self, line: String, _is_stdout: bool) -> Option<String> {
        let keep = self.pattern.is_match(&line) != self.invert;
        keep.then_some(line)
    }
}

pub(crate) fn build(options: &[String]) -> ScriptResult<Box<dyn Filter>> {
    let args = GrepArgs::try_parse_from(options).map_err(|e| options_error("grep", &e))?;
    Ok(Box::new(RegexFilter::new(&args.pattern, args.invert)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invert_keeps_non_matching_line() {
        let mut inverted = RegexFilter::new("bar", true).unwrap();
        assert_eq!(inverted.intercept("foo".to_string(), true), Some("foo".to_string()));

        let mut plain = RegexFilter::new("bar", false).unwrap();
        assert_eq!(plain.intercept("foo".to_string(), true), None);
    }

    #[test]
    fn test_matching_line_is_kept_unless_inverted() {
        let mut plain = RegexFilter::new(r"^ERR\b", false).unwrap();
        assert!(plain.intercept("ERR disk full".to_string(), false).is_some());

        let mut inverted = RegexFilter::new(r"^ERR\b", true).unwrap();
        assert!(inverted.intercept("ERR disk full".to_string(), false).is_none());
    }

    #[test]
    fn test_build_from_options() {
        let options = vec!["--invert".to_string(), "noise".to_string()];
        let mut filter = build(&options).unwrap();
        assert!(filter.intercept("noise here".to_string(), true).is_none());
        assert!(filter.intercept("signal".to_string(), true).is_some());
    }

    #[test]
    fn test_invalid_pattern_is_a_configuration_error() {
        let err = build(&["(unclosed".to_string()]).unwrap_err();
        assert!(matches!(err, ScriptError::FilterConfiguration { .. }));
    }

    #[test]
    fn test_missing_pattern_is_a_configuration_error() {
        let err = build(&[]).unwrap_err();
        assert!(matches!(err, ScriptError::FilterConfiguration { .. }));
    }
}
