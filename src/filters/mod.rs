//! # Output Filters
//!
//! Stateful stages that see every output line of a running command, in order.
//! A stage either returns the (possibly rewritten) line or drops it, in which
//! case the remaining stages never see it.
//!
//! ## Modules
//!
//! - **`grep`**: keeps (or, inverted, drops) lines matching a regular expression.
//! - **`replace`**: literal or regex find/replace, first match or all matches.
//! - **`tee`**: copies passing lines into a file.

use crate::core::error::{ScriptError, ScriptResult};
use std::fmt;

pub mod grep;
pub mod replace;
pub mod tee;

/// One stage of a [`FilterChain`].
pub trait Filter: fmt::Debug + Send {
    /// Returns the line to pass on, or `None` to suppress it entirely.
    fn intercept(&mut self, line: String, is_stdout: bool) -> Option<String>;
}

/// Ordered filter stages attached to a single command invocation.
#[derive(Debug, Default)]
pub struct FilterChain {
    stages: Vec<Box<dyn Filter>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stage: Box<dyn Filter>) {
        self.stages.push(stage);
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Feeds a line through every stage, stopping at the first one that drops it.
    pub fn apply(&mut self, line: String, is_stdout: bool) -> Option<String> {
        let mut current = line;
        for stage in &mut self.stages {
            current = stage.intercept(current, is_stdout)?;
        }
        Some(current)
    }
}

// --- Filter Definition and Registry ---

/// Describes a filter stage and how to build it from its option tokens.
#[derive(Debug)]
pub struct FilterDefinition {
    pub name: &'static str,
    pub summary: &'static str,
    pub constructor: fn(&[String]) -> ScriptResult<Box<dyn Filter>>,
}

/// The single source of truth for all filter stages.
static FILTER_REGISTRY: &[FilterDefinition] = &[
    FilterDefinition {
        name: "grep",
        summary: "Keep lines matching a regex (--invert drops them instead).",
        constructor: grep::build,
    },
    FilterDefinition {
        name: "replace",
        summary: "Replace text in each line (--regex, --all).",
        constructor: replace::build,
    },
    FilterDefinition {
        name: "tee",
        summary: "Copy passing lines into a file (--append keeps old content).",
        constructor: tee::build,
    },
];

/// All registered filter definitions.
pub fn definitions() -> &'static [FilterDefinition] {
    FILTER_REGISTRY
}

/// Finds a filter definition by name.
pub fn find_filter(name: &str) -> Option<&'static FilterDefinition> {
    FILTER_REGISTRY.iter().find(|def| def.name == name)
}

/// Names of every registered filter, in registry order.
pub fn known_filters() -> Vec<String> {
    FILTER_REGISTRY.iter().map(|def| def.name.to_string()).collect()
}

/// Builds one stage from a pipe segment: the filter name followed by its options.
///
/// # Errors
/// [`ScriptError::FilterConfiguration`] for an empty segment or rejected options,
/// [`ScriptError::UnknownFilter`] for a name that is not registered.
pub fn build_stage(segment: &[String]) -> ScriptResult<Box<dyn Filter>> {
    let (name, options) = segment
        .split_first()
        .ok_or_else(|| ScriptError::FilterConfiguration {
            filter: String::new(),
            reason: "empty filter after '|'".to_string(),
        })?;
    let definition = find_filter(name).ok_or_else(|| ScriptError::UnknownFilter {
        name: name.clone(),
        known: known_filters(),
    })?;
    log::trace!("Building filter stage '{}' with {:?}", name, options);
    (definition.constructor)(options)
}

/// Maps a clap rejection of a filter's options to a configuration error.
pub(crate) fn options_error(filter: &str, err: &clap::Error) -> ScriptError {
    ScriptError::FilterConfiguration {
        filter: filter.to_string(),
        reason: err.to_string().trim().to_string(),
    }
}
