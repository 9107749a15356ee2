// src/core/variables.rs

use crate::{
    constants::{MAX_EXPANSION_DEPTH, VAR_CLOSE, VAR_OPEN},
    core::error::{ScriptError, ScriptResult},
    models::Value,
};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::env;

lazy_static! {
    // `@{NAME}` host-environment references.
    static ref HOST_VAR_RE: Regex = Regex::new(r"@\{([^}]+)\}").unwrap();
}

/// Named script values for the duration of one script run.
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    vars: HashMap<String, Value>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets (or overwrites) a variable.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Removes a variable, returning its last value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.vars.remove(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// All variables, sorted by name.
    pub fn sorted(&self) -> Vec<(&String, &Value)> {
        let mut entries: Vec<_> = self.vars.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Looks up a variable an operand refers to.
    ///
    /// # Errors
    /// [`ScriptError::VariableNotFound`] when the name is not set.
    pub fn require(&self, name: &str) -> ScriptResult<&Value> {
        self.vars
            .get(name)
            .ok_or_else(|| ScriptError::VariableNotFound {
                name: name.to_string(),
            })
    }

    /// Looks up a variable that must hold a scalar.
    pub fn require_scalar(&self, name: &str) -> ScriptResult<&str> {
        self.require(name)?
            .as_scalar()
            .ok_or_else(|| ScriptError::VariableType {
                name: name.to_string(),
                expected: "a scalar",
            })
    }

    /// Expands `${name}` references recursively, then `@{NAME}` host references once.
    pub fn expand(&self, text: &str) -> ScriptResult<String> {
        self.expand_with_host(text, |name| env::var(name).ok())
    }

    /// Like [`VariableStore::expand`], with an explicit source for host variables.
    ///
    /// Unknown references of either kind are left in place.
    ///
    /// # Errors
    /// [`ScriptError::RecursiveExpansion`] when script variables keep producing
    /// new references after [`MAX_EXPANSION_DEPTH`] passes.
    pub fn expand_with_host<F>(&self, text: &str, host: F) -> ScriptResult<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let expanded = self.expand_script_vars(text, 0)?;
        Ok(expand_host_vars(&expanded, host))
    }

    fn expand_script_vars(&self, text: &str, depth: u32) -> ScriptResult<String> {
        if depth >= MAX_EXPANSION_DEPTH {
            return Err(ScriptError::RecursiveExpansion {
                depth: MAX_EXPANSION_DEPTH,
            });
        }

        let mut current = text.to_string();
        for (name, value) in &self.vars {
            if let Value::Scalar(replacement) = value {
                let token = format!("{}{}{}", VAR_OPEN, name, VAR_CLOSE);
                if current.contains(&token) {
                    current = current.replace(&token, replacement);
                }
            }
        }

        // A substituted value may itself contain references.
        if current != text && current.contains(VAR_OPEN) {
            return self.expand_script_vars(&current, depth + 1);
        }
        Ok(current)
    }
}

/// Single, non-recursive pass over `@{NAME}` references.
fn expand_host_vars<F>(text: &str, host: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    HOST_VAR_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let whole = caps.get(0).map_or("", |m| m.as_str());
            caps.get(1)
                .and_then(|name| host(name.as_str()))
                .unwrap_or_else(|| whole.to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_host(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_simple_and_nested_expansion() {
        let mut store = VariableStore::new();
        store.set("x", "5");
        assert_eq!(store.expand_with_host("${x}", no_host).unwrap(), "5");

        store.set("y", "a${x}b");
        assert_eq!(store.expand_with_host("${y}", no_host).unwrap(), "a5b");
    }

    #[test]
    fn test_forward_reference_resolves_through_later_definition() {
        let mut store = VariableStore::new();
        store.set("outer", "[${inner}]");
        store.set("inner", "${leaf}-${leaf}");
        store.set("leaf", "z");
        assert_eq!(
            store.expand_with_host("v=${outer}", no_host).unwrap(),
            "v=[z-z]"
        );
    }

    #[test]
    fn test_unknown_references_are_left_in_place() {
        let mut store = VariableStore::new();
        store.set("a", "1");
        assert_eq!(
            store.expand_with_host("${a} ${missing}", no_host).unwrap(),
            "1 ${missing}"
        );
    }

    #[test]
    fn test_arrays_do_not_interpolate() {
        let mut store = VariableStore::new();
        store.set("list", vec!["a".to_string(), "b".to_string()]);
        assert_eq!(store.expand_with_host("${list}", no_host).unwrap(), "${list}");
    }

    #[test]
    fn test_self_reference_hits_depth_cap() {
        let mut store = VariableStore::new();
        store.set("a", "${a}x");
        let err = store.expand_with_host("${a}", no_host).unwrap_err();
        assert!(matches!(err, ScriptError::RecursiveExpansion { .. }));
    }

    #[test]
    fn test_mutual_reference_hits_depth_cap() {
        let mut store = VariableStore::new();
        store.set("a", "<${b}>");
        store.set("b", "(${a})");
        assert!(store.expand_with_host("${a}", no_host).is_err());
    }

    #[test]
    fn test_host_variables_expand_once_after_script_variables() {
        let mut store = VariableStore::new();
        store.set("which", "HOME_DIR");
        let host = |name: &str| match name {
            "HOME_DIR" => Some("/home/me".to_string()),
            "LOOP" => Some("@{LOOP}".to_string()),
            _ => None,
        };
        assert_eq!(
            store.expand_with_host("@{${which}}/bin", host).unwrap(),
            "/home/me/bin"
        );
        // Host values are never re-expanded.
        assert_eq!(store.expand_with_host("@{LOOP}", host).unwrap(), "@{LOOP}");
        assert_eq!(
            store.expand_with_host("@{NOPE}", host).unwrap(),
            "@{NOPE}"
        );
    }

    #[test]
    fn test_host_variables_do_not_feed_script_expansion() {
        let mut store = VariableStore::new();
        store.set("x", "1");
        let host = |_: &str| Some("${x}".to_string());
        assert_eq!(store.expand_with_host("@{ANY}", host).unwrap(), "${x}");
    }

    #[test]
    fn test_require_reports_missing_and_type_errors() {
        let mut store = VariableStore::new();
        store.set("list", vec!["a".to_string()]);
        assert!(matches!(
            store.require("nope"),
            Err(ScriptError::VariableNotFound { .. })
        ));
        assert!(matches!(
            store.require_scalar("list"),
            Err(ScriptError::VariableType { .. })
        ));
    }
}
