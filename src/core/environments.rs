// src/core/environments.rs

//! Named launch environments, loaded from `environments.toml`.
//!
//! ```toml
//! [environments.dev]
//! description = "Local development server"
//! program = "cargo"
//! args = ["run", "--"]
//! working_dir = "~/src/app"
//! env = { RUST_LOG = "debug" }
//! ```

use crate::{
    core::paths::{self, PathError},
    models::{EnvironmentConfig, EnvironmentsFile},
};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnvironmentError {
    #[error(transparent)]
    Path(#[from] PathError),
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Environment '{name}' has an empty 'program'.")]
    EmptyProgram { name: String },
}

/// Resolves environment names for commands that require one.
pub trait EnvironmentLookup: fmt::Debug + Send {
    fn resolve(&self, name: &str) -> Option<EnvironmentConfig>;

    /// Every known environment name, sorted.
    fn names(&self) -> Vec<String>;
}

impl EnvironmentLookup for HashMap<String, EnvironmentConfig> {
    fn resolve(&self, name: &str) -> Option<EnvironmentConfig> {
        self.get(name).map(|env| EnvironmentConfig {
            name: name.to_string(),
            ..env.clone()
        })
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Environments read from an `environments.toml` file.
#[derive(Debug, Default, Clone)]
pub struct EnvironmentStore {
    environments: BTreeMap<String, EnvironmentConfig>,
}

impl EnvironmentStore {
    /// Loads the user's `environments.toml`. A missing file yields an empty store.
    pub fn load_default() -> Result<Self, EnvironmentError> {
        let path = paths::get_environments_path()?;
        Self::load_from(&path)
    }

    /// Loads environments from a specific file. A missing file yields an empty store.
    pub fn load_from(path: &Path) -> Result<Self, EnvironmentError> {
        if !path.exists() {
            log::debug!("No environments file at '{}'.", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| EnvironmentError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml(&content, &path.display().to_string())
    }

    /// Parses environments from TOML text; `origin` names the source in errors.
    pub fn from_toml(content: &str, origin: &str) -> Result<Self, EnvironmentError> {
        let file: EnvironmentsFile =
            toml::from_str(content).map_err(|e| EnvironmentError::Parse {
                path: origin.to_string(),
                source: e,
            })?;

        let mut environments = BTreeMap::new();
        for (name, mut env) in file.environments {
            if env.program.trim().is_empty() {
                return Err(EnvironmentError::EmptyProgram { name });
            }
            env.name = name.clone();
            environments.insert(name, env);
        }
        log::debug!("Loaded {} environment(s) from '{}'.", environments.len(), origin);
        Ok(Self { environments })
    }

    pub fn len(&self) -> usize {
        self.environments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.environments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnvironmentConfig> {
        self.environments.values()
    }
}

impl EnvironmentLookup for EnvironmentStore {
    fn resolve(&self, name: &str) -> Option<EnvironmentConfig> {
        self.environments.get(name).cloned()
    }

    fn names(&self) -> Vec<String> {
        self.environments.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[environments.dev]
description = "Local server"
program = "cargo"
args = ["run", "--"]
working_dir = "~/src/app"
env = { RUST_LOG = "debug" }

[environments.docs]
program = "mdbook"
"#;

    #[test]
    fn test_parses_environments_with_names() {
        let store = EnvironmentStore::from_toml(SAMPLE, "sample").unwrap();
        assert_eq!(store.names(), vec!["dev", "docs"]);

        let dev = store.resolve("dev").unwrap();
        assert_eq!(dev.name, "dev");
        assert_eq!(dev.program, "cargo");
        assert_eq!(dev.args, vec!["run", "--"]);
        assert_eq!(dev.env.get("RUST_LOG").map(String::as_str), Some("debug"));

        let docs = store.resolve("docs").unwrap();
        assert!(docs.args.is_empty());
        assert!(docs.working_dir.is_none());
        assert!(store.resolve("prod").is_none());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let bad = "[environments.x]\nprogram = \"a\"\nprogramm = \"b\"\n";
        let err = EnvironmentStore::from_toml(bad, "bad").unwrap_err();
        assert!(matches!(err, EnvironmentError::Parse { .. }));
    }

    #[test]
    fn test_empty_program_is_rejected() {
        let bad = "[environments.x]\nprogram = \"  \"\n";
        let err = EnvironmentStore::from_toml(bad, "bad").unwrap_err();
        assert!(matches!(err, EnvironmentError::EmptyProgram { name } if name == "x"));
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = EnvironmentStore::load_from(&dir.path().join("environments.toml")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("environments.toml");
        fs::write(&path, SAMPLE).unwrap();
        let store = EnvironmentStore::load_from(&path).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_hash_map_lookup_fills_name() {
        let mut map = HashMap::new();
        map.insert(
            "ci".to_string(),
            EnvironmentConfig {
                program: "make".to_string(),
                ..Default::default()
            },
        );
        assert_eq!(map.resolve("ci").unwrap().name, "ci");
        assert_eq!(map.names(), vec!["ci"]);
    }
}
