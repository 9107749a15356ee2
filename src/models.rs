// src/models.rs

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;

// --- SCRIPT VALUES ---

/// A value held by the variable store.
///
/// Only scalars take part in `${name}` interpolation; arrays are consumed by
/// name through the commands that understand them (`foreach`, `flatten`, ...).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Value {
    Scalar(String),
    Array(Vec<String>),
}

impl Value {
    /// Returns the scalar text, or `None` for arrays.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::Array(_) => None,
        }
    }

    /// Returns the elements of the value as a list.
    /// A scalar is treated as a single-element list.
    pub fn to_list(&self) -> Vec<String> {
        match self {
            Self::Scalar(s) => vec![s.clone()],
            Self::Array(items) => items.clone(),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Self::Array(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "\"{}\"", s.replace('"', "\\\"")),
            Self::Array(items) => {
                let quoted: Vec<String> = items
                    .iter()
                    .map(|item| format!("\"{}\"", item.replace('"', "\\\"")))
                    .collect();
                write!(f, "[{}]", quoted.join(", "))
            }
        }
    }
}

// --- PROCESS OUTPUT ---

/// One line of output produced while a command runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub text: String,
    pub is_stdout: bool,
}

// --- `environments.toml` MODELS ---

/// A named launch profile: which program to start, how, and where.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentConfig {
    /// Filled from the table key when loaded from `environments.toml`.
    #[serde(skip)]
    pub name: String,
    pub description: Option<String>,
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    #[serde(default)]
    pub env: HashMap<String, String>,
}

/// Represents the deserialized structure of an `environments.toml` file.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentsFile {
    #[serde(default)]
    pub environments: BTreeMap<String, EnvironmentConfig>,
}
