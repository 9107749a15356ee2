// src/core/mod.rs

//! # Script Core
//!
//! The pipeline a script goes through: [`normalizer`] turns raw text into
//! logical lines, [`parser`] builds the block [`tree`], and [`engine`] walks it,
//! expanding each line with [`variables`] and dispatching it through the
//! command [`registry`] against a shared [`context`].

pub mod commons;
pub mod context;
pub mod engine;
pub mod environments;
pub mod error;
pub mod normalizer;
pub mod parser;
pub mod paths;
pub mod registry;
pub mod tree;
pub mod variables;
