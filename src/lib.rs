//! # stagehand
//!
//! Runs named launch profiles and the small automation scripts that drive them.
//!
//! The interesting part lives in [`core`]: an indentation-sensitive block language
//! whose lines are dispatched to a registry of [`commands`], with optional output
//! [`filters`] and cooperative cancellation of long-running external processes.

include!(concat!(env!("OUT_DIR"), "/translations.rs"));

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Shared stop flag. Set from any thread; polled by loops and the process executor.
pub type CancellationToken = Arc<AtomicBool>;

pub mod cli;
pub mod commands;
pub mod constants;
pub mod core;
pub mod filters;
pub mod models;
pub mod system;
