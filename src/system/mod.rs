//! # System Interaction Layer
//!
//! The boundary between the script engine and the operating system.
//!
//! ## Modules
//!
//! - **`executor`**: spawns external processes, streams their stdout and stderr
//!   line by line, and kills them when the run's stop flag is raised.

pub mod executor;
