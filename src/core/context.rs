// src/core/context.rs

use crate::{
    CancellationToken,
    core::{
        environments::EnvironmentLookup, registry::CommandRegistry, variables::VariableStore,
    },
    models::OutputLine,
};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

// --- Output Listeners ---

/// Receives every line a command emits after filtering.
pub trait OutputListener: fmt::Debug + Send {
    fn on_line(&mut self, line: &str, is_stdout: bool);
}

/// Writes stdout lines to stdout and everything else to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleListener;

impl OutputListener for ConsoleListener {
    fn on_line(&mut self, line: &str, is_stdout: bool) {
        if is_stdout {
            println!("{}", line);
        } else {
            eprintln!("{}", line);
        }
    }
}

/// Forwards lines to another thread.
impl OutputListener for Sender<OutputLine> {
    fn on_line(&mut self, line: &str, is_stdout: bool) {
        // A dropped receiver just means nobody is listening anymore.
        let _ = self.send(OutputLine {
            text: line.to_string(),
            is_stdout,
        });
    }
}

/// Collects lines in memory. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct BufferListener {
    lines: Arc<Mutex<Vec<OutputLine>>>,
}

impl BufferListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of every line received so far.
    pub fn lines(&self) -> Vec<OutputLine> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Text of the stdout lines received so far.
    pub fn stdout(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|line| line.is_stdout)
            .map(|line| line.text)
            .collect()
    }
}

impl OutputListener for BufferListener {
    fn on_line(&mut self, line: &str, is_stdout: bool) {
        let entry = OutputLine {
            text: line.to_string(),
            is_stdout,
        };
        match self.lines.lock() {
            Ok(mut lines) => lines.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}

// --- Engine Context ---

/// Cloneable stop switch for a running script, usable from any thread.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    token: CancellationToken,
}

impl EngineHandle {
    /// Requests a stop. Running loops finish their current iteration and
    /// running processes are killed at the next poll.
    pub fn destroy(&self) {
        log::debug!("Stop requested for running script.");
        self.token.store(true, Ordering::SeqCst);
    }

    pub fn is_destroyed(&self) -> bool {
        self.token.load(Ordering::SeqCst)
    }
}

/// Everything shared by the engines of one run: variables, the command
/// registry, environments, output listeners, the error sink and the stop flag.
///
/// Child engines created for nested blocks run against the same context, so
/// assignments made inside a loop body are visible after the loop.
#[derive(Debug)]
pub struct EngineContext {
    pub variables: VariableStore,
    registry: CommandRegistry,
    environments: Box<dyn EnvironmentLookup>,
    listeners: Vec<Box<dyn OutputListener>>,
    errors: Vec<String>,
    verbose: bool,
    script_commands: bool,
    cancellation_token: CancellationToken,
}

impl EngineContext {
    /// A context for running scripts: general and script-only commands resolve.
    pub fn for_script(environments: Box<dyn EnvironmentLookup>) -> Self {
        Self::new(CommandRegistry::standard(), environments, true)
    }

    /// A context for one-off command-line invocations: only general commands resolve.
    pub fn for_command_line(environments: Box<dyn EnvironmentLookup>) -> Self {
        Self::new(CommandRegistry::standard(), environments, false)
    }

    pub fn new(
        registry: CommandRegistry,
        environments: Box<dyn EnvironmentLookup>,
        script_commands: bool,
    ) -> Self {
        Self {
            variables: VariableStore::new(),
            registry,
            environments,
            listeners: Vec::new(),
            errors: Vec::new(),
            verbose: false,
            script_commands,
            cancellation_token: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_listener(mut self, listener: impl OutputListener + 'static) -> Self {
        self.add_listener(listener);
        self
    }

    pub fn add_listener(&mut self, listener: impl OutputListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    pub fn environments(&self) -> &dyn EnvironmentLookup {
        self.environments.as_ref()
    }

    /// Whether script-only commands resolve in this context.
    pub fn allows_script_commands(&self) -> bool {
        self.script_commands
    }

    /// Hands a line to every listener.
    pub fn emit(&mut self, line: &str, is_stdout: bool) {
        for listener in &mut self.listeners {
            listener.on_line(line, is_stdout);
        }
    }

    pub fn push_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Messages of every failure reported by a top-level run, oldest first.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation_token
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.load(Ordering::SeqCst)
    }

    /// A handle that can stop this context's run from another thread.
    pub fn handle(&self) -> EngineHandle {
        EngineHandle {
            token: self.cancellation_token.clone(),
        }
    }

    /// Requests a stop from the owning thread.
    pub fn destroy(&self) {
        self.handle().destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::mpsc;

    fn context() -> EngineContext {
        EngineContext::for_script(Box::new(HashMap::new()))
    }

    #[test]
    fn test_emit_reaches_every_listener() {
        let first = BufferListener::new();
        let second = BufferListener::new();
        let mut ctx = context()
            .with_listener(first.clone())
            .with_listener(second.clone());

        ctx.emit("hello", true);
        ctx.emit("oops", false);

        assert_eq!(first.stdout(), vec!["hello"]);
        assert_eq!(second.lines().len(), 2);
        assert!(!second.lines()[1].is_stdout);
    }

    #[test]
    fn test_sender_listener_forwards_lines() {
        let (tx, rx) = mpsc::channel();
        let mut ctx = context().with_listener(tx);
        ctx.emit("across threads", false);
        let line = rx.recv().unwrap();
        assert_eq!(line.text, "across threads");
        assert!(!line.is_stdout);
    }

    #[test]
    fn test_handle_sets_shared_token() {
        let ctx = context();
        let handle = ctx.handle();
        assert!(!ctx.is_cancelled());
        std::thread::spawn(move || handle.destroy()).join().unwrap();
        assert!(ctx.is_cancelled());
        assert!(ctx.handle().is_destroyed());
    }

    #[test]
    fn test_scope_flag_follows_constructor() {
        assert!(context().allows_script_commands());
        assert!(!EngineContext::for_command_line(Box::new(HashMap::new())).allows_script_commands());
    }
}
