// src/system/executor.rs

use crate::{CancellationToken, constants::PROCESS_POLL_INTERVAL_MS};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::Path;
use std::process::{Child, Command as StdCommand, ExitStatus, Stdio};
use std::sync::atomic::Ordering;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("No command specified to run.")]
    EmptyCommand,
    #[error("Command '{0}' could not be executed: {1}")]
    CommandFailed(String, std::io::Error),
    #[error("Command '{command}' exited with a non-zero status{}.", .code.map(|c| format!(" ({})", c)).unwrap_or_default())]
    NonZeroExitStatus { command: String, code: Option<i32> },
    #[error("Operation was cancelled by the user.")]
    Cancelled,
}

/// What to launch and where.
#[derive(Debug, Clone, Default)]
pub struct ProcessSpec<'a> {
    pub program: &'a str,
    pub args: &'a [String],
    pub cwd: Option<&'a Path>,
    pub env: Option<&'a HashMap<String, String>>,
}

impl ProcessSpec<'_> {
    /// Human-readable, shell-quoted command line for messages and logs.
    pub fn display(&self) -> String {
        let parts = std::iter::once(self.program).chain(self.args.iter().map(String::as_str));
        shlex::try_join(parts.clone()).unwrap_or_else(|_| parts.collect::<Vec<_>>().join(" "))
    }

    fn build(&self, program: &str, args: &[String]) -> StdCommand {
        let mut command = StdCommand::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(cwd) = self.cwd {
            command.current_dir(dunce::simplified(cwd));
        }
        if let Some(env) = self.env {
            command.envs(env);
        }
        command
    }
}

/// Runs a process to completion, handing every output line to `on_line`.
///
/// Stdout and stderr are read on helper threads and delivered on the calling
/// thread, in arrival order, as `(line, is_stdout)`. The process is polled
/// every [`PROCESS_POLL_INTERVAL_MS`]; once the cancellation token is set it is
/// killed and [`ExecutionError::Cancelled`] is returned.
pub fn run_streaming<F>(
    spec: &ProcessSpec<'_>,
    cancellation_token: &CancellationToken,
    mut on_line: F,
) -> Result<(), ExecutionError>
where
    F: FnMut(String, bool),
{
    if spec.program.trim().is_empty() {
        return Err(ExecutionError::EmptyCommand);
    }
    if cancellation_token.load(Ordering::SeqCst) {
        return Err(ExecutionError::Cancelled);
    }

    let display = spec.display();
    log::debug!("Spawning '{}' (cwd: {:?})", display, spec.cwd);

    let child = spawn(spec, &display)?;

    // Whatever happens below, never leave the child running.
    let mut child = scopeguard::guard(child, |mut child| {
        if let Ok(None) = child.try_wait() {
            log::debug!("Killing child process (PID: {})...", child.id());
            if let Err(e) = child.kill() {
                log::warn!("Failed to kill child process {}: {}", child.id(), e);
            }
            child.wait().ok();
        }
    });

    let (tx, rx) = mpsc::channel::<(String, bool)>();
    let mut readers = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        readers.push(forward_lines(stdout, true, tx.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        readers.push(forward_lines(stderr, false, tx.clone()));
    }
    drop(tx);

    let poll = Duration::from_millis(PROCESS_POLL_INTERVAL_MS);
    let mut streams_open = true;

    // Non-blocking wait loop to allow for cancellation.
    let status: ExitStatus = loop {
        if streams_open {
            match rx.recv_timeout(poll) {
                Ok((line, is_stdout)) => on_line(line, is_stdout),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => streams_open = false,
            }
        } else {
            thread::sleep(poll);
        }

        if cancellation_token.load(Ordering::SeqCst) {
            log::debug!("Cancellation requested while '{}' was running.", display);
            // The guard kills and reaps the child.
            return Err(ExecutionError::Cancelled);
        }

        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {}
            Err(e) => return Err(ExecutionError::CommandFailed(display, e)),
        }
    };

    // Deliver whatever the readers still hold.
    while streams_open {
        match rx.recv_timeout(poll) {
            Ok((line, is_stdout)) => on_line(line, is_stdout),
            Err(RecvTimeoutError::Timeout) => {
                if cancellation_token.load(Ordering::SeqCst) {
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => streams_open = false,
        }
    }
    for reader in readers {
        reader.join().ok();
    }
    drop(scopeguard::ScopeGuard::into_inner(child));

    if status.success() {
        Ok(())
    } else {
        Err(ExecutionError::NonZeroExitStatus {
            command: display,
            code: status.code(),
        })
    }
}

/// Spawns the process, falling back to `cmd /C` for Windows built-ins like `echo`.
fn spawn(spec: &ProcessSpec<'_>, display: &str) -> Result<Child, ExecutionError> {
    match spec.build(spec.program, spec.args).spawn() {
        Ok(child) => Ok(child),
        Err(e) if e.kind() == ErrorKind::NotFound && cfg!(target_os = "windows") => {
            log::debug!("'{}' not found. Retrying with cmd /C.", spec.program);
            let mut wrapped = vec!["/C".to_string(), spec.program.to_string()];
            wrapped.extend(spec.args.iter().cloned());
            spec.build("cmd", &wrapped)
                .spawn()
                .map_err(|e| ExecutionError::CommandFailed(display.to_string(), e))
        }
        Err(e) => Err(ExecutionError::CommandFailed(display.to_string(), e)),
    }
}

/// Reads a stream line by line on its own thread, tolerating invalid UTF-8.
fn forward_lines<R>(stream: R, is_stdout: bool, tx: Sender<(String, bool)>) -> thread::JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(stream);
        let mut buffer = Vec::new();
        loop {
            buffer.clear();
            match reader.read_until(b'\n', &mut buffer) {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buffer);
                    let line = line.trim_end_matches(['\n', '\r']).to_string();
                    if tx.send((line, is_stdout)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::warn!("Failed to read process output: {}", e);
                    break;
                }
            }
        }
    })
}
