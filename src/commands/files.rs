// src/commands/files.rs

//! Filesystem queries and cleanup. Paths go through `~` and `$VAR` expansion
//! before use, and collected paths are stored as a sorted list.

use crate::{
    commands::vars::validate_name,
    core::{
        context::EngineContext,
        error::{ScriptError, ScriptResult},
        paths,
        registry::{Command, Invocation, parse_options},
    },
};
use clap::{CommandFactory, Parser};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

fn expand(path: &str) -> ScriptResult<PathBuf> {
    paths::expand_path(path).map_err(|e| ScriptError::Other(e.into()))
}

/// Walks `dir` and returns the sorted paths accepted by `keep`.
fn collect_entries<F>(dir: &Path, recursive: bool, keep: F) -> ScriptResult<Vec<String>>
where
    F: Fn(&walkdir::DirEntry) -> bool,
{
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut found = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(max_depth) {
        let entry = entry.map_err(std::io::Error::from)?;
        if keep(&entry) {
            found.push(dunce::simplified(entry.path()).to_string_lossy().into_owned());
        }
    }
    found.sort();
    Ok(found)
}

// --- list_files ---

#[derive(Parser, Debug)]
#[command(no_binary_name = true, name = "list_files")]
struct ListFilesArgs {
    /// Variable receiving the list of paths.
    dest: String,

    /// Directory to look in.
    dir: String,

    /// Descend into subdirectories.
    #[arg(long, short = 'r')]
    recursive: bool,

    /// Only keep files whose name matches this regular expression.
    #[arg(long, short = 'p')]
    pattern: Option<String>,
}

#[derive(Debug, Default)]
pub struct ListFiles;

impl Command for ListFiles {
    fn name(&self) -> &'static str {
        "list_files"
    }

    fn options(&self) -> Option<clap::Command> {
        Some(ListFilesArgs::command())
    }

    fn execute(&mut self, ctx: &mut EngineContext, inv: Invocation) -> ScriptResult<()> {
        let Some(args) = parse_options::<ListFilesArgs>(ctx, self.name(), &inv.args)? else {
            return Ok(());
        };
        validate_name(self.name(), &args.dest)?;
        let pattern = match &args.pattern {
            Some(p) => Some(Regex::new(p).map_err(|e| ScriptError::InvalidOptions {
                command: self.name().to_string(),
                message: e.to_string(),
            })?),
            None => None,
        };

        let dir = expand(&args.dir)?;
        let files = collect_entries(&dir, args.recursive, |entry| {
            entry.file_type().is_file()
                && pattern
                    .as_ref()
                    .is_none_or(|re| re.is_match(&entry.file_name().to_string_lossy()))
        })?;
        log::debug!("list_files: {} file(s) in '{}'.", files.len(), dir.display());
        ctx.variables.set(args.dest, files);
        Ok(())
    }
}

pub fn build_list_files() -> Box<dyn Command> {
    Box::new(ListFiles)
}

// --- list_dirs ---

#[derive(Parser, Debug)]
#[command(no_binary_name = true, name = "list_dirs")]
struct ListDirsArgs {
    /// Variable receiving the list of paths.
    dest: String,

    /// Directory to look in.
    dir: String,

    /// Descend into subdirectories.
    #[arg(long, short = 'r')]
    recursive: bool,
}

#[derive(Debug, Default)]
pub struct ListDirs;

impl Command for ListDirs {
    fn name(&self) -> &'static str {
        "list_dirs"
    }

    fn options(&self) -> Option<clap::Command> {
        Some(ListDirsArgs::command())
    }

    fn execute(&mut self, ctx: &mut EngineContext, inv: Invocation) -> ScriptResult<()> {
        let Some(args) = parse_options::<ListDirsArgs>(ctx, self.name(), &inv.args)? else {
            return Ok(());
        };
        validate_name(self.name(), &args.dest)?;
        let dir = expand(&args.dir)?;
        let dirs = collect_entries(&dir, args.recursive, |entry| entry.file_type().is_dir())?;
        ctx.variables.set(args.dest, dirs);
        Ok(())
    }
}

pub fn build_list_dirs() -> Box<dyn Command> {
    Box::new(ListDirs)
}

// --- read_lines ---

#[derive(Parser, Debug)]
#[command(no_binary_name = true, name = "read_lines")]
struct ReadLinesArgs {
    /// Variable receiving one element per line.
    dest: String,

    /// Text file to read.
    file: String,

    /// Drop lines that are empty or only whitespace.
    #[arg(long)]
    skip_empty: bool,
}

#[derive(Debug, Default)]
pub struct ReadLines;

impl Command for ReadLines {
    fn name(&self) -> &'static str {
        "read_lines"
    }

    fn options(&self) -> Option<clap::Command> {
        Some(ReadLinesArgs::command())
    }

    fn execute(&mut self, ctx: &mut EngineContext, inv: Invocation) -> ScriptResult<()> {
        let Some(args) = parse_options::<ReadLinesArgs>(ctx, self.name(), &inv.args)? else {
            return Ok(());
        };
        validate_name(self.name(), &args.dest)?;
        let path = expand(&args.file)?;
        let content = fs::read_to_string(&path)?;
        let lines: Vec<String> = content
            .lines()
            .filter(|line| !args.skip_empty || !line.trim().is_empty())
            .map(str::to_string)
            .collect();
        ctx.variables.set(args.dest, lines);
        Ok(())
    }
}

pub fn build_read_lines() -> Box<dyn Command> {
    Box::new(ReadLines)
}

// --- delete_dir ---

#[derive(Parser, Debug)]
#[command(no_binary_name = true, name = "delete_dir")]
struct DeleteDirArgs {
    /// Directory to remove along with its contents. A missing directory is not an error.
    dir: String,
}

#[derive(Debug, Default)]
pub struct DeleteDir;

impl Command for DeleteDir {
    fn name(&self) -> &'static str {
        "delete_dir"
    }

    fn options(&self) -> Option<clap::Command> {
        Some(DeleteDirArgs::command())
    }

    fn execute(&mut self, ctx: &mut EngineContext, inv: Invocation) -> ScriptResult<()> {
        let Some(args) = parse_options::<DeleteDirArgs>(ctx, self.name(), &inv.args)? else {
            return Ok(());
        };
        let dir = expand(&args.dir)?;
        if !dir.exists() {
            log::debug!("delete_dir: '{}' does not exist.", dir.display());
            return Ok(());
        }
        if !dir.is_dir() {
            return Err(ScriptError::InvalidOptions {
                command: self.name().to_string(),
                message: format!("'{}' is not a directory", dir.display()),
            });
        }
        log::info!("Deleting directory '{}'.", dir.display());
        fs::remove_dir_all(&dir)?;
        Ok(())
    }
}

pub fn build_delete_dir() -> Box<dyn Command> {
    Box::new(DeleteDir)
}
