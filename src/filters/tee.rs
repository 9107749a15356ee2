// src/filters/tee.rs

use crate::{
    core::error::{ScriptError, ScriptResult},
    filters::{Filter, options_error},
};
use clap::Parser;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(no_binary_name = true, name = "tee")]
struct TeeArgs {
    /// File receiving a copy of every line that reaches this stage.
    file: String,

    /// Keep existing content instead of truncating on the first write.
    #[arg(long, short = 'a')]
    append: bool,
}

/// Copies passing lines into a file and hands them on unchanged.
///
/// The file is opened lazily: the first write truncates it unless `append`
/// was requested, and every later write appends.
#[derive(Debug)]
pub struct TeeFilter {
    path: PathBuf,
    append: bool,
    file: Option<File>,
}

impl TeeFilter {
    pub fn new(path: impl Into<PathBuf>, append: bool) -> Self {
        Self {
            path: path.into(),
            append,
            file: None,
        }
    }

    fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        if self.file.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .append(self.append)
                .truncate(!self.append)
                .open(&self.path)?;
            self.file = Some(file);
        }
        match self.file.as_mut() {
            Some(file) => writeln!(file, "{}", line),
            None => Ok(()),
        }
    }
}

impl Filter for TeeFilter {
    fn intercept(&mut self, line: String, _is_stdout: bool) -> Option<String> {
        if let Err(e) = self.write_line(&line) {
            log::warn!("tee: could not write to '{}': {}", self.path.display(), e);
        }
        Some(line)
    }
}

pub(crate) fn build(options: &[String]) -> ScriptResult<Box<dyn Filter>> {
    let args = TeeArgs::try_parse_from(options).map_err(|e| options_error("tee", &e))?;
    let expanded =
        shellexpand::full(&args.file).map_err(|e| ScriptError::FilterConfiguration {
            filter: "tee".to_string(),
            reason: e.to_string(),
        })?;
    Ok(Box::new(TeeFilter::new(expanded.into_owned(), args.append)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_first_write_truncates_then_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.log");
        fs::write(&path, "old content\n").unwrap();

        let mut filter = TeeFilter::new(&path, false);
        assert_eq!(filter.intercept("one".to_string(), true), Some("one".to_string()));
        filter.intercept("two".to_string(), false);

        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_append_keeps_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.log");
        fs::write(&path, "old\n").unwrap();

        let mut filter = TeeFilter::new(&path, true);
        filter.intercept("new".to_string(), true);

        assert_eq!(fs::read_to_string(&path).unwrap(), "old\nnew\n");
    }

    #[test]
    fn test_nothing_written_means_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never.log");
        let _filter = TeeFilter::new(&path, false);
        assert!(!path.exists());
    }

    #[test]
    fn test_build_from_options() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("built.log");
        let options = vec![path.to_string_lossy().to_string(), "--append".to_string()];
        let mut filter = build(&options).unwrap();
        filter.intercept("x".to_string(), true);
        assert_eq!(fs::read_to_string(&path).unwrap(), "x\n");
    }
}
