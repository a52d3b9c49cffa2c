//! Restore pipeline: read a dump, scan it, write the files back.

use crate::decoder::{Action, Decoder};
use crate::document::{check_relative_path, Diagnostics};
use crate::error::{Error, Result};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_RESTORE_DIR: &str = "./output/restored_repo";

/// Inputs for one restore run
#[derive(Debug, Clone)]
pub struct RestoreOptions {
    /// Dump document to read
    pub input: PathBuf,
    /// Directory to recreate the repository in
    pub dest: PathBuf,
    /// Create an empty file for every binary placeholder
    pub touch_binary_placeholders: bool,
}

impl RestoreOptions {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            dest: PathBuf::from(DEFAULT_RESTORE_DIR),
            touch_binary_placeholders: false,
        }
    }

    pub fn with_dest(mut self, dest: impl Into<PathBuf>) -> Self {
        self.dest = dest.into();
        self
    }
}

/// Outcome of writing decoded actions
#[derive(Debug, Clone, Default)]
pub struct RestoreReport {
    pub written: usize,
    pub binary_placeholders: usize,
    pub failed: usize,
    pub diagnostics: Diagnostics,
}

/// Writes decoded actions below a destination root
pub struct FileWriter {
    root: PathBuf,
    touch_binary_placeholders: bool,
}

impl FileWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            touch_binary_placeholders: false,
        }
    }

    pub fn touch_binary_placeholders(mut self, touch: bool) -> Self {
        self.touch_binary_placeholders = touch;
        self
    }

    /// Apply every action. Failures are recorded per file and never stop
    /// the remaining writes.
    pub fn write_all(&self, actions: &[Action], report: &mut RestoreReport) {
        for action in actions {
            match action {
                Action::Write { path, content } => {
                    debug!("Restoring: {}", path);
                    match self.write_file(path, content.as_bytes()) {
                        Ok(()) => report.written += 1,
                        Err(e) => {
                            report.failed += 1;
                            report.diagnostics.warn(format!("Error writing file {}: {}", path, e));
                        }
                    }
                }
                Action::BinaryPlaceholder { path } => {
                    report.binary_placeholders += 1;
                    if !self.touch_binary_placeholders {
                        debug!("Skipping binary placeholder: {}", path);
                        continue;
                    }
                    if let Err(e) = self.write_file(path, &[]) {
                        report.failed += 1;
                        report
                            .diagnostics
                            .warn(format!("Error creating placeholder {}: {}", path, e));
                    }
                }
            }
        }
    }

    fn write_file(&self, relative: &str, data: &[u8]) -> std::io::Result<()> {
        // Actions from the decoder are already checked; this guards hand-built ones.
        if check_relative_path(relative).is_err() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "path escapes the destination directory",
            ));
        }
        let target = self.root.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(target, data)
    }
}

/// Restore a dump into `options.dest`.
///
/// The input is read and decoded first. An existing destination is then
/// removed and recreated only if `confirm` returns true; otherwise the run
/// ends with [`Error::Cancelled`] before anything on disk changes.
pub fn restore_repo<F>(options: &RestoreOptions, confirm: F) -> Result<RestoreReport>
where
    F: FnOnce(&Path) -> Result<bool>,
{
    if !options.input.is_file() {
        return Err(Error::InputNotFound(options.input.clone()));
    }

    let text = fs::read_to_string(&options.input).map_err(|e| Error::io(&options.input, e))?;
    let decoded = Decoder::new().decode(&text);

    if options.dest.exists() {
        if !confirm(&options.dest)? {
            return Err(Error::Cancelled(options.dest.clone()));
        }
        info!("Removing existing directory {}", options.dest.display());
        if options.dest.is_dir() {
            fs::remove_dir_all(&options.dest).map_err(|e| Error::io(&options.dest, e))?;
        } else {
            fs::remove_file(&options.dest).map_err(|e| Error::io(&options.dest, e))?;
        }
    }

    fs::create_dir_all(&options.dest).map_err(|e| Error::io(&options.dest, e))?;
    info!(
        "Restoring repository from {} into {}...",
        options.input.display(),
        options.dest.display()
    );

    let mut report = RestoreReport {
        diagnostics: decoded.diagnostics,
        ..Default::default()
    };
    FileWriter::new(&options.dest)
        .touch_binary_placeholders(options.touch_binary_placeholders)
        .write_all(&decoded.actions, &mut report);

    info!(
        "Finished restoration to {}: {} written, {} binary skipped, {} failed",
        options.dest.display(),
        report.written,
        report.binary_placeholders,
        report.failed
    );
    Ok(report)
}
