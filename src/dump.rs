//! Dump pipeline: list, classify, build the tree, write the document.

use crate::classify::{classify, Kind};
use crate::document::{Diagnostics, Document, Record, TREE_INDENT};
use crate::encoder::Encoder;
use crate::error::{Error, Result};
use crate::lister::{resolve_path, FileLister, IgnoreRules, PatternSet};
use crate::tree::TreeBuilder;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT_FILE: &str = "./output/repo_dump.md";

/// Inputs for one dump run
#[derive(Debug, Clone)]
pub struct DumpOptions {
    /// Repository root to dump
    pub repo: PathBuf,
    /// Document to write
    pub output: PathBuf,
    /// Globs forced in even when `.gitignore` excludes them
    pub include: Vec<String>,
    /// Globs always left out
    pub exclude: Vec<String>,
}

impl DumpOptions {
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self {
            repo: repo.into(),
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }
}

/// Outcome of a dump run
#[derive(Debug, Clone, Default)]
pub struct DumpReport {
    pub text_files: usize,
    pub binary_files: usize,
    pub diagnostics: Diagnostics,
}

/// Build the in-memory document for a repository without writing it.
/// `output`, when given, is left out of the listing.
pub fn build_document(
    repo: &Path,
    include: &[String],
    exclude: &[String],
    output: Option<&Path>,
    diagnostics: &mut Diagnostics,
) -> Result<Document> {
    if !repo.is_dir() {
        return Err(Error::SourceNotFound(repo.to_path_buf()));
    }
    let include = PatternSet::compile(include)?;
    let exclude = PatternSet::compile(exclude)?;

    info!("Loading .gitignore from {}...", repo.display());
    let ignore = IgnoreRules::load(repo, diagnostics);

    info!("Listing files in {}...", repo.display());
    let mut lister = FileLister::new(repo)
        .with_ignore(ignore)
        .with_include(include)
        .with_exclude(exclude);
    if let Some(output) = output {
        lister = lister.with_output(output);
    }
    let files = lister.list(diagnostics)?;
    if files.is_empty() {
        warn!("No files found to dump (after applying ignore rules)");
    }

    info!("Building file tree...");
    let tree = TreeBuilder::new().build(&files, diagnostics);

    let repo_name = resolve_path(repo)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut document = Document::new(repo_name);
    document.tree_lines = tree.render(TREE_INDENT);

    for relative in &files {
        debug!("Dumping: {}", relative);
        let path = repo.join(relative);
        let record = match classify(&path, diagnostics) {
            Kind::Binary => Record::binary(relative.as_str()),
            Kind::Text => read_text_record(relative, &path, diagnostics),
        };
        document.push_record(record);
    }

    Ok(document)
}

fn read_text_record(relative: &str, path: &Path, diagnostics: &mut Diagnostics) -> Record {
    match fs::read(path) {
        Ok(bytes) => {
            let record = Record::text(relative, &String::from_utf8_lossy(&bytes));
            if record.has_fence_line() {
                diagnostics.warn(format!(
                    "File {} contains a line matching the block fence; it will not restore intact",
                    relative
                ));
            }
            record
        }
        Err(e) => {
            diagnostics.warn(format!("Error reading file {}: {}", relative, e));
            Record::read_error(relative, &e)
        }
    }
}

/// Dump `options.repo` into `options.output`
pub fn dump_repo(options: &DumpOptions) -> Result<DumpReport> {
    let mut report = DumpReport::default();

    let document = build_document(
        &options.repo,
        &options.include,
        &options.exclude,
        Some(&options.output),
        &mut report.diagnostics,
    )?;

    if let Some(parent) = options.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
    }

    info!("Writing dump to {}...", options.output.display());
    Encoder::new().encode_to_file(&document, &options.output)?;

    report.binary_files = document.records.iter().filter(|r| r.is_binary).count();
    report.text_files = document.records.len() - report.binary_files;
    info!("Successfully dumped repository to {}", options.output.display());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_build_document_orders_text_before_binary() {
        let dir = tempdir().unwrap();
        let repo = dir.path().join("demo");
        fs::create_dir_all(repo.join("b")).unwrap();
        fs::write(repo.join("a.bin"), [0u8, 1, 2]).unwrap();
        fs::write(repo.join("b/c.txt"), "see").unwrap();
        fs::write(repo.join("d.txt"), "dee\r\n").unwrap();

        let mut diagnostics = Diagnostics::new();
        let document = build_document(&repo, &[], &[], None, &mut diagnostics).unwrap();

        assert!(diagnostics.is_empty());
        assert_eq!(document.repo_name, "demo");
        let order: Vec<&str> = document.records.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(order, vec!["b/c.txt", "d.txt", "a.bin"]);
        assert_eq!(document.records[1].payload, "dee\n");
        assert_eq!(
            document.tree_lines,
            vec!["    ├── a.bin", "    ├── d.txt", "    └── b/", "        └── c.txt"]
        );
    }

    #[test]
    fn test_build_document_warns_on_fence_line() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.md"), "x\n````````````\ny\n").unwrap();
        fs::write(dir.path().join("b.md"), "```rust\nfn main() {}\n```\n").unwrap();

        let mut diagnostics = Diagnostics::new();
        let document = build_document(dir.path(), &[], &[], None, &mut diagnostics).unwrap();

        assert_eq!(document.records.len(), 2);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics.mentions("a.md"));
    }

    #[test]
    fn test_dump_missing_repo() {
        let dir = tempdir().unwrap();
        let options = DumpOptions::new(dir.path().join("nope")).with_output(dir.path().join("out.md"));

        assert!(matches!(dump_repo(&options), Err(Error::SourceNotFound(_))));
        assert!(!dir.path().join("out.md").exists());
    }

    #[test]
    fn test_dump_invalid_glob_writes_nothing() {
        let dir = tempdir().unwrap();
        let mut options = DumpOptions::new(dir.path()).with_output(dir.path().join("out/dump.md"));
        options.exclude.push("[oops".to_string());

        assert!(matches!(dump_repo(&options), Err(Error::InvalidPattern { .. })));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_dump_does_not_include_itself() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("main.rs"), "fn main() {}\n").unwrap();
        let output = dir.path().join("dump.md");
        fs::write(&output, "stale dump").unwrap();

        let report = dump_repo(&DumpOptions::new(dir.path()).with_output(&output)).unwrap();

        assert_eq!(report.text_files, 1);
        let written = fs::read_to_string(&output).unwrap();
        assert!(written.contains("###### File: main.rs\n"));
        assert!(!written.contains("###### File: dump.md"));
        assert!(!written.contains("stale dump"));
    }
}
