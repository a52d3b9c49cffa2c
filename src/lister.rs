//! File selection: `.gitignore` rules, include/exclude globs and the
//! directory walk that applies them.

use crate::document::Diagnostics;
use crate::error::{Error, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use log::{debug, info};
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

pub const GITIGNORE_FILE: &str = ".gitignore";
const GIT_DIR: &str = ".git";

/// Compiled gitignore-style rules (`*`, `**`, `!negation`, `dir/`)
#[derive(Debug, Clone)]
pub struct IgnoreRules {
    matcher: Gitignore,
}

impl IgnoreRules {
    /// No rules; nothing is ignored
    pub fn empty() -> Self {
        Self {
            matcher: Gitignore::empty(),
        }
    }

    /// Load `<root>/.gitignore`. A missing file yields empty rules; an
    /// unreadable one yields empty rules and a warning.
    pub fn load(root: &Path, diagnostics: &mut Diagnostics) -> Self {
        let path = root.join(GITIGNORE_FILE);
        if !path.is_file() {
            info!("No {} found in {}", GITIGNORE_FILE, root.display());
            return Self::empty();
        }

        match fs::read(&path) {
            Ok(bytes) => {
                let text = decode_text_lossless(bytes);
                Self::from_lines(root, text.lines(), diagnostics)
            }
            Err(e) => {
                diagnostics.warn(format!("Could not read {}: {}", path.display(), e));
                Self::empty()
            }
        }
    }

    /// Compile rules from individual lines. Lines that fail to parse are
    /// skipped with a warning.
    pub fn from_lines<'a>(
        root: &Path,
        lines: impl IntoIterator<Item = &'a str>,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let mut builder = GitignoreBuilder::new(root);
        for line in lines {
            if let Err(e) = builder.add_line(None, line) {
                diagnostics.warn(format!("Skipping invalid ignore rule '{}': {}", line, e));
            }
        }

        match builder.build() {
            Ok(matcher) => Self { matcher },
            Err(e) => {
                diagnostics.warn(format!("Failed to compile ignore rules: {}", e));
                Self::empty()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.matcher.is_empty()
    }

    /// True if `relative_path`, or any directory above it, is ignored
    pub fn matches(&self, relative_path: &str, is_dir: bool) -> bool {
        self.matcher
            .matched_path_or_any_parents(relative_path, is_dir)
            .is_ignore()
    }
}

/// `.gitignore` files are usually UTF-8; anything else is read as Latin-1
/// so every byte maps to some character.
fn decode_text_lossless(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
    }
}

/// Include or exclude globs given on the command line
#[derive(Debug, Clone)]
pub struct PatternSet {
    set: Option<GlobSet>,
}

impl PatternSet {
    pub fn empty() -> Self {
        Self { set: None }
    }

    /// Compile globs. An invalid glob is a configuration error.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        let mut added = false;

        for pattern in patterns {
            let pattern = pattern.as_ref().trim();
            if pattern.is_empty() {
                continue;
            }
            let glob = Glob::new(pattern).map_err(|source| Error::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
            builder.add(glob);
            added = true;
        }

        if !added {
            return Ok(Self::empty());
        }
        let set = builder.build().map_err(|source| Error::InvalidPattern {
            pattern: patterns.iter().map(|p| p.as_ref()).collect::<Vec<_>>().join(", "),
            source,
        })?;
        Ok(Self { set: Some(set) })
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_none()
    }

    /// True if the path or any of its parent directories matches
    pub fn matches(&self, relative_path: &str) -> bool {
        let Some(set) = &self.set else {
            return false;
        };
        if set.is_match(relative_path) {
            return true;
        }
        relative_path
            .match_indices('/')
            .any(|(at, _)| set.is_match(&relative_path[..at]))
    }
}

/// Lists the files of a repository that should be dumped
#[derive(Debug, Clone)]
pub struct FileLister {
    root: PathBuf,
    ignore: IgnoreRules,
    include: PatternSet,
    exclude: PatternSet,
    output: Option<PathBuf>,
}

impl FileLister {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ignore: IgnoreRules::empty(),
            include: PatternSet::empty(),
            exclude: PatternSet::empty(),
            output: None,
        }
    }

    pub fn with_ignore(mut self, ignore: IgnoreRules) -> Self {
        self.ignore = ignore;
        self
    }

    pub fn with_include(mut self, include: PatternSet) -> Self {
        self.include = include;
        self
    }

    pub fn with_exclude(mut self, exclude: PatternSet) -> Self {
        self.exclude = exclude;
        self
    }

    /// Path of the document being written, so it never lists itself
    pub fn with_output(mut self, output: impl AsRef<Path>) -> Self {
        self.output = Some(resolve_path(output.as_ref()));
        self
    }

    /// Decide whether one relative file path is selected
    pub fn is_selected(&self, relative_path: &str) -> bool {
        if relative_path.split('/').any(|segment| segment == GIT_DIR) {
            return false;
        }
        if self.exclude.matches(relative_path) {
            return false;
        }
        if self.include.matches(relative_path) {
            return true;
        }
        !self.ignore.matches(relative_path, false)
    }

    /// Walk the root and return the sorted, deduplicated list of selected
    /// regular files as slash-separated relative paths
    pub fn list(&self, diagnostics: &mut Diagnostics) -> Result<Vec<String>> {
        let root = resolve_path(&self.root);
        let mut files = Vec::new();

        let walker = WalkDir::new(&root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || entry.file_name() != GIT_DIR);

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(e.into()),
                Err(e) => {
                    diagnostics.warn(format!("Failed to walk directory: {}", e));
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            if self.output.as_deref() == Some(entry.path()) {
                info!("Skipping self (output file): {}", entry.path().display());
                continue;
            }

            let Some(relative) = relative_slash_path(&root, entry.path()) else {
                diagnostics.warn(format!("Skipping item outside repo base: {}", entry.path().display()));
                continue;
            };

            if self.is_selected(&relative) {
                files.push(relative);
            } else {
                debug!("Filtered out: {}", relative);
            }
        }

        files.sort();
        files.dedup();
        Ok(files)
    }
}

/// Absolute, symlink-free form of `path`. Paths that do not exist yet are
/// resolved through their parent directory.
pub fn resolve_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => resolve_path(parent).join(name),
        _ => std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf()),
    }
}

fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let segments: Vec<String> = relative
        .components()
        .map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Option<_>>()?;
    if segments.is_empty() {
        return None;
    }
    Some(segments.join("/"))
}
