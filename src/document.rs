//! Document data structures and format constants

use std::path::Path;

// Dump format constants
pub const TITLE_PREFIX: &str = "# Repository: ";
pub const TREE_HEADER: &str = "### Repository Structure:";
pub const CONTENT_HEADER: &str = "### Repository Contents:";
pub const FILE_MARKER: &str = "###### File: ";
pub const FENCE: &str = "````````````";
pub const BINARY_PLACEHOLDER: &str = "[Binary file content skipped]";

/// Indentation applied to every rendered tree line below the root line
pub const TREE_INDENT: &str = "    ";

/// A single file entry in the contents section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Slash-separated path relative to the repository root
    pub path: String,
    /// Whether the payload is the binary placeholder
    pub is_binary: bool,
    /// Normalized text (LF line endings), or the placeholder for binaries
    pub payload: String,
}

impl Record {
    /// Create a text record. Line endings are normalized to LF and a
    /// trailing newline is added to non-empty content.
    pub fn text(path: impl Into<String>, content: &str) -> Self {
        let mut payload = normalize_newlines(content);
        if !payload.is_empty() && !payload.ends_with('\n') {
            payload.push('\n');
        }
        Self {
            path: path.into(),
            is_binary: false,
            payload,
        }
    }

    /// Create a binary record carrying only the placeholder
    pub fn binary(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_binary: true,
            payload: format!("{}\n", BINARY_PLACEHOLDER),
        }
    }

    /// Create a text record whose payload reports a read failure
    pub fn read_error(path: impl Into<String>, err: &std::io::Error) -> Self {
        Self::text(path, &format!("Error reading file: {}", err))
    }

    /// Extension of the file name without the dot, empty if none
    pub fn language_hint(&self) -> &str {
        language_hint(&self.path)
    }

    /// Hint written after the opening fence. Extensions that a fence line
    /// cannot carry (whitespace or backticks) are dropped.
    pub fn fence_hint(&self) -> &str {
        let hint = self.language_hint();
        if hint.contains(|c: char| c == '`' || c.is_whitespace()) {
            ""
        } else {
            hint
        }
    }

    /// True if a payload line would be read back as a fence, which cuts
    /// the block short on restore
    pub fn has_fence_line(&self) -> bool {
        !self.is_binary && self.payload.lines().any(is_fence_line)
    }
}

/// Everything needed to render one dump document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Repository name shown in the title and as the tree root
    pub repo_name: String,
    /// Rendered tree lines, already indented
    pub tree_lines: Vec<String>,
    /// File records in output order
    pub records: Vec<Record>,
}

impl Document {
    pub fn new(repo_name: impl Into<String>) -> Self {
        Self {
            repo_name: repo_name.into(),
            ..Default::default()
        }
    }

    /// Append a record, keeping text records ahead of binary ones
    pub fn push_record(&mut self, record: Record) {
        if record.is_binary {
            self.records.push(record);
        } else {
            let at = self
                .records
                .iter()
                .position(|r| r.is_binary)
                .unwrap_or(self.records.len());
            self.records.insert(at, record);
        }
    }
}

/// Non-fatal problems gathered during one encode or decode run.
/// Every entry is also emitted through `log::warn!`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub warnings: Vec<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}", message);
        self.warnings.push(message);
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    /// True if any warning mentions `needle`
    pub fn mentions(&self, needle: &str) -> bool {
        self.warnings.iter().any(|w| w.contains(needle))
    }
}

/// Map CRLF and lone CR to LF
pub fn normalize_newlines(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Extension of the last path segment without the dot
pub fn language_hint(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(0) | None => "",
        Some(dot) => &name[dot + 1..],
    }
}

/// A fence line is the fence token, optionally followed by a language
/// hint, with surrounding whitespace ignored
pub fn is_fence_line(line: &str) -> bool {
    match line.trim().strip_prefix(FENCE) {
        Some(hint) => !hint.contains(|c: char| c == '`' || c.is_whitespace()),
        None => false,
    }
}

/// Reason a relative path from a document was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsafePath {
    Empty,
    Absolute,
    ParentSegment,
}

/// Check that `path` stays inside whatever root it is joined to
pub fn check_relative_path(path: &str) -> Result<(), UnsafePath> {
    if path.trim().is_empty() {
        return Err(UnsafePath::Empty);
    }
    if path.starts_with('/') || path.starts_with('\\') || Path::new(path).is_absolute() {
        return Err(UnsafePath::Absolute);
    }
    // Drive prefixes such as `C:` are absolute on Windows only; refuse them everywhere.
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        return Err(UnsafePath::Absolute);
    }
    if path.split(['/', '\\']).any(|segment| segment == "..") {
        return Err(UnsafePath::ParentSegment);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_record_adds_trailing_newline() {
        let record = Record::text("a.txt", "hello");
        assert_eq!(record.payload, "hello\n");
        assert!(!record.is_binary);
    }

    #[test]
    fn test_text_record_keeps_empty_content_empty() {
        assert_eq!(Record::text("empty.txt", "").payload, "");
    }

    #[test]
    fn test_text_record_normalizes_line_endings() {
        let record = Record::text("win.txt", "one\r\ntwo\rthree");
        assert_eq!(record.payload, "one\ntwo\nthree\n");
    }

    #[test]
    fn test_binary_record_payload() {
        let record = Record::binary("img.png");
        assert!(record.is_binary);
        assert_eq!(record.payload, "[Binary file content skipped]\n");
    }

    #[test]
    fn test_language_hint() {
        assert_eq!(language_hint("src/main.rs"), "rs");
        assert_eq!(language_hint("Makefile"), "");
        assert_eq!(language_hint("dir.d/README"), "");
        assert_eq!(language_hint(".gitignore"), "");
        assert_eq!(language_hint("archive.tar.gz"), "gz");
    }

    #[test]
    fn test_fence_hint_drops_unsafe_extensions() {
        assert_eq!(Record::text("src/main.rs", "").fence_hint(), "rs");
        assert_eq!(Record::text("a.final draft", "").fence_hint(), "");
        assert_eq!(Record::text("odd.x`y", "").fence_hint(), "");
        assert_eq!(Record::text("tab.a\tb", "").fence_hint(), "");
    }

    #[test]
    fn test_is_fence_line() {
        assert!(is_fence_line("````````````\n"));
        assert!(is_fence_line("````````````rs\n"));
        assert!(is_fence_line("  ````````````  \r\n"));
        assert!(!is_fence_line("```\n"));
        assert!(!is_fence_line("````````````` \n"));
        assert!(!is_fence_line("````````````rs extra\n"));
        assert!(!is_fence_line("text ````````````\n"));
    }

    #[test]
    fn test_has_fence_line() {
        assert!(Record::text("a.md", "x\n````````````\ny\n").has_fence_line());
        assert!(!Record::text("b.md", "```rust\nfn main() {}\n```\n").has_fence_line());
        assert!(!Record::binary("c.bin").has_fence_line());
    }

    #[test]
    fn test_push_record_groups_text_before_binary() {
        let mut doc = Document::new("demo");
        doc.push_record(Record::binary("a.bin"));
        doc.push_record(Record::text("b.txt", "b"));
        doc.push_record(Record::binary("c.bin"));
        doc.push_record(Record::text("d.txt", "d"));

        let order: Vec<&str> = doc.records.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(order, vec!["b.txt", "d.txt", "a.bin", "c.bin"]);
    }

    #[test]
    fn test_check_relative_path() {
        assert_eq!(check_relative_path("src/lib.rs"), Ok(()));
        assert_eq!(check_relative_path("a..b/c"), Ok(()));
        assert_eq!(check_relative_path(""), Err(UnsafePath::Empty));
        assert_eq!(check_relative_path("   "), Err(UnsafePath::Empty));
        assert_eq!(check_relative_path(" spaced name.txt "), Ok(()));
        assert_eq!(check_relative_path("../evil.txt"), Err(UnsafePath::ParentSegment));
        assert_eq!(check_relative_path("a/../../b"), Err(UnsafePath::ParentSegment));
        assert_eq!(check_relative_path("/etc/passwd"), Err(UnsafePath::Absolute));
        assert_eq!(check_relative_path("C:/x"), Err(UnsafePath::Absolute));
    }

    #[test]
    fn test_diagnostics_collects_warnings() {
        let mut diag = Diagnostics::new();
        assert!(diag.is_empty());
        diag.warn("first problem");
        diag.warn(String::from("second problem"));
        assert_eq!(diag.len(), 2);
        assert!(diag.mentions("second"));
        assert!(!diag.mentions("third"));
    }
}
