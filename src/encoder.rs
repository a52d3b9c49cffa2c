//! Dump document encoder

use crate::document::{
    Document, Record, CONTENT_HEADER, FENCE, FILE_MARKER, TITLE_PREFIX, TREE_HEADER,
};
use crate::error::{Error, Result};

/// Encodes a document into its text form
pub struct Encoder {}

impl Encoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self {}
    }

    /// Encode a document to a string
    pub fn encode(&self, document: &Document) -> String {
        let mut output = String::new();

        output.push_str(TITLE_PREFIX);
        output.push_str(&document.repo_name);
        output.push_str("\n\n");

        // Structure section
        output.push_str(TREE_HEADER);
        output.push('\n');
        output.push_str(FENCE);
        output.push('\n');
        output.push('/');
        output.push_str(&document.repo_name);
        output.push_str("/\n");
        for line in &document.tree_lines {
            output.push_str(line);
            output.push('\n');
        }
        output.push_str(FENCE);
        output.push_str("\n\n");

        // Contents section
        output.push_str(CONTENT_HEADER);
        output.push_str("\n\n");
        for record in &document.records {
            self.encode_record(&mut output, record);
        }

        output
    }

    /// Encode a single file block
    fn encode_record(&self, output: &mut String, record: &Record) {
        output.push_str(FILE_MARKER);
        output.push_str(&record.path);
        output.push('\n');

        output.push_str(FENCE);
        output.push_str(record.fence_hint());
        output.push('\n');

        output.push_str(&record.payload);
        if !record.payload.is_empty() && !record.payload.ends_with('\n') {
            output.push('\n');
        }

        output.push_str(FENCE);
        output.push_str("\n\n");
    }

    /// Encode a document directly to a writer
    pub fn encode_to_writer<W: std::io::Write>(&self, document: &Document, mut writer: W) -> std::io::Result<()> {
        writer.write_all(self.encode(document).as_bytes())
    }

    /// Encode a document to a file
    pub fn encode_to_file(&self, document: &Document, path: &std::path::Path) -> Result<()> {
        std::fs::write(path, self.encode(document)).map_err(|e| Error::io(path, e))
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}
