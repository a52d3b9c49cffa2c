//! Binary/text classification by sniffing a file prefix

use crate::document::Diagnostics;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Number of leading bytes inspected
pub const SNIFF_LEN: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Text,
    Binary,
}

/// Classify in-memory data: binary if the first [`SNIFF_LEN`] bytes hold a NUL
pub fn classify_bytes(data: &[u8]) -> Kind {
    let prefix = &data[..data.len().min(SNIFF_LEN)];
    if prefix.contains(&0) {
        Kind::Binary
    } else {
        Kind::Text
    }
}

/// Classify a file on disk. Read failures fall back to [`Kind::Text`]
/// with a warning, leaving the real error to surface when the file is read.
pub fn classify(path: &Path, diagnostics: &mut Diagnostics) -> Kind {
    match read_prefix(path) {
        Ok(prefix) => classify_bytes(&prefix),
        Err(e) => {
            diagnostics.warn(format!(
                "Could not check if '{}' is binary: {}. Assuming text.",
                path.display(),
                e
            ));
            Kind::Text
        }
    }
}

fn read_prefix(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut prefix = Vec::with_capacity(SNIFF_LEN);
    File::open(path)?
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut prefix)?;
    Ok(prefix)
}
