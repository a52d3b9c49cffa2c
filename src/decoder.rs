//! Dump document decoder
//!
//! The same fence token opens the structure block and opens and closes
//! every content block, so the scanner tracks which kind of block it is
//! in. Lines are consumed one at a time; nothing is written to disk here.

use crate::document::{check_relative_path, is_fence_line, Diagnostics, UnsafePath, BINARY_PLACEHOLDER, FILE_MARKER};

/// One file to materialize, produced when a content block closes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Write `content` verbatim to `path`
    Write { path: String, content: String },
    /// The block held only the binary placeholder
    BinaryPlaceholder { path: String },
}

impl Action {
    pub fn path(&self) -> &str {
        match self {
            Action::Write { path, .. } | Action::BinaryPlaceholder { path } => path,
        }
    }
}

/// Result of scanning a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoded {
    pub actions: Vec<Action>,
    pub diagnostics: Diagnostics,
}

/// Entry summary for listing a document without restoring it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub path: String,
    pub is_binary: bool,
    /// Payload size in bytes (zero for binary placeholders)
    pub size: usize,
}

#[derive(Debug)]
enum ScanState {
    AwaitingMarker,
    AwaitingFenceOpen { path: String },
    InContent { path: String, payload: String },
}

/// Decodes a dump document
pub struct Decoder {}

impl Decoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self {}
    }

    /// Decode a document into reconstruction actions
    pub fn decode(&self, input: &str) -> Decoded {
        let mut decoded = Decoded::default();
        let mut state = ScanState::AwaitingMarker;
        let mut inside_fence = false;

        for (index, line) in input.split_inclusive('\n').enumerate() {
            let line_num = index + 1;

            if is_fence_line(line) {
                inside_fence = !inside_fence;
                state = match state {
                    ScanState::AwaitingFenceOpen { path } => ScanState::InContent {
                        path,
                        payload: String::new(),
                    },
                    ScanState::InContent { path, payload } => {
                        decoded.actions.push(finalize(path, payload));
                        ScanState::AwaitingMarker
                    }
                    // Structure block or stray fences: inert context
                    ScanState::AwaitingMarker => ScanState::AwaitingMarker,
                };
                continue;
            }

            state = match state {
                ScanState::InContent { path, mut payload } => {
                    payload.push_str(line);
                    ScanState::InContent { path, payload }
                }
                // Tree lines are indented, so a marker here means a content
                // block closed early and its real closing fence opened this one
                ScanState::AwaitingMarker if inside_fence => match marker_suffix(line) {
                    Some(_) => {
                        inside_fence = false;
                        match self.parse_marker(line, line_num, &mut decoded.diagnostics) {
                            Some(path) => {
                                decoded.diagnostics.warn(format!(
                                    "Marker for '{}' on line {} follows an unbalanced fence; the previous file may be incomplete",
                                    path, line_num
                                ));
                                ScanState::AwaitingFenceOpen { path }
                            }
                            None => ScanState::AwaitingMarker,
                        }
                    }
                    None => ScanState::AwaitingMarker,
                },
                ScanState::AwaitingMarker => match self.parse_marker(line, line_num, &mut decoded.diagnostics) {
                    Some(path) => ScanState::AwaitingFenceOpen { path },
                    None => ScanState::AwaitingMarker,
                },
                ScanState::AwaitingFenceOpen { path } => {
                    if marker_suffix(line).is_some() {
                        match self.parse_marker(line, line_num, &mut decoded.diagnostics) {
                            Some(next) => {
                                decoded.diagnostics.warn(format!(
                                    "Marker for '{}' has no content block; superseded on line {}",
                                    path, line_num
                                ));
                                ScanState::AwaitingFenceOpen { path: next }
                            }
                            None => ScanState::AwaitingFenceOpen { path },
                        }
                    } else {
                        ScanState::AwaitingFenceOpen { path }
                    }
                }
            };
        }

        match state {
            ScanState::AwaitingMarker => {}
            ScanState::AwaitingFenceOpen { path } | ScanState::InContent { path, .. } => {
                decoded.diagnostics.warn(format!(
                    "Dump file ended unexpectedly; '{}' may be incomplete and was not restored",
                    path
                ));
            }
        }

        decoded
    }

    /// List the entries of a document
    pub fn list(&self, input: &str) -> (Vec<Listing>, Diagnostics) {
        let decoded = self.decode(input);
        let entries = decoded
            .actions
            .iter()
            .map(|action| match action {
                Action::Write { path, content } => Listing {
                    path: path.clone(),
                    is_binary: false,
                    size: content.len(),
                },
                Action::BinaryPlaceholder { path } => Listing {
                    path: path.clone(),
                    is_binary: true,
                    size: 0,
                },
            })
            .collect();
        (entries, decoded.diagnostics)
    }

    /// Parse a marker line like "###### File: src/lib.rs", rejecting
    /// empty and unsafe paths
    fn parse_marker(&self, line: &str, line_num: usize, diagnostics: &mut Diagnostics) -> Option<String> {
        let path = strip_line_ending(marker_suffix(line)?);

        match check_relative_path(path) {
            Ok(()) => Some(path.to_string()),
            Err(UnsafePath::Empty) => {
                diagnostics.warn(format!("Skipping empty file path found on line {}", line_num));
                None
            }
            Err(UnsafePath::ParentSegment) | Err(UnsafePath::Absolute) => {
                diagnostics.warn(format!(
                    "Skipping unsafe file path '{}' on line {}: must stay inside the destination",
                    path, line_num
                ));
                None
            }
        }
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Text after the marker prefix; a bare marker whose trailing space was
/// stripped yields an empty suffix
fn marker_suffix(line: &str) -> Option<&str> {
    line.strip_prefix(FILE_MARKER)
        .or_else(|| (line.trim_end() == FILE_MARKER.trim_end()).then_some(""))
}

fn strip_line_ending(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}

fn finalize(path: String, payload: String) -> Action {
    if strip_line_ending(&payload) == BINARY_PLACEHOLDER {
        Action::BinaryPlaceholder { path }
    } else {
        Action::Write { path, content: payload }
    }
}
