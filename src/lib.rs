//! # repo-dump
//!
//! Serialize a directory tree into one Markdown-flavoured text document
//! and restore it again.
//!
//! ## Document Format
//!
//! `````````````text
//! # Repository: demo
//!
//! ### Repository Structure:
//! ````````````
//! /demo/
//!     ├── a.txt
//!     └── b/
//!         └── c.bin
//! ````````````
//!
//! ### Repository Contents:
//!
//! ###### File: a.txt
//! ````````````txt
//! hello
//! ````````````
//!
//! ###### File: b/c.bin
//! ````````````bin
//! [Binary file content skipped]
//! ````````````
//! `````````````
//!
//! Text content is stored verbatim after normalizing line endings to LF.
//! Binary files (a NUL byte in the first 1 KiB) are recorded by path only.
//!
//! ## File Selection
//!
//! Rules, first match wins:
//! 1. The output document itself → skipped
//! 2. Anything under a `.git` directory → skipped
//! 3. Matches an exclude glob → skipped
//! 4. Matches an include glob → kept, even if `.gitignore` says otherwise
//! 5. Matches the root `.gitignore` → skipped
//! 6. Otherwise → kept
//!
//! ## Decoding
//!
//! The decoder is a three-state line scanner. Fenced blocks that do not
//! follow a `###### File:` marker (such as the structure block) are inert.
//! Unsafe paths, empty markers and truncated blocks are reported as
//! warnings and skipped without affecting other files.

pub mod classify;
pub mod decoder;
pub mod document;
pub mod dump;
pub mod encoder;
pub mod error;
pub mod lister;
pub mod restore;
pub mod tree;

pub use classify::{classify, classify_bytes, Kind};
pub use decoder::{Action, Decoded, Decoder, Listing};
pub use document::{Diagnostics, Document, Record};
pub use dump::{build_document, dump_repo, DumpOptions, DumpReport};
pub use encoder::Encoder;
pub use error::{Error, Result};
pub use lister::{FileLister, IgnoreRules, PatternSet};
pub use restore::{restore_repo, FileWriter, RestoreOptions, RestoreReport};
pub use tree::{Node, Tree, TreeBuilder};
