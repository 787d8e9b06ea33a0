//! # Code Patching
//!
//! Utilities for modifying Rust source code strings based on AST analysis.
//!
//! - **files**: Modifying file-level items like imports.
//! - **declarations**: Appending synthesized top-level declarations.
//!
//! Every operation splices text at syntax-node offsets, so bytes outside the
//! inserted content are preserved verbatim.

pub(crate) mod common;

/// File-level patching operations (e.g. imports).
pub mod files;

/// Idempotent merging of synthesized declarations into a target file.
pub mod declarations;

pub use declarations::{merge_declarations, merge_into_file, MergeOutcome};
pub use files::add_import;
