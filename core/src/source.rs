//! # Source Files
//!
//! Reading and writing of the target source files, and derivation of the
//! module name used to qualify references into a file.

use crate::error::{AppError, AppResult};
use std::fs;
use std::path::Path;

/// Reads a source file that must exist.
pub fn read_source(path: &Path) -> AppResult<String> {
    fs::read_to_string(path).map_err(|e| AppError::file(path, e))
}

/// Reads a source file, treating a missing file as empty.
pub fn read_source_or_empty(path: &Path) -> AppResult<String> {
    if !path.exists() {
        return Ok(String::new());
    }
    read_source(path)
}

/// Replaces the contents of `path` with `content`, creating parent
/// directories as needed.
pub fn write_source(path: &Path, content: &str) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| AppError::file(parent, e))?;
        }
    }
    fs::write(path, content).map_err(|e| AppError::file(path, e))
}

/// Derives the module path segment under which items of `path` are referenced.
///
/// `src/types.rs` and `src/types/mod.rs` both yield `types`; crate roots
/// (`lib.rs`, `main.rs`) yield `crate`.
///
/// # Examples
/// ```
/// use apigen_core::source::module_name;
/// use std::path::Path;
///
/// assert_eq!(module_name(Path::new("src/handlers.rs")), "handlers");
/// assert_eq!(module_name(Path::new("src/logic/mod.rs")), "logic");
/// assert_eq!(module_name(Path::new("src/lib.rs")), "crate");
/// ```
pub fn module_name(path: &Path) -> String {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    match stem {
        "mod" => path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|s| s.to_str())
            .unwrap_or("crate")
            .to_string(),
        "lib" | "main" => "crate".to_string(),
        other => other.to_string(),
    }
}
