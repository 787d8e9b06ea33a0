//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.

use derive_more::{Display, From};
use std::path::Path;

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// An IO error tied to a specific file path.
    #[from(ignore)]
    #[display("Failed to access '{_0}': {_1}")]
    File(String, std::io::Error),

    /// Source text (a target file or a generated fragment) failed to parse.
    #[from(ignore)]
    #[display("Parse Error in {_0}: {_1}")]
    Parse(String, String),

    /// A required declaration, function or type was not found.
    #[from(ignore)]
    #[display("Not Found: {_0}")]
    NotFound(String),

    /// Invalid or unreadable configuration.
    #[from(ignore)]
    #[display("Config Error: {_0}")]
    Config(String),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

impl AppError {
    /// Wraps an IO error with the path it occurred on.
    pub fn file(path: &Path, err: std::io::Error) -> Self {
        AppError::File(path.display().to_string(), err)
    }
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Io(e) | AppError::File(_, e) => Some(e),
            _ => None,
        }
    }
}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_io_conversion() {
        let io_err = Error::new(ErrorKind::Other, "test");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
    }

    #[test]
    fn test_string_conversion() {
        let msg = String::from("something wrong");
        let app_err: AppError = msg.into();
        match app_err {
            AppError::General(s) => assert_eq!(s, "something wrong"),
            _ => panic!("String should convert to AppError::General"),
        }
    }

    #[test]
    fn test_file_error_keeps_path_and_cause() {
        let err = AppError::file(
            Path::new("src/router.rs"),
            Error::new(ErrorKind::NotFound, "missing"),
        );
        assert_eq!(
            err.to_string(),
            "Failed to access 'src/router.rs': missing"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn test_parse_display() {
        let err = AppError::Parse("generated fragment".into(), "expected `;`".into());
        assert_eq!(
            format!("{}", err),
            "Parse Error in generated fragment: expected `;`"
        );
    }
}
