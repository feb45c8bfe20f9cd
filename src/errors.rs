//! Shared error types for the application

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for docprobe operations
#[derive(Debug, Error)]
pub enum Error {
    /// A dialect identifier outside the supported set
    #[error("Unsupported docstring dialect {0:?} (expected \"sphinx\" or \"gensim\")")]
    UnsupportedDialect(String),

    /// A dotted module path that no search root provides
    #[error("No module named {module:?} under {}", display_paths(.searched))]
    ModuleNotFound {
        module: String,
        searched: Vec<PathBuf>,
    },

    /// Python source that could not be parsed
    #[error("Parse error in {file}:{line}:{column}: {message}")]
    Parse {
        file: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    /// File system related errors
    #[error("File system error: {message}")]
    FileSystem {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Create a file system error carrying the path and the underlying cause
    pub fn file_system(
        message: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            message: message.into(),
            path: Some(path.into()),
            source: Some(source),
        }
    }

    /// Create a parse error with location
    pub fn parse(
        file: impl Into<PathBuf>,
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::Parse {
            file: file.into(),
            line,
            column,
            message: message.into(),
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "no search paths".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;
