//! Error kinds for dataset loading and selection parsing

use std::path::PathBuf;

/// Startup failure: the dataset cannot be served.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("input file not found: {0}")]
    Missing(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("{path} has {rows} rows but the sample table has {expected}")]
    RowCountMismatch {
        path: PathBuf,
        rows: usize,
        expected: usize,
    },

    #[error("{path} has {cols} columns, need at least 3")]
    TooFewColumns { path: PathBuf, cols: usize },

    #[error("sample {sample} has {scheme} value '{value}' which is not a declared category")]
    UnknownCategory {
        scheme: String,
        sample: String,
        value: String,
    },

    #[error("{scheme} category '{category}' has no label")]
    MissingLabel { scheme: String, category: String },

    #[error("{scheme} category '{category}' has no color")]
    MissingColor { scheme: String, category: String },

    #[error("{path}: {scheme} category '{category}': {source}")]
    InvalidColor {
        path: PathBuf,
        scheme: String,
        category: String,
        #[source]
        source: InvalidColorError,
    },
}

impl DataLoadError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        DataLoadError::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Map an open/read failure, reporting absent files as `Missing`
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            DataLoadError::Missing(path)
        } else {
            DataLoadError::Io { path, source }
        }
    }
}

/// A color string that is neither `rgb(r,g,b)` nor `#rrggbb`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color '{0}' (expected rgb(r,g,b) or #rrggbb)")]
pub struct InvalidColorError(pub String);

/// A selector value outside its enumerated domain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field} '{value}' (expected one of: {expected})")]
pub struct InvalidSelectionError {
    pub field: &'static str,
    pub value: String,
    pub expected: &'static str,
}
