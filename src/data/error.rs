//! Error types for loading a dataset.
//!
//! Only two things can go wrong when loading:
//!
//! - [`LoadError::Io`] - the file cannot be read at all
//! - [`LoadError::Format`] - the bytes are not a usable table
//!
//! Missing optional columns are never errors; they switch off single
//! dashboard features (see [`super::schema`]).

use std::path::PathBuf;

use thiserror::Error;

/// Errors while turning file contents into a [`super::model::Dataset`].
#[derive(Debug, Error)]
pub enum FormatError {
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),

    /// The file has no header row.
    #[error("no header row")]
    NoHeader,

    /// A header is blank once surrounding whitespace is removed.
    #[error("column {index} has an empty name after trimming")]
    EmptyColumnName { index: usize },

    /// Two headers are identical once surrounding whitespace is removed.
    #[error("duplicate column name '{0}' after trimming")]
    DuplicateColumn(String),

    /// A typed column holds a value it cannot hold.
    #[error("column '{column}', row {row}: {message}")]
    InvalidValue {
        column: String,
        row: usize,
        message: String,
    },

    /// The document parsed but does not have a table shape.
    #[error("{0}")]
    Layout(String),

    #[error("unsupported column type {0}")]
    UnsupportedType(String),

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}

/// Top-level load failure, always tagged with the offending path.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a readable table: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
}

impl LoadError {
    pub fn format(path: impl Into<PathBuf>, source: impl Into<FormatError>) -> Self {
        LoadError::Format {
            path: path.into(),
            source: source.into(),
        }
    }
}

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_names_path_and_cause() {
        let err = LoadError::format("data/baseball.csv", FormatError::DuplicateColumn("W".into()));
        let msg = err.to_string();
        assert!(msg.contains("data/baseball.csv"));
        assert!(msg.contains("duplicate column name 'W'"));
    }

    #[test]
    fn io_error_keeps_source() {
        let err = LoadError::Io {
            path: "missing.csv".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("cannot read missing.csv"));
    }
}
