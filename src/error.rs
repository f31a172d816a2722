use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = ColormapError> = std::result::Result<T, E>;

/// Everything that can go wrong while turning a `colormaps.toml` into a table.
///
/// Every variant carries the file path plus whatever is needed to find the
/// offending line without re-running the loader.
#[derive(Debug, Error)]
pub enum ColormapError {
    #[error("colormap file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read colormap file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error decoding TOML file at {}: {message}", .path.display())]
    Malformed { path: PathBuf, message: String },

    #[error(
        "{} does not contain the expected key '{key}'. Available keys: [{}]",
        .path.display(),
        .available.join(", ")
    )]
    MissingSection {
        path: PathBuf,
        key: String,
        available: Vec<String>,
    },

    #[error(
        "{}: section '{key}' must be an array of tables written as [[{key}]], got {actual}: {value}",
        .path.display()
    )]
    InvalidSection {
        path: PathBuf,
        key: String,
        actual: String,
        value: String,
    },

    #[error(
        "{}: missing '{field}' in [[{section}]] entry #{index}: {record}",
        .path.display()
    )]
    MissingField {
        path: PathBuf,
        section: String,
        index: usize,
        field: &'static str,
        record: String,
    },

    #[error(
        "{}: expected '{field}' in [[{section}]] entry #{index} to be {expected}, got {actual}: {record}",
        .path.display()
    )]
    InvalidType {
        path: PathBuf,
        section: String,
        index: usize,
        field: String,
        expected: &'static str,
        actual: String,
        record: String,
    },
}

impl ColormapError {
    /// Name of the field a record-level error points at, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            ColormapError::MissingField { field, .. } => Some(*field),
            ColormapError::InvalidType { field, .. } => Some(field.as_str()),
            _ => None,
        }
    }

    pub fn path(&self) -> &std::path::Path {
        match self {
            ColormapError::NotFound { path }
            | ColormapError::Io { path, .. }
            | ColormapError::Malformed { path, .. }
            | ColormapError::MissingSection { path, .. }
            | ColormapError::InvalidSection { path, .. }
            | ColormapError::MissingField { path, .. }
            | ColormapError::InvalidType { path, .. } => path.as_path(),
        }
    }
}
