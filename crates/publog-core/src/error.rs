//! Error types for the publog-core library.
//!
//! This module provides error handling using the `thiserror` crate, with
//! variants for the failure modes of the decoding pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for publog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all publog operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to read input file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to write output file
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        /// Path to the file that failed to write
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to create output directory
    #[error("failed to create directory '{path}': {source}")]
    DirectoryCreate {
        /// Path to the directory that failed to create
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Container too short to carry a compressed payload
    #[error("invalid container: {len} bytes is below the {min}-byte minimum")]
    InvalidContainer {
        /// Actual length of the input buffer
        len: usize,
        /// Minimum viable container length
        min: usize,
    },

    /// Failed to serialize consolidated records
    #[error("failed to write records to '{path}': {source}")]
    CsvWrite {
        /// Path to the output file
        path: PathBuf,
        /// Underlying CSV serialization error
        #[source]
        source: csv::Error,
    },
}

impl Error {
    /// Creates a new file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new file write error
    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates a new directory creation error
    pub fn directory_create(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryCreate {
            path: path.into(),
            source,
        }
    }

    /// Creates a new invalid container error
    pub fn invalid_container(len: usize) -> Self {
        Self::InvalidContainer {
            len,
            min: crate::decode::MIN_CONTAINER_LEN,
        }
    }

    /// Creates a new CSV write error
    pub fn csv_write(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::CsvWrite {
            path: path.into(),
            source,
        }
    }

    /// Returns true if this error is recoverable by the fallback extractor
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidContainer { .. })
    }
}
