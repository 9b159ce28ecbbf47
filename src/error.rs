//! # Error standards
//!
//! This module provides a standardised error enum and result type for this crate.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::path::PathBuf;

use crate::array::DType;

// -----------------------------------------------------------------------------------------------
// TYPES
// -----------------------------------------------------------------------------------------------

/// Standard result type used in the stereo data crate.
pub type Result<T> = std::result::Result<T, Error>;

// -----------------------------------------------------------------------------------------------
// ENUMERATIONS
// -----------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A PFM file or manifest line could not be parsed.
    #[error("{}: {reason}", .path.display())]
    Format {
        path: PathBuf,
        reason: String
    },

    #[error("image dtype must be {expected}, found {found}")]
    Type {
        expected: DType,
        found: DType
    },

    #[error("unsupported shape: {0}")]
    Shape(String),

    #[error("out of range: {0}")]
    Range(String),

    #[error("index {index} out of range for dataset of length {len}")]
    Index {
        index: usize,
        len: usize
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError)
}

impl Error {
    /// Shorthand for a format error against the given path.
    pub(crate) fn format<P: Into<PathBuf>, S: Into<String>>(path: P, reason: S) -> Self {
        Error::Format {
            path: path.into(),
            reason: reason.into()
        }
    }
}
