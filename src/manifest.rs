//! # Sample manifests
//!
//! A manifest is a text file listing one sample per line as three whitespace separated paths,
//! relative to a dataset root:
//!
//! ```text
//! <left image> <right image> <disparity pfm>
//! ```
//!
//! Lines are kept verbatim. A line is only split, and so only validated, when its record is
//! requested.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::*;
use crate::sample::SampleNames;

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

/// Path reported in errors for manifests built from memory.
const MEMORY_PATH: &str = "<memory>";

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    path: PathBuf,
    lines: Vec<String>
}

/// The three paths of one manifest line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    pub left: &'a str,
    pub right: &'a str,
    pub disp: &'a str
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl Manifest {
    /// Read every line of the manifest at `path`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            lines: text.lines().map(String::from).collect()
        })
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>
    {
        Self {
            path: PathBuf::from(MEMORY_PATH),
            lines: lines.into_iter().map(Into::into).collect()
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Split line `index` into its record. Fields beyond the third are ignored.
    pub fn record(&self, index: usize) -> Result<Record<'_>> {
        let line = self.lines.get(index).ok_or(Error::Index {
            index,
            len: self.lines.len()
        })?;

        let mut fields = line.split_whitespace();
        match (fields.next(), fields.next(), fields.next()) {
            (Some(left), Some(right), Some(disp)) => Ok(Record { left, right, disp }),
            _ => Err(Error::format(&self.path, format!(
                "line {} needs three paths, found {:?}",
                index + 1, line
            )))
        }
    }
}

impl<'a> From<Record<'a>> for SampleNames {
    fn from(record: Record<'a>) -> Self {
        SampleNames {
            left: record.left.to_string(),
            right: record.right.to_string(),
            disp: record.disp.to_string()
        }
    }
}
