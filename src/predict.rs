//! # Prediction output
//!
//! Writes disparity maps predicted by the network back to disk as PFM, named after the left
//! image they were computed from.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::fs;
use std::path::{Path, PathBuf};

use ndarray::{s, Array, ArrayBase, ArrayView2, Data, Dimension};
use tracing::debug;

use crate::array::DynArray;
use crate::augment::DISPARITY_SCALE;
use crate::error::*;
use crate::pfm::{save_pfm, ByteOrder};

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Saves predicted disparity maps into a result directory.
#[derive(Debug, Clone)]
pub struct DisparityWriter {
    result_dir: PathBuf,
    byte_order: ByteOrder
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl DisparityWriter {
    /// Create a writer, creating `result_dir` if it does not exist yet. Files are written in
    /// the host byte order unless overridden with [`DisparityWriter::with_byte_order`].
    pub fn new<P: Into<PathBuf>>(result_dir: P) -> Result<Self> {
        let result_dir = result_dir.into();
        fs::create_dir_all(&result_dir)?;

        Ok(Self {
            result_dir,
            byte_order: ByteOrder::native()
        })
    }

    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    pub fn result_dir(&self) -> &Path {
        &self.result_dir
    }

    /// Flatten a manifest-relative image path into a single file name with a new extension.
    ///
    /// `"TEST/A/0000/left/0006.png"` becomes `"TEST_A_0000_left_0006.pfm"` for `"pfm"`.
    pub fn output_name(image_path: &str, extension: &str) -> String {
        let mut components: Vec<&str> = image_path
            .split('/')
            .filter(|c| !c.is_empty() && *c != ".")
            .collect();

        // Only the file name carries an extension, dots in directories are kept
        if let Some(last) = components.last_mut() {
            let name: &str = *last;
            if let Some(stem) = Path::new(name).file_stem().and_then(|s| s.to_str()) {
                *last = stem;
            }
        }

        format!("{}.{}", components.join("_"), extension)
    }

    /// Write a top-down `H x W` disparity map predicted for `image_path`, returning the path
    /// written to.
    pub fn write_pfm(&self, image_path: &str, disparity: ArrayView2<f32>) -> Result<PathBuf> {
        let path = self.result_dir.join(Self::output_name(image_path, "pfm"));

        // PFM rows run bottom-up
        let rows = disparity.slice(s![..;-1, ..]).to_owned();
        save_pfm(&path, &DynArray::from(rows), 1.0, self.byte_order)?;

        debug!(path = %path.display(), "Wrote predicted disparity");
        Ok(path)
    }
}

/// Convert a disparity from network units back to pixels.
pub fn restore_disparity_scale<S, D>(disparity: &ArrayBase<S, D>) -> Array<f32, D>
where
    S: Data<Elem = f32>,
    D: Dimension
{
    disparity.mapv(|d| (f64::from(d) * DISPARITY_SCALE) as f32)
}
