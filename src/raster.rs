//! # Raster image input

use std::path::Path;

use image::ImageError;
use ndarray::Array3;

use crate::error::*;

/// Read any image format supported by `image` as an 8-bit RGB array shaped `H x W x 3`.
///
/// Greyscale and alpha images are converted to RGB. I/O failures surface as [`Error::Io`].
pub fn read_image<P: AsRef<Path>>(path: P) -> Result<Array3<u8>> {
    let img = image::open(path)
        .map_err(|e| match e {
            ImageError::IoError(e) => Error::Io(e),
            other => Error::Image(other)
        })?
        .to_rgb8();

    let (width, height) = img.dimensions();

    Array3::from_shape_vec((height as usize, width as usize, 3), img.into_raw())
        .map_err(|e| Error::Shape(e.to_string()))
}
