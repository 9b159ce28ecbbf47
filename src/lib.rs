//! # Stereo Disparity Data
//!
//! This crate provides the data side of stereo disparity networks: a PFM codec for
//! ground-truth disparity, the augmentation pipeline applied to stereo samples, and a
//! manifest-driven dataset feeding them to a batching loader.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

mod array;
mod error;
mod raster;
mod resample;
mod sample;
pub mod augment;
pub mod config;
pub mod dataset;
pub mod manifest;
pub mod pfm;
pub mod predict;
pub mod transform;

// -----------------------------------------------------------------------------------------------
// EXPORTS
// -----------------------------------------------------------------------------------------------

pub use crate::array::{DType, DynArray};
pub use crate::error::{Error, Result};
pub use crate::raster::read_image;
pub use crate::resample::{Bilinear, Resample};
pub use crate::sample::{Layout, Sample, SampleNames};

pub mod prelude {
    pub use crate::augment::{OutputSize, RandomCrop, RandomRescale, RescalePolicy};
    pub use crate::dataset::{Dataset, DispDataset};
    pub use crate::pfm::{load_pfm, save_pfm, ByteOrder, PfmImage};
    pub use crate::transform::{Compose, ToTensor, Transform};
    pub use crate::{DynArray, Error, Layout, Sample};
}
