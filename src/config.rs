//! # Dataset configuration
//!
//! Deserialisable parameters for the dataset and its transform pipeline, usually read from a
//! TOML file such as:
//!
//! ```toml
//! manifest = "lists/FlyingThings3D_release_TRAIN.list"
//! root_dir = "data"
//!
//! [pipeline]
//! to_tensor = true
//!
//! [pipeline.rescale]
//! output_size = [540, 960]
//! policy = "normalize_only"
//!
//! [pipeline.crop]
//! output_size = [384, 768]
//! ```

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::augment::{OutputSize, RandomCrop, RandomRescale, RescalePolicy};
use crate::error::*;
use crate::transform::{Compose, ToTensor};

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct DatasetConfig {
    pub manifest: PathBuf,
    pub root_dir: PathBuf,

    #[serde(default)]
    pub pipeline: PipelineConfig
}

/// Transforms to apply, always in the order rescale, crop, tensor conversion.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PipelineConfig {
    pub rescale: Option<RescaleParams>,
    pub crop: Option<CropParams>,

    #[serde(default)]
    pub to_tensor: bool
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct RescaleParams {
    pub output_size: OutputSize,

    #[serde(default)]
    pub policy: RescalePolicy
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct CropParams {
    pub output_size: OutputSize
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl DatasetConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }
}

impl PipelineConfig {
    pub fn build(&self) -> Compose {
        let mut pipeline = Compose::default();

        if let Some(rescale) = self.rescale {
            pipeline = pipeline.then(
                RandomRescale::new(rescale.output_size).with_policy(rescale.policy)
            );
        }
        if let Some(crop) = self.crop {
            pipeline = pipeline.then(RandomCrop::from(crop.output_size));
        }
        if self.to_tensor {
            pipeline = pipeline.then(ToTensor);
        }

        pipeline
    }
}
