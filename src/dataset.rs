//! # Disparity datasets
//!
//! This module provides the dataset capability consumed by batching loaders, and the
//! manifest-driven stereo dataset implementing it.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::path::{Path, PathBuf};

use rand::RngCore;
use tracing::{debug, info};

use crate::array::DynArray;
use crate::config::DatasetConfig;
use crate::error::*;
use crate::manifest::Manifest;
use crate::pfm::load_pfm;
use crate::raster::read_image;
use crate::sample::{Sample, SampleNames};
use crate::transform::Transform;

// -----------------------------------------------------------------------------------------------
// TRAITS
// -----------------------------------------------------------------------------------------------

/// An indexed, finite collection of samples.
///
/// Implementations must be `Send + Sync` so a loader can fetch samples from several worker
/// threads at once.
pub trait Dataset: Send + Sync {
    /// Total number of samples in the dataset.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch sample `index`, drawing any randomness from `rng`.
    fn get_with_rng(&self, index: usize, rng: &mut dyn RngCore) -> Result<Sample>;

    /// Fetch sample `index` using the thread-local random source.
    fn get(&self, index: usize) -> Result<Sample> {
        let mut rng = rand::thread_rng();
        self.get_with_rng(index, &mut rng)
    }
}

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Stereo samples listed in a manifest, with PFM ground truth.
pub struct DispDataset {
    manifest: Manifest,
    root_dir: PathBuf,
    transform: Option<Box<dyn Transform>>
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl DispDataset {
    /// Read the manifest at `manifest_path`. Paths in it are resolved against `root_dir`.
    pub fn new<P, Q>(manifest_path: P, root_dir: Q) -> Result<Self>
    where
        P: AsRef<Path>,
        Q: Into<PathBuf>
    {
        let manifest = Manifest::from_file(manifest_path)?;
        Ok(Self::from_manifest(manifest, root_dir))
    }

    pub fn from_manifest<Q: Into<PathBuf>>(manifest: Manifest, root_dir: Q) -> Self {
        let root_dir = root_dir.into();

        info!(
            manifest = %manifest.path().display(),
            root_dir = %root_dir.display(),
            samples = manifest.len(),
            "Loaded disparity manifest"
        );

        Self {
            manifest,
            root_dir,
            transform: None
        }
    }

    /// Build a dataset and its transform pipeline from configuration.
    pub fn from_config(config: &DatasetConfig) -> Result<Self> {
        let dataset = Self::new(&config.manifest, config.root_dir.clone())?;
        let pipeline = config.pipeline.build();

        Ok(if pipeline.is_empty() {
            dataset
        }
        else {
            dataset.with_transform(pipeline)
        })
    }

    /// Apply `transform` to every sample returned by [`Dataset::get`].
    pub fn with_transform<T: Transform + 'static>(mut self, transform: T) -> Self {
        self.transform = Some(Box::new(transform));
        self
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Resolved left, right and disparity paths of sample `index`.
    pub fn paths(&self, index: usize) -> Result<[PathBuf; 3]> {
        let record = self.manifest.record(index)?;

        Ok([
            self.root_dir.join(record.left),
            self.root_dir.join(record.right),
            self.root_dir.join(record.disp)
        ])
    }

    /// Load sample `index` without applying the transform.
    ///
    /// The disparity rows are reversed from PFM bottom-up order into the raster order of the
    /// images.
    pub fn load_raw(&self, index: usize) -> Result<Sample> {
        let names = SampleNames::from(self.manifest.record(index)?);
        let [left_path, right_path, disp_path] = self.paths(index)?;

        debug!(index, left = %left_path.display(), disp = %disp_path.display(), "Loading sample");

        let img_left = read_image(&left_path)?;
        let img_right = read_image(&right_path)?;
        let gt_disp = DynArray::F32(load_pfm(&disp_path)?.data).flip(0);

        Ok(Sample::new(img_left, img_right, gt_disp).with_names(names))
    }
}

impl Dataset for DispDataset {
    fn len(&self) -> usize {
        self.manifest.len()
    }

    fn get_with_rng(&self, index: usize, rng: &mut dyn RngCore) -> Result<Sample> {
        let sample = self.load_raw(index)?;

        match &self.transform {
            Some(t) => t.apply(sample, rng),
            None => Ok(sample)
        }
    }
}
