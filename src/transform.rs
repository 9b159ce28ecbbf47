//! # Sample transforms
//!
//! Transforms map a [`Sample`] to a new [`Sample`]. They hold only immutable configuration;
//! any randomness comes from the random source handed to [`Transform::apply`], so a pipeline
//! can be replayed exactly from a seeded generator.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use rand::RngCore;

use crate::error::*;
use crate::sample::{Layout, Sample};

// -----------------------------------------------------------------------------------------------
// TRAITS
// -----------------------------------------------------------------------------------------------

/// A transform applied to each sample before batching.
pub trait Transform: Send + Sync {
    /// Apply the transform to a sample, returning the transformed sample.
    fn apply(&self, sample: Sample, rng: &mut dyn RngCore) -> Result<Sample>;
}

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Chain of transforms applied in insertion order.
#[derive(Default)]
pub struct Compose {
    transforms: Vec<Box<dyn Transform>>
}

/// Converts an interleaved sample to the planar layout expected by the network.
///
/// Images go from `H x W x C` to `C x H x W` and the disparity gains a leading unit axis.
/// Only strides change, element values are untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToTensor;

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl Compose {
    /// Append a transform to the end of the chain.
    pub fn then<T: Transform + 'static>(mut self, transform: T) -> Self {
        self.transforms.push(Box::new(transform));
        self
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

impl Transform for Compose {
    fn apply(&self, mut sample: Sample, rng: &mut dyn RngCore) -> Result<Sample> {
        for t in &self.transforms {
            sample = t.apply(sample, rng)?;
        }
        Ok(sample)
    }
}

impl Transform for ToTensor {
    fn apply(&self, sample: Sample, _rng: &mut dyn RngCore) -> Result<Sample> {
        if sample.layout != Layout::Interleaved {
            return Err(Error::Shape("sample is already in planar layout".into()));
        }
        sample.spatial_extent()?;

        Ok(Sample {
            img_left: sample.img_left.permuted(&[2, 0, 1]),
            img_right: sample.img_right.permuted(&[2, 0, 1]),
            gt_disp: sample.gt_disp.insert_axis(0),
            layout: Layout::Planar,
            names: sample.names
        })
    }
}
