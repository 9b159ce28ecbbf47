//! # Augmentation transforms
//!
//! Random rescaling and cropping of stereo samples. Both act identically on the two images
//! and the disparity map so the three stay co-registered.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use rand::{Rng, RngCore};
use serde::Deserialize;
use tracing::trace;

use crate::array::DynArray;
use crate::error::*;
use crate::resample::{Bilinear, Resample};
use crate::sample::{Layout, Sample};
use crate::transform::Transform;

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

/// Maximum intensity of the 8-bit source images.
pub const PIXEL_MAX: f64 = 255.0;

/// Disparities are fed to the network in units of pixels / `DISPARITY_SCALE`.
pub const DISPARITY_SCALE: f64 = 32.0;

// -----------------------------------------------------------------------------------------------
// ENUMERATIONS
// -----------------------------------------------------------------------------------------------

/// Target size of a transform, either a short-side length or an explicit `(height, width)`.
///
/// Deserialises from an integer or a two element array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OutputSize {
    Short(usize),
    Exact(usize, usize)
}

/// Which branch [`RandomRescale`] takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RescalePolicy {
    /// Only normalise intensities and disparity. This is what the published models were
    /// trained with.
    NormalizeOnly,

    /// Resize to the output size, then normalise.
    ResizeAndNormalize,

    /// Pick one of the two above with equal probability for every sample.
    Random
}

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Normalises a sample to the network's units, optionally resizing it first.
///
/// Images are divided by [`PIXEL_MAX`]. Disparity is divided by [`DISPARITY_SCALE`], and when
/// resized it is first multiplied by the horizontal resize ratio so it stays consistent with
/// the new pixel spacing. All outputs are `f32`.
pub struct RandomRescale {
    output_size: OutputSize,
    policy: RescalePolicy,
    resampler: Box<dyn Resample>
}

/// Crops a random window out of a sample.
///
/// The window must be strictly smaller than the sample in both dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomCrop {
    height: usize,
    width: usize
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl OutputSize {
    /// Resolve the output size against an input of `height x width`.
    ///
    /// A short-side size keeps the aspect ratio, truncating the long side.
    pub fn resolve(self, height: usize, width: usize) -> (usize, usize) {
        match self {
            OutputSize::Short(n) => {
                let (n, h, w) = (n as f64, height as f64, width as f64);
                if height > width {
                    ((n * h / w) as usize, n as usize)
                }
                else {
                    (n as usize, (n * w / h) as usize)
                }
            },
            OutputSize::Exact(h, w) => (h, w)
        }
    }
}

impl Default for RescalePolicy {
    fn default() -> Self {
        RescalePolicy::NormalizeOnly
    }
}

impl RandomRescale {
    /// Create a normalise-only rescale with bilinear resampling.
    pub fn new(output_size: OutputSize) -> Self {
        Self {
            output_size,
            policy: RescalePolicy::default(),
            resampler: Box::new(Bilinear)
        }
    }

    pub fn with_policy(mut self, policy: RescalePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_resampler<R: Resample + 'static>(mut self, resampler: R) -> Self {
        self.resampler = Box::new(resampler);
        self
    }

    pub fn policy(&self) -> RescalePolicy {
        self.policy
    }

    fn resize_selected(&self, rng: &mut dyn RngCore) -> bool {
        match self.policy {
            RescalePolicy::NormalizeOnly => false,
            RescalePolicy::ResizeAndNormalize => true,
            RescalePolicy::Random => {
                let decision: u32 = rng.gen_range(0..2);
                trace!(decision, "Rescale branch drawn");
                decision == 1
            }
        }
    }
}

impl Transform for RandomRescale {
    fn apply(&self, sample: Sample, rng: &mut dyn RngCore) -> Result<Sample> {
        if sample.layout != Layout::Interleaved {
            return Err(Error::Shape("rescale expects an interleaved sample".into()));
        }
        let (h, w) = sample.spatial_extent()?;

        let left = sample.img_left.to_f64().mapv(|v| v / PIXEL_MAX);
        let right = sample.img_right.to_f64().mapv(|v| v / PIXEL_MAX);
        let disp = sample.gt_disp.to_f64();

        let (left, right, disp) = if self.resize_selected(rng) {
            let (new_h, new_w) = self.output_size.resolve(h, w);
            trace!(h, w, new_h, new_w, "Resizing sample");

            let left = self.resampler.resize(&left, new_h, new_w)?;
            let right = self.resampler.resize(&right, new_h, new_w)?;

            // Disparity is truncated to whole pixels before resampling
            let disp = self.resampler.resize(&disp.mapv(f64::trunc), new_h, new_w)?;
            let ratio = new_w as f64 / w as f64;

            (left, right, disp.mapv(|d| d * ratio / DISPARITY_SCALE))
        }
        else {
            (left, right, disp.mapv(|d| d / DISPARITY_SCALE))
        };

        Ok(Sample {
            img_left: left.mapv(|v| v as f32).into(),
            img_right: right.mapv(|v| v as f32).into(),
            gt_disp: disp.mapv(|v| v as f32).into(),
            layout: sample.layout,
            names: sample.names
        })
    }
}

impl RandomCrop {
    pub fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    /// A square crop of side `size`.
    pub fn square(size: usize) -> Self {
        Self::new(size, size)
    }
}

impl From<OutputSize> for RandomCrop {
    fn from(size: OutputSize) -> Self {
        match size {
            OutputSize::Short(n) => RandomCrop::square(n),
            OutputSize::Exact(h, w) => RandomCrop::new(h, w)
        }
    }
}

impl Transform for RandomCrop {
    fn apply(&self, sample: Sample, rng: &mut dyn RngCore) -> Result<Sample> {
        let (h, w) = sample.spatial_extent()?;

        if self.height >= h || self.width >= w {
            return Err(Error::Range(format!(
                "crop {}x{} must be strictly smaller than the sample extent {}x{}",
                self.height, self.width, h, w
            )));
        }

        let top = rng.gen_range(0..h - self.height);
        let left = rng.gen_range(0..w - self.width);
        trace!(top, left, "Crop offset drawn");

        let axes = sample.layout.spatial_axes();
        let window = |a: DynArray| a.crop(axes, (top, left), (self.height, self.width));

        Ok(Sample {
            img_left: window(sample.img_left),
            img_right: window(sample.img_right),
            gt_disp: window(sample.gt_disp),
            layout: sample.layout,
            names: sample.names
        })
    }
}
