//! # Stereo samples
//!
//! A sample is the unit flowing through the transform pipeline: a left/right image pair
//! plus the ground-truth disparity, all co-registered on the same pixel grid.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use crate::array::DynArray;
use crate::error::*;

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

/// Images carry a channel axis in either layout.
const IMAGE_NDIM: usize = 3;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// One stereo training/inference sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub img_left: DynArray,
    pub img_right: DynArray,
    pub gt_disp: DynArray,

    /// Memory layout of the three arrays.
    pub layout: Layout,

    /// Manifest paths the sample was loaded from, if any.
    pub names: Option<SampleNames>
}

/// Manifest-relative paths of the three files making up a sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleNames {
    pub left: String,
    pub right: String,
    pub disp: String
}

// -----------------------------------------------------------------------------------------------
// ENUMERATIONS
// -----------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Images `H x W x C`, disparity `H x W`.
    Interleaved,

    /// Images `C x H x W`, disparity `1 x H x W`.
    Planar
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl Layout {
    /// Indices of the (row, column) axes, shared by the images and the disparity map.
    pub fn spatial_axes(self) -> (usize, usize) {
        match self {
            Layout::Interleaved => (0, 1),
            Layout::Planar => (1, 2)
        }
    }

    fn disp_ndim(self) -> usize {
        match self {
            Layout::Interleaved => 2,
            Layout::Planar => 3
        }
    }
}

impl Sample {
    /// Build an interleaved sample with no names attached.
    pub fn new<L, R, D>(img_left: L, img_right: R, gt_disp: D) -> Self
    where
        L: Into<DynArray>,
        R: Into<DynArray>,
        D: Into<DynArray>
    {
        Sample {
            img_left: img_left.into(),
            img_right: img_right.into(),
            gt_disp: gt_disp.into(),
            layout: Layout::Interleaved,
            names: None
        }
    }

    /// Attach the manifest names to this sample.
    pub fn with_names(mut self, names: SampleNames) -> Self {
        self.names = Some(names);
        self
    }

    /// The shared `(height, width)` of the three arrays.
    ///
    /// Fails with a shape error if the arrays do not match the layout or are not
    /// co-registered.
    pub fn spatial_extent(&self) -> Result<(usize, usize)> {
        let axes = self.layout.spatial_axes();
        let left = extent(&self.img_left, IMAGE_NDIM, axes, "img_left")?;
        let right = extent(&self.img_right, IMAGE_NDIM, axes, "img_right")?;
        let disp = extent(&self.gt_disp, self.layout.disp_ndim(), axes, "gt_disp")?;

        if left != right || left != disp {
            return Err(Error::Shape(format!(
                "sample arrays are not co-registered: img_left {:?}, img_right {:?}, gt_disp {:?}",
                left, right, disp
            )));
        }

        Ok(left)
    }
}

fn extent(
    array: &DynArray,
    ndim: usize,
    axes: (usize, usize),
    name: &str
) -> Result<(usize, usize)> {
    if array.ndim() != ndim {
        return Err(Error::Shape(format!(
            "{} must have {} dimensions, got {:?}",
            name, ndim, array.shape()
        )));
    }

    Ok((array.shape()[axes.0], array.shape()[axes.1]))
}
