//! # Value-preserving resampling
//!
//! Resizing used by the rescale transform. Values are interpolated in their own units, the
//! output range is never renormalised, which matters for disparity maps.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use ndarray::{Array, ArrayD, IxDyn};

use crate::error::*;

// -----------------------------------------------------------------------------------------------
// TRAITS
// -----------------------------------------------------------------------------------------------

/// Resizes the two leading axes of an array, leaving any trailing (channel) axes alone.
pub trait Resample: Send + Sync {
    fn resize(&self, array: &ArrayD<f64>, new_h: usize, new_w: usize) -> Result<ArrayD<f64>>;
}

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Bilinear interpolation with pixel-centre alignment and clamped edges.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bilinear;

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl Resample for Bilinear {
    fn resize(&self, array: &ArrayD<f64>, new_h: usize, new_w: usize) -> Result<ArrayD<f64>> {
        let shape = array.shape();
        if shape.len() < 2 || shape[0] == 0 || shape[1] == 0 || new_h == 0 || new_w == 0 {
            return Err(Error::Shape(format!(
                "cannot resize array of shape {:?} to {}x{}",
                shape, new_h, new_w
            )));
        }

        let (h, w) = (shape[0], shape[1]);
        let channels: usize = shape[2..].iter().product();
        let src: Vec<f64> = array.iter().cloned().collect();
        let at = |y: usize, x: usize, c: usize| src[(y * w + x) * channels + c];

        let rows = axis_weights(h, new_h);
        let cols = axis_weights(w, new_w);

        let mut out = Vec::with_capacity(new_h * new_w * channels);
        for &(y0, y1, fy) in &rows {
            for &(x0, x1, fx) in &cols {
                for c in 0..channels {
                    let top = at(y0, x0, c) * (1.0 - fx) + at(y0, x1, c) * fx;
                    let bottom = at(y1, x0, c) * (1.0 - fx) + at(y1, x1, c) * fx;
                    out.push(top * (1.0 - fy) + bottom * fy);
                }
            }
        }

        let mut out_shape = shape.to_vec();
        out_shape[0] = new_h;
        out_shape[1] = new_w;

        Array::from_shape_vec(IxDyn(&out_shape), out).map_err(|e| Error::Shape(e.to_string()))
    }
}

/// For each output index, the two neighbouring source indices and the weight of the second.
fn axis_weights(len_in: usize, len_out: usize) -> Vec<(usize, usize, f64)> {
    let ratio = len_in as f64 / len_out as f64;
    let last = (len_in - 1) as f64;

    (0..len_out)
        .map(|i| {
            let pos = ((i as f64 + 0.5) * ratio - 0.5).max(0.0).min(last);
            let i0 = pos.floor() as usize;
            let i1 = (i0 + 1).min(len_in - 1);
            (i0, i1, pos - i0 as f64)
        })
        .collect()
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
