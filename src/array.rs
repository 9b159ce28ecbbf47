//! # Dynamically typed arrays
//!
//! Samples change element type as they move through the pipeline (8-bit pixels become
//! normalised floats), so their arrays are held in a small tagged union over `ndarray`
//! arrays of the element types we actually meet.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::fmt;

use ndarray::{Array, ArrayD, Axis, Dimension, IxDyn, Slice};

// -----------------------------------------------------------------------------------------------
// MACROS
// -----------------------------------------------------------------------------------------------

/// Apply an element-type-agnostic transformation to every variant, keeping the variant.
macro_rules! each_variant {
    ($value:expr, $arr:ident => $body:expr) => {
        match $value {
            DynArray::U8($arr) => DynArray::U8($body),
            DynArray::U16($arr) => DynArray::U16($body),
            DynArray::F32($arr) => DynArray::F32($body),
            DynArray::F64($arr) => DynArray::F64($body)
        }
    };
}

/// Evaluate an expression on whichever variant is held.
macro_rules! with_variant {
    ($value:expr, $arr:ident => $body:expr) => {
        match $value {
            DynArray::U8($arr) => $body,
            DynArray::U16($arr) => $body,
            DynArray::F32($arr) => $body,
            DynArray::F64($arr) => $body
        }
    };
}

// -----------------------------------------------------------------------------------------------
// ENUMERATIONS
// -----------------------------------------------------------------------------------------------

/// Element type of a [`DynArray`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    U8,
    U16,
    F32,
    F64
}

/// An n-dimensional array with a runtime element type.
#[derive(Debug, Clone, PartialEq)]
pub enum DynArray {
    U8(ArrayD<u8>),
    U16(ArrayD<u16>),
    F32(ArrayD<f32>),
    F64(ArrayD<f64>)
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::U8 => "uint8",
            DType::U16 => "uint16",
            DType::F32 => "float32",
            DType::F64 => "float64"
        };
        f.write_str(name)
    }
}

impl DynArray {
    pub fn dtype(&self) -> DType {
        match self {
            DynArray::U8(_) => DType::U8,
            DynArray::U16(_) => DType::U16,
            DynArray::F32(_) => DType::F32,
            DynArray::F64(_) => DType::F64
        }
    }

    pub fn shape(&self) -> &[usize] {
        with_variant!(self, a => a.shape())
    }

    pub fn ndim(&self) -> usize {
        with_variant!(self, a => a.ndim())
    }

    /// Borrow the array if it already holds `f32` elements.
    pub fn as_f32(&self) -> Option<&ArrayD<f32>> {
        match self {
            DynArray::F32(a) => Some(a),
            _ => None
        }
    }

    /// Widen every element to `f64`.
    pub fn to_f64(&self) -> ArrayD<f64> {
        match self {
            DynArray::U8(a) => a.mapv(f64::from),
            DynArray::U16(a) => a.mapv(f64::from),
            DynArray::F32(a) => a.mapv(f64::from),
            DynArray::F64(a) => a.clone()
        }
    }

    /// Convert into an `f32` array, consuming `self`. No copy if already `f32`.
    pub fn into_f32(self) -> ArrayD<f32> {
        match self {
            DynArray::U8(a) => a.mapv(f32::from),
            DynArray::U16(a) => a.mapv(f32::from),
            DynArray::F32(a) => a,
            DynArray::F64(a) => a.mapv(|v| v as f32)
        }
    }

    /// Restrict two axes to the windows `start.0..start.0 + len.0` and
    /// `start.1..start.1 + len.1`. The caller guarantees the windows are in bounds.
    pub(crate) fn crop(
        self,
        axes: (usize, usize),
        start: (usize, usize),
        len: (usize, usize)
    ) -> Self {
        each_variant!(self, a => {
            let mut a = a;
            a.slice_axis_inplace(Axis(axes.0), Slice::from(start.0..start.0 + len.0));
            a.slice_axis_inplace(Axis(axes.1), Slice::from(start.1..start.1 + len.1));
            a
        })
    }

    /// Reverse the order of elements along `axis`.
    pub(crate) fn flip(self, axis: usize) -> Self {
        each_variant!(self, a => {
            let mut a = a;
            a.slice_axis_inplace(Axis(axis), Slice::new(0, None, -1));
            a
        })
    }

    pub(crate) fn permuted(self, axes: &[usize]) -> Self {
        each_variant!(self, a => a.permuted_axes(IxDyn(axes)))
    }

    pub(crate) fn insert_axis(self, axis: usize) -> Self {
        each_variant!(self, a => a.insert_axis(Axis(axis)))
    }
}

macro_rules! impl_from_array {
    ($($elem:ty => $variant:ident),*) => {
        $(
            impl<D: Dimension> From<Array<$elem, D>> for DynArray {
                fn from(a: Array<$elem, D>) -> Self {
                    DynArray::$variant(a.into_dyn())
                }
            }
        )*
    };
}

impl_from_array!(u8 => U8, u16 => U16, f32 => F32, f64 => F64);
