//! # Portable Float Map codec
//!
//! Reads and writes PFM images, the format used for ground-truth disparity in the
//! SceneFlow family of stereo datasets.
//!
//! A PFM file is three ASCII header lines followed by raw 32-bit floats:
//!
//! ```text
//! PF | Pf             colour (3 channels) | greyscale (1 channel)
//! <width> <height>
//! <scale>             negative => little-endian payload
//! <payload>           width * height * channels floats, row-major
//! ```
//!
//! Rows are stored bottom-up. This codec never flips rows, callers wanting raster order must
//! reverse them.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use ndarray::{Array, ArrayD, IxDyn};
use tracing::debug;

use crate::array::{DType, DynArray};
use crate::error::*;

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

/// Path reported in errors raised while decoding an anonymous stream.
const STREAM_PATH: &str = "<stream>";

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// A decoded PFM image.
#[derive(Debug, Clone, PartialEq)]
pub struct PfmImage {
    /// Pixels, shaped `(height, width)` or `(height, width, 3)`, in file row order.
    pub data: ArrayD<f32>,

    /// Magnitude of the header scale. Its sign on disk only encodes the byte order.
    pub scale: f64
}

// -----------------------------------------------------------------------------------------------
// ENUMERATIONS
// -----------------------------------------------------------------------------------------------

/// Byte order of a PFM payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl ByteOrder {
    /// Byte order of the host platform.
    pub fn native() -> Self {
        if cfg!(target_endian = "little") {
            ByteOrder::Little
        }
        else {
            ByteOrder::Big
        }
    }
}

impl PfmImage {
    pub fn height(&self) -> usize {
        self.data.shape()[0]
    }

    pub fn width(&self) -> usize {
        self.data.shape()[1]
    }

    pub fn is_color(&self) -> bool {
        self.data.ndim() == 3
    }
}

// -----------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Load a PFM file from disk.
pub fn load_pfm<P: AsRef<Path>>(path: P) -> Result<PfmImage> {
    let path = path.as_ref();
    let file = File::open(path)?;
    decode(BufReader::new(file), path)
}

/// Decode a PFM image from an arbitrary buffered reader.
pub fn read_pfm<R: BufRead>(reader: R) -> Result<PfmImage> {
    decode(reader, Path::new(STREAM_PATH))
}

/// Save an `f32` image to disk as PFM.
///
/// `image` must be shaped `H x W`, `H x W x 1` or `H x W x 3`. The payload is written in
/// `order`, which is also encoded in the sign of the written scale, so `scale` must be
/// non-zero.
pub fn save_pfm<P: AsRef<Path>>(
    path: P,
    image: &DynArray,
    scale: f64,
    order: ByteOrder
) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_pfm(&mut writer, image, scale, order)?;
    writer.flush()?;
    Ok(())
}

/// Encode an `f32` image as PFM into any writer. See [`save_pfm`].
pub fn write_pfm<W: Write>(
    mut writer: W,
    image: &DynArray,
    scale: f64,
    order: ByteOrder
) -> Result<()> {
    let data = image.as_f32().ok_or(Error::Type {
        expected: DType::F32,
        found: image.dtype()
    })?;

    let color = match data.shape() {
        [_, _, 3] => true,
        [_, _] | [_, _, 1] => false,
        other => return Err(Error::Shape(format!(
            "image must have H x W x 3, H x W x 1 or H x W dimensions, got {:?}",
            other
        )))
    };
    let (height, width) = (data.shape()[0], data.shape()[1]);

    // A zero scale has no sign to carry the byte order
    if scale == 0.0 || scale.is_nan() {
        return Err(Error::Range(format!("PFM scale must be non-zero, got {}", scale)));
    }

    writer.write_all(if color { b"PF\n" } else { b"Pf\n" })?;
    writeln!(writer, "{} {}", width, height)?;

    // The magnitude is user data, the sign is ours
    let scale = match order {
        ByteOrder::Little => -scale.abs(),
        ByteOrder::Big => scale.abs()
    };
    writeln!(writer, "{}", scale)?;

    let mut payload = Vec::with_capacity(data.len() * 4);
    for &v in data.iter() {
        match order {
            ByteOrder::Little => payload.extend_from_slice(&v.to_le_bytes()),
            ByteOrder::Big => payload.extend_from_slice(&v.to_be_bytes())
        }
    }
    writer.write_all(&payload)?;

    Ok(())
}

// -----------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// -----------------------------------------------------------------------------------------------

fn decode<R: BufRead>(mut reader: R, path: &Path) -> Result<PfmImage> {
    let channels = match read_line(&mut reader)?.trim_end() {
        "PF" => 3,
        "Pf" => 1,
        _ => return Err(Error::format(path, "not a PFM file"))
    };

    let (width, height) = parse_dimensions(&read_line(&mut reader)?)
        .ok_or_else(|| Error::format(path, "malformed PFM header"))?;

    let scale_line = read_line(&mut reader)?;
    let raw_scale: f64 = scale_line.trim().parse()
        .map_err(|_| Error::format(path, format!("malformed PFM scale {:?}", scale_line.trim())))?;

    let (order, scale) = if raw_scale < 0.0 {
        (ByteOrder::Little, -raw_scale)
    }
    else {
        (ByteOrder::Big, raw_scale)
    };

    debug!(
        path = %path.display(), width, height, channels, scale, ?order,
        "Decoding PFM payload"
    );

    let count = width.checked_mul(height)
        .and_then(|n| n.checked_mul(channels))
        .filter(|n| n.checked_mul(4).is_some())
        .ok_or_else(|| Error::format(path, "PFM dimensions overflow"))?;

    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    if bytes.len() != count * 4 {
        return Err(Error::format(path, format!(
            "PFM payload holds {} bytes, expected {} ({} floats)",
            bytes.len(), count * 4, count
        )));
    }

    let values: Vec<f32> = bytes
        .chunks_exact(4)
        .map(|c| {
            let b = [c[0], c[1], c[2], c[3]];
            match order {
                ByteOrder::Little => f32::from_le_bytes(b),
                ByteOrder::Big => f32::from_be_bytes(b)
            }
        })
        .collect();

    let shape = if channels == 3 {
        vec![height, width, 3]
    }
    else {
        vec![height, width]
    };

    let data = Array::from_shape_vec(IxDyn(&shape), values)
        .map_err(|e| Error::Shape(e.to_string()))?;

    Ok(PfmImage { data, scale })
}

/// Read one header line including its terminator. Header bytes need not be UTF-8.
fn read_line<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut buf = Vec::new();
    reader.read_until(b'\n', &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Parse `<width><ws><height><ws>`, where each `<ws>` is a single whitespace character and
/// the line terminator may follow the last one.
fn parse_dimensions(line: &str) -> Option<(usize, usize)> {
    let (width, rest) = split_number(line)?;
    let rest = strip_one_whitespace(rest)?;
    let (height, rest) = split_number(rest)?;
    let rest = strip_one_whitespace(rest)?;

    match rest {
        "" | "\n" => Some((width, height)),
        _ => None
    }
}

fn split_number(s: &str) -> Option<(usize, &str)> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or_else(|| s.len());
    if end == 0 {
        return None;
    }
    let value = s[..end].parse().ok()?;
    Some((value, &s[end..]))
}

fn strip_one_whitespace(s: &str) -> Option<&str> {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_whitespace() => Some(chars.as_str()),
        _ => None
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
