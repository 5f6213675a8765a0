//! Block mean value hash.
//!
//! Based on "Block Mean Value Based Image Perceptual Hashing" by Bian Yang,
//! Fan Gu and Xiamu Niu. The image is divided into a `bits x bits` grid,
//! each cell is summed, and each cell becomes one bit by comparing it to the
//! median of its horizontal band.
//!
//! Two accumulation paths exist and are intentionally kept separate:
//!
//! - quick: integer cell sizes (`width / bits`), integer sums, and an
//!   integer-divided half-cell threshold
//! - precise: fractional cell sizes with every pixel split across up to
//!   four cells by area, float sums, and a float half-cell threshold
//!
//! The two produce identical hashes only when the image divides evenly,
//! which is why the precise entry point delegates to the quick path then.

use log::debug;

use super::stats::{median_f32, median_u64};
use super::types::BitVector;
use crate::config::MAX_BITS;
use crate::error::{try_zeroed, Error, Result};
use crate::types::PixelBuffer;

/// Maximum contribution of one pixel (3 x 255)
const MAX_PIXEL_VALUE: u64 = 765;

/// Number of horizontal bands the cell array is split into for medians
const BANDS: usize = 4;

/// Check that `bits` is usable as a grid size
pub fn validate_bits(bits: u32) -> Result<()> {
    if bits == 0 || bits % 4 != 0 || bits > MAX_BITS {
        return Err(Error::InvalidInput(format!(
            "bits must be a positive multiple of 4 up to {}, got {}",
            MAX_BITS, bits
        )));
    }
    Ok(())
}

/// Compute a block hash of `bits * bits` bits.
///
/// `quick` forces the integer-cell path even when the image does not divide
/// evenly. A zero-sized image hashes to all zeros.
pub fn blockhash(bits: u32, img: &PixelBuffer, quick: bool, debug: bool) -> Result<BitVector> {
    validate_bits(bits)?;

    let nblocks = (bits * bits) as usize;
    if img.is_empty() {
        debug!("Zero-sized image, returning all-zero {}-bit hash", nblocks);
        return Ok(BitVector::zeros(nblocks));
    }

    let hash = if quick {
        blockhash_quick(bits, img, debug)?
    } else {
        blockhash_precise(bits, img, debug)?
    };

    if debug {
        debug!("Block hash map:\n{}", hash.to_grid(bits as usize));
    }

    Ok(hash)
}

/// Quick method: rounded-down cell sizes, remainder pixels ignored.
pub fn blockhash_quick(bits: u32, img: &PixelBuffer, debug: bool) -> Result<BitVector> {
    validate_bits(bits)?;

    let bits = bits as usize;
    let block_width = img.width() as usize / bits;
    let block_height = img.height() as usize / bits;

    let mut blocks: Vec<u64> = try_zeroed(bits * bits)?;

    for y in 0..bits {
        for x in 0..bits {
            let mut value = 0u64;
            for iy in 0..block_height {
                for ix in 0..block_width {
                    value += img.rgb_sum(x * block_width + ix, y * block_height + iy) as u64;
                }
            }
            blocks[y * bits + x] = value;
        }
    }

    // integer division, as the cell sums are integers
    let half_block_value = ((block_width * block_height) as u64 * MAX_PIXEL_VALUE / 2) as f64;
    Ok(translate_blocks_to_bits(&blocks, half_block_value, debug))
}

/// Precise method: each pixel's value is shared between the cells its area
/// overlaps, weighted by the overlap fraction.
pub fn blockhash_precise(bits: u32, img: &PixelBuffer, debug: bool) -> Result<BitVector> {
    validate_bits(bits)?;

    let width = img.width() as usize;
    let height = img.height() as usize;
    if width % bits as usize == 0 && height % bits as usize == 0 {
        return blockhash_quick(bits, img, debug);
    }

    let bits = bits as usize;
    let block_width = width as f32 / bits as f32;
    let block_height = height as f32 / bits as f32;

    let mut blocks: Vec<f32> = try_zeroed(bits * bits)?;

    for y in 0..height {
        let rows = split_weights(y, height, block_height, bits);

        for x in 0..width {
            let cols = split_weights(x, width, block_width, bits);
            let value = img.rgb_sum(x, y) as f32;

            blocks[rows.first * bits + cols.first] += value * rows.first_weight * cols.first_weight;
            blocks[rows.first * bits + cols.second] +=
                value * rows.first_weight * cols.second_weight;
            blocks[rows.second * bits + cols.first] +=
                value * rows.second_weight * cols.first_weight;
            blocks[rows.second * bits + cols.second] +=
                value * rows.second_weight * cols.second_weight;
        }
    }

    let half_block_value = (block_width * block_height * MAX_PIXEL_VALUE as f32 / 2.0) as f64;
    Ok(translate_blocks_to_bits(&blocks, half_block_value, debug))
}

/// Cells a pixel row or column contributes to, with their weights
#[derive(Debug, Clone, Copy, PartialEq)]
struct Split {
    first: usize,
    second: usize,
    first_weight: f32,
    second_weight: f32,
}

/// Split pixel `pos` (of `len`) between the cell holding its leading edge
/// and the next one. Pixels wholly inside a cell, the last pixel, and
/// pixels ending exactly on a boundary are pinned to a single cell.
fn split_weights(pos: usize, len: usize, block_size: f32, bits: usize) -> Split {
    let end_mod = (pos + 1) as f32 % block_size;
    let frac = end_mod.fract();
    let whole = end_mod.trunc();

    let first = ((pos as f32 / block_size).floor() as usize).min(bits - 1);
    let second = if whole > 0.0 || pos + 1 == len {
        first
    } else {
        ((pos as f32 / block_size).ceil() as usize).min(bits - 1)
    };

    Split {
        first,
        second,
        first_weight: 1.0 - frac,
        second_weight: frac,
    }
}

/// Accumulated cell sum: integer on the quick path, float on the precise one
trait Cell: Copy {
    fn value(self) -> f64;
    fn median(band: &[Self]) -> f64;
}

impl Cell for u64 {
    fn value(self) -> f64 {
        self as f64
    }

    fn median(band: &[Self]) -> f64 {
        median_u64(band)
    }
}

impl Cell for f32 {
    fn value(self) -> f64 {
        self as f64
    }

    fn median(band: &[Self]) -> f64 {
        median_f32(band) as f64
    }
}

/// Threshold cells against their band median.
///
/// A cell is 1 when it is above the median, or when it sits on the median
/// and the median is above `half_block_value`. The second rule keeps
/// near-uniform black or white bands from all landing on one value.
fn translate_blocks_to_bits<T: Cell>(
    blocks: &[T],
    half_block_value: f64,
    debug: bool,
) -> BitVector {
    let bandsize = (blocks.len() / BANDS).max(1);

    let mut result = Vec::with_capacity(blocks.len());
    for (i, band) in blocks.chunks(bandsize).enumerate() {
        let m = T::median(band);
        if debug {
            debug!("Band {} median {} (half block value {})", i, m, half_block_value);
        }
        result.extend(band.iter().map(|&v| {
            let v = v.value();
            v > m || ((v - m).abs() < 1.0 && m > half_block_value)
        }));
    }
    BitVector::new(result)
}
