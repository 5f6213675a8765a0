use image::imageops::FilterType;
use log::debug;
use ndarray::{s, Array2};

use super::filters::{box_filter, luma_plane, resize};
use super::stats::median_f32;
use super::types::DctHash;
use crate::error::Result;
use crate::types::PixelBuffer;

/// Side of the resized image and of the DCT basis
pub const DCT_SIZE: usize = 32;
/// Side of the low-frequency block kept for the hash
const HASH_BLOCK: usize = 8;
/// Box filter applied before resizing
const MEAN_FILTER: usize = 7;

/// `N x N` DCT-II basis: row 0 is `1/sqrt(N)`, row `y > 0` is
/// `sqrt(2/N) * cos(pi / 2N * y * (2x + 1))`.
pub fn dct_matrix(n: usize) -> Array2<f32> {
    let dc = 1.0 / (n as f32).sqrt();
    let ac = (2.0 / n as f32).sqrt();
    let step = std::f32::consts::PI / 2.0 / n as f32;

    Array2::from_shape_fn((n, n), |(y, x)| {
        if y == 0 {
            dc
        } else {
            ac * (step * y as f32 * (2 * x + 1) as f32).cos()
        }
    })
}

/// 64-bit DCT hash.
///
/// The luma plane is box filtered, resized to 32x32 and transformed with
/// `C * I * C^T`. The 8x8 block of coefficients starting at (1, 1) skips the
/// DC row and column; each of those 64 coefficients above their median sets
/// a bit, first coefficient in bit 0. A zero-sized image hashes to 0.
pub fn dct_hash(img: &PixelBuffer, debug: bool) -> Result<DctHash> {
    if img.is_empty() {
        debug!("Zero-sized image, returning zero DCT hash");
        return Ok(DctHash(0));
    }

    let filtered = box_filter(&luma_plane(img)?, MEAN_FILTER)?;
    let small = resize(&filtered, DCT_SIZE as u32, DCT_SIZE as u32, FilterType::Nearest)?;

    let c = dct_matrix(DCT_SIZE);
    let freq = c.dot(&small).dot(&c.t());

    let block: Vec<f32> = freq
        .slice(s![1..=HASH_BLOCK, 1..=HASH_BLOCK])
        .iter()
        .copied()
        .collect();
    let median = median_f32(&block);

    let hash = block
        .iter()
        .enumerate()
        .filter(|(_, &v)| v > median)
        .fold(0u64, |acc, (i, _)| acc | (1u64 << i));

    if debug {
        debug!("DCT block median {}, hash {:016x}", median, hash);
    }

    Ok(DctHash(hash))
}
