//! Marr-Hildreth (Mexican hat) wavelet hash.
//!
//! The equalized 512x512 luma plane is correlated with a Marr wavelet,
//! pooled into a 31x31 grid of 16x16 block sums, and scanned with 64
//! overlapping 3x3 windows. Each window contributes 9 bits (cell above the
//! window mean), giving a fixed 576-bit hash.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use image::imageops::FilterType;
use log::debug;
use ndarray::{s, Array2};

use super::filters::{correlate, equalize, gaussian_blur, luma_plane, normalize_unit, resize};
use super::types::{BitVector, MhHash, MH_HASH_LEN};
use crate::error::{Error, Result};
use crate::types::PixelBuffer;

/// Side of the working image
const WORK_SIZE: usize = 512;
/// Side of a pooled block
const BLOCK: usize = 16;
/// Pooled grid side
const GRID: usize = 31;
/// Window side and stride over the pooled grid
const WINDOW: usize = 3;
const STRIDE: usize = 4;
const EQUALIZE_LEVELS: usize = 256;
const PRE_BLUR_SIGMA: f32 = 1.0;

/// Marr wavelet kernel for one `(alpha, level)` pair
#[derive(Debug, Clone)]
pub struct MhKernel {
    alpha: f32,
    level: f32,
    radius: usize,
    values: Array2<f32>,
}

impl MhKernel {
    /// Radius `floor(4 * alpha^level)`, size `2 * radius + 1`. The value at
    /// offset `(X, Y)` is `(2 - A) * exp(-A / 2)` with
    /// `A = xpos^2 + ypos^2` and `pos = alpha^-level * (offset - radius)`.
    pub fn new(alpha: f32, level: f32) -> Result<Self> {
        if !(alpha > 0.0) || !level.is_finite() {
            return Err(Error::InvalidInput(format!(
                "invalid wavelet parameters alpha={} level={}",
                alpha, level
            )));
        }

        let radius = (4.0 * alpha.powf(level)).floor();
        if !(radius >= 0.0) || radius > WORK_SIZE as f32 {
            return Err(Error::InvalidInput(format!(
                "wavelet radius {} out of range for alpha={} level={}",
                radius, alpha, level
            )));
        }
        let radius = radius as usize;
        let scale = alpha.powf(-level);
        let size = 2 * radius + 1;

        let values = Array2::from_shape_fn((size, size), |(y, x)| {
            let xpos = scale * (x as f32 - radius as f32);
            let ypos = scale * (y as f32 - radius as f32);
            let a = xpos * xpos + ypos * ypos;
            (2.0 - a) * (-a / 2.0).exp()
        });

        Ok(Self {
            alpha,
            level,
            radius,
            values,
        })
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    pub fn size(&self) -> usize {
        self.values.nrows()
    }

    pub fn values(&self) -> &Array2<f32> {
        &self.values
    }
}

/// Kernels memoized by their exact `(alpha, level)` bit patterns.
///
/// Safe to share between threads; a lookup for new parameters builds and
/// stores a new kernel instead of reusing an old one.
#[derive(Debug, Default)]
pub struct KernelCache {
    kernels: RwLock<HashMap<(u32, u32), Arc<MhKernel>>>,
}

impl KernelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached kernel for `(alpha, level)`, built on first use
    pub fn get(&self, alpha: f32, level: f32) -> Result<Arc<MhKernel>> {
        let key = (alpha.to_bits(), level.to_bits());

        if let Some(kernel) = self
            .kernels
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
        {
            return Ok(Arc::clone(kernel));
        }

        let kernel = Arc::new(MhKernel::new(alpha, level)?);
        debug!(
            "Built MH kernel alpha={} level={} size={}",
            alpha,
            level,
            kernel.size()
        );

        let mut kernels = self.kernels.write().unwrap_or_else(|e| e.into_inner());
        Ok(Arc::clone(kernels.entry(key).or_insert(kernel)))
    }

    pub fn len(&self) -> usize {
        self.kernels.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Sums of `BLOCK x BLOCK` pixel blocks, `GRID x GRID` cells.
fn pool_blocks(response: &Array2<f32>) -> Array2<f32> {
    Array2::from_shape_fn((GRID, GRID), |(r, c)| {
        response
            .slice(s![r * BLOCK..(r + 1) * BLOCK, c * BLOCK..(c + 1) * BLOCK])
            .sum()
    })
}

/// One bit per cell of each 3x3 window, row-major within the window,
/// windows visited row-major with stride 4.
fn window_bits(blocks: &Array2<f32>) -> BitVector {
    let mut bits = Vec::with_capacity(MH_HASH_LEN * 8);
    for r in (0..GRID - 2).step_by(STRIDE) {
        for c in (0..GRID - 2).step_by(STRIDE) {
            let window = blocks.slice(s![r..r + WINDOW, c..c + WINDOW]);
            let mean = window.sum() / (WINDOW * WINDOW) as f32;
            bits.extend(window.iter().map(|&v| v > mean));
        }
    }
    BitVector::new(bits)
}

/// 576-bit Marr wavelet hash. A zero-sized image hashes to all zeros.
pub fn mh_hash(img: &PixelBuffer, kernel: &MhKernel, debug: bool) -> Result<MhHash> {
    if img.is_empty() {
        debug!("Zero-sized image, returning all-zero MH hash");
        return Ok(MhHash([0; MH_HASH_LEN]));
    }

    let blurred = gaussian_blur(&luma_plane(img)?, PRE_BLUR_SIGMA)?;
    let mut plane = resize(
        &blurred,
        WORK_SIZE as u32,
        WORK_SIZE as u32,
        FilterType::CatmullRom,
    )?;
    equalize(&mut plane, EQUALIZE_LEVELS);

    let mut response = correlate(&plane, kernel.values())?;
    normalize_unit(&mut response);

    let blocks = pool_blocks(&response);
    let bits = window_bits(&blocks);
    if debug {
        debug!("MH window bits:\n{}", bits.to_grid(WINDOW * WINDOW));
    }

    let bytes = bits.to_bytes();
    let hash: [u8; MH_HASH_LEN] = bytes.as_slice().try_into().map_err(|_| {
        Error::InvalidInput(format!(
            "MH hash packed into {} bytes, expected {}",
            bytes.len(),
            MH_HASH_LEN
        ))
    })?;

    Ok(MhHash(hash))
}
