//! Grayscale plane operations used to preprocess images before hashing.
//!
//! A plane is an `ndarray::Array2<f32>` indexed `[row, column]`, i.e.
//! `[y, x]`, always in standard (row-major) layout.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma};
use ndarray::Array2;

use crate::error::{try_zeroed, Error, Result};
use crate::types::{PixelBuffer, PixelLayout};

/// Grayscale working image
pub type Plane = Array2<f32>;

fn plane_from_vec(height: usize, width: usize, data: Vec<f32>) -> Result<Plane> {
    Array2::from_shape_vec((height, width), data)
        .map_err(|e| Error::InvalidInput(format!("plane shape mismatch: {}", e)))
}

/// Luma plane of an image.
///
/// RGBA input uses the Y channel of YCbCr,
/// `Y = (66R + 129G + 25B + 128) / 256 + 16`, truncated to an integer
/// level. Alpha is ignored. Grayscale input is copied as-is.
pub fn luma_plane(img: &PixelBuffer) -> Result<Plane> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    let mut data: Vec<f32> = try_zeroed(width * height)?;

    match img.layout() {
        PixelLayout::Rgba => {
            for (dst, px) in data.iter_mut().zip(img.data().chunks_exact(4)) {
                let (r, g, b) = (px[0] as f32, px[1] as f32, px[2] as f32);
                let y = (66.0 * r + 129.0 * g + 25.0 * b + 128.0) / 256.0 + 16.0;
                *dst = y.clamp(0.0, 255.0).floor();
            }
        }
        PixelLayout::Gray => {
            for (dst, &v) in data.iter_mut().zip(img.data()) {
                *dst = v as f32;
            }
        }
    }

    plane_from_vec(height, width, data)
}

/// Smallest and largest value, `(0, 0)` for an empty plane
pub fn min_max(plane: &Plane) -> (f32, f32) {
    let mut iter = plane.iter().copied();
    let first = match iter.next() {
        Some(v) => v,
        None => return (0.0, 0.0),
    };
    iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

/// Clamp `pos + offset` into `[0, len)`
#[inline]
fn clamp_index(pos: usize, offset: isize, len: usize) -> usize {
    (pos as isize + offset).clamp(0, len as isize - 1) as usize
}

/// 2D correlation with an odd-sized kernel, replicating edge pixels.
pub fn correlate(plane: &Plane, kernel: &Plane) -> Result<Plane> {
    let (height, width) = plane.dim();
    let (kh, kw) = kernel.dim();
    let (cy, cx) = ((kh / 2) as isize, (kw / 2) as isize);

    let src: Vec<f32> = plane.iter().copied().collect();
    let k: Vec<f32> = kernel.iter().copied().collect();
    let mut out: Vec<f32> = try_zeroed(width * height)?;

    if width == 0 || height == 0 {
        return plane_from_vec(height, width, out);
    }

    // column lookup per kernel tap, reused for every row
    let col_index: Vec<Vec<usize>> = (0..width)
        .map(|x| {
            (0..kw)
                .map(|i| clamp_index(x, i as isize - cx, width))
                .collect()
        })
        .collect();

    for y in 0..height {
        let rows: Vec<usize> = (0..kh)
            .map(|j| clamp_index(y, j as isize - cy, height) * width)
            .collect();
        for x in 0..width {
            let cols = &col_index[x];
            let mut acc = 0.0f32;
            for (j, &row) in rows.iter().enumerate() {
                let krow = &k[j * kw..(j + 1) * kw];
                for (kv, &col) in krow.iter().zip(cols) {
                    acc += kv * src[row + col];
                }
            }
            out[y * width + x] = acc;
        }
    }

    plane_from_vec(height, width, out)
}

/// Sum over a `size x size` window around each pixel (all-ones kernel)
pub fn box_filter(plane: &Plane, size: usize) -> Result<Plane> {
    correlate(plane, &Array2::ones((size, size)))
}

/// Separable Gaussian blur with radius `ceil(3 sigma)`, replicating edges.
pub fn gaussian_blur(plane: &Plane, sigma: f32) -> Result<Plane> {
    if sigma <= 0.0 {
        return Ok(plane.clone());
    }

    let radius = (3.0 * sigma).ceil().max(1.0) as usize;
    let mut taps: Vec<f32> = (0..=2 * radius)
        .map(|i| {
            let d = i as f32 - radius as f32;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let total: f32 = taps.iter().sum();
    taps.iter_mut().for_each(|t| *t /= total);

    let horizontal = plane_from_vec(1, taps.len(), taps.clone())?;
    let vertical = plane_from_vec(taps.len(), 1, taps)?;
    correlate(&correlate(plane, &horizontal)?, &vertical)
}

/// Resample to `width x height` with the `image` crate's resampler.
///
/// The resampler clamps float pixels to `[0, 1]`, so the plane is mapped
/// into that range first and back afterwards.
pub fn resize(plane: &Plane, width: u32, height: u32, filter: FilterType) -> Result<Plane> {
    let (h, w) = plane.dim();
    if w == 0 || h == 0 {
        return Err(Error::InvalidInput("cannot resize an empty plane".to_string()));
    }

    let (lo, hi) = min_max(plane);
    let range = if hi > lo { hi - lo } else { 1.0 };

    let unit: Vec<f32> = plane.iter().map(|&v| (v - lo) / range).collect();
    let buf: ImageBuffer<Luma<f32>, Vec<f32>> = ImageBuffer::from_raw(w as u32, h as u32, unit)
        .ok_or_else(|| Error::InvalidInput("plane does not fit image buffer".to_string()))?;

    let resized = imageops::resize(&buf, width, height, filter);
    let data: Vec<f32> = resized
        .into_raw()
        .into_iter()
        .map(|v| v * range + lo)
        .collect();

    plane_from_vec(height as usize, width as usize, data)
}

/// Histogram equalisation to `levels` levels over the plane's own range.
pub fn equalize(plane: &mut Plane, levels: usize) {
    let (lo, hi) = min_max(plane);
    if levels == 0 || hi <= lo {
        return;
    }

    let scale = (levels - 1) as f32 / (hi - lo);
    let bin = |v: f32| (((v - lo) * scale) as usize).min(levels - 1);

    let mut cumulative = vec![0u64; levels];
    for &v in plane.iter() {
        cumulative[bin(v)] += 1;
    }
    for i in 1..levels {
        cumulative[i] += cumulative[i - 1];
    }
    let total = cumulative[levels - 1].max(1) as f32;

    plane.mapv_inplace(|v| lo + (hi - lo) * cumulative[bin(v)] as f32 / total);
}

/// Rescale to `[0, 1]`. A constant plane becomes all zeros.
pub fn normalize_unit(plane: &mut Plane) {
    let (lo, hi) = min_max(plane);
    if hi > lo {
        let range = hi - lo;
        plane.mapv_inplace(|v| (v - lo) / range);
    } else {
        plane.fill(0.0);
    }
}

/// `(v / max)^gamma`, leaving an all-zero plane untouched
pub fn gamma_correct(plane: &mut Plane, gamma: f32) {
    let (_, hi) = min_max(plane);
    if hi > 0.0 {
        plane.mapv_inplace(|v| (v / hi).max(0.0).powf(gamma));
    }
}
