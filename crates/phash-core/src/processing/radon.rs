//! Radon projection digest.
//!
//! The luma plane is blurred and gamma corrected, projected along `N` lines
//! through the image centre, reduced to one variance statistic per angle,
//! and transformed with a type-II DCT. The first 40 coefficients, quantized
//! to bytes, form the [`Digest`]. Two digests are compared with a circular
//! cross-correlation that tolerates a rotation of the projection angles.

use std::f64::consts::PI;

use log::debug;
use ndarray::Array2;
use rustdct::{Dct2, DctPlanner};

use super::filters::{gamma_correct, gaussian_blur, luma_plane, Plane};
use super::stats::{mean, variance, variance_from_sums};
use super::types::{Digest, Similarity};
use crate::config::DIGEST_COEFFS;
use crate::error::{try_zeroed, Error, Result};
use crate::types::PixelBuffer;

/// Line intensities per angle, plus how many pixels each line covered
#[derive(Debug, Clone)]
pub struct Projections {
    /// `N x D` map, row `k` holds the samples of the line at angle `k`
    pub map: Array2<f32>,
    pub pixels_per_line: Vec<u32>,
}

impl Projections {
    pub fn angles(&self) -> usize {
        self.map.nrows()
    }
}

/// `v + 0.5` or `v - 0.5` by sign, floored
#[inline]
fn round_offset(v: f64) -> i64 {
    (v + if v >= 0.0 { 0.5 } else { -0.5 }).floor() as i64
}

/// Grayscale, blur and gamma-correct an image for projection.
pub fn preprocess(img: &PixelBuffer, sigma: f64, gamma: f64) -> Result<Plane> {
    let mut plane = gaussian_blur(&luma_plane(img)?, sigma as f32)?;
    gamma_correct(&mut plane, gamma as f32);
    Ok(plane)
}

/// Project `plane` along `angles` lines through its centre.
///
/// Only angles in `[0, N/4]` and `[3N/4, N)` evaluate a tangent; the
/// remaining rows are filled by mirroring each line across the diagonal.
pub fn radon_projections(plane: &Plane, angles: usize) -> Result<Projections> {
    let (height, width) = plane.dim();
    let d = width.max(height);
    let n = angles;
    if n == 0 {
        return Err(Error::InvalidInput("angle count must be positive".to_string()));
    }

    let mut map: Array2<f32> = Array2::from_shape_vec((n, d), try_zeroed(n * d)?)
        .map_err(|e| Error::InvalidInput(format!("projection shape: {}", e)))?;
    let mut pixels_per_line: Vec<u32> = try_zeroed(n)?;

    let (w, h) = (width as i64, height as i64);
    let x_off = round_offset(width as f64 / 2.0);
    let y_off = round_offset(height as f64 / 2.0);
    let at = |x: i64, y: i64| plane[[y as usize, x as usize]];

    for k in 0..=n / 4 {
        let slope = (k as f64 * PI / n as f64).tan();
        for x in 0..d as i64 {
            let yd = round_offset(slope * (x - x_off) as f64);

            if yd + y_off >= 0 && yd + y_off < h && x < w {
                map[[k, x as usize]] = at(x, yd + y_off);
                pixels_per_line[k] += 1;
            }
            if yd + x_off >= 0 && yd + x_off < w && k != n / 4 && x < h {
                map[[n / 2 - k, x as usize]] = at(yd + x_off, x);
                pixels_per_line[n / 2 - k] += 1;
            }
        }
    }

    for (j, k) in (3 * n / 4..n).enumerate() {
        let mirror = k - 2 * j;
        let slope = (k as f64 * PI / n as f64).tan();
        for x in 0..d as i64 {
            let yd = round_offset(slope * (x - x_off) as f64);

            if yd + y_off >= 0 && yd + y_off < h && x < w {
                map[[k, x as usize]] = at(x, yd + y_off);
                pixels_per_line[k] += 1;
            }
            let (mx, my) = (y_off - yd, 2 * y_off - x);
            if mx >= 0 && mx < w && my >= 0 && my < h && k != 3 * n / 4 {
                map[[mirror, x as usize]] = at(mx, my);
                pixels_per_line[mirror] += 1;
            }
        }
    }

    Ok(Projections {
        map,
        pixels_per_line,
    })
}

/// Per-angle variance of the projected samples, normalized to zero mean
/// and unit variance across angles.
///
/// Lines that covered no pixels contribute 0. A feature vector with no
/// spread is returned centred but unscaled.
pub fn feature_vector(projs: &Projections) -> Result<Vec<f64>> {
    let mut features: Vec<f64> = try_zeroed(projs.angles())?;

    for (k, (row, &count)) in projs
        .map
        .rows()
        .into_iter()
        .zip(&projs.pixels_per_line)
        .enumerate()
    {
        let (sum, sum_sq) = row.iter().fold((0.0f64, 0.0f64), |(s, sq), &v| {
            let v = v as f64;
            (s + v, sq + v * v)
        });
        features[k] = variance_from_sums(sum, sum_sq, count as usize);
    }

    let centre = mean(&features);
    let spread = variance(&features).max(0.0).sqrt();
    for f in features.iter_mut() {
        *f -= centre;
        if spread > 0.0 {
            *f /= spread;
        }
    }

    Ok(features)
}

/// First 40 orthonormal DCT-II coefficients of `features`, min-max
/// quantized to bytes.
pub fn dct_digest(features: &[f64]) -> Result<Digest> {
    let n = features.len();
    if n < DIGEST_COEFFS {
        return Err(Error::InvalidInput(format!(
            "need at least {} features for a digest, got {}",
            DIGEST_COEFFS, n
        )));
    }

    let mut buffer: Vec<f64> = try_zeroed(n)?;
    buffer.copy_from_slice(features);
    DctPlanner::<f64>::new()
        .plan_dct2(n)
        .process_dct2(&mut buffer[..]);

    let dc_scale = 1.0 / (n as f64).sqrt();
    let ac_scale = std::f64::consts::SQRT_2 / (n as f64).sqrt();
    let coeffs: Vec<f64> = buffer
        .iter()
        .take(DIGEST_COEFFS)
        .enumerate()
        .map(|(k, &c)| if k == 0 { c * dc_scale } else { c * ac_scale })
        .collect();

    // the range always includes zero
    let (min, max) = coeffs
        .iter()
        .fold((0.0f64, 0.0f64), |(lo, hi), &c| (lo.min(c), hi.max(c)));
    let range = max - min;

    let quantized = coeffs
        .iter()
        .map(|&c| {
            if range > 0.0 {
                (255.0 * (c - min) / range) as u8
            } else {
                0
            }
        })
        .collect();

    Ok(Digest::new(quantized))
}

/// Radon digest of an image. A zero-sized image digests to all zeros.
pub fn image_digest(
    img: &PixelBuffer,
    sigma: f64,
    gamma: f64,
    angles: usize,
    debug: bool,
) -> Result<Digest> {
    if angles < DIGEST_COEFFS {
        return Err(Error::InvalidInput(format!(
            "angle count must be at least {}, got {}",
            DIGEST_COEFFS, angles
        )));
    }
    if img.is_empty() {
        debug!("Zero-sized image, returning all-zero digest");
        return Ok(Digest::new(try_zeroed(DIGEST_COEFFS)?));
    }

    let plane = preprocess(img, sigma, gamma)?;
    let projs = radon_projections(&plane, angles)?;
    let features = feature_vector(&projs)?;
    let digest = dct_digest(&features)?;

    if debug {
        debug!("Radon pixels per line: {:?}", projs.pixels_per_line);
        debug!("Radon digest: {:?}", digest.coeffs());
    }

    Ok(digest)
}

/// Pearson correlation of `x` against `y` rotated by `shift`.
///
/// A zero denominator means one side is constant: identical sequences
/// correlate at 1, anything else at 0.
fn shifted_pearson(x: &[u8], y: &[u8], mean_x: f64, mean_y: f64, shift: usize) -> f64 {
    let n = x.len();
    let rotated = |i: usize| y[(n + i - shift) % n];

    let (mut num, mut den_x, mut den_y) = (0.0, 0.0, 0.0);
    let mut identical = true;
    for (i, &xv) in x.iter().enumerate() {
        let yv = rotated(i);
        identical &= xv == yv;
        let dx = xv as f64 - mean_x;
        let dy = yv as f64 - mean_y;
        num += dx * dy;
        den_x += dx * dx;
        den_y += dy * dy;
    }

    if identical {
        return 1.0;
    }
    let den = (den_x * den_y).sqrt();
    if den > 0.0 {
        (num / den).clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Peak circular cross-correlation of two digests.
///
/// Every shift of `b` against `a` is tried and the largest Pearson
/// coefficient is kept; scores below zero are reported as zero. A perfect
/// correlation matches at any threshold, otherwise `score > threshold`.
pub fn cross_correlation(a: &Digest, b: &Digest, threshold: f64) -> Result<Similarity> {
    let (x, y) = (a.coeffs(), b.coeffs());
    if x.len() != y.len() || x.is_empty() {
        return Err(Error::InvalidInput(format!(
            "cannot correlate digests of {} and {} coefficients",
            x.len(),
            y.len()
        )));
    }

    let n = x.len() as f64;
    let mean_x = x.iter().map(|&v| v as f64).sum::<f64>() / n;
    let mean_y = y.iter().map(|&v| v as f64).sum::<f64>() / n;

    let score = (0..x.len())
        .map(|d| shifted_pearson(x, y, mean_x, mean_y, d))
        .fold(0.0f64, f64::max);

    Ok(Similarity {
        score,
        is_match: score > threshold || score >= 1.0,
    })
}
