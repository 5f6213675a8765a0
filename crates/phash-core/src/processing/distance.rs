//! Distance metrics for comparing fingerprints.

use crate::error::{Error, Result};

const M1: u64 = 0x5555_5555_5555_5555;
const M2: u64 = 0x3333_3333_3333_3333;
const M4: u64 = 0x0f0f_0f0f_0f0f_0f0f;
const H01: u64 = 0x0101_0101_0101_0101;

/// Returned by [`normalized_hamming`] when the inputs cannot be compared
pub const DISTANCE_ERROR: f64 = -1.0;

/// Population count of `a ^ b`, in [0, 64].
///
/// Branch-free SWAR reduction: pairs, nibbles, bytes, then a multiply
/// sums the eight byte counts into the top byte.
#[inline]
pub fn hamming64(a: u64, b: u64) -> u32 {
    let mut x = a ^ b;
    x -= (x >> 1) & M1;
    x = (x & M2) + ((x >> 2) & M2);
    x = (x + (x >> 4)) & M4;
    (x.wrapping_mul(H01) >> 56) as u32
}

/// Set bits in a byte
#[inline]
pub fn bitcount8(mut value: u8) -> u32 {
    let mut count = 0;
    while value != 0 {
        count += 1;
        value &= value - 1;
    }
    count
}

/// Fraction of differing bits between two equal-length buffers, in [0, 1].
///
/// Returns [`DISTANCE_ERROR`] (-1.0) when the lengths differ or either
/// buffer is empty.
pub fn normalized_hamming(a: &[u8], b: &[u8]) -> f64 {
    try_normalized_hamming(a, b).unwrap_or(DISTANCE_ERROR)
}

/// Typed-error form of [`normalized_hamming`]
pub fn try_normalized_hamming(a: &[u8], b: &[u8]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(Error::InvalidInput(format!(
            "cannot compare hashes of {} and {} bytes",
            a.len(),
            b.len()
        )));
    }
    if a.is_empty() {
        return Err(Error::InvalidInput("cannot compare empty hashes".to_string()));
    }

    let differing: u32 = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| bitcount8(x ^ y))
        .sum();

    Ok(differing as f64 / (a.len() as f64 * 8.0))
}
