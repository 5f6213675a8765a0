//! Hash and digest value types

use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};

use super::distance::{hamming64, normalized_hamming};
use crate::error::{Error, Result};

/// Number of bytes in a Marr-wavelet hash (576 bits)
pub const MH_HASH_LEN: usize = 72;

/// Lowercase hex, two characters per byte
pub fn hex_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
            let _ = write!(s, "{:02x}", b);
            s
        })
}

/// Ordered bits of a block hash, row-major block order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitVector(Vec<bool>);

impl BitVector {
    pub fn new(bits: Vec<bool>) -> Self {
        Self(bits)
    }

    /// All-zero vector of `len` bits
    pub fn zeros(len: usize) -> Self {
        Self(vec![false; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }

    /// Hex digest: each character encodes 4 consecutive bits, MSB first.
    pub fn to_hex(&self) -> Result<String> {
        if self.0.len() % 4 != 0 {
            return Err(Error::InvalidInput(format!(
                "hex encoding needs a multiple of 4 bits, got {}",
                self.0.len()
            )));
        }

        let mut hex = String::new();
        hex.try_reserve_exact(self.0.len() / 4)?;
        for nibble in self.0.chunks(4) {
            let value = nibble
                .iter()
                .fold(0u32, |acc, &bit| (acc << 1) | bit as u32);
            // value < 16 by construction
            hex.push(char::from_digit(value, 16).unwrap_or('0'));
        }
        Ok(hex)
    }

    /// Pack bits MSB-first into bytes. A trailing partial byte is padded
    /// with zero bits.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0
            .chunks(8)
            .map(|chunk| {
                chunk
                    .iter()
                    .enumerate()
                    .fold(0u8, |acc, (i, &bit)| acc | ((bit as u8) << (7 - i)))
            })
            .collect()
    }

    /// Render as a 2D map of `0`/`1` with `width` bits per row
    pub fn to_grid(&self, width: usize) -> String {
        let width = width.max(1);
        self.0
            .chunks(width)
            .map(|row| row.iter().map(|&b| if b { '1' } else { '0' }).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<Vec<bool>> for BitVector {
    fn from(bits: Vec<bool>) -> Self {
        Self(bits)
    }
}

/// Radon/DCT digest: 40 coefficients quantized to [0, 255]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Digest {
    coeffs: Vec<u8>,
}

impl Digest {
    pub fn new(coeffs: Vec<u8>) -> Self {
        Self { coeffs }
    }

    pub fn coeffs(&self) -> &[u8] {
        &self.coeffs
    }

    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn to_hex(&self) -> String {
        hex_string(&self.coeffs)
    }
}

/// 64-bit DCT image hash, bit 0 = first coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DctHash(pub u64);

impl DctHash {
    /// Calculate the Hamming distance between two hashes
    pub fn distance(&self, other: &DctHash) -> u32 {
        hamming64(self.0, other.0)
    }

    /// Check if two images are perceptually similar based on a threshold
    pub fn is_similar(&self, other: &DctHash, threshold: u32) -> bool {
        self.distance(other) <= threshold
    }
}

impl fmt::Display for DctHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// 576-bit Marr-wavelet hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MhHash(pub [u8; MH_HASH_LEN]);

impl MhHash {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Normalized Hamming distance in [0, 1]
    pub fn distance(&self, other: &MhHash) -> f64 {
        normalized_hamming(&self.0, &other.0)
    }
}

impl fmt::Display for MhHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex_string(&self.0))
    }
}

/// Peak cross-correlation between two digests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Similarity {
    /// Maximum Pearson correlation over all circular shifts
    pub score: f64,
    /// `score > threshold`, or a perfect correlation at any threshold
    pub is_match: bool,
}
