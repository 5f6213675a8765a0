use image::{GrayImage, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::processing::radon::cross_correlation;
use crate::processing::{
    hamming64, BitVector, DctHash, Digest, MhHash, Similarity, VideoFingerprint,
};

/// Channel layout of a pixel buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelLayout {
    /// 4 bytes per pixel, R,G,B,A
    Rgba,
    /// 1 byte per pixel, pre-converted luma
    Gray,
}

impl PixelLayout {
    /// Bytes per pixel
    pub fn channels(self) -> usize {
        match self {
            Self::Rgba => 4,
            Self::Gray => 1,
        }
    }
}

/// Immutable view of a decoded image, row-major with no row padding.
///
/// The buffer is borrowed for the duration of one hash call and never
/// retained by the core.
#[derive(Debug, Clone, Copy)]
pub struct PixelBuffer<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    layout: PixelLayout,
}

impl<'a> PixelBuffer<'a> {
    /// Wrap `data` after checking it holds exactly `width * height` pixels
    pub fn new(data: &'a [u8], width: u32, height: u32, layout: PixelLayout) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(layout.channels()))
            .ok_or_else(|| {
                Error::InvalidInput(format!("image dimensions {}x{} overflow", width, height))
            })?;

        if data.len() != expected {
            return Err(Error::InvalidInput(format!(
                "{:?} buffer for {}x{} image must be {} bytes, got {}",
                layout,
                width,
                height,
                expected,
                data.len()
            )));
        }

        Ok(Self {
            data,
            width,
            height,
            layout,
        })
    }

    /// RGBA view
    pub fn rgba(data: &'a [u8], width: u32, height: u32) -> Result<Self> {
        Self::new(data, width, height, PixelLayout::Rgba)
    }

    /// Single-channel grayscale view
    pub fn gray(data: &'a [u8], width: u32, height: u32) -> Result<Self> {
        Self::new(data, width, height, PixelLayout::Gray)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Bytes per pixel
    pub fn channels(&self) -> usize {
        self.layout.channels()
    }

    /// Bytes per row
    pub fn row_len(&self) -> usize {
        self.width as usize * self.channels()
    }

    /// True when the image has no pixels
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Byte offset of pixel `(x, y)`
    #[inline]
    pub fn pixel_offset(&self, x: usize, y: usize) -> usize {
        y * self.row_len() + x * self.channels()
    }

    /// Block hash value of pixel `(x, y)`: R+G+B, or 765 (pure white) when
    /// the pixel is fully transparent.
    #[inline]
    pub fn rgb_sum(&self, x: usize, y: usize) -> u32 {
        let i = self.pixel_offset(x, y);
        match self.layout {
            PixelLayout::Rgba => {
                let px = &self.data[i..i + 4];
                if px[3] == 0 {
                    765
                } else {
                    px[0] as u32 + px[1] as u32 + px[2] as u32
                }
            }
            PixelLayout::Gray => 3 * self.data[i] as u32,
        }
    }
}

impl<'a> From<&'a RgbaImage> for PixelBuffer<'a> {
    fn from(img: &'a RgbaImage) -> Self {
        Self {
            data: img.as_raw(),
            width: img.width(),
            height: img.height(),
            layout: PixelLayout::Rgba,
        }
    }
}

impl<'a> From<&'a GrayImage> for PixelBuffer<'a> {
    fn from(img: &'a GrayImage) -> Self {
        Self {
            data: img.as_raw(),
            width: img.width(),
            height: img.height(),
            layout: PixelLayout::Gray,
        }
    }
}

/// Hash algorithm selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Block mean value hash
    Blockhash,
    /// 64-bit DCT hash
    Dct,
    /// Marr wavelet hash
    Mh,
    /// Radon projection digest
    Radon,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Blockhash,
        Algorithm::Dct,
        Algorithm::Mh,
        Algorithm::Radon,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Blockhash => "blockhash",
            Algorithm::Dct => "dct",
            Algorithm::Mh => "mh",
            Algorithm::Radon => "radon",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "unknown algorithm '{}', expected one of blockhash, dct, mh, radon",
                    s
                ))
            })
    }
}

/// Result of hashing one image or clip with any algorithm
#[derive(Debug, Clone, PartialEq)]
pub enum Fingerprint {
    Block(BitVector),
    Dct(DctHash),
    Mh(MhHash),
    Radon(Digest),
    Video(VideoFingerprint),
}

/// How two fingerprints relate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Comparison {
    /// Number of differing bits
    Hamming(u32),
    /// Fraction of differing bits in [0, 1]
    Distance(f64),
    /// Peak cross-correlation of two Radon digests
    Correlation(Similarity),
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::Hamming(bits) => write!(f, "hamming {}", bits),
            Comparison::Distance(d) => write!(f, "distance {:.4}", d),
            Comparison::Correlation(sim) => write!(
                f,
                "pcc {:.4} ({})",
                sim.score,
                if sim.is_match { "match" } else { "no match" }
            ),
        }
    }
}

impl Fingerprint {
    /// Printable digest: block hashes as nibbles, everything else as bytes
    pub fn to_hex(&self) -> Result<String> {
        match self {
            Fingerprint::Block(bits) => bits.to_hex(),
            Fingerprint::Dct(hash) => Ok(hash.to_string()),
            Fingerprint::Mh(hash) => Ok(hash.to_string()),
            Fingerprint::Radon(digest) => Ok(digest.to_hex()),
            Fingerprint::Video(video) => Ok(video.to_hex()),
        }
    }

    /// Compare against a fingerprint of the same kind. `threshold` only
    /// applies to Radon digests.
    pub fn compare(&self, other: &Fingerprint, threshold: f64) -> Result<Comparison> {
        match (self, other) {
            (Fingerprint::Block(a), Fingerprint::Block(b)) => {
                if a.len() != b.len() {
                    return Err(Error::InvalidInput(format!(
                        "cannot compare block hashes of {} and {} bits",
                        a.len(),
                        b.len()
                    )));
                }
                let differing = a
                    .as_slice()
                    .iter()
                    .zip(b.as_slice())
                    .filter(|(x, y)| x != y)
                    .count();
                Ok(Comparison::Hamming(differing as u32))
            }
            (Fingerprint::Dct(a), Fingerprint::Dct(b)) => {
                Ok(Comparison::Hamming(hamming64(a.0, b.0)))
            }
            (Fingerprint::Mh(a), Fingerprint::Mh(b)) => Ok(Comparison::Distance(a.distance(b))),
            (Fingerprint::Radon(a), Fingerprint::Radon(b)) => {
                Ok(Comparison::Correlation(cross_correlation(a, b, threshold)?))
            }
            (Fingerprint::Video(a), Fingerprint::Video(b)) => {
                Ok(Comparison::Distance(a.distance(b)?))
            }
            _ => Err(Error::InvalidInput(
                "cannot compare fingerprints of different kinds".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_short_buffer() {
        let data = vec![0u8; 15];
        assert!(matches!(
            PixelBuffer::rgba(&data, 2, 2),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_offsets() {
        let data = vec![0u8; 3 * 2 * 4];
        let buf = PixelBuffer::rgba(&data, 3, 2).unwrap();
        assert_eq!(buf.row_len(), 12);
        assert_eq!(buf.pixel_offset(0, 0), 0);
        assert_eq!(buf.pixel_offset(2, 1), 20);
    }

    #[test]
    fn test_transparent_pixel_counts_as_white() {
        let data = [10, 20, 30, 0, 10, 20, 30, 255];
        let buf = PixelBuffer::rgba(&data, 2, 1).unwrap();
        assert_eq!(buf.rgb_sum(0, 0), 765);
        assert_eq!(buf.rgb_sum(1, 0), 60);
    }

    #[test]
    fn test_gray_sum() {
        let data = [100u8];
        let buf = PixelBuffer::gray(&data, 1, 1).unwrap();
        assert_eq!(buf.rgb_sum(0, 0), 300);
    }

    #[test]
    fn test_from_rgba_image() {
        let img = RgbaImage::from_pixel(4, 3, image::Rgba([1, 2, 3, 4]));
        let buf = PixelBuffer::from(&img);
        assert_eq!((buf.width(), buf.height()), (4, 3));
        assert_eq!(buf.layout(), PixelLayout::Rgba);
    }

    #[test]
    fn test_algorithm_parse() {
        assert_eq!("dct".parse::<Algorithm>().unwrap(), Algorithm::Dct);
        assert_eq!("Radon".parse::<Algorithm>().unwrap(), Algorithm::Radon);
        assert!("sha1".parse::<Algorithm>().is_err());
        assert_eq!(Algorithm::Mh.to_string(), "mh");
    }

    #[test]
    fn test_compare_block_hashes() {
        let a = Fingerprint::Block(BitVector::new(vec![true, false, true, true]));
        let b = Fingerprint::Block(BitVector::new(vec![true, true, true, false]));
        assert_eq!(a.compare(&b, 0.9).unwrap(), Comparison::Hamming(2));
        assert_eq!(a.to_hex().unwrap(), "b");
    }

    #[test]
    fn test_compare_mismatched_kinds() {
        let a = Fingerprint::Dct(DctHash(1));
        let b = Fingerprint::Block(BitVector::zeros(64));
        assert!(a.compare(&b, 0.9).is_err());
        assert_eq!(
            a.compare(&Fingerprint::Dct(DctHash(0)), 0.9).unwrap(),
            Comparison::Hamming(1)
        );
    }
}
