//! Video fingerprints built from four representative frames.
//!
//! Frame selection: the 11th frame from each end (or the first and last
//! frame of clips shorter than 11 frames), plus the frames at 35% and 70%
//! of the clip. Each sample is decoded and hashed on its own, even when two
//! samples share an index, and the per-frame hashes are concatenated in
//! sample order.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::blockhash::{blockhash, validate_bits};
use super::dct::dct_hash;
use super::distance::try_normalized_hamming;
use super::frame::BmpFrame;
use super::mh::{mh_hash, MhKernel};
use super::radon::image_digest;
use super::types::{hex_string, MH_HASH_LEN};
use crate::config::DIGEST_COEFFS;
use crate::error::{try_zeroed, Result};
use crate::types::PixelBuffer;

/// Number of frames sampled per clip
pub const SAMPLE_COUNT: usize = 4;

/// Frames skipped at either end of clips with at least this many frames
const EDGE_SKIP: u64 = 10;
const MIN_FRAMES_FOR_SKIP: u64 = 11;
const FIRST_MIDDLE: f64 = 0.35;
const SECOND_MIDDLE: f64 = 0.70;

/// Frame indices to hash for a clip of `frame_count` frames, or `None` for
/// an empty clip.
pub fn sample_indices(frame_count: u64) -> Option<[u64; SAMPLE_COUNT]> {
    if frame_count == 0 {
        return None;
    }

    let (first, last) = if frame_count < MIN_FRAMES_FOR_SKIP {
        (0, frame_count - 1)
    } else {
        (EDGE_SKIP, frame_count - EDGE_SKIP - 1)
    };
    let middle = |fraction: f64| (frame_count as f64 * fraction).floor() as u64;

    Some([first, middle(FIRST_MIDDLE), middle(SECOND_MIDDLE), last])
}

/// Supplier of decoded video frames
pub trait FrameSource {
    /// Total number of frames in the clip
    fn frame_count(&mut self) -> Result<u64>;

    /// Decode frame `index` (0-based) into a 24-bit bottom-up buffer
    fn decode_frame(&mut self, index: u64) -> Result<BmpFrame>;
}

/// Per-frame hash algorithm
#[derive(Debug, Clone)]
pub enum FrameHasher {
    /// 64-bit DCT hash, 8 bytes big-endian
    Dct,
    /// Block mean value hash, `bits^2 / 8` bytes
    Blockhash { bits: u32, quick: bool },
    /// Marr wavelet hash, 72 bytes
    Mh(Arc<MhKernel>),
    /// Radon digest, 40 bytes
    Radon { sigma: f64, gamma: f64, angles: usize },
}

impl FrameHasher {
    /// Bytes produced per frame
    pub fn hash_len(&self) -> usize {
        match self {
            FrameHasher::Dct => 8,
            FrameHasher::Blockhash { bits, .. } => (*bits as usize * *bits as usize).div_ceil(8),
            FrameHasher::Mh(_) => MH_HASH_LEN,
            FrameHasher::Radon { .. } => DIGEST_COEFFS,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FrameHasher::Dct => "dct",
            FrameHasher::Blockhash { .. } => "blockhash",
            FrameHasher::Mh(_) => "mh",
            FrameHasher::Radon { .. } => "radon",
        }
    }

    /// Hash one frame into `hash_len()` bytes
    pub fn hash_frame(&self, img: &PixelBuffer, debug: bool) -> Result<Vec<u8>> {
        match self {
            FrameHasher::Dct => Ok(dct_hash(img, debug)?.0.to_be_bytes().to_vec()),
            FrameHasher::Blockhash { bits, quick } => {
                validate_bits(*bits)?;
                Ok(blockhash(*bits, img, *quick, debug)?.to_bytes())
            }
            FrameHasher::Mh(kernel) => Ok(mh_hash(img, kernel, debug)?.as_bytes().to_vec()),
            FrameHasher::Radon {
                sigma,
                gamma,
                angles,
            } => Ok(image_digest(img, *sigma, *gamma, *angles, debug)?
                .coeffs()
                .to_vec()),
        }
    }
}

/// One hashed frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSample {
    pub index: u64,
    pub hash: Vec<u8>,
}

/// Concatenated hashes of the four sampled frames
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoFingerprint {
    frame_count: u64,
    samples: Vec<FrameSample>,
    bytes: Vec<u8>,
}

impl VideoFingerprint {
    /// Fingerprint of a clip with no frames: zero bytes, no samples
    pub fn empty(hash_len: usize) -> Result<Self> {
        Ok(Self {
            frame_count: 0,
            samples: Vec::new(),
            bytes: try_zeroed(hash_len * SAMPLE_COUNT)?,
        })
    }

    fn from_samples(frame_count: u64, samples: Vec<FrameSample>) -> Self {
        let bytes = samples.iter().flat_map(|s| s.hash.iter().copied()).collect();
        Self {
            frame_count,
            samples,
            bytes,
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn samples(&self) -> &[FrameSample] {
        &self.samples
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lowercase hex of the concatenated bytes
    pub fn to_hex(&self) -> String {
        hex_string(&self.bytes)
    }

    /// Normalized Hamming distance to another fingerprint of the same size
    pub fn distance(&self, other: &VideoFingerprint) -> Result<f64> {
        try_normalized_hamming(&self.bytes, &other.bytes)
    }
}

/// Path of the debug dump for frame `index`: `<prefix>-frm-<index>.bmp`
pub fn frame_dump_path(prefix: &Path, index: u64) -> PathBuf {
    let mut name = prefix.as_os_str().to_owned();
    name.push(format!("-frm-{}.bmp", index));
    PathBuf::from(name)
}

/// Fingerprint a clip.
///
/// With `debug` set, each sampled frame is logged and, when `dump_prefix`
/// is given, written next to it as a bitmap. A clip with no frames yields
/// an all-zero fingerprint without decoding anything.
pub fn video_fingerprint(
    source: &mut dyn FrameSource,
    hasher: &FrameHasher,
    debug: bool,
    dump_prefix: Option<&Path>,
) -> Result<VideoFingerprint> {
    let frame_count = source.frame_count()?;
    if debug {
        debug!("Clip has {} frames", frame_count);
    }

    let indices = match sample_indices(frame_count) {
        Some(indices) => indices,
        None => {
            info!("Clip has no frames, returning all-zero fingerprint");
            return VideoFingerprint::empty(hasher.hash_len());
        }
    };

    let mut samples = Vec::with_capacity(SAMPLE_COUNT);
    for index in indices {
        let frame = source.decode_frame(index)?;

        if debug {
            if let Some(prefix) = dump_prefix {
                let path = frame_dump_path(prefix, index);
                match frame.save(&path) {
                    Ok(()) => debug!("Saved frame #{} into '{}'", index, path.display()),
                    Err(e) => warn!("Failed to save frame #{} into '{}': {}", index, path.display(), e),
                }
            }
        }

        let rgba = frame.to_rgba()?;
        let img = PixelBuffer::rgba(&rgba, frame.width(), frame.height())?;
        let hash = hasher.hash_frame(&img, debug)?;

        if debug {
            debug!(
                "Frame #{} {} hash: {}",
                index,
                hasher.name(),
                hex_string(&hash)
            );
        }
        samples.push(FrameSample { index, hash });
    }

    Ok(VideoFingerprint::from_samples(frame_count, samples))
}
