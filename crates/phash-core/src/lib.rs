//! Perceptual fingerprints for images and video clips.
//!
//! This library provides:
//! - Block mean value hashing (quick and area-weighted)
//! - Radon projection digests with cross-correlation matching
//! - 64-bit DCT and 576-bit Marr wavelet hashes
//! - Hamming distance metrics
//! - Representative-frame video fingerprints
//!
//! [`Fingerprinter`] bundles a [`Config`] with a wavelet kernel cache and is
//! the usual entry point. The engines under [`processing`] can also be
//! called directly with explicit parameters.

// -- Standard Library --
use std::path::Path;

// -- External Dependencies --
use log::debug;

// -- Internal Modules --
mod error;

// -- Public Re-exports --
pub use config::*;
pub use error::{Error, Result};
pub use types::*;

// -- Public Modules --
pub mod config;
pub mod logging;
pub mod processing;
pub mod source;
pub mod types;

use processing::{
    BitVector, DctHash, Digest, FrameHasher, FrameSource, KernelCache, MhHash, Similarity,
    VideoFingerprint,
};

/// Hash engines configured from one [`Config`]
///
/// Shareable between threads; the Marr wavelet kernel is built on first use
/// and kept for the `(alpha, level)` pair in the configuration.
#[derive(Debug)]
pub struct Fingerprinter {
    config: Config,
    kernels: KernelCache,
}

impl Fingerprinter {
    /// Create a fingerprinter after validating `config`
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        if config.debug {
            debug!("Fingerprinter configuration: {:?}", config);
        }
        Ok(Self {
            config,
            kernels: KernelCache::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn kernel_cache(&self) -> &KernelCache {
        &self.kernels
    }

    /// Block mean value hash of `bits * bits` bits
    pub fn blockhash(&self, img: &PixelBuffer) -> Result<BitVector> {
        processing::blockhash(self.config.bits, img, self.config.quick, self.config.debug)
    }

    /// Block hash as `bits^2 / 4` hex characters
    pub fn blockhash_hex(&self, img: &PixelBuffer) -> Result<String> {
        self.blockhash(img)?.to_hex()
    }

    /// Radon digest with the configured sigma, gamma and angle count
    pub fn image_digest(&self, img: &PixelBuffer) -> Result<Digest> {
        processing::image_digest(
            img,
            self.config.sigma,
            self.config.gamma,
            self.config.angles,
            self.config.debug,
        )
    }

    /// Peak cross-correlation of two digests against the configured threshold
    pub fn compare_digests(&self, a: &Digest, b: &Digest) -> Result<Similarity> {
        let similarity = processing::cross_correlation(a, b, self.config.threshold)?;
        if self.config.debug {
            debug!(
                "Digest correlation {:.4}, match: {}",
                similarity.score, similarity.is_match
            );
        }
        Ok(similarity)
    }

    /// Digest both images and correlate them
    pub fn compare_images(&self, a: &PixelBuffer, b: &PixelBuffer) -> Result<Similarity> {
        let digest_a = self.image_digest(a)?;
        let digest_b = self.image_digest(b)?;
        self.compare_digests(&digest_a, &digest_b)
    }

    /// 64-bit DCT hash
    pub fn dct_hash(&self, img: &PixelBuffer) -> Result<DctHash> {
        processing::dct_hash(img, self.config.debug)
    }

    /// 576-bit Marr wavelet hash
    pub fn mh_hash(&self, img: &PixelBuffer) -> Result<MhHash> {
        let kernel = self.kernels.get(self.config.alpha, self.config.level)?;
        processing::mh_hash(img, &kernel, self.config.debug)
    }

    /// Hash an image with any algorithm
    pub fn fingerprint(&self, img: &PixelBuffer, algorithm: Algorithm) -> Result<Fingerprint> {
        Ok(match algorithm {
            Algorithm::Blockhash => Fingerprint::Block(self.blockhash(img)?),
            Algorithm::Dct => Fingerprint::Dct(self.dct_hash(img)?),
            Algorithm::Mh => Fingerprint::Mh(self.mh_hash(img)?),
            Algorithm::Radon => Fingerprint::Radon(self.image_digest(img)?),
        })
    }

    /// Compare two fingerprints of the same kind
    pub fn compare(&self, a: &Fingerprint, b: &Fingerprint) -> Result<Comparison> {
        a.compare(b, self.config.threshold)
    }

    /// Per-frame hasher for video fingerprints. Block hashes use
    /// `video_bits` rather than `bits`.
    pub fn frame_hasher(&self, algorithm: Algorithm) -> Result<FrameHasher> {
        Ok(match algorithm {
            Algorithm::Blockhash => FrameHasher::Blockhash {
                bits: self.config.video_bits,
                quick: self.config.quick,
            },
            Algorithm::Dct => FrameHasher::Dct,
            Algorithm::Mh => {
                FrameHasher::Mh(self.kernels.get(self.config.alpha, self.config.level)?)
            }
            Algorithm::Radon => FrameHasher::Radon {
                sigma: self.config.sigma,
                gamma: self.config.gamma,
                angles: self.config.angles,
            },
        })
    }

    /// Fingerprint a clip from four representative frames.
    ///
    /// In debug mode, sampled frames are written as
    /// `<dump_prefix>-frm-<index>.bmp` when a prefix is given.
    pub fn video_fingerprint(
        &self,
        source: &mut dyn FrameSource,
        algorithm: Algorithm,
        dump_prefix: Option<&Path>,
    ) -> Result<VideoFingerprint> {
        let hasher = self.frame_hasher(algorithm)?;
        processing::video_fingerprint(source, &hasher, self.config.debug, dump_prefix)
    }
}
