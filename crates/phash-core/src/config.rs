use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Default block grid size for still images (gives a 256-bit hash)
pub const DEFAULT_BITS_FOR_IMAGES: u32 = 16;

/// Default block grid size per sampled video frame
pub const DEFAULT_BITS_FOR_VIDEOS: u32 = 4;

/// Largest accepted block hash grid size
pub const MAX_BITS: u32 = 256;

/// Number of Radon projection angles
pub const DEFAULT_ANGLES: usize = 180;

/// Number of DCT coefficients kept in a Radon digest
pub const DIGEST_COEFFS: usize = 40;

/// Configuration consumed by the hash engines
///
/// Every hash call reads its parameters, including the debug toggle,
/// from the `Config` it is handed. Nothing is read from global state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Block hash grid size (hash is `bits * bits` bits)
    pub bits: u32,

    /// Block hash grid size used for each sampled video frame
    pub video_bits: u32,

    /// Use the quick block hash path even when the image does not divide evenly
    pub quick: bool,

    /// Gaussian blur deviation for the Radon digest
    pub sigma: f64,

    /// Gamma correction exponent for the Radon digest
    pub gamma: f64,

    /// Number of Radon projection angles
    pub angles: usize,

    /// Peak cross-correlation above which two digests match
    pub threshold: f64,

    /// Marr wavelet scale factor
    pub alpha: f32,

    /// Marr wavelet scale level
    pub level: f32,

    /// Emit verbose intermediate dumps
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bits: DEFAULT_BITS_FOR_IMAGES,
            video_bits: DEFAULT_BITS_FOR_VIDEOS,
            quick: false,
            sigma: 3.5,
            gamma: 1.0,
            angles: DEFAULT_ANGLES,
            threshold: 0.90,
            alpha: 2.0,
            level: 1.0,
            debug: false,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())
            .map_err(|e| Error::Configuration(format!("Failed to open config file: {}", e)))?;

        let config: Config = serde_json::from_reader(file)
            .map_err(|e| Error::Configuration(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path.as_ref())
            .map_err(|e| Error::Configuration(format!("Failed to create config file: {}", e)))?;

        serde_json::to_writer_pretty(file, self)
            .map_err(|e| Error::Configuration(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for (name, bits) in [("bits", self.bits), ("video_bits", self.video_bits)] {
            if bits == 0 || bits % 4 != 0 || bits > MAX_BITS {
                return Err(Error::Configuration(format!(
                    "{} must be a positive multiple of 4 up to {}, got {}",
                    name, MAX_BITS, bits
                )));
            }
        }

        if self.angles < DIGEST_COEFFS {
            return Err(Error::Configuration(format!(
                "At least {} projection angles are required, got {}",
                DIGEST_COEFFS, self.angles
            )));
        }

        if !(self.sigma.is_finite() && self.sigma > 0.0) {
            return Err(Error::Configuration("sigma must be positive".to_string()));
        }

        if !(self.gamma.is_finite() && self.gamma > 0.0) {
            return Err(Error::Configuration("gamma must be positive".to_string()));
        }

        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(Error::Configuration(
                "Cross-correlation threshold must be between 0 and 1".to_string(),
            ));
        }

        if !(self.alpha.is_finite() && self.alpha > 0.0) || !self.level.is_finite() {
            return Err(Error::Configuration(
                "Wavelet alpha must be positive and level finite".to_string(),
            ));
        }

        Ok(())
    }
}
