// Hash engines
pub mod blockhash;
pub mod dct;
pub mod mh;
pub mod radon;

// Shared building blocks
pub mod distance;
pub mod filters;
pub mod stats;
pub mod types;

// Video support
pub mod frame;
pub mod video;

pub use blockhash::blockhash;
pub use dct::dct_hash;
pub use distance::{hamming64, normalized_hamming, DISTANCE_ERROR};
pub use frame::BmpFrame;
pub use mh::{mh_hash, KernelCache, MhKernel};
pub use radon::{cross_correlation, image_digest};
pub use types::{BitVector, DctHash, Digest, MhHash, Similarity, MH_HASH_LEN};
pub use video::{
    sample_indices, video_fingerprint, FrameHasher, FrameSample, FrameSource, VideoFingerprint,
};
