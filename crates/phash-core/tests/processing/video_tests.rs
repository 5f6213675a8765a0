use phash_core::processing::frame::BmpFrame;
use phash_core::processing::{video_fingerprint, FrameHasher, FrameSource};
use phash_core::source::AnimationSource;
use phash_core::{Algorithm, Config, Fingerprinter, Result};
use tempfile::TempDir;

use crate::common;

struct EmptyClip {
    decode_calls: usize,
}

impl FrameSource for EmptyClip {
    fn frame_count(&mut self) -> Result<u64> {
        Ok(0)
    }

    fn decode_frame(&mut self, _index: u64) -> Result<BmpFrame> {
        self.decode_calls += 1;
        BmpFrame::new(1, 1)
    }
}

#[test]
fn test_gif_clip_samples_four_frames() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("clip.gif");
    common::write_gif(&path, &common::moving_band(5, 32, 24));

    let fp = Fingerprinter::new(Config::default()).unwrap();
    let mut source = AnimationSource::open(&path).unwrap();
    let clip = fp.video_fingerprint(&mut source, Algorithm::Dct, None).unwrap();

    assert_eq!(clip.frame_count(), 5);
    let indices: Vec<u64> = clip.samples().iter().map(|s| s.index).collect();
    assert_eq!(indices, vec![0, 1, 3, 4]);
    assert_eq!(clip.as_bytes().len(), 32);
    assert_eq!(clip.to_hex().len(), 64);
    assert_eq!(clip.distance(&clip).unwrap(), 0.0);
}

#[test]
fn test_debug_dumps_sampled_frames() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("clip.gif");
    common::write_gif(&path, &common::moving_band(5, 20, 12));

    let config = Config {
        debug: true,
        ..Config::default()
    };
    let fp = Fingerprinter::new(config).unwrap();
    let mut source = AnimationSource::open(&path).unwrap();
    fp.video_fingerprint(&mut source, Algorithm::Blockhash, Some(&path))
        .unwrap();

    for index in [0, 1, 3, 4] {
        let dump = dir.path().join(format!("clip.gif-frm-{}.bmp", index));
        let frame = image::open(&dump).unwrap().to_rgb8();
        assert_eq!(frame.dimensions(), (20, 12));
    }
    assert!(!dir.path().join("clip.gif-frm-2.bmp").exists());
}

#[test]
fn test_no_dump_without_debug() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("clip.gif");
    common::write_gif(&path, &common::moving_band(3, 16, 16));

    let fp = Fingerprinter::new(Config::default()).unwrap();
    let mut source = AnimationSource::open(&path).unwrap();
    fp.video_fingerprint(&mut source, Algorithm::Dct, Some(&path))
        .unwrap();
    assert!(!dir.path().join("clip.gif-frm-0.bmp").exists());
}

#[test]
fn test_empty_clip_is_all_zero() {
    let mut clip = EmptyClip { decode_calls: 0 };
    let fp = Fingerprinter::new(Config::default()).unwrap();
    let hasher = fp.frame_hasher(Algorithm::Mh).unwrap();
    let result = video_fingerprint(&mut clip, &hasher, false, None).unwrap();

    assert_eq!(result.as_bytes().len(), 4 * 72);
    assert!(result.as_bytes().iter().all(|&b| b == 0));
    assert_eq!(clip.decode_calls, 0);
}

#[test]
fn test_blockhash_frames_use_video_bits() {
    let frames = common::moving_band(12, 24, 24);
    let mut source = AnimationSource::from_frames(frames);
    let hasher = FrameHasher::Blockhash {
        bits: 8,
        quick: true,
    };
    let clip = video_fingerprint(&mut source, &hasher, false, None).unwrap();
    assert_eq!(clip.as_bytes().len(), 4 * 8);
    assert!(clip.samples().iter().all(|s| s.hash.len() == 8));
}
