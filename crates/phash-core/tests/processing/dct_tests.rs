use phash_core::processing::{dct_hash, hamming64};
use phash_core::{Fingerprinter, Config, PixelBuffer};

use crate::common;

#[test]
fn test_identical_images_have_zero_distance() {
    let img = common::scene(120, 90);
    let a = dct_hash(&PixelBuffer::from(&img), false).unwrap();
    let b = dct_hash(&PixelBuffer::from(&img), false).unwrap();
    assert_eq!(a.distance(&b), 0);
    assert_eq!(a.to_string().len(), 16);
}

#[test]
fn test_at_most_half_the_bits_set() {
    for img in [common::scene(64, 64), common::stripes(50, 70)] {
        let hash = dct_hash(&PixelBuffer::from(&img), false).unwrap();
        assert!(hash.0.count_ones() <= 32);
    }
}

#[test]
fn test_small_brightness_shift_is_close() {
    let img = common::scene(96, 96);
    let brighter = common::brighten(&img, 6);
    let a = dct_hash(&PixelBuffer::from(&img), false).unwrap();
    let b = dct_hash(&PixelBuffer::from(&brighter), false).unwrap();
    assert!(a.distance(&b) <= 12, "distance {}", a.distance(&b));
}

#[test]
fn test_different_images_differ() {
    let a = dct_hash(&PixelBuffer::from(&common::scene(64, 64)), false).unwrap();
    let b = dct_hash(&PixelBuffer::from(&common::stripes(64, 64)), false).unwrap();
    assert!(hamming64(a.0, b.0) > 0);
}

#[test]
fn test_tiny_image() {
    let fp = Fingerprinter::new(Config::default()).unwrap();
    let img = common::uniform(1, 1, [9, 9, 9, 255]);
    // a single pixel still produces a hash
    fp.dct_hash(&PixelBuffer::from(&img)).unwrap();
}
