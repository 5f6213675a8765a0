use phash_core::processing::{cross_correlation, image_digest, Digest};
use phash_core::{Config, Fingerprinter, PixelBuffer};

use crate::common;

fn digest(img: &image::RgbaImage) -> Digest {
    image_digest(&PixelBuffer::from(img), 3.5, 1.0, 180, false).unwrap()
}

#[test]
fn test_digest_has_forty_coefficients() {
    for (w, h) in [(32, 32), (80, 45), (17, 90)] {
        let d = digest(&common::scene(w, h));
        assert_eq!(d.len(), 40);
        assert_eq!(d.to_hex().len(), 80);
    }
}

#[test]
fn test_self_correlation_is_perfect() {
    let d = digest(&common::scene(64, 48));
    let sim = cross_correlation(&d, &d, 0.90).unwrap();
    assert_eq!(sim.score, 1.0);
    assert!(sim.is_match);

    for threshold in [0.0, 0.5, 0.99, 1.0] {
        assert!(cross_correlation(&d, &d, threshold).unwrap().is_match);
    }
}

#[test]
fn test_scores_stay_in_range() {
    let a = digest(&common::scene(64, 48));
    let b = digest(&common::stripes(64, 48));
    let sim = cross_correlation(&a, &b, 0.90).unwrap();
    assert!((0.0..=1.0).contains(&sim.score));
    assert_eq!(sim.is_match, sim.score > 0.90 || sim.score >= 1.0);
}

#[test]
fn test_digest_ignores_debug_flag() {
    let img = common::scene(40, 40);
    let quiet = image_digest(&PixelBuffer::from(&img), 3.5, 1.0, 180, false).unwrap();
    let verbose = image_digest(&PixelBuffer::from(&img), 3.5, 1.0, 180, true).unwrap();
    assert_eq!(quiet, verbose);
}

#[test]
fn test_rejects_too_few_angles() {
    let img = common::scene(40, 40);
    assert!(image_digest(&PixelBuffer::from(&img), 3.5, 1.0, 20, false).is_err());
}

#[test]
fn test_compare_images_through_fingerprinter() {
    let fp = Fingerprinter::new(Config::default()).unwrap();
    let img = common::scene(72, 54);
    let sim = fp
        .compare_images(&PixelBuffer::from(&img), &PixelBuffer::from(&img))
        .unwrap();
    assert!(sim.is_match);
}
