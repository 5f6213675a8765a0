use phash_core::processing::{mh_hash, KernelCache, MhKernel, MH_HASH_LEN};
use std::f64::consts::PI;

use image::GrayImage;
use phash_core::{Config, Fingerprinter, PixelBuffer};

use crate::common;

#[test]
fn test_hash_is_72_bytes_for_any_size() {
    let kernel = MhKernel::new(2.0, 1.0).unwrap();
    for (w, h) in [(20, 15), (160, 90)] {
        let img = common::scene(w, h);
        let hash = mh_hash(&PixelBuffer::from(&img), &kernel, false).unwrap();
        assert_eq!(hash.as_bytes().len(), MH_HASH_LEN);
        assert_eq!(hash.to_string().len(), MH_HASH_LEN * 2);
    }
}

#[test]
fn test_known_hash_for_column_pattern() {
    // 512x512 skips resampling; every row is the same two-tone sine profile
    let img = GrayImage::from_fn(512, 512, |x, _| {
        let x = x as f64;
        let v = 128.0 + 100.0 * (2.0 * PI * x / 89.0).sin() + 20.0 * (2.0 * PI * x / 29.0).sin();
        image::Luma([v as u8])
    });
    let kernel = MhKernel::new(2.0, 1.0).unwrap();
    let hash = mh_hash(&PixelBuffer::from(&img), &kernel, false).unwrap();
    assert_eq!(
        hash.to_string(),
        "b6b6d25b624db76c92b6b6d25b624db76c92b6b6d25b624db76c92b6b6d25b624db76c92\
         b6b6d25b624db76c92b6b6d25b624db76c92b6b6d25b624db76c92b6b6d25b624db76c92"
    );
}

#[test]
fn test_distance_properties() {
    let fp = Fingerprinter::new(Config::default()).unwrap();
    let a = fp.mh_hash(&PixelBuffer::from(&common::scene(64, 64))).unwrap();
    let b = fp.mh_hash(&PixelBuffer::from(&common::stripes(64, 64))).unwrap();

    assert_eq!(a.distance(&a), 0.0);
    assert_eq!(a.distance(&b), b.distance(&a));
    assert!((0.0..=1.0).contains(&a.distance(&b)));
    assert_eq!(fp.kernel_cache().len(), 1);
}

#[test]
fn test_kernel_follows_parameter_changes() {
    let cache = KernelCache::new();
    let first = cache.get(2.0, 1.0).unwrap();
    let second = cache.get(2.0, 2.0).unwrap();
    // a changed level must not reuse the first kernel
    assert_eq!(first.size(), 17);
    assert_eq!(second.size(), 33);
    assert_eq!(cache.len(), 2);
}
