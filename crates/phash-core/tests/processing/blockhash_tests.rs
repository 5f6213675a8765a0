use phash_core::processing::blockhash;
use phash_core::{Error, PixelBuffer};

use crate::common;

fn hex(bits: u32, img: &image::RgbaImage, quick: bool) -> String {
    blockhash(bits, &PixelBuffer::from(img), quick, false)
        .unwrap()
        .to_hex()
        .unwrap()
}

#[test]
fn test_uniform_white_quick() {
    let img = common::uniform(8, 8, [255, 255, 255, 255]);
    assert_eq!(hex(4, &img, true), "ffff");
}

#[test]
fn test_uniform_black_quick() {
    let img = common::uniform(8, 8, [0, 0, 0, 255]);
    assert_eq!(hex(4, &img, true), "0000");
}

#[test]
fn test_transparent_is_white() {
    let img = common::uniform(8, 8, [90, 10, 200, 0]);
    assert_eq!(hex(4, &img, true), "ffff");
    assert_eq!(hex(4, &img, false), "ffff");
}

#[test]
fn test_uniform_precise_non_divisible() {
    let white = common::uniform(9, 9, [255, 255, 255, 255]);
    let black = common::uniform(9, 9, [0, 0, 0, 255]);
    assert_eq!(hex(4, &white, false), "ffff");
    assert_eq!(hex(4, &black, false), "0000");
}

#[test]
fn test_precise_known_hash() {
    // 10x7 does not divide into a 4x4 grid, so pixels are split across cells
    let img = image::RgbaImage::from_fn(10, 7, |x, y| {
        let v = ((x * 25 + y * 30) % 256) as u8;
        image::Rgba([v, v, v, 255])
    });
    assert_eq!(hex(4, &img, false), "36cc");
}

#[test]
fn test_hash_length_is_bits_squared() {
    let img = common::scene(50, 37);
    for bits in [4u32, 8, 16] {
        for quick in [true, false] {
            let hash = blockhash(bits, &PixelBuffer::from(&img), quick, false).unwrap();
            assert_eq!(hash.len(), (bits * bits) as usize);
            assert_eq!(hash.to_hex().unwrap().len(), (bits * bits / 4) as usize);
        }
    }
}

#[test]
fn test_rescaled_image_is_close() {
    let original = common::scene(64, 64);
    let larger = common::rescale(&original, 128, 128);
    let a = blockhash(16, &PixelBuffer::from(&original), false, false).unwrap();
    let b = blockhash(16, &PixelBuffer::from(&larger), false, false).unwrap();

    let differing = a
        .as_slice()
        .iter()
        .zip(b.as_slice())
        .filter(|(x, y)| x != y)
        .count();
    assert!(differing < 32, "{} of 256 bits differ", differing);
}

#[test]
fn test_rejects_oversized_grid() {
    let img = common::uniform(1, 1, [255, 255, 255, 255]);
    for quick in [true, false] {
        assert!(matches!(
            blockhash(65536, &PixelBuffer::from(&img), quick, false),
            Err(Error::InvalidInput(_))
        ));
    }
}

#[test]
fn test_rejects_bits_not_multiple_of_four() {
    let img = common::scene(16, 16);
    assert!(matches!(
        blockhash(10, &PixelBuffer::from(&img), true, false),
        Err(Error::InvalidInput(_))
    ));
}
