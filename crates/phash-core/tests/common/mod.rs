//! In-memory test images. Nothing is read from fixtures on disk.
#![allow(dead_code)]

use std::fs::File;
use std::path::{Path, PathBuf};

use image::codecs::gif::GifEncoder;
use image::{imageops, Frame, Rgba, RgbaImage};

/// Smooth blobs over a bright rectangle: enough structure for every
/// algorithm to produce a non-trivial hash.
pub fn scene(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let fx = x as f32 / width as f32;
        let fy = y as f32 / height as f32;
        let wave = ((fx * 7.0).sin() * (fy * 5.0).cos() + 1.0) * 90.0;
        let rect = if (0.2..0.5).contains(&fx) && (0.3..0.8).contains(&fy) {
            60.0
        } else {
            0.0
        };
        let v = (wave + rect).min(255.0) as u8;
        Rgba([v, (v as u16 * 3 / 4) as u8, 255 - v, 255])
    })
}

/// A second, unrelated pattern
pub fn stripes(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let v = if ((x + 2 * y) / 6) % 2 == 0 { 220 } else { 30 };
        Rgba([v, v, v, 255])
    })
}

pub fn uniform(width: u32, height: u32, px: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(px))
}

/// Resample with a triangle filter
pub fn rescale(img: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    imageops::resize(img, width, height, imageops::FilterType::Triangle)
}

/// Add `delta` to every colour channel, saturating
pub fn brighten(img: &RgbaImage, delta: u8) -> RgbaImage {
    let mut out = img.clone();
    for px in out.pixels_mut() {
        for c in 0..3 {
            px.0[c] = px.0[c].saturating_add(delta);
        }
    }
    out
}

/// Save `img` as PNG under `dir`
pub fn write_png(dir: &Path, name: &str, img: &RgbaImage) -> PathBuf {
    let path = dir.join(name);
    img.save(&path).unwrap();
    path
}

/// Save `frames` as an animated GIF
pub fn write_gif(path: &Path, frames: &[RgbaImage]) {
    let file = File::create(path).unwrap();
    let mut encoder = GifEncoder::new(file);
    encoder
        .encode_frames(frames.iter().cloned().map(Frame::new))
        .unwrap();
}

/// Frames whose bright band moves right as the index grows
pub fn moving_band(count: u32, width: u32, height: u32) -> Vec<RgbaImage> {
    (0..count)
        .map(|i| {
            RgbaImage::from_fn(width, height, |x, _| {
                let start = i * width / count.max(1);
                let v = if x >= start && x < start + width / 4 { 230 } else { 20 };
                Rgba([v, v, v, 255])
            })
        })
        .collect()
}
