//! 24-bit bottom-up frame buffers as handed to the hash engines.
//!
//! Video frames reach the hash engines as BGR triplets, last image row
//! first, with every row padded to a multiple of 4 bytes. All offsets into
//! such a buffer go through [`row_stride`] and [`BmpFrame::row_offset`].

use std::path::Path;

use image::{ImageFormat, RgbImage};

use crate::error::{try_zeroed, Error, Result};

const BYTES_PER_PIXEL: usize = 3;

/// Bytes per stored row: `3 * width` rounded up to a multiple of 4
pub fn row_stride(width: u32) -> usize {
    let line = width as usize * BYTES_PER_PIXEL;
    line + (4 - line % 4) % 4
}

/// Owned 24-bit frame in bitmap row order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BmpFrame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl BmpFrame {
    /// Black frame
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let data = try_zeroed(row_stride(width) * height as usize)?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Wrap bottom-up, padded BGR data
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = row_stride(width) * height as usize;
        if data.len() != expected {
            return Err(Error::InvalidInput(format!(
                "frame data is {} bytes, expected {} for {}x{}",
                data.len(),
                expected,
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Convert top-down RGBA pixels; alpha is dropped
    pub fn from_rgba(rgba: &[u8], width: u32, height: u32) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(Error::InvalidInput(format!(
                "RGBA data is {} bytes, expected {} for {}x{}",
                rgba.len(),
                expected,
                width,
                height
            )));
        }

        let mut frame = Self::new(width, height)?;
        let line = width as usize * 4;
        for y in 0..height {
            let src = &rgba[y as usize * line..(y as usize + 1) * line];
            for (x, px) in src.chunks_exact(4).enumerate() {
                frame.set_pixel(x as u32, y, [px[0], px[1], px[2]])?;
            }
        }
        Ok(frame)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        row_stride(self.width)
    }

    /// Raw bottom-up padded BGR data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Offset of image row `y` (0 = top) in the bottom-up buffer
    pub fn row_offset(&self, y: u32) -> Option<usize> {
        if y >= self.height {
            return None;
        }
        Some((self.height - 1 - y) as usize * self.stride())
    }

    fn pixel_offset(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width {
            return None;
        }
        self.row_offset(y)
            .map(|row| row + x as usize * BYTES_PER_PIXEL)
    }

    /// RGB value at `(x, y)`, top-down coordinates
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        let i = self.pixel_offset(x, y)?;
        let bgr = self.data.get(i..i + BYTES_PER_PIXEL)?;
        Some([bgr[2], bgr[1], bgr[0]])
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgb: [u8; 3]) -> Result<()> {
        let i = self.pixel_offset(x, y).ok_or_else(|| {
            Error::InvalidInput(format!(
                "pixel ({}, {}) outside {}x{} frame",
                x, y, self.width, self.height
            ))
        })?;
        self.data[i] = rgb[2];
        self.data[i + 1] = rgb[1];
        self.data[i + 2] = rgb[0];
        Ok(())
    }

    /// Top-down RGBA pixels with opaque alpha
    pub fn to_rgba(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        out.try_reserve_exact(self.width as usize * self.height as usize * 4)?;
        for y in 0..self.height {
            let row = self.row_offset(y).unwrap_or_default();
            let line = &self.data[row..row + self.width as usize * BYTES_PER_PIXEL];
            for bgr in line.chunks_exact(BYTES_PER_PIXEL) {
                out.extend_from_slice(&[bgr[2], bgr[1], bgr[0], 255]);
            }
        }
        Ok(out)
    }

    /// Top-down RGB image
    pub fn to_rgb_image(&self) -> Result<RgbImage> {
        let mut raw = Vec::new();
        raw.try_reserve_exact(self.width as usize * self.height as usize * BYTES_PER_PIXEL)?;
        for y in 0..self.height {
            let row = self.row_offset(y).unwrap_or_default();
            let line = &self.data[row..row + self.width as usize * BYTES_PER_PIXEL];
            for bgr in line.chunks_exact(BYTES_PER_PIXEL) {
                raw.extend_from_slice(&[bgr[2], bgr[1], bgr[0]]);
            }
        }
        RgbImage::from_raw(self.width, self.height, raw).ok_or_else(|| {
            Error::InvalidInput(format!(
                "cannot build {}x{} RGB image from frame",
                self.width, self.height
            ))
        })
    }

    /// Write as a 24-bit `.bmp` file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.to_rgb_image()?
            .save_with_format(path.as_ref(), ImageFormat::Bmp)?;
        Ok(())
    }
}
