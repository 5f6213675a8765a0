//! Decoding of image files into pixel buffers and of animations into
//! frame sources.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, RgbaImage};
use log::debug;

use crate::error::{Error, Result};
use crate::processing::frame::BmpFrame;
use crate::processing::video::FrameSource;

/// Decode an image file to 8-bit RGBA, guessing the format from content.
pub fn load_rgba<P: AsRef<Path>>(path: P) -> Result<RgbaImage> {
    let path_ref = path.as_ref();
    let reader = image::io::Reader::open(path_ref)?.with_guessed_format()?;
    if reader.format().is_none() {
        return Err(Error::UnsupportedFormat(format!(
            "unrecognised image format: {}",
            path_ref.display()
        )));
    }
    let img = reader.decode()?;
    debug!(
        "Decoded {} ({}x{})",
        path_ref.display(),
        img.width(),
        img.height()
    );
    Ok(img.to_rgba8())
}

/// Whether the file extension names an animation container we can sample
pub fn is_animation<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("gif"))
        .unwrap_or(false)
}

/// Frames of an animated GIF, fully decoded and composited up front
pub struct AnimationSource {
    frames: Vec<RgbaImage>,
}

impl AnimationSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let source = Self::from_reader(BufReader::new(file))?;
        debug!(
            "Decoded {} animation frames from {}",
            source.frames.len(),
            path.as_ref().display()
        );
        Ok(source)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        let decoder = GifDecoder::new(reader)?;
        let frames = decoder
            .into_frames()
            .collect_frames()?
            .into_iter()
            .map(|frame| frame.into_buffer())
            .collect();
        Ok(Self { frames })
    }

    /// Build from already decoded frames
    pub fn from_frames(frames: Vec<RgbaImage>) -> Self {
        Self { frames }
    }
}

impl FrameSource for AnimationSource {
    fn frame_count(&mut self) -> Result<u64> {
        Ok(self.frames.len() as u64)
    }

    fn decode_frame(&mut self, index: u64) -> Result<BmpFrame> {
        let frame = usize::try_from(index)
            .ok()
            .and_then(|i| self.frames.get(i))
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "frame {} out of range, animation has {} frames",
                    index,
                    self.frames.len()
                ))
            })?;
        BmpFrame::from_rgba(frame.as_raw(), frame.width(), frame.height())
    }
}
