//! RGBA frame buffers and the regions detection can be restricted to

use crate::Result;
use anyhow::Context;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Resolution frames are captured at before detection
pub const DEFAULT_DISPLAY_WIDTH: u32 = 800;
pub const DEFAULT_DISPLAY_HEIGHT: u32 = 450;

/// A width x height RGBA raster, 4 bytes per pixel, rows top to bottom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl FrameBuffer {
    /// Wrap raw bytes. The length is not checked here; see [`is_readable`].
    ///
    /// [`is_readable`]: FrameBuffer::is_readable
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Self { width, height, rgba }
    }

    /// Frame filled with a single color
    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixels = width as usize * height as usize;
        Self::new(width, height, color.repeat(pixels))
    }

    pub fn from_rgba_image(image: image::RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(width, height, image.into_raw())
    }

    /// Load an image file scaled to the display resolution, the same view a
    /// user annotates on
    pub fn load<P: AsRef<Path>>(path: P, display_width: u32, display_height: u32) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path)
            .with_context(|| format!("Failed to open image: {:?}", path))?
            .resize_exact(display_width, display_height, FilterType::Triangle)
            .to_rgba8();
        Ok(Self::from_rgba_image(image))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.rgba
    }

    /// Non-empty, with exactly `width * height * 4` bytes
    pub fn is_readable(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.rgba.len() == self.width as usize * self.height as usize * 4
    }
}

/// A rectangle in frame coordinates; may reach outside the frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A region clamped to whole pixels inside a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Region {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Clamp to a `frame_width` x `frame_height` frame. `None` when nothing
    /// of the region lies inside it.
    pub fn clamp(&self, frame_width: usize, frame_height: usize) -> Option<PixelRect> {
        if ![self.x, self.y, self.width, self.height].iter().all(|v| v.is_finite()) {
            return None;
        }
        let x = self.x.floor().max(0.0);
        let y = self.y.floor().max(0.0);
        let width = (frame_width as f64 - x).min(self.width.floor());
        let height = (frame_height as f64 - y).min(self.height.floor());
        if width < 1.0 || height < 1.0 {
            return None;
        }
        Some(PixelRect {
            x: x as usize,
            y: y as usize,
            width: width as usize,
            height: height as usize,
        })
    }
}

impl FromStr for Region {
    type Err = String;

    /// Parses `x,y,width,height`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| format!("invalid region '{}': {}", s, e))?;
        match values.as_slice() {
            [x, y, width, height] => Ok(Region::new(*x, *y, *width, *height)),
            _ => Err(format!("invalid region '{}': expected x,y,width,height", s)),
        }
    }
}
