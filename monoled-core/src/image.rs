//! RGBA image source
//!
//! Decoded images are handed to the core as raw RGBA bytes (4 per pixel,
//! row-major). The core only reads them.

/// Borrowed RGBA pixel data
#[derive(Debug, Clone, Copy)]
pub struct RgbaImage<'a> {
    width: usize,
    height: usize,
    data: &'a [u8],
}

impl<'a> RgbaImage<'a> {
    /// Bytes per pixel
    pub const CHANNELS: usize = 4;

    /// Wrap RGBA data; `None` if `data` is shorter than `width * height * 4`
    pub fn new(width: usize, height: usize, data: &'a [u8]) -> Option<Self> {
        if data.len() < width * height * Self::CHANNELS {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// `[r, g, b, a]` of a pixel
    pub fn rgba(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * Self::CHANNELS;
        let px = self.data.get(i..i + Self::CHANNELS)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Monochrome reading of a pixel
    ///
    /// `None` for fully transparent pixels (alpha 0), which leave the
    /// destination untouched; otherwise lit iff any color channel is nonzero.
    pub fn pixel_on(&self, x: usize, y: usize) -> Option<bool> {
        let [r, g, b, a] = self.rgba(x, y)?;
        if a == 0 {
            return None;
        }
        Some((r | g | b) != 0)
    }
}
