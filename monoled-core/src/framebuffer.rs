//! Bit-packed framebuffer
//!
//! Pixels are organized the way OLED controllers lay out their RAM: the
//! panel is split into pages of 8 rows, and each byte holds one column of
//! a page with the top row in bit 0.
//!
//! ```text
//! byte index = x + width * (y / 8)
//! bit        = y % 8
//! ```

use crate::color::Color;

/// Largest supported panel (128x64)
pub const MAX_BUFFER_LEN: usize = 128 * 64 / 8;

/// Rows per page
pub const PAGE_HEIGHT: usize = 8;

/// Page-organized 1bpp framebuffer
#[derive(Clone)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    len: usize,
    bytes: [u8; MAX_BUFFER_LEN],
}

impl FrameBuffer {
    /// Create a cleared framebuffer
    ///
    /// Returns `None` if the height is not a whole number of pages or the
    /// panel does not fit in [`MAX_BUFFER_LEN`].
    pub fn new(width: usize, height: usize) -> Option<Self> {
        if width == 0 || height == 0 || height % PAGE_HEIGHT != 0 {
            return None;
        }
        let len = width * height / PAGE_HEIGHT;
        if len > MAX_BUFFER_LEN {
            return None;
        }
        Some(Self {
            width,
            height,
            len,
            bytes: [0; MAX_BUFFER_LEN],
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

    /// Number of 8-row pages
    pub fn pages(&self) -> usize {
        self.height / PAGE_HEIGHT
    }

    /// Buffer length in bytes (`width * height / 8`)
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false for a constructed buffer
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Byte index and bit mask for a pixel, or `None` if off-panel
    pub fn locate(&self, x: i32, y: i32) -> Option<(usize, u8)> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = x + self.width * (y / PAGE_HEIGHT);
        Some((idx, 1 << (y % PAGE_HEIGHT)))
    }

    /// Set or clear a pixel
    ///
    /// Off-panel coordinates are ignored. Returns whether the backing byte
    /// actually changed.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) -> bool {
        let Some((idx, mask)) = self.locate(x, y) else {
            return false;
        };
        let old = self.bytes[idx];
        let new = if color.is_on() { old | mask } else { old & !mask };
        self.bytes[idx] = new;
        new != old
    }

    /// Read a pixel; off-panel pixels read as off
    pub fn get_pixel(&self, x: i32, y: i32) -> bool {
        self.locate(x, y)
            .map(|(idx, mask)| self.bytes[idx] & mask != 0)
            .unwrap_or(false)
    }

    /// Fill every pixel with one color
    pub fn clear(&mut self, color: Color) {
        let fill = if color.is_on() { 0xFF } else { 0x00 };
        self.bytes[..self.len].fill(fill);
    }

    /// Byte at `idx`, or 0 past the end
    pub fn byte(&self, idx: usize) -> u8 {
        self.raw().get(idx).copied().unwrap_or(0)
    }

    /// Overwrite a whole byte; returns whether it changed
    pub fn set_byte(&mut self, idx: usize, value: u8) -> bool {
        match self.bytes[..self.len].get_mut(idx) {
            Some(b) if *b != value => {
                *b = value;
                true
            }
            _ => false,
        }
    }

    /// The packed buffer, for full-frame transfers
    pub fn raw(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Bytes of one page row starting at `col`
    pub fn page_slice(&self, page: usize, col: usize, len: usize) -> &[u8] {
        let start = page * self.width + col;
        let end = (start + len).min(self.len);
        self.raw().get(start..end).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions() {
        let fb = FrameBuffer::new(128, 64).unwrap();
        assert_eq!(fb.len(), 1024);
        assert_eq!(fb.pages(), 8);

        let fb = FrameBuffer::new(96, 16).unwrap();
        assert_eq!(fb.len(), 192);
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(FrameBuffer::new(128, 60).is_none());
        assert!(FrameBuffer::new(0, 64).is_none());
        assert!(FrameBuffer::new(256, 64).is_none());
    }

    #[test]
    fn test_pixel_layout() {
        let mut fb = FrameBuffer::new(128, 64).unwrap();
        assert!(fb.set_pixel(3, 10, Color::On));
        // page 1, bit 2
        assert_eq!(fb.byte(128 + 3), 0b0000_0100);
        assert!(fb.get_pixel(3, 10));
    }

    #[test]
    fn test_set_pixel_reports_change() {
        let mut fb = FrameBuffer::new(128, 32).unwrap();
        assert!(fb.set_pixel(0, 0, Color::On));
        assert!(!fb.set_pixel(0, 0, Color::On));
        assert!(fb.set_pixel(0, 0, Color::Off));
        assert!(!fb.set_pixel(0, 0, Color::Off));
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let mut fb = FrameBuffer::new(128, 32).unwrap();
        assert!(!fb.set_pixel(-1, 0, Color::On));
        assert!(!fb.set_pixel(128, 0, Color::On));
        assert!(!fb.set_pixel(0, 32, Color::On));
        assert!(fb.raw().iter().all(|&b| b == 0));
        assert!(!fb.get_pixel(500, 500));
    }

    #[test]
    fn test_clear() {
        let mut fb = FrameBuffer::new(64, 48).unwrap();
        fb.clear(Color::On);
        assert!(fb.raw().iter().all(|&b| b == 0xFF));
        fb.clear(Color::Off);
        assert!(fb.raw().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_page_slice() {
        let mut fb = FrameBuffer::new(128, 64).unwrap();
        fb.set_byte(2 * 128 + 5, 0xAB);
        assert_eq!(fb.page_slice(2, 5, 2), &[0xAB, 0x00]);
        assert!(fb.page_slice(9, 0, 4).is_empty());
    }
}
