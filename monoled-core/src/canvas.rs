//! Drawing engine
//!
//! A [`Canvas`] owns the framebuffer and its dirty set. Every primitive
//! writes through [`Canvas::pixel`] (or whole bytes, for images), so the
//! dirty set only ever holds bytes whose value actually changed.
//!
//! Drawing never fails: anything outside the panel is clipped.

use crate::color::Color;
use crate::dirty::{DirtyTracker, WritePlan};
use crate::font::Font;
use crate::framebuffer::{FrameBuffer, PAGE_HEIGHT};
use crate::image::RgbaImage;

/// Default horizontal gap between glyphs, in pixels
pub const LETTER_SPACING: i32 = 1;

/// Default vertical gap between text lines, in pixels
pub const LINE_SPACING: i32 = 1;

/// Text insertion point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cursor {
    pub x: i32,
    pub y: i32,
}

/// Framebuffer plus dirty tracking plus drawing primitives
#[derive(Clone)]
pub struct Canvas {
    buffer: FrameBuffer,
    dirty: DirtyTracker,
    cursor: Cursor,
    letter_spacing: i32,
    line_spacing: i32,
}

impl Canvas {
    /// Create a cleared canvas; `None` for unsupported dimensions
    pub fn new(width: usize, height: usize) -> Option<Self> {
        let buffer = FrameBuffer::new(width, height)?;
        let dirty = DirtyTracker::new(width, buffer.len());
        Some(Self {
            buffer,
            dirty,
            cursor: Cursor::default(),
            letter_spacing: LETTER_SPACING,
            line_spacing: LINE_SPACING,
        })
    }

    pub fn width(&self) -> usize {
        self.buffer.width()
    }

    pub fn height(&self) -> usize {
        self.buffer.height()
    }

    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    pub fn dirty(&self) -> &DirtyTracker {
        &self.dirty
    }

    /// Coalesced plan for the bytes changed since the last flush
    pub fn write_plan(&self) -> WritePlan {
        self.dirty.plan()
    }

    /// Forget pending bytes after a successful flush
    pub fn mark_clean(&mut self) {
        self.dirty.clear();
    }

    /// Queue the whole buffer for the next flush
    pub fn mark_all_dirty(&mut self) {
        self.dirty.mark_all();
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Move the text cursor
    pub fn set_cursor(&mut self, x: i32, y: i32) {
        self.cursor = Cursor { x, y };
    }

    /// Override glyph and line spacing used by [`write_string`](Self::write_string)
    pub fn set_spacing(&mut self, letter: i32, line: i32) {
        self.letter_spacing = letter;
        self.line_spacing = line;
    }

    /// Set one pixel, marking its byte if it changed
    pub fn pixel(&mut self, x: i32, y: i32, color: Color) {
        if self.buffer.set_pixel(x, y, color) {
            if let Some((idx, _)) = self.buffer.locate(x, y) {
                self.dirty.mark(idx);
            }
        }
    }

    /// Set a batch of pixels
    pub fn pixels(&mut self, pixels: &[(i32, i32, Color)]) {
        for &(x, y, color) in pixels {
            self.pixel(x, y, color);
        }
    }

    /// Fill the panel with one color
    pub fn clear(&mut self, color: Color) {
        let fill = if color.is_on() { 0xFF } else { 0x00 };
        for idx in 0..self.buffer.len() {
            if self.buffer.set_byte(idx, fill) {
                self.dirty.mark(idx);
            }
        }
    }

    /// Bresenham line between two points, both ends inclusive
    ///
    /// The walk stops early once it has left the panel for good, since
    /// both coordinates move monotonically toward the end point.
    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let (mut x0, mut y0) = (i64::from(x0), i64::from(y0));
        let (x1, y1) = (i64::from(x1), i64::from(y1));
        let (width, height) = (self.buffer.width() as i64, self.buffer.height() as i64);

        let dx = (x1 - x0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let dy = (y1 - y0).abs();
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = (if dx > dy { dx } else { -dy }) / 2;

        loop {
            self.plot(x0, y0, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let past_x = (sx > 0 && x0 >= width) || (sx < 0 && x0 < 0);
            let past_y = (sy > 0 && y0 >= height) || (sy < 0 && y0 < 0);
            if past_x || past_y {
                break;
            }
            let e2 = err;
            if e2 > -dx {
                err -= dy;
                x0 += sx;
            }
            if e2 < dy {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Filled rectangle, drawn as `w` vertical lines of height `h`
    ///
    /// Columns and rows are clipped to the panel first; a vertical line's
    /// on-panel pixels do not depend on where its ends lie.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        if w <= 0 || h <= 0 {
            return;
        }
        let (width, height) = (self.buffer.width() as i32, self.buffer.height() as i32);
        let top = y.max(0);
        let bottom = y.saturating_add(h - 1).min(height - 1);
        if top > bottom {
            return;
        }
        for i in x.max(0)..x.saturating_add(w).min(width) {
            self.line(i, top, i, bottom, color);
        }
    }

    /// Rectangle outline
    pub fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        if w <= 0 || h <= 0 {
            return;
        }
        let (right, bottom) = (x.saturating_add(w - 1), y.saturating_add(h - 1));
        self.line(x, y, right, y, color);
        self.line(x, bottom, right, bottom, color);
        self.line(x, y, x, bottom, color);
        self.line(right, y, right, bottom, color);
    }

    /// Circle outline (midpoint algorithm)
    pub fn draw_circle(&mut self, x0: i32, y0: i32, r: i32, color: Color) {
        if r < 0 {
            return;
        }
        let (x0, y0, r) = (i64::from(x0), i64::from(y0), i64::from(r));
        let mut f = 1 - r;
        let mut ddf_x = 1;
        let mut ddf_y = -2 * r;
        let mut x = 0;
        let mut y = r;

        self.plot(x0, y0 + r, color);
        self.plot(x0, y0 - r, color);
        self.plot(x0 + r, y0, color);
        self.plot(x0 - r, y0, color);

        while x < y {
            if f >= 0 {
                y -= 1;
                ddf_y += 2;
                f += ddf_y;
            }
            x += 1;
            ddf_x += 2;
            f += ddf_x;

            self.plot(x0 + x, y0 + y, color);
            self.plot(x0 - x, y0 + y, color);
            self.plot(x0 + x, y0 - y, color);
            self.plot(x0 - x, y0 - y, color);
            self.plot(x0 + y, y0 + x, color);
            self.plot(x0 - y, y0 + x, color);
            self.plot(x0 + y, y0 - x, color);
            self.plot(x0 - y, y0 - x, color);
        }
    }

    /// [`pixel`](Self::pixel) for widened coordinates; anything outside
    /// `i32` is off the panel
    fn plot(&mut self, x: i64, y: i64, color: Color) {
        if let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) {
            self.pixel(x, y, color);
        }
    }

    /// Lay out and draw text at the cursor
    ///
    /// Text is split on spaces; every word but the last keeps its trailing
    /// space. With `wrap`, a word that does not fit in the remaining width
    /// starts a new line, and a glyph that does not fit breaks the word.
    /// `'\n'` always breaks the line. Set glyph bits draw `color`, clear
    /// bits draw its inverse.
    pub fn write_string(&mut self, font: &Font<'_>, size: u8, text: &str, color: Color, wrap: bool) {
        let size = i32::from(size.max(1));
        let glyph_w = i32::from(font.width) * size;
        let advance = glyph_w + self.letter_spacing;
        let line_height = i32::from(font.height) * size + self.line_spacing;
        let width = self.buffer.width() as i32;

        let word_count = text.split(' ').count();
        for (w, word) in text.split(' ').enumerate() {
            let keep_space = w + 1 < word_count;
            let trailing = keep_space.then_some(' ');

            let glyphs = word.chars().take_while(|&c| c != '\n').count() + keep_space as usize;
            let word_width = glyphs as i32 * advance - self.letter_spacing;
            if wrap && self.cursor.x > 0 && width.saturating_sub(self.cursor.x) < word_width {
                self.line_break(line_height);
            }

            for ch in word.chars().chain(trailing) {
                if ch == '\n' {
                    self.line_break(line_height);
                    continue;
                }
                if wrap && self.cursor.x > 0 && width.saturating_sub(self.cursor.x) < glyph_w {
                    self.line_break(line_height);
                }
                self.draw_glyph(font, size, ch, color);
                self.cursor.x = self.cursor.x.saturating_add(advance);
                if wrap && width.saturating_sub(self.cursor.x) < glyph_w {
                    self.line_break(line_height);
                }
            }
        }
    }

    fn line_break(&mut self, line_height: i32) {
        self.cursor.x = 0;
        self.cursor.y = self.cursor.y.saturating_add(line_height);
    }

    fn draw_glyph(&mut self, font: &Font<'_>, size: i32, ch: char, color: Color) {
        let Cursor { x, y } = self.cursor;
        for (i, &column) in font.glyph(ch).iter().enumerate() {
            let i = i as i32;
            for j in 0..font.height {
                let c = if Font::column_bit(column, j) {
                    color
                } else {
                    color.invert()
                };
                let j = i32::from(j);
                if size == 1 {
                    self.pixel(x.saturating_add(i), y.saturating_add(j), c);
                } else {
                    let (px, py) = (x.saturating_add(i * size), y.saturating_add(j * size));
                    self.fill_rect(px, py, size, size, c);
                }
            }
        }
    }

    /// Composite an RGBA image with its top-left corner at (dx, dy)
    ///
    /// Transparent pixels (alpha 0) leave the destination alone; any other
    /// pixel is lit iff one of its color channels is nonzero. Each
    /// destination byte is read, updated for all its rows, and written back
    /// once.
    pub fn draw_rgba_image(&mut self, image: &RgbaImage<'_>, dx: i32, dy: i32) {
        let width = self.buffer.width() as i32;
        let height = self.buffer.height() as i32;

        for x in 0..image.width() {
            let dst_x = dx.saturating_add(x as i32);
            if dst_x < 0 || dst_x >= width {
                continue;
            }

            // (byte index, accumulated value) of the page being built
            let mut pending: Option<(usize, u8)> = None;
            for y in 0..image.height() {
                let dst_y = dy.saturating_add(y as i32);
                if dst_y < 0 || dst_y >= height {
                    continue;
                }
                let Some(on) = image.pixel_on(x, y) else {
                    continue;
                };

                let idx = dst_x as usize + self.buffer.width() * (dst_y as usize / PAGE_HEIGHT);
                let mask = 1u8 << (dst_y as usize % PAGE_HEIGHT);

                let byte = match pending {
                    Some((pending_idx, byte)) if pending_idx == idx => byte,
                    other => {
                        if let Some((prev_idx, prev)) = other {
                            self.store_byte(prev_idx, prev);
                        }
                        self.buffer.byte(idx)
                    }
                };
                let byte = if on { byte | mask } else { byte & !mask };
                pending = Some((idx, byte));
            }
            if let Some((idx, byte)) = pending {
                self.store_byte(idx, byte);
            }
        }
    }

    fn store_byte(&mut self, idx: usize, value: u8) {
        if self.buffer.set_byte(idx, value) {
            self.dirty.mark(idx);
        }
    }

    /// Draw a row-major `width * height` pixel array
    pub fn draw_bitmap<I, C>(&mut self, pixels: I)
    where
        I: IntoIterator<Item = C>,
        C: Into<Color>,
    {
        let width = self.buffer.width();
        let total = width * self.buffer.height();
        for (i, c) in pixels.into_iter().take(total).enumerate() {
            self.pixel((i % width) as i32, (i / width) as i32, c.into());
        }
    }
}
