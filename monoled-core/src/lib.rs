//! Board-agnostic display core for monochrome OLED panels
//!
//! This crate contains everything that does not depend on a specific
//! controller or bus:
//!
//! - Bit-packed page-organized framebuffer
//! - Dirty byte tracking and write-plan coalescing
//! - Drawing primitives (pixels, lines, rectangles, circles, text, images)
//! - Color, font and image source types
//!
//! Controller command encoding and bus I/O live in `monoled-driver`.

#![no_std]
#![deny(unsafe_code)]

pub mod canvas;
pub mod color;
pub mod dirty;
pub mod font;
pub mod framebuffer;
pub mod image;

// Re-export key types
pub use canvas::{Canvas, Cursor};
pub use color::Color;
pub use dirty::{DirtyTracker, WritePlan, WriteRange, FULL_UPDATE_RATIO};
pub use font::{Font, FONT_5X7};
pub use framebuffer::{FrameBuffer, MAX_BUFFER_LEN};
pub use image::RgbaImage;
