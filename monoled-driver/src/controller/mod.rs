//! Controller command encoding
//!
//! Both supported controllers share the SSD130x fundamental command set
//! and differ in how display RAM is addressed:
//!
//! ```text
//! SSD1306  column window:  0x21 c0 c1  0x22 p0 p1   then data, auto-wrapping
//! SH1106   page pointer:   0xB0+p  0x0L  0x1H       then data for one page
//! ```
//!
//! Encoders only build [`Commands`]; the transfer functions are the only
//! place that touches the bus.

pub mod sh1106;
pub mod ssd1306;

use core::ops::Deref;

use heapless::Vec;
use monoled_core::{FrameBuffer, WritePlan};
use monoled_hal::{DataKind, DisplayBus};

use crate::config::{ControllerConfig, ControllerKind};

/// Commands shared by SSD1306 and SH1106
pub mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const DISPLAY_RESUME_RAM: u8 = 0xA4;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_INVERSE: u8 = 0xA7;
}

/// Oscillator frequency / clock divide ratio reset value
pub const CLOCK_DIV_DEFAULT: u8 = 0x80;

/// Longest command sequence an encoder produces
pub const MAX_COMMANDS: usize = 32;

/// Bounded list of command and operand bytes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commands(Vec<u8, MAX_COMMANDS>);

impl Commands {
    /// Empty sequence
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Append one byte
    pub fn push(&mut self, byte: u8) -> &mut Self {
        // Every encoder stays well below MAX_COMMANDS
        let _ = self.0.push(byte);
        self
    }

    /// Append several bytes
    pub fn extend(&mut self, bytes: &[u8]) -> &mut Self {
        for &b in bytes {
            self.push(b);
        }
        self
    }

    /// Encoded bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl Deref for Commands {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&[u8]> for Commands {
    fn from(bytes: &[u8]) -> Self {
        let mut c = Commands::new();
        c.extend(bytes);
        c
    }
}

/// Hardware scroll direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScrollDirection {
    Left,
    Right,
    /// Vertical and left horizontal
    DiagonalLeft,
    /// Vertical and right horizontal
    DiagonalRight,
}

impl ScrollDirection {
    /// Whether the direction includes vertical movement
    pub fn is_diagonal(self) -> bool {
        matches!(self, ScrollDirection::DiagonalLeft | ScrollDirection::DiagonalRight)
    }
}

/// Vertical scroll region for diagonal scrolling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScrollArea {
    /// Rows at the top that stay fixed
    pub fixed_rows: u8,
    /// Rows in the scrolling region
    pub scroll_rows: u8,
    /// Rows moved per scroll step
    pub vertical_offset: u8,
}

/// Controller strategy, selected once from the resolved config
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Controller {
    Ssd1306(ControllerConfig),
    Sh1106(ControllerConfig),
}

impl Controller {
    /// Pick the strategy for a resolved config
    pub fn new(config: ControllerConfig) -> Self {
        match config.kind {
            ControllerKind::Ssd1306 => Controller::Ssd1306(config),
            ControllerKind::Sh1106 => Controller::Sh1106(config),
        }
    }

    /// Resolved parameters
    pub fn config(&self) -> &ControllerConfig {
        match self {
            Controller::Ssd1306(c) | Controller::Sh1106(c) => c,
        }
    }

    /// Whether hardware scrolling is available
    pub fn supports_scroll(&self) -> bool {
        self.config().hardware_scroll
    }

    /// Full init sequence, ending with the panel switched on
    pub fn init_sequence(&self, inverted: bool) -> Commands {
        let mut out = Commands::new();
        match self {
            Controller::Ssd1306(c) => ssd1306::init_sequence(c, inverted, &mut out),
            Controller::Sh1106(c) => sh1106::init_sequence(c, inverted, &mut out),
        }
        out
    }

    /// Switch the panel on or off
    pub fn power(&self, on: bool) -> Commands {
        let mut out = Commands::new();
        out.push(if on { cmd::DISPLAY_ON } else { cmd::DISPLAY_OFF });
        out
    }

    /// Set the contrast
    pub fn contrast(&self, value: u8) -> Commands {
        let mut out = Commands::new();
        out.extend(&[cmd::SET_CONTRAST, value]);
        out
    }

    /// Drop the contrast to zero, or restore the configured level
    pub fn dim(&self, dim: bool) -> Commands {
        self.contrast(if dim { 0 } else { self.config().contrast })
    }

    /// Inverted or normal pixel polarity
    pub fn invert(&self, inverted: bool) -> Commands {
        let mut out = Commands::new();
        out.push(if inverted {
            cmd::SET_INVERSE
        } else {
            cmd::SET_NORMAL
        });
        out
    }

    /// Point the RAM write pointer at a run of columns on one page
    ///
    /// Column numbers are panel columns; the RAM offset is added here.
    pub fn address_window(&self, page: u8, col_start: u8, col_end: u8) -> Commands {
        let mut out = Commands::new();
        match self {
            Controller::Ssd1306(c) => {
                ssd1306::address_window(c, page, page, col_start, col_end, &mut out)
            }
            Controller::Sh1106(c) => sh1106::address_window(c, page, col_start, &mut out),
        }
        out
    }

    /// Start a hardware scroll over pages `start_page..=stop_page`
    ///
    /// `None` if the controller cannot scroll or the request is incomplete
    /// (diagonal scrolling needs a [`ScrollArea`]).
    pub fn start_scroll(
        &self,
        direction: ScrollDirection,
        start_page: u8,
        stop_page: u8,
        area: Option<ScrollArea>,
    ) -> Option<Commands> {
        match self {
            Controller::Ssd1306(c) if c.hardware_scroll => {
                let mut out = Commands::new();
                ssd1306::scroll(c, direction, start_page, stop_page, area, &mut out)?;
                Some(out)
            }
            _ => None,
        }
    }

    /// Stop a hardware scroll; `None` if the controller cannot scroll
    pub fn stop_scroll(&self) -> Option<Commands> {
        match self {
            Controller::Ssd1306(c) if c.hardware_scroll => {
                let mut out = Commands::new();
                out.push(ssd1306::cmd::DEACTIVATE_SCROLL);
                Some(out)
            }
            _ => None,
        }
    }

    /// Send the whole framebuffer
    pub async fn full_frame_transfer<B: DisplayBus>(
        &self,
        bus: &mut B,
        buffer: &FrameBuffer,
    ) -> Result<(), B::Error> {
        match self {
            Controller::Ssd1306(c) => {
                let mut setup = Commands::new();
                ssd1306::full_frame_setup(c, &mut setup);
                bus.write_batch(DataKind::Command, &setup).await?;
                bus.write_batch(DataKind::Data, buffer.raw()).await
            }
            Controller::Sh1106(_) => {
                let width = buffer.width();
                for page in 0..buffer.pages() {
                    let window = self.address_window(page as u8, 0, (width - 1) as u8);
                    bus.write_batch(DataKind::Command, &window).await?;
                    bus.write_batch(DataKind::Data, buffer.page_slice(page, 0, width))
                        .await?;
                }
                Ok(())
            }
        }
    }

    /// Send what a write plan asks for
    pub async fn partial_transfer<B: DisplayBus>(
        &self,
        bus: &mut B,
        buffer: &FrameBuffer,
        plan: &WritePlan,
    ) -> Result<(), B::Error> {
        if plan.is_full() {
            return self.full_frame_transfer(bus, buffer).await;
        }

        for range in plan.ranges() {
            let window = self.address_window(range.page, range.col_start, range.col_end());
            bus.write_batch(DataKind::Command, &window).await?;
            let bytes = buffer.page_slice(
                range.page as usize,
                range.col_start as usize,
                range.len as usize,
            );
            bus.write_batch(DataKind::Data, bytes).await?;
        }
        Ok(())
    }
}
