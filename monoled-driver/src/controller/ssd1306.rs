//! SSD1306 encoders
//!
//! Horizontal addressing mode: a column/page window is set once and the
//! data pointer wraps through it, so a full frame is a single burst.

use super::{cmd as common, Commands, ScrollArea, ScrollDirection, CLOCK_DIV_DEFAULT};
use crate::config::ControllerConfig;

/// SSD1306-only commands
pub mod cmd {
    pub const SET_MEMORY_MODE: u8 = 0x20;
    pub const SET_COLUMN_ADDR: u8 = 0x21;
    pub const SET_PAGE_ADDR: u8 = 0x22;
    pub const RIGHT_HORIZONTAL_SCROLL: u8 = 0x26;
    pub const LEFT_HORIZONTAL_SCROLL: u8 = 0x27;
    pub const VERTICAL_RIGHT_HORIZONTAL_SCROLL: u8 = 0x29;
    pub const VERTICAL_LEFT_HORIZONTAL_SCROLL: u8 = 0x2A;
    pub const DEACTIVATE_SCROLL: u8 = 0x2E;
    pub const ACTIVATE_SCROLL: u8 = 0x2F;
    pub const SET_VERTICAL_SCROLL_AREA: u8 = 0xA3;
}

/// Memory mode operand: horizontal addressing
pub const MEMORY_MODE_HORIZONTAL: u8 = 0x00;

/// Scroll step interval operand (5 frames)
const SCROLL_INTERVAL: u8 = 0x00;

pub(crate) fn init_sequence(c: &ControllerConfig, inverted: bool, out: &mut Commands) {
    out.extend(&[
        common::DISPLAY_OFF,
        common::SET_CLOCK_DIV,
        CLOCK_DIV_DEFAULT,
        common::SET_MUX_RATIO,
        c.multiplex,
        common::SET_DISPLAY_OFFSET,
        0x00,
        common::SET_START_LINE,
        common::SET_CHARGE_PUMP,
        c.charge_pump,
        cmd::SET_MEMORY_MODE,
        MEMORY_MODE_HORIZONTAL,
        common::SET_SEG_REMAP,
        common::SET_COM_SCAN_DEC,
        common::SET_COM_PINS,
        c.com_pins,
        common::SET_CONTRAST,
        c.contrast,
        common::SET_PRECHARGE,
        c.precharge,
        common::SET_VCOM_DETECT,
        c.vcom_detect,
        common::DISPLAY_RESUME_RAM,
        if inverted {
            common::SET_INVERSE
        } else {
            common::SET_NORMAL
        },
        common::DISPLAY_ON,
    ]);
}

/// Column/page window; columns are panel columns
pub(crate) fn address_window(
    c: &ControllerConfig,
    page_start: u8,
    page_end: u8,
    col_start: u8,
    col_end: u8,
    out: &mut Commands,
) {
    out.extend(&[
        cmd::SET_COLUMN_ADDR,
        c.column_offset.saturating_add(col_start),
        c.column_offset.saturating_add(col_end),
        cmd::SET_PAGE_ADDR,
        page_start,
        page_end,
    ]);
}

/// Preamble of a full-frame burst: the window covers the whole panel
pub(crate) fn full_frame_setup(c: &ControllerConfig, out: &mut Commands) {
    out.extend(&[
        cmd::SET_MEMORY_MODE,
        MEMORY_MODE_HORIZONTAL,
        common::SET_CLOCK_DIV,
        CLOCK_DIV_DEFAULT,
    ]);
    address_window(c, 0, c.pages() - 1, 0, c.width - 1, out);
}

/// Scroll setup; `None` for a diagonal scroll without a valid area
pub(crate) fn scroll(
    c: &ControllerConfig,
    direction: ScrollDirection,
    start_page: u8,
    stop_page: u8,
    area: Option<ScrollArea>,
    out: &mut Commands,
) -> Option<()> {
    let last = c.pages() - 1;
    let (a, b) = (start_page.min(last), stop_page.min(last));
    let (start, stop) = if a <= b { (a, b) } else { (b, a) };

    // Changing scroll parameters while scrolling corrupts RAM
    out.push(cmd::DEACTIVATE_SCROLL);

    match direction {
        ScrollDirection::Left | ScrollDirection::Right => {
            let op = if direction == ScrollDirection::Right {
                cmd::RIGHT_HORIZONTAL_SCROLL
            } else {
                cmd::LEFT_HORIZONTAL_SCROLL
            };
            out.extend(&[op, 0x00, start, SCROLL_INTERVAL, stop, 0x00, 0xFF]);
        }
        ScrollDirection::DiagonalLeft | ScrollDirection::DiagonalRight => {
            let area = area?;
            let rows = area.fixed_rows as u16 + area.scroll_rows as u16;
            if area.scroll_rows == 0
                || rows > c.height as u16
                || area.vertical_offset >= area.scroll_rows
            {
                return None;
            }

            let op = if direction == ScrollDirection::DiagonalRight {
                cmd::VERTICAL_RIGHT_HORIZONTAL_SCROLL
            } else {
                cmd::VERTICAL_LEFT_HORIZONTAL_SCROLL
            };
            out.extend(&[
                cmd::SET_VERTICAL_SCROLL_AREA,
                area.fixed_rows,
                area.scroll_rows,
                op,
                0x00,
                start,
                SCROLL_INTERVAL,
                stop,
                area.vertical_offset,
            ]);
        }
    }

    out.push(cmd::ACTIVATE_SCROLL);
    Some(())
}
