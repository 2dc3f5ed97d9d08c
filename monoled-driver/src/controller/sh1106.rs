//! SH1106 encoders
//!
//! The SH1106 has 132 columns of RAM and no auto-incrementing window:
//! every write sets a page and a column split into two nibble commands,
//! and the data pointer never leaves the page.

use super::{cmd as common, Commands, CLOCK_DIV_DEFAULT};
use crate::config::ControllerConfig;

/// SH1106-only commands
pub mod cmd {
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    pub const SET_PAGE_ADDR: u8 = 0xB0;
}

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
        if inverted {
            common::SET_INVERSE
        } else {
            common::SET_NORMAL
        },
        common::DISPLAY_ON,
    ]);
}

/// Low and high column commands for a panel column
pub fn column_nibbles(c: &ControllerConfig, col: u8) -> (u8, u8) {
    let col = (col & 0x7F) + c.column_offset;
    (
        cmd::SET_LOW_COLUMN | (col & 0x0F),
        cmd::SET_HIGH_COLUMN | (col >> 4),
    )
}

/// Page and column pointer; data written after it stays on `page`
pub(crate) fn address_window(c: &ControllerConfig, page: u8, col_start: u8, out: &mut Commands) {
    let (low, high) = column_nibbles(c, col_start);
    out.extend(&[cmd::SET_PAGE_ADDR + page, low, high]);
}
