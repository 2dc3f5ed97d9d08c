//! Host-side bus double used by the unit tests
//!
//! Records every write and replays it into a model of the controller's
//! display RAM, so tests can compare what the panel would show with the
//! framebuffer.

use std::vec::Vec;

use monoled_hal::{DataKind, DisplayBus};

use crate::config::ControllerKind;

const RAM_COLUMNS: usize = 132;
const RAM_PAGES: usize = 8;

/// Error injected by [`RecordingBus::fail_after`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusFault;

/// One bus call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub kind: DataKind,
    pub bytes: Vec<u8>,
}

impl Record {
    pub fn command(bytes: &[u8]) -> Self {
        Self {
            kind: DataKind::Command,
            bytes: bytes.to_vec(),
        }
    }

    pub fn data(bytes: &[u8]) -> Self {
        Self {
            kind: DataKind::Data,
            bytes: bytes.to_vec(),
        }
    }
}

pub struct RecordingBus {
    kind: ControllerKind,
    records: Vec<Record>,
    /// Status bytes returned by reads, then 0x00 forever
    status: Vec<u8>,
    status_pos: usize,
    reads: usize,
    /// Writes left before every call fails
    fail_after: Option<usize>,
    ram: [[u8; RAM_COLUMNS]; RAM_PAGES],
    pending: Vec<u8>,
    col: usize,
    page: usize,
    col_window: (usize, usize),
    page_window: (usize, usize),
}

impl RecordingBus {
    pub fn new(kind: ControllerKind) -> Self {
        Self {
            kind,
            records: Vec::new(),
            status: Vec::new(),
            status_pos: 0,
            reads: 0,
            fail_after: None,
            ram: [[0; RAM_COLUMNS]; RAM_PAGES],
            pending: Vec::new(),
            col: 0,
            page: 0,
            col_window: (0, RAM_COLUMNS - 1),
            page_window: (0, RAM_PAGES - 1),
        }
    }

    /// Queue status bytes for upcoming reads
    pub fn set_status(&mut self, status: &[u8]) {
        self.status = status.to_vec();
        self.status_pos = 0;
    }

    /// Let `writes` more writes succeed, then fail every call
    pub fn fail_after(&mut self, writes: usize) {
        self.fail_after = Some(writes);
    }

    /// Stop injecting failures
    pub fn heal(&mut self) {
        self.fail_after = None;
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn clear_records(&mut self) {
        self.records.clear();
    }

    /// Number of status reads so far
    pub fn reads(&self) -> usize {
        self.reads
    }

    /// All command bytes in order
    pub fn commands(&self) -> Vec<u8> {
        self.records
            .iter()
            .filter(|r| r.kind == DataKind::Command)
            .flat_map(|r| r.bytes.iter().copied())
            .collect()
    }

    /// Number of data bytes sent
    pub fn data_len(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.kind == DataKind::Data)
            .map(|r| r.bytes.len())
            .sum()
    }

    /// Visible panel content in framebuffer layout
    pub fn visible(&self, width: usize, height: usize, offset: usize) -> Vec<u8> {
        (0..height / 8)
            .flat_map(|page| (0..width).map(move |col| (page, col + offset)))
            .map(|(page, col)| self.ram[page][col])
            .collect()
    }

    fn check(&mut self) -> Result<(), BusFault> {
        match self.fail_after {
            Some(0) => Err(BusFault),
            Some(n) => {
                self.fail_after = Some(n - 1);
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn operands(&self, op: u8) -> usize {
        match (self.kind, op) {
            (_, 0x81 | 0x8D | 0xA8 | 0xD3 | 0xD5 | 0xD9 | 0xDA | 0xDB) => 1,
            (ControllerKind::Ssd1306, 0x20) => 1,
            (ControllerKind::Ssd1306, 0x21 | 0x22 | 0xA3) => 2,
            (ControllerKind::Ssd1306, 0x26 | 0x27) => 6,
            (ControllerKind::Ssd1306, 0x29 | 0x2A) => 5,
            _ => 0,
        }
    }

    fn command_byte(&mut self, byte: u8) {
        self.pending.push(byte);
        if self.pending.len() <= self.operands(self.pending[0]) {
            return;
        }
        let cmd = core::mem::take(&mut self.pending);

        match (self.kind, cmd[0]) {
            (ControllerKind::Ssd1306, 0x21) => {
                self.col_window = (cmd[1] as usize, cmd[2] as usize);
                self.col = cmd[1] as usize;
            }
            (ControllerKind::Ssd1306, 0x22) => {
                self.page_window = (cmd[1] as usize, cmd[2] as usize);
                self.page = cmd[1] as usize;
            }
            (ControllerKind::Sh1106, op @ 0xB0..=0xB7) => self.page = (op - 0xB0) as usize,
            (ControllerKind::Sh1106, op @ 0x00..=0x0F) => {
                self.col = (self.col & 0xF0) | op as usize;
            }
            (ControllerKind::Sh1106, op @ 0x10..=0x1F) => {
                self.col = (self.col & 0x0F) | (((op & 0x0F) as usize) << 4);
            }
            _ => {}
        }
    }

    fn data_byte(&mut self, byte: u8) {
        if self.page < RAM_PAGES && self.col < RAM_COLUMNS {
            self.ram[self.page][self.col] = byte;
        }
        match self.kind {
            ControllerKind::Ssd1306 => {
                if self.col >= self.col_window.1 {
                    self.col = self.col_window.0;
                    self.page = if self.page >= self.page_window.1 {
                        self.page_window.0
                    } else {
                        self.page + 1
                    };
                } else {
                    self.col += 1;
                }
            }
            ControllerKind::Sh1106 => self.col += 1,
        }
    }
}

impl DisplayBus for RecordingBus {
    type Error = BusFault;

    async fn write(&mut self, kind: DataKind, byte: u8) -> Result<(), BusFault> {
        self.write_batch(kind, &[byte]).await
    }

    async fn write_batch(&mut self, kind: DataKind, bytes: &[u8]) -> Result<(), BusFault> {
        self.check()?;
        self.records.push(Record {
            kind,
            bytes: bytes.to_vec(),
        });
        for &b in bytes {
            match kind {
                DataKind::Command => self.command_byte(b),
                DataKind::Data => self.data_byte(b),
            }
        }
        Ok(())
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<(), BusFault> {
        if self.fail_after == Some(0) {
            return Err(BusFault);
        }
        for b in buf.iter_mut() {
            *b = self.status.get(self.status_pos).copied().unwrap_or(0);
            self.status_pos += 1;
            self.reads += 1;
        }
        Ok(())
    }
}
