//! End-to-end wire format over the I2C transport

use embassy_futures::block_on;
use embedded_hal_async::i2c::{ErrorType, I2c, Operation};
use monoled_core::Color;
use monoled_driver::{Display, DisplayConfig, DisplayState, Error};

/// Records every write; reads return `status`
#[derive(Default)]
struct MockI2c {
    writes: Vec<(u8, Vec<u8>)>,
    status: u8,
    reads: usize,
    fail: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Nack;

impl embedded_hal_async::i2c::Error for Nack {
    fn kind(&self) -> embedded_hal_async::i2c::ErrorKind {
        embedded_hal_async::i2c::ErrorKind::NoAcknowledge(
            embedded_hal_async::i2c::NoAcknowledgeSource::Address,
        )
    }
}

impl ErrorType for MockI2c {
    type Error = Nack;
}

impl I2c for MockI2c {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Nack> {
        if self.fail {
            return Err(Nack);
        }
        for op in operations {
            match op {
                Operation::Write(bytes) => self.writes.push((address, bytes.to_vec())),
                Operation::Read(buf) => {
                    buf.fill(self.status);
                    self.reads += 1;
                }
            }
        }
        Ok(())
    }
}

#[test]
fn init_frames_every_command_and_chunks_data() {
    let config = DisplayConfig::ssd1306_128x32().with_address(0x3D);
    let mut display = Display::new_i2c(MockI2c::default(), config).unwrap();
    block_on(display.init()).unwrap();

    let i2c = display.release().release();
    assert!(i2c.writes.iter().all(|(addr, _)| *addr == 0x3D));
    assert_eq!(i2c.writes[0].1, [0x00, 0xAE]);
    assert_eq!(i2c.writes[1].1, [0x00, 0xD5]);

    let data: Vec<&Vec<u8>> = i2c
        .writes
        .iter()
        .map(|(_, bytes)| bytes)
        .filter(|bytes| bytes[0] == 0x40)
        .collect();
    // 512 bytes in 128-byte chunks, one control byte each
    assert_eq!(data.len(), 4);
    assert!(data.iter().all(|bytes| bytes.len() == 129));

    let commands = i2c.writes.iter().filter(|(_, b)| b[0] == 0x00);
    assert!(commands.clone().all(|(_, b)| b.len() == 2));
    assert!(commands.clone().any(|(_, b)| b[1] == 0xAF));
}

#[test]
fn flush_sends_window_then_bytes() {
    let mut display = Display::new_i2c(MockI2c::default(), DisplayConfig::default()).unwrap();
    block_on(display.init()).unwrap();
    display.bus_mut().inner_mut().writes.clear();

    display.draw(|c| c.pixel(7, 9, Color::On)).unwrap();
    block_on(display.flush()).unwrap();

    let i2c = display.release().release();
    let bytes: Vec<Vec<u8>> = i2c.writes.into_iter().map(|(_, b)| b).collect();
    assert_eq!(
        bytes,
        vec![
            vec![0x00, 0x21],
            vec![0x00, 7],
            vec![0x00, 7],
            vec![0x00, 0x22],
            vec![0x00, 1],
            vec![0x00, 1],
            vec![0x40, 0x02],
        ]
    );
}

#[test]
fn status_is_polled_before_transfers() {
    let mut display = Display::new_i2c(MockI2c::default(), DisplayConfig::default()).unwrap();
    block_on(display.init()).unwrap();
    display.draw(|c| c.pixel(0, 0, Color::On)).unwrap();
    block_on(display.flush()).unwrap();

    let i2c = display.release().release();
    // One poll for the post-init frame, one for the flush
    assert_eq!(i2c.reads, 2);
}

#[test]
fn bus_errors_surface_as_transport() {
    let i2c = MockI2c {
        fail: true,
        ..MockI2c::default()
    };
    let mut display = Display::new_i2c(i2c, DisplayConfig::sh1106_128x64()).unwrap();

    assert_eq!(block_on(display.init()), Err(Error::Transport(Nack)));
    assert_eq!(display.state(), DisplayState::Uninitialized);
}
