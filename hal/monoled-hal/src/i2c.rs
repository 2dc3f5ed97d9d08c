//! I2C transport
//!
//! Implements [`DisplayBus`] on top of any `embedded_hal_async` I2C master.
//! Each command byte travels in its own `[0x00, cmd]` write; data bursts
//! are sent as `[0x40, payload...]` writes of at most [`MAX_CHUNK`] bytes.

use embedded_hal_async::i2c::I2c;

use crate::bus::{DataKind, DisplayBus};

/// Default 7-bit address of SSD1306/SH1106 modules (0x3D when SA0 is high)
pub const DEFAULT_ADDRESS: u8 = 0x3C;

/// Largest data payload carried by a single I2C write
pub const MAX_CHUNK: usize = 128;

/// I2C transport configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cConfig {
    /// 7-bit device address
    pub address: u8,
    /// Data bytes per write transaction (1..=MAX_CHUNK)
    pub chunk_size: usize,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self::with_address(DEFAULT_ADDRESS)
    }
}

impl I2cConfig {
    /// Config for a device at the given address
    pub const fn with_address(address: u8) -> Self {
        Self {
            address,
            chunk_size: MAX_CHUNK,
        }
    }

    /// Payload size actually used per write, clamped to the stack buffer
    pub fn effective_chunk(&self) -> usize {
        self.chunk_size.clamp(1, MAX_CHUNK)
    }
}

/// [`DisplayBus`] over an async I2C master
pub struct I2cBus<I2C> {
    i2c: I2C,
    config: I2cConfig,
}

impl<I2C> I2cBus<I2C>
where
    I2C: I2c,
{
    /// Create a transport with the default address (0x3C)
    pub fn new(i2c: I2C) -> Self {
        Self::with_config(i2c, I2cConfig::default())
    }

    /// Create a transport with explicit configuration
    pub fn with_config(i2c: I2C, config: I2cConfig) -> Self {
        Self { i2c, config }
    }

    /// Transport configuration
    pub fn config(&self) -> &I2cConfig {
        &self.config
    }

    /// The underlying I2C peripheral
    pub fn inner_mut(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    /// Release the underlying I2C peripheral
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> DisplayBus for I2cBus<I2C>
where
    I2C: I2c,
{
    type Error = I2C::Error;

    async fn write(&mut self, kind: DataKind, byte: u8) -> Result<(), Self::Error> {
        self.i2c
            .write(self.config.address, &[kind.control_byte(), byte])
            .await
    }

    async fn write_batch(&mut self, kind: DataKind, bytes: &[u8]) -> Result<(), Self::Error> {
        match kind {
            DataKind::Command => {
                for &b in bytes {
                    self.write(DataKind::Command, b).await?;
                }
            }
            DataKind::Data => {
                let mut frame = [0u8; MAX_CHUNK + 1];
                frame[0] = kind.control_byte();
                for chunk in bytes.chunks(self.config.effective_chunk()) {
                    frame[1..=chunk.len()].copy_from_slice(chunk);
                    self.i2c
                        .write(self.config.address, &frame[..=chunk.len()])
                        .await?;
                }
            }
        }
        Ok(())
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.read(self.config.address, buf).await
    }
}
