//! Display bus abstraction
//!
//! Every byte sent to an OLED controller is tagged as either a command
//! or display data. On the wire the tag becomes a control byte that
//! precedes the payload.

/// Control byte preceding a command byte
pub const CONTROL_COMMAND: u8 = 0x00;

/// Control byte preceding display data
pub const CONTROL_DATA: u8 = 0x40;

/// Kind of payload carried by a bus write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataKind {
    /// Controller command or command operand
    Command,
    /// Display RAM data
    Data,
}

impl DataKind {
    /// Control byte that frames this kind of payload
    pub const fn control_byte(self) -> u8 {
        match self {
            DataKind::Command => CONTROL_COMMAND,
            DataKind::Data => CONTROL_DATA,
        }
    }
}

/// Byte-oriented transport to a display controller
///
/// Implementations own the physical link. Writes must reach the device in
/// call order; the driver layer guarantees that only one logical operation
/// uses the bus at a time.
pub trait DisplayBus {
    /// Error type for bus operations
    type Error;

    /// Write a single byte of the given kind
    async fn write(&mut self, kind: DataKind, byte: u8) -> Result<(), Self::Error>;

    /// Write a run of bytes of the given kind
    ///
    /// Commands are framed one control byte per command byte. Data is sent
    /// as a burst with one control byte ahead of the payload (split into
    /// several bus transactions if the transport has a transfer limit).
    async fn write_batch(&mut self, kind: DataKind, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Read status bytes from the device
    async fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;
}

impl<T: DisplayBus + ?Sized> DisplayBus for &mut T {
    type Error = T::Error;

    async fn write(&mut self, kind: DataKind, byte: u8) -> Result<(), Self::Error> {
        T::write(self, kind, byte).await
    }

    async fn write_batch(&mut self, kind: DataKind, bytes: &[u8]) -> Result<(), Self::Error> {
        T::write_batch(self, kind, bytes).await
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        T::read(self, buf).await
    }
}
