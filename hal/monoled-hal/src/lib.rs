//! monoled Hardware Abstraction Layer
//!
//! This crate defines the byte-oriented transport that OLED controller
//! drivers talk through. A controller driver never touches a peripheral
//! directly: it hands command bytes and data bursts to a [`DisplayBus`],
//! and reads status bytes back from it for the busy handshake.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  monoled-driver (protocol + flushing)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  monoled-hal (this crate - DisplayBus)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  embedded-hal-async I2C implementation  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`bus::DisplayBus`] - command/data writes and status reads
//! - [`i2c::I2cBus`] - `DisplayBus` over any `embedded_hal_async::i2c::I2c`

#![no_std]
#![deny(unsafe_code)]
#![allow(async_fn_in_trait)]

pub mod bus;
pub mod i2c;

// Re-export key types at crate root for convenience
pub use bus::{DataKind, DisplayBus};
pub use i2c::{I2cBus, I2cConfig};
