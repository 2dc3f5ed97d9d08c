//! Controller protocols and async display driver
//!
//! This crate turns the board-agnostic canvas from `monoled-core` into bus
//! traffic for a real panel:
//!
//! - Controller command encoders (SSD1306 column addressing, SH1106 page
//!   addressing)
//! - Resolution tables and user-facing configuration
//! - `Display`: init sequence, power state machine, dirty-range flushes
//!   and the bounded busy handshake
//! - `SharedDisplay`: single-flight access and cancellable animations

#![no_std]
#![deny(unsafe_code)]
#![allow(async_fn_in_trait)]

#[cfg(test)]
extern crate std;

// Must come first so the logging macros are visible to the other modules
mod fmt;

pub mod animation;
pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod shared;
pub mod state;

#[cfg(test)]
mod testing;

// Re-export key types
pub use animation::{Animation, AnimationHandle, Bounce};
pub use config::{ControllerConfig, ControllerKind, DisplayConfig};
pub use controller::{Commands, Controller, ScrollArea, ScrollDirection};
pub use display::Display;
pub use error::Error;
pub use shared::SharedDisplay;
pub use state::{DisplayState, StateEvent};
