//! Async display driver
//!
//! [`Display`] ties a [`Canvas`] to a controller strategy and a bus. Drawing
//! only touches the framebuffer; bytes reach the panel on [`Display::flush`],
//! which sends the coalesced dirty ranges (or the whole frame once more than
//! a seventh of it changed).
//!
//! A failed transfer leaves the dirty set intact, so the next flush resends
//! everything the panel may have missed.

use embassy_futures::yield_now;
use embedded_hal_async::i2c::I2c;
use monoled_core::Canvas;
use monoled_hal::{DataKind, DisplayBus, I2cBus, I2cConfig};

use crate::config::{ControllerConfig, DisplayConfig};
use crate::controller::{Commands, Controller, ScrollArea, ScrollDirection};
use crate::error::Error;
use crate::state::{DisplayState, StateEvent};

/// An OLED panel behind a bus
pub struct Display<B: DisplayBus> {
    bus: B,
    controller: Controller,
    canvas: Canvas,
    state: DisplayState,
    max_busy_polls: u16,
    contrast: u8,
    dimmed: bool,
    inverted: bool,
    scrolling: bool,
    /// Contrast/polarity changed while the panel was off
    settings_pending: bool,
}

impl<B: DisplayBus> Display<B> {
    /// Create a driver; nothing is sent until [`init`](Self::init)
    pub fn new(bus: B, config: DisplayConfig) -> Result<Self, Error<B::Error>> {
        let unsupported = || Error::Configuration {
            width: config.width,
            height: config.height,
        };
        let resolved = ControllerConfig::from_display_config(&config).ok_or_else(unsupported)?;
        let canvas = Canvas::new(resolved.width as usize, resolved.height as usize)
            .ok_or_else(unsupported)?;

        Ok(Self {
            bus,
            controller: Controller::new(resolved),
            canvas,
            state: DisplayState::Uninitialized,
            max_busy_polls: config.max_busy_polls,
            contrast: resolved.contrast,
            dimmed: false,
            inverted: false,
            scrolling: false,
            settings_pending: false,
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> DisplayState {
        self.state
    }

    /// Controller strategy in use
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Read-only view of the canvas
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Draw on the canvas
    ///
    /// Allowed while the panel is ready or off. Changes are sent by the
    /// next [`flush`](Self::flush).
    pub fn draw<R>(&mut self, f: impl FnOnce(&mut Canvas) -> R) -> Result<R, Error<B::Error>> {
        self.ensure_initialized()?;
        Ok(f(&mut self.canvas))
    }

    /// The underlying bus
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// The underlying bus, mutably
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Give the bus back
    pub fn release(self) -> B {
        self.bus
    }

    /// Current contrast setting
    pub fn contrast(&self) -> u8 {
        self.contrast
    }

    /// Whether pixel polarity is inverted
    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// Whether a hardware scroll is running
    pub fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    /// Send the init sequence and push the framebuffer to the panel
    ///
    /// May be called again to recover a panel; on failure the display
    /// returns to `Uninitialized`.
    pub async fn init(&mut self) -> Result<(), Error<B::Error>> {
        self.state = self.state.transition(StateEvent::BeginInit);
        debug!("initializing {}", self.controller.config().kind);

        let contrast = self.controller.config().contrast;
        let init = self.controller.init_sequence(self.inverted);
        if let Err(e) = self.send(&init).await {
            self.state = self.state.transition(StateEvent::InitFailed);
            warn!("display init failed");
            return Err(e);
        }

        self.state = self.state.transition(StateEvent::InitComplete);
        self.contrast = contrast;
        self.dimmed = false;
        self.scrolling = false;
        self.settings_pending = false;
        info!(
            "display ready ({}x{})",
            self.controller.config().width,
            self.controller.config().height
        );

        // Panel RAM is undefined after power-up
        self.canvas.mark_all_dirty();
        self.flush().await
    }

    /// Send pending changes to the panel
    ///
    /// While the panel is off the changes stay pending until
    /// [`power_on`](Self::power_on).
    pub async fn flush(&mut self) -> Result<(), Error<B::Error>> {
        match self.state {
            DisplayState::Ready => {}
            DisplayState::Off => return Ok(()),
            _ => return Err(Error::NotInitialized),
        }

        let plan = self.canvas.write_plan();
        if plan.is_empty() {
            return Ok(());
        }

        self.wait_until_ready().await?;
        trace!(
            "flush: {} dirty bytes, full={}",
            self.canvas.dirty().count(),
            plan.is_full()
        );
        self.controller
            .partial_transfer(&mut self.bus, self.canvas.buffer(), &plan)
            .await?;
        self.canvas.mark_clean();
        Ok(())
    }

    /// Send the whole framebuffer regardless of what changed
    pub async fn update(&mut self) -> Result<(), Error<B::Error>> {
        match self.state {
            DisplayState::Ready => {}
            DisplayState::Off => {
                self.canvas.mark_all_dirty();
                return Ok(());
            }
            _ => return Err(Error::NotInitialized),
        }

        self.wait_until_ready().await?;
        self.controller
            .full_frame_transfer(&mut self.bus, self.canvas.buffer())
            .await?;
        self.canvas.mark_clean();
        Ok(())
    }

    /// Switch the panel off, keeping the framebuffer
    pub async fn power_off(&mut self) -> Result<(), Error<B::Error>> {
        match self.state {
            DisplayState::Ready => {}
            DisplayState::Off => return Ok(()),
            _ => return Err(Error::NotInitialized),
        }

        self.wait_until_ready().await?;
        self.send(&self.controller.power(false)).await?;
        self.state = self.state.transition(StateEvent::PowerOff);
        debug!("display off");
        Ok(())
    }

    /// Switch the panel back on and send what changed while it was off
    pub async fn power_on(&mut self) -> Result<(), Error<B::Error>> {
        match self.state {
            DisplayState::Off => {}
            DisplayState::Ready => return Ok(()),
            _ => return Err(Error::NotInitialized),
        }

        if self.settings_pending {
            let mut cmds = self.contrast_commands();
            cmds.extend(&self.controller.invert(self.inverted));
            self.send(&cmds).await?;
            self.settings_pending = false;
        }
        self.send(&self.controller.power(true)).await?;
        self.state = self.state.transition(StateEvent::PowerOn);
        debug!("display on");
        self.flush().await
    }

    /// Set the contrast (0-255)
    pub async fn set_contrast(&mut self, contrast: u8) -> Result<(), Error<B::Error>> {
        self.ensure_initialized()?;
        self.contrast = contrast;
        self.dimmed = false;
        let cmds = self.contrast_commands();
        self.apply_setting(&cmds).await
    }

    /// Dim the panel to minimum contrast, or restore the contrast setting
    pub async fn dim(&mut self, dim: bool) -> Result<(), Error<B::Error>> {
        self.ensure_initialized()?;
        self.dimmed = dim;
        let cmds = self.contrast_commands();
        self.apply_setting(&cmds).await
    }

    /// Invert pixel polarity in hardware
    pub async fn invert(&mut self, inverted: bool) -> Result<(), Error<B::Error>> {
        self.ensure_initialized()?;
        self.inverted = inverted;
        let cmds = self.controller.invert(inverted);
        self.apply_setting(&cmds).await
    }

    /// Start a hardware scroll over pages `start_page..=stop_page`
    ///
    /// Diagonal directions need an `area`. Controllers without a scroll
    /// engine, and diagonal requests without an area, are rejected with
    /// [`Error::UnsupportedOperation`] before anything is sent.
    pub async fn start_scroll(
        &mut self,
        direction: ScrollDirection,
        start_page: u8,
        stop_page: u8,
        area: Option<ScrollArea>,
    ) -> Result<(), Error<B::Error>> {
        if !self.controller.supports_scroll() {
            warn!("{} has no hardware scroll", self.controller.config().kind);
            return Err(Error::UnsupportedOperation);
        }
        let Some(cmds) = self
            .controller
            .start_scroll(direction, start_page, stop_page, area)
        else {
            warn!("diagonal scroll needs a valid scroll area");
            return Err(Error::UnsupportedOperation);
        };
        self.ensure_initialized()?;

        self.wait_until_ready().await?;
        self.send(&cmds).await?;
        self.scrolling = true;
        Ok(())
    }

    /// Stop a hardware scroll and rewrite the panel from the framebuffer
    pub async fn stop_scroll(&mut self) -> Result<(), Error<B::Error>> {
        let Some(cmds) = self.controller.stop_scroll() else {
            warn!("{} has no hardware scroll", self.controller.config().kind);
            return Err(Error::UnsupportedOperation);
        };
        self.ensure_initialized()?;

        self.wait_until_ready().await?;
        self.send(&cmds).await?;
        self.scrolling = false;

        // Scrolling moved the RAM contents
        self.canvas.mark_all_dirty();
        self.flush().await
    }

    /// Poll the busy flag until clear, up to the configured bound
    ///
    /// Skipped when polling is disabled or the panel is not on: the on/off
    /// flag shares the status byte with the busy flag.
    pub async fn wait_until_ready(&mut self) -> Result<(), Error<B::Error>> {
        if self.max_busy_polls == 0 || !self.state.transmits() {
            return Ok(());
        }

        let mask = 1u8 << self.controller.config().busy_bit;
        for _ in 0..self.max_busy_polls {
            let mut status = [0u8; 1];
            self.bus.read(&mut status).await?;
            if status[0] & mask == 0 {
                return Ok(());
            }
            yield_now().await;
        }

        warn!("display still busy after {} polls", self.max_busy_polls);
        Err(Error::BusyTimeout)
    }

    fn ensure_initialized(&self) -> Result<(), Error<B::Error>> {
        if self.state.accepts_drawing() {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    fn contrast_commands(&self) -> Commands {
        if self.dimmed {
            self.controller.dim(true)
        } else {
            self.controller.contrast(self.contrast)
        }
    }

    /// Send a setting now, or remember it for power-on
    async fn apply_setting(&mut self, cmds: &Commands) -> Result<(), Error<B::Error>> {
        match self.state {
            DisplayState::Ready => {
                self.wait_until_ready().await?;
                self.send(cmds).await
            }
            DisplayState::Off => {
                self.settings_pending = true;
                Ok(())
            }
            _ => Err(Error::NotInitialized),
        }
    }

    async fn send(&mut self, cmds: &Commands) -> Result<(), Error<B::Error>> {
        self.bus.write_batch(DataKind::Command, cmds).await?;
        Ok(())
    }
}

impl<I2C: I2c> Display<I2cBus<I2C>> {
    /// Driver on an I2C master, at the address from `config`
    pub fn new_i2c(i2c: I2C, config: DisplayConfig) -> Result<Self, Error<I2C::Error>> {
        let bus = I2cBus::with_config(i2c, I2cConfig::with_address(config.address));
        Self::new(bus, config)
    }
}
