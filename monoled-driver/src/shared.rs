//! Single-flight display access
//!
//! [`SharedDisplay`] puts a [`Display`] behind an async mutex so that a
//! whole high-level operation (draw, then flush) completes before another
//! task touches the bus. It also owns the animation bookkeeping: starting an
//! animation or resetting the display retires the previous animation, whose
//! loop exits before drawing another frame.

use core::cell::Cell;

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::mutex::{Mutex, MutexGuard};
use embassy_sync::signal::Signal;
use embedded_hal_async::delay::DelayNs;
use monoled_core::{Canvas, Color};
use monoled_hal::DisplayBus;

use crate::animation::{Animation, AnimationHandle, AnimationSlot};
use crate::display::Display;
use crate::error::Error;

/// A display shared between tasks
pub struct SharedDisplay<M: RawMutex, B: DisplayBus> {
    display: Mutex<M, Display<B>>,
    animation: BlockingMutex<M, Cell<AnimationSlot>>,
    /// Wakes a sleeping animation loop early
    stop: Signal<M, ()>,
}

impl<M: RawMutex, B: DisplayBus> SharedDisplay<M, B> {
    pub fn new(display: Display<B>) -> Self {
        Self {
            display: Mutex::new(display),
            animation: BlockingMutex::new(Cell::new(AnimationSlot::default())),
            stop: Signal::new(),
        }
    }

    /// Exclusive access for a multi-step sequence
    pub async fn lock(&self) -> MutexGuard<'_, M, Display<B>> {
        self.display.lock().await
    }

    /// Initialize the panel
    pub async fn init(&self) -> Result<(), Error<B::Error>> {
        self.display.lock().await.init().await
    }

    /// Draw and flush as one operation
    pub async fn draw<R>(&self, f: impl FnOnce(&mut Canvas) -> R) -> Result<R, Error<B::Error>> {
        let mut display = self.display.lock().await;
        let result = display.draw(f)?;
        display.flush().await?;
        Ok(result)
    }

    /// Send pending changes
    pub async fn flush(&self) -> Result<(), Error<B::Error>> {
        self.display.lock().await.flush().await
    }

    /// Start a new animation, retiring any running one
    pub fn start_animation(&self) -> AnimationHandle {
        let handle = self.with_slot(|slot| slot.begin());
        self.stop.signal(());
        debug!("animation {} started", handle.generation);
        handle
    }

    /// Stop an animation; stale handles are ignored
    pub fn stop_animation(&self, handle: AnimationHandle) {
        let stopped = self.with_slot(|slot| {
            let current = slot.is_current(handle);
            if current {
                slot.cancel();
            }
            current
        });
        if stopped {
            self.stop.signal(());
        }
    }

    /// Whether `handle` is still allowed to draw
    pub fn is_animating(&self, handle: AnimationHandle) -> bool {
        self.with_slot(|slot| slot.is_current(handle))
    }

    /// Stop animations and hardware scrolling, then blank the panel
    pub async fn reset(&self) -> Result<(), Error<B::Error>> {
        self.with_slot(|slot| slot.cancel());
        self.stop.signal(());

        let mut display = self.display.lock().await;
        if display.is_scrolling() {
            display.stop_scroll().await?;
        }
        display.draw(|canvas| {
            canvas.clear(Color::Off);
            canvas.set_cursor(0, 0);
        })?;
        display.flush().await
    }

    /// Drive an animation until it ends or is retired
    ///
    /// The display is locked for each frame (draw and flush) and released
    /// while waiting `interval_ms` for the next one.
    pub async fn run_animation<A, D>(
        &self,
        handle: AnimationHandle,
        mut animation: A,
        mut delay: D,
        interval_ms: u32,
    ) -> Result<(), Error<B::Error>>
    where
        A: Animation,
        D: DelayNs,
    {
        loop {
            {
                let mut display = self.display.lock().await;
                if !self.is_animating(handle) {
                    debug!("animation {} retired", handle.generation);
                    return Ok(());
                }

                let frame = match display.draw(|canvas| animation.frame(canvas)) {
                    Ok(more) => display.flush().await.map(|_| more),
                    Err(e) => Err(e),
                };
                match frame {
                    Ok(true) => {}
                    Ok(false) => {
                        self.with_slot(|slot| slot.finish(handle));
                        return Ok(());
                    }
                    Err(e) => {
                        warn!("animation {} aborted", handle.generation);
                        self.with_slot(|slot| slot.finish(handle));
                        return Err(e);
                    }
                }
            }

            // A stop meant for another handle, or left over from before
            // this loop started, restarts the wait instead of ending it
            loop {
                match select(delay.delay_ms(interval_ms), self.stop.wait()).await {
                    Either::First(()) => break,
                    Either::Second(()) if self.is_animating(handle) => {}
                    Either::Second(()) => break,
                }
            }
        }
    }

    fn with_slot<R>(&self, f: impl FnOnce(&mut AnimationSlot) -> R) -> R {
        self.animation.lock(|cell| {
            let mut slot = cell.get();
            let result = f(&mut slot);
            cell.set(slot);
            result
        })
    }
}
