//! Software animations
//!
//! An [`Animation`] draws one frame per call. The loop that paces frames and
//! flushes them lives in [`SharedDisplay::run_animation`](crate::SharedDisplay::run_animation);
//! each started animation is identified by an [`AnimationHandle`] so that a
//! newer one (or a reset) can retire it.

use monoled_core::{Canvas, Color};

/// Something that draws successive frames
pub trait Animation {
    /// Draw the next frame
    ///
    /// Returns `false` once this was the last frame.
    fn frame(&mut self, canvas: &mut Canvas) -> bool;
}

impl<A: Animation + ?Sized> Animation for &mut A {
    fn frame(&mut self, canvas: &mut Canvas) -> bool {
        A::frame(self, canvas)
    }
}

/// Token for one started animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnimationHandle {
    pub(crate) generation: u32,
}

/// Which animation, if any, may draw
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct AnimationSlot {
    generation: u32,
    active: bool,
}

impl AnimationSlot {
    /// Retire whatever runs and hand out a new handle
    pub(crate) fn begin(&mut self) -> AnimationHandle {
        self.generation = self.generation.wrapping_add(1);
        self.active = true;
        AnimationHandle {
            generation: self.generation,
        }
    }

    pub(crate) fn is_current(&self, handle: AnimationHandle) -> bool {
        self.active && self.generation == handle.generation
    }

    /// Retire the running animation, if any
    pub(crate) fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.active = false;
    }

    /// Mark `handle` finished if it is still the current one
    pub(crate) fn finish(&mut self, handle: AnimationHandle) {
        if self.is_current(handle) {
            self.active = false;
        }
    }
}

/// A filled square bouncing off the panel edges
#[derive(Debug, Clone)]
pub struct Bounce {
    x: i32,
    y: i32,
    dx: i32,
    dy: i32,
    size: i32,
    drawn: bool,
}

impl Bounce {
    /// Start at `(x, y)` moving down and to the right
    pub fn new(x: i32, y: i32, size: i32) -> Self {
        Self {
            x,
            y,
            dx: 1,
            dy: 1,
            size: size.max(1),
            drawn: false,
        }
    }

    /// Top-left corner of the square
    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    fn step(pos: i32, delta: &mut i32, size: i32, limit: i32) -> i32 {
        let next = pos + *delta;
        if next < 0 || next + size > limit {
            *delta = -*delta;
        }
        (pos + *delta).clamp(0, (limit - size).max(0))
    }
}

impl Animation for Bounce {
    fn frame(&mut self, canvas: &mut Canvas) -> bool {
        let (width, height) = (canvas.width() as i32, canvas.height() as i32);

        if self.drawn {
            canvas.fill_rect(self.x, self.y, self.size, self.size, Color::Off);
            self.x = Self::step(self.x, &mut self.dx, self.size, width);
            self.y = Self::step(self.y, &mut self.dy, self.size, height);
        }
        canvas.fill_rect(self.x, self.y, self.size, self.size, Color::On);
        self.drawn = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_generations() {
        let mut slot = AnimationSlot::default();
        let first = slot.begin();
        assert!(slot.is_current(first));

        let second = slot.begin();
        assert!(!slot.is_current(first));
        assert!(slot.is_current(second));

        // A stale handle cannot finish the current animation
        slot.finish(first);
        assert!(slot.is_current(second));

        slot.cancel();
        assert!(!slot.is_current(second));
    }

    #[test]
    fn test_bounce_moves_and_erases() {
        let mut canvas = Canvas::new(16, 8).unwrap();
        let mut bounce = Bounce::new(0, 0, 2);

        assert!(bounce.frame(&mut canvas));
        assert!(canvas.buffer().get_pixel(0, 0));

        bounce.frame(&mut canvas);
        assert_eq!(bounce.position(), (1, 1));
        assert!(!canvas.buffer().get_pixel(0, 0));
        assert!(canvas.buffer().get_pixel(2, 2));
    }

    #[test]
    fn test_bounce_reflects_at_edges() {
        let mut canvas = Canvas::new(16, 8).unwrap();
        let mut bounce = Bounce::new(14, 6, 2);
        bounce.frame(&mut canvas);
        bounce.frame(&mut canvas);
        assert_eq!(bounce.position(), (13, 5));

        for _ in 0..40 {
            bounce.frame(&mut canvas);
            let (x, y) = bounce.position();
            assert!((0..=14).contains(&x));
            assert!((0..=6).contains(&y));
        }
    }
}
