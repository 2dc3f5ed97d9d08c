//! Display power/initialization state machine
//!
//! Bus traffic is a function of the current state: nothing is sent before
//! initialization completes, and while the panel is off frame updates are
//! held back until it is switched on again.

/// Display lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayState {
    /// Constructed, init sequence not sent yet
    #[default]
    Uninitialized,
    /// Init sequence in flight
    Initializing,
    /// Panel on, updates go to the bus
    Ready,
    /// Panel off; the framebuffer keeps accepting drawing
    Off,
}

/// Events that drive state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StateEvent {
    BeginInit,
    InitComplete,
    InitFailed,
    PowerOff,
    PowerOn,
}

impl DisplayState {
    /// Whether the canvas may be drawn on
    pub fn accepts_drawing(&self) -> bool {
        matches!(self, DisplayState::Ready | DisplayState::Off)
    }

    /// Whether frame updates are sent to the panel
    pub fn transmits(&self) -> bool {
        matches!(self, DisplayState::Ready)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: StateEvent) -> Self {
        use DisplayState::*;
        use StateEvent::*;

        match (self, event) {
            // Re-running init is allowed from any state
            (_, BeginInit) => Initializing,
            (Initializing, InitComplete) => Ready,
            (Initializing, InitFailed) => Uninitialized,

            (Ready, PowerOff) => Off,
            (Off, PowerOn) => Ready,

            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_path() {
        let state = DisplayState::default();
        assert!(!state.accepts_drawing());

        let state = state.transition(StateEvent::BeginInit);
        assert_eq!(state, DisplayState::Initializing);
        assert_eq!(state.transition(StateEvent::InitComplete), DisplayState::Ready);
        assert_eq!(
            state.transition(StateEvent::InitFailed),
            DisplayState::Uninitialized
        );
    }

    #[test]
    fn test_power_cycle() {
        let off = DisplayState::Ready.transition(StateEvent::PowerOff);
        assert_eq!(off, DisplayState::Off);
        assert!(off.accepts_drawing());
        assert!(!off.transmits());
        assert_eq!(off.transition(StateEvent::PowerOn), DisplayState::Ready);
    }

    #[test]
    fn test_power_ignored_before_init() {
        let state = DisplayState::Uninitialized;
        assert_eq!(state.transition(StateEvent::PowerOn), state);
        assert_eq!(state.transition(StateEvent::PowerOff), state);
        assert_eq!(
            DisplayState::Initializing.transition(StateEvent::PowerOff),
            DisplayState::Initializing
        );
    }
}
