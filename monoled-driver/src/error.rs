//! Driver errors

/// Errors reported by the display driver
///
/// `E` is the bus error type. Drawing never fails; only operations that
/// touch the bus or the controller configuration do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// No controller configuration matches this panel
    Configuration { width: u16, height: u16 },
    /// The controller cannot perform the request (nothing was sent)
    UnsupportedOperation,
    /// The bus reported an error
    Transport(E),
    /// The controller stayed busy past the polling bound
    BusyTimeout,
    /// The display has not been initialized
    NotInitialized,
}

impl<E> Error<E> {
    /// Whether the bus itself failed
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::Transport(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_error_converts() {
        fn send() -> Result<(), Error<u8>> {
            Err(7u8)?;
            Ok(())
        }
        assert_eq!(send(), Err(Error::Transport(7)));
        assert!(Error::Transport(1u8).is_transport());
        assert!(!Error::<u8>::BusyTimeout.is_transport());
    }
}
