//! Pixel color
//!
//! Panels are strictly one bit per pixel. External color encodings
//! (booleans, integer codes, names) are converted here, at the edge.

/// Monochrome pixel color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Color {
    /// Pixel dark (bit clear)
    #[default]
    Off,
    /// Pixel lit (bit set)
    On,
}

impl Color {
    /// Whether the pixel bit is set
    pub const fn is_on(self) -> bool {
        matches!(self, Color::On)
    }

    /// The opposite color
    pub const fn invert(self) -> Self {
        match self {
            Color::Off => Color::On,
            Color::On => Color::Off,
        }
    }

    /// Parse a color name
    ///
    /// Accepts `BLACK`/`OFF` and `WHITE`/`ON`, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("black") || name.eq_ignore_ascii_case("off") {
            Some(Color::Off)
        } else if name.eq_ignore_ascii_case("white") || name.eq_ignore_ascii_case("on") {
            Some(Color::On)
        } else {
            None
        }
    }
}

impl From<bool> for Color {
    fn from(on: bool) -> Self {
        if on {
            Color::On
        } else {
            Color::Off
        }
    }
}

impl From<u8> for Color {
    /// Zero is off, any nonzero code is on
    fn from(code: u8) -> Self {
        Color::from(code != 0)
    }
}

impl From<i32> for Color {
    fn from(code: i32) -> Self {
        Color::from(code != 0)
    }
}

impl From<Color> for bool {
    fn from(color: Color) -> Self {
        color.is_on()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_codes() {
        assert_eq!(Color::from(0u8), Color::Off);
        assert_eq!(Color::from(1u8), Color::On);
        assert_eq!(Color::from(255u8), Color::On);
        assert_eq!(Color::from(-1i32), Color::On);
        assert_eq!(Color::from(0i32), Color::Off);
    }

    #[test]
    fn test_booleans() {
        assert_eq!(Color::from(true), Color::On);
        assert_eq!(Color::from(false), Color::Off);
        assert!(bool::from(Color::On));
    }

    #[test]
    fn test_names() {
        assert_eq!(Color::from_name("WHITE"), Some(Color::On));
        assert_eq!(Color::from_name("black"), Some(Color::Off));
        assert_eq!(Color::from_name(" On "), Some(Color::On));
        assert_eq!(Color::from_name("red"), None);
    }

    #[test]
    fn test_invert() {
        assert_eq!(Color::On.invert(), Color::Off);
        assert_eq!(Color::Off.invert(), Color::On);
    }
}
