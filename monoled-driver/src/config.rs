//! Display configuration
//!
//! [`DisplayConfig`] is what the user provides: controller family, panel
//! size, bus address and a few overrides. It is resolved once, at
//! construction, into a [`ControllerConfig`] carrying every parameter the
//! command encoders need.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use monoled_hal::i2c::DEFAULT_ADDRESS;

/// Default bound on busy-flag polls per transfer
pub const DEFAULT_MAX_BUSY_POLLS: u16 = 32;

/// Supported controller families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ControllerKind {
    /// Column-addressed, hardware scroll
    #[default]
    Ssd1306,
    /// Page-addressed, 132-column RAM
    Sh1106,
}

impl ControllerKind {
    /// Parse a controller identifier such as `"ssd1306"` (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("ssd1306") {
            Some(ControllerKind::Ssd1306)
        } else if name.eq_ignore_ascii_case("sh1106") {
            Some(ControllerKind::Sh1106)
        } else {
            None
        }
    }

    /// Status bit signalling a busy controller unless overridden
    pub const fn default_busy_bit(self) -> u8 {
        match self {
            ControllerKind::Ssd1306 => 7,
            ControllerKind::Sh1106 => 6,
        }
    }

    /// Contrast applied at init unless overridden
    pub const fn default_contrast(self) -> u8 {
        match self {
            ControllerKind::Ssd1306 => 0x8F,
            ControllerKind::Sh1106 => 0xCF,
        }
    }

    /// Whether the controller has a hardware scroll engine
    pub const fn hardware_scroll(self) -> bool {
        matches!(self, ControllerKind::Ssd1306)
    }
}

/// User-facing display configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayConfig {
    /// Controller family
    pub controller: ControllerKind,
    /// Panel width in pixels
    pub width: u16,
    /// Panel height in pixels
    pub height: u16,
    /// 7-bit bus address
    pub address: u8,
    /// Busy status bit; `None` uses the controller default
    pub busy_bit: Option<u8>,
    /// Busy polls before giving up; 0 disables polling
    pub max_busy_polls: u16,
    /// Init contrast; `None` uses the controller default
    pub contrast: Option<u8>,
    /// Panel supplied by an external VCC (charge pump disabled)
    pub external_vcc: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::ssd1306_128x64()
    }
}

impl DisplayConfig {
    /// Create a config for a panel
    pub const fn new(controller: ControllerKind, width: u16, height: u16) -> Self {
        Self {
            controller,
            width,
            height,
            address: DEFAULT_ADDRESS,
            busy_bit: None,
            max_busy_polls: DEFAULT_MAX_BUSY_POLLS,
            contrast: None,
            external_vcc: false,
        }
    }

    /// SSD1306 128x64
    pub const fn ssd1306_128x64() -> Self {
        Self::new(ControllerKind::Ssd1306, 128, 64)
    }

    /// SSD1306 128x32
    pub const fn ssd1306_128x32() -> Self {
        Self::new(ControllerKind::Ssd1306, 128, 32)
    }

    /// SH1106 128x64
    pub const fn sh1106_128x64() -> Self {
        Self::new(ControllerKind::Sh1106, 128, 64)
    }

    /// Use a different bus address
    pub const fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Override the busy status bit
    pub const fn with_busy_bit(mut self, bit: u8) -> Self {
        self.busy_bit = Some(bit);
        self
    }

    /// Set the busy poll bound (0 for write-only buses)
    pub const fn with_max_busy_polls(mut self, polls: u16) -> Self {
        self.max_busy_polls = polls;
        self
    }

    /// Override the init contrast
    pub const fn with_contrast(mut self, contrast: u8) -> Self {
        self.contrast = Some(contrast);
        self
    }

    /// Panel powered from an external VCC
    pub const fn with_external_vcc(mut self) -> Self {
        self.external_vcc = true;
        self
    }
}

/// Config encoding errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    Serialize,
    Deserialize,
}

#[cfg(feature = "serde")]
impl DisplayConfig {
    /// Encode into `buf` (postcard), returning the used prefix
    pub fn to_bytes<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        postcard::to_slice(self, buf).map_err(|_| ConfigError::Serialize)
    }

    /// Decode a config written by [`to_bytes`](Self::to_bytes)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)
    }
}

/// Resolution-dependent controller parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Resolution {
    kind: ControllerKind,
    width: u8,
    height: u8,
    multiplex: u8,
    com_pins: u8,
    column_offset: u8,
}

const RESOLUTIONS: [Resolution; 5] = [
    Resolution {
        kind: ControllerKind::Ssd1306,
        width: 128,
        height: 64,
        multiplex: 0x3F,
        com_pins: 0x12,
        column_offset: 0,
    },
    Resolution {
        kind: ControllerKind::Ssd1306,
        width: 128,
        height: 32,
        multiplex: 0x1F,
        com_pins: 0x02,
        column_offset: 0,
    },
    Resolution {
        kind: ControllerKind::Ssd1306,
        width: 96,
        height: 16,
        multiplex: 0x0F,
        com_pins: 0x02,
        column_offset: 0,
    },
    // 64x48 modules wire the middle of the 128-column RAM
    Resolution {
        kind: ControllerKind::Ssd1306,
        width: 64,
        height: 48,
        multiplex: 0x2F,
        com_pins: 0x12,
        column_offset: 32,
    },
    Resolution {
        kind: ControllerKind::Sh1106,
        width: 128,
        height: 64,
        multiplex: 0x3F,
        com_pins: 0x12,
        column_offset: 2,
    },
];

/// Charge pump setting, internal VCC
const CHARGE_PUMP_ON: u8 = 0x14;
/// Charge pump setting, external VCC
const CHARGE_PUMP_OFF: u8 = 0x10;
const PRECHARGE_INTERNAL: u8 = 0xF1;
const PRECHARGE_EXTERNAL: u8 = 0x22;
const VCOM_DETECT: u8 = 0x40;

/// Fully resolved controller parameters, immutable after construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerConfig {
    pub kind: ControllerKind,
    pub width: u8,
    pub height: u8,
    /// Multiplex ratio operand (rows - 1)
    pub multiplex: u8,
    /// COM pins hardware configuration operand
    pub com_pins: u8,
    /// First RAM column wired to the panel
    pub column_offset: u8,
    /// Init contrast
    pub contrast: u8,
    /// Charge pump operand
    pub charge_pump: u8,
    /// Pre-charge period operand
    pub precharge: u8,
    /// VCOMH deselect level operand
    pub vcom_detect: u8,
    /// Status bit signalling busy
    pub busy_bit: u8,
    /// Hardware scroll capability
    pub hardware_scroll: bool,
}

impl ControllerConfig {
    /// Look up the parameters for a controller and panel size
    ///
    /// Returns `None` for unsupported combinations.
    pub fn resolve(kind: ControllerKind, width: u16, height: u16) -> Option<Self> {
        let res = RESOLUTIONS
            .iter()
            .find(|r| r.kind == kind && r.width as u16 == width && r.height as u16 == height)?;

        Some(Self {
            kind,
            width: res.width,
            height: res.height,
            multiplex: res.multiplex,
            com_pins: res.com_pins,
            column_offset: res.column_offset,
            contrast: kind.default_contrast(),
            charge_pump: CHARGE_PUMP_ON,
            precharge: PRECHARGE_INTERNAL,
            vcom_detect: VCOM_DETECT,
            busy_bit: kind.default_busy_bit(),
            hardware_scroll: kind.hardware_scroll(),
        })
    }

    /// Resolve a user config, applying its overrides
    pub fn from_display_config(config: &DisplayConfig) -> Option<Self> {
        let mut resolved = Self::resolve(config.controller, config.width, config.height)?;
        if let Some(bit) = config.busy_bit {
            resolved.busy_bit = bit.min(7);
        }
        if let Some(contrast) = config.contrast {
            resolved.contrast = contrast;
        }
        if config.external_vcc {
            resolved.charge_pump = CHARGE_PUMP_OFF;
            resolved.precharge = PRECHARGE_EXTERNAL;
        }
        Some(resolved)
    }

    /// Number of 8-row pages
    pub const fn pages(&self) -> u8 {
        self.height / 8
    }

    /// Framebuffer size in bytes
    pub const fn buffer_len(&self) -> usize {
        self.width as usize * self.pages() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_supported() {
        let c = ControllerConfig::resolve(ControllerKind::Ssd1306, 128, 32).unwrap();
        assert_eq!(c.multiplex, 0x1F);
        assert_eq!(c.com_pins, 0x02);
        assert_eq!(c.pages(), 4);
        assert_eq!(c.buffer_len(), 512);

        let c = ControllerConfig::resolve(ControllerKind::Ssd1306, 64, 48).unwrap();
        assert_eq!(c.column_offset, 32);

        let c = ControllerConfig::resolve(ControllerKind::Sh1106, 128, 64).unwrap();
        assert_eq!(c.column_offset, 2);
        assert_eq!(c.busy_bit, 6);
        assert!(!c.hardware_scroll);
    }

    #[test]
    fn test_default_address_matches_transport() {
        let config = DisplayConfig::default();
        assert_eq!(config.address, 0x3C);
        assert_eq!(config.address, monoled_hal::I2cConfig::default().address);
    }

    #[test]
    fn test_resolve_unsupported() {
        assert!(ControllerConfig::resolve(ControllerKind::Ssd1306, 128, 48).is_none());
        assert!(ControllerConfig::resolve(ControllerKind::Sh1106, 128, 32).is_none());
    }

    #[test]
    fn test_overrides() {
        let config = DisplayConfig::ssd1306_128x64()
            .with_busy_bit(6)
            .with_contrast(0x10)
            .with_external_vcc();
        let c = ControllerConfig::from_display_config(&config).unwrap();
        assert_eq!(c.busy_bit, 6);
        assert_eq!(c.contrast, 0x10);
        assert_eq!(c.charge_pump, 0x10);

        let c = ControllerConfig::from_display_config(&DisplayConfig::default()).unwrap();
        assert_eq!(c.busy_bit, 7);
        assert_eq!(c.contrast, 0x8F);
        assert_eq!(c.charge_pump, 0x14);
    }

    #[test]
    fn test_kind_from_name() {
        assert_eq!(ControllerKind::from_name("SH1106"), Some(ControllerKind::Sh1106));
        assert_eq!(ControllerKind::from_name(" ssd1306 "), Some(ControllerKind::Ssd1306));
        assert_eq!(ControllerKind::from_name("st7735"), None);
    }

    #[test]
    fn test_builders() {
        let config = DisplayConfig::sh1106_128x64()
            .with_address(0x3D)
            .with_max_busy_polls(0);
        assert_eq!(config.address, 0x3D);
        assert_eq!(config.max_busy_polls, 0);
        assert_eq!(config.busy_bit, None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_postcard_roundtrip() {
        let config = DisplayConfig::ssd1306_128x32().with_address(0x3D);
        let mut buf = [0u8; 32];
        let bytes = config.to_bytes(&mut buf).unwrap();
        assert_eq!(DisplayConfig::from_bytes(bytes), Ok(config));
        assert_eq!(DisplayConfig::from_bytes(&[]), Err(ConfigError::Deserialize));
    }
}
