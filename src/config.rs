//! Driver configuration types and builder

pub use crate::error::BuilderError;

use crate::bus::DEFAULT_RELAX_US;
use crate::command::CONTRAST_MASK;
use crate::keypad::Thresholds;

/// Maximum number of digits the TM1638 can drive
pub const MAX_DIGITS: u8 = 8;

/// Maximum number of LEDs the TM1638 can drive
pub const MAX_LEDS: u8 = 8;

/// Maximum number of keys the TM1638 can scan
///
/// Three key buses of eight keys each.
pub const MAX_KEYS: u8 = 24;

/// Highest contrast level
pub const MAX_CONTRAST: u8 = CONTRAST_MASK;

/// Default contrast level applied by `begin()`
pub const DEFAULT_CONTRAST: u8 = 3;

/// Default keypad scan interval in milliseconds
pub const DEFAULT_SCAN_INTERVAL_MS: u32 = 100;

/// Pin numbers the bus lines are wired to
///
/// The numbers are informational only; the actual pins are owned by the
/// [`Interface`](crate::interface::Interface). They are kept so wiring
/// mistakes can be caught before any line is touched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pins {
    /// Clock pin
    pub clk: u8,
    /// Data pin
    pub dio: u8,
    /// Strobe pin
    pub stb: u8,
}

impl Pins {
    /// Whether any two lines share a pin
    pub fn conflict(&self) -> bool {
        self.clk == self.dio || self.dio == self.stb || self.stb == self.clk
    }
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            clk: 2,
            dio: 3,
            stb: 4,
        }
    }
}

/// Module geometry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    /// Number of 7-segment digits
    pub digits: u8,
    /// Number of LEDs
    pub leds: u8,
    /// Number of keys
    pub keys: u8,
}

impl Geometry {
    /// Create a geometry, clamping every count to the controller maximum
    pub fn new(digits: u8, leds: u8, keys: u8) -> Self {
        Self {
            digits: digits.min(MAX_DIGITS),
            leds: leds.min(MAX_LEDS),
            keys: keys.min(MAX_KEYS),
        }
    }
}

impl Default for Geometry {
    /// The common "LED&KEY" board: 8 digits, 8 LEDs, 8 keys
    fn default() -> Self {
        Self::new(MAX_DIGITS, MAX_LEDS, 8)
    }
}

/// Bus and keypad timing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    /// Settle delay after each line change in microseconds
    pub relax_us: u32,
    /// Minimum time between two keypad scans in milliseconds
    pub scan_interval_ms: u32,
    /// Pressed scans before a press counts as long
    pub press_long_scans: u8,
    /// Released scans before a wait counts as long
    pub wait_long_scans: u8,
}

impl Timing {
    /// Keypad thresholds derived from this timing
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            press_long: self.press_long_scans,
            wait_long: self.wait_long_scans,
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        let thresholds = Thresholds::default();
        Self {
            relax_us: DEFAULT_RELAX_US,
            scan_interval_ms: DEFAULT_SCAN_INTERVAL_MS,
            press_long_scans: thresholds.press_long,
            wait_long_scans: thresholds.wait_long,
        }
    }
}

/// Driver configuration
///
/// Use [`Builder`] to create a Config.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Pin numbers of the bus lines
    pub pins: Pins,
    /// Digit, LED and key counts
    pub geometry: Geometry,
    /// Bus and keypad timing
    pub timing: Timing,
    /// Contrast level applied by `begin()` (0-7)
    pub contrast: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pins: Pins::default(),
            geometry: Geometry::default(),
            timing: Timing::default(),
            contrast: DEFAULT_CONTRAST,
        }
    }
}

/// Builder for constructing driver configuration
///
/// # Example
///
/// ```
/// use tm1638::{Builder, BuilderError};
///
/// let config = Builder::new().pins(5, 6, 7).digits(4).keys(16).build();
/// assert!(config.is_ok());
///
/// let config = Builder::new().pins(5, 5, 7).build();
/// assert!(matches!(config, Err(BuilderError::PinConflict { .. })));
/// ```
#[must_use]
#[derive(Default)]
pub struct Builder {
    config: Config,
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the clock, data and strobe pin numbers
    pub fn pins(mut self, clk: u8, dio: u8, stb: u8) -> Self {
        self.config.pins = Pins { clk, dio, stb };
        self
    }

    /// Set the number of digits
    pub fn digits(mut self, digits: u8) -> Self {
        self.config.geometry.digits = digits;
        self
    }

    /// Set the number of LEDs
    pub fn leds(mut self, leds: u8) -> Self {
        self.config.geometry.leds = leds;
        self
    }

    /// Set the number of keys
    ///
    /// Zero disables keypad scanning.
    pub fn keys(mut self, keys: u8) -> Self {
        self.config.geometry.keys = keys;
        self
    }

    /// Set the settle delay after each line change
    pub fn relax_us(mut self, relax_us: u32) -> Self {
        self.config.timing.relax_us = relax_us;
        self
    }

    /// Set the minimum time between keypad scans
    pub fn scan_interval_ms(mut self, interval: u32) -> Self {
        self.config.timing.scan_interval_ms = interval;
        self
    }

    /// Set the scan count after which a press is long
    pub fn press_long_scans(mut self, scans: u8) -> Self {
        self.config.timing.press_long_scans = scans;
        self
    }

    /// Set the scan count after which a release is long
    pub fn wait_long_scans(mut self, scans: u8) -> Self {
        self.config.timing.wait_long_scans = scans;
        self
    }

    /// Set the initial contrast level (masked to 0-7)
    pub fn contrast(mut self, contrast: u8) -> Self {
        self.config.contrast = contrast;
        self
    }

    /// Build the configuration
    ///
    /// Geometry counts above the controller maxima are clamped.
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::PinConflict` if two lines share a pin
    pub fn build(self) -> Result<Config, BuilderError> {
        let Config {
            pins,
            geometry,
            timing,
            contrast,
        } = self.config;
        if pins.conflict() {
            return Err(BuilderError::PinConflict {
                clk: pins.clk,
                dio: pins.dio,
                stb: pins.stb,
            });
        }
        Ok(Config {
            pins,
            geometry: Geometry::new(geometry.digits, geometry.leds, geometry.keys),
            timing,
            contrast: contrast & MAX_CONTRAST,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Builder::new().build().unwrap();
        assert_eq!(config.pins, Pins { clk: 2, dio: 3, stb: 4 });
        assert_eq!(config.geometry, Geometry::new(8, 8, 8));
        assert_eq!(config.timing.relax_us, 2);
        assert_eq!(config.timing.scan_interval_ms, 100);
        assert_eq!(config.timing.thresholds(), Thresholds::default());
        assert_eq!(config.contrast, 3);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_pin_conflict() {
        for (clk, dio, stb) in [(1, 1, 2), (1, 2, 2), (2, 1, 2), (7, 7, 7)] {
            let result = Builder::new().pins(clk, dio, stb).build();
            assert_eq!(result, Err(BuilderError::PinConflict { clk, dio, stb }));
        }
        assert!(Builder::new().pins(10, 11, 12).build().is_ok());
    }

    #[test]
    fn test_geometry_is_clamped() {
        let config = Builder::new()
            .digits(12)
            .leds(200)
            .keys(40)
            .build()
            .unwrap();
        assert_eq!(config.geometry.digits, MAX_DIGITS);
        assert_eq!(config.geometry.leds, MAX_LEDS);
        assert_eq!(config.geometry.keys, MAX_KEYS);

        let config = Builder::new().digits(4).leds(0).keys(0).build().unwrap();
        assert_eq!(config.geometry, Geometry { digits: 4, leds: 0, keys: 0 });
    }

    #[test]
    fn test_contrast_is_masked() {
        let config = Builder::new().contrast(0x0F).build().unwrap();
        assert_eq!(config.contrast, 7);
    }

    #[test]
    fn test_timing_setters() {
        let config = Builder::new()
            .relax_us(5)
            .scan_interval_ms(20)
            .press_long_scans(10)
            .wait_long_scans(3)
            .build()
            .unwrap();
        assert_eq!(
            config.timing,
            Timing {
                relax_us: 5,
                scan_interval_ms: 20,
                press_long_scans: 10,
                wait_long_scans: 3,
            }
        );
        assert_eq!(
            config.timing.thresholds(),
            Thresholds {
                press_long: 10,
                wait_long: 3
            }
        );
    }
}
