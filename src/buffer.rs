//! Screen buffer mirroring the controller's display memory
//!
//! The TM1638 has 16 bytes of display memory. Even addresses hold the
//! segments of one digit (bits 0-6) plus its radix (bit 7); odd addresses
//! hold the two-colour LED next to it:
//!
//! | Address | Content               |
//! |---------|-----------------------|
//! | `2·i`   | digit `i` segments    |
//! | `2·i+1` | LED `i` colour bits   |
//!
//! All printing happens here first. Nothing reaches the chip until the
//! buffer is flushed by the driver.

use crate::command::{ADDRESS_MASK, MEMORY_SIZE};
use crate::config::{MAX_DIGITS, MAX_LEDS};
use crate::font::{GLYPH_MASK, RADIX_BIT};

/// Address of a digit's segment byte
pub const fn digit_address(digit: u8) -> usize {
    2 * digit as usize
}

/// Address of an LED's colour byte
pub const fn led_address(led: u8) -> usize {
    2 * led as usize + 1
}

/// Colour bits of an LED byte
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum LedColor {
    /// Dark
    #[default]
    Off = 0x00,
    /// Red element lit
    Red = 0x01,
    /// Green element lit
    Green = 0x02,
    /// Both elements lit (amber on modules that fit both)
    Both = 0x03,
}

impl LedColor {
    /// Decode the two colour bits of an LED byte
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0x01 => Self::Red,
            0x02 => Self::Green,
            0x03 => Self::Both,
            _ => Self::Off,
        }
    }
}

/// How a single bit is changed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Switch {
    /// Set the bit
    On,
    /// Clear the bit
    Off,
    /// Invert the bit
    Toggle,
}

impl Switch {
    const fn apply(self, byte: u8, bits: u8) -> u8 {
        match self {
            Self::On => byte | bits,
            Self::Off => byte & !bits,
            Self::Toggle => byte ^ bits,
        }
    }
}

/// In-memory image of the display memory plus the print cursor
///
/// Digit and LED indexes beyond the configured counts are ignored by every
/// method, so callers never have to range-check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScreenBuffer {
    bytes: [u8; MEMORY_SIZE],
    digits: u8,
    leds: u8,
    cursor: u8,
}

impl ScreenBuffer {
    /// Create an empty buffer for the given number of digits and LEDs
    ///
    /// Counts above the controller maxima are clamped.
    pub fn new(digits: u8, leds: u8) -> Self {
        Self {
            bytes: [0; MEMORY_SIZE],
            digits: digits.min(MAX_DIGITS),
            leds: leds.min(MAX_LEDS),
            cursor: 0,
        }
    }

    /// Raw memory image, in controller address order
    pub fn as_bytes(&self) -> &[u8; MEMORY_SIZE] {
        &self.bytes
    }

    /// Number of usable digits
    pub fn digits(&self) -> u8 {
        self.digits
    }

    /// Number of usable LEDs
    pub fn leds(&self) -> u8 {
        self.leds
    }

    /// Digit the next printed glyph lands on
    ///
    /// Equal to [`digits()`](Self::digits) once the display is full.
    pub fn cursor(&self) -> u8 {
        self.cursor
    }

    /// Move the print cursor
    ///
    /// Positions past the last digit park the cursor at the end, where
    /// further glyphs are dropped.
    pub fn place(&mut self, digit: u8) {
        self.cursor = digit.min(self.digits);
    }

    /// Segment byte of a digit, radix included
    pub fn digit(&self, digit: u8) -> Option<u8> {
        (digit < self.digits).then(|| self.bytes[digit_address(digit)])
    }

    /// Colour of an LED
    pub fn led(&self, led: u8) -> Option<LedColor> {
        (led < self.leds).then(|| LedColor::from_bits(self.bytes[led_address(led)]))
    }

    /// Set the glyph segments of one digit, leaving its radix alone
    ///
    /// Advances the cursor past the digit.
    pub fn set_digit(&mut self, digit: u8, mask: u8) {
        if digit < self.digits {
            self.fill_range(mask, digit, digit);
        }
    }

    /// Apply a segment mask to an inclusive range of digits
    ///
    /// `start > stop` is normalised by swapping and `stop` is clamped to the
    /// last digit. Radix bits are preserved. The cursor ends up right after
    /// the last digit written.
    pub fn fill_range(&mut self, mask: u8, start: u8, stop: u8) {
        if self.digits == 0 {
            return;
        }
        let (start, stop) = if start > stop {
            (stop, start)
        } else {
            (start, stop)
        };
        let stop = stop.min(self.digits - 1);
        let mask = mask & GLYPH_MASK;
        for digit in start..=stop {
            let byte = &mut self.bytes[digit_address(digit)];
            *byte = (*byte & RADIX_BIT) | mask;
        }
        self.cursor = (stop + 1).max(start).min(self.digits);
    }

    /// Light all glyph segments of every digit
    pub fn digits_on(&mut self) {
        self.fill_range(GLYPH_MASK, 0, MAX_DIGITS - 1);
    }

    /// Blank the glyph segments of every digit and rewind the cursor
    pub fn digits_off(&mut self) {
        self.fill_range(0x00, 0, MAX_DIGITS - 1);
        self.cursor = 0;
    }

    /// Change the radix of one digit
    pub fn radix(&mut self, digit: u8, switch: Switch) {
        if digit < self.digits {
            let byte = &mut self.bytes[digit_address(digit)];
            *byte = switch.apply(*byte, RADIX_BIT);
        }
    }

    /// Change the radix of every digit
    pub fn radix_all(&mut self, switch: Switch) {
        for digit in 0..self.digits {
            self.radix(digit, switch);
        }
    }

    /// Change some colour bits of one LED, leaving the others alone
    pub fn led_bits(&mut self, led: u8, color: LedColor, switch: Switch) {
        if led < self.leds {
            let byte = &mut self.bytes[led_address(led)];
            *byte = switch.apply(*byte, color as u8);
        }
    }

    /// Change some colour bits of every LED
    pub fn led_bits_all(&mut self, color: LedColor, switch: Switch) {
        for led in 0..self.leds {
            self.led_bits(led, color, switch);
        }
    }

    /// Replace the colour of one LED
    pub fn set_led(&mut self, led: u8, color: LedColor) {
        if led < self.leds {
            self.bytes[led_address(led)] = color as u8;
        }
    }

    /// Turn every LED off
    pub fn leds_off(&mut self) {
        for led in 0..self.leds {
            self.set_led(led, LedColor::Off);
        }
    }

    /// Overwrite one memory byte as-is
    ///
    /// Only the low nibble of `address` is used, matching the address
    /// command.
    pub fn set_raw(&mut self, address: u8, byte: u8) {
        self.bytes[usize::from(address & ADDRESS_MASK)] = byte;
    }

    /// Zero the whole memory image and rewind the cursor
    pub fn clear(&mut self) {
        self.bytes = [0; MEMORY_SIZE];
        self.cursor = 0;
    }
}

impl Default for ScreenBuffer {
    fn default() -> Self {
        Self::new(MAX_DIGITS, MAX_LEDS)
    }
}
