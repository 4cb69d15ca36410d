//! TM1638 Display and Keypad Driver
//!
//! A driver for the TM1638 LED controller found on the common "LED&KEY"
//! boards: up to 8 seven-segment digits with decimal points, 8 two-colour
//! LEDs and a scanned keypad of up to 24 keys, all on a 3-wire bit-banged bus.
//!
//! ## Features
//!
//! - `no_std` compatible, no allocation
//! - `embedded-hal` v1.0 support
//! - Screen buffer with print cursor, radix and LED control
//! - Pluggable 7-segment fonts
//! - Click, double-click, hold and double-hold recognition for every key
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::{InputPin, OutputPin};
//! use tm1638::{Builder, Gesture, Interface, Tm1638};
//!
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl InputPin for MockPin {
//! #     fn is_high(&mut self) -> Result<bool, Self::Error> { Ok(false) }
//! #     fn is_low(&mut self) -> Result<bool, Self::Error> { Ok(true) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # fn millis() -> u32 { 0 }
//! let interface = Interface::new(MockPin, MockPin, MockPin, MockDelay);
//! let config = match Builder::new().pins(2, 3, 4).keys(8).build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//!
//! let on_gesture = |key: u8, gesture: Gesture| {
//!     let _ = (key, gesture.code());
//! };
//! let mut tm = Tm1638::with_handler(interface, config, on_gesture);
//! if tm.begin().is_err() {
//!     return;
//! }
//!
//! tm.write_text("12.34");
//! tm.radix_on(7);
//! let _ = tm.flush();
//!
//! loop {
//!     let _ = tm.poll(millis());
//! }
//! ```

#![no_std]

#[cfg(test)]
extern crate alloc;

/// Screen buffer and digit/LED addressing
pub mod buffer;
/// Bit-banged bus transport
pub mod bus;
/// TM1638 command definitions
pub mod command;
/// Driver configuration types and builder
pub mod config;
/// Driver facade
pub mod driver;
/// Error types for the driver
pub mod error;
/// Seven-segment fonts
pub mod font;
/// Hardware interface abstraction
pub mod interface;
/// Keypad gesture recognition
pub mod keypad;

#[cfg(test)]
mod mock;

pub use buffer::{LedColor, ScreenBuffer, Switch};
pub use bus::Bus;
pub use command::Command;
pub use config::{
    Builder, Config, Geometry, MAX_CONTRAST, MAX_DIGITS, MAX_KEYS, MAX_LEDS, Pins, Timing,
};
pub use driver::Tm1638;
pub use error::{BuilderError, Error, ResultCode};
pub use font::{FONT_BASIC, FONT_DECIMAL, FONT_HEX, Font};
pub use interface::{BusInterface, Interface, InterfaceError, Line, LineMode};
pub use keypad::{Gesture, GestureHandler, KeyState, Keypad, NoHandler};
