//! Error types for the driver
//!
//! This module defines error types for configuration building ([`BuilderError`])
//! and bus operations ([`Error`]), plus the numeric [`ResultCode`] the driver
//! records after every operation.
//!
//! ## Error Types
//!
//! - [`BuilderError`] - Errors during configuration construction
//! - [`Error`] - Runtime errors during bus operations
//! - [`InterfaceError`](crate::interface::InterfaceError) - Low-level pin errors
//!
//! The TM1638 never acknowledges a transfer, so a corrupted transaction looks
//! exactly like a successful one. At runtime only a failing line primitive or
//! an invalid pin assignment is reported.
//!
//! ## Example
//!
//! ```
//! use tm1638::{Builder, BuilderError, ResultCode};
//!
//! // Clock and strobe on the same pin
//! let result = Builder::new().pins(4, 5, 4).build();
//! assert!(matches!(result, Err(BuilderError::PinConflict { .. })));
//!
//! if let Err(e) = result {
//!     assert_eq!(e.code(), ResultCode::PinConflict);
//!     assert_eq!(e.code() as u8, 255);
//! }
//! ```

use crate::interface::BusInterface;

/// Numeric outcome of the last driver operation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum ResultCode {
    /// Operation completed
    #[default]
    Success = 0,
    /// Two or more bus lines share a pin
    PinConflict = 255,
    /// Missing acknowledgment
    ///
    /// Reserved. The TM1638 bus has no acknowledgment, so this is never
    /// produced.
    Ack = 254,
    /// A line primitive reported failure
    Bus = 253,
}

impl ResultCode {
    /// Whether the code denotes success
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<ResultCode> for u8 {
    fn from(code: ResultCode) -> u8 {
        code as u8
    }
}

/// Errors that can occur when talking to the controller
///
/// Generic over the interface type to preserve the specific error type.
/// This allows error handling code to match on the underlying hardware error.
#[derive(Debug)]
pub enum Error<I: BusInterface> {
    /// Interface error (GPIO)
    ///
    /// Wraps the underlying error from the [`BusInterface`] implementation.
    Interface(I::Error),
    /// Two or more bus lines share a pin
    ///
    /// Reported by every bus operation of a driver whose [`Config`](crate::Config)
    /// was assembled by hand with conflicting pins.
    PinConflict,
}

impl<I: BusInterface> Error<I> {
    /// Result code recorded for this error
    pub const fn code(&self) -> ResultCode {
        match self {
            Self::Interface(_) => ResultCode::Bus,
            Self::PinConflict => ResultCode::PinConflict,
        }
    }
}

impl<I: BusInterface> core::fmt::Display for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Interface(e) => write!(f, "Interface error: {e:?}"),
            Self::PinConflict => write!(f, "Pin conflict"),
        }
    }
}

impl<I: BusInterface + core::fmt::Debug> core::error::Error for Error<I> {}

/// Errors that can occur when building configuration
///
/// These errors occur during the builder pattern before the driver is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuilderError {
    /// Two or more bus lines were assigned the same pin
    ///
    /// See [`Builder::pins()`](crate::config::Builder::pins).
    PinConflict {
        /// Clock pin requested
        clk: u8,
        /// Data pin requested
        dio: u8,
        /// Strobe pin requested
        stb: u8,
    },
}

impl BuilderError {
    /// Result code for this error
    pub const fn code(&self) -> ResultCode {
        match self {
            Self::PinConflict { .. } => ResultCode::PinConflict,
        }
    }
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::PinConflict { clk, dio, stb } => write!(
                f,
                "Pin conflict: clk={clk}, dio={dio}, stb={stb} must be distinct"
            ),
        }
    }
}

impl core::error::Error for BuilderError {}
