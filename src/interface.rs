//! Hardware interface abstraction
//!
//! This module provides the [`BusInterface`] trait and the [`Interface`] struct
//! for driving the three TM1638 bus lines.
//!
//! ## Hardware Requirements
//!
//! The TM1638 requires 3 GPIO pins:
//! - **CLK**: Serial clock (output)
//! - **DIO**: Data in/out (open-drain output that can also be read back)
//! - **STB**: Strobe, active low chip select (output)
//!
//! The bus is not SPI: bytes are shifted LSB first and the data line turns
//! around for key scan reads, so everything is bit-banged on top of this trait.
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::{InputPin, OutputPin};
//! use tm1638::{BusInterface, Interface, Line, LineMode};
//! # use core::convert::Infallible;
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
//! let mut interface = Interface::new(MockPin, MockPin, MockPin, MockDelay);
//!
//! let _ = interface.write_line(Line::Strobe, false);
//! let _ = interface.set_line_mode(Line::Data, LineMode::Input);
//! let _ = interface.read_line(Line::Data);
//! interface.delay_us(2);
//! ```

use core::fmt::Debug;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

type InterfaceResult<T, E> = core::result::Result<T, E>;

/// One of the three bus lines
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Line {
    /// Serial clock
    Clock,
    /// Bidirectional data
    Data,
    /// Strobe (chip select, active low)
    Strobe,
}

/// Direction of a bus line
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineMode {
    /// Driven by the microcontroller
    #[default]
    Output,
    /// Released so the controller can drive it
    Input,
}

/// Trait for the line-level capability the driver is built on
///
/// Implement this on your own type when the pins cannot be expressed with the
/// embedded-hal traits [`Interface`] requires (for example a flexible pin that
/// really switches direction, or a port expander).
pub trait BusInterface {
    /// Error type for line operations
    type Error: Debug;

    /// Switch a line between output and input mode
    ///
    /// Only [`Line::Data`] is ever switched to input by the driver.
    fn set_line_mode(&mut self, line: Line, mode: LineMode) -> InterfaceResult<(), Self::Error>;

    /// Drive a line high (`true`) or low (`false`)
    fn write_line(&mut self, line: Line, high: bool) -> InterfaceResult<(), Self::Error>;

    /// Sample the level of a line, `true` meaning high
    fn read_line(&mut self, line: Line) -> InterfaceResult<bool, Self::Error>;

    /// Block for the given number of microseconds
    fn delay_us(&mut self, us: u32);
}

/// Errors that can occur at the interface level
#[derive(Debug)]
pub enum InterfaceError<PinErr> {
    /// GPIO pin error
    Pin(PinErr),
    /// The requested operation is not available on this line
    Unsupported(Line),
}

impl<PinErr: Debug> core::fmt::Display for InterfaceError<PinErr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Pin(e) => write!(f, "Pin error: {e:?}"),
            Self::Unsupported(line) => write!(f, "Unsupported operation on {line:?} line"),
        }
    }
}

impl<PinErr: Debug> core::error::Error for InterfaceError<PinErr> {}

/// Hardware interface implementation for TM1638
///
/// Implements [`BusInterface`] for embedded-hal v1.0 GPIO and delay traits.
///
/// The data pin is treated as open-drain: switching it to input releases it
/// high so the controller can pull it low, and switching back to output is a
/// no-op because the next write drives it again.
///
/// ## Type Parameters
///
/// * `CLK` - Clock pin implementing [`OutputPin`]
/// * `DIO` - Data pin implementing [`OutputPin`] and [`InputPin`]
/// * `STB` - Strobe pin implementing [`OutputPin`]
/// * `D` - Delay provider implementing [`DelayNs`]
pub struct Interface<CLK, DIO, STB, D> {
    /// Serial clock pin
    clk: CLK,
    /// Data in/out pin
    dio: DIO,
    /// Strobe pin (active low)
    stb: STB,
    /// Microsecond delay source
    delay: D,
}

impl<CLK, DIO, STB, D> Interface<CLK, DIO, STB, D>
where
    CLK: OutputPin,
    DIO: OutputPin + InputPin,
    STB: OutputPin,
    D: DelayNs,
{
    /// Create a new Interface
    ///
    /// # Arguments
    ///
    /// * `clk` - Clock pin (output)
    /// * `dio` - Data pin (open-drain output, readable)
    /// * `stb` - Strobe pin (output, active low)
    /// * `delay` - Delay provider used for bus settle times
    pub fn new(clk: CLK, dio: DIO, stb: STB, delay: D) -> Self {
        Self {
            clk,
            dio,
            stb,
            delay,
        }
    }

    /// Give the pins and delay back
    pub fn release(self) -> (CLK, DIO, STB, D) {
        (self.clk, self.dio, self.stb, self.delay)
    }
}

impl<CLK, DIO, STB, D, PinErr> BusInterface for Interface<CLK, DIO, STB, D>
where
    CLK: OutputPin<Error = PinErr>,
    DIO: OutputPin<Error = PinErr> + InputPin<Error = PinErr>,
    STB: OutputPin<Error = PinErr>,
    D: DelayNs,
    PinErr: Debug,
{
    type Error = InterfaceError<PinErr>;

    fn set_line_mode(&mut self, line: Line, mode: LineMode) -> InterfaceResult<(), Self::Error> {
        match (line, mode) {
            (Line::Data, LineMode::Input) => self.dio.set_high().map_err(InterfaceError::Pin),
            (_, LineMode::Output) => Ok(()),
            (line, LineMode::Input) => Err(InterfaceError::Unsupported(line)),
        }
    }

    fn write_line(&mut self, line: Line, high: bool) -> InterfaceResult<(), Self::Error> {
        let result = match (line, high) {
            (Line::Clock, true) => self.clk.set_high(),
            (Line::Clock, false) => self.clk.set_low(),
            (Line::Data, true) => self.dio.set_high(),
            (Line::Data, false) => self.dio.set_low(),
            (Line::Strobe, true) => self.stb.set_high(),
            (Line::Strobe, false) => self.stb.set_low(),
        };
        result.map_err(InterfaceError::Pin)
    }

    fn read_line(&mut self, line: Line) -> InterfaceResult<bool, Self::Error> {
        match line {
            Line::Data => self.dio.is_high().map_err(InterfaceError::Pin),
            other => Err(InterfaceError::Unsupported(other)),
        }
    }

    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use embedded_hal::digital::ErrorType;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct MockError;

    impl embedded_hal::digital::Error for MockError {
        fn kind(&self) -> embedded_hal::digital::ErrorKind {
            embedded_hal::digital::ErrorKind::Other
        }
    }

    struct MockPin<'a> {
        level: &'a Cell<bool>,
    }

    impl ErrorType for MockPin<'_> {
        type Error = MockError;
    }

    impl OutputPin for MockPin<'_> {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.level.set(false);
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.level.set(true);
            Ok(())
        }
    }

    impl InputPin for MockPin<'_> {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(self.level.get())
        }
        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.level.get())
        }
    }

    struct MockDelay<'a> {
        total_ns: &'a Cell<u32>,
    }

    impl DelayNs for MockDelay<'_> {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns.set(self.total_ns.get() + ns);
        }
    }

    #[derive(Default)]
    struct Levels {
        clk: Cell<bool>,
        dio: Cell<bool>,
        stb: Cell<bool>,
        ns: Cell<u32>,
    }

    type TestInterface<'a> = Interface<MockPin<'a>, MockPin<'a>, MockPin<'a>, MockDelay<'a>>;

    fn test_interface(levels: &Levels) -> TestInterface<'_> {
        Interface::new(
            MockPin { level: &levels.clk },
            MockPin { level: &levels.dio },
            MockPin { level: &levels.stb },
            MockDelay {
                total_ns: &levels.ns,
            },
        )
    }

    #[test]
    fn test_write_line_drives_matching_pin() {
        let levels = Levels::default();
        let mut interface = test_interface(&levels);

        interface.write_line(Line::Strobe, true).unwrap();
        assert!(levels.stb.get());
        assert!(!levels.clk.get());
        assert!(!levels.dio.get());

        interface.write_line(Line::Clock, true).unwrap();
        interface.write_line(Line::Data, true).unwrap();
        interface.write_line(Line::Strobe, false).unwrap();
        assert!(levels.clk.get());
        assert!(levels.dio.get());
        assert!(!levels.stb.get());
    }

    #[test]
    fn test_data_input_mode_releases_line_high() {
        let levels = Levels::default();
        let mut interface = test_interface(&levels);

        interface.set_line_mode(Line::Data, LineMode::Input).unwrap();
        assert!(levels.dio.get());
        assert!(interface.read_line(Line::Data).unwrap());

        levels.dio.set(false);
        assert!(!interface.read_line(Line::Data).unwrap());
    }

    #[test]
    fn test_only_data_line_is_readable() {
        let levels = Levels::default();
        let mut interface = test_interface(&levels);

        assert!(matches!(
            interface.read_line(Line::Clock),
            Err(InterfaceError::Unsupported(Line::Clock))
        ));
        assert!(matches!(
            interface.set_line_mode(Line::Strobe, LineMode::Input),
            Err(InterfaceError::Unsupported(Line::Strobe))
        ));
        assert!(interface.set_line_mode(Line::Clock, LineMode::Output).is_ok());
    }

    #[test]
    fn test_delay_us_forwards_to_delay() {
        let levels = Levels::default();
        let mut interface = test_interface(&levels);

        interface.delay_us(2);
        assert_eq!(levels.ns.get(), 2_000);
    }
}
