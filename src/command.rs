//! TM1638 command definitions
//!
//! The controller understands three command families, told apart by the two
//! top bits of the first byte in a transaction:
//!
//! | Family          | Base   | Fields                                          |
//! |-----------------|--------|-------------------------------------------------|
//! | Data setting    | `0x40` | bit 3 test mode, bit 2 fixed address, bit 1 read |
//! | Address setting | `0xC0` | bits 0-3 display memory address                 |
//! | Display control | `0x80` | bit 3 display on, bits 0-2 contrast             |
//!
//! [`Command`] composes those fields explicitly instead of OR-ing loose
//! constants together. The multi-byte sequences built from commands are
//! implemented on [`Bus`].
//!
//! ## Example
//!
//! ```
//! use tm1638::command::{Addressing, Command, Direction, Mode};
//!
//! let write_auto = Command::data(Mode::Normal, Addressing::AutoIncrement, Direction::Write);
//! assert_eq!(write_auto.byte(), 0x40);
//!
//! let read_keys = Command::data(Mode::Normal, Addressing::AutoIncrement, Direction::Read);
//! assert_eq!(read_keys.byte(), 0x42);
//!
//! assert_eq!(Command::Address(0x03).byte(), 0xC3);
//! assert_eq!(Command::Display { on: true, contrast: 7 }.byte(), 0x8F);
//! ```

use crate::bus::Bus;
use crate::interface::{BusInterface, Line, LineMode};

/// Data setting command base (0x40)
pub const DATA_COMMAND: u8 = 0b0100_0000;

/// Address setting command base (0xC0)
///
/// ORed with the display memory address in the low nibble.
pub const ADDRESS_COMMAND: u8 = 0b1100_0000;

/// Display control command base (0x80)
pub const DISPLAY_COMMAND: u8 = 0b1000_0000;

/// Display on bit of the display control command
pub const DISPLAY_ON: u8 = 0b1000;

/// Mask for the contrast level in the display control command
pub const CONTRAST_MASK: u8 = 0b0111;

/// Mask for the address in the address setting command
pub const ADDRESS_MASK: u8 = 0b1111;

/// Number of addressable display memory positions
pub const MEMORY_SIZE: usize = 16;

/// Number of bytes returned by a key scan read
pub const SCAN_BYTES: usize = 4;

/// Transfer direction of a data setting command
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum Direction {
    /// Write data to display memory
    #[default]
    Write = 0b00,
    /// Read key scan data
    Read = 0b10,
}

/// Address handling of a data setting command
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum Addressing {
    /// Address counter advances after each data byte
    #[default]
    AutoIncrement = 0b000,
    /// Every data byte goes to the address set last
    Fixed = 0b100,
}

/// Operating mode of a data setting command
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum Mode {
    /// Normal operation
    #[default]
    Normal = 0b0000,
    /// Factory test mode
    Test = 0b1000,
}

/// One command byte, by family
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Data setting command
    Data {
        /// Normal or test mode
        mode: Mode,
        /// Auto-increment or fixed addressing
        addressing: Addressing,
        /// Write to display memory or read keys
        direction: Direction,
    },
    /// Address setting command; only the low nibble is used
    Address(u8),
    /// Display control command
    Display {
        /// Whether the display is lit
        on: bool,
        /// Contrast level 0-7; higher bits are ignored
        contrast: u8,
    },
}

impl Command {
    /// Build a data setting command
    pub const fn data(mode: Mode, addressing: Addressing, direction: Direction) -> Self {
        Self::Data {
            mode,
            addressing,
            direction,
        }
    }

    /// Encode into the byte sent on the bus
    pub const fn byte(self) -> u8 {
        match self {
            Self::Data {
                mode,
                addressing,
                direction,
            } => DATA_COMMAND | mode as u8 | addressing as u8 | direction as u8,
            Self::Address(address) => ADDRESS_COMMAND | (address & ADDRESS_MASK),
            Self::Display { on, contrast } => {
                let on = if on { DISPLAY_ON } else { 0 };
                DISPLAY_COMMAND | on | (contrast & CONTRAST_MASK)
            }
        }
    }
}

impl From<Command> for u8 {
    fn from(command: Command) -> u8 {
        command.byte()
    }
}

type BusResult<T, I> = core::result::Result<T, <I as BusInterface>::Error>;

impl<I> Bus<I>
where
    I: BusInterface,
{
    /// Send a sole command byte in its own transaction
    pub fn send_command(&mut self, command: impl Into<u8>) -> BusResult<(), I> {
        let command = command.into();
        log::trace!("tm1638: command {command:#04x}");
        self.last_command = command;
        self.begin_transaction()?;
        let result = self.write_byte(command);
        self.finish(result)
    }

    /// Send a command followed by one data byte
    ///
    /// Used with an address command after fixed addressing was selected.
    pub fn send_command_data(&mut self, command: impl Into<u8>, data: u8) -> BusResult<(), I> {
        let command = command.into();
        log::trace!("tm1638: command {command:#04x} data {data:#04x}");
        self.last_command = command;
        self.begin_transaction()?;
        let result = self
            .write_byte(command)
            .and_then(|()| self.write_byte(data));
        self.finish(result)
    }

    /// Send a command followed by a run of data bytes
    ///
    /// Used with an address command after auto-increment addressing was
    /// selected, so the bytes land in consecutive memory positions.
    pub fn send_command_buffer(&mut self, command: impl Into<u8>, data: &[u8]) -> BusResult<(), I> {
        let command = command.into();
        log::trace!("tm1638: command {command:#04x} with {} bytes", data.len());
        self.last_command = command;
        self.begin_transaction()?;
        let result = core::iter::once(&command)
            .chain(data)
            .try_for_each(|byte| self.write_byte(*byte));
        self.finish(result)
    }

    /// Send a read command and collect the key scan bytes
    ///
    /// The data line is turned around to input after the command byte and
    /// back to output before the stop condition.
    pub fn receive(&mut self, command: impl Into<u8>) -> BusResult<[u8; SCAN_BYTES], I> {
        let command = command.into();
        self.last_command = command;
        self.begin_transaction()?;
        let result = self.write_byte(command).and_then(|()| self.read_scan());
        let scan = self.finish(result)?;
        log::trace!("tm1638: scan {scan:02x?}");
        Ok(scan)
    }

    fn read_scan(&mut self) -> BusResult<[u8; SCAN_BYTES], I> {
        self.interface.set_line_mode(Line::Data, LineMode::Input)?;
        // tWAIT between the command and the first read clock
        self.relax();
        let mut scan = [0u8; SCAN_BYTES];
        let result = scan.iter_mut().try_for_each(|byte| -> BusResult<(), I> {
            *byte = self.read_byte()?;
            Ok(())
        });
        let restore = self.interface.set_line_mode(Line::Data, LineMode::Output);
        result.and(restore).map(|()| scan)
    }

    /// Stop condition after the body of a transaction
    ///
    /// The strobe is released even when the body failed; the body's error
    /// takes precedence over one from the stop condition.
    fn finish<T>(&mut self, result: BusResult<T, I>) -> BusResult<T, I> {
        let end = self.end_transaction();
        let value = result?;
        end.map(|()| value)
    }
}
