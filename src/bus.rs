//! Bit-banged bus transport
//!
//! The TM1638 latches data on the rising edge of CLK while STB is low. Bytes
//! travel least-significant bit first in both directions. A transaction is
//! framed by pulling STB low (start) and releasing it high (stop); the first
//! byte of every transaction is interpreted as a command.
//!
//! [`Bus`] only knows about framing and shifting. The command families and the
//! multi-byte sequences built from them live in [`crate::command`].

use crate::interface::{BusInterface, Line, LineMode};

/// Default settle delay after a line change in microseconds
pub const DEFAULT_RELAX_US: u32 = 2;

type BusResult<T, I> = core::result::Result<T, <I as BusInterface>::Error>;

/// Transaction layer over a [`BusInterface`]
///
/// Owns the interface exclusively. There is no re-entrancy guard: a
/// transaction must be finished before the next one begins.
pub struct Bus<I> {
    /// Line-level capability
    pub(crate) interface: I,
    /// Settle delay in microseconds
    pub(crate) relax_us: u32,
    /// Command byte of the most recent transaction
    pub(crate) last_command: u8,
}

impl<I> Bus<I>
where
    I: BusInterface,
{
    /// Create a new bus with the given settle delay
    pub fn new(interface: I, relax_us: u32) -> Self {
        Self {
            interface,
            relax_us,
            last_command: 0,
        }
    }

    /// Put all three lines into output mode and park them idle high
    pub fn init(&mut self) -> BusResult<(), I> {
        self.interface.set_line_mode(Line::Clock, LineMode::Output)?;
        self.interface.set_line_mode(Line::Data, LineMode::Output)?;
        self.interface.set_line_mode(Line::Strobe, LineMode::Output)?;
        self.interface.write_line(Line::Strobe, true)?;
        self.interface.write_line(Line::Clock, true)?;
        self.interface.write_line(Line::Data, true)?;
        Ok(())
    }

    /// Start condition: STB high to low with CLK parked high
    pub fn begin_transaction(&mut self) -> BusResult<(), I> {
        self.interface.write_line(Line::Strobe, true)?;
        self.interface.write_line(Line::Clock, true)?;
        self.relax();
        self.interface.write_line(Line::Strobe, false)?;
        self.relax();
        Ok(())
    }

    /// Stop condition: STB back high
    pub fn end_transaction(&mut self) -> BusResult<(), I> {
        self.interface.write_line(Line::Strobe, true)?;
        self.relax();
        Ok(())
    }

    /// Shift one byte out, LSB first, one clock pulse per bit
    pub fn write_byte(&mut self, data: u8) -> BusResult<(), I> {
        for bit in 0..8 {
            self.interface.write_line(Line::Clock, false)?;
            self.interface.write_line(Line::Data, data & (1 << bit) != 0)?;
            self.relax();
            self.interface.write_line(Line::Clock, true)?;
            self.relax();
        }
        Ok(())
    }

    /// Shift one byte in, LSB first
    ///
    /// The data line must already be in input mode; [`Bus::receive`] takes
    /// care of the turnaround.
    pub fn read_byte(&mut self) -> BusResult<u8, I> {
        let mut value = 0;
        for bit in 0..8 {
            self.interface.write_line(Line::Clock, false)?;
            self.relax();
            if self.interface.read_line(Line::Data)? {
                value |= 1 << bit;
            }
            self.interface.write_line(Line::Clock, true)?;
            self.relax();
        }
        Ok(value)
    }

    /// Command byte of the most recent transaction
    pub fn last_command(&self) -> u8 {
        self.last_command
    }

    /// Access the underlying interface
    pub fn interface(&self) -> &I {
        &self.interface
    }

    /// Mutably access the underlying interface
    pub fn interface_mut(&mut self) -> &mut I {
        &mut self.interface
    }

    /// Give the interface back
    pub fn release(self) -> I {
        self.interface
    }

    pub(crate) fn relax(&mut self) {
        self.interface.delay_us(self.relax_us);
    }
}
