//! Recording bus used by the unit tests
//!
//! `MockLines` decodes the line activity it sees back into bytes, the way the
//! controller would: a transaction starts on the strobe falling edge and a bit
//! is latched on every clock rising edge while the data line is an output.
//! Reads are answered LSB first from `replies`.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use crate::interface::{BusInterface, Line, LineMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

#[derive(Debug, Default)]
pub struct MockLines {
    clk: bool,
    dio: bool,
    stb: bool,
    dio_mode: LineMode,
    shift: u8,
    bits: u8,
    reply_bit: u8,
    /// Bytes written, grouped per strobe-framed transaction
    pub transactions: Vec<Vec<u8>>,
    /// Bytes handed out to read requests, consumed front first
    pub replies: VecDeque<u8>,
    /// Every mode change of the data line, in order
    pub data_modes: Vec<LineMode>,
    /// Total requested delay in microseconds
    pub delay_total_us: u32,
    /// Number of data line samples taken
    pub samples: usize,
    /// Makes every line write fail
    pub fail_writes: bool,
    /// Makes writes to the data line fail, leaving clock and strobe working
    pub fail_data_writes: bool,
    /// Makes every data line sample fail
    pub fail_reads: bool,
}

impl MockLines {
    pub fn new() -> Self {
        Self {
            stb: true,
            clk: true,
            ..Self::default()
        }
    }

    pub fn with_replies(replies: &[u8]) -> Self {
        let mut lines = Self::new();
        lines.replies.extend(replies.iter().copied());
        lines
    }

    pub fn strobe_high(&self) -> bool {
        self.stb
    }

    pub fn clock_high(&self) -> bool {
        self.clk
    }

    pub fn data_mode(&self) -> LineMode {
        self.dio_mode
    }

    /// First byte of every transaction
    pub fn commands(&self) -> Vec<u8> {
        self.transactions
            .iter()
            .filter_map(|t| t.first().copied())
            .collect()
    }
}

impl BusInterface for MockLines {
    type Error = MockError;

    fn set_line_mode(&mut self, line: Line, mode: LineMode) -> Result<(), Self::Error> {
        if line == Line::Data {
            self.dio_mode = mode;
            self.data_modes.push(mode);
        }
        Ok(())
    }

    fn write_line(&mut self, line: Line, high: bool) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err(MockError);
        }
        match line {
            Line::Strobe => {
                if self.stb && !high {
                    self.transactions.push(Vec::new());
                    self.shift = 0;
                    self.bits = 0;
                }
                self.stb = high;
            }
            Line::Clock => {
                let rising = !self.clk && high;
                self.clk = high;
                if rising && !self.stb && self.dio_mode == LineMode::Output {
                    self.shift |= u8::from(self.dio) << self.bits;
                    self.bits += 1;
                    if self.bits == 8 {
                        if let Some(current) = self.transactions.last_mut() {
                            current.push(self.shift);
                        }
                        self.shift = 0;
                        self.bits = 0;
                    }
                }
            }
            Line::Data => {
                if self.fail_data_writes || self.dio_mode == LineMode::Input {
                    return Err(MockError);
                }
                self.dio = high;
            }
        }
        Ok(())
    }

    fn read_line(&mut self, line: Line) -> Result<bool, Self::Error> {
        if self.fail_reads || line != Line::Data || self.dio_mode != LineMode::Input {
            return Err(MockError);
        }
        self.samples += 1;
        let byte = self.replies.front().copied().unwrap_or(0);
        let bit = (byte >> self.reply_bit) & 1 != 0;
        self.reply_bit += 1;
        if self.reply_bit == 8 {
            self.reply_bit = 0;
            self.replies.pop_front();
        }
        Ok(bit)
    }

    fn delay_us(&mut self, us: u32) {
        self.delay_total_us += us;
    }
}
