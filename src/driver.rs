//! Driver facade
//!
//! [`Tm1638`] composes the bus, the screen buffer, the font and the keypad
//! engine. Printing and LED operations only touch the in-memory
//! [`ScreenBuffer`]; call [`Tm1638::flush`] to push it to the controller.
//! Keypad gestures are recognised by calling [`Tm1638::poll`] from the main
//! loop with a millisecond timestamp.
//!
//! Every bus operation records a [`ResultCode`] and the command byte it sent,
//! so a caller that ignores the returned `Result` can still inspect
//! [`last_result()`](Tm1638::last_result) later.

use crate::buffer::{LedColor, ScreenBuffer, Switch};
use crate::bus::Bus;
use crate::command::{Addressing, Command, Direction, Mode, SCAN_BYTES};
use crate::config::{Config, MAX_CONTRAST, Pins};
use crate::error::{Error, ResultCode};
use crate::font::{Font, GLYPH_MASK, is_radix};
use crate::interface::BusInterface;
use crate::keypad::{GestureHandler, Keypad, NoHandler};

type DriverResult<T, I> = core::result::Result<T, Error<I>>;

/// TM1638 display and keypad driver
///
/// `'a` is the lifetime of the font table in use. `H` receives recognised
/// gestures; it defaults to [`NoHandler`].
pub struct Tm1638<'a, I, H = NoHandler>
where
    I: BusInterface,
{
    /// Transaction layer owning the line interface
    bus: Bus<I>,
    /// Configuration the driver was created with
    config: Config,
    /// Display memory mirror and print cursor
    buffer: ScreenBuffer,
    /// Glyph table for printing
    font: Font<'a>,
    /// Per-key gesture state
    keypad: Keypad,
    /// Gesture receiver
    handler: H,
    /// Current contrast level
    contrast: u8,
    /// Whether the display is switched on
    display_on: bool,
    /// Mode bit carried by every data command
    mode: Mode,
    /// Outcome of the last bus operation
    last_result: ResultCode,
    /// Timestamp of the last keypad scan
    last_scan: Option<u32>,
}

impl<'a, I> Tm1638<'a, I>
where
    I: BusInterface,
{
    /// Create a driver that ignores keypad gestures
    pub fn new(interface: I, config: Config) -> Self {
        Self::with_handler(interface, config, NoHandler)
    }
}

impl<'a, I, H> Tm1638<'a, I, H>
where
    I: BusInterface,
    H: GestureHandler,
{
    /// Create a driver that reports keypad gestures to `handler`
    ///
    /// Nothing is sent to the controller until [`begin()`](Self::begin).
    pub fn with_handler(interface: I, config: Config, handler: H) -> Self {
        let geometry = config.geometry;
        Self {
            bus: Bus::new(interface, config.timing.relax_us),
            buffer: ScreenBuffer::new(geometry.digits, geometry.leds),
            font: Font::default(),
            keypad: Keypad::new(geometry.keys, config.timing.thresholds()),
            handler,
            contrast: config.contrast & MAX_CONTRAST,
            display_on: false,
            mode: Mode::Normal,
            last_result: ResultCode::Success,
            last_scan: None,
            config,
        }
    }

    /// Initialize the lines and the controller
    ///
    /// Clears digits, radixes and LEDs, flushes the blank buffer and switches
    /// the display on at the configured contrast.
    ///
    /// # Errors
    ///
    /// Returns `Error::PinConflict` when two lines share a pin, in which case
    /// no line is touched.
    pub fn begin(&mut self) -> DriverResult<(), I> {
        self.check_pins()?;
        let result = self.bus.init();
        self.record(result)?;
        log::debug!(
            "tm1638: init clk={} dio={} stb={} digits={} leds={} keys={}",
            self.config.pins.clk,
            self.config.pins.dio,
            self.config.pins.stb,
            self.buffer.digits(),
            self.buffer.leds(),
            self.keypad.keys()
        );
        self.buffer.clear();
        self.keypad.reset();
        self.last_scan = None;
        self.flush()?;
        self.set_contrast(self.config.contrast)
    }

    /// Push the whole screen buffer to the controller
    ///
    /// Uses auto-increment addressing from address 0.
    pub fn flush(&mut self) -> DriverResult<(), I> {
        self.check_pins()?;
        let write = Command::data(self.mode, Addressing::AutoIncrement, Direction::Write);
        let result = self.bus.send_command(write).and_then(|()| {
            self.bus
                .send_command_buffer(Command::Address(0), self.buffer.as_bytes())
        });
        self.record(result)
    }

    /// Write one byte to one memory address using fixed addressing
    ///
    /// The screen buffer is updated to match.
    pub fn write_fixed(&mut self, address: u8, byte: u8) -> DriverResult<(), I> {
        self.check_pins()?;
        self.buffer.set_raw(address, byte);
        let write = Command::data(self.mode, Addressing::Fixed, Direction::Write);
        let result = self
            .bus
            .send_command(write)
            .and_then(|()| self.bus.send_command_data(Command::Address(address), byte));
        self.record(result)
    }

    /// Set the contrast level (masked to 0-7) and switch the display on
    pub fn set_contrast(&mut self, contrast: u8) -> DriverResult<(), I> {
        self.contrast = contrast & MAX_CONTRAST;
        log::debug!("tm1638: contrast {}", self.contrast);
        self.send_display(true)
    }

    /// Switch the display on at the current contrast
    pub fn display_on(&mut self) -> DriverResult<(), I> {
        log::debug!("tm1638: display on");
        self.send_display(true)
    }

    /// Switch the display off; display memory is kept
    pub fn display_off(&mut self) -> DriverResult<(), I> {
        log::debug!("tm1638: display off");
        self.send_display(false)
    }

    /// Select test mode for every following data command
    pub fn set_test_mode(&mut self, enabled: bool) {
        self.mode = if enabled { Mode::Test } else { Mode::Normal };
    }

    /// Whether test mode is selected
    pub fn test_mode(&self) -> bool {
        self.mode == Mode::Test
    }

    /// Print one character at the cursor
    ///
    /// Returns the number of digits consumed (0 or 1). A `.`, `,` or `:`
    /// without a glyph in the font lights the radix of the previous digit
    /// instead. Unknown characters are dropped, and so is everything once
    /// the cursor is past the last digit.
    pub fn write_char(&mut self, code: u8) -> usize {
        let cursor = self.buffer.cursor();
        if cursor >= self.buffer.digits() {
            return 0;
        }
        match self.font.resolve(code) {
            Some(mask) => {
                self.buffer.set_digit(cursor, mask);
                1
            }
            None if is_radix(code) && cursor > 0 => {
                self.buffer.radix(cursor - 1, Switch::On);
                0
            }
            _ => 0,
        }
    }

    /// Blank all digits and print `bytes` from the first digit
    ///
    /// Returns the number of digits consumed.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> usize {
        self.buffer.digits_off();
        bytes.iter().map(|code| self.write_char(*code)).sum()
    }

    /// Blank all digits and print `text` from the first digit
    ///
    /// Returns the number of digits consumed.
    pub fn write_text(&mut self, text: &str) -> usize {
        self.write_bytes(text.as_bytes())
    }

    /// Move the print cursor
    pub fn place(&mut self, digit: u8) {
        self.buffer.place(digit);
    }

    /// Current print cursor
    pub fn cursor(&self) -> u8 {
        self.buffer.cursor()
    }

    /// Set the glyph segments of a digit
    pub fn print_digit(&mut self, digit: u8, mask: u8) {
        self.buffer.set_digit(digit, mask);
    }

    /// Light all glyph segments of a digit
    pub fn digit_on(&mut self, digit: u8) {
        self.buffer.set_digit(digit, GLYPH_MASK);
    }

    /// Blank the glyph segments of a digit
    pub fn digit_off(&mut self, digit: u8) {
        self.buffer.set_digit(digit, 0);
    }

    /// Light all glyph segments of every digit
    pub fn digits_on_all(&mut self) {
        self.buffer.digits_on();
    }

    /// Blank every digit and rewind the cursor
    pub fn digits_off_all(&mut self) {
        self.buffer.digits_off();
    }

    /// Light the radix of a digit
    pub fn radix_on(&mut self, digit: u8) {
        self.buffer.radix(digit, Switch::On);
    }

    /// Clear the radix of a digit
    pub fn radix_off(&mut self, digit: u8) {
        self.buffer.radix(digit, Switch::Off);
    }

    /// Invert the radix of a digit
    pub fn radix_toggle(&mut self, digit: u8) {
        self.buffer.radix(digit, Switch::Toggle);
    }

    /// Light every radix
    pub fn radix_on_all(&mut self) {
        self.buffer.radix_all(Switch::On);
    }

    /// Clear every radix
    pub fn radix_off_all(&mut self) {
        self.buffer.radix_all(Switch::Off);
    }

    /// Invert every radix
    pub fn radix_toggle_all(&mut self) {
        self.buffer.radix_all(Switch::Toggle);
    }

    /// Light one colour of an LED, keeping the other
    pub fn led_on(&mut self, led: u8, color: LedColor) {
        self.buffer.led_bits(led, color, Switch::On);
    }

    /// Turn one colour of an LED off, keeping the other
    pub fn led_off(&mut self, led: u8, color: LedColor) {
        self.buffer.led_bits(led, color, Switch::Off);
    }

    /// Invert one colour of an LED
    pub fn led_toggle(&mut self, led: u8, color: LedColor) {
        self.buffer.led_bits(led, color, Switch::Toggle);
    }

    /// Light one colour of every LED
    pub fn led_on_all(&mut self, color: LedColor) {
        self.buffer.led_bits_all(color, Switch::On);
    }

    /// Turn one colour of every LED off
    pub fn led_off_all(&mut self, color: LedColor) {
        self.buffer.led_bits_all(color, Switch::Off);
    }

    /// Invert one colour of every LED
    pub fn led_toggle_all(&mut self, color: LedColor) {
        self.buffer.led_bits_all(color, Switch::Toggle);
    }

    /// Replace the colour of an LED
    pub fn set_led(&mut self, led: u8, color: LedColor) {
        self.buffer.set_led(led, color);
    }

    /// Turn every LED off
    pub fn leds_off(&mut self) {
        self.buffer.leds_off();
    }

    /// Zero digits, radixes and LEDs and rewind the cursor
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Read the raw key scan bytes
    pub fn read_keys(&mut self) -> DriverResult<[u8; SCAN_BYTES], I> {
        self.check_pins()?;
        let read = Command::data(self.mode, Addressing::AutoIncrement, Direction::Read);
        let result = self.bus.receive(read);
        self.record(result)
    }

    /// Service the keypad
    ///
    /// Scans at most once per configured interval; the first call always
    /// scans. `now_ms` is a free-running millisecond counter and may wrap.
    /// Recognised gestures are handed to the handler before this returns.
    ///
    /// Returns the number of gestures emitted. A failed scan emits nothing.
    pub fn poll(&mut self, now_ms: u32) -> DriverResult<usize, I> {
        if self.keypad.keys() == 0 {
            return Ok(0);
        }
        if let Some(last) = self.last_scan {
            if now_ms.wrapping_sub(last) < self.config.timing.scan_interval_ms {
                return Ok(0);
            }
        }
        self.last_scan = Some(now_ms);
        let scan = self.read_keys()?;
        Ok(self.keypad.process(&scan, &mut self.handler))
    }

    /// Outcome of the last bus operation
    pub fn last_result(&self) -> ResultCode {
        self.last_result
    }

    /// Command byte of the last transaction
    pub fn last_command(&self) -> u8 {
        self.bus.last_command()
    }

    /// Whether the last bus operation succeeded
    pub fn is_success(&self) -> bool {
        self.last_result.is_success()
    }

    /// Whether the last bus operation failed
    pub fn is_error(&self) -> bool {
        !self.is_success()
    }

    /// Use a different font for printing
    pub fn set_font(&mut self, font: Font<'a>) {
        self.font = font;
    }

    /// Font used for printing
    pub fn font(&self) -> Font<'a> {
        self.font
    }

    /// Number of digits
    pub fn digits(&self) -> u8 {
        self.buffer.digits()
    }

    /// Number of LEDs
    pub fn leds(&self) -> u8 {
        self.buffer.leds()
    }

    /// Number of scanned keys
    pub fn keys(&self) -> u8 {
        self.keypad.keys()
    }

    /// Current contrast level
    pub fn contrast(&self) -> u8 {
        self.contrast
    }

    /// Whether the display was last switched on
    pub fn is_display_on(&self) -> bool {
        self.display_on
    }

    /// Configured pin numbers
    pub fn pins(&self) -> Pins {
        self.config.pins
    }

    /// Get configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Screen buffer
    pub fn buffer(&self) -> &ScreenBuffer {
        &self.buffer
    }

    /// Mutable screen buffer for operations without a wrapper here
    pub fn buffer_mut(&mut self) -> &mut ScreenBuffer {
        &mut self.buffer
    }

    /// Keypad gesture state
    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    /// Gesture handler
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Mutable gesture handler
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Access the underlying interface
    pub fn interface(&self) -> &I {
        self.bus.interface()
    }

    /// Mutably access the underlying interface
    pub fn interface_mut(&mut self) -> &mut I {
        self.bus.interface_mut()
    }

    /// Give the interface back
    pub fn release(self) -> I {
        self.bus.release()
    }

    fn send_display(&mut self, on: bool) -> DriverResult<(), I> {
        self.check_pins()?;
        let result = self.bus.send_command(Command::Display {
            on,
            contrast: self.contrast,
        });
        self.record(result)?;
        self.display_on = on;
        Ok(())
    }

    fn check_pins(&mut self) -> DriverResult<(), I> {
        if self.config.pins.conflict() {
            self.last_result = ResultCode::PinConflict;
            return Err(Error::PinConflict);
        }
        Ok(())
    }

    fn record<T>(&mut self, result: Result<T, I::Error>) -> DriverResult<T, I> {
        match result {
            Ok(value) => {
                self.last_result = ResultCode::Success;
                Ok(value)
            }
            Err(e) => {
                let error = Error::Interface(e);
                self.last_result = error.code();
                log::debug!("tm1638: bus error after command {:#04x}", self.last_command());
                Err(error)
            }
        }
    }
}

impl<I, H> core::fmt::Write for Tm1638<'_, I, H>
where
    I: BusInterface,
    H: GestureHandler,
{
    /// Print at the cursor without blanking first
    ///
    /// Characters that do not fit or have no glyph are dropped, never
    /// reported as an error.
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for code in s.bytes() {
            self.write_char(code);
        }
        Ok(())
    }
}
