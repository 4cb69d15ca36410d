//! Keypad scanning and gesture recognition
//!
//! Each scan samples every configured key once and classifies the sample
//! into a [`KeyState`]. Whenever a key's state differs from the previous
//! scan, the new state is pushed onto the front of a short history and the
//! history is matched against fixed templates to recognise a [`Gesture`].
//!
//! Templates are listed newest first. With the default thresholds
//! (long press after 5 scans, long wait after 2 scans) a single click is
//! a short press followed by two released scans:
//!
//! ```text
//! scan:    idle  press  release  release
//! state:   WL    PS     WS       WL        -> history [WL, WS, PS, WL, ..] -> Click
//! ```
//!
//! Evaluating only on state changes lets the longer double-click and
//! double-hold templates settle before a shorter template fires.

use crate::command::SCAN_BYTES;
use crate::config::MAX_KEYS;

/// Length of the per-key state history
pub const HISTORY_LEN: usize = 5;

/// Instantaneous classification of one key sample
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyState {
    /// Released for fewer scans than the wait threshold
    WaitShort,
    /// Released for at least the wait threshold
    WaitLong,
    /// Pressed for fewer scans than the long-press threshold
    PressShort,
    /// Pressed for at least the long-press threshold
    PressLong,
}

/// Recognised key gesture
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Gesture {
    /// Short press and release
    Click = 1,
    /// Two short presses in quick succession
    DoubleClick = 2,
    /// Press held past the long-press threshold
    Hold = 3,
    /// Short press, release, then a press held past the threshold
    DoubleHold = 4,
}

impl Gesture {
    /// Numeric gesture code
    pub const fn code(self) -> u8 {
        self as u8
    }
}

use KeyState::{PressLong, PressShort, WaitLong, WaitShort};

/// Gesture templates in priority order, newest state first
const TEMPLATES: [(&[KeyState], Gesture); 4] = [
    (
        &[WaitShort, PressShort, WaitShort, PressShort, WaitLong],
        Gesture::DoubleClick,
    ),
    (&[WaitLong, WaitShort, PressShort, WaitLong], Gesture::Click),
    (
        &[PressLong, PressShort, WaitShort, PressShort, WaitLong],
        Gesture::DoubleHold,
    ),
    (&[PressLong, PressShort, WaitLong], Gesture::Hold),
];

/// Match a history against the gesture templates
///
/// Shorter templates are compared with the most recent states only.
pub fn match_history(history: &[KeyState; HISTORY_LEN]) -> Option<Gesture> {
    TEMPLATES
        .iter()
        .find(|(template, _)| history.starts_with(template))
        .map(|(_, gesture)| *gesture)
}

/// Receiver of recognised gestures
///
/// Any `FnMut(u8, Gesture)` closure is a handler. Use [`NoHandler`] when
/// gestures are not of interest.
pub trait GestureHandler {
    /// Called synchronously for every recognised gesture
    fn on_gesture(&mut self, key: u8, gesture: Gesture);
}

impl<F> GestureHandler for F
where
    F: FnMut(u8, Gesture),
{
    fn on_gesture(&mut self, key: u8, gesture: Gesture) {
        self(key, gesture);
    }
}

/// Handler that discards every gesture
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHandler;

impl GestureHandler for NoHandler {
    fn on_gesture(&mut self, _key: u8, _gesture: Gesture) {}
}

/// Whether `key` is pressed in a raw scan
///
/// Keys are grouped in buses of eight (`bus = key / 8`). Every scan byte
/// carries two keys of each bus, at bits `bus` and `bus + 4`; collecting
/// those pairs across the four bytes gives the bus's eight keys.
pub fn key_pressed(scan: &[u8; SCAN_BYTES], key: u8) -> bool {
    let bus = key / 8;
    let bit = key % 8;
    if bus > 2 {
        return false;
    }
    let mask = 0b1_0001 << bus;
    let keys = scan
        .iter()
        .enumerate()
        .fold(0u8, |keys, (i, byte)| keys | (((byte & mask) >> bus) << i));
    keys & (1 << bit) != 0
}

/// Thresholds separating short from long states, in scans
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Thresholds {
    /// Pressed scans before a press counts as long
    pub press_long: u8,
    /// Released scans before a wait counts as long
    pub wait_long: u8,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            press_long: 5,
            wait_long: 2,
        }
    }
}

/// Temporal state of one key
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyRecord {
    press_scans: u8,
    wait_scans: u8,
    history: [KeyState; HISTORY_LEN],
}

impl KeyRecord {
    /// A key that has been idle for a long time
    pub const fn new() -> Self {
        Self {
            press_scans: 0,
            wait_scans: u8::MAX,
            history: [WaitLong; HISTORY_LEN],
        }
    }

    /// Consecutive pressed scans, saturating at 255
    pub fn press_scans(&self) -> u8 {
        self.press_scans
    }

    /// Consecutive released scans, saturating at 255
    pub fn wait_scans(&self) -> u8 {
        self.wait_scans
    }

    /// Current state
    pub fn state(&self) -> KeyState {
        self.history[0]
    }

    /// State history, newest first
    pub fn history(&self) -> &[KeyState; HISTORY_LEN] {
        &self.history
    }

    /// Feed one sample of the key
    ///
    /// Returns a gesture only when the sample changed the key's state and the
    /// new history matches a template.
    pub fn sample(&mut self, pressed: bool, thresholds: Thresholds) -> Option<Gesture> {
        let state = if pressed {
            self.wait_scans = 0;
            self.press_scans = self.press_scans.saturating_add(1);
            if self.press_scans >= thresholds.press_long {
                PressLong
            } else {
                PressShort
            }
        } else {
            self.press_scans = 0;
            self.wait_scans = self.wait_scans.saturating_add(1);
            if self.wait_scans >= thresholds.wait_long {
                WaitLong
            } else {
                WaitShort
            }
        };
        if state == self.state() {
            return None;
        }
        self.push(state)
    }

    /// Push a state onto the history and match it
    pub fn push(&mut self, state: KeyState) -> Option<Gesture> {
        self.history.copy_within(..HISTORY_LEN - 1, 1);
        self.history[0] = state;
        match_history(&self.history)
    }
}

impl Default for KeyRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// Gesture engine for all keys of one controller
#[derive(Clone, Debug)]
pub struct Keypad {
    records: [KeyRecord; MAX_KEYS as usize],
    keys: u8,
    thresholds: Thresholds,
}

impl Keypad {
    /// Track the first `keys` keys (clamped to the controller maximum)
    pub fn new(keys: u8, thresholds: Thresholds) -> Self {
        Self {
            records: [KeyRecord::new(); MAX_KEYS as usize],
            keys: keys.min(MAX_KEYS),
            thresholds,
        }
    }

    /// Number of tracked keys
    pub fn keys(&self) -> u8 {
        self.keys
    }

    /// Thresholds in use
    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Temporal state of a key
    pub fn record(&self, key: u8) -> Option<&KeyRecord> {
        if key < self.keys {
            self.records.get(key as usize)
        } else {
            None
        }
    }

    /// Advance every key by one raw scan
    ///
    /// Gestures are handed to `handler` in key order as they are recognised.
    /// Returns the number of gestures emitted.
    pub fn process<H>(&mut self, scan: &[u8; SCAN_BYTES], handler: &mut H) -> usize
    where
        H: GestureHandler + ?Sized,
    {
        let mut emitted = 0;
        for key in 0..self.keys {
            let pressed = key_pressed(scan, key);
            if let Some(gesture) = self.records[key as usize].sample(pressed, self.thresholds) {
                log::debug!("tm1638: key {key} {gesture:?}");
                handler.on_gesture(key, gesture);
                emitted += 1;
            }
        }
        emitted
    }

    /// Forget all key history
    pub fn reset(&mut self) {
        self.records = [KeyRecord::new(); MAX_KEYS as usize];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    const IDLE: [u8; SCAN_BYTES] = [0; SCAN_BYTES];

    fn scan_with(key: u8) -> [u8; SCAN_BYTES] {
        let mut scan = IDLE;
        let bus = key / 8;
        let bit = key % 8;
        let byte = (bit % 4) as usize;
        let shift = if bit < 4 { bus } else { bus + 4 };
        scan[byte] |= 1 << shift;
        scan
    }

    fn feed(record: &mut KeyRecord, samples: &[bool]) -> Vec<Gesture> {
        samples
            .iter()
            .filter_map(|pressed| record.sample(*pressed, Thresholds::default()))
            .collect()
    }

    #[test]
    fn test_key_pressed_decodes_every_key() {
        for key in 0..MAX_KEYS {
            let scan = scan_with(key);
            for other in 0..MAX_KEYS {
                assert_eq!(key_pressed(&scan, other), key == other, "key {key} other {other}");
            }
        }
    }

    #[test]
    fn test_key_pressed_reference_layout() {
        // First bus: byte i bit 0 is key i, byte i bit 4 is key i + 4
        assert!(key_pressed(&[0x01, 0, 0, 0], 0));
        assert!(key_pressed(&[0, 0, 0, 0x01], 3));
        assert!(key_pressed(&[0x10, 0, 0, 0], 4));
        assert!(key_pressed(&[0, 0, 0, 0x10], 7));
        // Second bus shifts by one bit
        assert!(key_pressed(&[0x02, 0, 0, 0], 8));
        assert!(!key_pressed(&[0x02, 0, 0, 0], 0));
        assert!(!key_pressed(&[0xFF; 4], 24));
    }

    #[test]
    fn test_single_click_fires_once_on_last_transition() {
        let mut record = KeyRecord::new();
        assert_eq!(record.sample(true, Thresholds::default()), None);
        assert_eq!(record.sample(false, Thresholds::default()), None);
        assert_eq!(
            record.sample(false, Thresholds::default()),
            Some(Gesture::Click)
        );
        assert!(feed(&mut record, &[false; 10]).is_empty());
    }

    #[test]
    fn test_pushing_click_states_matches_template() {
        let mut record = KeyRecord::new();
        assert_eq!(record.push(PressShort), None);
        assert_eq!(record.push(WaitShort), None);
        assert_eq!(record.push(WaitLong), Some(Gesture::Click));
        assert_eq!(record.history()[..4], [WaitLong, WaitShort, PressShort, WaitLong]);
    }

    #[test]
    fn test_double_click() {
        let mut record = KeyRecord::new();
        let gestures = feed(&mut record, &[true, false, true, false, false, false]);
        assert_eq!(gestures, [Gesture::DoubleClick]);
    }

    #[test]
    fn test_hold() {
        let mut record = KeyRecord::new();
        let gestures = feed(&mut record, &[true; 4]);
        assert!(gestures.is_empty());
        assert_eq!(record.state(), PressShort);
        assert_eq!(record.sample(true, Thresholds::default()), Some(Gesture::Hold));
        // Keeping the key down or letting go afterwards adds nothing
        assert!(feed(&mut record, &[true, true, false, false, false]).is_empty());
    }

    #[test]
    fn test_double_hold() {
        let mut record = KeyRecord::new();
        let gestures = feed(&mut record, &[true, false, true, true, true, true, true]);
        assert_eq!(gestures, [Gesture::DoubleHold]);
    }

    #[test]
    fn test_jitter_is_silently_consumed() {
        let mut record = KeyRecord::new();
        // A released scan between presses never reaches a long wait first
        let gestures = feed(&mut record, &[true, false, true, false, true, false, true]);
        assert_eq!(gestures, [Gesture::DoubleClick]);
        let mut idle = KeyRecord::new();
        assert!(feed(&mut idle, &[false; 20]).is_empty());
        assert_eq!(idle.history(), &[WaitLong; HISTORY_LEN]);
    }

    #[test]
    fn test_counters_saturate() {
        let mut record = KeyRecord::new();
        for _ in 0..1000 {
            record.sample(true, Thresholds::default());
        }
        assert_eq!(record.press_scans(), u8::MAX);
        assert_eq!(record.state(), PressLong);
        for _ in 0..1000 {
            record.sample(false, Thresholds::default());
        }
        assert_eq!(record.wait_scans(), u8::MAX);
        assert_eq!(record.press_scans(), 0);
        assert_eq!(record.state(), WaitLong);
    }

    #[test]
    fn test_template_priority() {
        let history = [WaitShort, PressShort, WaitShort, PressShort, WaitLong];
        assert_eq!(match_history(&history), Some(Gesture::DoubleClick));
        let history = [PressLong, PressShort, WaitShort, PressShort, WaitLong];
        assert_eq!(match_history(&history), Some(Gesture::DoubleHold));
        let history = [PressLong, PressShort, WaitLong, WaitLong, WaitLong];
        assert_eq!(match_history(&history), Some(Gesture::Hold));
        let history = [WaitShort, PressLong, PressShort, WaitLong, WaitLong];
        assert_eq!(match_history(&history), None);
    }

    #[test]
    fn test_keypad_reports_key_and_gesture() {
        let mut keypad = Keypad::new(8, Thresholds::default());
        let mut seen = Vec::new();
        let mut handler = |key: u8, gesture: Gesture| seen.push((key, gesture));

        let pressed = scan_with(5);
        assert_eq!(keypad.process(&pressed, &mut handler), 0);
        assert_eq!(keypad.process(&IDLE, &mut handler), 0);
        assert_eq!(keypad.process(&IDLE, &mut handler), 1);
        assert_eq!(seen, [(5, Gesture::Click)]);
    }

    #[test]
    fn test_keypad_ignores_untracked_keys() {
        let mut keypad = Keypad::new(4, Thresholds::default());
        let mut count = 0;
        let mut handler = |_: u8, _: Gesture| count += 1;
        for scan in [scan_with(6), IDLE, IDLE] {
            keypad.process(&scan, &mut handler);
        }
        assert_eq!(count, 0);
        assert!(keypad.record(4).is_none());
        assert!(keypad.record(3).is_some());
    }

    #[test]
    fn test_keypad_with_no_keys_is_noop() {
        let mut keypad = Keypad::new(0, Thresholds::default());
        assert_eq!(keypad.process(&[0xFF; SCAN_BYTES], &mut NoHandler), 0);
    }

    #[test]
    fn test_gesture_codes() {
        assert_eq!(Gesture::Click.code(), 1);
        assert_eq!(Gesture::DoubleClick.code(), 2);
        assert_eq!(Gesture::Hold.code(), 3);
        assert_eq!(Gesture::DoubleHold.code(), 4);
    }
}
