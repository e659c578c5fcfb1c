use chrono::{DateTime, TimeDelta, Utc};
use std::fmt;
use thiserror::Error;

/// Number of input slots on the PIN entry form.
pub const PIN_LENGTH: usize = 4;

/// The code the site shipped with. Used when `ACCESS_PIN` is not configured.
pub const DEFAULT_ACCESS_PIN: &str = "5555";

/// How long the "Incorrect PIN" indication stays visible before the slots are cleared.
pub const ERROR_PULSE_MS: i64 = 1_000;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("access PIN must be exactly {PIN_LENGTH} ASCII digits")]
pub struct InvalidPin;

/// AccessPin
///
/// The shared secret that unlocks the site. Loaded once into `AppConfig` and compared
/// by exact string equality. `Debug` never prints the digits.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessPin(String);

impl AccessPin {
    pub fn parse(raw: &str) -> Result<Self, InvalidPin> {
        if raw.len() == PIN_LENGTH && raw.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(raw.to_string()))
        } else {
            Err(InvalidPin)
        }
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate
    }
}

impl Default for AccessPin {
    fn default() -> Self {
        Self(DEFAULT_ACCESS_PIN.to_string())
    }
}

impl fmt::Debug for AccessPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessPin(****)")
    }
}

/// Phase
///
/// Where a `PinEntry` is in its lifecycle. `Rejected` carries the instant of the failed
/// comparison so `tick` can clear it once the error pulse has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Editing,
    Rejected { at: DateTime<Utc> },
    Accepted,
}

/// Result of feeding one input event into a `PinEntry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOutcome {
    /// The event changed nothing (filtered input, no-op backspace, or input while locked).
    Ignored,
    /// The entry changed but holds fewer than `PIN_LENGTH` digits.
    Pending,
    /// The fourth digit landed and the code matched.
    Accepted,
    /// The fourth digit landed and the code did not match.
    Rejected,
}

/// PinEntry
///
/// The four-slot entry form as a state machine. Digits always occupy a contiguous prefix
/// of the slots: writing past the end appends, clearing a slot shifts later digits left.
/// Evaluation happens automatically the moment the fourth digit is written, exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinEntry {
    digits: Vec<char>,
    focus: usize,
    phase: Phase,
}

impl Default for PinEntry {
    fn default() -> Self {
        Self::new()
    }
}

impl PinEntry {
    pub fn new() -> Self {
        Self {
            digits: Vec::with_capacity(PIN_LENGTH),
            focus: 0,
            phase: Phase::Editing,
        }
    }

    /// Slot contents in order, `None` for empty slots.
    pub fn slots(&self) -> [Option<char>; PIN_LENGTH] {
        let mut slots = [None; PIN_LENGTH];
        for (slot, digit) in slots.iter_mut().zip(&self.digits) {
            *slot = Some(*digit);
        }
        slots
    }

    /// The joined sequence, length in `0..=PIN_LENGTH`.
    pub fn code(&self) -> String {
        self.digits.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn focused(&self) -> usize {
        self.focus
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_error_visible(&self) -> bool {
        matches!(self.phase, Phase::Rejected { .. })
    }

    fn accepts_input(&self) -> bool {
        self.phase == Phase::Editing
    }

    /// Moves focus to `index`, clamped to the last slot.
    pub fn focus(&mut self, index: usize) {
        if self.accepts_input() {
            self.focus = index.min(PIN_LENGTH - 1);
        }
    }

    /// A single keystroke in the focused slot. Non-digits are dropped.
    pub fn type_char(&mut self, c: char, secret: &AccessPin, now: DateTime<Utc>) -> EntryOutcome {
        if !self.accepts_input() || !c.is_ascii_digit() {
            return EntryOutcome::Ignored;
        }
        self.write(self.focus, c);
        if self.focus < PIN_LENGTH - 1 {
            self.focus += 1;
        }
        self.evaluate(secret, now)
    }

    /// Backspace in the focused slot: clears a filled slot, or steps back from an empty one.
    pub fn backspace(&mut self) -> EntryOutcome {
        if !self.accepts_input() {
            return EntryOutcome::Ignored;
        }
        if self.focus < self.digits.len() {
            self.digits.remove(self.focus);
            EntryOutcome::Pending
        } else if self.focus > 0 {
            self.focus -= 1;
            EntryOutcome::Pending
        } else {
            EntryOutcome::Ignored
        }
    }

    /// Bulk input starting at the focused slot. Non-digits are stripped first and the
    /// remainder is truncated to the slots left from the focus.
    pub fn paste(&mut self, text: &str, secret: &AccessPin, now: DateTime<Utc>) -> EntryOutcome {
        if !self.accepts_input() {
            return EntryOutcome::Ignored;
        }
        let start = self.focus;
        let pasted: Vec<char> = text
            .chars()
            .filter(char::is_ascii_digit)
            .take(PIN_LENGTH - start)
            .collect();

        match pasted.as_slice() {
            [] => EntryOutcome::Ignored,
            [single] => self.type_char(*single, secret, now),
            many => {
                for (offset, digit) in many.iter().enumerate() {
                    self.write(start + offset, *digit);
                }
                self.focus = (start + many.len()).min(PIN_LENGTH - 1);
                self.evaluate(secret, now)
            }
        }
    }

    /// Advances the clock. Once the error pulse has elapsed a rejected entry is cleared
    /// back to empty slots with focus on slot 0. Returns true when that reset happened.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        if let Phase::Rejected { at } = self.phase {
            if now - at >= TimeDelta::milliseconds(ERROR_PULSE_MS) {
                *self = Self::new();
                return true;
            }
        }
        false
    }

    fn write(&mut self, index: usize, digit: char) {
        if index < self.digits.len() {
            self.digits[index] = digit;
        } else if self.digits.len() < PIN_LENGTH {
            self.digits.push(digit);
        }
    }

    fn evaluate(&mut self, secret: &AccessPin, now: DateTime<Utc>) -> EntryOutcome {
        if self.digits.len() < PIN_LENGTH {
            return EntryOutcome::Pending;
        }
        if secret.matches(&self.code()) {
            self.phase = Phase::Accepted;
            EntryOutcome::Accepted
        } else {
            self.phase = Phase::Rejected { at: now };
            EntryOutcome::Rejected
        }
    }
}
