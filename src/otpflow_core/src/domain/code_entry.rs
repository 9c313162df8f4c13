use thiserror::Error;

use crate::domain::otp_code::OtpCode;

pub const CODE_LENGTH: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeEntryError {
    #[error("Slot index {0} is out of range")]
    IndexOutOfRange(usize),
    #[error("Slot value must be empty or a single digit, got {0:?}")]
    NotADigit(String),
}

/// The six digit slots of the code form, filled one keystroke at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodeEntry {
    slots: [Option<char>; CODE_LENGTH],
}

impl CodeEntry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes one slot. `value` must be empty (clears the slot) or exactly one ASCII digit.
    pub fn set_digit(&mut self, index: usize, value: &str) -> Result<(), CodeEntryError> {
        if index >= CODE_LENGTH {
            return Err(CodeEntryError::IndexOutOfRange(index));
        }

        let mut chars = value.chars();
        let digit = match (chars.next(), chars.next()) {
            (None, _) => None,
            (Some(c), None) if c.is_ascii_digit() => Some(c),
            _ => return Err(CodeEntryError::NotADigit(value.to_owned())),
        };

        self.slots[index] = digit;
        Ok(())
    }

    /// Fills the slots from pasted text.
    ///
    /// Only the first six characters are considered and all of them must be digits, otherwise
    /// nothing changes. Slots past the pasted digits are cleared. Returns the index of the last
    /// filled slot so the view can move focus there.
    pub fn fill_from(&mut self, text: &str) -> Result<usize, CodeEntryError> {
        let pasted: Vec<char> = text.chars().take(CODE_LENGTH).collect();
        if pasted.is_empty() || !pasted.iter().all(char::is_ascii_digit) {
            return Err(CodeEntryError::NotADigit(text.to_owned()));
        }

        let mut slots = [None; CODE_LENGTH];
        for (slot, digit) in slots.iter_mut().zip(&pasted) {
            *slot = Some(*digit);
        }
        self.slots = slots;

        Ok(pasted.len() - 1)
    }

    /// Slot that receives focus after a digit was typed at `index`. Front-ends that take one
    /// digit at a time use it as their cursor.
    pub fn next_focus(index: usize) -> usize {
        (index + 1).min(CODE_LENGTH - 1)
    }

    pub fn clear(&mut self) {
        self.slots = [None; CODE_LENGTH];
    }

    pub fn digit(&self, index: usize) -> Option<char> {
        self.slots.get(index).copied().flatten()
    }

    pub fn slots(&self) -> &[Option<char>; CODE_LENGTH] {
        &self.slots
    }

    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// The entered code, once every slot holds a digit.
    pub fn to_otp_code(&self) -> Option<OtpCode> {
        if !self.is_complete() {
            return None;
        }
        let digits: String = self.slots.iter().flatten().collect();
        OtpCode::parse(digits).ok()
    }
}
