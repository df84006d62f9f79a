//! Fixed-width digit buffer backing the code entry boxes.

/// Digits entered for a one-time code, one slot per digit.
///
/// Mirrors a row of single-character input boxes: slots are addressed by
/// index, accept only ASCII digits, and a paste spreads across slots
/// starting at the paste position. Anything that is not a digit is
/// silently dropped, matching how the entry boxes filter keystrokes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeInput {
    slots: Vec<Option<char>>,
}

impl CodeInput {
    /// Create an empty buffer with `code_length` slots.
    pub fn new(code_length: usize) -> Self {
        Self {
            slots: vec![None; code_length],
        }
    }

    /// Number of slots in the buffer.
    pub fn code_length(&self) -> usize {
        self.slots.len()
    }

    /// Store a digit at `index`.
    ///
    /// # Returns
    /// * `bool` - true when the digit was stored, false for out-of-range
    ///   indexes or non-digit characters
    pub fn set(&mut self, index: usize, digit: char) -> bool {
        if !digit.is_ascii_digit() {
            return false;
        }
        match self.slots.get_mut(index) {
            Some(slot) => {
                *slot = Some(digit);
                true
            }
            None => false,
        }
    }

    /// Clear the slot at `index`.
    ///
    /// # Returns
    /// * `bool` - true when a slot existed at that index
    pub fn erase(&mut self, index: usize) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                *slot = None;
                true
            }
            None => false,
        }
    }

    /// Spread pasted text across slots starting at `start`.
    ///
    /// Non-digit characters are filtered out first, and digits past the
    /// last slot are discarded.
    ///
    /// # Returns
    /// * `usize` - how many digits were written
    pub fn paste(&mut self, start: usize, text: &str) -> usize {
        let mut written = 0;
        let mut index = start;
        for digit in text.chars().filter(char::is_ascii_digit) {
            if index >= self.slots.len() {
                break;
            }
            self.slots[index] = Some(digit);
            index += 1;
            written += 1;
        }
        written
    }

    /// Empty every slot.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }

    /// Number of slots currently holding a digit.
    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Check whether every slot holds a digit.
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|slot| slot.is_some())
    }

    /// The assembled code, available only once every slot is filled.
    pub fn code(&self) -> Option<String> {
        if !self.is_complete() {
            return None;
        }
        Some(self.slots.iter().flatten().collect())
    }

    /// Current slot contents, for rendering.
    pub fn slots(&self) -> &[Option<char>] {
        &self.slots
    }
}
