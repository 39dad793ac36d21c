use super::ValueGenerator;
use crate::error::{SetupError, SetupResult};

/// A prefix followed by a sequence number, optionally left-padded with zeros.
///
/// With a padding of 2, the values are `CODE_01`, `CODE_02`, ..., `CODE_10`,
/// ..., `CODE_100`: numbers that already have enough digits are not padded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringSequenceValueGenerator {
    prefix: String,
    next: i64,
    increment: i64,
    // 0 means no padding
    padded_length: usize,
}

impl StringSequenceValueGenerator {
    pub(super) fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
            increment: 1,
            padded_length: 0,
        }
    }

    /// Left-pad the number with zeros up to `length` characters.
    ///
    /// Fails with an invalid-argument error if `length` is 0.
    pub fn with_left_padding(mut self, length: usize) -> SetupResult<Self> {
        if length == 0 {
            return Err(SetupError::invalid_argument("padded number length must be > 0"));
        }
        self.padded_length = length;
        Ok(self)
    }

    pub fn without_left_padding(mut self) -> Self {
        self.padded_length = 0;
        self
    }

    pub fn starting_at(mut self, start: i64) -> Self {
        self.next = start;
        self
    }

    pub fn incrementing_by(mut self, increment: i64) -> Self {
        self.increment = increment;
        self
    }

    fn format_number(&self, number: i64) -> String {
        let digits = number.to_string();
        if digits.len() >= self.padded_length {
            return digits;
        }
        let mut padded = "0".repeat(self.padded_length - digits.len());
        padded.push_str(&digits);
        padded
    }
}

impl ValueGenerator for StringSequenceValueGenerator {
    type Output = String;

    fn next_value(&mut self) -> String {
        let number = self.next;
        self.next = self.next.wrapping_add(self.increment);
        format!("{}{}", self.prefix, self.format_number(number))
    }
}
