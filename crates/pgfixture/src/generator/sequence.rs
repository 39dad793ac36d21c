use super::ValueGenerator;

/// Numeric sequence.
///
/// Both settings may be changed at any time; the change applies to the values
/// that follow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceValueGenerator {
    next: i64,
    increment: i64,
}

impl SequenceValueGenerator {
    pub(super) fn new() -> Self {
        Self {
            next: 1,
            increment: 1,
        }
    }

    /// Restart the sequence at `start`.
    pub fn starting_at(mut self, start: i64) -> Self {
        self.next = start;
        self
    }

    /// Change the step between two values (may be negative).
    pub fn incrementing_by(mut self, increment: i64) -> Self {
        self.increment = increment;
        self
    }
}

impl Default for SequenceValueGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueGenerator for SequenceValueGenerator {
    type Output = i64;

    fn next_value(&mut self) -> i64 {
        let current = self.next;
        self.next = self.next.wrapping_add(self.increment);
        current
    }
}
