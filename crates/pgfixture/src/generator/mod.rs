//! Per-row value generators.
//!
//! A generator fills a column that rows do not supply. Inserts call
//! [`ValueGenerator::next_value`] once per row when they are built, so a built
//! insert replays the same values every time it is executed.
//!
//! ```ignore
//! use pgfixture::generator::{date_sequence, string_sequence, CalendarField};
//!
//! insert_into("invoice")
//!     .with_generated_value("code", string_sequence("INV-").with_left_padding(4)?)?
//!     .with_generated_value("due", date_sequence().incrementing_by(1, CalendarField::Month))?
//!     .columns(["amount"])?
//!     .values((100,))?
//!     .build()?;
//! ```

mod constant;
mod date_sequence;
mod sequence;
mod string_sequence;

pub use constant::ConstantValueGenerator;
pub use date_sequence::{CalendarField, DateSequenceValueGenerator};
pub use sequence::SequenceValueGenerator;
pub use string_sequence::StringSequenceValueGenerator;

use crate::value::Value;
use std::fmt;

/// A stateful, infinite sequence of values.
///
/// Not meant to be shared between threads while in use; an insert builder owns its
/// generators until it is built.
pub trait ValueGenerator: fmt::Debug + Send {
    type Output: Into<Value>;

    /// Return the next value and advance.
    fn next_value(&mut self) -> Self::Output;
}

impl<G: ValueGenerator + ?Sized> ValueGenerator for Box<G> {
    type Output = G::Output;

    fn next_value(&mut self) -> Self::Output {
        (**self).next_value()
    }
}

/// Integers starting at 1, incrementing by 1.
pub fn sequence() -> SequenceValueGenerator {
    SequenceValueGenerator::new()
}

/// `prefix` followed by an integer starting at 1, incrementing by 1, without padding.
pub fn string_sequence(prefix: impl Into<String>) -> StringSequenceValueGenerator {
    StringSequenceValueGenerator::new(prefix)
}

/// Timestamps starting today at midnight (local zone), incrementing by one day.
pub fn date_sequence() -> DateSequenceValueGenerator {
    DateSequenceValueGenerator::new()
}

/// Always the same value. `constant(Value::Null)` yields nulls.
pub fn constant<T>(value: T) -> ConstantValueGenerator<T>
where
    T: Into<Value> + Clone + fmt::Debug + Send,
{
    ConstantValueGenerator::new(value)
}
