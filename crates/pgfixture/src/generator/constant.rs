use super::ValueGenerator;
use crate::value::Value;
use std::fmt;

/// Yields clones of one value forever.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantValueGenerator<T> {
    value: T,
}

impl<T> ConstantValueGenerator<T>
where
    T: Into<Value> + Clone + fmt::Debug + Send,
{
    pub(super) fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T> ValueGenerator for ConstantValueGenerator<T>
where
    T: Into<Value> + Clone + fmt::Debug + Send,
{
    type Output = T;

    fn next_value(&mut self) -> T {
        self.value.clone()
    }
}
