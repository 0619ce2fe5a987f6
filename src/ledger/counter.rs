//! Global counter moved by every action

use serde::{Deserialize, Serialize};

use crate::error::{BadgeError, Result};
use crate::ledger::Direction;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalCounter {
    value: u64,
}

impl GlobalCounter {
    pub fn new(value: u64) -> Self {
        Self { value }
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    /// Value the counter would hold after `direction`, without applying it.
    /// Decrementing at zero is rejected.
    pub fn peek(&self, direction: Direction) -> Result<u64> {
        match direction {
            Direction::Increment => Ok(self.value.saturating_add(1)),
            Direction::Decrement => self.value.checked_sub(1).ok_or(BadgeError::CounterUnderflow),
        }
    }

    pub fn apply(&mut self, direction: Direction) -> Result<u64> {
        self.value = self.peek(direction)?;
        Ok(self.value)
    }

    pub fn reset(&mut self, value: u64) {
        self.value = value;
    }

    /// Store a value previously produced by `peek`
    pub(crate) fn commit(&mut self, value: u64) {
        self.value = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decrement_at_zero_rejected() {
        let mut counter = GlobalCounter::default();
        assert_eq!(counter.apply(Direction::Decrement), Err(BadgeError::CounterUnderflow));
        assert_eq!(counter.value(), 0);
    }

    #[test]
    fn test_increment_then_decrement() {
        let mut counter = GlobalCounter::default();
        counter.apply(Direction::Increment).unwrap();
        counter.apply(Direction::Increment).unwrap();
        assert_eq!(counter.apply(Direction::Decrement).unwrap(), 1);
    }

    #[test]
    fn test_reset() {
        let mut counter = GlobalCounter::new(7);
        counter.reset(2);
        assert_eq!(counter.value(), 2);
        assert_eq!(counter.peek(Direction::Decrement).unwrap(), 1);
        assert_eq!(counter.value(), 2);
    }
}
