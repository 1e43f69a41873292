//! Per-connection frame sequence numbers

/// Monotonic 8-bit sequence counter
///
/// Wraps from 255 back to 0. Not synchronized on its own; [`Session`](crate::Session)
/// guards it so assignment and send happen under one lock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceCounter {
    value: u8,
}

impl SequenceCounter {
    /// Create a counter starting at 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a counter starting at `value`
    pub fn starting_at(value: u8) -> Self {
        Self { value }
    }

    /// Value the next frame will carry
    pub fn current(&self) -> u8 {
        self.value
    }

    /// Return the current value, then advance
    pub fn next(&mut self) -> u8 {
        let current = self.value;
        self.advance();
        current
    }

    /// Advance by one, wrapping at 256
    pub fn advance(&mut self) {
        self.value = self.value.wrapping_add(1);
    }
}
