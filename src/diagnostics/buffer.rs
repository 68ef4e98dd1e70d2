// SPDX-License-Identifier: MPL-2.0
//! Circular buffer implementation for call history storage.
//!
//! This module provides a memory-bounded ring buffer that overwrites the
//! oldest slot once capacity is reached.

pub use crate::domain::diagnostics::{BufferCapacity, CallRecord};

/// The per-codec log of issued commands and their diagnostic output.
pub type CallHistory = CircularBuffer<CallRecord>;

/// A generic circular buffer with fixed capacity.
///
/// Slots are written in order until the buffer is full; after that each
/// push overwrites the slot under the write cursor (the oldest element)
/// and advances the cursor modulo the capacity.
///
/// # Example
///
/// ```
/// use codec_adapter::diagnostics::CircularBuffer;
///
/// let mut buffer: CircularBuffer<i32> = CircularBuffer::with_raw_capacity(3);
///
/// for value in 1..=4 {
///     buffer.push(value);
/// }
///
/// // Iteration is most recent first
/// let items: Vec<_> = buffer.iter().copied().collect();
/// assert_eq!(items, vec![4, 3, 2]);
///
/// // Negative offsets count back from the latest element
/// assert_eq!(buffer.get(-1), Some(&4));
/// assert_eq!(buffer.get(-2), Some(&3));
/// assert_eq!(buffer.get(0), Some(&2));
/// ```
#[derive(Debug, Clone)]
pub struct CircularBuffer<T> {
    slots: Vec<T>,
    next_write: usize,
    capacity: usize,
}

impl<T> Default for CircularBuffer<T> {
    fn default() -> Self {
        Self::new(BufferCapacity::default())
    }
}

impl<T> CircularBuffer<T> {
    /// Creates a new circular buffer with the specified capacity.
    #[must_use]
    pub fn new(capacity: BufferCapacity) -> Self {
        Self::with_raw_capacity(capacity.value())
    }

    /// Creates a new circular buffer with a raw capacity value.
    ///
    /// This is useful for testing with small capacities.
    /// For production use, prefer [`CircularBuffer::new`] with [`BufferCapacity`].
    #[must_use]
    pub fn with_raw_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1); // Ensure at least 1
        Self {
            slots: Vec::with_capacity(capacity),
            next_write: 0,
            capacity,
        }
    }

    /// Pushes an element, overwriting the oldest one if at capacity.
    pub fn push(&mut self, item: T) {
        if self.slots.len() < self.capacity {
            self.slots.push(item);
        } else {
            self.slots[self.next_write] = item;
            self.next_write = (self.next_write + 1) % self.capacity;
        }
    }

    /// Returns the element at a logical offset.
    ///
    /// Non-negative offsets count forward from the oldest element; negative
    /// offsets count back from the most recent one (`-1` is the latest).
    #[must_use]
    pub fn get(&self, offset: isize) -> Option<&T> {
        let len = self.slots.len();
        let logical = if offset < 0 {
            len.checked_sub(offset.unsigned_abs())?
        } else {
            offset.unsigned_abs()
        };
        if logical >= len {
            return None;
        }
        self.slots.get(self.physical_index(logical))
    }

    /// Returns the most recently pushed element.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.get(-1)
    }

    /// Returns an iterator over the elements, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let len = self.slots.len();
        (0..len)
            .rev()
            .map(move |logical| &self.slots[self.physical_index(logical)])
    }

    /// Returns up to `count` of the most recent elements, newest first.
    #[must_use]
    pub fn latest(&self, count: usize) -> Vec<&T> {
        self.iter().take(count).collect()
    }

    /// Returns the number of elements in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the maximum capacity of the buffer.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Clears all elements from the buffer.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.next_write = 0;
    }

    // The cursor only moves once the buffer is full, so before that the
    // logical and physical indices coincide.
    fn physical_index(&self, logical: usize) -> usize {
        if self.slots.len() < self.capacity {
            logical
        } else {
            (self.next_write + logical) % self.capacity
        }
    }
}

impl<T: Clone> CircularBuffer<T> {
    /// Clones up to `count` of the most recent elements, newest first.
    #[must_use]
    pub fn latest_cloned(&self, count: usize) -> Vec<T> {
        self.iter().take(count).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circular_buffer_push_and_retrieve() {
        let mut buffer: CircularBuffer<i32> = CircularBuffer::with_raw_capacity(5);

        buffer.push(1);
        buffer.push(2);
        buffer.push(3);

        let items: Vec<_> = buffer.iter().copied().collect();
        assert_eq!(items, vec![3, 2, 1]);
    }

    #[test]
    fn circular_buffer_overflow_evicts_oldest() {
        let mut buffer: CircularBuffer<i32> = CircularBuffer::with_raw_capacity(3);

        buffer.push(1);
        buffer.push(2);
        buffer.push(3);
        buffer.push(4); // Overwrites 1
        buffer.push(5); // Overwrites 2

        let items: Vec<_> = buffer.iter().copied().collect();
        assert_eq!(items, vec![5, 4, 3]);
    }

    #[test]
    fn retains_last_n_after_n_plus_k_pushes() {
        let capacity = 4;
        for extra in 0..10 {
            let mut buffer = CircularBuffer::with_raw_capacity(capacity);
            for value in 1..=(capacity + extra) {
                buffer.push(value);
            }

            assert_eq!(buffer.len(), capacity);
            // Oldest remaining is the (k+1)-th pushed element
            assert_eq!(buffer.get(0), Some(&(extra + 1)));
            assert_eq!(buffer.last(), Some(&(capacity + extra)));

            let expected: Vec<_> = ((extra + 1)..=(capacity + extra)).rev().collect();
            let items: Vec<_> = buffer.iter().copied().collect();
            assert_eq!(items, expected);
        }
    }

    #[test]
    fn negative_offsets_count_back_from_latest() {
        let mut buffer: CircularBuffer<&str> = CircularBuffer::with_raw_capacity(3);
        buffer.push("a");
        assert_eq!(buffer.get(-1), Some(&"a"));
        assert_eq!(buffer.get(-2), None);

        buffer.push("b");
        buffer.push("c");
        buffer.push("d"); // Overwrites "a"

        assert_eq!(buffer.get(-1), Some(&"d"));
        assert_eq!(buffer.get(-2), Some(&"c"));
        assert_eq!(buffer.get(-3), Some(&"b"));
        assert_eq!(buffer.get(-4), None);
    }

    #[test]
    fn positive_offsets_count_forward_from_oldest() {
        let mut buffer: CircularBuffer<i32> = CircularBuffer::with_raw_capacity(3);
        for value in 10..15 {
            buffer.push(value);
        }

        assert_eq!(buffer.get(0), Some(&12));
        assert_eq!(buffer.get(1), Some(&13));
        assert_eq!(buffer.get(2), Some(&14));
        assert_eq!(buffer.get(3), None);
    }

    #[test]
    fn latest_returns_newest_first() {
        let mut buffer: CircularBuffer<i32> = CircularBuffer::with_raw_capacity(5);
        assert!(buffer.latest(2).is_empty());

        buffer.push(1);
        assert_eq!(buffer.latest(2), vec![&1]);

        buffer.push(2);
        buffer.push(3);
        assert_eq!(buffer.latest_cloned(2), vec![3, 2]);
    }

    #[test]
    fn circular_buffer_len_and_capacity() {
        let mut buffer: CircularBuffer<i32> = CircularBuffer::with_raw_capacity(5);

        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.capacity(), 5);
        assert!(buffer.is_empty());

        for value in 0..6 {
            buffer.push(value);
        }

        // Overflow doesn't increase len
        assert_eq!(buffer.len(), 5);
        assert!(!buffer.is_empty());
    }

    #[test]
    fn circular_buffer_clear_resets_cursor() {
        let mut buffer: CircularBuffer<i32> = CircularBuffer::with_raw_capacity(2);

        buffer.push(1);
        buffer.push(2);
        buffer.push(3);
        buffer.clear();

        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 2); // Capacity unchanged

        buffer.push(7);
        buffer.push(8);
        buffer.push(9);
        assert_eq!(buffer.get(0), Some(&8));
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut buffer: CircularBuffer<i32> = CircularBuffer::with_raw_capacity(0);
        buffer.push(1);
        buffer.push(2);
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.last(), Some(&2));
    }

    #[test]
    fn default_history_holds_ten_records() {
        let mut history = CallHistory::default();
        assert_eq!(history.capacity(), 10);

        for index in 0..12 {
            history.push(CallRecord::new(format!("cmd {index}"), ""));
        }
        assert_eq!(history.len(), 10);
        assert_eq!(history.get(0).map(|r| r.command.as_str()), Some("cmd 2"));
        assert_eq!(history.last().map(|r| r.command.as_str()), Some("cmd 11"));
    }
}
