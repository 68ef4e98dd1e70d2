// SPDX-License-Identifier: MPL-2.0
//! Diagnostics newtypes.
//!
//! This module provides type-safe wrappers for diagnostics values,
//! ensuring they are always within valid ranges.

use std::fmt;

// =============================================================================
// Buffer Capacity Bounds
// =============================================================================

/// Call history capacity bounds (1 to 1000 records).
pub mod buffer_capacity_bounds {
    /// Minimum history capacity.
    pub const MIN: usize = 1;
    /// Maximum history capacity.
    pub const MAX: usize = 1000;
    /// Default history capacity.
    pub const DEFAULT: usize = 10;
}

// =============================================================================
// BufferCapacity
// =============================================================================

/// Capacity of a codec's call history.
///
/// This newtype enforces validity at the type level, ensuring the value
/// is always within the valid range (1–1000 records).
///
/// # Example
///
/// ```
/// use codec_adapter::domain::diagnostics::BufferCapacity;
///
/// let capacity = BufferCapacity::new(25);
/// assert_eq!(capacity.value(), 25);
///
/// // Values outside range are clamped
/// assert_eq!(BufferCapacity::new(0).value(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferCapacity(usize);

impl BufferCapacity {
    /// Creates a new buffer capacity, clamping to valid range.
    #[must_use]
    pub fn new(value: usize) -> Self {
        Self(value.clamp(buffer_capacity_bounds::MIN, buffer_capacity_bounds::MAX))
    }

    /// Returns the value as usize.
    #[must_use]
    pub fn value(self) -> usize {
        self.0
    }
}

impl Default for BufferCapacity {
    fn default() -> Self {
        Self(buffer_capacity_bounds::DEFAULT)
    }
}

// =============================================================================
// CallRecord
// =============================================================================

/// One completed invocation of a backing tool or library.
///
/// `command` is the exact command line (or library operation) that was
/// issued and `response` the diagnostic text it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    /// The command line or operation description.
    pub command: String,
    /// Captured diagnostic output.
    pub response: String,
}

impl CallRecord {
    /// Creates a new record.
    #[must_use]
    pub fn new(command: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            response: response.into(),
        }
    }
}

impl fmt::Display for CallRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$ {}", self.command)?;
        let response = self.response.trim_end();
        if !response.is_empty() {
            write!(f, "\n{response}")?;
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
