// SPDX-License-Identifier: MPL-2.0
//! Diagnostics domain types.
//!
//! - [`BufferCapacity`]: Capacity for a codec's call history
//! - [`CallRecord`]: One issued command and its diagnostic response

mod newtypes;

pub use newtypes::{buffer_capacity_bounds, BufferCapacity, CallRecord};
