// SPDX-License-Identifier: MPL-2.0
//! Diagnostics for codec invocations.
//!
//! Every codec keeps a bounded history of the commands it issued and the
//! diagnostic text those commands produced. Errors raised while talking to
//! a backend carry the most recent records so the failing command can be
//! inspected without re-running it by hand.
//!
//! - [`CircularBuffer`]: Generic ring buffer with a write cursor
//! - [`CallHistory`]: The ring buffer specialised to [`CallRecord`]s

mod buffer;

pub use buffer::{BufferCapacity, CallHistory, CallRecord, CircularBuffer};
