// SPDX-License-Identifier: MPL-2.0
//! Application layer - the codec contract and the orchestration built on it.
//!
//! - [`port`]: The [`Codec`](port::Codec) trait implemented by infrastructure
//! - [`apply`]: Normalize, encode, decode and restore in one call

pub mod apply;
pub mod port;

pub use apply::{apply, ApplyOptions, ApplyOutcome, ApplySource};
