// SPDX-License-Identifier: MPL-2.0
//! Port definitions (traits) for dependency inversion.
//!
//! This module defines the abstract interface that infrastructure adapters
//! implement. The orchestrator in [`crate::application::apply`] programs
//! against [`Codec`] only, so it never knows whether a codec talks to a
//! file-based tool, a streaming process or a linked library.
//!
//! # Design Notes
//!
//! - The trait uses crate types only (no `FFmpeg` types, no process handles)
//! - Codecs are `Send` so a configured codec can be moved to a worker thread
//! - Methods return `Result` with the crate error type

pub mod codec;

pub use codec::{resolve_quality, Codec, DecodeSource, EncodeSource};
