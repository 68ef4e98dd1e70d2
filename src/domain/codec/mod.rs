// SPDX-License-Identifier: MPL-2.0
//! Codec domain types.
//!
//! - [`QualitySteps`]: The ordered quality domain of a codec
//! - [`Backend`]: Library or process backend of a stream-transport codec

mod backend;
mod quality;

pub use backend::{Backend, ParseBackendError};
pub use quality::QualitySteps;
