// SPDX-License-Identifier: MPL-2.0
//! Codec port definition.
//!
//! This module defines the [`Codec`] trait every compression scheme
//! implements, whatever transport it uses underneath.
//!
//! # Design Notes
//!
//! - File-transport codecs only read and write paths; stream-transport
//!   codecs can also exchange bytes and tensors directly
//! - Quality is validated against [`Codec::quality_steps`] before anything
//!   is invoked
//! - Methods take `&mut self` because every invocation is appended to the
//!   codec's [`CallHistory`]

use std::path::Path;

use ndarray::{Array3, ArrayView3};

use crate::diagnostics::CallHistory;
use crate::domain::codec::QualitySteps;
use crate::error::{Error, Result};

// =============================================================================
// Transport artifacts
// =============================================================================

/// What an encode reads from.
#[derive(Debug, Clone, Copy)]
pub enum EncodeSource<'a> {
    /// Channel-last `(H, W, 3)` pixels held in memory.
    Pixels(ArrayView3<'a, u8>),
    /// An image file on disk.
    File(&'a Path),
}

/// What a decode reads from.
#[derive(Debug, Clone, Copy)]
pub enum DecodeSource<'a> {
    /// An encoded bitstream held in memory.
    Bytes(&'a [u8]),
    /// An encoded file on disk.
    File(&'a Path),
}

// =============================================================================
// Codec Trait
// =============================================================================

/// Port for a configured compression scheme.
///
/// # Contract
///
/// - `encode(source, None, q)` on a codec that [can stream](Codec::can_stream)
///   returns `Some(bytes)`; with a target it writes the file and returns `None`
/// - `decode(source, None)` on a streaming codec returns `Some(pixels)`;
///   with a target it writes the image file and returns `None`
/// - File-transport codecs require file sources and targets and fail with
///   [`Error::Transport`] otherwise
///
/// # Example
///
/// ```ignore
/// use codec_adapter::application::port::{Codec, EncodeSource, DecodeSource};
///
/// fn round_trip(codec: &mut dyn Codec, pixels: ndarray::ArrayView3<u8>) -> codec_adapter::Result<usize> {
///     let bytes = codec.encode(EncodeSource::Pixels(pixels), None, Some(30))?.unwrap_or_default();
///     let _restored = codec.decode(DecodeSource::Bytes(&bytes), None)?;
///     Ok(bytes.len())
/// }
/// ```
pub trait Codec: Send {
    /// Short human-readable name (e.g. `"webp"`, `"x265"`).
    fn name(&self) -> &str;

    /// Probes whether the backing tool or library is usable.
    ///
    /// Never fails: a missing tool simply yields `false`.
    fn available_for_use(&self) -> bool;

    /// The full, fixed domain of legal quality levels.
    fn quality_steps(&self) -> QualitySteps;

    /// Whether encode/decode can exchange bytes without touching disk.
    fn can_stream(&self) -> bool;

    /// Extension (without dot) for encoded files.
    fn file_extension(&self) -> &str;

    /// Quality used when the caller does not supply one.
    fn default_quality(&self) -> i32;

    /// Encodes `source`, either to `target` or into returned bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuality`] if `quality` is not in
    /// [`Codec::quality_steps`], without invoking anything.
    fn encode(
        &mut self,
        source: EncodeSource<'_>,
        target: Option<&Path>,
        quality: Option<i32>,
    ) -> Result<Option<Vec<u8>>>;

    /// Decodes `source`, either to `target` or into a returned tensor.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails in a way this layer can
    /// detect, e.g. [`Error::DimensionParse`].
    fn decode(
        &mut self,
        source: DecodeSource<'_>,
        target: Option<&Path>,
    ) -> Result<Option<Array3<u8>>>;

    /// Commands issued so far, most recent first when iterated.
    fn history(&self) -> &CallHistory;
}

// =============================================================================
// Shared helpers
// =============================================================================

/// Picks the quality to use: the caller's if valid, else the default.
///
/// # Errors
///
/// Returns [`Error::InvalidQuality`] if `requested` is outside `steps`.
pub fn resolve_quality(steps: QualitySteps, default: i32, requested: Option<i32>) -> Result<i32> {
    let quality = requested.unwrap_or(default);
    if steps.contains(quality) {
        Ok(quality)
    } else {
        Err(Error::InvalidQuality { quality, steps })
    }
}

/// Default quality of a domain, optionally overridden.
///
/// # Errors
///
/// Returns [`Error::InvalidQuality`] if the override is outside `steps`.
pub fn default_quality_for(steps: QualitySteps, override_quality: Option<i32>) -> Result<i32> {
    resolve_quality(steps, steps.midpoint(), override_quality)
}

/// Unwraps the path source of a file-transport codec.
///
/// # Errors
///
/// Returns [`Error::Transport`] for in-memory pixels.
pub fn require_file_source<'a>(codec: &str, source: EncodeSource<'a>) -> Result<&'a Path> {
    match source {
        EncodeSource::File(path) => Ok(path),
        EncodeSource::Pixels(_) => Err(Error::Transport(format!(
            "{codec} encodes from image files only, got in-memory pixels"
        ))),
    }
}

/// Unwraps the path source of a file-transport decode.
///
/// # Errors
///
/// Returns [`Error::Transport`] for in-memory bytes.
pub fn require_encoded_file<'a>(codec: &str, source: DecodeSource<'a>) -> Result<&'a Path> {
    match source {
        DecodeSource::File(path) => Ok(path),
        DecodeSource::Bytes(_) => Err(Error::Transport(format!(
            "{codec} decodes from files only, got in-memory bytes"
        ))),
    }
}

/// Unwraps the target of a file-transport codec.
///
/// # Errors
///
/// Returns [`Error::Transport`] if no target was given.
pub fn require_target<'a>(codec: &str, target: Option<&'a Path>) -> Result<&'a Path> {
    target.ok_or_else(|| {
        Error::Transport(format!(
            "{codec} cannot stream; a target path is required"
        ))
    })
}
