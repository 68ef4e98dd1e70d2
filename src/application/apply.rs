// SPDX-License-Identifier: MPL-2.0
//! Encode-then-decode orchestration.
//!
//! [`apply`] is the single entry point callers use. It normalizes the input
//! tensor, routes data through files or memory depending on
//! [`Codec::can_stream`], and hands back the encoded size together with the
//! restored tensor in the caller's original layout and rank.

use std::fs;
use std::path::Path;

use ndarray::{ArrayD, ArrayViewD};

use crate::application::port::{Codec, DecodeSource, EncodeSource};
use crate::error::{Error, Result};
use crate::media::image_file;
use crate::media::tensor::{self, TensorLayout};
use crate::media::ScopedTempFile;

/// Extension of the intermediate files used for pixel data.
const PIXEL_FILE_EXTENSION: &str = "png";

/// The original image handed to [`apply`].
#[derive(Debug, Clone, Copy)]
pub enum ApplySource<'a> {
    /// A `(H, W, 3)` or `(3, H, W)` tensor, optionally with a batch axis of 1.
    Tensor(ArrayViewD<'a, u8>),
    /// An image file on disk.
    File(&'a Path),
}

/// Optional knobs for [`apply`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyOptions<'a> {
    /// Quality level; the codec default when `None`.
    pub quality: Option<i32>,
    /// Keep the encoded artifact at this path.
    pub encoded_path: Option<&'a Path>,
    /// Write the decoded image here instead of returning it.
    pub decoded_path: Option<&'a Path>,
}

impl<'a> ApplyOptions<'a> {
    /// Options with only a quality level set.
    #[must_use]
    pub fn with_quality(quality: i32) -> Self {
        Self {
            quality: Some(quality),
            ..Self::default()
        }
    }
}

/// Result of an [`apply`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyOutcome {
    /// Size of the encoded artifact in bytes.
    pub encoded_size: u64,
    /// Restored pixels in the caller's layout; `None` when a decode path
    /// was supplied.
    pub restored: Option<ArrayD<u8>>,
}

/// The encoded artifact produced by step 7, consumed by step 8.
enum Encoded<'p> {
    Bytes(Vec<u8>),
    File(&'p Path),
}

/// Encodes `original` with `codec`, decodes it again and reports the size.
///
/// All temporary files are removed before returning, on success and on
/// error.
///
/// # Errors
///
/// - [`Error::UnsupportedBatch`] / [`Error::UnsupportedShape`] for bad tensors
/// - [`Error::InvalidQuality`] for a quality outside the codec's domain
/// - [`Error::MissingOutput`] if no file exists at the encode target after
///   encoding. The reserved temp target exists from the start, so there this
///   only fires when the tool removed it; a tool that silently writes
///   nothing reports an `encoded_size` of 0 instead.
/// - any error raised by the codec itself
pub fn apply(
    codec: &mut dyn Codec,
    original: ApplySource<'_>,
    options: &ApplyOptions<'_>,
) -> Result<ApplyOutcome> {
    let streaming = codec.can_stream();

    // Steps 1-2: normalize tensors to a channel-last view.
    let (source, layout) = match original {
        ApplySource::Tensor(tensor) => {
            let (view, layout) = tensor::normalize(tensor)?;
            (EncodeSource::Pixels(view), layout)
        }
        ApplySource::File(path) => (EncodeSource::File(path), TensorLayout::channel_last()),
    };

    // Step 3: file-transport codecs read pixels from disk.
    let materialized = match source {
        EncodeSource::Pixels(view) if !streaming => {
            let file = ScopedTempFile::with_extension(PIXEL_FILE_EXTENSION)?;
            image_file::write_rgb(view, file.path())?;
            Some(file)
        }
        _ => None,
    };
    let encode_source = match &materialized {
        Some(file) => EncodeSource::File(file.path()),
        None => source,
    };

    // Steps 4-5: encode and decode targets.
    let encode_temp = match options.encoded_path {
        None if !streaming => Some(ScopedTempFile::with_extension(codec.file_extension())?),
        _ => None,
    };
    let decode_temp = match options.decoded_path {
        None if !streaming => Some(ScopedTempFile::with_extension(PIXEL_FILE_EXTENSION)?),
        _ => None,
    };

    let encode_target = options
        .encoded_path
        .or_else(|| encode_temp.as_ref().map(ScopedTempFile::path));
    let decode_target = options
        .decoded_path
        .or_else(|| decode_temp.as_ref().map(ScopedTempFile::path));

    // Step 6: quality.
    let quality = options.quality.unwrap_or_else(|| codec.default_quality());
    log::debug!(
        "apply {}: quality={quality}, streaming={streaming}, layout={layout:?}",
        codec.name()
    );

    // Step 7: encode.
    let returned = codec.encode(encode_source, encode_target, Some(quality))?;
    let encoded = match (returned, encode_target) {
        (Some(bytes), None) => Encoded::Bytes(bytes),
        (_, Some(path)) => Encoded::File(path),
        (None, None) => {
            return Err(Error::Transport(format!(
                "{} returned no encoded data and no target path was set",
                codec.name()
            )))
        }
    };
    let encoded_size = match &encoded {
        Encoded::Bytes(bytes) => bytes.len() as u64,
        Encoded::File(path) => fs::metadata(path)
            .map_err(|_| Error::MissingOutput(path.to_path_buf()))?
            .len(),
    };

    // Step 8: decode the same artifact.
    let decode_source = match &encoded {
        Encoded::Bytes(bytes) => DecodeSource::Bytes(bytes),
        Encoded::File(path) => DecodeSource::File(path),
    };
    let decoded = codec.decode(decode_source, decode_target)?;

    // Step 9: restore.
    let restored = if options.decoded_path.is_some() {
        None
    } else {
        let pixels = match (decoded, decode_target) {
            (Some(pixels), _) => pixels,
            (None, Some(path)) => image_file::read_rgb(path)?,
            (None, None) => {
                return Err(Error::Transport(format!(
                    "{} returned no decoded pixels and no target path was set",
                    codec.name()
                )))
            }
        };
        Some(tensor::restore(pixels, layout))
    };

    // Step 10: explicit release so cleanup failures surface; error paths
    // above rely on drop.
    for file in [materialized, encode_temp, decode_temp].into_iter().flatten() {
        file.close()?;
    }

    Ok(ApplyOutcome {
        encoded_size,
        restored,
    })
}
