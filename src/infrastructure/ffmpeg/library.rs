// SPDX-License-Identifier: MPL-2.0
//! Library backend: encodes and decodes through the linked `FFmpeg` via
//! `ffmpeg-next`.
//!
//! The encoded artifact is the concatenation of every packet the encoder
//! emits, i.e. the profile's elementary stream. That is the same byte layout
//! the process backend writes with `-f hevc`, `-f obu` or `-f h264`, so
//! artifacts from either backend decode with the other.

use std::str::FromStr;
use std::sync::OnceLock;

use ffmpeg_next::codec::{self, Id};
use ffmpeg_next::format::Pixel;
use ffmpeg_next::software::scaling;
use ffmpeg_next::{decoder, encoder, frame, Dictionary, Packet, Rational};
use ndarray::{Array3, ArrayView3};

use super::profile::{OptionSet, ProfileKind, StreamProfile};
use crate::error::{Error, Result};
use crate::media::tensor;

static FFMPEG_INIT: OnceLock<std::result::Result<(), String>> = OnceLock::new();

/// Initializes `FFmpeg` once per process.
///
/// Later calls return the outcome of the first one.
///
/// # Errors
///
/// Returns [`Error::Library`] if `FFmpeg` failed to initialize.
pub fn init_ffmpeg() -> Result<()> {
    FFMPEG_INIT
        .get_or_init(|| {
            ffmpeg_next::init().map_err(|e| format!("FFmpeg initialization failed: {e}"))?;

            // Set log level to ERROR to suppress warning messages
            // SAFETY: av_log_set_level is thread-safe and only affects logging
            unsafe {
                ffmpeg_next::ffi::av_log_set_level(ffmpeg_next::ffi::AV_LOG_ERROR);
            }
            Ok(())
        })
        .clone()
        .map_err(Error::Library)
}

// =============================================================================
// Capability detection
// =============================================================================

/// Whether the linked `FFmpeg` initialized, resolved once and injected into
/// every stream codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibrarySupport {
    initialized: bool,
}

impl LibrarySupport {
    /// Initializes the library (once) and reports the outcome.
    #[must_use]
    pub fn detect() -> Self {
        let initialized = match init_ffmpeg() {
            Ok(()) => true,
            Err(err) => {
                log::debug!("{err}");
                false
            }
        };
        Self { initialized }
    }

    /// Support that reports nothing as available.
    #[must_use]
    pub const fn unavailable() -> Self {
        Self { initialized: false }
    }

    #[must_use]
    pub fn is_initialized(self) -> bool {
        self.initialized
    }

    /// Whether both the encoder and a decoder for `profile` are registered.
    #[must_use]
    pub fn supports(self, profile: &StreamProfile) -> bool {
        self.initialized
            && encoder::find_by_name(profile.encoder()).is_some()
            && find_decoder(profile.kind()).is_some()
    }
}

// =============================================================================
// Encode / decode
// =============================================================================

/// Encodes one `(H, W, 3)` frame into the profile's elementary stream.
///
/// # Errors
///
/// Returns [`Error::Library`] if the encoder is missing, rejects its options
/// or fails while encoding.
pub fn encode(
    profile: &StreamProfile,
    pixel_format: &str,
    pixels: ArrayView3<'_, u8>,
    quality: i32,
) -> Result<Vec<u8>> {
    init_ffmpeg()?;

    let (width, height) = tensor::dimensions(&pixels)?;
    let target_format = Pixel::from_str(pixel_format)
        .map_err(|e| Error::Library(format!("unknown pixel format {pixel_format}: {e}")))?;
    let codec = encoder::find_by_name(profile.encoder())
        .ok_or_else(|| Error::Library(format!("encoder {} is not registered", profile.encoder())))?;

    let mut context = codec::context::Context::new_with_codec(codec)
        .encoder()
        .video()?;
    context.set_width(width);
    context.set_height(height);
    context.set_format(target_format);
    context.set_time_base(Rational::new(1, 25));
    context.set_frame_rate(Some(Rational::new(25, 1)));

    let mut encoder = context.open_as_with(codec, dictionary(&profile.options(quality)))?;

    let mut frame = convert_to(&rgb_frame(pixels, width, height), target_format)?;
    frame.set_pts(Some(0));
    encoder.send_frame(&frame)?;
    encoder.send_eof()?;

    let mut stream = Vec::new();
    let mut packet = Packet::empty();
    while keep_draining(encoder.receive_packet(&mut packet))? {
        if let Some(data) = packet.data() {
            stream.extend_from_slice(data);
        }
    }

    if stream.is_empty() {
        return Err(Error::Library(format!(
            "{} produced no packets",
            profile.encoder()
        )));
    }
    Ok(stream)
}

/// Whether a `receive_*` call produced output.
///
/// End of stream and "try again" stop the drain; any other failure is a
/// real encoder error and propagates.
fn keep_draining(received: std::result::Result<(), ffmpeg_next::Error>) -> Result<bool> {
    match received {
        Ok(()) => Ok(true),
        Err(ffmpeg_next::Error::Eof) => Ok(false),
        Err(ffmpeg_next::Error::Other { errno }) if errno == ffmpeg_next::error::EAGAIN => {
            Ok(false)
        }
        Err(err) => Err(err.into()),
    }
}

/// Decodes the first frame of an elementary stream to `(H, W, 3)` RGB.
///
/// # Errors
///
/// Returns [`Error::Library`] if no decoder is registered or the stream
/// yields no frame.
pub fn decode(profile: &StreamProfile, stream: &[u8]) -> Result<Array3<u8>> {
    init_ffmpeg()?;

    let codec = find_decoder(profile.kind()).ok_or_else(|| {
        Error::Library(format!("no decoder registered for {}", profile.name()))
    })?;
    let mut decoder = codec::context::Context::new_with_codec(codec)
        .decoder()
        .open_as(codec)?
        .video()?;

    decoder.send_packet(&Packet::copy(stream))?;
    decoder.send_eof()?;

    let mut decoded = frame::Video::empty();
    decoder.receive_frame(&mut decoded)?;

    let rgb = convert_to(&decoded, Pixel::RGB24)?;
    tensor::from_rgb_bytes(rgb.width(), rgb.height(), packed_rows(&rgb, 3))
}

/// Decoders to try for a profile, preferring software ones that need no
/// hardware acceleration.
fn find_decoder(kind: ProfileKind) -> Option<codec::Codec> {
    let (names, id): (&[&str], Id) = match kind {
        ProfileKind::X265 => (&[], Id::HEVC),
        ProfileKind::Av1 => (&["libdav1d", "libaom-av1"], Id::AV1),
        ProfileKind::H264 => (&[], Id::H264),
    };
    names
        .iter()
        .find_map(|name| decoder::find_by_name(name))
        .or_else(|| decoder::find(id))
}

/// Option dictionary for `avcodec_open2`.
///
/// Stream specifiers such as the `:v` of `b:v` are command-line syntax and
/// are stripped here.
fn dictionary(options: &OptionSet) -> Dictionary<'static> {
    let mut dictionary = Dictionary::new();
    for (key, value) in options.iter() {
        let key = key.strip_suffix(":v").unwrap_or(key);
        dictionary.set(key, value);
    }
    dictionary
}

fn rgb_frame(pixels: ArrayView3<'_, u8>, width: u32, height: u32) -> frame::Video {
    let mut frame = frame::Video::new(Pixel::RGB24, width, height);
    let row_len = width as usize * 3;
    let stride = frame.stride(0);
    let bytes = tensor::to_rgb_bytes(pixels);
    let data = frame.data_mut(0);
    for (y, row) in bytes.chunks_exact(row_len).enumerate() {
        let start = y * stride;
        data[start..start + row_len].copy_from_slice(row);
    }
    frame
}

fn convert_to(source: &frame::Video, format: Pixel) -> Result<frame::Video> {
    if source.format() == format {
        return Ok(source.clone());
    }
    let mut scaler = scaling::Context::get(
        source.format(),
        source.width(),
        source.height(),
        format,
        source.width(),
        source.height(),
        scaling::Flags::BILINEAR,
    )?;
    let mut converted = frame::Video::empty();
    scaler.run(source, &mut converted)?;
    Ok(converted)
}

/// Copies plane 0 without stride padding.
fn packed_rows(frame: &frame::Video, bytes_per_pixel: usize) -> Vec<u8> {
    let row_len = frame.width() as usize * bytes_per_pixel;
    let stride = frame.stride(0);
    let data = frame.data(0);
    (0..frame.height() as usize)
        .flat_map(|y| &data[y * stride..y * stride + row_len])
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_support_reports_nothing() {
        let support = LibrarySupport::unavailable();
        assert!(!support.is_initialized());
        assert!(!support.supports(&StreamProfile::x265()));
    }

    #[test]
    fn init_is_idempotent() {
        let first = init_ffmpeg().is_ok();
        let second = init_ffmpeg().is_ok();
        assert_eq!(first, second);
    }

    #[test]
    fn dictionary_strips_stream_specifiers() {
        let options = StreamProfile::av1().options(30);
        let dictionary = dictionary(&options);
        assert_eq!(dictionary.get("b"), Some("0"));
        assert_eq!(dictionary.get("crf"), Some("30"));
        assert_eq!(dictionary.get("b:v"), None);
    }

    #[test]
    fn drain_stops_at_end_of_stream() {
        assert!(keep_draining(Ok(())).unwrap());
        assert!(!keep_draining(Err(ffmpeg_next::Error::Eof)).unwrap());
        let again = ffmpeg_next::Error::Other {
            errno: ffmpeg_next::error::EAGAIN,
        };
        assert!(!keep_draining(Err(again)).unwrap());
    }

    #[test]
    fn drain_propagates_encoder_failures() {
        let err = keep_draining(Err(ffmpeg_next::Error::InvalidData)).unwrap_err();
        assert!(matches!(err, Error::Library(_)));
    }

    #[test]
    fn rgb_frame_round_trips_through_packed_rows() {
        if init_ffmpeg().is_err() {
            return;
        }
        let pixels = Array3::from_shape_fn((5, 7, 3), |(y, x, c)| (y * 31 + x * 7 + c) as u8);
        let frame = rgb_frame(pixels.view(), 7, 5);
        assert_eq!(packed_rows(&frame, 3), tensor::to_rgb_bytes(pixels.view()));
    }

    #[test]
    fn library_round_trip_when_encoder_is_linked() {
        let support = LibrarySupport::detect();
        let profile = StreamProfile::h264();
        if !support.supports(&profile) {
            eprintln!("Skipping test: libx264 not linked");
            return;
        }
        let pixels = Array3::from_shape_fn((48, 64, 3), |(y, x, c)| ((x + y) * 2 + c * 50) as u8);

        let stream = encode(&profile, "yuv444p", pixels.view(), 20).unwrap();
        let restored = decode(&profile, &stream).unwrap();

        assert!(!stream.is_empty());
        assert_eq!(restored.dim(), (48, 64, 3));
    }
}
