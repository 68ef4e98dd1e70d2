// SPDX-License-Identifier: MPL-2.0
//! Codec registry.
//!
//! Maps codec names to configured [`Codec`] instances so callers can pick a
//! scheme by name (from a command line or a config file) without knowing
//! which adapter implements it.

use std::fmt;
use std::str::FromStr;

use crate::application::port::Codec;
use crate::config::defaults::DEFAULT_WEBP_SPEED;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::infrastructure::{
    BpgCodec, BpgEncoder, BpgOptions, FfmpegCodec, FfmpegSettings, JpegCodec, LibrarySupport,
    StreamProfile, WebpCodec,
};

/// Every codec the crate can construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecKind {
    /// BPG with the default (JCT-VC) HEVC encoder.
    Bpg,
    BpgX265,
    BpgJctvc,
    Webp,
    Jpeg,
    /// Baseline JPEG written as a `.jif` interchange file.
    JpegFi,
    X265,
    Av1,
    H264,
}

impl CodecKind {
    pub const ALL: [CodecKind; 9] = [
        CodecKind::Bpg,
        CodecKind::BpgX265,
        CodecKind::BpgJctvc,
        CodecKind::Webp,
        CodecKind::Jpeg,
        CodecKind::JpegFi,
        CodecKind::X265,
        CodecKind::Av1,
        CodecKind::H264,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bpg => "bpg",
            Self::BpgX265 => "bpg-x265",
            Self::BpgJctvc => "bpg-jctvc",
            Self::Webp => "webp",
            Self::Jpeg => "jpeg",
            Self::JpegFi => "jpegfi",
            Self::X265 => "x265",
            Self::Av1 => "av1",
            Self::H264 => "h264",
        }
    }

    /// Whether the codec exchanges bytes in memory.
    #[must_use]
    pub fn is_stream_transport(self) -> bool {
        matches!(self, Self::X265 | Self::Av1 | Self::H264)
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodecKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|kind| kind.as_str()).collect();
                Error::Config(format!(
                    "unknown codec '{wanted}' (known: {})",
                    known.join(", ")
                ))
            })
    }
}

/// Builds a codec configured from `config`.
///
/// # Errors
///
/// - [`Error::Config`] if the configured backend name is invalid
/// - [`Error::BackendUnavailable`] or [`Error::NoBackendAvailable`] for
///   stream codecs whose backend cannot be found
pub fn build(kind: CodecKind, config: &Config, support: LibrarySupport) -> Result<Box<dyn Codec>> {
    let capacity = config.history_capacity();
    let tool_dir = config.tool_dir.clone();

    let codec: Box<dyn Codec> = match kind {
        CodecKind::Bpg | CodecKind::BpgJctvc => Box::new(BpgCodec::new(
            BpgOptions::with_encoder(BpgEncoder::Jctvc),
            tool_dir,
            None,
            capacity,
        )?),
        CodecKind::BpgX265 => Box::new(BpgCodec::new(
            BpgOptions::with_encoder(BpgEncoder::X265),
            tool_dir,
            None,
            capacity,
        )?),
        CodecKind::Webp => Box::new(WebpCodec::new(DEFAULT_WEBP_SPEED, tool_dir, None, capacity)?),
        CodecKind::Jpeg => Box::new(JpegCodec::new(None, capacity)?),
        CodecKind::JpegFi => Box::new(JpegCodec::interchange(None, capacity)?),
        CodecKind::X265 | CodecKind::Av1 | CodecKind::H264 => {
            let profile = match kind {
                CodecKind::Av1 => StreamProfile::av1(),
                CodecKind::H264 => StreamProfile::h264(),
                _ => StreamProfile::x265(),
            };
            let settings = FfmpegSettings {
                ffmpeg: config.ffmpeg_path(),
                tool_dir,
                backend: config.backend_preference()?,
                pixel_format: config.pixel_format().to_string(),
                default_quality: None,
                history_capacity: capacity,
            };
            Box::new(FfmpegCodec::new(profile, &settings, support)?)
        }
    };
    Ok(codec)
}

/// Every codec that can be built and reports itself usable.
#[must_use]
pub fn discover(config: &Config, support: LibrarySupport) -> Vec<Box<dyn Codec>> {
    CodecKind::ALL
        .into_iter()
        .filter(|kind| *kind != CodecKind::BpgJctvc)
        .filter_map(|kind| match build(kind, config, support) {
            Ok(codec) if codec.available_for_use() => Some(codec),
            Ok(_) => None,
            Err(err) => {
                log::debug!("{kind} unavailable: {err}");
                None
            }
        })
        .collect()
}
