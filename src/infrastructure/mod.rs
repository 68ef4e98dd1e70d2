// SPDX-License-Identifier: MPL-2.0
//! Infrastructure layer adapters.
//!
//! This module contains the concrete implementations of the [`Codec`] port
//! defined in `application::port`. These adapters wrap external tools, the
//! linked `FFmpeg` libraries and the `image` crate.
//!
//! # Available Adapters
//!
//! - [`bpg`]: BPG via `bpgenc`/`bpgdec` (file transport)
//! - [`webp`]: WebP via `cwebp`/`dwebp` (file transport)
//! - [`jpeg`]: JPEG via the `image` crate (file transport)
//! - [`ffmpeg`]: x265, AV1 and H.264 via `FFmpeg` (stream transport)
//! - [`process`]: Command construction, execution and executable lookup
//!
//! [`Codec`]: crate::application::port::Codec

pub mod bpg;
pub mod ffmpeg;
pub mod jpeg;
pub mod process;
pub mod webp;

// Re-export main types for convenience
pub use bpg::{BpgCodec, BpgEncoder, BpgOptions};
pub use ffmpeg::{FfmpegCodec, FfmpegSettings, LibrarySupport, StreamProfile};
pub use jpeg::JpegCodec;
pub use webp::WebpCodec;
