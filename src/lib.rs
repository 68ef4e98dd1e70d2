// SPDX-License-Identifier: MPL-2.0
//! `codec_adapter` puts a uniform encode/decode interface in front of
//! heterogeneous image and video codecs.
//!
//! Command-line tools (`bpgenc`, `cwebp`, `ffmpeg`), the linked `FFmpeg`
//! libraries and the `image` crate all sit behind the same [`Codec`] trait.
//! [`apply`] runs an image tensor through a codec and back, handling tensor
//! layouts, temporary files and cleanup.
//!
//! [`Codec`]: application::port::Codec

#![doc(html_root_url = "https://docs.rs/codec_adapter/0.1.0")]

pub mod application;
pub mod codecs;
pub mod config;
pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod media;

pub use application::{apply, ApplyOptions, ApplyOutcome, ApplySource};
pub use error::{Error, Result};
