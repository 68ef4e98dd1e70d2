// SPDX-License-Identifier: MPL-2.0
//! Process backend: drives the `ffmpeg` executable over pipes or files.

use std::path::{Path, PathBuf};

use ndarray::Array3;

use super::dimensions::parse_frame_dimensions;
use super::profile::StreamProfile;
use crate::application::port::{DecodeSource, EncodeSource};
use crate::diagnostics::CallHistory;
use crate::error::{Error, Result};
use crate::infrastructure::process::{
    find_executable, run, run_recorded, ToolCommand, STANDARD_STREAM,
};
use crate::media::tensor;

/// Log level when only errors matter.
const QUIET: &str = "error";
/// Log level that still prints stream descriptions, needed to size raw output.
const VERBOSE: &str = "info";
/// Pixel layout of every in-memory tensor.
const RAW_PIXEL_FORMAT: &str = "rgb24";

/// Input side of an `ffmpeg` invocation.
#[derive(Debug, Clone, Copy)]
enum Input<'a> {
    /// Raw RGB24 frame on stdin.
    RawFrame { width: u32, height: u32 },
    /// Encoded elementary stream on stdin.
    Encoded { format: &'a str },
    /// Encoded elementary stream in a file.
    EncodedFile { format: &'a str, path: &'a Path },
    /// Any file `ffmpeg` can probe (e.g. PNG).
    File(&'a Path),
}

/// `ffmpeg` executable wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessBackend {
    ffmpeg: PathBuf,
}

impl ProcessBackend {
    /// Resolves `ffmpeg` (a bare name or a path), trying `tool_dir` first.
    #[must_use]
    pub fn locate(ffmpeg: &Path, tool_dir: Option<&Path>) -> Option<Self> {
        find_executable(ffmpeg, tool_dir).map(|ffmpeg| Self { ffmpeg })
    }

    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.ffmpeg
    }

    /// Whether `ffmpeg -encoders` lists `encoder`. Never fails.
    #[must_use]
    pub fn supports(&self, encoder: &str) -> bool {
        let command = ToolCommand::new(&self.ffmpeg).args(["-hide_banner", "-encoders"]);
        match run(&command, None) {
            Ok(output) => lists_encoder(&String::from_utf8_lossy(&output.stdout), encoder),
            Err(err) => {
                log::debug!("probing {} failed: {err}", self.ffmpeg.display());
                false
            }
        }
    }

    fn base(&self, loglevel: &str, input: Input<'_>) -> ToolCommand {
        let command = ToolCommand::new(&self.ffmpeg).args(["-y", "-hide_banner", "-loglevel", loglevel]);
        match input {
            Input::RawFrame { width, height } => command
                .args(["-f", "rawvideo", "-pix_fmt", RAW_PIXEL_FORMAT, "-s"])
                .arg(format!("{width}x{height}"))
                .args(["-i", STANDARD_STREAM]),
            Input::Encoded { format } => command.args(["-f", format, "-i", STANDARD_STREAM]),
            Input::EncodedFile { format, path } => command.args(["-f", format, "-i"]).arg(path),
            Input::File(path) => command.arg("-i").arg(path),
        }
    }

    fn encode_command(
        &self,
        profile: &StreamProfile,
        pixel_format: &str,
        input: Input<'_>,
        target: Option<&Path>,
        quality: i32,
    ) -> ToolCommand {
        self.base(QUIET, input)
            .args(["-c:v", profile.encoder(), "-pix_fmt", pixel_format])
            .args(profile.options(quality).to_cli_args())
            .args(["-f", profile.format()])
            .arg(target.unwrap_or(Path::new(STANDARD_STREAM)))
    }

    fn decode_command(&self, input: Input<'_>, target: Option<&Path>) -> ToolCommand {
        match target {
            Some(path) => self.base(QUIET, input).args(["-frames:v", "1"]).arg(path),
            None => self
                .base(VERBOSE, input)
                .args(["-frames:v", "1", "-f", "rawvideo", "-pix_fmt", RAW_PIXEL_FORMAT])
                .arg(STANDARD_STREAM),
        }
    }

    /// Encodes to `target`, or to returned bytes when `target` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if `ffmpeg` cannot be run or the tensor is empty.
    pub fn encode(
        &self,
        history: &mut CallHistory,
        profile: &StreamProfile,
        pixel_format: &str,
        source: EncodeSource<'_>,
        target: Option<&Path>,
        quality: i32,
    ) -> Result<Option<Vec<u8>>> {
        let output = match source {
            EncodeSource::Pixels(pixels) => {
                let (width, height) = tensor::dimensions(&pixels)?;
                let raw = tensor::to_rgb_bytes(pixels);
                let command = self.encode_command(
                    profile,
                    pixel_format,
                    Input::RawFrame { width, height },
                    target,
                    quality,
                );
                run_recorded(history, &command, Some(&raw))?
            }
            EncodeSource::File(path) => {
                let command =
                    self.encode_command(profile, pixel_format, Input::File(path), target, quality);
                run_recorded(history, &command, None)?
            }
        };
        Ok(target.is_none().then_some(output.stdout))
    }

    /// Decodes to `target`, or to a returned `(H, W, 3)` tensor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionParse`] when decoding to memory and `ffmpeg`
    /// printed no frame size, and [`Error::FrameSize`] when the pixel stream
    /// does not match that size.
    pub fn decode(
        &self,
        history: &mut CallHistory,
        profile: &StreamProfile,
        source: DecodeSource<'_>,
        target: Option<&Path>,
    ) -> Result<Option<Array3<u8>>> {
        let format = profile.format();
        let output = match source {
            DecodeSource::Bytes(bytes) => {
                let command = self.decode_command(Input::Encoded { format }, target);
                run_recorded(history, &command, Some(bytes))?
            }
            DecodeSource::File(path) => {
                let command =
                    self.decode_command(Input::EncodedFile { format, path }, target);
                run_recorded(history, &command, None)?
            }
        };

        if target.is_some() {
            return Ok(None);
        }

        let (width, height) =
            parse_frame_dimensions(&output.diagnostics()).ok_or_else(|| Error::DimensionParse {
                recent: history.latest_cloned(2),
            })?;
        tensor::from_rgb_bytes(width, height, output.stdout).map(Some)
    }
}

/// Whether an `ffmpeg -encoders` listing contains `encoder`.
fn lists_encoder(listing: &str, encoder: &str) -> bool {
    listing
        .lines()
        .any(|line| line.split_whitespace().nth(1) == Some(encoder))
}
