// SPDX-License-Identifier: MPL-2.0
//! Frame dimension recovery from `ffmpeg` diagnostic output.
//!
//! A raw RGB24 pixel stream carries no header, so the frame size is taken
//! from the stream description `ffmpeg` prints to stderr, e.g.
//!
//! ```text
//!   Stream #0:0: Video: rawvideo (RGB[24] / 0x18424752), rgb24, 64x48, q=2-31
//! ```

use std::sync::LazyLock;

use regex::Regex;

/// A `WIDTHxHEIGHT` token with one to four digits per dimension.
static DIMENSIONS: LazyLock<Regex> = LazyLock::new(|| {
    // Word boundaries keep hex tags such as 0x18424752 from matching.
    Regex::new(r"\b(\d{1,4})x(\d{1,4})\b").expect("dimension regex should compile")
});

const STREAM_PREFIX: &str = "Stream #";

/// Width and height from the latest stream description in `diagnostics`.
///
/// Stream lines are scanned newest first, so with an input and an output
/// section the output stream wins. Mapping lines (`Stream #0:0 -> #0:0`)
/// carry no token and are skipped.
///
/// # Examples
///
/// ```
/// use codec_adapter::infrastructure::ffmpeg::parse_frame_dimensions;
///
/// let text = "  Stream #0:0: Video: hevc (Main), yuv444p(tv), 320x240, 25 fps";
/// assert_eq!(parse_frame_dimensions(text), Some((320, 240)));
/// assert_eq!(parse_frame_dimensions("no streams here"), None);
/// ```
#[must_use]
pub fn parse_frame_dimensions(diagnostics: &str) -> Option<(u32, u32)> {
    diagnostics
        .lines()
        .rev()
        .filter(|line| line.trim_start().starts_with(STREAM_PREFIX))
        .find_map(|line| {
            let captures = DIMENSIONS.captures(line)?;
            let width = captures[1].parse().ok()?;
            let height = captures[2].parse().ok()?;
            Some((width, height))
        })
}
