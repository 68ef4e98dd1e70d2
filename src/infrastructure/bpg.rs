// SPDX-License-Identifier: MPL-2.0
//! BPG adapter driving the `bpgenc` and `bpgdec` command-line tools.
//!
//! BPG is file transport only: both tools read and write paths.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ndarray::Array3;

use crate::application::port::codec::{
    default_quality_for, require_encoded_file, require_file_source, require_target,
};
use crate::application::port::{resolve_quality, Codec, DecodeSource, EncodeSource};
use crate::config::defaults::{
    DEFAULT_BPG_BIT_DEPTH, DEFAULT_BPG_CHROMA_FORMAT, DEFAULT_BPG_COLOUR_SPACE, DEFAULT_BPG_SPEED,
};
use crate::diagnostics::{BufferCapacity, CallHistory};
use crate::domain::codec::QualitySteps;
use crate::error::{Error, Result};
use crate::infrastructure::process::{find_executable, run_recorded, ToolCommand};

const ENCODER_TOOL: &str = "bpgenc";
const DECODER_TOOL: &str = "bpgdec";
const STEPS: QualitySteps = QualitySteps::descending(51, 0);

/// HEVC encoder used inside `bpgenc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BpgEncoder {
    /// The JCT-VC reference encoder (slow, best quality).
    #[default]
    Jctvc,
    /// x265.
    X265,
}

impl BpgEncoder {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jctvc => "jctvc",
            Self::X265 => "x265",
        }
    }
}

impl fmt::Display for BpgEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BpgEncoder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jctvc" | "h265" => Ok(Self::Jctvc),
            "x265" => Ok(Self::X265),
            other => Err(Error::Config(format!("unknown BPG encoder '{other}'"))),
        }
    }
}

/// Encoder parameters passed to `bpgenc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BpgOptions {
    /// Compression speed, `-m` (1 slowest, 9 fastest).
    pub speed: u8,
    /// Bit depth, `-b`.
    pub bit_depth: u8,
    /// Colour space, `-c`.
    pub colour_space: String,
    /// Chroma format, `-f`.
    pub chroma_format: String,
    /// HEVC encoder, `-e`.
    pub encoder: BpgEncoder,
}

impl Default for BpgOptions {
    fn default() -> Self {
        Self {
            speed: DEFAULT_BPG_SPEED,
            bit_depth: DEFAULT_BPG_BIT_DEPTH,
            colour_space: DEFAULT_BPG_COLOUR_SPACE.to_string(),
            chroma_format: DEFAULT_BPG_CHROMA_FORMAT.to_string(),
            encoder: BpgEncoder::default(),
        }
    }
}

impl BpgOptions {
    /// Defaults with a different HEVC encoder.
    #[must_use]
    pub fn with_encoder(encoder: BpgEncoder) -> Self {
        Self {
            encoder,
            ..Self::default()
        }
    }
}

/// Codec backed by `bpgenc`/`bpgdec`.
#[derive(Debug)]
pub struct BpgCodec {
    name: String,
    options: BpgOptions,
    tool_dir: Option<PathBuf>,
    default_quality: i32,
    history: CallHistory,
}

impl BpgCodec {
    /// Creates a BPG codec.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuality`] if `default_quality` is outside `51..=0`.
    pub fn new(
        options: BpgOptions,
        tool_dir: Option<PathBuf>,
        default_quality: Option<i32>,
        history_capacity: BufferCapacity,
    ) -> Result<Self> {
        let name = match options.encoder {
            BpgEncoder::Jctvc => "bpg".to_string(),
            BpgEncoder::X265 => "bpg-x265".to_string(),
        };
        Ok(Self {
            name,
            default_quality: default_quality_for(STEPS, default_quality)?,
            options,
            tool_dir,
            history: CallHistory::new(history_capacity),
        })
    }

    #[must_use]
    pub fn options(&self) -> &BpgOptions {
        &self.options
    }

    fn tool(&self, name: &str) -> PathBuf {
        find_executable(Path::new(name), self.tool_dir.as_deref())
            .unwrap_or_else(|| PathBuf::from(name))
    }

    fn encode_command(&self, source: &Path, target: &Path, quality: i32) -> ToolCommand {
        let options = &self.options;
        ToolCommand::new(self.tool(ENCODER_TOOL))
            .arg("-m")
            .arg(options.speed.to_string())
            .arg("-b")
            .arg(options.bit_depth.to_string())
            .arg("-q")
            .arg(quality.to_string())
            .args(["-c", options.colour_space.as_str()])
            .args(["-f", options.chroma_format.as_str()])
            .args(["-e", options.encoder.as_str()])
            .arg(source)
            .arg("-o")
            .arg(target)
    }

    fn decode_command(&self, source: &Path, target: &Path) -> ToolCommand {
        ToolCommand::new(self.tool(DECODER_TOOL))
            .arg(source)
            .arg("-o")
            .arg(target)
    }
}

impl Codec for BpgCodec {
    fn name(&self) -> &str {
        &self.name
    }

    fn available_for_use(&self) -> bool {
        let dir = self.tool_dir.as_deref();
        find_executable(Path::new(ENCODER_TOOL), dir).is_some()
            && find_executable(Path::new(DECODER_TOOL), dir).is_some()
    }

    fn quality_steps(&self) -> QualitySteps {
        STEPS
    }

    fn can_stream(&self) -> bool {
        false
    }

    fn file_extension(&self) -> &str {
        "bpg"
    }

    fn default_quality(&self) -> i32 {
        self.default_quality
    }

    fn encode(
        &mut self,
        source: EncodeSource<'_>,
        target: Option<&Path>,
        quality: Option<i32>,
    ) -> Result<Option<Vec<u8>>> {
        let quality = resolve_quality(STEPS, self.default_quality, quality)?;
        let source = require_file_source(&self.name, source)?;
        let target = require_target(&self.name, target)?;

        let command = self.encode_command(source, target, quality);
        run_recorded(&mut self.history, &command, None)?;
        Ok(None)
    }

    fn decode(
        &mut self,
        source: DecodeSource<'_>,
        target: Option<&Path>,
    ) -> Result<Option<Array3<u8>>> {
        let source = require_encoded_file(&self.name, source)?;
        let target = require_target(&self.name, target)?;

        let command = self.decode_command(source, target);
        run_recorded(&mut self.history, &command, None)?;
        Ok(None)
    }

    fn history(&self) -> &CallHistory {
        &self.history
    }
}
