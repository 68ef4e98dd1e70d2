// SPDX-License-Identifier: MPL-2.0
//! Encoder profiles for the `FFmpeg` codec family.
//!
//! A [`StreamProfile`] names the encoder, its quality domain and output
//! format, and maps a quality level to encoder options. The mapping is a
//! pure function of the level; both backends consume the same merged
//! [`OptionSet`].

use std::fmt;
use std::str::FromStr;

use crate::config::defaults::{DEFAULT_AV1_CPU_USED, DEFAULT_PRESET};
use crate::domain::codec::QualitySteps;
use crate::error::{Error, Result};

// =============================================================================
// OptionSet
// =============================================================================

/// Ordered encoder options.
///
/// Inserting an existing key appends the value with a `:` separator, which
/// is how `-x265-params` style options accumulate several settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet {
    entries: Vec<(String, String)>,
}

impl OptionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`OptionSet::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds an option, colon-joining onto an existing value for the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, current)) => {
                current.push(':');
                current.push_str(&value);
            }
            None => self.entries.push((key, value)),
        }
    }

    /// `self` followed by `other`, joining colliding keys.
    #[must_use]
    pub fn merge(mut self, other: OptionSet) -> Self {
        for (key, value) in other.entries {
            self.insert(key, value);
        }
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Command-line form: `-key value` pairs in insertion order.
    #[must_use]
    pub fn to_cli_args(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|(key, value)| [format!("-{key}"), value.clone()])
            .collect()
    }
}

// =============================================================================
// Profiles
// =============================================================================

/// How the quality level is handed to an encoder that supports both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateControl {
    /// Constant rate factor, `-crf q`.
    #[default]
    Crf,
    /// Constant quantizer, passed through the encoder's own parameter string.
    Qp,
}

/// Encoder family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    X265,
    Av1,
    H264,
}

impl ProfileKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::X265 => "x265",
            Self::Av1 => "av1",
            Self::H264 => "h264",
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x265" | "hevc" | "h265" => Ok(Self::X265),
            "av1" | "aom" => Ok(Self::Av1),
            "h264" | "x264" | "avc" => Ok(Self::H264),
            other => Err(Error::Config(format!("unknown ffmpeg profile '{other}'"))),
        }
    }
}

/// Encoder, quality domain, container format and tuning of one codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamProfile {
    kind: ProfileKind,
    rate_control: RateControl,
    preset: String,
    tune: Option<String>,
    cpu_used: u8,
}

impl StreamProfile {
    /// Profile with default tuning.
    #[must_use]
    pub fn new(kind: ProfileKind) -> Self {
        Self {
            kind,
            rate_control: RateControl::default(),
            preset: DEFAULT_PRESET.to_string(),
            tune: None,
            cpu_used: DEFAULT_AV1_CPU_USED,
        }
    }

    #[must_use]
    pub fn x265() -> Self {
        Self::new(ProfileKind::X265)
    }

    #[must_use]
    pub fn av1() -> Self {
        Self::new(ProfileKind::Av1)
    }

    #[must_use]
    pub fn h264() -> Self {
        Self::new(ProfileKind::H264)
    }

    /// Rate control mode; only `libx265` honours [`RateControl::Qp`].
    #[must_use]
    pub fn with_rate_control(mut self, rate_control: RateControl) -> Self {
        self.rate_control = rate_control;
        self
    }

    #[must_use]
    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = preset.into();
        self
    }

    /// Encoder tune (e.g. `ssim`, `psnr`).
    #[must_use]
    pub fn with_tune(mut self, tune: impl Into<String>) -> Self {
        self.tune = Some(tune.into());
        self
    }

    #[must_use]
    pub fn with_cpu_used(mut self, cpu_used: u8) -> Self {
        self.cpu_used = cpu_used;
        self
    }

    #[must_use]
    pub fn kind(&self) -> ProfileKind {
        self.kind
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.kind.as_str()
    }

    /// `FFmpeg` encoder name.
    #[must_use]
    pub fn encoder(&self) -> &'static str {
        match self.kind {
            ProfileKind::X265 => "libx265",
            ProfileKind::Av1 => "libaom-av1",
            ProfileKind::H264 => "libx264",
        }
    }

    /// Muxer/demuxer name of the elementary stream.
    #[must_use]
    pub fn format(&self) -> &'static str {
        match self.kind {
            ProfileKind::X265 => "hevc",
            ProfileKind::Av1 => "obu",
            ProfileKind::H264 => "h264",
        }
    }

    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self.kind {
            ProfileKind::X265 => "hevc",
            ProfileKind::Av1 => "obu",
            ProfileKind::H264 => "h264",
        }
    }

    #[must_use]
    pub fn quality_steps(&self) -> QualitySteps {
        match self.kind {
            ProfileKind::X265 | ProfileKind::H264 => QualitySteps::descending(51, 0),
            ProfileKind::Av1 => QualitySteps::descending(63, 0),
        }
    }

    /// Options carrying the quality level.
    #[must_use]
    pub fn quality_options(&self, quality: i32) -> OptionSet {
        match (self.kind, self.rate_control) {
            (ProfileKind::X265, RateControl::Qp) => {
                OptionSet::new().with("x265-params", format!("qp={quality}"))
            }
            (ProfileKind::Av1, _) => OptionSet::new()
                .with("crf", quality.to_string())
                .with("b:v", "0"),
            _ => OptionSet::new().with("crf", quality.to_string()),
        }
    }

    /// Options that do not depend on the quality level.
    #[must_use]
    pub fn tuning_options(&self) -> OptionSet {
        let mut options = OptionSet::new();
        match self.kind {
            ProfileKind::X265 | ProfileKind::H264 => {
                options.insert("preset", self.preset.as_str());
                if let Some(tune) = &self.tune {
                    options.insert("tune", tune.as_str());
                }
                if self.kind == ProfileKind::X265 {
                    options.insert("x265-params", "log-level=error");
                }
            }
            ProfileKind::Av1 => {
                options.insert("strict", "experimental");
                options.insert("cpu-used", self.cpu_used.to_string());
            }
        }
        options
    }

    /// Quality options followed by tuning options.
    #[must_use]
    pub fn options(&self, quality: i32) -> OptionSet {
        self.quality_options(quality).merge(self.tuning_options())
    }
}
