// SPDX-License-Identifier: MPL-2.0
//! `FFmpeg` adapter implementing the [`Codec`] port for video encoders used
//! as still-image codecs.
//!
//! [`FfmpegCodec`] pairs a [`StreamProfile`] with a backend chosen once at
//! construction:
//!
//! - [`Backend::Library`]: the linked `FFmpeg` through `ffmpeg-next`
//! - [`Backend::Process`]: the `ffmpeg` executable over pipes
//!
//! # Design Notes
//!
//! - Both backends stream: in-memory sources and results never touch disk
//! - Both consume the same merged [`OptionSet`] for a quality level
//! - Library availability is detected once and injected as [`LibrarySupport`]
//!
//! # Example
//!
//! ```ignore
//! use codec_adapter::infrastructure::ffmpeg::{FfmpegCodec, FfmpegSettings, LibrarySupport, StreamProfile};
//!
//! let mut codec = FfmpegCodec::new(StreamProfile::x265(), &FfmpegSettings::default(), LibrarySupport::detect())?;
//! let bytes = codec.encode(EncodeSource::Pixels(pixels.view()), None, Some(30))?;
//! ```

mod cli;
mod dimensions;
mod library;
mod profile;

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use ndarray::Array3;

use crate::application::port::codec::default_quality_for;
use crate::application::port::{resolve_quality, Codec, DecodeSource, EncodeSource};
use crate::config::defaults::{DEFAULT_FFMPEG, DEFAULT_PIXEL_FORMAT};
use crate::diagnostics::{BufferCapacity, CallHistory, CallRecord};
use crate::domain::codec::{Backend, QualitySteps};
use crate::error::{Error, Result};
use crate::media::image_file;

pub use cli::ProcessBackend;
pub use dimensions::parse_frame_dimensions;
pub use library::{init_ffmpeg, LibrarySupport};
pub use profile::{OptionSet, ProfileKind, RateControl, StreamProfile};

/// Construction parameters shared by every profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfmpegSettings {
    /// `ffmpeg` executable, a bare name or a path.
    pub ffmpeg: PathBuf,
    /// Directory searched before `PATH`.
    pub tool_dir: Option<PathBuf>,
    /// Explicit backend, or `None` to pick the first one present.
    pub backend: Option<Backend>,
    pub pixel_format: String,
    /// Overrides the midpoint of the quality domain.
    pub default_quality: Option<i32>,
    pub history_capacity: BufferCapacity,
}

impl Default for FfmpegSettings {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from(DEFAULT_FFMPEG),
            tool_dir: None,
            backend: None,
            pixel_format: DEFAULT_PIXEL_FORMAT.to_string(),
            default_quality: None,
            history_capacity: BufferCapacity::default(),
        }
    }
}

#[derive(Debug, Clone)]
enum ActiveBackend {
    Library(LibrarySupport),
    Process(ProcessBackend),
}

/// Stream-transport codec over one `FFmpeg` encoder.
#[derive(Debug)]
pub struct FfmpegCodec {
    profile: StreamProfile,
    pixel_format: String,
    backend: ActiveBackend,
    default_quality: i32,
    history: CallHistory,
}

impl FfmpegCodec {
    /// Creates a codec, selecting its backend.
    ///
    /// # Errors
    ///
    /// - [`Error::BackendUnavailable`] if `settings.backend` names a backend
    ///   that is not present (the other one is not tried)
    /// - [`Error::NoBackendAvailable`] if no backend was requested and
    ///   neither is present
    /// - [`Error::InvalidQuality`] if the default quality override is
    ///   outside the profile's domain
    pub fn new(
        profile: StreamProfile,
        settings: &FfmpegSettings,
        support: LibrarySupport,
    ) -> Result<Self> {
        let default_quality =
            default_quality_for(profile.quality_steps(), settings.default_quality)?;
        let backend = select_backend(&profile, settings, support)?;

        let codec = Self {
            profile,
            pixel_format: settings.pixel_format.clone(),
            backend,
            default_quality,
            history: CallHistory::new(settings.history_capacity),
        };
        log::debug!("{} codec using {} backend", codec.name(), codec.backend());
        Ok(codec)
    }

    /// The backend chosen at construction.
    #[must_use]
    pub fn backend(&self) -> Backend {
        match self.backend {
            ActiveBackend::Library(_) => Backend::Library,
            ActiveBackend::Process(_) => Backend::Process,
        }
    }

    #[must_use]
    pub fn profile(&self) -> &StreamProfile {
        &self.profile
    }

    #[must_use]
    pub fn pixel_format(&self) -> &str {
        &self.pixel_format
    }

    /// Runs a library operation and records it like a process invocation.
    fn record_library<T>(
        &mut self,
        command: String,
        operation: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        log::debug!("running: {command}");
        let result = operation();
        let response = match &result {
            Ok(_) => String::new(),
            Err(err) => err.to_string(),
        };
        self.history.push(CallRecord::new(command, response));
        result
    }
}

fn select_backend(
    profile: &StreamProfile,
    settings: &FfmpegSettings,
    support: LibrarySupport,
) -> Result<ActiveBackend> {
    let locate = || ProcessBackend::locate(&settings.ffmpeg, settings.tool_dir.as_deref());

    match settings.backend {
        Some(Backend::Library) => support
            .supports(profile)
            .then_some(ActiveBackend::Library(support))
            .ok_or(Error::BackendUnavailable(Backend::Library)),
        Some(Backend::Process) => locate()
            .map(ActiveBackend::Process)
            .ok_or(Error::BackendUnavailable(Backend::Process)),
        None => {
            if support.supports(profile) {
                Ok(ActiveBackend::Library(support))
            } else {
                locate()
                    .map(ActiveBackend::Process)
                    .ok_or_else(|| Error::NoBackendAvailable(profile.name().to_string()))
            }
        }
    }
}

impl Codec for FfmpegCodec {
    fn name(&self) -> &str {
        self.profile.name()
    }

    fn available_for_use(&self) -> bool {
        match &self.backend {
            ActiveBackend::Library(support) => support.supports(&self.profile),
            ActiveBackend::Process(process) => process.supports(self.profile.encoder()),
        }
    }

    fn quality_steps(&self) -> QualitySteps {
        self.profile.quality_steps()
    }

    fn can_stream(&self) -> bool {
        true
    }

    fn file_extension(&self) -> &str {
        self.profile.extension()
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
        let quality =
            resolve_quality(self.profile.quality_steps(), self.default_quality, quality)?;

        match self.backend.clone() {
            ActiveBackend::Process(process) => process.encode(
                &mut self.history,
                &self.profile,
                &self.pixel_format,
                source,
                target,
                quality,
            ),
            ActiveBackend::Library(_) => {
                let profile = self.profile.clone();
                let pixel_format = self.pixel_format.clone();
                let command = format!(
                    "libavcodec -c:v {} -pix_fmt {pixel_format} {}",
                    profile.encoder(),
                    profile.options(quality).to_cli_args().join(" ")
                );
                let stream = self.record_library(command, || {
                    let loaded;
                    let pixels = match source {
                        EncodeSource::Pixels(pixels) => pixels,
                        EncodeSource::File(path) => {
                            loaded = image_file::read_rgb(path)?;
                            loaded.view()
                        }
                    };
                    library::encode(&profile, &pixel_format, pixels, quality)
                })?;
                match target {
                    Some(path) => {
                        fs::write(path, &stream)?;
                        Ok(None)
                    }
                    None => Ok(Some(stream)),
                }
            }
        }
    }

    fn decode(
        &mut self,
        source: DecodeSource<'_>,
        target: Option<&Path>,
    ) -> Result<Option<Array3<u8>>> {
        match self.backend.clone() {
            ActiveBackend::Process(process) => {
                process.decode(&mut self.history, &self.profile, source, target)
            }
            ActiveBackend::Library(_) => {
                let profile = self.profile.clone();
                let command = format!("libavcodec -f {} decode", profile.format());
                let pixels = self.record_library(command, || {
                    let stream = match source {
                        DecodeSource::Bytes(bytes) => Cow::Borrowed(bytes),
                        DecodeSource::File(path) => Cow::Owned(fs::read(path)?),
                    };
                    library::decode(&profile, &stream)
                })?;
                match target {
                    Some(path) => {
                        image_file::write_rgb(pixels.view(), path)?;
                        Ok(None)
                    }
                    None => Ok(Some(pixels)),
                }
            }
        }
    }

    fn history(&self) -> &CallHistory {
        &self.history
    }
}
