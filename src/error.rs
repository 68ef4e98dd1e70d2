// SPDX-License-Identifier: MPL-2.0
use std::fmt::Write as _;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::codec::{Backend, ParseBackendError, QualitySteps};
use crate::domain::diagnostics::CallRecord;

#[derive(Debug, Error)]
pub enum Error {
    /// Quality level outside the codec's domain. Raised before any invocation.
    #[error("quality {quality} is not a valid step (expected one of {steps})")]
    InvalidQuality { quality: i32, steps: QualitySteps },

    /// Rank-4 tensor whose leading dimension is not 1.
    #[error("unsupported batch size {0}: only single-image batches are accepted")]
    UnsupportedBatch(usize),

    /// Tensor that is neither `(H, W, 3)` nor `(3, H, W)`.
    #[error("unsupported tensor shape {0:?}: expected (H, W, 3) or (3, H, W)")]
    UnsupportedShape(Vec<usize>),

    /// An explicitly requested backend is missing.
    #[error("{0} backend is not available")]
    BackendUnavailable(Backend),

    /// Neither backend could be found for a stream codec.
    #[error("no backend available for {0}")]
    NoBackendAvailable(String),

    /// The decoder's diagnostic text carried no `WIDTHxHEIGHT` token.
    #[error("{}", describe_dimension_parse(.recent))]
    DimensionParse { recent: Vec<CallRecord> },

    /// A raw pixel buffer did not match the parsed frame dimensions.
    #[error("decoded frame is {actual} bytes, expected {expected} for {width}x{height} RGB")]
    FrameSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// Temporary file creation or cleanup failed.
    #[error("temporary resource error: {0}")]
    Resource(String),

    /// The backing tool finished without producing its output file.
    #[error("expected output file {} was not produced", .0.display())]
    MissingOutput(PathBuf),

    /// A codec was asked for a transport it does not support.
    #[error("{0}")]
    Transport(String),

    /// The linked multimedia library reported a failure.
    #[error("library error: {0}")]
    Library(String),

    #[error("image error: {0}")]
    Image(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Records attached to the error for diagnosis, newest first.
    #[must_use]
    pub fn recent_calls(&self) -> &[CallRecord] {
        match self {
            Error::DimensionParse { recent } => recent,
            _ => &[],
        }
    }
}

fn describe_dimension_parse(recent: &[CallRecord]) -> String {
    let mut message =
        String::from("could not find frame dimensions (WIDTHxHEIGHT) in decoder output");
    for record in recent {
        let _ = write!(message, "\n{record}");
    }
    message
}

impl From<image_rs::ImageError> for Error {
    fn from(err: image_rs::ImageError) -> Self {
        Error::Image(err.to_string())
    }
}

impl From<ffmpeg_next::Error> for Error {
    fn from(err: ffmpeg_next::Error) -> Self {
        Error::Library(err.to_string())
    }
}

impl From<ParseBackendError> for Error {
    fn from(err: ParseBackendError) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
