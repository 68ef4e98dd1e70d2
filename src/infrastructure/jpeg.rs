// SPDX-License-Identifier: MPL-2.0
//! JPEG adapter using the `image` crate's encoder in-process.
//!
//! Although no external tool is involved, the adapter keeps file transport
//! semantics and records each operation in its history like the tool-backed
//! codecs do. The same encoder serves two registry entries: `jpeg` writes
//! `.jpg` files and `jpegfi` writes JFIF interchange files named `.jif`.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image_rs::codecs::jpeg::JpegEncoder;
use ndarray::Array3;

use crate::application::port::codec::{
    default_quality_for, require_encoded_file, require_file_source, require_target,
};
use crate::application::port::{resolve_quality, Codec, DecodeSource, EncodeSource};
use crate::diagnostics::{BufferCapacity, CallHistory, CallRecord};
use crate::domain::codec::QualitySteps;
use crate::error::{Error, Result};

const STEPS: QualitySteps = QualitySteps::ascending(1, 100);

/// Codec backed by the `image` crate's baseline JPEG encoder.
#[derive(Debug)]
pub struct JpegCodec {
    name: &'static str,
    extension: &'static str,
    default_quality: i32,
    history: CallHistory,
}

impl JpegCodec {
    /// Creates a JPEG codec writing `.jpg` files.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuality`] if `default_quality` is outside `1..=100`.
    pub fn new(default_quality: Option<i32>, history_capacity: BufferCapacity) -> Result<Self> {
        Ok(Self {
            name: "jpeg",
            extension: "jpg",
            default_quality: default_quality_for(STEPS, default_quality)?,
            history: CallHistory::new(history_capacity),
        })
    }

    /// Creates a JPEG codec writing JFIF interchange files (`.jif`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuality`] if `default_quality` is outside `1..=100`.
    pub fn interchange(
        default_quality: Option<i32>,
        history_capacity: BufferCapacity,
    ) -> Result<Self> {
        Ok(Self {
            name: "jpegfi",
            extension: "jif",
            ..Self::new(default_quality, history_capacity)?
        })
    }

    fn record<T>(&mut self, command: String, result: &Result<T>) {
        let response = match result {
            Ok(_) => String::new(),
            Err(err) => err.to_string(),
        };
        self.history.push(CallRecord::new(command, response));
    }
}

fn encode_file(source: &Path, target: &Path, quality: u8) -> Result<()> {
    let pixels = image_rs::open(source)?.to_rgb8();
    let writer = BufWriter::new(File::create(target)?);
    pixels.write_with_encoder(JpegEncoder::new_with_quality(writer, quality))?;
    Ok(())
}

// `.jif` is not an extension the `image` crate maps to JPEG, so the format
// is sniffed from the file header.
fn decode_file(source: &Path, target: &Path) -> Result<()> {
    image_rs::ImageReader::open(source)?
        .with_guessed_format()?
        .decode()?
        .to_rgb8()
        .save(target)?;
    Ok(())
}

impl Codec for JpegCodec {
    fn name(&self) -> &str {
        self.name
    }

    fn available_for_use(&self) -> bool {
        true
    }

    fn quality_steps(&self) -> QualitySteps {
        STEPS
    }

    fn can_stream(&self) -> bool {
        false
    }

    fn file_extension(&self) -> &str {
        self.extension
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
        let source = require_file_source(self.name, source)?;
        let target = require_target(self.name, target)?;
        let quality = u8::try_from(quality).map_err(|_| Error::InvalidQuality {
            quality,
            steps: STEPS,
        })?;

        let command = format!(
            "{} encode -q {quality} {} -o {}",
            self.name,
            source.display(),
            target.display()
        );
        log::debug!("running: {command}");
        let result = encode_file(source, target, quality);
        self.record(command, &result);
        result.map(|()| None)
    }

    fn decode(
        &mut self,
        source: DecodeSource<'_>,
        target: Option<&Path>,
    ) -> Result<Option<Array3<u8>>> {
        let source = require_encoded_file(self.name, source)?;
        let target = require_target(self.name, target)?;

        let command = format!(
            "{} decode {} -o {}",
            self.name,
            source.display(),
            target.display()
        );
        log::debug!("running: {command}");
        let result = decode_file(source, target);
        self.record(command, &result);
        result.map(|()| None)
    }

    fn history(&self) -> &CallHistory {
        &self.history
    }
}
