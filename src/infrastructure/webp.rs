// SPDX-License-Identifier: MPL-2.0
//! WebP adapter driving the `cwebp` and `dwebp` command-line tools.

use std::path::{Path, PathBuf};

use ndarray::Array3;

use crate::application::port::codec::{
    default_quality_for, require_encoded_file, require_file_source, require_target,
};
use crate::application::port::{resolve_quality, Codec, DecodeSource, EncodeSource};
use crate::config::defaults::DEFAULT_WEBP_SPEED;
use crate::diagnostics::{BufferCapacity, CallHistory};
use crate::domain::codec::QualitySteps;
use crate::error::Result;
use crate::infrastructure::process::{find_executable, run_recorded, ToolCommand};

const ENCODER_TOOL: &str = "cwebp";
const DECODER_TOOL: &str = "dwebp";
const STEPS: QualitySteps = QualitySteps::ascending(0, 100);

/// Codec backed by `cwebp`/`dwebp`.
#[derive(Debug)]
pub struct WebpCodec {
    speed: u8,
    tool_dir: Option<PathBuf>,
    default_quality: i32,
    history: CallHistory,
}

impl WebpCodec {
    /// Creates a WebP codec.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidQuality`] if `default_quality` is outside `0..=100`.
    pub fn new(
        speed: u8,
        tool_dir: Option<PathBuf>,
        default_quality: Option<i32>,
        history_capacity: BufferCapacity,
    ) -> Result<Self> {
        Ok(Self {
            speed,
            tool_dir,
            default_quality: default_quality_for(STEPS, default_quality)?,
            history: CallHistory::new(history_capacity),
        })
    }

    fn tool(&self, name: &str) -> PathBuf {
        find_executable(Path::new(name), self.tool_dir.as_deref())
            .unwrap_or_else(|| PathBuf::from(name))
    }

    fn encode_command(&self, source: &Path, target: &Path, quality: i32) -> ToolCommand {
        ToolCommand::new(self.tool(ENCODER_TOOL))
            .arg("-quiet")
            .arg("-m")
            .arg(self.speed.to_string())
            .arg("-q")
            .arg(quality.to_string())
            .arg(source)
            .arg("-o")
            .arg(target)
    }

    fn decode_command(&self, source: &Path, target: &Path) -> ToolCommand {
        ToolCommand::new(self.tool(DECODER_TOOL))
            .arg("-quiet")
            .arg(source)
            .arg("-o")
            .arg(target)
    }
}

impl Codec for WebpCodec {
    fn name(&self) -> &str {
        "webp"
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
        "webp"
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
        let source = require_file_source("webp", source)?;
        let target = require_target("webp", target)?;

        let command = self.encode_command(source, target, quality);
        run_recorded(&mut self.history, &command, None)?;
        Ok(None)
    }

    fn decode(
        &mut self,
        source: DecodeSource<'_>,
        target: Option<&Path>,
    ) -> Result<Option<Array3<u8>>> {
        let source = require_encoded_file("webp", source)?;
        let target = require_target("webp", target)?;

        let command = self.decode_command(source, target);
        run_recorded(&mut self.history, &command, None)?;
        Ok(None)
    }

    fn history(&self) -> &CallHistory {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn codec(tool_dir: Option<PathBuf>) -> WebpCodec {
        WebpCodec::new(DEFAULT_WEBP_SPEED, tool_dir, None, BufferCapacity::default()).unwrap()
    }

    fn rendered_args(command: &ToolCommand) -> Vec<String> {
        command
            .arguments()
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn encode_command_layout() {
        let codec = codec(None);
        let command = codec.encode_command(Path::new("src.png"), Path::new("dst.webp"), 30);
        assert_eq!(
            rendered_args(&command),
            ["-quiet", "-m", "6", "-q", "30", "src.png", "-o", "dst.webp"]
        );
    }

    #[test]
    fn decode_command_layout() {
        let codec = codec(None);
        let command = codec.decode_command(Path::new("src.webp"), Path::new("dst.png"));
        assert_eq!(rendered_args(&command), ["-quiet", "src.webp", "-o", "dst.png"]);
    }

    #[test]
    fn quality_domain_and_default() {
        let codec = codec(None);
        assert_eq!(codec.quality_steps(), QualitySteps::ascending(0, 100));
        assert_eq!(codec.default_quality(), 50);
        assert_eq!(codec.file_extension(), "webp");
    }

    #[test]
    fn unavailable_without_tools() {
        let dir = tempfile::tempdir().unwrap();
        let codec = codec(Some(dir.path().to_path_buf()));
        // Only true if both tools happen to be installed system-wide.
        if find_executable(Path::new(ENCODER_TOOL), None).is_none() {
            assert!(!codec.available_for_use());
        }
    }

    #[test]
    fn out_of_range_quality_leaves_history_empty() {
        let mut codec = codec(None);
        for quality in [-1, 101] {
            let err = codec
                .encode(
                    EncodeSource::File(Path::new("a.png")),
                    Some(Path::new("a.webp")),
                    Some(quality),
                )
                .unwrap_err();
            assert!(matches!(err, Error::InvalidQuality { .. }));
        }
        assert!(codec.history().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn stand_in_tools_are_found_and_recorded() {
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        for tool in [ENCODER_TOOL, DECODER_TOOL] {
            let path = dir.path().join(tool);
            fs::write(
                &path,
                "#!/bin/sh\nprev=\nfor a in \"$@\"; do\n  [ \"$prev\" = \"-o\" ] && out=\"$a\"\n  case \"$a\" in -*) ;; *) [ \"$prev\" = \"-o\" ] || src=\"$a\";; esac\n  prev=\"$a\"\ndone\ncp \"$src\" \"$out\"\n",
            )
            .unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }
        let mut codec = codec(Some(dir.path().to_path_buf()));
        assert!(codec.available_for_use());

        let source = dir.path().join("in.png");
        fs::write(&source, b"pixels").unwrap();
        let encoded = dir.path().join("out.webp");
        codec
            .encode(EncodeSource::File(&source), Some(&encoded), Some(30))
            .unwrap();

        assert_eq!(fs::read(&encoded).unwrap(), b"pixels");
        let record = codec.history().last().unwrap();
        assert!(record.command.contains("-q 30"));
        assert!(record.command.starts_with(&dir.path().join(ENCODER_TOOL).display().to_string()));
    }
}
