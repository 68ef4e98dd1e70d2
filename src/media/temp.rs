// SPDX-License-Identifier: MPL-2.0
//! Scoped temporary files.

use std::path::Path;

use tempfile::TempPath;

use crate::error::{Error, Result};

const TEMP_PREFIX: &str = "codec-adapter-";

/// A temporary file path that is removed when the value is dropped.
///
/// The file is created empty so its name is reserved; no handle is kept
/// open, which lets external tools overwrite it freely. Dropping removes
/// the file on every exit path, including early returns and `?`.
/// [`ScopedTempFile::close`] does the same but reports failures.
#[derive(Debug)]
pub struct ScopedTempFile {
    path: TempPath,
}

impl ScopedTempFile {
    /// Reserves a temporary file ending in `.{extension}`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Resource`] if the file cannot be created.
    pub fn with_extension(extension: &str) -> Result<Self> {
        let suffix = format!(".{}", extension.trim_start_matches('.'));
        let file = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(&suffix)
            .tempfile()
            .map_err(|e| Error::Resource(format!("failed to create temporary file: {e}")))?;
        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    /// Path of the reserved file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the file now, surfacing any failure.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Resource`] if the file exists but cannot be removed.
    pub fn close(self) -> Result<()> {
        let display = self.path.display().to_string();
        self.path
            .close()
            .map_err(|e| Error::Resource(format!("failed to remove {display}: {e}")))
    }
}

impl AsRef<Path> for ScopedTempFile {
    fn as_ref(&self) -> &Path {
        self.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_exists_while_scoped_and_is_removed_on_drop() {
        let temp = ScopedTempFile::with_extension("webp").unwrap();
        let path = temp.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("webp"));

        drop(temp);
        assert!(!path.exists());
    }

    #[test]
    fn leading_dot_in_extension_is_accepted() {
        let temp = ScopedTempFile::with_extension(".png").unwrap();
        let name = temp.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with(TEMP_PREFIX));
        assert!(name.ends_with(".png"));
        assert!(!name.ends_with("..png"));
    }

    #[test]
    fn close_removes_file() {
        let temp = ScopedTempFile::with_extension("bpg").unwrap();
        let path = temp.path().to_path_buf();
        std::fs::write(&path, b"payload").unwrap();

        temp.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn removed_on_error_path() {
        fn failing(slot: &mut Option<std::path::PathBuf>) -> Result<()> {
            let temp = ScopedTempFile::with_extension("png")?;
            *slot = Some(temp.path().to_path_buf());
            Err(Error::Transport("encoder failed".to_string()))
        }

        let mut path = None;
        assert!(failing(&mut path).is_err());
        assert!(!path.unwrap().exists());
    }
}
