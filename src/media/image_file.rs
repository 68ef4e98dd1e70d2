// SPDX-License-Identifier: MPL-2.0
//! Reading and writing tensors as ordinary image files.
//!
//! File-transport codecs only accept paths, so tensors are materialized
//! through the `image` crate. The format follows the path extension.

use std::path::Path;

use image_rs::RgbImage;
use ndarray::{Array3, ArrayView3};

use super::tensor::{dimensions, from_rgb_bytes, to_rgb_bytes};
use crate::error::{Error, Result};

/// Writes a channel-last tensor to `path`.
///
/// # Errors
///
/// Returns an error if the tensor dimensions do not fit an image or the
/// file cannot be encoded/written.
pub fn write_rgb(pixels: ArrayView3<'_, u8>, path: &Path) -> Result<()> {
    let (width, height) = dimensions(&pixels)?;
    let buffer = RgbImage::from_raw(width, height, to_rgb_bytes(pixels))
        .ok_or_else(|| Error::Image(format!("invalid {width}x{height} RGB buffer")))?;
    buffer.save(path)?;
    Ok(())
}

/// Reads an image file as a channel-last RGB tensor.
///
/// Alpha and grayscale images are converted to 8-bit RGB.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or decoded.
pub fn read_rgb(path: &Path) -> Result<Array3<u8>> {
    let image = image_rs::open(path)?.to_rgb8();
    let (width, height) = image.dimensions();
    from_rgb_bytes(width, height, image.into_raw())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn png_round_trip_is_lossless() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("frame.png");
        let pixels =
            Array3::from_shape_fn((64, 48, 3), |(y, x, c)| ((y * 3 + x * 5 + c * 7) % 256) as u8);

        write_rgb(pixels.view(), &path).unwrap();
        let loaded = read_rgb(&path).unwrap();

        assert_eq!(loaded.shape(), &[64, 48, 3]);
        assert_eq!(loaded, pixels);
    }

    #[test]
    fn transposed_view_is_written_in_row_major_order() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("planar.png");
        let planar = Array3::from_shape_fn((3, 4, 5), |(c, y, x)| (c * 100 + y * 10 + x) as u8);
        let view = planar.view().permuted_axes([1, 2, 0]);

        write_rgb(view, &path).unwrap();
        let loaded = read_rgb(&path).unwrap();

        assert_eq!(loaded.view(), view);
    }

    #[test]
    fn reading_missing_file_fails() {
        let dir = tempdir().expect("temp dir");
        let err = read_rgb(&dir.path().join("absent.png")).unwrap_err();
        assert!(matches!(err, Error::Image(_)));
    }
}
