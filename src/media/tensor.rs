// SPDX-License-Identifier: MPL-2.0
//! Image tensor normalization.
//!
//! Codecs work on channel-last `(H, W, 3)` pixels. Callers may hand in
//! channel-first `(3, H, W)` tensors, optionally wrapped in a singleton
//! batch axis. [`normalize`] produces the canonical view and a
//! [`TensorLayout`] that [`restore`] uses to give the caller back the
//! layout and rank it started with.

use ndarray::{Array3, ArrayD, ArrayView3, ArrayViewD, Axis, Ix3};

use crate::error::{Error, Result};

/// Number of colour channels every tensor carries.
pub const CHANNELS: usize = 3;

/// Layout bookkeeping recorded by [`normalize`] and inverted by [`restore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TensorLayout {
    rank: usize,
    channels_first: bool,
}

impl TensorLayout {
    /// The layout of a plain `(H, W, 3)` tensor.
    #[must_use]
    pub const fn channel_last() -> Self {
        Self {
            rank: 3,
            channels_first: false,
        }
    }

    /// Rank of the original tensor (3, or 4 with a batch axis).
    #[must_use]
    pub fn rank(self) -> usize {
        self.rank
    }

    /// Whether the original tensor was `(3, H, W)`.
    #[must_use]
    pub fn is_channels_first(self) -> bool {
        self.channels_first
    }

    /// Whether the original tensor carried a singleton batch axis.
    #[must_use]
    pub fn has_batch_axis(self) -> bool {
        self.rank == 4
    }
}

impl Default for TensorLayout {
    fn default() -> Self {
        Self::channel_last()
    }
}

/// Returns true if a rank-3 shape is channel-first.
///
/// Axis 0 is the channel axis only when it has size 3 and axis 2 does not;
/// a shape like `(3, 5, 3)` is read as channel-last.
#[must_use]
pub fn is_channels_first(shape: &[usize]) -> bool {
    shape.len() == 3 && shape[0] == CHANNELS && shape[2] != CHANNELS
}

/// Returns a channel-last `(H, W, 3)` view of `tensor`.
///
/// No pixel data is copied: batch squeezing and the channel transpose are
/// view operations.
///
/// # Errors
///
/// - [`Error::UnsupportedBatch`] for a rank-4 tensor whose batch is not 1
/// - [`Error::UnsupportedShape`] for any other rank, or when the canonical
///   layout does not end in 3 channels
pub fn normalize<'a>(tensor: ArrayViewD<'a, u8>) -> Result<(ArrayView3<'a, u8>, TensorLayout)> {
    let rank = tensor.ndim();
    let squeezed = match rank {
        3 => tensor,
        4 => {
            let batch = tensor.shape()[0];
            if batch != 1 {
                return Err(Error::UnsupportedBatch(batch));
            }
            tensor.index_axis_move(Axis(0), 0)
        }
        _ => return Err(Error::UnsupportedShape(tensor.shape().to_vec())),
    };

    let original_shape = squeezed.shape().to_vec();
    let view = squeezed
        .into_dimensionality::<Ix3>()
        .map_err(|_| Error::UnsupportedShape(original_shape.clone()))?;

    let channels_first = is_channels_first(view.shape());
    let view = if channels_first {
        view.permuted_axes([1, 2, 0])
    } else {
        view
    };

    if view.shape()[2] != CHANNELS {
        return Err(Error::UnsupportedShape(original_shape));
    }

    Ok((
        view,
        TensorLayout {
            rank,
            channels_first,
        },
    ))
}

/// Converts a channel-last `(H, W, 3)` result back to the original layout.
///
/// The channel-first transpose is undone first, then the batch axis is
/// re-inserted. The returned array is in standard (row-major) layout.
#[must_use]
pub fn restore(pixels: Array3<u8>, layout: TensorLayout) -> ArrayD<u8> {
    let pixels = if layout.channels_first {
        pixels.permuted_axes([2, 0, 1]).as_standard_layout().into_owned()
    } else {
        pixels
    };

    let restored = pixels.into_dyn();
    if layout.has_batch_axis() {
        restored.insert_axis(Axis(0))
    } else {
        restored
    }
}

/// Copies a channel-last view into a row-major `RGBRGB…` byte buffer.
#[must_use]
pub fn to_rgb_bytes(pixels: ArrayView3<'_, u8>) -> Vec<u8> {
    pixels.iter().copied().collect()
}

/// Builds a channel-last tensor from a row-major RGB byte buffer.
///
/// # Errors
///
/// Returns [`Error::FrameSize`] if the buffer length is not
/// `width * height * 3`.
pub fn from_rgb_bytes(width: u32, height: u32, bytes: Vec<u8>) -> Result<Array3<u8>> {
    let expected = width as usize * height as usize * CHANNELS;
    if bytes.len() != expected {
        return Err(Error::FrameSize {
            width,
            height,
            expected,
            actual: bytes.len(),
        });
    }
    Array3::from_shape_vec((height as usize, width as usize, CHANNELS), bytes).map_err(|_| {
        Error::FrameSize {
            width,
            height,
            expected,
            actual: expected,
        }
    })
}

/// `(width, height)` of a channel-last view.
///
/// # Errors
///
/// Returns [`Error::UnsupportedShape`] if a dimension does not fit in `u32`.
pub fn dimensions(pixels: &ArrayView3<'_, u8>) -> Result<(u32, u32)> {
    let shape = pixels.shape();
    let height = u32::try_from(shape[0]).map_err(|_| Error::UnsupportedShape(shape.to_vec()))?;
    let width = u32::try_from(shape[1]).map_err(|_| Error::UnsupportedShape(shape.to_vec()))?;
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, Array4, IxDyn};

    fn gradient(shape: &[usize]) -> ArrayD<u8> {
        let len: usize = shape.iter().product();
        Array::from_shape_vec(IxDyn(shape), (0..len).map(|v| (v % 251) as u8).collect())
            .expect("shape matches length")
    }

    #[test]
    fn channel_last_tensor_is_passed_through() {
        let tensor = gradient(&[64, 48, 3]);
        let (view, layout) = normalize(tensor.view()).unwrap();
        assert_eq!(view.shape(), &[64, 48, 3]);
        assert_eq!(layout, TensorLayout::channel_last());
        assert_eq!(view, tensor.view().into_dimensionality::<Ix3>().unwrap());
    }

    #[test]
    fn channel_first_tensor_is_transposed() {
        let tensor = gradient(&[3, 64, 48]);
        let (view, layout) = normalize(tensor.view()).unwrap();
        assert_eq!(view.shape(), &[64, 48, 3]);
        assert!(layout.is_channels_first());
        assert_eq!(view[[5, 7, 2]], tensor[[2, 5, 7]]);
    }

    #[test]
    fn ambiguous_three_by_three_is_channel_last() {
        assert!(!is_channels_first(&[3, 10, 3]));
        assert!(is_channels_first(&[3, 10, 4]));

        let tensor = gradient(&[3, 10, 3]);
        let (view, layout) = normalize(tensor.view()).unwrap();
        assert!(!layout.is_channels_first());
        assert_eq!(view.shape(), &[3, 10, 3]);
    }

    #[test]
    fn singleton_batch_is_squeezed() {
        let tensor = gradient(&[1, 64, 48, 3]);
        let (view, layout) = normalize(tensor.view()).unwrap();
        assert_eq!(view.shape(), &[64, 48, 3]);
        assert!(layout.has_batch_axis());
        assert_eq!(layout.rank(), 4);
    }

    #[test]
    fn batched_channel_first_is_squeezed_and_transposed() {
        let tensor = gradient(&[1, 3, 64, 48]);
        let (view, layout) = normalize(tensor.view()).unwrap();
        assert_eq!(view.shape(), &[64, 48, 3]);
        assert!(layout.has_batch_axis());
        assert!(layout.is_channels_first());
    }

    #[test]
    fn larger_batch_is_rejected() {
        let tensor = Array4::<u8>::zeros((2, 8, 8, 3)).into_dyn();
        let err = normalize(tensor.view()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedBatch(2)));
    }

    #[test]
    fn unsupported_rank_is_rejected() {
        let tensor = gradient(&[8, 8]);
        let err = normalize(tensor.view()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedShape(shape) if shape == vec![8, 8]));
    }

    #[test]
    fn missing_channel_axis_is_rejected() {
        let tensor = gradient(&[8, 8, 4]);
        let err = normalize(tensor.view()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedShape(shape) if shape == vec![8, 8, 4]));
    }

    #[test]
    fn restore_inverts_normalize() {
        for shape in [
            vec![64, 48, 3],
            vec![3, 64, 48],
            vec![1, 64, 48, 3],
            vec![1, 3, 64, 48],
        ] {
            let tensor = gradient(&shape);
            let (view, layout) = normalize(tensor.view()).unwrap();
            let restored = restore(view.to_owned(), layout);
            assert_eq!(restored.shape(), shape.as_slice());
            assert_eq!(restored, tensor);
        }
    }

    #[test]
    fn rgb_bytes_follow_row_major_order_of_the_view() {
        let tensor = gradient(&[3, 2, 4]);
        let (view, _) = normalize(tensor.view()).unwrap();
        let bytes = to_rgb_bytes(view);
        assert_eq!(bytes.len(), 24);
        // First pixel: (y=0, x=0) across the three planes
        assert_eq!(&bytes[..3], &[tensor[[0, 0, 0]], tensor[[1, 0, 0]], tensor[[2, 0, 0]]]);

        let rebuilt = from_rgb_bytes(4, 2, bytes).unwrap();
        assert_eq!(rebuilt.view(), view);
    }

    #[test]
    fn from_rgb_bytes_checks_length() {
        let err = from_rgb_bytes(4, 4, vec![0; 10]).unwrap_err();
        assert!(matches!(
            err,
            Error::FrameSize {
                expected: 48,
                actual: 10,
                ..
            }
        ));
    }

    #[test]
    fn dimensions_are_width_then_height() {
        let tensor = Array3::<u8>::zeros((64, 48, 3));
        assert_eq!(dimensions(&tensor.view()).unwrap(), (48, 64));
    }
}
