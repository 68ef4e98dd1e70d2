// SPDX-License-Identifier: MPL-2.0
//! Pixel data handling shared by all codecs.
//!
//! - [`tensor`]: Layout normalization of caller tensors
//! - [`image_file`]: Tensor ⇄ image file conversion
//! - [`temp`]: Scoped temporary files

pub mod image_file;
pub mod temp;
pub mod tensor;

pub use temp::ScopedTempFile;
pub use tensor::{normalize, restore, TensorLayout};
