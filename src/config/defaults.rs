// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! This module serves as the single source of truth for default values
//! used across the crate. Constants are organized by category.
//!
//! # Categories
//!
//! - **History**: Call-history capacity bounds
//! - **BPG**: `bpgenc` parameters
//! - **WebP**: `cwebp` parameters
//! - **FFmpeg**: Executable, pixel format and encoder tuning

use crate::domain::diagnostics::buffer_capacity_bounds;

// ==========================================================================
// History Defaults
// ==========================================================================

/// Default number of invocations a codec remembers.
pub const DEFAULT_HISTORY_CAPACITY: usize = buffer_capacity_bounds::DEFAULT;

/// Minimum history capacity.
pub const MIN_HISTORY_CAPACITY: usize = buffer_capacity_bounds::MIN;

/// Maximum history capacity.
pub const MAX_HISTORY_CAPACITY: usize = buffer_capacity_bounds::MAX;

// ==========================================================================
// BPG Defaults
// ==========================================================================

/// `bpgenc -m`: 1 is slowest, 9 fastest.
pub const DEFAULT_BPG_SPEED: u8 = 9;

/// `bpgenc -b`.
pub const DEFAULT_BPG_BIT_DEPTH: u8 = 12;

/// `bpgenc -c`.
pub const DEFAULT_BPG_COLOUR_SPACE: &str = "ycbcr";

/// `bpgenc -f`.
pub const DEFAULT_BPG_CHROMA_FORMAT: &str = "444";

// ==========================================================================
// WebP Defaults
// ==========================================================================

/// `cwebp -m`: 0 is fastest, 6 slowest.
pub const DEFAULT_WEBP_SPEED: u8 = 6;

/// Slowest `cwebp` method.
pub const MAX_WEBP_SPEED: u8 = 6;

// ==========================================================================
// FFmpeg Defaults
// ==========================================================================

/// Executable looked up when no path is configured.
pub const DEFAULT_FFMPEG: &str = "ffmpeg";

/// Encoder input pixel format.
pub const DEFAULT_PIXEL_FORMAT: &str = "yuv444p";

/// `libx265`/`libx264` preset.
pub const DEFAULT_PRESET: &str = "medium";

/// `libaom-av1` speed/quality trade-off.
pub const DEFAULT_AV1_CPU_USED: u8 = 4;

/// Fastest `libaom-av1` setting.
pub const MAX_AV1_CPU_USED: u8 = 8;

// ==========================================================================
// Compile-time Validation
// ==========================================================================

const _: () = {
    // History validation
    assert!(MIN_HISTORY_CAPACITY > 0);
    assert!(MAX_HISTORY_CAPACITY >= MIN_HISTORY_CAPACITY);
    assert!(DEFAULT_HISTORY_CAPACITY >= MIN_HISTORY_CAPACITY);
    assert!(DEFAULT_HISTORY_CAPACITY <= MAX_HISTORY_CAPACITY);

    // BPG validation
    assert!(DEFAULT_BPG_SPEED >= 1 && DEFAULT_BPG_SPEED <= 9);
    assert!(DEFAULT_BPG_BIT_DEPTH >= 8 && DEFAULT_BPG_BIT_DEPTH <= 14);

    // Encoder speed validation
    assert!(DEFAULT_WEBP_SPEED <= MAX_WEBP_SPEED);
    assert!(DEFAULT_AV1_CPU_USED <= MAX_AV1_CPU_USED);
};
