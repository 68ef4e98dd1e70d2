// SPDX-License-Identifier: MPL-2.0
//! Domain layer - Core types with ZERO external dependencies.
//!
//! This module contains pure domain types and value objects. It has no
//! dependencies on external crates (except `std`) to keep it testable
//! independently of the tools and libraries behind the codecs.
//!
//! # Modules
//!
//! - [`codec`]: Codec types ([`QualitySteps`](codec::QualitySteps),
//!   [`Backend`](codec::Backend))
//! - [`diagnostics`]: Diagnostics types ([`BufferCapacity`](diagnostics::BufferCapacity),
//!   [`CallRecord`](diagnostics::CallRecord))

pub mod codec;
pub mod diagnostics;
