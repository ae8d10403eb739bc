// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Renderers the composer creates itself.
//!
//! Concrete dataset renderers come from viewer types; the ones here are
//! derived from other renderers (pixel operators, the magic lens) or are the
//! default image builder for query-data-model datasets.

pub mod magic_lens;
pub mod pixel_operator;
pub mod query_image;

#[cfg(test)]
pub mod stub;

pub use magic_lens::MagicLensBuilder;
pub use pixel_operator::{DefaultOperatorFactory, PixelOperation, PixelOperatorBuilder};
pub use query_image::QueryImageBuilder;
