//! Image codec trait and shared types.
//!
//! The [`ImageCodec`] trait defines the two operations every codec must
//! support: read_metadata and transform. Everything upstream of it is
//! codec-agnostic, so tests can script a mock instead of encoding pixels.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend) — pure Rust, statically
//! linked, no system libraries.

use super::params::TransformParams;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image codec backends.
pub trait ImageCodec: Sync {
    /// Read image dimensions from encoded bytes, without a full decode where
    /// the format allows it.
    fn read_metadata(&self, bytes: &[u8]) -> Result<Dimensions, CodecError>;

    /// Decode, apply the transform described by `params` (resize → modulate →
    /// blur → encode), and return the encoded output bytes.
    fn transform(&self, bytes: &[u8], params: &TransformParams) -> Result<Vec<u8>, CodecError>;
}
