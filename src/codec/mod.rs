//! Image codec capability — decode, transform, encode. Pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions` (no full decode) |
//! | **Resize** | `image::imageops` filter per kernel, fit-aware |
//! | **Modulate** | linear RGB pass + `DynamicImage::huerotate` |
//! | **Blur** | `DynamicImage::blur` (Gaussian) |
//! | **Encode → AVIF** | `image::codecs::avif::AvifEncoder` (rav1e, speed 6) |
//! | **Encode → JPEG/PNG/WebP** | `image::codecs` encoders |
//!
//! The module is split into:
//! - **Backend**: [`ImageCodec`] trait + shared types — the capability seam
//! - **Parameters**: [`TransformParams`] describing one transform
//! - **RustBackend**: the `image`-crate implementation

pub mod backend;
mod params;
pub mod rust_backend;

pub use backend::{CodecError, Dimensions, ImageCodec};
pub use params::TransformParams;
pub use rust_backend::RustBackend;
