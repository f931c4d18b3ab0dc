//! Parameter types for codec transforms.
//!
//! [`TransformParams`] describes *what* to do, not *how* to do it. It is the
//! interface between the high-level [`placeholder`](crate::placeholder)
//! module (which decides target geometry) and the
//! [`backend`](super::backend) (which does the actual pixel work). The
//! separation allows swapping backends (e.g. for testing with a mock)
//! without changing assembly logic.

use crate::codec::Dimensions;
use crate::options::{FitMode, Modulation, OutputFormat, PlaceholderOptions, ResampleKernel};

/// Full specification of one placeholder transform.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformParams {
    /// Target dimensions, already resolved and clamped.
    pub width: u32,
    pub height: u32,
    pub fit: FitMode,
    pub kernel: ResampleKernel,
    pub modulation: Modulation,
    pub format: OutputFormat,
    /// Lossy encoding quality (0-100); lossless formats ignore it.
    pub quality: u8,
    /// Gaussian blur sigma; `None` skips the blur pass.
    pub blur: Option<f32>,
}

impl TransformParams {
    /// Build transform params from validated options and a resolved target.
    pub fn from_options(options: &PlaceholderOptions, target: Dimensions) -> Self {
        Self {
            width: target.width,
            height: target.height,
            fit: options.fit,
            kernel: options.kernel,
            modulation: options.modulation,
            format: options.format,
            quality: options.quality,
            blur: options.blur,
        }
    }
}
