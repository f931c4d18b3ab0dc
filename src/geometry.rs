//! Pure geometry resolution for placeholder targets.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! Target dimensions are derived from four mutually-interacting, all-optional
//! inputs: an absolute size, a fractional scale, an aspect-ratio constraint,
//! and the original image dimensions. One dimension — the *major* dimension,
//! height for landscape originals and width for portrait ones — is always
//! fixed first, and the other is derived from the target ratio. This keeps
//! the output from silently inverting orientation and lets an explicit ratio
//! win over the image's native one.

use crate::codec::Dimensions;
use crate::options::{RatioSpec, SizeSpec};

/// Smallest value a resolved dimension may have on either axis.
pub const MIN_DIMENSION: u32 = 4;

/// Fractional scale applied when no sizing input is present at all.
const DEFAULT_SCALE: f64 = 0.1;

/// Floor a dimension and clamp it to [`MIN_DIMENSION`].
///
/// Applied to every dimension that is finalized, never to intermediate
/// unclamped products.
fn clamp_dimension(value: f64) -> u32 {
    (value.floor() as u32).max(MIN_DIMENSION)
}

/// Primary sizing mode, resolved once from the optional inputs.
///
/// Priority order: exact pair → single edge → scale → default. Making the
/// priority a closed enum keeps every branch of [`resolve`] exhaustive.
#[derive(Debug, Clone, Copy, PartialEq)]
enum SizingMode {
    /// Both dimensions given literally.
    Exact { width: f64, height: f64 },
    /// A single target for the major dimension.
    Edge(f64),
    /// Multiplicative scale of the original dimensions.
    Scale(f64),
    /// Nothing given: a small fraction of the original.
    Default,
}

impl SizingMode {
    fn from_inputs(size: Option<SizeSpec>, scale: Option<f64>) -> Self {
        match (size, scale) {
            (Some(SizeSpec::Edge(edge)), _) => Self::Edge(edge),
            (Some(SizeSpec::Exact { width, height }), _) => Self::Exact { width, height },
            (None, Some(factor)) => Self::Scale(factor),
            (None, None) => Self::Default,
        }
    }
}

/// Resolve target placeholder dimensions from the sizing inputs.
///
/// Pure and deterministic. Inputs are expected to be pre-validated (see
/// [`PlaceholderOptions::validate`](crate::options::PlaceholderOptions::validate));
/// every returned dimension is floored and clamped to at least
/// [`MIN_DIMENSION`].
///
/// # Examples
/// ```
/// use blurlet::geometry::resolve;
/// use blurlet::{Dimensions, SizeSpec};
///
/// // 1600x900 landscape with a 24px edge → height 24, width 24 × 16/9 = 42
/// let original = Dimensions { width: 1600, height: 900 };
/// let target = resolve(original, Some(SizeSpec::Edge(24.0)), None, None);
/// assert_eq!((target.width, target.height), (42, 24));
///
/// // 900x1600 portrait at half scale → width 450, height 800
/// let original = Dimensions { width: 900, height: 1600 };
/// let target = resolve(original, None, Some(0.5), None);
/// assert_eq!((target.width, target.height), (450, 800));
/// ```
pub fn resolve(
    original: Dimensions,
    size: Option<SizeSpec>,
    scale: Option<f64>,
    ratio: Option<RatioSpec>,
) -> Dimensions {
    let original_ratio = original.width as f64 / original.height as f64;
    let is_landscape = original_ratio >= 1.0;
    let target_ratio = match ratio {
        Some(spec) => spec.value(),
        None => original_ratio,
    };

    match SizingMode::from_inputs(size, scale) {
        SizingMode::Edge(edge) => derive_from_major(edge, is_landscape, target_ratio),
        SizingMode::Exact { width, height } => {
            let mut target = Dimensions {
                width: clamp_dimension(width),
                height: clamp_dimension(height),
            };
            if ratio.is_some() {
                // Shrink whichever dimension is too large for the requested
                // ratio; the other keeps its literal value. At exact equality
                // the width is the one recomputed.
                let current_ratio = target.width as f64 / target.height as f64;
                if current_ratio >= target_ratio {
                    target.width = clamp_dimension(target.height as f64 * target_ratio);
                } else {
                    target.height = clamp_dimension(target.width as f64 / target_ratio);
                }
            }
            target
        }
        SizingMode::Scale(factor) => {
            let major = major_dimension(original, is_landscape) * factor;
            derive_from_major(major, is_landscape, target_ratio)
        }
        SizingMode::Default => {
            let major = major_dimension(original, is_landscape) * DEFAULT_SCALE;
            derive_from_major(major, is_landscape, target_ratio)
        }
    }
}

/// The original's major dimension: height for landscape, width for portrait.
fn major_dimension(original: Dimensions, is_landscape: bool) -> f64 {
    if is_landscape {
        original.height as f64
    } else {
        original.width as f64
    }
}

/// Fix the major dimension, then derive the minor one from the target ratio.
///
/// The minor dimension is computed from the already-clamped major value, so
/// both axes respect the floor independently.
fn derive_from_major(major: f64, is_landscape: bool, target_ratio: f64) -> Dimensions {
    if is_landscape {
        let height = clamp_dimension(major);
        let width = clamp_dimension(height as f64 * target_ratio);
        Dimensions { width, height }
    } else {
        let width = clamp_dimension(major);
        let height = clamp_dimension(width as f64 / target_ratio);
        Dimensions { width, height }
    }
}
