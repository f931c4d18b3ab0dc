//! Option surface and precondition validation.
//!
//! These types describe *what* to produce, not *how* to produce it. The
//! sizing inputs (`size`, `scale`, `ratio`) are modeled as closed enums so
//! the [`geometry`](crate::geometry) resolver can branch exhaustively instead
//! of sniffing shapes at every call site.
//!
//! [`PlaceholderOptions::validate`] is a pure precondition checker: it runs
//! before any I/O and is the only place a malformed option can surface. Past
//! it, the rest of the pipeline treats options as trusted.

use crate::fetch::FetchPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Edge length applied when neither `size` nor `scale` is given.
const DEFAULT_EDGE: f64 = 24.0;

#[derive(Error, Debug, PartialEq)]
pub enum OptionsError {
    #[error("scale must be within (0, 1], got {0}")]
    ScaleOutOfRange(f64),
    #[error("size values must be positive, got {0}")]
    NonPositiveSize(f64),
    #[error("ratio values must be positive, got {0}")]
    NonPositiveRatio(f64),
    #[error("blur sigma must be positive, got {0}")]
    NonPositiveBlur(f32),
    #[error("quality must be between 0 and 100, got {0}")]
    QualityOutOfRange(u8),
    #[error("brightness must be non-negative, got {0}")]
    InvalidBrightness(f64),
    #[error("saturation must be non-negative, got {0}")]
    InvalidSaturation(f64),
    #[error("lightness must be finite, got {0}")]
    InvalidLightness(f64),
    #[error("fetch timeout must be positive")]
    ZeroTimeout,
    #[error("unknown format: {0}")]
    UnknownFormat(String),
    #[error("unknown fit mode: {0}")]
    UnknownFit(String),
    #[error("unknown resampling kernel: {0}")]
    UnknownKernel(String),
}

/// Where the source image comes from.
///
/// `http://` and `https://` URLs go through the resilient fetcher; any other
/// string is treated as a filesystem path. `From<&str>` dispatches on the
/// scheme so callers can pass either form without caring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// In-memory image data, handed to the codec as-is.
    Bytes(Vec<u8>),
    /// A URL string; fetched when remote, read from disk otherwise.
    Url(String),
    /// A local file path.
    Path(PathBuf),
}

impl Source {
    pub(crate) fn is_remote(url: &str) -> bool {
        url.starts_with("http://") || url.starts_with("https://")
    }
}

impl From<&str> for Source {
    fn from(value: &str) -> Self {
        if Self::is_remote(value) {
            Self::Url(value.to_string())
        } else {
            Self::Path(PathBuf::from(value))
        }
    }
}

impl From<String> for Source {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<Vec<u8>> for Source {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<PathBuf> for Source {
    fn from(value: PathBuf) -> Self {
        Self::Path(value)
    }
}

/// Requested output size: a single major-dimension target or an exact pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizeSpec {
    /// Target for the major dimension; the other is derived from the ratio.
    Edge(f64),
    /// Both dimensions, taken literally (ratio may still shrink one).
    Exact { width: f64, height: f64 },
}

/// Aspect-ratio constraint, as a width/height quotient or an explicit pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RatioSpec {
    Value(f64),
    Pair { width: f64, height: f64 },
}

impl RatioSpec {
    /// The ratio as a single width/height quotient.
    pub fn value(self) -> f64 {
        match self {
            Self::Value(ratio) => ratio,
            Self::Pair { width, height } => width / height,
        }
    }
}

/// Output encoding for the placeholder payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Avif,
    Webp,
    Jpeg,
    Png,
}

impl OutputFormat {
    /// Lowercase format name, as used in the data URL.
    pub fn name(self) -> &'static str {
        match self {
            Self::Avif => "avif",
            Self::Webp => "webp",
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }

    /// Media type for the data URL prefix.
    pub fn media_type(self) -> String {
        format!("image/{}", self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "avif" => Ok(Self::Avif),
            "webp" => Ok(Self::Webp),
            "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            other => Err(OptionsError::UnknownFormat(other.to_string())),
        }
    }
}

/// How the resize reconciles the target box with the source aspect ratio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Fit within the box, preserving aspect; never enlarges.
    #[default]
    Inside,
    /// Cover the box, preserving aspect, center-cropping the overflow.
    Cover,
    /// Fit within the box and letterbox to its exact dimensions.
    Contain,
    /// Stretch to the exact box, ignoring aspect.
    Fill,
    /// Cover the box, preserving aspect, without cropping.
    Outside,
}

impl FromStr for FitMode {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inside" => Ok(Self::Inside),
            "cover" => Ok(Self::Cover),
            "contain" => Ok(Self::Contain),
            "fill" => Ok(Self::Fill),
            "outside" => Ok(Self::Outside),
            other => Err(OptionsError::UnknownFit(other.to_string())),
        }
    }
}

/// Resampling filter used by the resize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResampleKernel {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl FromStr for ResampleKernel {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nearest" => Ok(Self::Nearest),
            "triangle" => Ok(Self::Triangle),
            "catmullrom" | "catmull-rom" => Ok(Self::CatmullRom),
            "gaussian" => Ok(Self::Gaussian),
            "lanczos3" => Ok(Self::Lanczos3),
            other => Err(OptionsError::UnknownKernel(other.to_string())),
        }
    }
}

/// Color modulation applied between resize and encode.
///
/// The defaults describe the historical no-op configuration: when every field
/// equals its default the modulation pass is skipped entirely, so the 1.2
/// saturation default is a sentinel, not an applied transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Modulation {
    /// Channel multiplier; 1.0 leaves brightness unchanged.
    pub brightness: f64,
    /// Saturation multiplier around the pixel's luma.
    pub saturation: f64,
    /// Hue rotation in degrees.
    pub hue: i32,
    /// Additive lightness, in percent of full scale.
    pub lightness: f64,
}

impl Default for Modulation {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            saturation: 1.2,
            hue: 0,
            lightness: 0.0,
        }
    }
}

impl Modulation {
    /// True when every field equals its default, meaning the pass is skipped.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Everything that controls one placeholder generation.
///
/// All fields are defaulted; `PlaceholderOptions::default()` matches the
/// behavior of calling the library with nothing but a source.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderOptions {
    /// Absolute output size. Takes priority over `scale`.
    pub size: Option<SizeSpec>,
    /// Fractional scale of the original, in `(0, 1]`.
    pub scale: Option<f64>,
    /// Aspect-ratio constraint layered over whichever sizing mode applies.
    pub ratio: Option<RatioSpec>,
    /// Gaussian blur sigma; `None` disables the blur pass.
    pub blur: Option<f32>,
    pub format: OutputFormat,
    /// Lossy encoding quality (0-100). Ignored by lossless formats.
    pub quality: u8,
    pub modulation: Modulation,
    pub fit: FitMode,
    pub kernel: ResampleKernel,
    /// Retry/backoff/timeout policy for remote sources.
    pub fetch: FetchPolicy,
}

impl Default for PlaceholderOptions {
    fn default() -> Self {
        Self {
            size: None,
            scale: None,
            ratio: None,
            blur: Some(4.0),
            format: OutputFormat::Avif,
            quality: 20,
            modulation: Modulation::default(),
            fit: FitMode::Inside,
            kernel: ResampleKernel::Lanczos3,
            fetch: FetchPolicy::default(),
        }
    }
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

impl PlaceholderOptions {
    /// The sizing input the resolver should see.
    ///
    /// When neither `size` nor `scale` is given, a 24px edge applies — the
    /// entry-boundary default for a useful placeholder. Callers invoking the
    /// resolver directly with no inputs instead get its own fractional-scale
    /// fallback.
    pub fn effective_size(&self) -> Option<SizeSpec> {
        if self.size.is_none() && self.scale.is_none() {
            Some(SizeSpec::Edge(DEFAULT_EDGE))
        } else {
            self.size
        }
    }

    /// Check every option against its documented domain.
    ///
    /// Runs before any I/O; a failure here is the caller's bug, never a
    /// transient condition.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if let Some(scale) = self.scale {
            if !(scale.is_finite() && scale > 0.0 && scale <= 1.0) {
                return Err(OptionsError::ScaleOutOfRange(scale));
            }
        }
        match self.size {
            Some(SizeSpec::Edge(edge)) if !positive(edge) => {
                return Err(OptionsError::NonPositiveSize(edge));
            }
            Some(SizeSpec::Exact { width, height }) if !positive(width) || !positive(height) => {
                return Err(OptionsError::NonPositiveSize(if positive(width) {
                    height
                } else {
                    width
                }));
            }
            _ => {}
        }
        match self.ratio {
            Some(RatioSpec::Value(ratio)) if !positive(ratio) => {
                return Err(OptionsError::NonPositiveRatio(ratio));
            }
            Some(RatioSpec::Pair { width, height }) if !positive(width) || !positive(height) => {
                return Err(OptionsError::NonPositiveRatio(if positive(width) {
                    height
                } else {
                    width
                }));
            }
            _ => {}
        }
        if let Some(sigma) = self.blur {
            if !(sigma.is_finite() && sigma > 0.0) {
                return Err(OptionsError::NonPositiveBlur(sigma));
            }
        }
        if self.quality > 100 {
            return Err(OptionsError::QualityOutOfRange(self.quality));
        }
        if !(self.modulation.brightness.is_finite() && self.modulation.brightness >= 0.0) {
            return Err(OptionsError::InvalidBrightness(self.modulation.brightness));
        }
        if !(self.modulation.saturation.is_finite() && self.modulation.saturation >= 0.0) {
            return Err(OptionsError::InvalidSaturation(self.modulation.saturation));
        }
        if !self.modulation.lightness.is_finite() {
            return Err(OptionsError::InvalidLightness(self.modulation.lightness));
        }
        if self.fetch.timeout.is_zero() {
            return Err(OptionsError::ZeroTimeout);
        }
        Ok(())
    }
}
