//! Placeholder assembly — the high-level pipeline.
//!
//! One call: obtain source bytes (inline, file, or resilient remote fetch),
//! read original dimensions, resolve target geometry, run the codec
//! transform, and package the result as a base64 data URL.
//!
//! Error discipline follows a hard line: only malformed options and
//! unreadable sources cross this boundary as errors. Transport and transform
//! failures are absorbed into the returned [`Placeholder`] — a caller never
//! needs to distinguish "slow network" from "image too small to blur"; both
//! surface as an absent data URL with a best-effort set of dimensions.

use crate::codec::{CodecError, ImageCodec, RustBackend, TransformParams};
use crate::fetch::{self, HttpTransport, ReqwestTransport};
use crate::geometry;
use crate::options::{OptionsError, PlaceholderOptions, Source};
use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaceholderError {
    #[error("invalid options: {0}")]
    Options(#[from] OptionsError),
    #[error("failed to read source {}: {source}", path.display())]
    SourceRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read image metadata: {0}")]
    Metadata(CodecError),
}

/// Result of one placeholder generation.
///
/// `width` and `height` are the *original* image dimensions (zero when a
/// remote source could not be fetched). `data_url` is the inline placeholder;
/// its absence signals a fetch or transform failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    pub width: u32,
    pub height: u32,
    /// `data:image/<format>;base64,<payload>`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_url: Option<String>,
}

impl Placeholder {
    /// The zeroed result for a remote source that could not be fetched.
    fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            data_url: None,
        }
    }
}

/// Generate a placeholder with the production codec and transport.
///
/// # Examples
/// ```no_run
/// # async fn demo() -> Result<(), blurlet::PlaceholderError> {
/// use blurlet::{generate, PlaceholderOptions};
///
/// let placeholder = generate(
///     "https://example.com/hero.jpg",
///     &PlaceholderOptions::default(),
/// )
/// .await?;
///
/// if let Some(data_url) = &placeholder.data_url {
///     println!("{} ({}x{})", data_url, placeholder.width, placeholder.height);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn generate(
    source: impl Into<Source>,
    options: &PlaceholderOptions,
) -> Result<Placeholder, PlaceholderError> {
    generate_with(
        &RustBackend::new(),
        &ReqwestTransport::new(),
        source.into(),
        options,
    )
    .await
}

/// Generate a placeholder with injected codec and transport capabilities.
///
/// This is the seam embedders and tests use: the codec decides how pixels are
/// transformed, the transport decides how remote sources are fetched, and
/// this function owns only the control flow between them.
pub async fn generate_with(
    codec: &impl ImageCodec,
    transport: &impl HttpTransport,
    source: Source,
    options: &PlaceholderOptions,
) -> Result<Placeholder, PlaceholderError> {
    options.validate()?;

    let bytes = match source {
        Source::Bytes(bytes) => bytes,
        Source::Url(url) if Source::is_remote(&url) => {
            match fetch::fetch_bytes(transport, &url, &options.fetch).await {
                Some(bytes) => bytes,
                None => return Ok(Placeholder::empty()),
            }
        }
        // A URL without an http(s) scheme is a local reference
        Source::Url(local) => read_source(Path::new(&local))?,
        Source::Path(path) => read_source(&path)?,
    };

    let original = codec
        .read_metadata(&bytes)
        .map_err(PlaceholderError::Metadata)?;

    let target = geometry::resolve(
        original,
        options.effective_size(),
        options.scale,
        options.ratio,
    );
    let params = TransformParams::from_options(options, target);

    let data_url = match codec.transform(&bytes, &params) {
        Ok(encoded) => Some(format!(
            "data:{};base64,{}",
            options.format.media_type(),
            general_purpose::STANDARD.encode(&encoded)
        )),
        Err(error) => {
            log::error!("failed to transform image: {error}");
            None
        }
    };

    Ok(Placeholder {
        width: original.width,
        height: original.height,
        data_url,
    })
}

fn read_source(path: &Path) -> Result<Vec<u8>, PlaceholderError> {
    std::fs::read(path).map_err(|source| PlaceholderError::SourceRead {
        path: path.to_path_buf(),
        source,
    })
}
