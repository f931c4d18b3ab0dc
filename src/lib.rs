//! # Blurlet
//!
//! Tiny blurred placeholder images for progressive image loading. Point it
//! at a source image — inline bytes, a local file, or a remote URL — and it
//! returns the original dimensions plus a compact base64 `data:` URL suitable
//! for an `<img>` placeholder while the real asset loads.
//!
//! # Architecture: Two Small Components
//!
//! Everything interesting happens in two independent pieces, composed by a
//! thin assembly layer:
//!
//! ```text
//! 1. Geometry Resolver   (original dims, sizing inputs) → target dims
//! 2. Resilient Fetcher   (url, policy)                  → bytes | nothing
//! ```
//!
//! The resolver is a pure function — no I/O, no side effects — so every
//! sizing rule is unit-testable without touching pixels. The fetcher is a
//! bounded retry loop with exponential backoff and per-attempt timeouts, and
//! it absorbs transport failure into its return value instead of raising.
//! Pixel work (decode, resize, modulate, blur, encode) sits behind the
//! [`ImageCodec`] capability trait, and HTTP behind [`HttpTransport`], so
//! tests script both.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`geometry`] | Pure target-dimension resolution from size/scale/ratio inputs |
//! | [`fetch`] | Retry/backoff/timeout fetching of remote sources over a transport capability |
//! | [`codec`] | Codec capability trait + the pure-Rust `image`-crate backend |
//! | [`options`] | Option surface, sizing enums, precondition validation |
//! | [`placeholder`] | Assembly: source → bytes → metadata → geometry → transform → data URL |
//!
//! # Design Decisions
//!
//! ## Failures Are Data, Not Exceptions
//!
//! Only two things error out of [`generate`]: malformed options and an
//! unreadable source. A dead network or a transform that falls over degrade
//! to an absent `data_url` — a missing placeholder is cosmetic, and callers
//! should never need retry-or-crash logic around one.
//!
//! ## One Resolver, One Fetcher
//!
//! Every entry point funnels through the same geometry resolver and the same
//! fetch loop. Sizing inputs are normalized once, at the boundary, into
//! closed enums ([`SizeSpec`], [`RatioSpec`]) so resolution branches
//! exhaustively instead of duck-typing its way through option shapes.
//!
//! ## Pure-Rust Imaging (No System Dependencies)
//!
//! The codec backend uses the `image` crate: pure-Rust decoders for JPEG,
//! PNG, TIFF, and WebP, and pure-Rust encoders for AVIF (rav1e), JPEG, PNG,
//! and WebP. The binary is fully self-contained — no `apt install`, no
//! version conflicts.
//!
//! ## AVIF Output By Default
//!
//! Placeholder payloads are embedded in HTML, so every byte counts. AVIF has
//! had universal browser support since late 2023 and encodes these tiny,
//! heavily blurred frames dramatically smaller than JPEG. Other formats
//! remain available per call.
//!
//! ## Nothing Outlives a Call
//!
//! No cache, no background task, no connection pool. Each invocation builds
//! what it needs and drops it. Callers who want connection reuse pass their
//! own client via [`ReqwestTransport::with_client`].

pub mod codec;
pub mod fetch;
pub mod geometry;
pub mod options;
pub mod placeholder;

pub use codec::{CodecError, Dimensions, ImageCodec, RustBackend};
pub use fetch::{FetchPolicy, HttpTransport, ReqwestTransport};
pub use options::{
    FitMode, Modulation, OptionsError, OutputFormat, PlaceholderOptions, RatioSpec,
    ResampleKernel, SizeSpec, Source,
};
pub use placeholder::{Placeholder, PlaceholderError, generate, generate_with};
