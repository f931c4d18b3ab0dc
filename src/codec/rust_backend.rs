//! Pure Rust codec backend on the `image` crate — zero system dependencies.
//!
//! Decodes JPEG, PNG, TIFF, and WebP input from memory; encodes AVIF (rav1e,
//! speed 6), JPEG, PNG, and lossless WebP. Everything is statically linked
//! into the binary.
//!
//! Color modulation is a linear RGB approximation: brightness multiplies
//! channels, saturation interpolates around the BT.601 luma, lightness adds
//! a fraction of full scale, and hue rotation is delegated to the `image`
//! crate. For the tiny, heavily blurred outputs this backend produces, the
//! difference from a perceptual-space implementation is not visible.

use super::backend::{CodecError, Dimensions, ImageCodec};
use super::params::TransformParams;
use crate::options::{FitMode, Modulation, OutputFormat, ResampleKernel};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageReader, RgbaImage};
use std::io::Cursor;

/// AVIF encoder speed (0 = slowest/best, 10 = fastest).
const AVIF_SPEED: u8 = 6;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn filter_type(kernel: ResampleKernel) -> FilterType {
    match kernel {
        ResampleKernel::Nearest => FilterType::Nearest,
        ResampleKernel::Triangle => FilterType::Triangle,
        ResampleKernel::CatmullRom => FilterType::CatmullRom,
        ResampleKernel::Gaussian => FilterType::Gaussian,
        ResampleKernel::Lanczos3 => FilterType::Lanczos3,
    }
}

/// Decode an image from in-memory bytes, guessing the format from content.
fn decode(bytes: &[u8]) -> Result<DynamicImage, CodecError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(CodecError::Io)?
        .decode()
        .map_err(|e| CodecError::ProcessingFailed(format!("Failed to decode image: {e}")))
}

/// Resize according to the fit mode.
///
/// Placeholders only ever shrink: with the default `Inside` fit, a target box
/// that already contains the source leaves it untouched.
fn resize(img: DynamicImage, width: u32, height: u32, fit: FitMode, filter: FilterType) -> DynamicImage {
    match fit {
        FitMode::Inside => {
            if width >= img.width() && height >= img.height() {
                img
            } else {
                img.resize(width, height, filter)
            }
        }
        FitMode::Cover => img.resize_to_fill(width, height, filter),
        FitMode::Contain => letterbox(img.resize(width, height, filter), width, height),
        FitMode::Fill => img.resize_exact(width, height, filter),
        FitMode::Outside => {
            let (cover_w, cover_h) = cover_dimensions((img.width(), img.height()), (width, height));
            img.resize_exact(cover_w, cover_h, filter)
        }
    }
}

/// Pad a fitted image onto a transparent canvas of the exact target box.
fn letterbox(fitted: DynamicImage, width: u32, height: u32) -> DynamicImage {
    if fitted.width() == width && fitted.height() == height {
        return fitted;
    }
    let mut canvas = RgbaImage::from_pixel(width, height, image::Rgba([0, 0, 0, 0]));
    let x = (width - fitted.width()) / 2;
    let y = (height - fitted.height()) / 2;
    imageops::overlay(&mut canvas, &fitted.to_rgba8(), x as i64, y as i64);
    DynamicImage::ImageRgba8(canvas)
}

/// Dimensions that completely cover the target box while maintaining the
/// source aspect ratio. One dimension matches the target exactly, the other
/// may exceed it.
fn cover_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: height will match, width will exceed
        let h = tgt_h;
        let w = (h as f64 * src_aspect).round() as u32;
        (w, h)
    } else {
        // Source is taller: width will match, height will exceed
        let w = tgt_w;
        let h = (w as f64 / src_aspect).round() as u32;
        (w, h)
    }
}

/// Apply brightness, saturation, and lightness in one linear RGB pass, then
/// rotate hue.
fn modulate(img: DynamicImage, modulation: &Modulation) -> DynamicImage {
    let mut rgba = img.to_rgba8();
    let brightness = modulation.brightness as f32;
    let saturation = modulation.saturation as f32;
    let lightness = (modulation.lightness * 255.0 / 100.0) as f32;

    for pixel in rgba.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let (r, g, b) = (r as f32, g as f32, b as f32);
        // BT.601 luma
        let luma = 0.299 * r + 0.587 * g + 0.114 * b;
        let finish = |channel: f32| {
            let saturated = luma + (channel - luma) * saturation;
            (saturated * brightness + lightness).clamp(0.0, 255.0) as u8
        };
        pixel.0 = [finish(r), finish(g), finish(b), a];
    }

    let modulated = DynamicImage::ImageRgba8(rgba);
    if modulation.hue != 0 {
        modulated.huerotate(modulation.hue)
    } else {
        modulated
    }
}

/// Encode to the requested format, normalizing the color type to what the
/// encoder accepts (JPEG has no alpha; the rest take RGBA).
fn encode(img: &DynamicImage, format: OutputFormat, quality: u8) -> Result<Vec<u8>, CodecError> {
    let mut buffer = Vec::new();
    match format {
        OutputFormat::Avif => {
            let encoder = image::codecs::avif::AvifEncoder::new_with_speed_quality(
                &mut buffer,
                AVIF_SPEED,
                quality,
            );
            DynamicImage::ImageRgba8(img.to_rgba8())
                .write_with_encoder(encoder)
                .map_err(|e| CodecError::ProcessingFailed(format!("AVIF encode failed: {e}")))?;
        }
        OutputFormat::Jpeg => {
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
            DynamicImage::ImageRgb8(img.to_rgb8())
                .write_with_encoder(encoder)
                .map_err(|e| CodecError::ProcessingFailed(format!("JPEG encode failed: {e}")))?;
        }
        OutputFormat::Png => {
            let encoder = image::codecs::png::PngEncoder::new(&mut buffer);
            DynamicImage::ImageRgba8(img.to_rgba8())
                .write_with_encoder(encoder)
                .map_err(|e| CodecError::ProcessingFailed(format!("PNG encode failed: {e}")))?;
        }
        OutputFormat::Webp => {
            let encoder = image::codecs::webp::WebPEncoder::new_lossless(&mut buffer);
            DynamicImage::ImageRgba8(img.to_rgba8())
                .write_with_encoder(encoder)
                .map_err(|e| CodecError::ProcessingFailed(format!("WebP encode failed: {e}")))?;
        }
    }
    Ok(buffer)
}

impl ImageCodec for RustBackend {
    fn read_metadata(&self, bytes: &[u8]) -> Result<Dimensions, CodecError> {
        let (width, height) = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(CodecError::Io)?
            .into_dimensions()
            .map_err(|e| CodecError::ProcessingFailed(format!("Failed to read dimensions: {e}")))?;
        Ok(Dimensions { width, height })
    }

    fn transform(&self, bytes: &[u8], params: &TransformParams) -> Result<Vec<u8>, CodecError> {
        let img = decode(bytes)?;
        let resized = resize(
            img,
            params.width,
            params.height,
            params.fit,
            filter_type(params.kernel),
        );
        let modulated = if params.modulation.is_default() {
            resized
        } else {
            modulate(resized, &params.modulation)
        };
        let finished = match params.blur {
            Some(sigma) => modulated.blur(sigma),
            None => modulated,
        };
        encode(&finished, params.format, params.quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    /// Encode a small gradient image as PNG bytes.
    fn test_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let mut buffer = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
            .unwrap();
        buffer
    }

    fn params(width: u32, height: u32) -> TransformParams {
        TransformParams {
            width,
            height,
            fit: FitMode::Inside,
            kernel: ResampleKernel::Lanczos3,
            modulation: Modulation::default(),
            format: OutputFormat::Png,
            quality: 20,
            blur: None,
        }
    }

    fn output_dimensions(bytes: &[u8]) -> (u32, u32) {
        let img = image::load_from_memory(bytes).unwrap();
        (img.width(), img.height())
    }

    #[test]
    fn read_metadata_reports_dimensions() {
        let backend = RustBackend::new();
        let dims = backend.read_metadata(&test_png(200, 150)).unwrap();
        assert_eq!(dims.width, 200);
        assert_eq!(dims.height, 150);
    }

    #[test]
    fn read_metadata_rejects_non_image_bytes() {
        let backend = RustBackend::new();
        let result = backend.read_metadata(b"<html>not an image</html>");
        assert!(matches!(result, Err(CodecError::ProcessingFailed(_))));
    }

    #[test]
    fn transform_rejects_truncated_image() {
        let backend = RustBackend::new();
        let mut bytes = test_png(100, 100);
        bytes.truncate(24); // valid signature, unreadable body
        let result = backend.transform(&bytes, &params(10, 10));
        assert!(matches!(result, Err(CodecError::ProcessingFailed(_))));
    }

    #[test]
    fn inside_fit_preserves_aspect_ratio() {
        let backend = RustBackend::new();
        let out = backend.transform(&test_png(400, 300), &params(40, 40)).unwrap();
        assert_eq!(output_dimensions(&out), (40, 30));
    }

    #[test]
    fn inside_fit_never_enlarges() {
        let backend = RustBackend::new();
        let out = backend.transform(&test_png(20, 10), &params(100, 100)).unwrap();
        assert_eq!(output_dimensions(&out), (20, 10));
    }

    #[test]
    fn cover_fit_crops_to_exact_box() {
        let backend = RustBackend::new();
        let mut p = params(40, 40);
        p.fit = FitMode::Cover;
        let out = backend.transform(&test_png(400, 300), &p).unwrap();
        assert_eq!(output_dimensions(&out), (40, 40));
    }

    #[test]
    fn contain_fit_letterboxes_to_exact_box() {
        let backend = RustBackend::new();
        let mut p = params(40, 40);
        p.fit = FitMode::Contain;
        let out = backend.transform(&test_png(400, 300), &p).unwrap();
        assert_eq!(output_dimensions(&out), (40, 40));
    }

    #[test]
    fn fill_fit_ignores_aspect() {
        let backend = RustBackend::new();
        let mut p = params(40, 40);
        p.fit = FitMode::Fill;
        let out = backend.transform(&test_png(400, 300), &p).unwrap();
        assert_eq!(output_dimensions(&out), (40, 40));
    }

    #[test]
    fn outside_fit_covers_without_cropping() {
        // 4:3 source into a square box: height matches, width exceeds
        let backend = RustBackend::new();
        let mut p = params(40, 40);
        p.fit = FitMode::Outside;
        let out = backend.transform(&test_png(400, 300), &p).unwrap();
        assert_eq!(output_dimensions(&out), (53, 40));
    }

    #[test]
    fn cover_dimensions_matches_one_axis() {
        // 800x600 (4:3) into 400x500: height matches, width = 500 * 4/3 = 667
        assert_eq!(cover_dimensions((800, 600), (400, 500)), (667, 500));
        // 600x800 (3:4) into 500x400: width matches, height = 500 * 4/3 = 667
        assert_eq!(cover_dimensions((600, 800), (500, 400)), (500, 667));
        // Same aspect: exact match
        assert_eq!(cover_dimensions((800, 600), (400, 300)), (400, 300));
    }

    #[test]
    fn saturation_zero_produces_grayscale() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, image::Rgb([200, 50, 50])));
        let out = modulate(
            img,
            &Modulation {
                brightness: 1.0,
                saturation: 0.0,
                hue: 0,
                lightness: 0.0,
            },
        )
        .to_rgba8();
        let [r, g, b, _] = out.get_pixel(0, 0).0;
        assert_eq!(r, g);
        assert_eq!(g, b);
    }

    #[test]
    fn brightness_zero_produces_black() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, image::Rgb([200, 150, 90])));
        let out = modulate(
            img,
            &Modulation {
                brightness: 0.0,
                saturation: 1.0,
                hue: 0,
                lightness: 0.0,
            },
        )
        .to_rgba8();
        assert_eq!(out.get_pixel(0, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn lightness_adds_and_clamps() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, image::Rgb([250, 250, 250])));
        let out = modulate(
            img,
            &Modulation {
                brightness: 1.0,
                saturation: 1.0,
                hue: 0,
                lightness: 50.0,
            },
        )
        .to_rgba8();
        assert_eq!(out.get_pixel(0, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn blur_changes_pixels() {
        let backend = RustBackend::new();
        let source = test_png(64, 64);
        let crisp = backend.transform(&source, &params(32, 32)).unwrap();
        let mut blurred_params = params(32, 32);
        blurred_params.blur = Some(4.0);
        let blurred = backend.transform(&source, &blurred_params).unwrap();
        assert_ne!(crisp, blurred);
    }

    #[test]
    fn encodes_every_output_format() {
        let backend = RustBackend::new();
        let source = test_png(64, 48);
        for format in [
            OutputFormat::Avif,
            OutputFormat::Webp,
            OutputFormat::Jpeg,
            OutputFormat::Png,
        ] {
            let mut p = params(32, 24);
            p.format = format;
            let out = backend.transform(&source, &p).unwrap();
            assert!(!out.is_empty(), "{} output empty", format.name());
        }
    }

    #[test]
    fn jpeg_quality_affects_output_size() {
        let backend = RustBackend::new();
        let source = test_png(64, 64);
        let mut low = params(64, 64);
        low.format = OutputFormat::Jpeg;
        low.quality = 5;
        let mut high = low.clone();
        high.quality = 95;
        let low_out = backend.transform(&source, &low).unwrap();
        let high_out = backend.transform(&source, &high).unwrap();
        assert!(low_out.len() < high_out.len());
    }

    #[test]
    fn jpeg_output_is_decodable() {
        let backend = RustBackend::new();
        let mut p = params(20, 20);
        p.format = OutputFormat::Jpeg;
        let out = backend.transform(&test_png(100, 100), &p).unwrap();
        assert_eq!(output_dimensions(&out), (20, 20));
    }
}
