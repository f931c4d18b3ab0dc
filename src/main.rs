use blurlet::{
    FetchPolicy, FitMode, Modulation, OutputFormat, PlaceholderOptions, RatioSpec,
    ResampleKernel, SizeSpec,
};
use clap::Parser;
use std::time::Duration;

/// Parse a ratio given either as a quotient ("1.78") or a pair ("16:9").
fn parse_ratio(value: &str) -> Result<RatioSpec, String> {
    if let Some((w, h)) = value.split_once(':') {
        let width: f64 = w.trim().parse().map_err(|_| format!("invalid ratio: {value}"))?;
        let height: f64 = h.trim().parse().map_err(|_| format!("invalid ratio: {value}"))?;
        return Ok(RatioSpec::Pair { width, height });
    }
    value
        .parse()
        .map(RatioSpec::Value)
        .map_err(|_| format!("invalid ratio: {value}"))
}

#[derive(Parser)]
#[command(name = "blurlet")]
#[command(about = "Generate tiny blurred placeholder data URLs from images")]
#[command(long_about = "\
Generate tiny blurred placeholder data URLs from images

The source can be a local file or an http(s) URL. Remote sources are fetched
with bounded retries, exponential backoff, and a per-attempt timeout; an
unreachable source produces an empty result, not an error.

Sizing (pick at most one mode; --ratio combines with any of them):

  --size 24            target for the major dimension (height if landscape,
                       width if portrait); the other follows the ratio
  --width 40 --height 24   exact output dimensions
  --scale 0.1          fraction of the original dimensions
  (nothing)            defaults to --size 24

Examples:

  blurlet photo.jpg
  blurlet https://example.com/hero.jpg --size 32 --format webp
  blurlet photo.jpg --ratio 16:9 --json
  RUST_LOG=warn blurlet https://slow.host/img.png --retries 4 --timeout 5000")]
#[command(version)]
struct Cli {
    /// Image file or http(s) URL
    source: String,

    /// Target for the major dimension, in pixels
    #[arg(long, conflicts_with_all = ["width", "height"], conflicts_with = "scale")]
    size: Option<f64>,

    /// Exact output width (requires --height)
    #[arg(long, requires = "height")]
    width: Option<f64>,

    /// Exact output height (requires --width)
    #[arg(long, requires = "width")]
    height: Option<f64>,

    /// Fractional scale of the original, in (0, 1]
    #[arg(long, conflicts_with_all = ["width", "height"])]
    scale: Option<f64>,

    /// Aspect ratio constraint: a quotient ("1.78") or a pair ("16:9")
    #[arg(long, value_parser = parse_ratio)]
    ratio: Option<RatioSpec>,

    /// Output format: avif, webp, jpeg, png
    #[arg(long, default_value = "avif")]
    format: OutputFormat,

    /// Lossy encoding quality (0-100)
    #[arg(long, default_value_t = 20)]
    quality: u8,

    /// Gaussian blur sigma
    #[arg(long, default_value_t = 4.0)]
    blur: f32,

    /// Skip the blur pass
    #[arg(long)]
    no_blur: bool,

    /// Fit mode: inside, cover, contain, fill, outside
    #[arg(long, default_value = "inside")]
    fit: FitMode,

    /// Resampling kernel: nearest, triangle, catmullrom, gaussian, lanczos3
    #[arg(long, default_value = "lanczos3")]
    kernel: ResampleKernel,

    /// Brightness multiplier
    #[arg(long, default_value_t = 1.0)]
    brightness: f64,

    /// Saturation multiplier
    #[arg(long, default_value_t = 1.2)]
    saturation: f64,

    /// Hue rotation in degrees
    #[arg(long, default_value_t = 0)]
    hue: i32,

    /// Additive lightness, in percent of full scale
    #[arg(long, default_value_t = 0.0)]
    lightness: f64,

    /// Retry attempts after the first failed fetch
    #[arg(long, default_value_t = 2)]
    retries: u32,

    /// Base backoff delay between fetch attempts, in milliseconds
    #[arg(long, default_value_t = 300)]
    retry_delay: u64,

    /// Per-attempt fetch timeout, in milliseconds
    #[arg(long, default_value_t = 30_000)]
    timeout: u64,

    /// Cache hint: prefer cached responses up to this many seconds old
    #[arg(long)]
    revalidate: Option<u32>,

    /// Print the full result as JSON instead of the bare data URL
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn to_options(&self) -> PlaceholderOptions {
        let size = match (self.size, self.width, self.height) {
            (Some(edge), _, _) => Some(SizeSpec::Edge(edge)),
            (None, Some(width), Some(height)) => Some(SizeSpec::Exact { width, height }),
            _ => None,
        };

        PlaceholderOptions {
            size,
            scale: self.scale,
            ratio: self.ratio,
            blur: if self.no_blur { None } else { Some(self.blur) },
            format: self.format,
            quality: self.quality,
            modulation: Modulation {
                brightness: self.brightness,
                saturation: self.saturation,
                hue: self.hue,
                lightness: self.lightness,
            },
            fit: self.fit,
            kernel: self.kernel,
            fetch: FetchPolicy {
                retries: self.retries,
                retry_delay: Duration::from_millis(self.retry_delay),
                timeout: Duration::from_millis(self.timeout),
                revalidate: self.revalidate,
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let options = cli.to_options();
    let placeholder = blurlet::generate(cli.source.as_str(), &options).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&placeholder)?);
        return Ok(());
    }

    match &placeholder.data_url {
        Some(data_url) => {
            println!("{data_url}");
            Ok(())
        }
        None => {
            eprintln!(
                "no placeholder produced ({}x{})",
                placeholder.width, placeholder.height
            );
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_parses_quotient_and_pair() {
        assert_eq!(parse_ratio("1.5").unwrap(), RatioSpec::Value(1.5));
        assert_eq!(
            parse_ratio("16:9").unwrap(),
            RatioSpec::Pair {
                width: 16.0,
                height: 9.0
            }
        );
        assert!(parse_ratio("wide").is_err());
        assert!(parse_ratio("16:tall").is_err());
    }

    #[test]
    fn exact_size_maps_from_width_and_height() {
        let cli = Cli::parse_from(["blurlet", "img.png", "--width", "40", "--height", "24"]);
        assert_eq!(
            cli.to_options().size,
            Some(SizeSpec::Exact {
                width: 40.0,
                height: 24.0
            })
        );
    }

    #[test]
    fn no_blur_disables_the_blur_pass() {
        let cli = Cli::parse_from(["blurlet", "img.png", "--no-blur"]);
        assert_eq!(cli.to_options().blur, None);
    }

    #[test]
    fn defaults_mirror_library_defaults() {
        let cli = Cli::parse_from(["blurlet", "img.png"]);
        assert_eq!(cli.to_options(), PlaceholderOptions::default());
    }

    #[test]
    fn size_conflicts_with_scale() {
        let result = Cli::try_parse_from(["blurlet", "img.png", "--size", "24", "--scale", "0.5"]);
        assert!(result.is_err());
    }
}
