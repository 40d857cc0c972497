//! Verdant CLI - NDVI classification of multispectral GeoTIFFs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use verdant_algorithms::pipeline::{compute_ndvi, NdviParams, NdviSummary};
use verdant_core::io::{read_dataset, Compression, GeoTiffOptions};
use verdant_core::raster::{PixelType, RasterDataset, SensorBand};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "verdant")]
#[command(author, version, about = "NDVI classification of 8-band GeoTIFFs", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify an 8-band image by NDVI into a 0/255 mask
    Ndvi {
        /// Input 8-band GeoTIFF (band 6 = red, band 8 = NIR)
        #[arg(short, long)]
        input_path: PathBuf,
        /// Output GeoTIFF
        #[arg(short, long, default_value = "ndvi.tif")]
        output_path: PathBuf,
        /// Cells with NDVI >= threshold become 255, the rest 0
        #[arg(short, long, default_value = "0.1", allow_negative_numbers = true, value_parser = parse_threshold)]
        threshold: f64,
        /// Band used as near-infrared (coastal-blue, blue, green-1, green, yellow, red, red-edge, nir)
        #[arg(long, default_value = "nir", value_parser = parse_band)]
        nir_band: SensorBand,
        /// Band used as red
        #[arg(long, default_value = "red", value_parser = parse_band)]
        red_band: SensorBand,
        /// Output sample type: uint8, uint16, uint32, uint64, int8, int16, int32, int64, float32, float64
        #[arg(long, default_value = "uint16")]
        pixel_type: String,
        /// Output compression: none, lzw, deflate
        #[arg(long, default_value = "none")]
        compression: String,
        /// Overwrite an existing output without asking
        #[arg(short, long)]
        yes: bool,
    },
    /// Show information about a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Logging already initialized");
    }
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn parse_threshold(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("`{}` is not a number", s))?;
    if !value.is_finite() {
        return Err(format!("threshold must be finite, got {}", s));
    }
    Ok(value)
}

fn parse_band(s: &str) -> std::result::Result<SensorBand, String> {
    s.parse().map_err(|e: verdant_core::Error| e.to_string())
}

/// Decide whether the run may write to `path`.
///
/// Returns `false` when the file exists and the user declined to replace
/// it. `confirm` is only consulted when the file exists and `yes` is unset.
fn prepare_output<F>(path: &Path, yes: bool, confirm: &mut F) -> io::Result<bool>
where
    F: FnMut(&Path) -> io::Result<bool>,
{
    if !path.exists() || yes {
        return Ok(true);
    }
    confirm(path)
}

/// Ask on stdin; only `y` or `Y` counts as yes.
fn ask_overwrite(path: &Path) -> io::Result<bool> {
    print!(
        "Output file {} already exists, overwrite? y/[n] ",
        path.display()
    );
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim(), "y" | "Y")
}

fn done(summary: &NdviSummary, path: &Path, elapsed: std::time::Duration) {
    let total = (summary.rows * summary.cols).max(1) as f64;
    println!("NDVI mask saved to: {}", path.display());
    println!(
        "  High (>= {}): {} ({:.1}%)",
        summary.threshold,
        summary.high_count,
        100.0 * summary.high_count as f64 / total
    );
    println!(
        "  Low: {} ({:.1}%)",
        summary.low_count,
        100.0 * summary.low_count as f64 / total
    );
    println!("  Processing time: {:.2?}", elapsed);
}

fn print_info(path: &Path, ds: &RasterDataset) {
    let gt = ds.geo_transform();
    let (min_x, min_y, max_x, max_y) = gt.bounds(ds.width(), ds.height());

    println!("File: {}", path.display());
    println!(
        "Dimensions: {} x {} ({} cells)",
        ds.width(),
        ds.height(),
        ds.width() * ds.height()
    );
    println!(
        "Bands: {} ({}, {} bits/sample)",
        ds.band_count(),
        ds.pixel_type(),
        ds.pixel_type().bits()
    );
    println!("GeoTransform: {:?}", gt.to_gdal());
    println!(
        "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
        min_x, min_y, max_x, max_y
    );
    println!("Projection: {}", ds.projection());

    for index in 1..=ds.band_count() {
        let Ok(band) = ds.band(index) else { continue };
        let stats = band.statistics();
        println!(
            "  Band {}: min {:.4}, max {:.4}, mean {:.4}",
            index,
            stats.min.unwrap_or(f64::NAN),
            stats.max.unwrap_or(f64::NAN),
            stats.mean.unwrap_or(f64::NAN)
        );
    }
}

// ─── Commands ───────────────────────────────────────────────────────────

fn run_ndvi(
    input: &Path,
    output: &Path,
    params: &NdviParams,
    yes: bool,
) -> Result<bool> {
    if !input.is_file() {
        eprintln!("Input file {} does not exist!", input.display());
        return Ok(false);
    }

    let allowed = prepare_output(output, yes, &mut ask_overwrite)
        .context("Failed to read overwrite confirmation")?;
    if !allowed {
        info!("Keeping existing {}", output.display());
        return Ok(false);
    }

    debug!(
        "Threshold {}, output {} / {}",
        params.threshold, params.output.pixel_type, params.output.compression
    );

    let pb = spinner("Computing NDVI...");
    let start = Instant::now();
    let summary = compute_ndvi(input, output, params);
    pb.finish_and_clear();
    let summary = summary.with_context(|| format!("Failed to classify {}", input.display()))?;

    done(&summary, output, start.elapsed());
    Ok(true)
}

fn run_info(input: &Path) -> Result<()> {
    let pb = spinner("Reading raster...");
    let ds = read_dataset(input);
    pb.finish_and_clear();
    let ds = ds.with_context(|| format!("Failed to read {}", input.display()))?;

    print_info(input, &ds);
    Ok(())
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Ndvi {
            input_path,
            output_path,
            threshold,
            nir_band,
            red_band,
            pixel_type,
            compression,
            yes,
        } => {
            let pixel_type: PixelType = pixel_type.parse().context("Invalid --pixel-type")?;
            let compression: Compression =
                compression.parse().context("Invalid --compression")?;
            let params = NdviParams {
                threshold,
                nir_band,
                red_band,
                output: GeoTiffOptions {
                    pixel_type,
                    compression,
                },
            };
            if !run_ndvi(&input_path, &output_path, &params, yes)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Info { input } => run_info(&input)?,
    }

    Ok(ExitCode::SUCCESS)
}
