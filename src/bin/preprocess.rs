//! Scan Preprocessing CLI
//!
//! Crops each input scan to its dominant region, normalizes it to a
//! `(1, 32, 32)` tensor and optionally writes the crop and the tensor to disk.
//!
//! # Usage
//!
//! ```bash
//! scan-cae-preprocess [OPTIONS] <IMAGES>...
//! ```
//!
//! # Arguments
//!
//! * `-c, --config` - JSON pipeline configuration
//! * `-o, --output-dir` - Directory for `<stem>_crop.png` and `<stem>_tensor.json`
//! * `--threshold` - Foreground threshold (overrides the configuration)
//! * `--padding` - Crop padding (overrides the configuration)
//! * `--epsilon` - Normalize uniform crops with this standard-deviation floor instead of rejecting them
//! * `--threads` - Worker threads for the batch
//! * `--check-contract` - Trace every tensor through the autoencoder's shape contract
//! * `--debug-overlay` - Write `<stem>_overlay.png` (requires the `visualization` feature)
//! * `<IMAGES>...` - Paths to input scans
//!
//! # Example
//!
//! ```bash
//! RUST_LOG=info scan-cae-preprocess -o out/ --padding 4 scans/*.png
//! ```

use clap::Parser;
use scan_cae::pipeline::{PipelineConfig, PipelineStats, PreprocessedScan, ScanPipeline};
use scan_cae::processors::{DegeneratePolicy, ModelShapeContract};
use scan_cae::utils::init_tracing;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Command-line arguments for the preprocessing tool
#[derive(Parser)]
#[command(name = "scan-cae-preprocess")]
#[command(about = "Crops and z-score normalizes medical scans for the autoencoder")]
struct Args {
    /// Paths to input scans
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// JSON pipeline configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to save crops and tensors
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Intensities strictly above this value are foreground
    #[arg(long)]
    threshold: Option<u8>,

    /// Margin added around the extreme points before cropping
    #[arg(long)]
    padding: Option<u32>,

    /// Standard-deviation floor for uniform crops (rejects them when absent)
    #[arg(long)]
    epsilon: Option<f64>,

    /// Number of worker threads
    #[arg(long)]
    threads: Option<usize>,

    /// Trace every tensor through the autoencoder's shape contract
    #[arg(long)]
    check_contract: bool,

    /// Save an overlay of the selected contour and extreme points
    #[arg(long)]
    debug_overlay: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    init_tracing();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration: {:?}", path);
            PipelineConfig::from_json_file(path)?
        }
        None => PipelineConfig::default(),
    };
    if let Some(threshold) = args.threshold {
        config.extractor.threshold = threshold;
    }
    if let Some(padding) = args.padding {
        config.extractor.padding = padding;
    }
    if let Some(epsilon) = args.epsilon {
        config.normalizer.degenerate_policy = DegeneratePolicy::Epsilon { epsilon };
    }
    if args.threads.is_some() {
        config.parallel.max_threads = args.threads;
    }

    let pipeline = ScanPipeline::new(config)?;

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    info!("Processing {} scans", args.images.len());
    let outcomes = pipeline.process_batch(&args.images);

    let contract = ModelShapeContract::reference();
    for outcome in &outcomes {
        let Ok(scan) = &outcome.result else {
            continue;
        };

        if args.check_contract {
            match contract.check_tensor(scan.tensor.as_array()) {
                Ok(shape) => info!("{:?}: contract output shape {:?}", outcome.path, shape),
                Err(e) => warn!("{:?}: {}", outcome.path, e),
            }
        }

        if let Some(ref output_dir) = args.output_dir {
            if let Err(e) = save_outputs(output_dir, &outcome.path, scan) {
                error!("Failed to save outputs for {:?}: {}", outcome.path, e);
            }
        }

        if args.debug_overlay {
            save_overlay(&pipeline, args.output_dir.as_deref(), &outcome.path);
        }
    }

    println!("{}", PipelineStats::from_outcomes(&outcomes));
    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scan".to_string())
}

fn save_outputs(
    output_dir: &Path,
    input: &Path,
    scan: &PreprocessedScan,
) -> Result<(), Box<dyn std::error::Error>> {
    let stem = file_stem(input);

    let crop_path = output_dir.join(format!("{stem}_crop.png"));
    scan.crop.image.save(&crop_path)?;

    let (c, h, w) = scan.tensor.shape();
    let data: Vec<f32> = scan.tensor.as_array().iter().copied().collect();
    let tensor_json = json!({
        "shape": [c, h, w],
        "data": data,
    });
    let tensor_path = output_dir.join(format!("{stem}_tensor.json"));
    fs::write(&tensor_path, serde_json::to_string(&tensor_json)?)?;

    info!("Saved {:?} and {:?}", crop_path, tensor_path);
    Ok(())
}

#[cfg(feature = "visualization")]
fn save_overlay(pipeline: &ScanPipeline, output_dir: Option<&Path>, input: &Path) {
    let Some(output_dir) = output_dir else {
        warn!("--debug-overlay needs --output-dir");
        return;
    };

    let result = scan_cae::utils::load_image(input).and_then(|image| {
        pipeline
            .extractor()
            .debug_overlay(&image::DynamicImage::ImageRgb8(image))
    });
    match result {
        Ok(overlay) => {
            let path = output_dir.join(format!("{}_overlay.png", file_stem(input)));
            if let Err(e) = overlay.save(&path) {
                error!("Failed to save overlay {:?}: {}", path, e);
            }
        }
        Err(e) => error!("Failed to render overlay for {:?}: {}", input, e),
    }
}

#[cfg(not(feature = "visualization"))]
fn save_overlay(_pipeline: &ScanPipeline, _output_dir: Option<&Path>, _input: &Path) {
    warn!("--debug-overlay requires the `visualization` feature");
}
