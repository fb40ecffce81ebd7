//! Command-line front end: load, denoise, save

use anyhow::{Context, Result};
use clap::Parser;
use hwt::consts::DEFAULT_THRESHOLD;
use hwt::{
    load_gray8, load_gray8_converting, save_gray8, CpuBackend, DenoiseOptions, NoiseCleaner,
    Program, ThresholdMode,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "hwt-denoise",
    version,
    about = "Remove noise from a power-of-two sized grayscale image"
)]
struct Cli {
    /// Image to denoise (8-bit grayscale unless --convert is given)
    input: PathBuf,

    /// Where to write the result; the format follows the extension
    output: Option<PathBuf>,

    /// Coefficient cutoff on the [0, 1] sample scale
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f32,

    /// Hard thresholding instead of soft shrinkage
    #[arg(long)]
    hard: bool,

    /// Largest work group the transform programs may use
    #[arg(long, value_name = "N")]
    group_limit: Option<usize>,

    /// Convert color or 16-bit inputs to 8-bit gray instead of rejecting them
    #[arg(long)]
    convert: bool,
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let image = if cli.convert {
        load_gray8_converting(&cli.input)
    } else {
        load_gray8(&cli.input)
    }
    .with_context(|| format!("failed to load {}", cli.input.display()))?;
    info!(path = %cli.input.display(), dimensions = %image.dimensions, "loaded image");

    let mut backend = CpuBackend::new();
    if let Some(limit) = cli.group_limit {
        backend = backend
            .with_group_limit(Program::ForwardStep, limit)
            .with_group_limit(Program::InverseStep, limit);
    }
    let cleaner = NoiseCleaner::new(&backend).context("failed to set up the compute backend")?;

    let options = DenoiseOptions::new()
        .threshold(cli.threshold)
        .mode(ThresholdMode::from_soft_flag(!cli.hard));
    let (pixels, profile) = cleaner
        .clean_noise_profiled(&image.pixels, image.width(), image.height(), options.params())
        .context("denoising failed")?;
    info!("kernel timings\n{}", profile);

    match cli.output {
        Some(path) => {
            let denoised = hwt::GrayImage::from_pixels(image.dimensions, pixels)?;
            save_gray8(&path, &denoised)
                .with_context(|| format!("failed to save {}", path.display()))?;
            info!(path = %path.display(), "saved denoised image");
        }
        None => info!("no output path given, result discarded"),
    }
    Ok(())
}
