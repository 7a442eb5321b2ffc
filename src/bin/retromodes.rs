#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice
)]

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use retromodes::{
    all_modes, dither::OrderedDither, load_source, save_output_set, select, ModeDescriptor,
    ModeOutputSet, ModePipeline, DEFAULT_LEVEL,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "retromodes")]
#[command(about = "Render a background image into a set of retro display modes")]
struct Options {
    /// The source image to render.
    #[arg(required_unless_present = "list_modes")]
    source: Option<PathBuf>,

    /// The root directory for the rendered images.
    #[arg(required_unless_present = "list_modes")]
    output: Option<PathBuf>,

    /// The level name, used as the subdirectory of the output root.
    #[arg(default_value = DEFAULT_LEVEL)]
    level: String,

    /// Only render the given modes (may be repeated). Renders every mode if not given.
    #[arg(short, long = "mode")]
    modes: Vec<String>,

    /// Print the available modes and exit.
    #[arg(long)]
    list_modes: bool,

    /// The base threshold for the ordered dither modes.
    #[arg(long, default_value_t = OrderedDither::DEFAULT_BASE_THRESHOLD)]
    base_threshold: f32,

    /// Number of threads: 0 uses all cores, 1 runs single threaded.
    #[arg(short, long, default_value_t = 0)]
    threads: u8,

    /// Log each rendering step.
    #[arg(long)]
    verbose: bool,
}

fn list_modes() {
    for mode in all_modes() {
        println!(
            "{:<12} {:>3}x{:<3} colors: {:<4} dither: {}",
            mode.id, mode.width, mode.height, mode.colors, mode.dither
        );
    }
}

fn render(
    pipeline: &ModePipeline,
    source: &image::RgbImage,
    modes: &[ModeDescriptor],
    threads: u8,
) -> anyhow::Result<ModeOutputSet> {
    let outputs = match threads {
        0 => pipeline.render_all_par(source, modes)?,
        1 => pipeline.render_all(source, modes)?,
        t => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(t.into())
                .build()
                .context("failed to build thread pool")?;

            pool.install(|| pipeline.render_all_par(source, modes))?
        }
    };

    Ok(outputs)
}

fn main() -> anyhow::Result<()> {
    let Options {
        source,
        output,
        level,
        modes,
        list_modes: list,
        base_threshold,
        threads,
        verbose,
    } = Options::parse();

    let default_filter = if verbose { "retromodes=debug" } else { "retromodes=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    if list {
        list_modes();
        return Ok(());
    }

    let (Some(source), Some(output)) = (source, output) else {
        anyhow::bail!("a source image and an output directory are required");
    };

    let modes = if modes.is_empty() {
        all_modes().to_vec()
    } else {
        select(&modes)?
    };

    let image = load_source(&source).with_context(|| format!("loading {}", source.display()))?;

    let mut pipeline = ModePipeline::new();
    pipeline.base_threshold(base_threshold);

    let start = std::time::Instant::now();
    let outputs = render(&pipeline, &image, &modes, threads)?;
    tracing::debug!(elapsed_ms = start.elapsed().as_secs_f64() * 1000.0, "rendered all modes");

    let paths = save_output_set(&outputs, &output, &level)
        .with_context(|| format!("saving to {}", output.display()))?;

    tracing::info!(count = paths.len(), level = %level, "done");

    Ok(())
}
