// Command-line front-end: plays the part of the page. Paths given on the
// command line are "dropped", compressed, then saved one by one or as a zip.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use image_compressor_lib::commands::{self, FOOTER};
use image_compressor_lib::core::ProgressType;
use image_compressor_lib::{
    AppConfig, AppState, CompressOutcome, DirectorySink, StateEvent, StateObserver,
};

#[derive(Parser, Debug)]
#[command(name = "image-compressor", version, about = "Compress images and save them individually or as a zip", after_help = FOOTER)]
struct Cli {
    /// Image files to compress
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory the results are saved into
    #[arg(short, long, default_value = ".")]
    out: PathBuf,

    /// Save everything as a single zip archive
    #[arg(long)]
    zip: bool,

    /// Initial quality, 1-100
    #[arg(short, long)]
    quality: Option<u32>,

    /// Target size per output file, in MB
    #[arg(long)]
    max_size_mb: Option<f64>,

    /// Largest input accepted, in MB
    #[arg(long)]
    max_file_mb: Option<f64>,

    /// Encode on the async worker instead of the blocking pool
    #[arg(long)]
    inline: bool,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print every state event as a JSON line
    #[arg(long)]
    json_events: bool,
}

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path).context("loading config")?,
        None => AppConfig::default(),
    };

    if let Some(max_file_mb) = cli.max_file_mb {
        config.max_file_bytes = (max_file_mb * 1024.0 * 1024.0) as u64;
    }
    if cli.inline {
        config.compression.off_thread = false;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn console_observer(json_events: bool) -> Arc<dyn StateObserver> {
    Arc::new(move |event: &StateEvent| {
        if json_events {
            match serde_json::to_string(event) {
                Ok(line) => println!("{line}"),
                Err(e) => warn!("Cannot serialize event: {}", e),
            }
            return;
        }

        match event {
            StateEvent::Alert(message) => warn!("{}", message),
            StateEvent::Progress(progress) if progress.progress_type == ProgressType::Progress => {
                info!("[{:>3}%] {}", progress.progress_percentage, progress.status);
            }
            StateEvent::CompressedChanged(files) => {
                for file in files {
                    info!("  {} ({})", file.name, file.size_label);
                }
            }
            _ => {}
        }
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)       // Remove module path
        .with_thread_ids(false)   // Remove thread IDs
        .with_thread_names(false) // Remove thread names
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let state = AppState::new(config);
    state.subscribe(console_observer(cli.json_events)).await;

    if let Some(quality) = cli.quality {
        if !commands::on_quality_change(&state, quality).await {
            bail!("invalid quality: {quality}");
        }
    }
    if let Some(max_size_mb) = cli.max_size_mb {
        if !commands::on_max_size_change(&state, max_size_mb).await {
            bail!("invalid max size: {max_size_mb}");
        }
    }

    if !commands::on_drop(&state, &cli.inputs).await {
        bail!("input files were rejected");
    }

    match commands::on_compress(&state).await {
        CompressOutcome::Completed(summary) => info!(
            "{} file(s): {} -> {} bytes ({:.1}% saved) in {}ms",
            summary.image_count,
            summary.total_input_bytes,
            summary.total_output_bytes,
            summary.compression_ratio,
            summary.total_time_ms
        ),
        CompressOutcome::Failed(e) => bail!("compression failed: {e}"),
        CompressOutcome::AlreadyRunning => bail!("compression already running"),
    }

    let sink = DirectorySink::new(&cli.out);
    if cli.zip {
        let path = commands::on_download_all(&state, &sink)
            .await
            .context("saving archive failed")?;
        info!("Saved {}", path.display());
    } else {
        let count = state.compressed().await.len();
        for index in 0..count {
            commands::on_download_file(&state, index, &sink)
                .await
                .with_context(|| format!("saving file {index} failed"))?;
        }
        info!("Saved {} file(s) to {}", count, sink.dir().display());
    }

    Ok(())
}
