mod job;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use ffcmd_builder::toolchain::catalog::{BitstreamFilterCatalog, CodecCatalog};
use ffcmd_builder::toolchain::{self, probe};
use ffcmd_builder::{Invocation, OutputFormat};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// One argument per line, unquoted
    Tokens,
    /// A single shell-ready line with quoted paths
    String,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Tokens => OutputFormat::TokenList,
            Format::String => OutputFormat::JoinedString,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "ffcmd")]
#[command(about = "Validated ffmpeg command builder", long_about = None)]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// TOML job describing input, output, options, codecs and filters
    #[arg(short, long, value_name = "FILE")]
    job: PathBuf,

    #[arg(short, long, value_enum, default_value_t = Format::String)]
    format: Format,

    /// Check named codecs against `ffmpeg -codecs`
    #[arg(long)]
    check_codecs: bool,

    /// Check bitstream filters against `ffmpeg -bsfs`
    #[arg(long)]
    check_filters: bool,

    /// Probe the input with ffprobe before building
    #[arg(long)]
    probe: bool,

    /// Execute the command after printing it
    #[arg(long)]
    run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match ffcmd_builder::config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    // Printing a command does not need ffmpeg installed; running it does.
    let binary = match toolchain::locate_ffmpeg(&config) {
        Ok(path) => path.display().to_string(),
        Err(e) if !args.run && !args.check_codecs && !args.check_filters => {
            warn!("{}; using plain `ffmpeg`", e);
            "ffmpeg".to_string()
        }
        Err(e) => {
            error!("Failed to locate ffmpeg: {}", e);
            return Err(e);
        }
    };

    let mut catalogs = job::Catalogs::default();
    if args.check_codecs {
        let catalog = CodecCatalog::query(Path::new(&binary))?;
        info!("Codec catalog: {} entries", catalog.len());
        catalogs.codecs = Some(catalog.choices());
    }
    if args.check_filters {
        let catalog = BitstreamFilterCatalog::query(Path::new(&binary))?;
        info!("Bitstream filter catalog: {} entries", catalog.len());
        catalogs.bitstream_filters = Some(catalog.choices());
    }

    let job = job::load_job(&args.job)?;

    if args.probe {
        let ffprobe = toolchain::locate_ffprobe(&config)?;
        let result = probe::probe_file(&ffprobe, Path::new(&job.input)).await?;
        info!(
            "Probed {}: format={:?} duration={:?}s streams={}",
            job.input,
            result.format.format_name,
            result.format.duration,
            result.streams.len()
        );
        if let Some(video) = result.main_video_stream() {
            info!(
                "Main video stream #{}: {:?} {:?}x{:?}",
                video.index, video.codec_name, video.width, video.height
            );
        }
    }

    let command = job::build_command(&job, &binary, &config, catalogs)?;

    match command.generate(args.format.into())? {
        Invocation::Tokens(tokens) => {
            for token in &tokens {
                println!("{}", token);
            }
        }
        Invocation::Joined(line) => println!("{}", line),
    }

    if args.run {
        let started = chrono::Local::now();
        let output = toolchain::run_command(&command.tokens()?).await?;
        let elapsed = chrono::Local::now().signed_duration_since(started);
        info!(
            "Finished with exit code {:?} in {}s ({} stderr lines)",
            output.exit_code,
            elapsed.num_seconds(),
            output.stderr.len()
        );
    }

    Ok(())
}
