use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use indicatif::{MultiProgress, ProgressDrawTarget};
use srafetch::progress::ProgressWriter;
use srafetch::utils::{prepare_output_dir, read_accession_list};
use srafetch::{
    resolve_all, DownloadTask, DownloaderBuilder, EnaResolver, HttpClientConfig, ResolvePolicy,
    Status,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "srafetch")]
#[command(about = "Fetch the FASTQ files of sequencing run accessions over FTP")]
#[command(version)]
struct Cli {
    /// A run accession, or a file of accessions with --list
    #[arg(short, long, value_name = "ACCESSION|FILE")]
    input: String,

    /// Treat the input as a file with one accession per line
    #[arg(short = 'L', long)]
    list: bool,

    /// Directory the files are written to
    #[arg(short = 'O', long, default_value = ".")]
    output_dir: PathBuf,

    /// Maximum number of concurrent transfers
    #[arg(short, long, default_value_t = srafetch::downloader::DEFAULT_WORKERS)]
    workers: usize,

    /// Seconds allowed to establish each FTP session
    #[arg(long, value_name = "SECS", default_value_t = 5)]
    connect_timeout: u64,

    /// FTP control port
    #[arg(long, default_value_t = srafetch::session::ftp::DEFAULT_PORT)]
    port: u16,

    /// Metadata endpoint used to resolve accessions
    #[arg(long, value_name = "URL", default_value = srafetch::resolver::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Skip accessions that cannot be resolved instead of stopping
    #[arg(long)]
    skip_unresolved: bool,

    /// Exit with a failure status if any transfer failed
    #[arg(long)]
    strict: bool,

    /// Hide the progress bars
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();

    // Bars and log lines share stderr; logs are written while the bars are suspended.
    let multi = match cli.quiet {
        true => MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
        false => MultiProgress::new(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(ProgressWriter::new(multi.clone()))
        .init();

    prepare_output_dir(&cli.output_dir)
        .await
        .wrap_err_with(|| format!("output directory {:?} is not usable", cli.output_dir))?;

    let accessions = match cli.list {
        true => read_accession_list(Path::new(&cli.input))
            .await
            .wrap_err_with(|| format!("cannot read accession list {}", cli.input))?,
        false => vec![cli.input.trim().to_string()],
    };
    if accessions.is_empty() {
        warn!("no accessions given");
        return Ok(ExitCode::SUCCESS);
    }

    let policy = match cli.skip_unresolved {
        true => ResolvePolicy::Skip,
        false => ResolvePolicy::Abort,
    };
    let resolver = EnaResolver::with_endpoint(&cli.endpoint, HttpClientConfig::default())?;
    let locations = resolve_all(&resolver, &accessions, policy).await?;
    info!(
        accessions = accessions.len(),
        files = locations.len(),
        "resolved accessions"
    );

    let tasks = DownloadTask::from_locations(locations, &cli.output_dir);
    let builder = match cli.quiet {
        true => DownloaderBuilder::hidden(),
        false => DownloaderBuilder::new(),
    };
    let downloader = builder
        .directory(cli.output_dir.clone())
        .workers(cli.workers)
        .connect_timeout(Duration::from_secs(cli.connect_timeout))
        .port(cli.port)
        .multi_progress(multi)
        .build();

    let summaries = downloader.download(tasks).await;

    let mut failed = 0;
    for summary in &summaries {
        if let Status::Fail(msg) = summary.status() {
            failed += 1;
            error!("{} failed: {}", summary.task().location(), msg);
        }
    }
    let bytes: u64 = summaries.iter().map(|s| s.size()).sum();
    info!(
        succeeded = summaries.len() - failed,
        failed, bytes, "downloads finished"
    );

    if cli.strict && failed > 0 {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
