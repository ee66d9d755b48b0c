use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use licscan::engine::{ScanConfig, Scanner, Threshold};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "licscan")]
#[command(about = "Concurrent license and copyright scanner", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML configuration file (defaults to ./licscan.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory of license texts
    #[arg(long, global = true, env = "LICSCAN_CORPUS")]
    corpus: Option<PathBuf>,

    /// Minimum match confidence, in percent (0-100)
    #[arg(long, global = true)]
    threshold: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a single file and print its report
    File {
        path: PathBuf,

        /// Skip files larger than this many MB
        #[arg(long)]
        max_size_mb: Option<u64>,

        /// Read and analyze the file in chunks
        #[arg(long)]
        buffered: bool,
    },
    /// Scan a file or directory tree and write the aggregate report
    Scan {
        path: PathBuf,

        /// Report destination
        #[arg(short, long)]
        output: PathBuf,

        /// Number of worker threads (defaults to the CPU count)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Skip files larger than this many MB
        #[arg(long)]
        max_size_mb: Option<u64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    match cli.command {
        Commands::File {
            path,
            max_size_mb,
            buffered,
        } => {
            let scanner = Scanner::from_config(config).context("failed to configure scanner")?;
            let limit = max_size_mb.or(scanner.config().max_file_size_mb);
            println!("{}", scanner.scan_file(&path, limit, buffered));
        }
        Commands::Scan {
            path,
            output,
            jobs,
            max_size_mb,
        } => {
            let mut config = config;
            if max_size_mb.is_some() {
                config.max_file_size_mb = max_size_mb;
            }
            let jobs = jobs.unwrap_or(config.max_concurrency);
            let scanner = Scanner::from_config(config).context("failed to configure scanner")?;
            let report = scanner
                .scan_path_to(&path, &output, jobs)
                .with_context(|| format!("scan of {} failed", path.display()))?;
            eprintln!(
                "{} files, {} license matches, {} copyrights, {} with errors → {}",
                report.file_count,
                report.total_licenses(),
                report.total_copyrights(),
                report.failed_files().count(),
                output.display()
            );
        }
    }

    Ok(())
}

/// Config file first, then command-line overrides
fn resolve_config(cli: &Cli) -> Result<ScanConfig> {
    let mut config = match &cli.config {
        Some(path) => ScanConfig::from_file(path)
            .with_context(|| format!("invalid config {}", path.display()))?,
        None => ScanConfig::from_project_root(Path::new(".")),
    };

    if let Some(corpus) = &cli.corpus {
        config.corpus_path = Some(corpus.clone());
    }
    if let Some(percent) = cli.threshold {
        config.threshold = Threshold::from_percent(percent)?;
    }
    Ok(config)
}
