use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use tracklens_core::{
    classifier_from_settings, collector_from_settings, BatchAggregator, ClassifierSettings,
    CollectConfig, CollectorSettings, OutputFormat, OwnersDelimiter, SummaryConfig,
};

#[derive(Parser, Debug)]
#[command(
    name = "tracklens",
    author,
    version,
    about = "Privacy inspection batch scanner CLI"
)]
struct Cli {
    /// TOML configuration file layered under TRACKLENS_* environment variables
    #[arg(long = "config", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Collect inspection records for every URL in a list file
    Scan {
        /// File containing one URL per line
        urls_file: PathBuf,
        /// Directory receiving one subdirectory per scanned site
        #[arg(long, value_name = "DIR", default_value = "./outputs")]
        out_dir: PathBuf,
        /// Pages the collector visits beyond the landing page
        #[arg(long, default_value_t = 0)]
        num_pages: u64,
    },
    /// Summarize collected inspection records into reports and a CSV
    Summarize {
        /// Directory containing one subdirectory per scanned site
        #[arg(value_name = "DIR", default_value = "./outputs")]
        dir: PathBuf,
        /// Emit per-site reports as JSON instead of human-readable text
        #[arg(long)]
        json: bool,
        /// Delimiter for owner/company lists in the summary
        #[arg(long, value_enum)]
        delimiter: Option<DelimiterArg>,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum DelimiterArg {
    Comma,
    Semicolon,
}

impl From<DelimiterArg> for OwnersDelimiter {
    fn from(value: DelimiterArg) -> Self {
        match value {
            DelimiterArg::Comma => OwnersDelimiter::Comma,
            DelimiterArg::Semicolon => OwnersDelimiter::Semicolon,
        }
    }
}

/// File/env configuration shared across subcommands.
#[derive(Debug, serde::Deserialize)]
struct CliConfig {
    #[serde(default)]
    delimiter: OwnersDelimiter,
    #[serde(default = "default_data_dir")]
    data_dir: PathBuf,
    #[serde(default = "default_export_dir")]
    export_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Scan {
            urls_file,
            out_dir,
            num_pages,
        } => scan(&urls_file, &out_dir, num_pages).await?,
        Commands::Summarize {
            dir,
            json,
            delimiter,
        } => summarize(&dir, &config, json, delimiter.map(Into::into)).await?,
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<CliConfig> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }
    builder = builder.add_source(config::Environment::with_prefix("TRACKLENS"));
    builder
        .build()
        .and_then(|settings| settings.try_deserialize())
        .context("invalid configuration")
}

async fn scan(urls_file: &Path, out_dir: &Path, num_pages: u64) -> Result<()> {
    let raw = fs::read_to_string(urls_file)
        .with_context(|| format!("could not read URL list at {}", urls_file.display()))?;
    let urls: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if urls.is_empty() {
        bail!("no URLs found in {}", urls_file.display());
    }

    let settings = CollectorSettings::from_env()?;
    let collector = collector_from_settings(&settings)?;
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;

    let total = urls.len();
    let mut failed: Vec<String> = Vec::new();
    for (idx, url) in urls.iter().enumerate() {
        println!("Scanning {} ({}/{}) ...", url, idx + 1, total);
        let site_dir = match site_directory(out_dir, url) {
            Ok(dir) => dir,
            Err(error) => {
                warn!(%url, error = %format!("{error:#}"), "skipping URL");
                failed.push(url.to_string());
                continue;
            }
        };
        let config = CollectConfig {
            headless: true,
            num_pages,
            out_dir: site_dir.clone(),
        };
        if let Err(error) = collector.collect(url, &config).await {
            warn!(%url, error = %format!("{error:#}"), "collection failed");
            failed.push(url.to_string());
            // A failed collection leaves a partial site directory behind.
            let _ = fs::remove_dir_all(&site_dir);
        }
    }

    report_failures(&failed, total);
    Ok(())
}

/// Per-site output directory named after the URL host, suffixed with a
/// timestamp when a directory for that host already exists.
fn site_directory(out_dir: &Path, url: &str) -> Result<PathBuf> {
    let parsed = reqwest::Url::parse(url).with_context(|| format!("invalid URL `{url}`"))?;
    let host = parsed
        .host_str()
        .with_context(|| format!("URL `{url}` has no host"))?;
    let dir = out_dir.join(host);
    if dir.exists() {
        return Ok(out_dir.join(format!("{host}-{}", Utc::now().timestamp_millis())));
    }
    Ok(dir)
}

fn report_failures(failed: &[String], total: usize) {
    if failed.is_empty() {
        println!("{}", "All URLs were successfully scanned!".green());
    } else {
        println!(
            "{}",
            format!("{} out of {} URLs failed", failed.len(), total).red()
        );
        println!("The following URLs failed:");
        for url in failed {
            println!("{url}");
        }
    }
}

async fn summarize(
    dir: &Path,
    config: &CliConfig,
    json: bool,
    delimiter: Option<OwnersDelimiter>,
) -> Result<()> {
    let settings = ClassifierSettings::from_env()?;
    let classifier = classifier_from_settings(&settings, config.data_dir.clone())?;
    let format = if json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let aggregator = BatchAggregator::new(
        classifier,
        SummaryConfig {
            delimiter: delimiter.unwrap_or(config.delimiter),
        },
    )
    .with_format(format)
    .with_export_dir(&config.export_dir);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let outcome = aggregator.run(dir, &mut out).await?;
    drop(out);

    if !outcome.failures.is_empty() {
        println!(
            "{}",
            format!("{} site(s) failed to summarize:", outcome.failures.len()).red()
        );
        for failure in &outcome.failures {
            println!("{}: {}", failure.path.display(), failure.error);
        }
    }
    if outcome.skipped > 0 {
        println!("{} directory(ies) had no inspection record", outcome.skipped);
    }
    println!("> cards summary written to {}", outcome.csv_path.display());
    Ok(())
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tokio=warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init();
}
