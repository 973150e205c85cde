pub mod export;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result as AnyResult};
use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::{info, warn};

use crate::classify::Classifier;
use crate::report::{render_report, OutputFormat};
use crate::summary::{
    CardSet, InspectionRecord, SummaryBuilder, SummaryConfig, SummaryRecord, INSPECTION_FILE_NAME,
};

/// File name of the per-site audit copy of the classifier output.
pub const RESULT_FILE_NAME: &str = "inspection-result.json";

/// Errors raised while aggregating a batch of site directories.
///
/// Per-site conditions (`MissingInputFile`, `MalformedRecord`) are recovered
/// locally: logged, recorded, and the loop continues. Only `ExportFailure`
/// terminates the batch, since it discards the accumulated work.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("no inspection record found at {}", path.display())]
    MissingInputFile { path: PathBuf },
    #[error("malformed inspection record at {}", path.display())]
    MalformedRecord {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
    #[error("failed to export the batch summary")]
    ExportFailure {
        #[source]
        source: anyhow::Error,
    },
}

/// A site that could not be summarized, with its cause.
#[derive(Debug)]
pub struct SiteFailure {
    pub path: PathBuf,
    pub error: BatchError,
}

/// Result of one batch run.
#[derive(Debug)]
pub struct BatchOutcome {
    pub records: Vec<SummaryRecord>,
    pub failures: Vec<SiteFailure>,
    pub skipped: usize,
    pub csv_path: PathBuf,
}

/// Walks a directory of per-site collector outputs, classifies each site,
/// accumulates summary records, and exports them at batch end.
///
/// One aggregator instance is constructed per batch run and owns its own
/// accumulator; sites are processed strictly sequentially.
pub struct BatchAggregator {
    classifier: Arc<dyn Classifier>,
    builder: SummaryBuilder,
    format: OutputFormat,
    export_dir: PathBuf,
    started_at: DateTime<Local>,
}

impl BatchAggregator {
    pub fn new(classifier: Arc<dyn Classifier>, config: SummaryConfig) -> Self {
        Self {
            classifier,
            builder: SummaryBuilder::with_config(config),
            format: OutputFormat::Human,
            export_dir: PathBuf::from("."),
            started_at: Local::now(),
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Directory the batch CSV is written to. Defaults to the current
    /// working directory.
    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    pub fn with_started_at(mut self, started_at: DateTime<Local>) -> Self {
        self.started_at = started_at;
        self
    }

    /// Process every site directory under `dir`, writing each site's
    /// rendered report to `out`, then export the accumulated records.
    ///
    /// Per-site failures are logged and recorded in the outcome; only the
    /// final export aborts the batch.
    pub async fn run<W: io::Write>(&self, dir: &Path, out: &mut W) -> AnyResult<BatchOutcome> {
        let mut entries: Vec<PathBuf> = fs::read_dir(dir)
            .with_context(|| format!("failed to read batch directory {}", dir.display()))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        entries.sort();

        let mut records = Vec::new();
        let mut failures = Vec::new();
        let mut skipped = 0usize;

        for site_dir in entries {
            match self.process_site(&site_dir).await {
                Ok((record, report)) => {
                    writeln!(out, "{report}")?;
                    records.push(record);
                }
                Err(error @ BatchError::MissingInputFile { .. }) => {
                    warn!(site = %site_dir.display(), %error, "skipping site");
                    skipped += 1;
                }
                Err(error) => {
                    warn!(site = %site_dir.display(), %error, "site failed");
                    failures.push(SiteFailure {
                        path: site_dir,
                        error,
                    });
                }
            }
        }

        let csv_path = self.export(&records)?;
        info!(
            sites = records.len(),
            failed = failures.len(),
            skipped,
            csv = %csv_path.display(),
            "batch complete"
        );

        Ok(BatchOutcome {
            records,
            failures,
            skipped,
            csv_path,
        })
    }

    /// Summarize one site directory: load, classify, write the audit copy,
    /// build, render.
    async fn process_site(&self, site_dir: &Path) -> Result<(SummaryRecord, String), BatchError> {
        let inspection_path = site_dir.join(INSPECTION_FILE_NAME);
        if !inspection_path.exists() {
            return Err(BatchError::MissingInputFile {
                path: inspection_path,
            });
        }

        let malformed = |source: anyhow::Error| BatchError::MalformedRecord {
            path: inspection_path.clone(),
            source,
        };

        let raw = fs::read_to_string(&inspection_path)
            .map_err(|err| malformed(anyhow::Error::new(err)))?;
        let inspection: InspectionRecord =
            serde_json::from_str(&raw).map_err(|err| malformed(anyhow::Error::new(err)))?;

        let cards = self
            .classifier
            .classify(&inspection, &inspection_path)
            .await
            .map_err(&malformed)?;
        self.write_audit_copy(site_dir, &cards);

        let record = self
            .builder
            .build(&inspection, &cards)
            .map_err(|err| malformed(anyhow::Error::new(err)))?;
        let report = render_report(&record, &cards, self.format).map_err(&malformed)?;
        Ok((record, report))
    }

    /// The audit copy is a debugging aid; failing to write it does not fail
    /// the site.
    fn write_audit_copy(&self, site_dir: &Path, cards: &CardSet) {
        let path = site_dir.join(RESULT_FILE_NAME);
        let body = match serde_json::to_string_pretty(cards) {
            Ok(body) => body,
            Err(error) => {
                warn!(%error, "could not serialize classifier output");
                return;
            }
        };
        if let Err(error) = fs::write(&path, body) {
            warn!(path = %path.display(), %error, "could not write audit copy");
        }
    }

    fn export(&self, records: &[SummaryRecord]) -> Result<PathBuf, BatchError> {
        export::write_csv(records, &self.export_dir, self.started_at)
            .map_err(|source| BatchError::ExportFailure { source })
    }
}
