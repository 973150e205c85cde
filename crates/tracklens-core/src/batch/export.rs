use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use crate::summary::SummaryRecord;

const EXPORT_SUFFIX: &str = "cards-summary.csv";

/// Batch timestamp in the `YYYYMMDD-HHMMSS` form embedded in export names.
pub fn timestamp(at: DateTime<Local>) -> String {
    at.format("%Y%m%d-%H%M%S").to_string()
}

/// File name for a batch started at the given time.
pub fn export_file_name(at: DateTime<Local>) -> String {
    format!("{}-{}", timestamp(at), EXPORT_SUFFIX)
}

/// Serialize the accumulated records to `<dir>/<timestamp>-cards-summary.csv`.
///
/// Column order is fixed to the record's field order; an empty batch still
/// produces a valid CSV containing only the header row.
pub fn write_csv(
    records: &[SummaryRecord],
    dir: &Path,
    at: DateTime<Local>,
) -> Result<PathBuf> {
    let path = dir.join(export_file_name(at));
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&path)
        .with_context(|| format!("failed to create summary CSV at {}", path.display()))?;
    writer
        .write_record(SummaryRecord::COLUMNS)
        .context("failed to write CSV header")?;
    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("failed to write CSV row for {}", record.host))?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush summary CSV at {}", path.display()))?;
    Ok(path)
}
