mod http;
mod settings;

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;

use crate::summary::{InspectionConfig, InspectionRecord, INSPECTION_FILE_NAME};

pub use http::HttpCollector;
pub use settings::CollectorSettings;

/// Per-URL collection parameters.
#[derive(Debug, Clone)]
pub struct CollectConfig {
    pub headless: bool,
    pub num_pages: u64,
    pub out_dir: PathBuf,
}

impl CollectConfig {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            headless: true,
            num_pages: 0,
            out_dir: out_dir.into(),
        }
    }
}

/// Client abstraction for the external privacy-inspection collector.
///
/// A successful collection leaves an `inspection.json` in the configured
/// output directory; the collector's browser automation internals are not
/// modeled here.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Visit one URL and persist its inspection record.
    async fn collect(&self, url: &str, config: &CollectConfig) -> Result<()>;
}

/// Placeholder collector writing a minimal inspection record derived from
/// the URL alone. Useful for offline smoke runs of the batch pipeline.
#[derive(Debug, Default, Clone)]
pub struct NoopCollector;

#[async_trait]
impl Collector for NoopCollector {
    async fn collect(&self, url: &str, config: &CollectConfig) -> Result<()> {
        let parsed = reqwest::Url::parse(url).with_context(|| format!("invalid URL `{url}`"))?;
        let Some(host) = parsed.host_str() else {
            bail!("URL `{url}` has no host");
        };
        let record = InspectionRecord {
            host: host.to_string(),
            uri_ins: url.to_string(),
            browsing_history: vec![url.to_string()],
            config: InspectionConfig {
                num_pages: config.num_pages,
            },
            reports: BTreeMap::new(),
        };
        write_inspection(&record, config)
    }
}

/// Select a collector implementation from settings.
pub fn collector_from_settings(settings: &CollectorSettings) -> Result<Arc<dyn Collector>> {
    match settings.provider.to_lowercase().as_str() {
        "noop" => Ok(Arc::new(NoopCollector)),
        "http" => Ok(Arc::new(HttpCollector::new(settings)?)),
        other => bail!("unknown collector provider `{other}` (expected `http` or `noop`)"),
    }
}

fn write_inspection(record: &InspectionRecord, config: &CollectConfig) -> Result<()> {
    fs::create_dir_all(&config.out_dir).with_context(|| {
        format!(
            "failed to create collection directory {}",
            config.out_dir.display()
        )
    })?;
    let path = config.out_dir.join(INSPECTION_FILE_NAME);
    let body = serde_json::to_string_pretty(record)?;
    fs::write(&path, body)
        .with_context(|| format!("failed to write inspection record to {}", path.display()))?;
    Ok(())
}
