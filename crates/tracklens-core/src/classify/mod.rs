mod catalog;
mod http;
mod settings;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::summary::{CardSet, InspectionRecord};

pub use catalog::{CatalogRepository, Catalogs, FileCatalogRepository};
pub use http::HttpClassifier;
pub use settings::ClassifierSettings;

/// Client abstraction for the external card classifier.
///
/// The classifier owns the scoring/matching semantics; this crate only
/// consumes its grouped-card output. A failed call is surfaced to the batch
/// loop as a per-site malformed-record condition, never a batch abort.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify one inspection record into grouped, titled cards.
    async fn classify(&self, record: &InspectionRecord, path_hint: &Path) -> Result<CardSet>;
}

/// Placeholder classifier returning no cards.
///
/// Keeps the pipeline runnable offline; every summary built from its output
/// lands on the documented defaults.
#[derive(Debug, Default, Clone)]
pub struct NoopClassifier;

#[async_trait]
impl Classifier for NoopClassifier {
    async fn classify(&self, _record: &InspectionRecord, _path_hint: &Path) -> Result<CardSet> {
        Ok(CardSet::default())
    }
}

/// Select a classifier implementation from settings.
pub fn classifier_from_settings(
    settings: &ClassifierSettings,
    data_dir: impl Into<PathBuf>,
) -> Result<Arc<dyn Classifier>> {
    match settings.provider.to_lowercase().as_str() {
        "noop" => Ok(Arc::new(NoopClassifier)),
        "http" => Ok(Arc::new(HttpClassifier::new(
            settings,
            Arc::new(FileCatalogRepository::new(data_dir)),
        )?)),
        other => bail!("unknown classifier provider `{other}` (expected `http` or `noop`)"),
    }
}
