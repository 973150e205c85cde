pub mod batch;
pub mod classify;
pub mod collector;
pub mod report;
pub mod summary;

pub use batch::{BatchAggregator, BatchError, BatchOutcome, SiteFailure, RESULT_FILE_NAME};
pub use classify::{
    classifier_from_settings, CatalogRepository, Catalogs, Classifier, ClassifierSettings,
    FileCatalogRepository, HttpClassifier, NoopClassifier,
};
pub use collector::{
    collector_from_settings, CollectConfig, Collector, CollectorSettings, HttpCollector,
    NoopCollector,
};
pub use report::{render_report, OutputFormat};
pub use summary::{
    Card, CardCategory, CardGroup, CardSet, DomainData, InspectionRecord, OwnersDelimiter,
    RecordValidationError, SummaryBuilder, SummaryConfig, SummaryRecord, INSPECTION_FILE_NAME,
};
