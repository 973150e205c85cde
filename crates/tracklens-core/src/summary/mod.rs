use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod builder;
pub mod text;

pub use builder::{AdTechSummary, CountSummary, FlagSummary, SummaryBuilder};
pub use text::strip_markup;

/// Canonical file name of a site's raw collector output.
pub const INSPECTION_FILE_NAME: &str = "inspection.json";

/// Title of the classifier group that carries the per-category finding cards.
pub const INSPECTION_GROUP_TITLE: &str = "Blacklight Inspection Result";

/// Title of the classifier group that lists ad-tech companies the site
/// interacted with.
pub const AD_TECH_GROUP_TITLE: &str =
    "Some of the ad-tech companies this website interacted with:";

/// Finding categories extracted from the classifier output.
///
/// The `key` values are a contract with the external classifier's card
/// catalog; extending the catalog means extending this enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardCategory {
    AdTrackers,
    Cookies,
    CanvasFingerprinting,
    SessionRecording,
    KeyLogging,
    Pixel,
    Remarketing,
}

impl CardCategory {
    pub const ALL: [CardCategory; 7] = [
        CardCategory::AdTrackers,
        CardCategory::Cookies,
        CardCategory::CanvasFingerprinting,
        CardCategory::SessionRecording,
        CardCategory::KeyLogging,
        CardCategory::Pixel,
        CardCategory::Remarketing,
    ];

    /// The `cardType` key the classifier uses for this category.
    pub fn key(self) -> &'static str {
        match self {
            CardCategory::AdTrackers => "ddg_join_ads",
            CardCategory::Cookies => "cookies",
            CardCategory::CanvasFingerprinting => "canvas_fingerprinters",
            CardCategory::SessionRecording => "session_recorders",
            CardCategory::KeyLogging => "key_logging",
            CardCategory::Pixel => "fb_pixel_events",
            CardCategory::Remarketing => "ga",
        }
    }
}

/// Script/cookie ownership details attached to a card by the classifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainData {
    #[serde(default)]
    pub owners: Vec<String>,
}

/// One classified finding. Every field beyond the type and title is
/// optional: absence means "no data for this category on this site".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub card_type: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub big_number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_avg_statement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_events_found: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_data: Option<DomainData>,
}

/// A titled group of cards as emitted by the classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardGroup {
    pub title: String,
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl CardGroup {
    /// Find a card by its `cardType` key. `None` is the "no data" case.
    pub fn card(&self, card_type: &str) -> Option<&Card> {
        self.cards.iter().find(|card| card.card_type == card_type)
    }
}

/// Ordered set of card groups for one site — the classifier's full output.
///
/// The catalog can grow or omit categories per site (a site with no cookies
/// has no `cookies` card), so every lookup returns an `Option` and callers
/// treat `None` as "no data", never as a failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardSet {
    pub groups: Vec<CardGroup>,
}

impl CardSet {
    pub fn new(groups: Vec<CardGroup>) -> Self {
        Self { groups }
    }

    /// Find a group by exact title match.
    pub fn group(&self, title: &str) -> Option<&CardGroup> {
        self.groups.iter().find(|group| group.title == title)
    }

    /// Find a category card inside the inspection-result group.
    pub fn card(&self, category: CardCategory) -> Option<&Card> {
        self.group(INSPECTION_GROUP_TITLE)
            .and_then(|group| group.card(category.key()))
    }
}

impl From<Vec<CardGroup>> for CardSet {
    fn from(groups: Vec<CardGroup>) -> Self {
        Self::new(groups)
    }
}

/// Collector settings echoed back in the inspection record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionConfig {
    #[serde(default)]
    pub num_pages: u64,
}

/// One site's raw collector output (`inspection.json`).
///
/// The per-category `reports` payloads stay opaque: only the external
/// classifier consumes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectionRecord {
    pub host: String,
    pub uri_ins: String,
    #[serde(default)]
    pub browsing_history: Vec<String>,
    #[serde(default)]
    pub config: InspectionConfig,
    #[serde(default)]
    pub reports: BTreeMap<String, serde_json::Value>,
}

impl InspectionRecord {
    /// Pages visited during collection. The primary page is always counted,
    /// so this is at least 1.
    pub fn pages_number(&self) -> u64 {
        self.config.num_pages + 1
    }

    /// Validate invariants the collector is expected to uphold.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if self.host.trim().is_empty() {
            return Err(RecordValidationError::MissingHost {
                url: self.uri_ins.clone(),
            });
        }
        if self.browsing_history.is_empty() {
            return Err(RecordValidationError::EmptyBrowsingHistory {
                host: self.host.clone(),
            });
        }
        Ok(())
    }
}

/// Errors emitted while validating an inspection record.
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordValidationError {
    #[error("inspection record host must not be blank (url: `{url}`)")]
    MissingHost { url: String },
    #[error("inspection record for `{host}` has an empty browsing history")]
    EmptyBrowsingHistory { host: String },
}

/// Delimiter used when joining owner/company lists into a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnersDelimiter {
    Comma,
    Semicolon,
}

impl OwnersDelimiter {
    pub fn as_str(self) -> &'static str {
        match self {
            OwnersDelimiter::Comma => ", ",
            OwnersDelimiter::Semicolon => "; ",
        }
    }
}

impl Default for OwnersDelimiter {
    fn default() -> Self {
        OwnersDelimiter::Semicolon
    }
}

/// Tunable configuration for summary building.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryConfig {
    #[serde(default)]
    pub delimiter: OwnersDelimiter,
}

/// Flattened per-site summary row.
///
/// Every field has a deterministic default (0 for counts, `""` for lists and
/// statements, `"false"` for flags), so a record is fully populated even
/// when the corresponding card is entirely absent. Field order is the CSV
/// column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub host: String,
    pub pages_number: u64,
    pub url: String,
    pub additional_urls: String,
    pub ad_trackers_number: u64,
    pub ad_trackers_owners: String,
    pub ad_trackers_statement: String,
    pub cookies_number: u64,
    pub cookies_owners: String,
    pub cookies_statement: String,
    pub canvas_fingerprinting_found: String,
    pub canvas_fingerprinting_owners: String,
    pub session_recording_found: String,
    pub session_recording_owners: String,
    pub key_logging_found: String,
    pub key_logging_owners: String,
    pub pixel_found: String,
    pub google_remarketing_found: String,
    pub ad_tech_companies_number: u64,
    pub ad_tech_companies: String,
}

impl SummaryRecord {
    /// CSV header, in field order.
    pub const COLUMNS: [&'static str; 20] = [
        "host",
        "pages_number",
        "url",
        "additional_urls",
        "ad_trackers_number",
        "ad_trackers_owners",
        "ad_trackers_statement",
        "cookies_number",
        "cookies_owners",
        "cookies_statement",
        "canvas_fingerprinting_found",
        "canvas_fingerprinting_owners",
        "session_recording_found",
        "session_recording_owners",
        "key_logging_found",
        "key_logging_owners",
        "pixel_found",
        "google_remarketing_found",
        "ad_tech_companies_number",
        "ad_tech_companies",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(host: &str, history: &[&str]) -> InspectionRecord {
        InspectionRecord {
            host: host.into(),
            uri_ins: "https://example.com".into(),
            browsing_history: history.iter().map(|s| s.to_string()).collect(),
            config: InspectionConfig { num_pages: 0 },
            reports: BTreeMap::new(),
        }
    }

    #[test]
    fn lookups_on_empty_set_return_none() {
        let cards = CardSet::default();
        assert!(cards.group(INSPECTION_GROUP_TITLE).is_none());
        assert!(cards.group(AD_TECH_GROUP_TITLE).is_none());
        for category in CardCategory::ALL {
            assert!(cards.card(category).is_none());
        }
    }

    #[test]
    fn card_lookup_matches_on_exact_type() {
        let cards = CardSet::new(vec![CardGroup {
            title: INSPECTION_GROUP_TITLE.into(),
            cards: vec![Card {
                card_type: "cookies".into(),
                title: "Third-party cookies".into(),
                big_number: Some(4),
                on_avg_statement: None,
                test_events_found: None,
                domain_data: None,
            }],
        }]);
        assert!(cards.card(CardCategory::Cookies).is_some());
        assert!(cards.card(CardCategory::AdTrackers).is_none());
    }

    #[test]
    fn validation_rejects_blank_host() {
        let err = record("  ", &["https://example.com"])
            .validate()
            .expect_err("blank host should be rejected");
        assert!(matches!(err, RecordValidationError::MissingHost { .. }));
    }

    #[test]
    fn validation_rejects_empty_history() {
        let err = record("example.com", &[])
            .validate()
            .expect_err("empty browsing history should be rejected");
        assert!(matches!(
            err,
            RecordValidationError::EmptyBrowsingHistory { host } if host == "example.com"
        ));
    }

    #[test]
    fn pages_number_counts_the_primary_page() {
        let mut inspection = record("example.com", &["https://example.com"]);
        assert_eq!(inspection.pages_number(), 1);
        inspection.config.num_pages = 2;
        assert_eq!(inspection.pages_number(), 3);
    }

    #[test]
    fn card_optionals_deserialize_as_absent() {
        let card: Card = serde_json::from_str(
            r#"{"cardType": "ga", "title": "Google Analytics"}"#,
        )
        .unwrap();
        assert!(card.big_number.is_none());
        assert!(card.test_events_found.is_none());
        assert!(card.domain_data.is_none());
    }

    #[test]
    fn delimiter_renders_expected_separators() {
        assert_eq!(OwnersDelimiter::Comma.as_str(), ", ");
        assert_eq!(OwnersDelimiter::Semicolon.as_str(), "; ");
        assert_eq!(OwnersDelimiter::default(), OwnersDelimiter::Semicolon);
    }
}
