use tracing::{debug, instrument};

use super::text::strip_markup;
use super::{
    Card, CardCategory, CardSet, InspectionRecord, RecordValidationError, SummaryConfig,
    SummaryRecord, AD_TECH_GROUP_TITLE,
};

/// URLs beyond the primary page are always joined with a semicolon; they may
/// themselves contain commas.
const ADDITIONAL_URLS_DELIMITER: &str = "; ";

/// Extraction result for count-style categories (ad trackers, cookies).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CountSummary {
    pub number: u64,
    pub owners: String,
    pub statement: String,
}

/// Extraction result for flag-style categories (fingerprinting, session
/// recording, key logging, pixel, remarketing).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlagSummary {
    pub found: bool,
    pub owners: String,
}

impl FlagSummary {
    /// The flag as it appears in the flat record: literally `"true"` or
    /// `"false"`.
    pub fn found_literal(&self) -> String {
        if self.found { "true" } else { "false" }.to_string()
    }
}

/// Extraction result for the aggregate ad-tech company list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AdTechSummary {
    pub number: u64,
    pub companies: String,
}

/// Converts one inspection record plus its classified cards into a flat,
/// fully-defaulted [`SummaryRecord`].
///
/// Defaulting policy is centralized in the per-category extraction
/// functions: absent cards, groups, or fields become 0 / `""` / `"false"`,
/// so the build is total over any combination of missing classifier data.
pub struct SummaryBuilder {
    config: SummaryConfig,
}

impl SummaryBuilder {
    pub fn new() -> Self {
        Self::with_config(SummaryConfig::default())
    }

    pub fn with_config(config: SummaryConfig) -> Self {
        Self { config }
    }

    /// Build the summary row. Pure: no side effects, and building twice from
    /// the same inputs yields identical records. The only failure mode is
    /// semantic validation of the inspection record itself.
    #[instrument(name = "build_summary", skip(self, inspection, cards), fields(host = %inspection.host))]
    pub fn build(
        &self,
        inspection: &InspectionRecord,
        cards: &CardSet,
    ) -> Result<SummaryRecord, RecordValidationError> {
        inspection.validate()?;

        let ad_trackers = self.count_summary(cards, CardCategory::AdTrackers);
        let cookies = self.count_summary(cards, CardCategory::Cookies);
        let canvas = self.flag_summary(cards, CardCategory::CanvasFingerprinting);
        let session = self.flag_summary(cards, CardCategory::SessionRecording);
        let key_logging = self.flag_summary(cards, CardCategory::KeyLogging);
        let pixel = self.flag_summary(cards, CardCategory::Pixel);
        let remarketing = self.flag_summary(cards, CardCategory::Remarketing);
        let ad_tech = self.ad_tech_summary(cards);
        debug!(
            ad_trackers = ad_trackers.number,
            cookies = cookies.number,
            ad_tech_companies = ad_tech.number,
            "summary extracted"
        );

        Ok(SummaryRecord {
            host: inspection.host.clone(),
            pages_number: inspection.pages_number(),
            url: inspection.uri_ins.clone(),
            additional_urls: inspection
                .browsing_history
                .iter()
                .skip(1)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(ADDITIONAL_URLS_DELIMITER),
            ad_trackers_number: ad_trackers.number,
            ad_trackers_owners: ad_trackers.owners,
            ad_trackers_statement: ad_trackers.statement,
            cookies_number: cookies.number,
            cookies_owners: cookies.owners,
            cookies_statement: cookies.statement,
            canvas_fingerprinting_found: canvas.found_literal(),
            canvas_fingerprinting_owners: canvas.owners,
            session_recording_found: session.found_literal(),
            session_recording_owners: session.owners,
            key_logging_found: key_logging.found_literal(),
            key_logging_owners: key_logging.owners,
            pixel_found: pixel.found_literal(),
            google_remarketing_found: remarketing.found_literal(),
            ad_tech_companies_number: ad_tech.number,
            ad_tech_companies: ad_tech.companies,
        })
    }

    /// Total extraction for a count-style category.
    pub fn count_summary(&self, cards: &CardSet, category: CardCategory) -> CountSummary {
        let card = cards.card(category);
        CountSummary {
            number: card.and_then(|card| card.big_number).unwrap_or(0),
            owners: self.join_owners(card),
            statement: strip_markup(
                card.and_then(|card| card.on_avg_statement.as_deref()),
            ),
        }
    }

    /// Total extraction for a flag-style category.
    pub fn flag_summary(&self, cards: &CardSet, category: CardCategory) -> FlagSummary {
        let card = cards.card(category);
        FlagSummary {
            found: card.and_then(|card| card.test_events_found).unwrap_or(false),
            owners: self.join_owners(card),
        }
    }

    /// Total extraction for the ad-tech interaction group: the child cards'
    /// titles joined with the configured delimiter.
    pub fn ad_tech_summary(&self, cards: &CardSet) -> AdTechSummary {
        match cards.group(AD_TECH_GROUP_TITLE) {
            Some(group) => AdTechSummary {
                number: group.cards.len() as u64,
                companies: group
                    .cards
                    .iter()
                    .map(|card| card.title.as_str())
                    .collect::<Vec<_>>()
                    .join(self.config.delimiter.as_str()),
            },
            None => AdTechSummary::default(),
        }
    }

    fn join_owners(&self, card: Option<&Card>) -> String {
        card.and_then(|card| card.domain_data.as_ref())
            .map(|data| data.owners.join(self.config.delimiter.as_str()))
            .unwrap_or_default()
    }
}

impl Default for SummaryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
