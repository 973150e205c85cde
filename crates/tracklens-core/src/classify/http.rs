use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{CatalogRepository, Classifier, ClassifierSettings};
use crate::summary::{CardSet, InspectionRecord};

/// Classifier adapter calling a card-classification service over HTTP.
///
/// Posts the inspection record together with the domain-ownership cache and
/// reported-card catalog, and parses the grouped-card response.
pub struct HttpClassifier<C: CatalogRepository> {
    http: Client,
    url: String,
    api_key: Option<String>,
    catalogs: Arc<C>,
}

impl<C: CatalogRepository> HttpClassifier<C> {
    pub fn new(settings: &ClassifierSettings, catalogs: Arc<C>) -> Result<Self> {
        let endpoint = settings.endpoint.clone().context(
            "classifier endpoint must be set via TRACKLENS_CLASSIFIER_ENDPOINT \
             when the http provider is used",
        )?;
        let url = format!("{}/v1/cards", endpoint.trim_end_matches('/'));
        let mut builder = Client::builder().user_agent("tracklens/0.5");
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .context("failed to build classifier HTTP client")?;
        Ok(Self {
            http,
            url,
            api_key: settings.api_key.clone(),
            catalogs,
        })
    }
}

#[async_trait]
impl<C> Classifier for HttpClassifier<C>
where
    C: CatalogRepository + 'static,
{
    #[instrument(name = "classify_site", skip(self, record), fields(host = %record.host))]
    async fn classify(&self, record: &InspectionRecord, path_hint: &Path) -> Result<CardSet> {
        let catalogs = self.catalogs.load_catalogs().await?;
        let payload = ClassifyRequest {
            inspection: record,
            path_hint: path_hint.display().to_string(),
            domain_cache: &catalogs.domain_cache,
            reported_cards: &catalogs.reported_cards,
        };

        let mut request = self.http.post(&self.url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request
            .send()
            .await
            .context("failed to call classifier service")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("classifier service error ({}): {}", status, body);
        }

        let parsed: ClassifyResponse = response
            .json()
            .await
            .context("classifier returned an unparsable response")?;
        debug!(groups = parsed.groups.groups.len(), "classification complete");
        Ok(parsed.groups)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClassifyRequest<'a> {
    inspection: &'a InspectionRecord,
    path_hint: String,
    domain_cache: &'a serde_json::Value,
    reported_cards: &'a serde_json::Value,
}

#[derive(Deserialize)]
struct ClassifyResponse {
    groups: CardSet,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::FileCatalogRepository;
    use crate::summary::{CardCategory, InspectionConfig};
    use httpmock::prelude::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn record() -> InspectionRecord {
        InspectionRecord {
            host: "example.com".into(),
            uri_ins: "https://example.com".into(),
            browsing_history: vec!["https://example.com".into()],
            config: InspectionConfig::default(),
            reports: BTreeMap::new(),
        }
    }

    fn classifier(base_url: &str, data_dir: &Path) -> HttpClassifier<FileCatalogRepository> {
        let settings = ClassifierSettings {
            provider: "http".into(),
            endpoint: Some(base_url.to_string()),
            api_key: Some("secret".into()),
            timeout: None,
        };
        HttpClassifier::new(&settings, Arc::new(FileCatalogRepository::new(data_dir))).unwrap()
    }

    #[tokio::test]
    async fn parses_grouped_cards_from_the_service() {
        let server = MockServer::start();
        let temp = tempfile::tempdir().unwrap();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/cards")
                .header("authorization", "Bearer secret");
            then.status(200).json_body(json!({
                "groups": [{
                    "title": "Blacklight Inspection Result",
                    "cards": [{
                        "cardType": "cookies",
                        "title": "Third-party cookies",
                        "bigNumber": 3
                    }]
                }]
            }));
        });

        let cards = classifier(&server.base_url(), temp.path())
            .classify(&record(), Path::new("site/inspection.json"))
            .await
            .unwrap();

        mock.assert();
        let cookie_card = cards.card(CardCategory::Cookies).expect("cookies card");
        assert_eq!(cookie_card.big_number, Some(3));
    }

    #[tokio::test]
    async fn service_errors_are_surfaced() {
        let server = MockServer::start();
        let temp = tempfile::tempdir().unwrap();
        server.mock(|when, then| {
            when.method(POST).path("/v1/cards");
            then.status(500).body("classifier exploded");
        });

        let err = classifier(&server.base_url(), temp.path())
            .classify(&record(), Path::new("site/inspection.json"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn unparsable_response_is_an_error() {
        let server = MockServer::start();
        let temp = tempfile::tempdir().unwrap();
        server.mock(|when, then| {
            when.method(POST).path("/v1/cards");
            then.status(200).body("not json");
        });

        let err = classifier(&server.base_url(), temp.path())
            .classify(&record(), Path::new("site/inspection.json"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unparsable"));
    }
}
