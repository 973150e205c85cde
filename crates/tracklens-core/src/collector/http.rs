use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::instrument;

use super::{write_inspection, CollectConfig, Collector, CollectorSettings};
use crate::summary::InspectionRecord;

/// Collector adapter calling a headless-browser inspection service over
/// HTTP and persisting the returned inspection record.
pub struct HttpCollector {
    http: Client,
    url: String,
}

impl HttpCollector {
    pub fn new(settings: &CollectorSettings) -> Result<Self> {
        let endpoint = settings.endpoint.clone().context(
            "collector endpoint must be set via TRACKLENS_COLLECTOR_ENDPOINT \
             when the http provider is used",
        )?;
        let url = format!("{}/v1/collect", endpoint.trim_end_matches('/'));
        let mut builder = Client::builder().user_agent("tracklens/0.5");
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .context("failed to build collector HTTP client")?;
        Ok(Self { http, url })
    }
}

#[async_trait]
impl Collector for HttpCollector {
    #[instrument(name = "collect_url", skip(self, config))]
    async fn collect(&self, url: &str, config: &CollectConfig) -> Result<()> {
        let payload = CollectRequest {
            url,
            num_pages: config.num_pages,
            headless: config.headless,
        };
        let response = self
            .http
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .context("failed to call collector service")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("collector service error ({}): {}", status, body);
        }

        let record: InspectionRecord = response
            .json()
            .await
            .context("collector returned an unparsable inspection record")?;
        record.validate()?;
        write_inspection(&record, config)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CollectRequest<'a> {
    url: &'a str,
    num_pages: u64,
    headless: bool,
}
