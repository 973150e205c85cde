use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;

/// Environment-driven configuration for the collector client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorSettings {
    pub provider: String,
    pub endpoint: Option<String>,
    pub timeout: Option<Duration>,
}

impl CollectorSettings {
    const PROVIDER_ENV: &'static str = "TRACKLENS_COLLECTOR_PROVIDER";
    const ENDPOINT_ENV: &'static str = "TRACKLENS_COLLECTOR_ENDPOINT";
    const TIMEOUT_ENV: &'static str = "TRACKLENS_COLLECTOR_TIMEOUT";

    /// Load settings from environment variables.
    ///
    /// * `TRACKLENS_COLLECTOR_PROVIDER` — `http` or `noop` (default: `http`).
    /// * `TRACKLENS_COLLECTOR_ENDPOINT` — collector service base URL.
    /// * `TRACKLENS_COLLECTOR_TIMEOUT`  — optional request timeout (e.g. `90s`);
    ///   the collector's own page-visit timeout is internal to the service.
    pub fn from_env() -> Result<Self> {
        Self::from_map(std::env::vars().collect())
    }

    fn from_map(vars: HashMap<String, String>) -> Result<Self> {
        let provider = vars
            .get(Self::PROVIDER_ENV)
            .cloned()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "http".to_string())
            .trim()
            .to_string();
        let endpoint = vars
            .get(Self::ENDPOINT_ENV)
            .cloned()
            .filter(|v| !v.trim().is_empty());
        let timeout = vars
            .get(Self::TIMEOUT_ENV)
            .and_then(|v| humantime::parse_duration(v.trim()).ok());

        Ok(Self {
            provider,
            endpoint,
            timeout,
        })
    }
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            provider: "http".to_string(),
            endpoint: None,
            timeout: None,
        }
    }
}
