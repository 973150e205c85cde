use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;

/// Environment-driven configuration for the classifier client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierSettings {
    pub provider: String,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub timeout: Option<Duration>,
}

impl ClassifierSettings {
    const PROVIDER_ENV: &'static str = "TRACKLENS_CLASSIFIER_PROVIDER";
    const ENDPOINT_ENV: &'static str = "TRACKLENS_CLASSIFIER_ENDPOINT";
    const API_KEY_ENV: &'static str = "TRACKLENS_CLASSIFIER_API_KEY";
    const TIMEOUT_ENV: &'static str = "TRACKLENS_CLASSIFIER_TIMEOUT";

    /// Load settings from environment variables.
    ///
    /// * `TRACKLENS_CLASSIFIER_PROVIDER` — `http` or `noop` (default: `http`).
    /// * `TRACKLENS_CLASSIFIER_ENDPOINT` — classifier service base URL.
    /// * `TRACKLENS_CLASSIFIER_API_KEY`  — optional bearer token.
    /// * `TRACKLENS_CLASSIFIER_TIMEOUT`  — optional request timeout (e.g. `30s`).
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
        let api_key = vars
            .get(Self::API_KEY_ENV)
            .cloned()
            .filter(|v| !v.trim().is_empty());
        let timeout = vars
            .get(Self::TIMEOUT_ENV)
            .and_then(|v| humantime::parse_duration(v.trim()).ok());

        Ok(Self {
            provider,
            endpoint,
            api_key,
            timeout,
        })
    }
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            provider: "http".to_string(),
            endpoint: None,
            api_key: None,
            timeout: None,
        }
    }
}
