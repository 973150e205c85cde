use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Domain-ownership cache and reported-card catalog forwarded to the
/// classifier alongside each inspection record. Both payloads are opaque to
/// this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalogs {
    pub domain_cache: serde_json::Value,
    pub reported_cards: serde_json::Value,
}

impl Default for Catalogs {
    fn default() -> Self {
        Self {
            domain_cache: serde_json::Value::Object(serde_json::Map::new()),
            reported_cards: serde_json::Value::Array(Vec::new()),
        }
    }
}

/// Abstraction over catalog loading so different backends (files, HTTP,
/// in-memory fixtures) can be swapped transparently.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Retrieve the catalogs currently active.
    async fn load_catalogs(&self) -> Result<Catalogs>;
}

/// Loads catalogs from filesystem files (`domain-cache.json` and
/// `reported-cards.json`) located under a base directory.
///
/// A missing file is the "no data" case and defaults to an empty payload;
/// malformed JSON is an error.
pub struct FileCatalogRepository {
    base_path: PathBuf,
    cache: OnceCell<Catalogs>,
}

impl FileCatalogRepository {
    /// Create a repository rooted at the given directory.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            cache: OnceCell::new(),
        }
    }

    fn domain_cache_path(&self) -> PathBuf {
        self.base_path.join("domain-cache.json")
    }

    fn reported_cards_path(&self) -> PathBuf {
        self.base_path.join("reported-cards.json")
    }

    fn load_value(path: &PathBuf, default: serde_json::Value) -> Result<serde_json::Value> {
        if !path.exists() {
            debug!(path = %path.display(), "catalog file absent, using empty payload");
            return Ok(default);
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog file at {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid JSON in catalog file at {}", path.display()))
    }
}

#[async_trait]
impl CatalogRepository for FileCatalogRepository {
    async fn load_catalogs(&self) -> Result<Catalogs> {
        let catalogs = self.cache.get_or_try_init(|| {
            let defaults = Catalogs::default();
            Ok::<_, anyhow::Error>(Catalogs {
                domain_cache: Self::load_value(&self.domain_cache_path(), defaults.domain_cache)?,
                reported_cards: Self::load_value(
                    &self.reported_cards_path(),
                    defaults.reported_cards,
                )?,
            })
        })?;
        Ok(catalogs.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_files_default_to_empty_payloads() {
        let temp = tempfile::tempdir().unwrap();
        let repo = FileCatalogRepository::new(temp.path());
        let catalogs = futures::executor::block_on(repo.load_catalogs()).unwrap();
        assert_eq!(catalogs.domain_cache, json!({}));
        assert_eq!(catalogs.reported_cards, json!([]));
    }

    #[test]
    fn loads_catalog_files() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(
            temp.path().join("domain-cache.json"),
            r#"{"tracker.example": {"owner": "Acme"}}"#,
        )
        .unwrap();
        fs::write(
            temp.path().join("reported-cards.json"),
            r#"[{"cardType": "cookies"}]"#,
        )
        .unwrap();

        let repo = FileCatalogRepository::new(temp.path());
        let catalogs = futures::executor::block_on(repo.load_catalogs()).unwrap();
        assert_eq!(
            catalogs.domain_cache["tracker.example"]["owner"],
            json!("Acme")
        );
        assert_eq!(catalogs.reported_cards[0]["cardType"], json!("cookies"));
    }

    #[test]
    fn malformed_catalog_errors_with_path() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("domain-cache.json"), "{not json").unwrap();
        let repo = FileCatalogRepository::new(temp.path());
        let err = futures::executor::block_on(repo.load_catalogs()).unwrap_err();
        assert!(err.to_string().contains("domain-cache.json"));
    }
}
