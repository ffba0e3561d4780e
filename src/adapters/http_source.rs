use crate::adapters::mapping::records_from_json;
use crate::domain::model::{Record, RecordKind};
use crate::domain::ports::RecordSource;
use crate::utils::cache::TtlCache;
use crate::utils::error::FetchError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;

pub const REGULATORY_UPDATES_PATH: &str = "regulatory-updates";
pub const LEGAL_CASES_PATH: &str = "legal-cases";

/// Pulls record snapshots from the platform REST API.
///
/// Responses are cached per endpoint when a cache is attached; an empty
/// answer is cached like any other.
pub struct HttpRecordSource {
    client: Client,
    base_url: String,
    cache: Option<Arc<TtlCache<Vec<Record>>>>,
}

impl HttpRecordSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<TtlCache<Vec<Record>>>) -> Self {
        self.cache = Some(cache);
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn fetch(&self, path: &str, kind: RecordKind) -> Result<Vec<Record>, FetchError> {
        let endpoint = self.endpoint(path);

        if let Some(cache) = &self.cache {
            if let Some(records) = cache.get(&endpoint).await {
                tracing::debug!("Cache hit for {} ({} records)", endpoint, records.len());
                return Ok(records);
            }
        }

        tracing::debug!("Making API request to: {}", endpoint);
        let response = self
            .client
            .get(&endpoint)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                endpoint: endpoint.clone(),
                source,
            })?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);
        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        let payload: Value = response.json().await.map_err(|e| FetchError::Decode {
            origin: endpoint.clone(),
            message: e.to_string(),
        })?;
        let records = records_from_json(&payload, kind);

        if let Some(cache) = &self.cache {
            tracing::debug!(
                "Caching {} records for {} (ttl {:?})",
                records.len(),
                endpoint,
                cache.ttl()
            );
            cache.insert(endpoint.clone(), records.clone()).await;
        }

        Ok(records)
    }
}

#[async_trait]
impl RecordSource for HttpRecordSource {
    fn describe(&self) -> String {
        format!("api {}", self.base_url)
    }

    async fn get_all_regulatory_updates(&self) -> Result<Vec<Record>, FetchError> {
        self.fetch(REGULATORY_UPDATES_PATH, RecordKind::RegulatoryUpdate)
            .await
    }

    async fn get_all_legal_cases(&self) -> Result<Vec<Record>, FetchError> {
        self.fetch(LEGAL_CASES_PATH, RecordKind::LegalCase).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fetch_regulatory_updates() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/api/regulatory-updates");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([
                    {"id": "ru-1", "title": "FDA clears pump", "authority": "FDA"},
                    {"id": "ru-2", "title": "EMA guideline", "authority": "EMA"}
                ]));
        });

        let source = HttpRecordSource::new(server.url("/api/"));
        let records = source.get_all_regulatory_updates().await.unwrap();

        api_mock.assert();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].authority.as_deref(), Some("EMA"));
    }

    #[tokio::test]
    async fn test_fetch_legal_cases_wrapped_payload() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/legal-cases");
            then.status(200).json_body(serde_json::json!({
                "success": true,
                "data": [{"id": "lc-1", "title": "Case", "court": "BGH"}]
            }));
        });

        let source = HttpRecordSource::new(server.base_url());
        let records = source.get_all_legal_cases().await.unwrap();

        api_mock.assert();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, RecordKind::LegalCase);
    }

    #[tokio::test]
    async fn test_server_error_is_reported_not_swallowed() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/regulatory-updates");
            then.status(500);
        });

        let source = HttpRecordSource::new(server.base_url());
        let err = source.get_all_regulatory_updates().await.unwrap_err();

        api_mock.assert();
        assert!(matches!(err, FetchError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/regulatory-updates");
            then.status(200).body("<html>maintenance</html>");
        });

        let source = HttpRecordSource::new(server.base_url());
        let err = source.get_all_regulatory_updates().await.unwrap_err();

        assert!(matches!(err, FetchError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_cached_responses_skip_the_network() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/regulatory-updates");
            then.status(200).json_body(serde_json::json!([]));
        });

        let cache = Arc::new(TtlCache::new(Duration::from_secs(60), 16));
        let source = HttpRecordSource::new(server.base_url()).with_cache(Arc::clone(&cache));

        assert!(source.get_all_regulatory_updates().await.unwrap().is_empty());
        assert!(source.get_all_regulatory_updates().await.unwrap().is_empty());

        api_mock.assert_hits(1);
        assert_eq!(cache.stats().await.hits, 1);
    }
}
