use crate::models::CandidateRecord;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when querying the CRM extract
#[derive(Debug, Error)]
pub enum CrmError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// CRM extract client
///
/// Fetches raw account records for the reconciliation engine. The records
/// are noisy by nature (free-text names, loosely encoded addresses); this
/// client only fetches and decodes, all interpretation happens in the core.
pub struct CrmClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl CrmClient {
    /// Create a new CRM client
    pub fn new(base_url: String, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            client,
        }
    }

    /// Fetch candidate records matching a search term
    ///
    /// City and state narrow the CRM query itself; they play no part in
    /// scoring. Rows that fail to decode are skipped rather than failing
    /// the whole fetch, since partial data is the norm for this source.
    pub async fn fetch_candidates(
        &self,
        search_term: &str,
        city: Option<&str>,
        state: Option<&str>,
        limit: usize,
    ) -> Result<Vec<CandidateRecord>, CrmError> {
        let mut params = vec![
            format!("search={}", urlencoding::encode(search_term)),
            format!("limit={}", limit),
        ];
        if let Some(city) = city {
            params.push(format!("city={}", urlencoding::encode(city)));
        }
        if let Some(state) = state {
            params.push(format!("state={}", urlencoding::encode(state)));
        }

        let url = format!(
            "{}/api/accounts?{}",
            self.base_url.trim_end_matches('/'),
            params.join("&")
        );

        tracing::debug!("Fetching CRM candidates from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(CrmError::Unauthorized);
        }
        if !response.status().is_success() {
            return Err(CrmError::ApiError(format!(
                "Failed to query candidates: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        let total = json.get("total").and_then(|t| t.as_u64()).unwrap_or(0);

        let rows = json
            .get("records")
            .and_then(|r| r.as_array())
            .ok_or_else(|| CrmError::InvalidResponse("Missing records array".into()))?;

        let candidates: Vec<CandidateRecord> = rows
            .iter()
            .filter_map(|row| serde_json::from_value(row.clone()).ok())
            .collect();

        tracing::debug!(
            "Queried {} CRM candidates for {:?} (total: {})",
            candidates.len(),
            search_term,
            total
        );

        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crm_client_creation() {
        let client = CrmClient::new("https://crm.test/v1".to_string(), "test_key".to_string());

        assert_eq!(client.base_url, "https://crm.test/v1");
        assert_eq!(client.api_key, "test_key");
    }

    #[tokio::test]
    async fn test_fetch_candidates_decodes_loose_records() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock(
                "GET",
                mockito::Matcher::Regex(r"^/api/accounts.*".to_string()),
            )
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"total": 3, "records": [
                    {"recordId": "a1", "name": "Acme Storage - 456 Oak Ave", "yearBuilt": "2005"},
                    {"recordId": "a2", "name": "X", "shippingAddress": "{'street': '789 Pine Rd'}"},
                    {"name": 12345}
                ]}"#,
            )
            .create_async()
            .await;

        let client = CrmClient::new(server.url(), "key".to_string());
        let candidates = client
            .fetch_candidates("Acme", Some("Metro"), None, 50)
            .await
            .unwrap();

        // The record with a non-string name is skipped
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].record_id.as_deref(), Some("a1"));
    }

    #[tokio::test]
    async fn test_fetch_candidates_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock(
                "GET",
                mockito::Matcher::Regex(r"^/api/accounts.*".to_string()),
            )
            .with_status(401)
            .create_async()
            .await;

        let client = CrmClient::new(server.url(), "bad_key".to_string());
        let result = client.fetch_candidates("Acme", None, None, 50).await;

        assert!(matches!(result, Err(CrmError::Unauthorized)));
    }
}
