use crate::models::RateRecord;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors that can occur when talking to the competitive-rate API
#[derive(Debug, Error)]
pub enum RatesError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid client credentials")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Transient failures (connect errors, 5xx) are retried this many times
const MAX_RETRIES: u32 = 2;
const RETRY_BASE_DELAY_MS: u64 = 250;

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Client for the third-party competitive-rate API
///
/// Authenticates with client credentials against the provider's token
/// endpoint. The bearer token is cached in-process and reused until it is
/// within `refresh_margin` of expiry, at which point the next caller
/// refreshes it.
pub struct RatesClient {
    base_url: String,
    client_id: String,
    client_secret: String,
    client: Client,
    token: RwLock<Option<CachedToken>>,
    refresh_margin: Duration,
}

impl RatesClient {
    /// Create a new rate API client
    pub fn new(
        base_url: String,
        client_id: String,
        client_secret: String,
        refresh_margin_secs: u64,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            client_id,
            client_secret,
            client,
            token: RwLock::new(None),
            refresh_margin: Duration::from_secs(refresh_margin_secs),
        }
    }

    /// Query competitive rates around a postal code
    pub async fn query_rates(
        &self,
        postal_code: &str,
        radius_miles: f64,
        unit_size: Option<&str>,
    ) -> Result<Vec<RateRecord>, RatesError> {
        let token = self.bearer_token().await?;

        let mut url = format!(
            "{}/v2/rates?postalCode={}&radiusMiles={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(postal_code),
            radius_miles
        );
        if let Some(size) = unit_size {
            url.push_str(&format!("&unitSize={}", urlencoding::encode(size)));
        }

        let response = self.get_with_retry(&url, &token).await?;
        let json: Value = response.json().await?;

        let total = json.get("total").and_then(|t| t.as_u64()).unwrap_or(0);

        let rows = json
            .get("rates")
            .and_then(|r| r.as_array())
            .ok_or_else(|| RatesError::InvalidResponse("Missing rates array".into()))?;

        // Rows that fail to decode are skipped, not fatal
        let rates: Vec<RateRecord> = rows
            .iter()
            .filter_map(|row| serde_json::from_value(row.clone()).ok())
            .collect();

        tracing::debug!(
            "Fetched {} rates near {} (total: {})",
            rates.len(),
            postal_code,
            total
        );

        Ok(rates)
    }

    /// Return a valid bearer token, refreshing it when inside the margin
    async fn bearer_token(&self) -> Result<String, RatesError> {
        {
            let guard = self.token.read().await;
            if let Some(token) = guard.as_ref() {
                if self.still_fresh(token) {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let mut guard = self.token.write().await;
        // Another task may have refreshed while we waited for the write lock
        if let Some(token) = guard.as_ref() {
            if self.still_fresh(token) {
                return Ok(token.access_token.clone());
            }
        }

        let url = format!("{}/oauth/token", self.base_url.trim_end_matches('/'));

        tracing::debug!("Refreshing rate API token");

        let response = self
            .client
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", &self.client_id),
                ("client_secret", &self.client_secret),
            ])
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(RatesError::Unauthorized);
        }
        if !response.status().is_success() {
            return Err(RatesError::ApiError(format!(
                "Token request failed: {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| RatesError::InvalidResponse(format!("Failed to parse token: {}", e)))?;

        let access_token = token.access_token.clone();
        *guard = Some(CachedToken {
            access_token: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });

        tracing::debug!("Rate API token refreshed (expires in {}s)", token.expires_in);

        Ok(access_token)
    }

    #[inline]
    fn still_fresh(&self, token: &CachedToken) -> bool {
        token.expires_at.saturating_duration_since(Instant::now()) > self.refresh_margin
    }

    /// GET with bounded retry on transient failures
    async fn get_with_retry(&self, url: &str, token: &str) -> Result<reqwest::Response, RatesError> {
        let mut attempt = 0;
        loop {
            let result = self.client.get(url).bearer_auth(token).send().await;

            match result {
                Ok(response) if response.status() == StatusCode::UNAUTHORIZED => {
                    return Err(RatesError::Unauthorized);
                }
                Ok(response) if response.status().is_server_error() && attempt < MAX_RETRIES => {
                    tracing::warn!("Rate API returned {}, retrying", response.status());
                }
                Ok(response) if !response.status().is_success() => {
                    return Err(RatesError::ApiError(format!(
                        "Rate query failed: {}",
                        response.status()
                    )));
                }
                Ok(response) => return Ok(response),
                Err(e) if e.is_connect() && attempt < MAX_RETRIES => {
                    tracing::warn!("Rate API connection failed ({}), retrying", e);
                }
                Err(e) => return Err(e.into()),
            }

            attempt += 1;
            tokio::time::sleep(Duration::from_millis(RETRY_BASE_DELAY_MS << attempt)).await;
        }
    }
}
