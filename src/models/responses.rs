use crate::models::domain::{RateRecord, ScoredMatch};
use serde::{Deserialize, Serialize};

/// Response for the reconcile endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileResponse {
    pub matches: Vec<ScoredMatch>,
    pub total_candidates: usize,
}

/// Response for the competitive rates endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitiveRatesResponse {
    pub rates: Vec<RateRecord>,
    pub total_results: usize,
    pub cached: bool,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Record link response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordLinkResponse {
    pub success: bool,
    pub link_id: String,
}
