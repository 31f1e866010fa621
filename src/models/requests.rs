use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to reconcile a subject store against the CRM extract
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReconcileRequest {
    #[serde(alias = "target_store_name", rename = "targetStoreName", default)]
    pub target_store_name: Option<String>,
    #[validate(length(min = 1))]
    #[serde(alias = "target_street", rename = "targetStreet")]
    pub target_street: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(alias = "postal_code", rename = "postalCode", default)]
    pub postal_code: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u16,
}

fn default_limit() -> u16 {
    10
}

/// Request to record an accepted reconciliation
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordLinkRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "subject_store_id", rename = "subjectStoreId")]
    pub subject_store_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "crm_record_id", rename = "crmRecordId")]
    pub crm_record_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "brand_name", rename = "brandName")]
    pub brand_name: String,
    #[serde(alias = "extracted_street", rename = "extractedStreet", default)]
    pub extracted_street: String,
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(alias = "combined_score", rename = "combinedScore")]
    pub combined_score: f64,
}

/// Request for competitive rates around a postal code
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CompetitiveRatesRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "postal_code", rename = "postalCode")]
    pub postal_code: String,
    #[validate(range(min = 0.1, max = 50.0))]
    #[serde(alias = "radius_miles", rename = "radiusMiles", default = "default_radius")]
    pub radius_miles: f64,
    #[serde(alias = "unit_size", rename = "unitSize", default)]
    pub unit_size: Option<String>,
    /// Drop any cached copy and hit the provider directly
    #[serde(default)]
    pub refresh: bool,
}

fn default_radius() -> f64 {
    5.0
}
