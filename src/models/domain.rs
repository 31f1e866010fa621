use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw candidate record from the CRM extract
///
/// Everything in here is untrusted: `shippingAddress` may be a structured
/// object, a loosely-quoted textual encoding of one, or absent entirely, and
/// the numeric fields may arrive as strings or garbage. Records are consumed
/// once per query and never mutated or persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    #[serde(rename = "recordId", default)]
    pub record_id: Option<String>,
    pub name: String,
    #[serde(rename = "shippingAddress", default)]
    pub shipping_address: Option<Value>,
    #[serde(rename = "yearBuilt", default)]
    pub year_built: Option<Value>,
    #[serde(rename = "squareFootage", default)]
    pub square_footage: Option<Value>,
}

/// The caller's search key for a reconciliation run
///
/// City/state/postal are carried through to display and export but do not
/// participate in scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchQuery {
    #[serde(rename = "targetStoreName", default)]
    pub target_store_name: Option<String>,
    #[serde(rename = "targetStreet")]
    pub target_street: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(rename = "postalCode", default)]
    pub postal_code: Option<String>,
}

/// Scored reconciliation result
///
/// `combined_score` is always `weights.name * name_score +
/// weights.address * address_score`, each input score in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredMatch {
    #[serde(rename = "crmRecordId")]
    pub crm_record_id: Option<String>,
    #[serde(rename = "brandName")]
    pub brand_name: String,
    #[serde(rename = "extractedStreet")]
    pub extracted_street: String,
    #[serde(rename = "nameScore")]
    pub name_score: f64,
    #[serde(rename = "addressScore")]
    pub address_score: f64,
    #[serde(rename = "combinedScore")]
    pub combined_score: f64,
    #[serde(rename = "yearBuilt")]
    pub year_built: Option<i32>,
    #[serde(rename = "squareFootage")]
    pub square_footage: Option<f64>,
}

/// Competitive rate row from the third-party pricing API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateRecord {
    #[serde(rename = "storeName")]
    pub store_name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(rename = "postalCode", default)]
    pub postal_code: Option<String>,
    #[serde(rename = "unitSize")]
    pub unit_size: String,
    #[serde(rename = "climateControlled", default)]
    pub climate_controlled: bool,
    #[serde(rename = "streetRate")]
    pub street_rate: f64,
    #[serde(rename = "webRate", default)]
    pub web_rate: Option<f64>,
    #[serde(default)]
    pub promo: Option<String>,
}

/// Confirmed link between a subject store and a CRM record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreLink {
    #[serde(rename = "subjectStoreId")]
    pub subject_store_id: String,
    #[serde(rename = "crmRecordId")]
    pub crm_record_id: String,
    #[serde(rename = "brandName")]
    pub brand_name: String,
    #[serde(rename = "extractedStreet")]
    pub extracted_street: String,
    #[serde(rename = "combinedScore")]
    pub combined_score: f64,
    #[serde(rename = "linkedAt")]
    pub linked_at: chrono::DateTime<chrono::Utc>,
}

/// Score combination weights
#[derive(Debug, Clone, Copy)]
pub struct MatchWeights {
    pub name: f64,
    pub address: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            name: 0.4,
            address: 0.6,
        }
    }
}

/// Inclusion thresholds for the ranker
///
/// A candidate survives if its combined score clears `min_combined` or its
/// address score alone clears `strong_address`, so a strong address match
/// can outlive a rebrand.
#[derive(Debug, Clone, Copy)]
pub struct MatchThresholds {
    pub min_combined: f64,
    pub strong_address: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            min_combined: 0.3,
            strong_address: 0.5,
        }
    }
}
