// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{CandidateRecord, MatchQuery, MatchThresholds, MatchWeights, RateRecord, ScoredMatch, StoreLink};
pub use requests::{CompetitiveRatesRequest, ReconcileRequest, RecordLinkRequest};
pub use responses::{CompetitiveRatesResponse, ErrorResponse, HealthResponse, ReconcileResponse, RecordLinkResponse};
