use crate::core::{extract::extract_fields, normalize::normalize_street, similarity::similarity};
use crate::models::{CandidateRecord, MatchQuery, MatchThresholds, MatchWeights, ScoredMatch};
use serde_json::Value;

/// Hard cap on returned matches, regardless of the requested limit
pub const MAX_RESULTS: usize = 10;

/// Result of a reconciliation run
#[derive(Debug)]
pub struct MatchResult {
    pub matches: Vec<ScoredMatch>,
    pub total_candidates: usize,
}

/// Store-identity ranker
///
/// # Pipeline stages
/// 1. Field extraction (skip candidates with no comparable street)
/// 2. Name and address similarity scoring
/// 3. Weighted combination and inclusion filter
/// 4. Sort and truncate
#[derive(Debug, Clone, Copy)]
pub struct Matcher {
    weights: MatchWeights,
    thresholds: MatchThresholds,
}

impl Matcher {
    pub fn new(weights: MatchWeights, thresholds: MatchThresholds) -> Self {
        Self {
            weights,
            thresholds,
        }
    }

    pub fn with_defaults() -> Self {
        Self {
            weights: MatchWeights::default(),
            thresholds: MatchThresholds::default(),
        }
    }

    /// Rank CRM candidates against a subject store
    ///
    /// Pure function of its inputs: no hidden state, restartable, and no
    /// input can make it fail. Candidate-level problems degrade to exclusion
    /// or field omission; the only caller-visible "failure" is an empty
    /// result set.
    ///
    /// # Arguments
    /// * `query` - the subject store (street required, name optional)
    /// * `candidates` - raw CRM records, already fetched
    /// * `limit` - maximum matches to return, capped at [`MAX_RESULTS`]
    pub fn rank(
        &self,
        query: &MatchQuery,
        candidates: Vec<CandidateRecord>,
        limit: usize,
    ) -> MatchResult {
        let total_candidates = candidates.len();
        let target_name = query.target_store_name.as_deref().unwrap_or("");
        let query_street = normalize_street(&query.target_street);

        let mut matches: Vec<ScoredMatch> = candidates
            .into_iter()
            // Stage 1: skip candidates with no comparable street
            .filter_map(|record| {
                let fields = extract_fields(&record)?;

                // Stage 2: the better of full-name and brand-only similarity
                let full_name_score = similarity(target_name, &record.name);
                let brand_score = similarity(target_name, &fields.brand);
                let name_score = full_name_score.max(brand_score);

                let candidate_street = normalize_street(&fields.street);
                let address_score = similarity(&query_street, &candidate_street);

                // Stage 3: weighted combination and inclusion filter
                let combined_score =
                    self.weights.name * name_score + self.weights.address * address_score;

                if combined_score > self.thresholds.min_combined
                    || address_score > self.thresholds.strong_address
                {
                    Some(ScoredMatch {
                        crm_record_id: record.record_id.clone(),
                        brand_name: fields.brand,
                        extracted_street: fields.street,
                        name_score,
                        address_score,
                        combined_score,
                        year_built: sanitize_year_built(record.year_built.as_ref()),
                        square_footage: sanitize_square_footage(record.square_footage.as_ref()),
                    })
                } else {
                    None
                }
            })
            .collect();

        // Stage 4: sort by combined score descending. sort_by is stable, so
        // ties keep their input order.
        matches.sort_by(|a, b| {
            b.combined_score
                .partial_cmp(&a.combined_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        matches.truncate(limit.min(MAX_RESULTS));

        MatchResult {
            matches,
            total_candidates,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Accept a year-built value only as an integer in [1900, 2030]
///
/// CRM exports deliver this as a number or a string interchangeably; anything
/// else, or anything out of range, is reported as absent.
fn sanitize_year_built(raw: Option<&Value>) -> Option<i32> {
    let year = match raw? {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };

    (1900..=2030).contains(&year).then_some(year as i32)
}

/// Accept a square-footage value only as a positive finite float
fn sanitize_square_footage(raw: Option<&Value>) -> Option<f64> {
    let sqft = match raw? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    (sqft.is_finite() && sqft > 0.0).then_some(sqft)
}
