// Integration tests for StoreMatch

use serde_json::{json, Value};
use storematch::core::{Matcher, MAX_RESULTS};
use storematch::models::{CandidateRecord, MatchQuery};
use storematch::services::export::matches_to_csv;

fn candidate(name: &str, shipping_address: Option<Value>) -> CandidateRecord {
    CandidateRecord {
        record_id: None,
        name: name.to_string(),
        shipping_address,
        year_built: None,
        square_footage: None,
    }
}

fn query(name: Option<&str>, street: &str) -> MatchQuery {
    MatchQuery {
        target_store_name: name.map(str::to_string),
        target_street: street.to_string(),
        city: Some("Metro".to_string()),
        state: Some("CA".to_string()),
        postal_code: Some("90210".to_string()),
    }
}

#[test]
fn test_end_to_end_reconciliation() {
    let matcher = Matcher::with_defaults();

    let candidates = vec![
        // Exact match once normalized
        candidate("Acme Storage - 456 Oak Ave", None),
        // Structured address, same street spelled out
        candidate(
            "Acme Self Storage",
            Some(json!({"street": "456 Oak Avenue"})),
        ),
        // Same brand, different street
        candidate("Acme Storage - 12 Elm St", None),
        // No comparable address: excluded before scoring
        candidate("Acme Storage - Downtown", None),
        // Unrelated everything: filtered out by thresholds
        candidate("Zebra Warehousing - 9999 Industrial Pkwy 42", None),
    ];

    let result = matcher.rank(
        &query(Some("Acme Storage"), "456 Oak Avenue"),
        candidates,
        10,
    );

    assert_eq!(result.total_candidates, 5);
    assert!(result.matches.len() >= 2, "expected the two Oak Ave stores");

    // Both Oak Ave candidates outrank the Elm St one
    assert_eq!(result.matches[0].address_score, 1.0);
    assert_eq!(result.matches[1].address_score, 1.0);

    // Sorted by combined score
    for pair in result.matches.windows(2) {
        assert!(pair[0].combined_score >= pair[1].combined_score);
    }

    // Neither the address-less nor the unrelated candidate appears
    for m in &result.matches {
        assert!(!m.brand_name.contains("Zebra"));
        assert_ne!(m.extracted_street, "");
    }
}

#[test]
fn test_combined_score_invariant() {
    let matcher = Matcher::with_defaults();
    let candidates = vec![candidate("Acme Storage - 456 Oak Ave", None)];

    let result = matcher.rank(&query(Some("Acme"), "456 Oak Avenue"), candidates, 10);

    let m = &result.matches[0];
    let expected = 0.4 * m.name_score + 0.6 * m.address_score;
    assert!((m.combined_score - expected).abs() < 1e-12);
    assert!((0.0..=1.0).contains(&m.name_score));
    assert!((0.0..=1.0).contains(&m.address_score));
}

#[test]
fn test_low_relevance_candidates_never_appear() {
    let matcher = Matcher::with_defaults();

    // Scores below both thresholds must be dropped even with room to spare
    let candidates = vec![
        candidate("Qqqqq Zzzzz - 777777 Qwerty Plaza 3", None),
        candidate("Acme Storage - 456 Oak Ave", None),
    ];

    let result = matcher.rank(&query(Some("Acme Storage"), "456 Oak Avenue"), candidates, 10);

    for m in &result.matches {
        assert!(
            m.combined_score > 0.3 || m.address_score > 0.5,
            "candidate {:?} fails both inclusion thresholds",
            m.brand_name
        );
    }
}

#[test]
fn test_result_cap() {
    let matcher = Matcher::with_defaults();

    let candidates: Vec<CandidateRecord> = (0..40)
        .map(|i| candidate(&format!("Acme Storage {}", i), Some(json!({"street": "456 Oak Avenue"}))))
        .collect();

    let result = matcher.rank(&query(Some("Acme Storage"), "456 Oak Ave"), candidates, 50);

    assert_eq!(result.matches.len(), MAX_RESULTS);
    assert_eq!(result.total_candidates, 40);
}

#[test]
fn test_metadata_recovery_through_ranking() {
    let matcher = Matcher::with_defaults();

    let mut record = candidate("Acme Storage - 456 Oak Ave", None);
    record.year_built = Some(json!("2005"));
    record.square_footage = Some(json!(42000.0));

    let mut stale = candidate("Acme Storage North - 456 Oak Ave", None);
    stale.year_built = Some(json!("1850"));

    let result = matcher.rank(
        &query(Some("Acme Storage"), "456 Oak Avenue"),
        vec![record, stale],
        10,
    );

    let top = &result.matches[0];
    assert_eq!(top.year_built, Some(2005));
    assert_eq!(top.square_footage, Some(42000.0));

    // Out-of-range year is absent, the match itself survives
    let second = &result.matches[1];
    assert_eq!(second.year_built, None);
}

#[test]
fn test_reconcile_then_export_round_trip() {
    let matcher = Matcher::with_defaults();
    let q = query(Some("Acme Storage"), "456 Oak Avenue");

    let candidates = vec![
        candidate("Acme Storage - 456 Oak Ave", None),
        candidate("Acme Storage - 12 Elm St", None),
    ];

    let result = matcher.rank(&q, candidates, 10);
    let csv = matches_to_csv(&q, &result.matches).unwrap();

    let lines: Vec<&str> = csv.lines().collect();
    // Header plus one row per match
    assert_eq!(lines.len(), result.matches.len() + 1);
    assert!(lines[1].contains("456 Oak Ave"));
}

#[test]
fn test_rank_is_restartable() {
    let matcher = Matcher::with_defaults();
    let q = query(Some("Acme Storage"), "456 Oak Avenue");

    let make_candidates = || {
        vec![
            candidate("Acme Storage - 456 Oak Ave", None),
            candidate("Acme Self Storage", Some(json!({"street": "456 Oak Avenue"}))),
        ]
    };

    let first = matcher.rank(&q, make_candidates(), 10);
    let second = matcher.rank(&q, make_candidates(), 10);

    assert_eq!(first.matches.len(), second.matches.len());
    for (a, b) in first.matches.iter().zip(second.matches.iter()) {
        assert_eq!(a.brand_name, b.brand_name);
        assert_eq!(a.combined_score, b.combined_score);
    }
}
