// Unit tests for StoreMatch

use storematch::core::{
    extract::extract_fields, normalize::normalize_street, similarity::similarity,
};
use storematch::models::CandidateRecord;
use serde_json::{json, Value};

fn candidate(name: &str, shipping_address: Option<Value>) -> CandidateRecord {
    CandidateRecord {
        record_id: None,
        name: name.to_string(),
        shipping_address,
        year_built: None,
        square_footage: None,
    }
}

#[test]
fn test_normalize_canonical_example() {
    assert_eq!(normalize_street("123 North Main Street"), "123 n main st");
}

#[test]
fn test_normalize_idempotent() {
    let once = normalize_street("456 Oak Avenue, Apt. #3");
    assert_eq!(normalize_street(&once), once);
}

#[test]
fn test_normalize_never_fails_on_odd_input() {
    assert_eq!(normalize_street(""), "");
    assert_eq!(normalize_street("###"), "");
    assert_eq!(normalize_street("   .,#   "), "");
}

#[test]
fn test_similarity_identity() {
    for s in ["acme", "456 oak ave", "a longer test string"] {
        assert_eq!(similarity(s, s), 1.0);
    }
}

#[test]
fn test_similarity_empty_is_zero() {
    assert_eq!(similarity("", "acme"), 0.0);
    assert_eq!(similarity("acme", ""), 0.0);
}

#[test]
fn test_similarity_symmetric() {
    let pairs = [
        ("acme storage", "acme self storage"),
        ("456 oak ave", "465 oak ave"),
        ("abc", "xyz"),
    ];
    for (a, b) in pairs {
        assert!((similarity(a, b) - similarity(b, a)).abs() < 1e-12);
    }
}

#[test]
fn test_similarity_containment_ratio() {
    // 12 chars contained inside 18
    let score = similarity("acme storage", "acme storage metro");
    assert!((score - 12.0 / 18.0).abs() < 1e-9, "got {}", score);
}

#[test]
fn test_extractor_name_tail_with_address() {
    let fields = extract_fields(&candidate("Acme Storage - 456 Oak Ave", None)).unwrap();
    assert_eq!(fields.brand, "Acme Storage");
    assert_eq!(fields.street, "456 Oak Ave");
}

#[test]
fn test_extractor_name_tail_without_address() {
    assert!(extract_fields(&candidate("Acme Storage - Downtown", None)).is_none());
}

#[test]
fn test_extractor_loose_dialect() {
    let addr = Value::String("{'street': '789 Pine Rd', 'city': 'Metro'}".to_string());
    let fields = extract_fields(&candidate("X", Some(addr))).unwrap();
    assert_eq!(fields.brand, "X");
    assert_eq!(fields.street, "789 Pine Rd");
}

#[test]
fn test_extractor_strict_json_object() {
    let fields = extract_fields(&candidate(
        "X",
        Some(json!({"street": "789 Pine Rd", "city": "Metro"})),
    ))
    .unwrap();
    assert_eq!(fields.street, "789 Pine Rd");
}

#[test]
fn test_extractor_no_signal_at_all() {
    assert!(extract_fields(&candidate("Just A Brand", None)).is_none());
}
