// Criterion benchmarks for StoreMatch

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use storematch::core::{normalize_street, similarity, Matcher};
use storematch::models::{CandidateRecord, MatchQuery};

fn create_candidate(id: usize) -> CandidateRecord {
    // Mix the three extraction shapes the CRM actually produces
    let shipping_address = match id % 3 {
        0 => Some(json!({"street": format!("{} Oak Avenue", 100 + id)})),
        1 => Some(json!(format!("{{'street': '{} Pine Rd'}}", 200 + id))),
        _ => None,
    };

    CandidateRecord {
        record_id: Some(format!("crm-{}", id)),
        name: format!("Acme Storage {} - {} Oak Ave", id, 100 + id),
        shipping_address,
        year_built: Some(json!(format!("{}", 1990 + (id % 30)))),
        square_footage: Some(json!(20000.0 + id as f64)),
    }
}

fn create_query() -> MatchQuery {
    MatchQuery {
        target_store_name: Some("Acme Storage".to_string()),
        target_street: "456 Oak Avenue".to_string(),
        city: Some("Metro".to_string()),
        state: Some("CA".to_string()),
        postal_code: Some("90210".to_string()),
    }
}

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("normalize_street", |b| {
        b.iter(|| normalize_street(black_box("4650 Northwest Industrial Boulevard, Suite #210")));
    });
}

fn bench_similarity(c: &mut Criterion) {
    c.bench_function("similarity_edit_distance", |b| {
        b.iter(|| {
            similarity(
                black_box("acme self storage of metro"),
                black_box("acme storage metro west"),
            )
        });
    });

    c.bench_function("similarity_containment", |b| {
        b.iter(|| similarity(black_box("acme storage"), black_box("acme storage of metro")));
    });
}

fn bench_ranking(c: &mut Criterion) {
    let matcher = Matcher::with_defaults();
    let query = create_query();

    let mut group = c.benchmark_group("ranking");

    for candidate_count in [10, 50, 100, 500].iter() {
        let candidates: Vec<CandidateRecord> =
            (0..*candidate_count).map(create_candidate).collect();

        group.bench_with_input(
            BenchmarkId::new("rank", candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| {
                    matcher.rank(
                        black_box(&query),
                        black_box(candidates.clone()),
                        black_box(10),
                    )
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_normalize, bench_similarity, bench_ranking);

criterion_main!(benches);
