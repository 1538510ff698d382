use chrono::{Duration, NaiveDate};
use paper_hype::config::ScoringConfig;
use paper_hype::hype::{self, HypeScoreEngine};
use paper_hype::MetricPoint;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
}

// --- range and identity properties ---

#[test]
fn all_null_metrics_score_exactly_zero() {
    assert_eq!(hype::compute(None, None, None, None, today()), 0.0);
}

#[test]
fn score_in_unit_interval_for_mixed_inputs() {
    let cases = [
        (Some(0), Some(0), Some(0)),
        (Some(3), None, Some(-100)),
        (None, Some(250_000), None),
        (Some(i64::MAX), Some(i64::MAX), Some(i64::MAX)),
        (Some(1), Some(1), Some(i64::MIN)),
    ];
    for (stars, citations, votes) in cases {
        for offset in [-5_000i64, -1, 0, 1, 365, 50_000] {
            let d = Some(today() - Duration::days(offset));
            let s = hype::compute(stars, citations, votes, d, today());
            assert!((0.0..=1.0).contains(&s), "{:?} -> {}", (stars, citations, votes, offset), s);
        }
    }
}

// --- monotonicity ---

#[test]
fn doubling_stars_never_lowers_score() {
    let d = Some(today() - Duration::days(10));
    let low = hype::compute(Some(100), Some(5), Some(2), d, today());
    let high = hype::compute(Some(200), Some(5), Some(2), d, today());
    assert!(high >= low);
}

#[test]
fn more_citations_never_lowers_score() {
    let low = hype::compute(None, Some(100), None, None, today());
    let high = hype::compute(None, Some(200), None, None, today());
    assert!(high > low);
}

#[test]
fn more_votes_never_lowers_score() {
    let low = hype::compute(None, None, Some(10), None, today());
    let high = hype::compute(None, None, Some(20), None, today());
    assert!(high > low);
}

#[test]
fn negative_votes_match_zero_votes() {
    let d = Some(today());
    assert_eq!(
        hype::compute(Some(10), Some(10), Some(-5), d, today()),
        hype::compute(Some(10), Some(10), Some(0), d, today())
    );
}

// --- recency ---

#[test]
fn recency_halves_after_one_year() {
    let engine = HypeScoreEngine::default();
    let point = MetricPoint {
        published_date: Some(today() - Duration::days(365)),
        ..MetricPoint::default()
    };
    let b = engine.breakdown(&point, today());
    assert!((b.recency - 0.05).abs() < 1e-9);
    assert_eq!(b.stars, 0.0);
}

#[test]
fn recency_full_on_publication_day() {
    let s = hype::compute(None, None, None, Some(today()), today());
    assert!((s - 0.10).abs() < 1e-9);
}

// --- ranking scenario ---

#[test]
fn trending_paper_rises_above_older_one() {
    let trending = hype::compute(Some(1000), Some(100), Some(50), Some(today()), today());
    let older = hype::compute(
        Some(100),
        Some(10),
        Some(5),
        Some(today() - Duration::days(400)),
        today(),
    );
    assert!(trending > older, "{} should exceed {}", trending, older);
}

#[test]
fn engine_with_custom_weights_respects_them() {
    let config = ScoringConfig {
        star_weight: 1.0,
        citation_weight: 0.0,
        vote_weight: 0.0,
        recency_weight: 0.0,
        ..ScoringConfig::default()
    };
    let engine = HypeScoreEngine::new(config).unwrap();
    let s = engine.compute(Some(100_000), Some(100_000), Some(1_000), Some(today()), today());
    assert!((s - 1.0).abs() < 1e-4);
    assert_eq!(engine.compute(None, Some(100_000), Some(1_000), Some(today()), today()), 0.0);
}
