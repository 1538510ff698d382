//! End-to-end: papers fixture -> hype ranking -> daily snapshots + topic rows.

use chrono::NaiveDate;
use paper_hype::{pipeline, ranking, topics, HypeScoreEngine, Paper, TopicMatcher};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_papers() -> Vec<Paper> {
    let json = std::fs::read_to_string(fixture_dir().join("papers.json")).unwrap();
    serde_json::from_str(&json).unwrap()
}

fn snapshot_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

#[test]
fn ranking_orders_fixture_by_hype() {
    let papers = load_papers();
    let ranked = ranking::rank_papers(&HypeScoreEngine::default(), &papers, snapshot_date());
    let ids: Vec<&str> = ranked.iter().map(|r| r.paper_id.as_str()).collect();
    assert_eq!(ids, vec!["2308.04079", "2003.08934", "2112.10752", "9999.00001"]);
    assert_eq!(ranked[3].hype_score, 0.0);
}

#[test]
fn daily_run_with_system_topics() {
    let papers = load_papers();
    let all = topics::system_topics();
    let report = pipeline::run_daily(
        &HypeScoreEngine::default(),
        &TopicMatcher::default(),
        &papers,
        &all,
        snapshot_date(),
    );

    assert_eq!(report.snapshots.len(), 4);
    assert!(report.snapshots.iter().all(|s| s.snapshot_date == snapshot_date()));
    assert!(report.snapshots.iter().all(|s| (0.0..=1.0).contains(&s.hype_score)));

    let pairs: Vec<(&str, &str)> = report
        .matches
        .iter()
        .map(|m| (m.paper_id.as_str(), m.topic_id.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("2003.08934", "neural rendering"),
            ("2308.04079", "neural rendering"),
            ("2112.10752", "diffusion models"),
        ]
    );
}

#[test]
fn user_topics_extend_the_catalogue() {
    let papers = load_papers();
    let user = topics::load_topics(&fixture_dir().join("topics.toml")).unwrap();
    let all = topics::merge_with_system(user).unwrap();
    let rows = pipeline::assign_topics(&TopicMatcher::default(), &papers, &all);

    let ldm: Vec<&str> = rows
        .iter()
        .filter(|m| m.paper_id == "2112.10752")
        .map(|m| m.topic_id.as_str())
        .collect();
    assert_eq!(ldm, vec!["diffusion models", "image synthesis"]);

    let unique: HashSet<(&str, &str)> = rows
        .iter()
        .map(|m| (m.paper_id.as_str(), m.topic_id.as_str()))
        .collect();
    assert_eq!(unique.len(), rows.len());
    assert!(rows.iter().all(|m| m.relevance_score >= 6.0 && m.relevance_score <= 10.0));
}

#[test]
fn recomputing_a_day_is_idempotent() {
    let papers = load_papers();
    let engine = HypeScoreEngine::default();
    let a = ranking::snapshots(&engine, &papers, snapshot_date());
    let b = ranking::snapshots(&engine, &papers, snapshot_date());
    assert_eq!(a, b);
}
