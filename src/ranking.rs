// Ranked feed and daily snapshot rows built on the hype score.

use crate::hype::HypeScoreEngine;
use crate::types::{MetricSnapshot, Paper, RankedPaper};
use chrono::NaiveDate;
use rayon::prelude::*;
use std::collections::HashMap;

/// Score every paper and sort by hype descending.
/// Ties keep input order, so the feed is stable across runs.
pub fn rank_papers(
    engine: &HypeScoreEngine,
    papers: &[Paper],
    today: NaiveDate,
) -> Vec<RankedPaper> {
    let mut ranked: Vec<RankedPaper> = papers
        .par_iter()
        .map(|p| {
            let breakdown = engine.breakdown(&p.metrics, today);
            RankedPaper {
                paper_id: p.id.clone(),
                title: p.text.title.clone(),
                hype_score: breakdown.total,
                breakdown,
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.hype_score.total_cmp(&a.hype_score));
    ranked
}

/// One snapshot row per paper for `snapshot_date`. A paper id seen twice
/// keeps its last observation, matching upsert semantics on the
/// `(paper_id, snapshot_date)` key.
pub fn snapshots(
    engine: &HypeScoreEngine,
    papers: &[Paper],
    snapshot_date: NaiveDate,
) -> Vec<MetricSnapshot> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<MetricSnapshot> = Vec::with_capacity(papers.len());

    for paper in papers {
        let row = MetricSnapshot {
            paper_id: paper.id.clone(),
            snapshot_date,
            github_stars: paper.metrics.github_stars,
            citation_count: paper.metrics.citation_count,
            vote_count: paper.metrics.vote_count,
            hype_score: engine.compute_point(&paper.metrics, snapshot_date),
        };
        match index.get(paper.id.as_str()) {
            Some(&i) => {
                tracing::debug!(
                    paper_id = %paper.id,
                    "duplicate paper in batch, keeping latest metrics"
                );
                rows[i] = row;
            }
            None => {
                index.insert(paper.id.as_str(), rows.len());
                rows.push(row);
            }
        }
    }
    rows
}
