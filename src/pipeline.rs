// Daily job: score every paper, then assign topics.
//
// The engines are independent; this module only sequences them per paper
// and shapes the rows the storage layer persists.

use crate::hype::HypeScoreEngine;
use crate::llm::{self, LlmBackend};
use crate::matcher::TopicMatcher;
use crate::ranking;
use crate::topics::Topic;
use crate::types::{MetricSnapshot, Paper, PaperText, PaperTopicMatch};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;

/// Rows produced by one daily run.
#[derive(Debug, Clone, Serialize)]
pub struct DailyReport {
    pub snapshot_date: NaiveDate,
    pub snapshots: Vec<MetricSnapshot>,
    pub matches: Vec<PaperTopicMatch>,
}

/// Keyword topic assignment for a batch. Rows are unique per
/// (paper, topic) and ordered by paper, then topic list order.
pub fn assign_topics(
    matcher: &TopicMatcher,
    papers: &[Paper],
    topics: &[Topic],
) -> Vec<PaperTopicMatch> {
    let per_paper: Vec<Vec<PaperTopicMatch>> = papers
        .par_iter()
        .map(|p| matcher.matches_for_paper(&p.id, &p.text, topics))
        .collect();

    dedupe_matches(per_paper.into_iter().flatten())
}

fn dedupe_matches(rows: impl IntoIterator<Item = PaperTopicMatch>) -> Vec<PaperTopicMatch> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|m| seen.insert((m.paper_id.clone(), m.topic_id.clone())))
        .collect()
}

/// Keyword matches first; topics the keywords missed go to the model.
/// A failed or unparseable completion falls back to the keyword rows.
pub fn assign_with_llm(
    backend: &dyn LlmBackend,
    matcher: &TopicMatcher,
    paper_id: &str,
    text: &PaperText,
    topics: &[Topic],
) -> Vec<PaperTopicMatch> {
    let keyword_rows = matcher.matches_for_paper(paper_id, text, topics);
    let matched: HashSet<&str> = keyword_rows.iter().map(|m| m.topic_id.as_str()).collect();
    let remaining: Vec<Topic> = topics
        .iter()
        .filter(|t| !matched.contains(t.name()))
        .cloned()
        .collect();

    let llm_rows = match llm::judge(backend, text, &remaining) {
        Ok(judgments) => {
            llm::judgments_to_matches(paper_id, &judgments, matcher.config().match_threshold)
        }
        Err(e) => {
            tracing::warn!(paper_id, error = %e, "LLM relevance failed, keeping keyword matches");
            Vec::new()
        }
    };

    dedupe_matches(keyword_rows.into_iter().chain(llm_rows))
}

/// Score and assign a whole batch for `snapshot_date`.
pub fn run_daily(
    engine: &HypeScoreEngine,
    matcher: &TopicMatcher,
    papers: &[Paper],
    topics: &[Topic],
    snapshot_date: NaiveDate,
) -> DailyReport {
    let snapshots = ranking::snapshots(engine, papers, snapshot_date);
    let matches = assign_topics(matcher, papers, topics);
    tracing::info!(
        %snapshot_date,
        papers = papers.len(),
        snapshots = snapshots.len(),
        matches = matches.len(),
        "daily run complete"
    );
    DailyReport {
        snapshot_date,
        snapshots,
        matches,
    }
}
