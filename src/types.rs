use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metrics observed for a paper at one snapshot time.
/// Any field may be absent; an absent metric contributes nothing to the score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_stars: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation_count: Option<i64>,
    /// Net votes, may be negative
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<NaiveDate>,
}

/// Title and abstract of a paper, the text a topic is matched against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaperText {
    pub title: String,
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
}

impl PaperText {
    pub fn new(title: impl Into<String>, abstract_text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            abstract_text: abstract_text.into(),
        }
    }

    /// Lower-cased `title + " " + abstract`.
    pub fn corpus(&self) -> String {
        format!("{} {}", self.title, self.abstract_text).to_lowercase()
    }
}

/// A tracked paper as supplied by the ingestion layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paper {
    pub id: String,
    #[serde(flatten)]
    pub text: PaperText,
    #[serde(flatten)]
    pub metrics: MetricPoint,
}

/// Per-component contributions to a hype score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub stars: f64,
    pub citations: f64,
    pub votes: f64,
    pub recency: f64,
    pub total: f64,
}

/// Hype snapshot row, keyed by `(paper_id, snapshot_date)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub paper_id: String,
    pub snapshot_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_stars: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_count: Option<i64>,
    pub hype_score: f64,
}

impl MetricSnapshot {
    pub fn key(&self) -> (&str, NaiveDate) {
        (self.paper_id.as_str(), self.snapshot_date)
    }
}

/// A paper paired with its hype score, as surfaced in the ranked feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedPaper {
    pub paper_id: String,
    pub title: String,
    pub hype_score: f64,
    pub breakdown: ScoreBreakdown,
}

/// How a paper/topic match was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchedBy {
    Llm,
    Manual,
}

impl fmt::Display for MatchedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchedBy::Llm => write!(f, "llm"),
            MatchedBy::Manual => write!(f, "manual"),
        }
    }
}

/// Relevance of one paper to one topic, whether or not it clears the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicRelevance {
    pub topic: String,
    pub relevance: f64,
    pub matched_keywords: Vec<String>,
    pub is_match: bool,
}

/// Persisted paper/topic association. Only relevance >= the match threshold
/// is ever turned into one of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperTopicMatch {
    pub paper_id: String,
    pub topic_id: String,
    pub relevance_score: f64,
    pub matched_by: MatchedBy,
}
