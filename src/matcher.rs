// Topic matcher: keyword overlap relevance between a paper and a topic.
//
//   corpus     = lowercase(title + " " + abstract)
//   hits       = distinct keywords that occur in corpus as literal substrings
//   relevance  = min(2.0 * |hits|, 10.0)
//   matched    = relevance >= 6.0
//
// Substring semantics are intentional: "gan" hits "organism". Existing
// keyword lists are tuned against this behavior.

use crate::config::MatcherConfig;
use crate::error::Result;
use crate::topics::Topic;
use crate::types::{MatchedBy, PaperText, PaperTopicMatch, TopicRelevance};
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct TopicMatcher {
    config: MatcherConfig,
}

impl TopicMatcher {
    pub fn new(config: MatcherConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Relevance in [0, max_relevance] of `title + abstract` to a keyword set.
    pub fn relevance<I, S>(&self, title: &str, abstract_text: &str, keywords: I) -> f64
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let corpus = format!("{} {}", title, abstract_text).to_lowercase();
        self.relevance_from_hits(matched_in_corpus(&corpus, keywords).len())
    }

    pub fn is_match(&self, relevance: f64) -> bool {
        relevance >= self.config.match_threshold
    }

    fn relevance_from_hits(&self, hits: usize) -> f64 {
        (hits as f64 * self.config.points_per_keyword).min(self.config.max_relevance)
    }

    /// Score one paper against one topic, keeping the keywords that hit.
    pub fn score_topic(&self, text: &PaperText, topic: &Topic) -> TopicRelevance {
        self.score_corpus(&text.corpus(), topic)
    }

    /// Independent relevance for every topic, in topic order. No normalization
    /// across topics; any number of them may match.
    pub fn match_topics(&self, text: &PaperText, topics: &[Topic]) -> Vec<TopicRelevance> {
        let corpus = text.corpus();
        topics
            .iter()
            .map(|topic| self.score_corpus(&corpus, topic))
            .collect()
    }

    fn score_corpus(&self, corpus: &str, topic: &Topic) -> TopicRelevance {
        let hits = matched_in_corpus(corpus, topic.keywords());
        let relevance = self.relevance_from_hits(hits.len());
        TopicRelevance {
            topic: topic.name().to_string(),
            relevance,
            matched_keywords: hits,
            is_match: self.is_match(relevance),
        }
    }

    /// Highest-relevance topic; ties go to the earliest topic in the list.
    /// The result may be below the match threshold.
    pub fn best_topic(&self, text: &PaperText, topics: &[Topic]) -> Option<TopicRelevance> {
        let mut best: Option<TopicRelevance> = None;
        for candidate in self.match_topics(text, topics) {
            if best.as_ref().map_or(true, |b| candidate.relevance > b.relevance) {
                best = Some(candidate);
            }
        }
        best
    }

    /// Rows to persist for a paper: one per matching topic, never below the
    /// threshold, unique per topic.
    pub fn matches_for_paper(
        &self,
        paper_id: &str,
        text: &PaperText,
        topics: &[Topic],
    ) -> Vec<PaperTopicMatch> {
        let mut seen = HashSet::new();
        self.match_topics(text, topics)
            .into_iter()
            .filter(|r| r.is_match)
            .filter(|r| seen.insert(r.topic.clone()))
            .map(|r| PaperTopicMatch {
                paper_id: paper_id.to_string(),
                topic_id: r.topic,
                relevance_score: r.relevance,
                matched_by: MatchedBy::Manual,
            })
            .collect()
    }
}

/// Distinct lower-cased keywords found in an already lower-cased corpus,
/// in first-seen keyword order. Blank keywords never match.
pub fn matched_in_corpus<I, S>(corpus: &str, keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut hits = Vec::new();
    for kw in keywords {
        let kw = kw.as_ref().to_lowercase();
        if kw.trim().is_empty() || seen.contains(&kw) {
            continue;
        }
        if corpus.contains(kw.as_str()) {
            seen.insert(kw.clone());
            hits.push(kw);
        }
    }
    hits
}

/// Relevance with the default scale.
pub fn relevance<I, S>(title: &str, abstract_text: &str, keywords: I) -> f64
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    TopicMatcher::default().relevance(title, abstract_text, keywords)
}
