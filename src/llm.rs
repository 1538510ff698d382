// LLM bridge: prompt construction and structured-output parsing for an
// external text-generation service.
//
// Two uses:
//   - translate a free-form question into one read-only SQL query
//   - judge paper/topic relevance when keyword overlap is not enough
//
// Every parse path returns a typed outcome. Malformed completions become
// `LlmOutcome::Error`, never a panic.

use crate::config::MATCH_THRESHOLD;
use crate::error::{HypeError, Result};
use crate::topics::{self, Topic};
use crate::types::{MatchedBy, PaperText, PaperTopicMatch};
use crate::util;
use cli_ai_analyzer::{prompt, AnalyzeOptions};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Prompt templates (loaded from files at compile time).
const QUERY_PROMPT: &str = include_str!("../prompts/query.txt");
const RELEVANCE_PROMPT: &str = include_str!("../prompts/relevance.txt");

pub const DEFAULT_ROW_LIMIT: usize = 100;

/// Tables the query prompt may reference.
pub const DEFAULT_SCHEMA: &str = "\
papers(id TEXT PRIMARY KEY, title TEXT, abstract TEXT, arxiv_id TEXT, github_url TEXT, published_date DATE)
metric_snapshots(paper_id TEXT REFERENCES papers(id), snapshot_date DATE, github_stars INTEGER, citation_count INTEGER, vote_count INTEGER, hype_score REAL, PRIMARY KEY (paper_id, snapshot_date))
topics(id TEXT PRIMARY KEY, name TEXT UNIQUE, is_system BOOLEAN)
topic_keywords(topic_id TEXT REFERENCES topics(id), keyword TEXT)
paper_topic_matches(paper_id TEXT REFERENCES papers(id), topic_id TEXT REFERENCES topics(id), relevance_score REAL CHECK (relevance_score BETWEEN 6.0 AND 10.0), matched_by TEXT CHECK (matched_by IN ('llm', 'manual')), UNIQUE (paper_id, topic_id))
users(id TEXT PRIMARY KEY, username TEXT UNIQUE, created_at TIMESTAMP)
user_topics(user_id TEXT REFERENCES users(id), topic_id TEXT REFERENCES topics(id))";

/// Statement keywords that can change data or schema.
const FORBIDDEN_KEYWORDS: &[&str] = &[
    "insert", "update", "delete", "merge", "upsert", "drop", "alter", "create", "into",
    "truncate", "grant", "revoke", "attach", "detach", "pragma", "copy", "vacuum",
    "reindex", "call", "exec", "execute",
];

/// The accepted shapes of a question-to-query completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LlmOutcome {
    Query { sql: String },
    Error { error: String },
    Message { message: String },
}

impl LlmOutcome {
    fn error(msg: impl Into<String>) -> Self {
        LlmOutcome::Error { error: msg.into() }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LlmOutcome::Error { .. })
    }
}

/// A relevance judgment for one topic, resolved to a known topic name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmJudgment {
    pub topic: String,
    pub relevance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Something that turns a prompt into a completion.
pub trait LlmBackend {
    fn complete(&self, prompt_text: &str) -> Result<String>;
}

/// Backend that shells out through cli-ai-analyzer.
#[derive(Clone, Default)]
pub struct CliBackend {
    options: AnalyzeOptions,
}

impl CliBackend {
    pub fn new(options: AnalyzeOptions) -> Self {
        Self { options }
    }
}

impl LlmBackend for CliBackend {
    fn complete(&self, prompt_text: &str) -> Result<String> {
        prompt(prompt_text, self.options.clone()).map_err(|e| HypeError::Ai(e.to_string()))
    }
}

/// Substitute `{key}` placeholders in one pass; substituted text is never
/// rescanned, so user input cannot inject further placeholders.
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let hit = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (close, *v))
        });
        match hit {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn build_query_prompt(question: &str, schema: &str) -> String {
    let limit = DEFAULT_ROW_LIMIT.to_string();
    render(
        QUERY_PROMPT,
        &[
            ("schema", schema),
            ("row_limit", limit.as_str()),
            ("question", question.trim()),
        ],
    )
}

pub fn build_relevance_prompt(text: &PaperText, topics: &[Topic]) -> String {
    let topic_list = topics::prompt_topic_list(topics);
    let abstract_text = util::truncate(&text.abstract_text, 2000);
    render(
        RELEVANCE_PROMPT,
        &[
            ("topic_list", topic_list.as_str()),
            ("title", text.title.trim()),
            ("abstract", abstract_text.trim()),
        ],
    )
}

/// Accept one read-only statement. Returns the statement without a trailing
/// semicolon, or the reason it was refused.
pub fn validate_query(sql: &str) -> std::result::Result<String, String> {
    let trimmed = sql.trim();
    let statement = trimmed.strip_suffix(';').unwrap_or(trimmed).trim_end();
    if statement.is_empty() {
        return Err("empty query".to_string());
    }

    let code = mask_string_literals(statement)?;

    if code.contains(';') {
        return Err("multiple statements are not allowed".to_string());
    }
    if code.contains("--") || code.contains("/*") {
        return Err("comments are not allowed in generated queries".to_string());
    }

    let lower = code.to_ascii_lowercase();
    let mut words = lower
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty());

    match words.next() {
        Some("select") | Some("with") => {}
        Some(other) => return Err(format!("only SELECT queries are allowed, got {}", other)),
        None => return Err("empty query".to_string()),
    }

    if let Some(bad) = lower
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .find(|w| FORBIDDEN_KEYWORDS.contains(w))
    {
        return Err(format!("forbidden keyword: {}", bad.to_uppercase()));
    }

    Ok(statement.to_string())
}

/// Blank out the contents of single-quoted literals ('' escapes included).
fn mask_string_literals(sql: &str) -> std::result::Result<String, String> {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    let mut in_literal = false;
    while let Some(c) = chars.next() {
        if in_literal {
            if c == '\'' {
                if chars.peek() == Some(&'\'') {
                    chars.next();
                    out.push(' ');
                } else {
                    in_literal = false;
                    out.push('\'');
                }
            } else {
                out.push(' ');
            }
        } else {
            if c == '\'' {
                in_literal = true;
            }
            out.push(c);
        }
    }
    if in_literal {
        return Err("unterminated string literal".to_string());
    }
    Ok(out)
}

#[derive(Deserialize)]
struct QueryEnvelope {
    #[serde(default, alias = "query")]
    sql: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default, alias = "info")]
    message: Option<String>,
}

/// Parse a question-to-query completion into one of the accepted shapes.
pub fn parse_query_response(raw: &str) -> LlmOutcome {
    let cleaned = util::clean_response(raw);
    if cleaned.is_empty() {
        return LlmOutcome::error("empty response from model");
    }

    if let Some(obj) = util::extract_json_object(&cleaned) {
        match serde_json::from_str::<QueryEnvelope>(obj) {
            Ok(env) => {
                if let Some(error) = env.error.filter(|e| !e.trim().is_empty()) {
                    return LlmOutcome::Error { error };
                }
                if let Some(sql) = env.sql.filter(|s| !s.trim().is_empty()) {
                    return checked_query(&util::clean_response(&sql));
                }
                if let Some(message) = env.message.filter(|m| !m.trim().is_empty()) {
                    return LlmOutcome::Message { message };
                }
                return LlmOutcome::error("response object has no sql, error or message");
            }
            Err(e) => {
                tracing::debug!(error = %e, "completion is not a JSON envelope, trying bare SQL");
            }
        }
    }

    if starts_like_query(&cleaned) {
        return checked_query(&cleaned);
    }

    tracing::warn!(preview = %util::truncate(&cleaned, 80), "no query in completion");
    LlmOutcome::error(format!(
        "could not find a query in response: {}",
        util::truncate(&cleaned, 200)
    ))
}

fn starts_like_query(s: &str) -> bool {
    let head: String = s
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_lowercase();
    head == "select" || head == "with"
}

fn checked_query(sql: &str) -> LlmOutcome {
    match validate_query(sql) {
        Ok(sql) => LlmOutcome::Query { sql },
        Err(reason) => {
            tracing::warn!(%reason, "rejected generated query");
            LlmOutcome::error(format!("unsafe query rejected: {}", reason))
        }
    }
}

#[derive(Deserialize)]
struct JudgmentEntry {
    topic: String,
    #[serde(alias = "score", alias = "relevance_score")]
    relevance: f64,
    #[serde(default)]
    reason: Option<String>,
}

/// Parse a relevance completion. Unknown topics are dropped, scores clamp to
/// [0, 10], and each topic is kept once (first judgment wins).
pub fn parse_relevance_response(raw: &str, topics: &[Topic]) -> Result<Vec<LlmJudgment>> {
    let cleaned = util::strip_code_fence(&util::strip_think_blocks(raw));
    let entries: Vec<JudgmentEntry> = util::parse_json_response(&cleaned)?;

    let mut seen = HashSet::new();
    let mut judgments = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(topic) = topics::resolve(topics, &entry.topic) else {
            tracing::warn!(topic = %entry.topic, "model judged an unknown topic");
            continue;
        };
        if !seen.insert(topic.name().to_string()) {
            continue;
        }
        let relevance = if entry.relevance.is_finite() {
            entry.relevance.clamp(0.0, 10.0)
        } else {
            0.0
        };
        judgments.push(LlmJudgment {
            topic: topic.name().to_string(),
            relevance,
            reason: entry.reason,
        });
    }
    Ok(judgments)
}

/// Turn judgments into persistable rows: only relevance >= threshold survives.
/// A threshold below the 6.0 match floor is raised to it.
pub fn judgments_to_matches(
    paper_id: &str,
    judgments: &[LlmJudgment],
    threshold: f64,
) -> Vec<PaperTopicMatch> {
    let threshold = threshold.max(MATCH_THRESHOLD);
    judgments
        .iter()
        .filter(|j| j.relevance >= threshold)
        .map(|j| PaperTopicMatch {
            paper_id: paper_id.to_string(),
            topic_id: j.topic.clone(),
            relevance_score: j.relevance,
            matched_by: MatchedBy::Llm,
        })
        .collect()
}

/// Ask a free-form question. Backend failures come back as `LlmOutcome::Error`.
pub fn ask(backend: &dyn LlmBackend, question: &str, schema: &str) -> LlmOutcome {
    if question.trim().is_empty() {
        return LlmOutcome::error("question is empty");
    }
    match backend.complete(&build_query_prompt(question, schema)) {
        Ok(response) => parse_query_response(&response),
        Err(e) => {
            tracing::warn!(error = %e, "query completion failed");
            LlmOutcome::error(e.to_string())
        }
    }
}

/// Ask the model for per-topic relevance judgments on one paper.
pub fn judge(
    backend: &dyn LlmBackend,
    text: &PaperText,
    topics: &[Topic],
) -> Result<Vec<LlmJudgment>> {
    if topics.is_empty() {
        return Ok(Vec::new());
    }
    let response = backend.complete(&build_relevance_prompt(text, topics))?;
    parse_relevance_response(&response, topics)
}
