// Topic definitions: validated names, keyword sets, and the built-in
// system catalogue that every deployment starts with.

use crate::error::{HypeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub const MIN_NAME_LEN: usize = 3;
pub const MAX_NAME_LEN: usize = 100;

/// A named research area. Keywords are stored lower-cased, deduplicated,
/// in definition order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Topic {
    name: String,
    keywords: Vec<String>,
    is_system: bool,
}

impl Topic {
    pub fn new<I, S>(name: &str, keywords: I, is_system: bool) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        validate_name(name)?;
        Ok(Self {
            name: name.to_string(),
            keywords: normalize_keywords(keywords),
            is_system,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn is_system(&self) -> bool {
        self.is_system
    }
}

/// Name must be lowercase, 3–100 chars, and only `[a-z0-9 -]`.
pub fn validate_name(name: &str) -> Result<()> {
    let len = name.chars().count();
    if !(MIN_NAME_LEN..=MAX_NAME_LEN).contains(&len) {
        return Err(HypeError::InvalidTopic(format!(
            "name must be {}-{} characters, got {} ({:?})",
            MIN_NAME_LEN, MAX_NAME_LEN, len, name
        )));
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ' || *c == '-'))
    {
        return Err(HypeError::InvalidTopic(format!(
            "name may only contain a-z, 0-9, space and '-', found {:?} in {:?}",
            bad, name
        )));
    }
    Ok(())
}

fn normalize_keywords<I, S>(keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    keywords
        .into_iter()
        .map(|k| k.as_ref().to_lowercase())
        .filter(|k| !k.trim().is_empty())
        .filter(|k| seen.insert(k.clone()))
        .collect()
}

struct TopicDef {
    name: &'static str,
    keywords: &'static [&'static str],
}

static SYSTEM_TOPICS: &[TopicDef] = &[
    TopicDef {
        name: "neural rendering",
        keywords: &[
            "nerf",
            "neural radiance fields",
            "view synthesis",
            "novel view",
            "gaussian splatting",
        ],
    },
    TopicDef {
        name: "large language models",
        keywords: &[
            "language model",
            "llm",
            "instruction tuning",
            "in-context learning",
            "transformer",
            "pretraining",
        ],
    },
    TopicDef {
        name: "diffusion models",
        keywords: &["diffusion", "denoising", "score-based", "text-to-image", "latent diffusion"],
    },
    TopicDef {
        name: "reinforcement learning",
        keywords: &["reinforcement learning", "policy gradient", "reward", "q-learning", "rlhf"],
    },
    TopicDef {
        name: "computer vision",
        keywords: &[
            "image classification",
            "object detection",
            "segmentation",
            "convolutional",
            "vision transformer",
        ],
    },
    TopicDef {
        name: "graph neural networks",
        keywords: &[
            "graph neural network",
            "gnn",
            "message passing",
            "node classification",
            "graph convolution",
        ],
    },
    TopicDef {
        name: "speech and audio",
        keywords: &["speech recognition", "text-to-speech", "audio", "asr", "speaker"],
    },
    TopicDef {
        name: "robotics",
        keywords: &["robot", "manipulation", "locomotion", "embodied", "sim-to-real"],
    },
];

/// Built-in system topics, in catalogue order.
pub fn system_topics() -> Vec<Topic> {
    SYSTEM_TOPICS
        .iter()
        .map(|d| Topic {
            name: d.name.to_string(),
            keywords: normalize_keywords(d.keywords.iter()),
            is_system: true,
        })
        .collect()
}

/// Look up a topic by exact name.
pub fn find_by_name<'a>(topics: &'a [Topic], name: &str) -> Option<&'a Topic> {
    topics.iter().find(|t| t.name == name)
}

/// Resolve a free-text topic label (e.g. from an LLM answer) to a known topic.
/// Tries a case-insensitive exact match, then containment either way.
pub fn resolve<'a>(topics: &'a [Topic], raw: &str) -> Option<&'a Topic> {
    let wanted = raw.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }

    if let Some(t) = topics.iter().find(|t| t.name == wanted) {
        return Some(t);
    }

    topics
        .iter()
        .find(|t| wanted.contains(t.name.as_str()) || t.name.contains(wanted.as_str()))
}

/// Build the topic list text to embed in AI prompts.
pub fn prompt_topic_list(topics: &[Topic]) -> String {
    topics
        .iter()
        .map(|t| {
            if t.keywords.is_empty() {
                format!("- {}", t.name)
            } else {
                format!("- {}: {}", t.name, t.keywords.join(", "))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TopicsFile {
    #[serde(default)]
    topic: Vec<TopicEntry>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TopicEntry {
    name: String,
    #[serde(default)]
    keywords: Vec<String>,
}

/// Parse user-defined topics from TOML (`[[topic]]` tables).
pub fn parse_topics(content: &str) -> Result<Vec<Topic>> {
    let file: TopicsFile = toml::from_str(content)?;
    let mut seen = HashSet::new();
    let mut topics = Vec::with_capacity(file.topic.len());
    for entry in file.topic {
        if !seen.insert(entry.name.clone()) {
            return Err(HypeError::InvalidTopic(format!(
                "duplicate topic name: {}",
                entry.name
            )));
        }
        topics.push(Topic::new(&entry.name, &entry.keywords, false)?);
    }
    Ok(topics)
}

pub fn load_topics(path: &Path) -> Result<Vec<Topic>> {
    let content = std::fs::read_to_string(path)?;
    parse_topics(&content)
}

/// System topics followed by user topics; a user topic with a system name
/// replaces nothing and is rejected.
pub fn merge_with_system(user: Vec<Topic>) -> Result<Vec<Topic>> {
    let mut all = system_topics();
    for topic in user {
        if find_by_name(&all, topic.name()).is_some() {
            return Err(HypeError::InvalidTopic(format!(
                "topic {:?} is already defined",
                topic.name()
            )));
        }
        all.push(topic);
    }
    Ok(all)
}
