// Config module: one typed definition site for every tunable.
// Unknown keys are rejected at load time; nothing is silently defaulted
// beyond the values listed here.

use crate::error::{HypeError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// --- hype score defaults ---
pub const STAR_WEIGHT: f64 = 0.40;
pub const CITATION_WEIGHT: f64 = 0.30;
pub const VOTE_WEIGHT: f64 = 0.20;
pub const RECENCY_WEIGHT: f64 = 0.10;
/// log10(100_000 + 1) ≈ 5.0
pub const LOG10_CEILING: f64 = 5.0;
/// log2(1_000 + 1) ≈ 10.0
pub const LOG2_CEILING: f64 = 10.0;
pub const HALF_LIFE_DAYS: f64 = 365.0;

// --- topic matching defaults ---
pub const POINTS_PER_KEYWORD: f64 = 2.0;
pub const MAX_RELEVANCE: f64 = 10.0;
pub const MATCH_THRESHOLD: f64 = 6.0;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Weights and normalization ceilings for the hype score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    pub star_weight: f64,
    pub citation_weight: f64,
    pub vote_weight: f64,
    pub recency_weight: f64,
    pub log10_ceiling: f64,
    pub log2_ceiling: f64,
    pub half_life_days: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            star_weight: STAR_WEIGHT,
            citation_weight: CITATION_WEIGHT,
            vote_weight: VOTE_WEIGHT,
            recency_weight: RECENCY_WEIGHT,
            log10_ceiling: LOG10_CEILING,
            log2_ceiling: LOG2_CEILING,
            half_life_days: HALF_LIFE_DAYS,
        }
    }
}

impl ScoringConfig {
    /// Weights must be non-negative and sum to at most 1.0 so the total stays in [0, 1].
    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("star_weight", self.star_weight),
            ("citation_weight", self.citation_weight),
            ("vote_weight", self.vote_weight),
            ("recency_weight", self.recency_weight),
        ];
        for (name, w) in weights {
            if !w.is_finite() || w < 0.0 {
                return Err(HypeError::Config(format!(
                    "scoring.{} must be a non-negative number, got {}",
                    name, w
                )));
            }
        }
        let sum: f64 = weights.iter().map(|(_, w)| w).sum();
        if sum > 1.0 + WEIGHT_SUM_TOLERANCE {
            return Err(HypeError::Config(format!(
                "scoring weights sum to {:.3}, must not exceed 1.0",
                sum
            )));
        }
        for (name, v) in [
            ("log10_ceiling", self.log10_ceiling),
            ("log2_ceiling", self.log2_ceiling),
            ("half_life_days", self.half_life_days),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(HypeError::Config(format!(
                    "scoring.{} must be positive, got {}",
                    name, v
                )));
            }
        }
        Ok(())
    }
}

/// Keyword relevance scale and the match threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatcherConfig {
    pub points_per_keyword: f64,
    pub max_relevance: f64,
    pub match_threshold: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            points_per_keyword: POINTS_PER_KEYWORD,
            max_relevance: MAX_RELEVANCE,
            match_threshold: MATCH_THRESHOLD,
        }
    }
}

impl MatcherConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.points_per_keyword.is_finite() || self.points_per_keyword <= 0.0 {
            return Err(HypeError::Config(format!(
                "matching.points_per_keyword must be positive, got {}",
                self.points_per_keyword
            )));
        }
        if !(self.max_relevance > 0.0 && self.max_relevance <= MAX_RELEVANCE) {
            return Err(HypeError::Config(format!(
                "matching.max_relevance must be in (0, {}], got {}",
                MAX_RELEVANCE, self.max_relevance
            )));
        }
        // 6.0 is the floor for a persisted match; configs may only be stricter
        if !(self.match_threshold >= MATCH_THRESHOLD && self.match_threshold <= self.max_relevance)
        {
            return Err(HypeError::Config(format!(
                "matching.match_threshold must be in [{}, {}], got {}",
                MATCH_THRESHOLD, self.max_relevance, self.match_threshold
            )));
        }
        Ok(())
    }
}

/// Top-level configuration file (`config.toml`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub scoring: ScoringConfig,
    pub matching: MatcherConfig,
    /// Optional TOML file with extra topic definitions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics_file: Option<PathBuf>,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.scoring.validate()?;
        self.matching.validate()
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| match e {
            HypeError::Config(msg) => HypeError::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// Load the explicit path if given, else the default location if it exists,
    /// else built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            tracing::debug!(path = %path.display(), "loading config");
            return Self::from_file(path);
        }
        match default_path() {
            Some(path) if path.exists() => {
                tracing::debug!(path = %path.display(), "loading default config");
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}

/// `<config_dir>/paper-hype/config.toml`
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("paper-hype").join("config.toml"))
}
