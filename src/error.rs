use thiserror::Error;

/// Typed error for paper-hype library operations.
#[derive(Debug, Error)]
pub enum HypeError {
    /// Parsing errors (paper input, LLM responses)
    #[error("parse error: {0}")]
    Parse(String),
    /// AI backend errors (prompt delivery, empty completions)
    #[error("AI error: {0}")]
    Ai(String),
    /// Configuration errors (unknown keys, out-of-range weights)
    #[error("config error: {0}")]
    Config(String),
    /// Topic definitions that violate naming rules
    #[error("invalid topic: {0}")]
    InvalidTopic(String),
    /// IO errors (file read/write)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for HypeError {
    fn from(err: serde_json::Error) -> Self {
        HypeError::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for HypeError {
    fn from(err: toml::de::Error) -> Self {
        HypeError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HypeError>;
