pub mod config;
pub mod error;
pub mod hype;
pub mod llm;
pub mod matcher;
pub mod pipeline;
pub mod ranking;
pub mod topics;
pub mod types;
pub mod util;

pub use error::HypeError;
pub use hype::HypeScoreEngine;
pub use matcher::TopicMatcher;
pub use topics::Topic;
pub use types::*;
