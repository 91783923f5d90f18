pub mod agent;
pub mod canned;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod preferences;
pub mod prompts;
pub mod query;
pub mod search;

// Re-export commonly used types
pub use agent::{
    ChunkStream, LlmRecommendationAgent, RecommendationAgent, RecommendationChunk,
    RecommendationText, collect_text,
};
pub use canned::CannedAgent;
pub use config::{AgentConfig, AgentSettings, Config, Credentials, LogFormat};
pub use error::{AgentError, CredentialKind, Result};
pub use pipeline::{Recommendation, recommend};
pub use preferences::{Decade, Genre, Mood, PreferenceSet};
pub use prompts::ModelName;
pub use query::{QUERY_HEADER, QueryString, build_query};
pub use search::ExaSearch;
