use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use rig::agent::{Agent, MultiTurnStreamItem};
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::groq;
use rig::streaming::{StreamedAssistantContent, StreamingPrompt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::{AgentSettings, Credentials};
use crate::error::{AgentError, Result};
use crate::prompts::{AGENT_NAME, system_prompt};
use crate::query::QueryString;
use crate::search::ExaSearch;

/// Markdown returned by the agent. Its structure is not checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationText(String);

impl RecommendationText {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RecommendationText {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for RecommendationText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A piece of a streamed answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecommendationChunk {
    /// Answer text, to be concatenated in arrival order
    Text(String),
    /// The model asked for a tool before continuing
    ToolCall { name: String },
}

/// Lazy, finite stream of chunks for one invocation. It cannot be restarted.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<RecommendationChunk>> + Send>>;

/// Anything that turns a query into recommendations.
#[async_trait]
pub trait RecommendationAgent: Send + Sync {
    async fn invoke(
        &self,
        query: &QueryString,
        credentials: &Credentials,
    ) -> Result<RecommendationText>;

    async fn invoke_streaming(
        &self,
        query: &QueryString,
        credentials: &Credentials,
    ) -> Result<ChunkStream>;
}

/// Collect the text of a chunk stream into one answer
pub async fn collect_text(mut stream: ChunkStream) -> Result<RecommendationText> {
    let mut text = String::new();
    while let Some(chunk) = stream.next().await {
        if let RecommendationChunk::Text(piece) = chunk? {
            text.push_str(&piece);
        }
    }
    Ok(RecommendationText(text))
}

/// Groq-hosted LLM with the Exa search tool attached.
///
/// A fresh rig agent is built on every call; nothing is shared between
/// requests.
#[derive(Debug, Clone, Default)]
pub struct LlmRecommendationAgent {
    settings: AgentSettings,
}

impl LlmRecommendationAgent {
    pub fn new(settings: AgentSettings) -> Self {
        Self { settings }
    }

    fn build_agent(&self, credentials: &Credentials) -> Result<Agent<groq::CompletionModel>> {
        let (search_key, llm_key) = credentials.validate()?;
        let client = groq::Client::new(llm_key);
        let agent = client
            .agent(self.settings.model.id())
            .preamble(&system_prompt())
            .tool(ExaSearch::new(search_key))
            .build();
        Ok(agent)
    }
}

#[async_trait]
impl RecommendationAgent for LlmRecommendationAgent {
    async fn invoke(
        &self,
        query: &QueryString,
        credentials: &Credentials,
    ) -> Result<RecommendationText> {
        let agent = self.build_agent(credentials)?;
        info!(agent = AGENT_NAME, model = %self.settings.model, "invoking agent");

        let answer = agent
            .prompt(query.as_str())
            .multi_turn(self.settings.max_turns)
            .await
            .map_err(|e| {
                error!("agent invocation failed: {}", e);
                AgentError::Invocation(e.to_string())
            })?;

        info!("agent answered with {} bytes", answer.len());
        Ok(RecommendationText(answer))
    }

    async fn invoke_streaming(
        &self,
        query: &QueryString,
        credentials: &Credentials,
    ) -> Result<ChunkStream> {
        let agent = self.build_agent(credentials)?;
        let max_turns = self.settings.max_turns;
        let prompt = query.as_str().to_string();
        info!(agent = AGENT_NAME, model = %self.settings.model, "streaming from agent");

        // The rig stream borrows the agent, so a producer task owns both and
        // hands chunks over a one-slot channel.
        let (tx, rx) = mpsc::channel::<Result<RecommendationChunk>>(1);
        let producer = tokio::spawn(async move {
            let mut stream = agent.stream_prompt(prompt).multi_turn(max_turns).await;
            while let Some(item) = stream.next().await {
                let chunk = match item {
                    Ok(MultiTurnStreamItem::StreamItem(StreamedAssistantContent::Text(text))) => {
                        Ok(RecommendationChunk::Text(text.text))
                    }
                    Ok(MultiTurnStreamItem::StreamItem(StreamedAssistantContent::ToolCall(
                        call,
                    ))) => Ok(RecommendationChunk::ToolCall {
                        name: call.function.name,
                    }),
                    Ok(_) => continue,
                    Err(e) => {
                        error!("agent stream failed: {}", e);
                        Err(AgentError::Invocation(e.to_string()))
                    }
                };
                let failed = chunk.is_err();
                if tx.send(chunk).await.is_err() || failed {
                    break;
                }
            }
        });

        Ok(forward_chunks(rx, producer))
    }
}

/// Yield what the producer sends, then one `Invocation` error if it panicked
/// or was cancelled instead of finishing.
fn forward_chunks(
    rx: mpsc::Receiver<Result<RecommendationChunk>>,
    producer: JoinHandle<()>,
) -> ChunkStream {
    let stream = futures::stream::unfold(Some((rx, producer)), |state| async move {
        let Some((mut rx, producer)) = state else {
            return None;
        };
        match rx.recv().await {
            Some(chunk) => Some((chunk, Some((rx, producer)))),
            None => match producer.await {
                Ok(()) => None,
                Err(e) => {
                    error!("agent stream task failed: {}", e);
                    let failure = AgentError::Invocation(format!("agent stream task failed: {}", e));
                    Some((Err(failure), None))
                }
            },
        }
    });
    Box::pin(stream)
}
