//! An in-process agent that answers with fixed text.
//!
//! Used by tests and local demos: it never touches the network but honours
//! the same credential check as the real agent.

use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream;

use crate::agent::{ChunkStream, RecommendationAgent, RecommendationChunk, RecommendationText};
use crate::config::Credentials;
use crate::error::{AgentError, Result};
use crate::query::QueryString;

#[derive(Debug)]
pub struct CannedAgent {
    reply: std::result::Result<String, String>,
    chunk_size: usize,
    queries: Mutex<Vec<String>>,
}

impl CannedAgent {
    /// Answer every query with `reply`
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            chunk_size: 16,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Fail every query with an invocation error carrying `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            chunk_size: 16,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Queries received so far, in order
    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .map(|queries| queries.clone())
            .unwrap_or_default()
    }

    pub fn invocations(&self) -> usize {
        self.queries().len()
    }

    fn answer(&self, query: &QueryString, credentials: &Credentials) -> Result<String> {
        credentials.validate()?;
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.as_str().to_string());
        }
        self.reply.clone().map_err(AgentError::Invocation)
    }
}

#[async_trait]
impl RecommendationAgent for CannedAgent {
    async fn invoke(
        &self,
        query: &QueryString,
        credentials: &Credentials,
    ) -> Result<RecommendationText> {
        self.answer(query, credentials).map(RecommendationText::from)
    }

    async fn invoke_streaming(
        &self,
        query: &QueryString,
        credentials: &Credentials,
    ) -> Result<ChunkStream> {
        let reply = self.answer(query, credentials)?;
        let chunks: Vec<Result<RecommendationChunk>> = reply
            .chars()
            .collect::<Vec<_>>()
            .chunks(self.chunk_size)
            .map(|piece| Ok(RecommendationChunk::Text(piece.iter().collect())))
            .collect();
        Ok(Box::pin(stream::iter(chunks)))
    }
}
