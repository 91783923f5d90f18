use std::fmt;

use thiserror::Error;

/// A credential the agent needs before it may contact any provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    /// Key for the Exa web-search API
    SearchApiKey,
    /// Key for the Groq LLM API
    LlmApiKey,
}

impl CredentialKind {
    /// Name of the environment variable that carries this credential
    pub fn env_var(&self) -> &'static str {
        match self {
            CredentialKind::SearchApiKey => "EXA_API_KEY",
            CredentialKind::LlmApiKey => "GROQ_API_KEY",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CredentialKind::SearchApiKey => "Exa API key",
            CredentialKind::LlmApiKey => "Groq API key",
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.env_var())
    }
}

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("no movie preferences were provided")]
    EmptyPreferences,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("missing credentials: {}", join_kinds(.0))]
    MissingCredentials(Vec<CredentialKind>),

    #[error("agent invocation failed: {0}")]
    Invocation(String),
}

fn join_kinds(kinds: &[CredentialKind]) -> String {
    kinds
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_message_names_every_key() {
        let err = AgentError::MissingCredentials(vec![
            CredentialKind::SearchApiKey,
            CredentialKind::LlmApiKey,
        ]);
        let message = err.to_string();
        assert!(message.contains("EXA_API_KEY"));
        assert!(message.contains("GROQ_API_KEY"));
    }
}
