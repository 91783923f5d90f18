use tracing::{debug, warn};

use crate::error::{AgentError, CredentialKind, Result};
use crate::prompts::ModelName;

pub const DEFAULT_MAX_TURNS: usize = 5;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;

/// The two secrets an invocation needs. Blank values count as missing.
#[derive(Clone, Default)]
pub struct Credentials {
    pub search_api_key: Option<String>,
    pub llm_api_key: Option<String>,
}

impl Credentials {
    pub fn new(search_api_key: impl Into<String>, llm_api_key: impl Into<String>) -> Self {
        Self {
            search_api_key: Some(search_api_key.into()),
            llm_api_key: Some(llm_api_key.into()),
        }
    }

    /// Fails with every missing credential named, before any network use.
    pub fn validate(&self) -> Result<(&str, &str)> {
        let search = present(&self.search_api_key);
        let llm = present(&self.llm_api_key);
        match (search, llm) {
            (Some(search), Some(llm)) => Ok((search, llm)),
            _ => {
                let mut missing = Vec::with_capacity(2);
                if search.is_none() {
                    missing.push(CredentialKind::SearchApiKey);
                }
                if llm.is_none() {
                    missing.push(CredentialKind::LlmApiKey);
                }
                Err(AgentError::MissingCredentials(missing))
            }
        }
    }

    /// Fill blank fields of `self` from `fallback`
    pub fn or(self, fallback: &Credentials) -> Credentials {
        Credentials {
            search_api_key: present(&self.search_api_key)
                .map(str::to_string)
                .or_else(|| fallback.search_api_key.clone()),
            llm_api_key: present(&self.llm_api_key)
                .map(str::to_string)
                .or_else(|| fallback.llm_api_key.clone()),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("search_api_key", &present(&self.search_api_key).map(|_| "<redacted>"))
            .field("llm_api_key", &present(&self.llm_api_key).map(|_| "<redacted>"))
            .finish()
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Log output format for the services
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// Agent knobs that are not secrets
#[derive(Debug, Clone, Copy)]
pub struct AgentSettings {
    pub model: ModelName,
    /// Upper bound on tool round-trips before the model must answer
    pub max_turns: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: ModelName::default(),
            max_turns: DEFAULT_MAX_TURNS,
        }
    }
}

/// What any front-end needs to run the agent: the secrets and the agent knobs.
///
/// The terminal reads only this; server variables such as `PORT` are never
/// looked at, so a value meant for the web service cannot stop it starting.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub credentials: Credentials,
    pub agent: AgentSettings,
}

impl AgentConfig {
    /// Load from the process environment, reading a `.env` file first if present.
    pub fn from_env() -> Result<Self> {
        load_dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = Credentials {
            search_api_key: lookup(CredentialKind::SearchApiKey.env_var()),
            llm_api_key: lookup(CredentialKind::LlmApiKey.env_var()),
        };

        let model = match lookup("MOVIE_AGENT_MODEL") {
            Some(value) => value.parse::<ModelName>().map_err(|_| {
                AgentError::InvalidInput(format!("MOVIE_AGENT_MODEL: unknown model '{}'", value))
            })?,
            None => ModelName::default(),
        };
        let max_turns = parse_or("MOVIE_AGENT_MAX_TURNS", &lookup, DEFAULT_MAX_TURNS)?;

        Ok(Self {
            credentials,
            agent: AgentSettings { model, max_turns },
        })
    }
}

/// Web service configuration, built once at startup and passed by reference.
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub agent: AgentSettings,
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
}

impl Config {
    /// Load from the process environment, reading a `.env` file first if present.
    pub fn from_env() -> Result<Self> {
        load_dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let AgentConfig { credentials, agent } = AgentConfig::from_lookup(&lookup)?;

        let port = parse_or("PORT", &lookup, DEFAULT_PORT)?;
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            Some("pretty") => LogFormat::Pretty,
            Some("json") | None => LogFormat::Json,
            Some(other) => {
                warn!("unknown LOG_FORMAT '{}', using json", other);
                LogFormat::Json
            }
        };

        Ok(Self {
            credentials,
            agent,
            host,
            port,
            log_format,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn load_dotenv() {
    if dotenvy::dotenv().is_err() {
        debug!("no .env file loaded");
    }
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> Result<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| AgentError::InvalidInput(format!("{}: invalid value '{}'", key, raw))),
        None => Ok(default),
    }
}
