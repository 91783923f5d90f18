//! Exa web search, exposed to the LLM as a tool.
//!
//! The model decides when (and how often) to search; each call is a single
//! `POST /search` against the Exa API with no retry.

use reqwest::Client;
use rig::completion::ToolDefinition;
use rig::tool::Tool;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{error, info};

pub const EXA_SEARCH_URL: &str = "https://api.exa.ai/search";

const DEFAULT_NUM_RESULTS: u32 = 5;
const MAX_NUM_RESULTS: u32 = 10;
const MAX_TEXT_CHARACTERS: u32 = 1000;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("search API returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Arguments the model supplies when calling the tool
#[derive(Debug, Clone, Deserialize)]
pub struct SearchArgs {
    pub query: String,
    #[serde(default)]
    pub num_results: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    query: &'a str,
    num_results: u32,
    contents: SearchContents,
}

#[derive(Debug, Serialize)]
struct SearchContents {
    text: TextOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TextOptions {
    max_characters: u32,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

/// One search result as returned to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: Option<String>,
    pub url: String,
    #[serde(default, rename(deserialize = "publishedDate"))]
    pub published_date: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

pub struct ExaSearch {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl ExaSearch {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            endpoint: EXA_SEARCH_URL.to_string(),
        }
    }

    /// Point the tool at a different endpoint, e.g. a local stub server
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub async fn search(&self, args: &SearchArgs) -> Result<Vec<SearchHit>, SearchError> {
        let body = request_body(args);
        info!(query = %args.query, num_results = body.num_results, "searching the web");

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "search API rejected the request");
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SearchResponse = response.json().await?;
        info!("search returned {} results", parsed.results.len());
        Ok(parsed.results)
    }
}

fn request_body(args: &SearchArgs) -> SearchRequest<'_> {
    SearchRequest {
        query: &args.query,
        num_results: args
            .num_results
            .unwrap_or(DEFAULT_NUM_RESULTS)
            .clamp(1, MAX_NUM_RESULTS),
        contents: SearchContents {
            text: TextOptions {
                max_characters: MAX_TEXT_CHARACTERS,
            },
        },
    }
}

impl Tool for ExaSearch {
    const NAME: &'static str = "search_exa";

    type Error = SearchError;
    type Args = SearchArgs;
    type Output = Vec<SearchHit>;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Search the web with Exa for up-to-date information about movies: \
                          ratings, cast, release dates, reviews and where to stream them."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query"
                    },
                    "num_results": {
                        "type": "integer",
                        "description": "Number of results to return (1-10, default 5)"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        self.search(&args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// Serve one canned HTTP response and hand back the raw request text.
    async fn stub_exa(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            request
        });
        (format!("http://{}/search", addr), handle)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
                let body_len = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|value| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + body_len {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn heist_args() -> SearchArgs {
        SearchArgs {
            query: "best heist movies".to_string(),
            num_results: Some(3),
        }
    }

    #[test]
    fn request_body_uses_camel_case_and_defaults() {
        let args = SearchArgs {
            query: "best heist movies".to_string(),
            num_results: None,
        };
        let value = serde_json::to_value(request_body(&args)).unwrap();
        assert_eq!(
            value,
            json!({
                "query": "best heist movies",
                "numResults": 5,
                "contents": { "text": { "maxCharacters": 1000 } }
            })
        );
    }

    #[test]
    fn num_results_is_clamped() {
        let many = SearchArgs {
            query: "q".to_string(),
            num_results: Some(50),
        };
        let none = SearchArgs {
            query: "q".to_string(),
            num_results: Some(0),
        };
        assert_eq!(request_body(&many).num_results, MAX_NUM_RESULTS);
        assert_eq!(request_body(&none).num_results, 1);
    }

    #[test]
    fn tool_args_accept_missing_num_results() {
        let args: SearchArgs = serde_json::from_value(json!({ "query": "noir" })).unwrap();
        assert_eq!(args.query, "noir");
        assert_eq!(args.num_results, None);
    }

    #[test]
    fn response_hits_tolerate_missing_fields() {
        let raw = json!({
            "requestId": "abc",
            "results": [
                {
                    "title": "Heat (1995) - IMDb",
                    "url": "https://www.imdb.com/title/tt0113277/",
                    "publishedDate": "1995-12-15T00:00:00.000Z",
                    "author": null,
                    "text": "A group of high-end professional thieves..."
                },
                { "url": "https://example.com/list" }
            ]
        });
        let parsed: SearchResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.results.len(), 2);
        assert_eq!(
            parsed.results[0].published_date.as_deref(),
            Some("1995-12-15T00:00:00.000Z")
        );
        assert_eq!(parsed.results[1].title, None);
    }

    #[tokio::test]
    async fn search_posts_key_and_parses_hits() {
        let (endpoint, server) = stub_exa(
            "200 OK",
            r#"{"results":[{"title":"Heat","url":"https://www.imdb.com/title/tt0113277/","publishedDate":"1995-12-15"}]}"#,
        )
        .await;
        let tool = ExaSearch::new("test-key").with_endpoint(endpoint);

        let hits = tool.search(&heist_args()).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title.as_deref(), Some("Heat"));
        assert_eq!(hits[0].published_date.as_deref(), Some("1995-12-15"));

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /search HTTP/1.1"));
        let lowered = request.to_ascii_lowercase();
        assert!(lowered.contains("\r\nx-api-key: test-key\r\n"));
        assert!(request.contains(r#""numResults":3"#));
    }

    #[tokio::test]
    async fn rejected_key_is_a_status_error() {
        let (endpoint, server) = stub_exa("401 Unauthorized", r#"{"error":"invalid api key"}"#).await;
        let tool = ExaSearch::new("bad-key").with_endpoint(endpoint);

        let err = tool.search(&heist_args()).await.unwrap_err();
        match err {
            SearchError::Status { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("invalid api key"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn unparseable_body_is_a_request_error() {
        let (endpoint, server) = stub_exa("200 OK", "not json").await;
        let tool = ExaSearch::new("test-key").with_endpoint(endpoint);

        let err = tool.call(heist_args()).await.unwrap_err();
        assert!(matches!(err, SearchError::Request(_)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_request_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let tool = ExaSearch::new("test-key").with_endpoint(format!("http://{}/search", addr));

        let err = tool.search(&heist_args()).await.unwrap_err();
        assert!(matches!(err, SearchError::Request(_)));
    }

    #[tokio::test]
    async fn definition_requires_query() {
        let tool = ExaSearch::new("test-key");
        let definition = tool.definition(String::new()).await;
        assert_eq!(definition.name, "search_exa");
        assert_eq!(definition.parameters["required"], json!(["query"]));
    }
}
