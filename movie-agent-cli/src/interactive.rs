use colored::Colorize;
use futures::StreamExt;
use movie_agent::{AgentError, Credentials, QueryString, RecommendationAgent, RecommendationChunk};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

pub const PROMPT: &str = "Enter your Movie Recommendation Query: ";

/// Typing this (any case) ends the session.
pub const EXIT_TOKEN: &str = "exit";

pub fn is_exit(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case(EXIT_TOKEN)
}

/// Read queries until `exit` or end of input, streaming each answer to `output`.
///
/// Each line goes to the agent as-is; the preference builder is not involved.
/// A failed request is reported and the loop carries on.
pub async fn run<R, W>(
    agent: &dyn RecommendationAgent,
    credentials: &Credentials,
    input: R,
    output: &mut W,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    loop {
        output.write_all(PROMPT.bold().to_string().as_bytes()).await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            output.write_all(b"\n").await?;
            break;
        };
        if is_exit(&line) {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let query = QueryString::from(line);
        if let Err(e) = answer(agent, credentials, &query, output).await {
            warn!("request failed: {}", e);
            let message = describe(&e);
            output
                .write_all(format!("\n{}\n", message.red()).as_bytes())
                .await?;
        }
        output.flush().await?;
    }
    info!("interactive session finished");
    Ok(())
}

async fn answer<W>(
    agent: &dyn RecommendationAgent,
    credentials: &Credentials,
    query: &QueryString,
    output: &mut W,
) -> Result<(), AgentError>
where
    W: AsyncWrite + Unpin,
{
    let mut stream = agent.invoke_streaming(query, credentials).await?;
    while let Some(chunk) = stream.next().await {
        match chunk? {
            RecommendationChunk::Text(text) => write(output, &text).await?,
            RecommendationChunk::ToolCall { name } => {
                let notice = format!("\n• running tool {}\n", name).dimmed().to_string();
                write(output, &notice).await?;
            }
        }
    }
    write(output, "\n\n").await
}

async fn write<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<(), AgentError> {
    output
        .write_all(text.as_bytes())
        .await
        .and(output.flush().await)
        .map_err(|e| AgentError::Invocation(format!("failed to write to terminal: {}", e)))
}

fn describe(err: &AgentError) -> String {
    match err {
        AgentError::MissingCredentials(missing) => {
            let names = missing
                .iter()
                .map(|kind| kind.env_var())
                .collect::<Vec<_>>()
                .join(" and ");
            format!("Missing credentials: set {} in the environment or .env file.", names)
        }
        other => format!("Error: {}", other),
    }
}
