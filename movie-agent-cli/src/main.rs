mod interactive;

use anyhow::{Context, Result};
use colored::Colorize;
use movie_agent::{AgentConfig, LlmRecommendationAgent};
use tokio::io::{BufReader, stdin, stdout};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so streamed answers on stdout stay readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = AgentConfig::from_env().context("Failed to load configuration")?;
    if let Err(e) = config.credentials.validate() {
        warn!("{}", e);
    }

    let agent = LlmRecommendationAgent::new(config.agent);
    info!(model = %config.agent.model, "starting interactive session");

    println!("{}", "🎬 Movie Recommendation Agent".bold());
    println!("Describe what you feel like watching, or type 'exit' to quit.\n");

    let mut output = stdout();
    interactive::run(
        &agent,
        &config.credentials,
        BufReader::new(stdin()),
        &mut output,
    )
    .await
    .context("Terminal I/O failed")?;

    Ok(())
}
