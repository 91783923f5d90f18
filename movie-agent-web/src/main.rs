use movie_agent::{Config, LogFormat};
use movie_agent_web::{AppState, build_router};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing, JSON by default or human-readable with LOG_FORMAT=pretty
fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "movie_agent_web=debug,movie_agent=debug,tower_http=debug".into());

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true),
                )
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    if config.credentials.validate().is_err() {
        warn!("EXA_API_KEY/GROQ_API_KEY not fully set; keys must be entered in the form");
    }

    let state = AppState::new(config.agent, config.credentials.clone())?;
    let app = build_router(state);

    let listener = TcpListener::bind(config.bind_address()).await?;
    let addr = listener.local_addr()?;

    info!("Movie recommendation app starting on http://{}", addr);
    info!("Available endpoints:");
    info!("  GET  /                 - Preference form");
    info!("  POST /recommendations  - Get movie recommendations");
    info!("  POST /download         - Download recommendations as markdown");
    info!("  GET  /health           - Health check");

    axum::serve(listener, app).await?;

    Ok(())
}
