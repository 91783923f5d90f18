use std::sync::Arc;

use axum::{
    Form, Router,
    extract::State,
    http::{HeaderValue, Request, StatusCode, header},
    middleware::{Next, from_fn},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use movie_agent::{
    AgentError, AgentSettings, Credentials, LlmRecommendationAgent, ModelName,
    RecommendationAgent, recommend,
};
use serde::Deserialize;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, error, info, warn};
use uuid::Uuid;

use crate::form::FormValues;
use crate::page::{PageView, Pages};

pub const DOWNLOAD_FILE_NAME: &str = "movie_recommendations.md";

const EMPTY_PREFERENCES_WARNING: &str =
    "Please provide some movie preferences for better recommendations.";
const MISSING_KEYS_ERROR: &str = "Please provide both Exa and Groq API keys in the sidebar.";

/// Builds the agent for one request from the model picked in the form.
pub type AgentFactory = Arc<dyn Fn(ModelName) -> Arc<dyn RecommendationAgent> + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    pub agent_factory: AgentFactory,
    /// Used for any key the form leaves blank
    pub fallback_credentials: Credentials,
    pub pages: Arc<Pages>,
}

impl AppState {
    /// State backed by the hosted LLM, one fresh agent per request
    pub fn new(settings: AgentSettings, fallback_credentials: Credentials) -> Result<Self, WebError> {
        let max_turns = settings.max_turns;
        let agent_factory: AgentFactory = Arc::new(move |model| {
            Arc::new(LlmRecommendationAgent::new(AgentSettings { model, max_turns }))
                as Arc<dyn RecommendationAgent>
        });
        Self::with_agent_factory(agent_factory, fallback_credentials)
    }

    pub fn with_agent_factory(
        agent_factory: AgentFactory,
        fallback_credentials: Credentials,
    ) -> Result<Self, WebError> {
        Ok(Self {
            agent_factory,
            fallback_credentials,
            pages: Arc::new(Pages::new()?),
        })
    }
}

#[derive(Error, Debug)]
pub enum WebError {
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
    #[error("download content is not percent-encoded UTF-8")]
    MalformedDownload,
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            WebError::Template(_) => {
                error!("{}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
            }
            WebError::MalformedDownload => {
                warn!("{}", self);
                (StatusCode::BAD_REQUEST, self.to_string()).into_response()
            }
        }
    }
}

type PageResult = Result<(StatusCode, Html<String>), WebError>;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/recommendations", post(get_recommendations))
        .route("/download", post(download))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(correlation_id_middleware))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn index(State(state): State<AppState>) -> PageResult {
    render(&state, StatusCode::OK, PageView::blank())
}

fn render(state: &AppState, status: StatusCode, view: PageView) -> PageResult {
    Ok((status, Html(state.pages.render(&view)?)))
}

async fn get_recommendations(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> PageResult {
    let form = FormValues::from_pairs(pairs);
    let view = PageView::from_form(&form);

    let (model, prefs) = match form.model().and_then(|m| Ok((m, form.preferences()?))) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("rejecting malformed form: {}", e);
            return render(&state, StatusCode::BAD_REQUEST, view.with_error(e.to_string()));
        }
    };

    let credentials = form.credentials().or(&state.fallback_credentials);
    let agent = (state.agent_factory)(model);
    info!(model = %model, "received recommendation request");

    let view = match recommend(agent.as_ref(), &prefs, &credentials).await {
        Ok(result) => view.with_result(result.query.as_str(), result.text.as_str()),
        Err(AgentError::EmptyPreferences) => view.with_warning(EMPTY_PREFERENCES_WARNING),
        Err(AgentError::MissingCredentials(missing)) => {
            let names = missing
                .iter()
                .map(|kind| kind.label())
                .collect::<Vec<_>>()
                .join(" and ");
            view.with_error(format!("{} Missing: {}.", MISSING_KEYS_ERROR, names))
        }
        Err(e) => {
            error!("recommendation failed: {}", e);
            view.with_error(e.to_string())
        }
    };

    render(&state, StatusCode::OK, view)
}

#[derive(Debug, Deserialize)]
struct DownloadForm {
    /// Percent-encoded markdown, as written into the page's hidden field
    content: String,
}

async fn download(Form(form): Form<DownloadForm>) -> Result<impl IntoResponse, WebError> {
    let markdown = urlencoding::decode(&form.content)
        .map_err(|_| WebError::MalformedDownload)?
        .into_owned();
    info!("serving {} bytes as {}", markdown.len(), DOWNLOAD_FILE_NAME);
    Ok((
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", DOWNLOAD_FILE_NAME),
            ),
        ],
        markdown,
    ))
}

/// Middleware to add correlation ID to all requests
async fn correlation_id_middleware(
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        request.headers_mut().insert("x-correlation-id", value);
    }

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    next.run(request).instrument(span).await
}
