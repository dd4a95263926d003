use crate::{
    answer::Answer,
    config::{Config, MAX_TOP_K},
    mail::{CorpusStats, Email},
    search::{SearchEngine, SearchError, SearchHit, SearchMode},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;

/// Mode and result count used when a request leaves them out
#[derive(Debug, Clone, Copy)]
pub struct QueryDefaults {
    pub mode: SearchMode,
    pub top_k: usize,
}

impl From<&Config> for QueryDefaults {
    fn from(config: &Config) -> Self {
        Self {
            mode: config.default_mode,
            top_k: config.top_k,
        }
    }
}

#[derive(Clone)]
struct SharedState {
    engine: Arc<SearchEngine>,
    defaults: QueryDefaults,
}

pub fn router(engine: Arc<SearchEngine>, defaults: QueryDefaults) -> Router {
    let shared_state = Arc::new(SharedState { engine, defaults });

    Router::new()
        .route("/api/search", post(search))
        .route("/api/ask", post(ask))
        .route("/api/stats", get(stats))
        .route("/api/emails/:folder/:filename", get(email))
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(
                    tower_http::trace::DefaultMakeSpan::new().level(tracing::Level::INFO),
                )
                .on_response(
                    tower_http::trace::DefaultOnResponse::new().level(tracing::Level::INFO),
                ),
        )
        .with_state(shared_state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            log::error!("failed to listen for ctrl+c: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                log::error!("failed to install signal handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::warn!("shutting down");
}

async fn start_app(router: Router, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("listening on {addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

pub fn start_daemon(engine: SearchEngine, config: &Config, addr: SocketAddr) -> std::io::Result<()> {
    let router = router(Arc::new(engine), QueryDefaults::from(config));

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(start_app(router, addr))
}

#[derive(Debug)]
enum HttpError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for HttpError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            HttpError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            HttpError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            HttpError::Internal(message) => {
                log::error!("{message}");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<SearchError> for HttpError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::EmptyQuery => Self::BadRequest(err.to_string()),
            _ => Self::Internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for HttpError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("worker failed: {err}"))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub mode: Option<SearchMode>,
    pub top_k: Option<usize>,
}

impl QueryRequest {
    fn resolve(&self, defaults: QueryDefaults) -> Result<(SearchMode, usize), HttpError> {
        let top_k = self.top_k.unwrap_or(defaults.top_k);
        if top_k == 0 || top_k > MAX_TOP_K {
            return Err(HttpError::BadRequest(format!(
                "top_k must be between 1 and {MAX_TOP_K}"
            )));
        }
        Ok((self.mode.unwrap_or(defaults.mode), top_k))
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub mode: SearchMode,
    pub results: Vec<SearchHit>,
}

async fn search(
    State(state): State<Arc<SharedState>>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, HttpError> {
    let Json(payload) = payload?;
    log::debug!("payload: {payload:?}");
    let (mode, top_k) = payload.resolve(state.defaults)?;
    let engine = state.engine.clone();

    // semantic queries may embed, or build the index on first use
    tokio::task::spawn_blocking(move || {
        let scored = engine.search(&payload.query, mode, top_k)?;
        Ok::<_, HttpError>(Json(SearchResponse {
            results: engine.hits(&scored),
            query: payload.query,
            mode,
        }))
    })
    .await?
}

async fn ask(
    State(state): State<Arc<SharedState>>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<Answer>, HttpError> {
    let Json(payload) = payload?;
    log::debug!("payload: {payload:?}");
    let (mode, top_k) = payload.resolve(state.defaults)?;
    let engine = state.engine.clone();

    tokio::task::spawn_blocking(move || {
        engine
            .ask(&payload.query, mode, top_k)
            .map(Json)
            .map_err(HttpError::from)
    })
    .await?
}

async fn stats(State(state): State<Arc<SharedState>>) -> Json<CorpusStats> {
    Json(state.engine.corpus().stats())
}

async fn email(
    State(state): State<Arc<SharedState>>,
    Path((folder, filename)): Path<(String, String)>,
) -> Result<Json<Email>, HttpError> {
    state
        .engine
        .corpus()
        .find(&folder, &filename)
        .cloned()
        .map(Json)
        .ok_or_else(|| HttpError::NotFound(format!("no email {folder}/{filename}")))
}
