use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;

use crate::cli::ServeArgs;
use crate::config::CorpusConfig;
use crate::core::query::Query as LabQuery;
use crate::corpus::loader::LoadReport;
use crate::matching::engine::Recommendation;
use crate::matching::ranker::{Health, Ranker};
use crate::utils::validation::{clamp_top_n, validate_lab_id};

/// Maximum JSON request body size
pub const MAX_BODY_SIZE: usize = 1024 * 1024; // 1MB

/// Shared application state
pub struct AppState {
    pub ranker: Ranker,
    /// Where `POST /api/reload` reads the corpus from
    pub corpus_config: CorpusConfig,
}

impl AppState {
    #[must_use]
    pub fn new(ranker: Ranker, corpus_config: CorpusConfig) -> Self {
        Self {
            ranker,
            corpus_config,
        }
    }

    /// Load the configured corpus into the ranker
    pub fn reload(&self) -> LoadReport {
        let (corpus, report) = self.corpus_config.loader().load();
        self.ranker.load(corpus);
        report
    }
}

/// Enhanced error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_type: String,
    pub details: Option<String>,
}

/// Create a safe error response that prevents information disclosure
/// while logging detailed errors server-side for debugging
pub fn create_safe_error_response(
    error_type: &str,
    user_message: &str,
    internal_error: Option<&str>,
) -> ErrorResponse {
    if let Some(internal_msg) = internal_error {
        tracing::error!("Internal error ({}): {}", error_type, internal_msg);
    }

    ErrorResponse {
        error: user_message.to_string(),
        error_type: error_type.to_string(),
        details: None,
    }
}

fn error_response(status: StatusCode, error_type: &str, message: &str) -> Response {
    (
        status,
        Json(create_safe_error_response(error_type, message, None)),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub keywords: Vec<String>,
    pub major: Option<String>,
    pub university: Option<String>,
    pub top_n: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub success: bool,
    pub keywords: Vec<String>,
    pub total_labs: usize,
    pub top_n: usize,
    pub degraded: bool,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Deserialize)]
struct LabFilter {
    major: Option<String>,
    university: Option<String>,
}

#[derive(Serialize)]
struct ReloadResponse {
    report: LoadReport,
    health: Health,
}

/// Run the web server
///
/// # Errors
///
/// Returns an error if configuration is invalid, the tokio runtime cannot be
/// created, or the server fails to start.
pub fn run(args: ServeArgs) -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move { run_server(args).await })
}

/// Routes and middleware without per-IP rate limiting.
///
/// Rate limiting keys on the peer address, which only exists when served
/// through `into_make_service_with_connect_info`; [`create_router`] adds it.
pub fn build_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/recommend", post(recommend_handler))
        .route("/api/labs", get(labs_handler))
        .route("/api/labs/{id}", get(lab_handler))
        .route("/api/reload", post(reload_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                // Security headers for browser protection
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-content-type-options"),
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-frame-options"),
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("referrer-policy"),
                    HeaderValue::from_static("strict-origin-when-cross-origin"),
                ))
                // Request timeout to prevent slow client attacks
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    Duration::from_secs(30),
                ))
                // Limit concurrent requests to prevent DOS
                .layer(ConcurrencyLimitLayer::new(100))
                .layer(DefaultBodyLimit::max(MAX_BODY_SIZE)),
        )
}

/// Create the application router with all routes and middleware configured.
#[allow(clippy::missing_panics_doc)] // Panics only on invalid governor config (constants are valid)
pub fn create_router(state: Arc<AppState>) -> Router {
    // Configure IP-based rate limiting
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(10) // 10 requests per second per IP
        .burst_size(50) // Allow bursts of 50 requests
        .finish()
        .unwrap();

    build_routes(state).layer(GovernorLayer {
        config: Arc::new(governor_conf),
    })
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    let config = args.source.resolve()?;
    let address = args.address.unwrap_or(config.server.address);
    let port = args.port.unwrap_or(config.server.port);

    let state = Arc::new(AppState::new(
        Ranker::new(config.matching),
        config.corpus,
    ));
    let loader_state = Arc::clone(&state);
    let report = tokio::task::spawn_blocking(move || loader_state.reload()).await?;
    let health = state.ranker.health();
    tracing::info!(
        "Loaded {} labs from {}; index ready: {}",
        report.labs_loaded,
        report.origin,
        health.index_ready
    );
    if !health.index_ready {
        eprintln!("Warning: No labs indexed; /api/recommend will return empty results.");
    }

    let app = create_router(state);

    let addr = format!("{address}:{port}");
    println!("Starting lab-matcher server at http://{addr}");

    if args.open {
        let _ = open::that(format!("http://{addr}/health"));
    }

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Health> {
    Json(state.ranker.health())
}

async fn recommend_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RecommendRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!("Rejected recommend request: {rejection}");
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                return error_response(
                    StatusCode::PAYLOAD_TOO_LARGE,
                    "payload_too_large",
                    "Request body too large",
                );
            }
            return error_response(
                StatusCode::BAD_REQUEST,
                "invalid_request",
                "Request body must be JSON with a 'keywords' list",
            );
        }
    };

    let mut query = LabQuery::new(&request.keywords);
    if let Some(major) = request.major {
        query = query.with_major(major);
    }
    if let Some(university) = request.university {
        query = query.with_university(university);
    }

    let top_n = clamp_top_n(
        request
            .top_n
            .unwrap_or(state.ranker.config().default_top_n),
    );
    let snapshot = state.ranker.snapshot();
    let ranking = state.ranker.recommend_in(&snapshot, &query, top_n);
    let total_labs = snapshot.corpus().len();

    Json(RecommendResponse {
        success: true,
        keywords: query.keywords,
        total_labs,
        top_n,
        degraded: ranking.degraded,
        recommendations: ranking.results.iter().map(Recommendation::from).collect(),
    })
    .into_response()
}

async fn labs_handler(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<LabFilter>,
) -> Json<serde_json::Value> {
    let snapshot = state.ranker.snapshot();
    let labs: Vec<_> = snapshot
        .corpus()
        .filter(filter.major.as_deref(), filter.university.as_deref())
        .collect();

    Json(serde_json::json!({
        "count": labs.len(),
        "labs": labs,
    }))
}

async fn lab_handler(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let id = match validate_lab_id(&id) {
        Ok(id) => id,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, "invalid_lab_id", &e.to_string());
        }
    };

    match state.ranker.get(id) {
        Some(lab) => Json(lab).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "not_found", "Lab not found"),
    }
}

async fn reload_handler(State(state): State<Arc<AppState>>) -> Response {
    let loader_state = Arc::clone(&state);
    match tokio::task::spawn_blocking(move || loader_state.reload()).await {
        Ok(report) => Json(ReloadResponse {
            report,
            health: state.ranker.health(),
        })
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(create_safe_error_response(
                "reload_failed",
                "Corpus reload failed",
                Some(&e.to_string()),
            )),
        )
            .into_response(),
    }
}
