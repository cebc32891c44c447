use crate::{
    classifier::{Classifier, Verdict},
    config::Config,
    errors::{into_response, AppError, AppResult, DangerousPathError},
    security,
};
use anyhow::Context;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{path::Path, sync::Arc, time::Instant};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub classifier: Arc<Classifier>,
}

impl AppState {
    pub fn new(cfg: Config) -> Self {
        let classifier = cfg.classifier();
        Self { cfg: Arc::new(cfg), classifier: Arc::new(classifier) }
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub paths: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub path: String,
    #[serde(flatten)]
    pub verdict: Verdict,
}

#[derive(Debug, Deserialize)]
pub struct AssertRequest {
    pub path: String,
}

pub async fn serve(cfg: Config) -> anyhow::Result<()> {
    let shared = AppState::new(cfg);
    let addr: std::net::SocketAddr =
        format!("{}:{}", shared.cfg.server.bind_addr, shared.cfg.server.port)
            .parse()
            .context("parsing bind address")?;
    let app = build_router(shared);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "guard service listening");
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(shared: AppState) -> Router {
    let base = shared.cfg.server.base_path.trim_end_matches('/').to_string();
    let limit_bytes = shared.cfg.limits.max_request_kb * 1024;
    Router::new()
        .route("/healthz", get(health))
        .route(&format!("{base}/paths"), get(paths))
        .route(
            &format!("{base}/check"),
            post(check).layer(RequestBodyLimitLayer::new(limit_bytes)),
        )
        .route(
            &format!("{base}/assert"),
            post(assert_path).layer(RequestBodyLimitLayer::new(limit_bytes)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

async fn health(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match authorize(&state, &headers) {
        Ok(()) => (StatusCode::OK, Json(json!({"status":"ok"}))).into_response(),
        Err(e) => into_response(e).into_response(),
    }
}

async fn paths(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(e) = authorize(&state, &headers) {
        return into_response(e).into_response();
    }
    let catalogue = state.classifier.catalogue();
    let body = json!({
        "platform": state.classifier.platform().as_str(),
        "paths": catalogue.entries(),
        "exempt": catalogue.exempt(),
    });
    (StatusCode::OK, Json(body)).into_response()
}

async fn check(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CheckRequest>,
) -> Response {
    let started = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string();
    let count = req.paths.len();

    let outcome = run_check(&state, &headers, req.paths).await;

    match outcome {
        Ok(results) => {
            let protected = results.iter().filter(|r| r.verdict.protected).count();
            audit(&request_id, "check", "allow", "OK", started, count, protected);
            (StatusCode::OK, Json(json!({ "results": results }))).into_response()
        }
        Err(e) => {
            audit(&request_id, "check", decision_for(&e), e.code(), started, count, 0);
            into_response(e).into_response()
        }
    }
}

async fn assert_path(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<AssertRequest>,
) -> Response {
    let started = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string();

    let outcome = run_assert(&state, &headers, &req.path).await;

    match outcome {
        Ok(()) => {
            audit(&request_id, "assert", "allow", "OK", started, 1, 0);
            (StatusCode::OK, Json(json!({"path": req.path, "protected": false}))).into_response()
        }
        Err(e) => {
            let protected = usize::from(matches!(e, AppError::Dangerous(_)));
            audit(&request_id, "assert", decision_for(&e), e.code(), started, 1, protected);
            into_response(e).into_response()
        }
    }
}

async fn run_check(
    state: &AppState,
    headers: &HeaderMap,
    paths: Vec<String>,
) -> AppResult<Vec<CheckResult>> {
    admit(state, headers)?;
    if paths.len() > state.cfg.limits.max_batch {
        return Err(AppError::BadRequest(format!(
            "at most {} paths per request",
            state.cfg.limits.max_batch
        )));
    }
    let classifier = state.classifier.clone();
    tokio::task::spawn_blocking(move || {
        paths
            .into_iter()
            .map(|path| {
                let verdict = classifier.verdict(&path);
                CheckResult { path, verdict }
            })
            .collect()
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))
}

async fn run_assert(state: &AppState, headers: &HeaderMap, path: &str) -> AppResult<()> {
    admit(state, headers)?;
    let classifier = state.classifier.clone();
    let owned = path.to_string();
    let verdict = tokio::task::spawn_blocking(move || classifier.verdict(&owned))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    if verdict.protected {
        return Err(DangerousPathError::new(Path::new(path), verdict.matched).into());
    }
    Ok(())
}

fn decision_for(err: &AppError) -> &'static str {
    match err {
        AppError::Internal(_) => "error",
        _ => "deny",
    }
}

fn audit(
    request_id: &str,
    route: &str,
    decision: &str,
    code: &str,
    started: Instant,
    paths: usize,
    protected: usize,
) {
    tracing::info!(
        request_id = request_id,
        route = route,
        decision = decision,
        code = code,
        duration_ms = started.elapsed().as_millis() as u64,
        paths = paths,
        protected = protected,
        "audit"
    );
}

fn authorize(state: &AppState, headers: &HeaderMap) -> AppResult<()> {
    security::require_bearer(headers, &state.cfg.auth.bearer_token)?;
    security::check_origin(headers, &state.cfg.auth.allowed_origins)?;
    Ok(())
}

fn admit(state: &AppState, headers: &HeaderMap) -> AppResult<()> {
    authorize(state, headers)?;
    security::content_length_ok(headers, state.cfg.limits.max_request_kb)
}
