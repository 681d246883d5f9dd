use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use versus_core::domain::analysis::StockAnalysis;
use versus_core::domain::tickers::AddOutcome;
use versus_core::llm::error::AnalysisError;
use versus_core::pipeline::AnalysisPipeline;
use versus_core::session::{Session, SessionError, SessionView};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<Mutex<Shared>>,
    pipeline: AnalysisPipeline,
}

struct Shared {
    session: Session,
    last_run: Option<RunMeta>,
}

#[derive(Debug, Clone, Copy, Serialize)]
struct RunMeta {
    analysis_id: Uuid,
    generated_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(session: Session, pipeline: AnalysisPipeline) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Shared {
                session,
                last_run: None,
            })),
            pipeline,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/session", get(get_session))
        .route("/tickers", post(add_ticker))
        .route("/tickers/:ticker", delete(remove_ticker))
        .route("/compare", post(compare))
        .route("/analysis/latest", get(get_latest_analysis))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Serialize)]
struct ApiAnalysis {
    analysis_id: Uuid,
    generated_at: DateTime<Utc>,
    provider: &'static str,
    analysis: StockAnalysis,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    kind: &'static str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    Session(SessionError),
    Analysis {
        kind: &'static str,
        message: &'static str,
    },
    NotFound,
    Internal,
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        ApiError::Session(err)
    }
}

impl From<&AnalysisError> for ApiError {
    fn from(err: &AnalysisError) -> Self {
        ApiError::Analysis {
            kind: err.kind().as_str(),
            message: err.user_message(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            ApiError::Session(SessionError::Validation) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                SessionError::Validation.to_string(),
            ),
            ApiError::Session(SessionError::Busy) => {
                (StatusCode::CONFLICT, "busy", SessionError::Busy.to_string())
            }
            ApiError::Analysis { kind, message } => {
                (StatusCode::BAD_GATEWAY, kind, message.to_string())
            }
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                "not_found",
                "no analysis available".to_string(),
            ),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "internal error".to_string(),
            ),
        };
        (status, Json(ApiErrorBody { kind, message })).into_response()
    }
}

async fn get_session(State(state): State<AppState>) -> Json<SessionView> {
    Json(state.inner.lock().await.session.view())
}

#[derive(Debug, Deserialize)]
struct AddTickerBody {
    ticker: String,
}

#[derive(Debug, Serialize)]
struct TickerChange {
    changed: bool,
    outcome: &'static str,
    session: SessionView,
}

fn outcome_name(outcome: &AddOutcome) -> &'static str {
    match outcome {
        AddOutcome::Added(_) => "added",
        AddOutcome::Duplicate(_) => "duplicate",
        AddOutcome::AtCapacity => "at_capacity",
        AddOutcome::Blank => "blank",
        AddOutcome::TooLong => "too_long",
    }
}

async fn add_ticker(
    State(state): State<AppState>,
    Json(body): Json<AddTickerBody>,
) -> Result<Json<TickerChange>, ApiError> {
    let mut shared = state.inner.lock().await;
    let outcome = shared.session.add_ticker(&body.ticker)?;
    tracing::debug!(input = %body.ticker, outcome = outcome_name(&outcome), "add ticker");
    Ok(Json(TickerChange {
        changed: outcome.is_added(),
        outcome: outcome_name(&outcome),
        session: shared.session.view(),
    }))
}

async fn remove_ticker(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<TickerChange>, ApiError> {
    let mut shared = state.inner.lock().await;
    let removed = shared.session.remove_ticker(&ticker)?;
    Ok(Json(TickerChange {
        changed: removed,
        outcome: if removed { "removed" } else { "absent" },
        session: shared.session.view(),
    }))
}

async fn compare(State(state): State<AppState>) -> Result<Json<ApiAnalysis>, ApiError> {
    let request = state.inner.lock().await.session.begin_compare()?;

    // The run is detached so a client disconnect cannot leave the session stuck in Requesting.
    let inner = state.inner.clone();
    let pipeline = state.pipeline.clone();
    let task = tokio::spawn(async move {
        let result = pipeline.analyze(request.tickers()).await;
        let mut shared = inner.lock().await;
        match result {
            Ok(analysis) => {
                let meta = RunMeta {
                    analysis_id: Uuid::new_v4(),
                    generated_at: Utc::now(),
                };
                shared.last_run = Some(meta);
                shared.session.finish(Ok(analysis.clone()));
                Ok(ApiAnalysis {
                    analysis_id: meta.analysis_id,
                    generated_at: meta.generated_at,
                    provider: pipeline.provider_name(),
                    analysis,
                })
            }
            Err(err) => {
                sentry_anyhow::capture_anyhow(&anyhow::anyhow!("{err}"));
                let api_err = ApiError::from(&err);
                shared.last_run = None;
                shared.session.finish(Err(err));
                Err(api_err)
            }
        }
    });

    match task.await {
        Ok(res) => res.map(Json),
        Err(join_err) => {
            tracing::error!(error = %join_err, "analysis task aborted");
            let mut shared = state.inner.lock().await;
            shared.session.finish(Err(AnalysisError::request_failed(join_err.to_string())));
            Err(ApiError::Internal)
        }
    }
}

async fn get_latest_analysis(
    State(state): State<AppState>,
) -> Result<Json<ApiAnalysis>, ApiError> {
    let shared = state.inner.lock().await;
    let (Some(meta), Some(analysis)) = (shared.last_run, shared.session.analysis()) else {
        return Err(ApiError::NotFound);
    };
    Ok(Json(ApiAnalysis {
        analysis_id: meta.analysis_id,
        generated_at: meta.generated_at,
        provider: state.pipeline.provider_name(),
        analysis: analysis.clone(),
    }))
}
