//! HTTP handlers for CloudProof server.

use std::sync::Arc;

use actix_web::error::InternalError;
use actix_web::{HttpResponse, Responder, get, post, web};
use chrono::{NaiveDate, Utc};
use cloudproof_core::{
    ActivityLedger, ActivityPayload, ActivityReport, Clock, DEFAULT_ACTIVITY_DAYS, HeatmapView,
    ScoringRules, SystemClock, WindowSpan, build_view, decode_log_bytes_limited, parse_cloudtrail_document,
    scoring_rules,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::openapi::ApiDoc;

/// Largest request body accepted by the payload and ingest endpoints.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Shared application state for handlers.
#[derive(Clone)]
pub struct AppState {
    /// Source of "today" for window resolution.
    pub clock: Arc<dyn Clock + Send + Sync>,
    /// Trailing window used when a heatmap request names none.
    pub default_days: u32,
}

impl AppState {
    /// State backed by the system clock.
    #[cfg_attr(test, allow(dead_code))]
    pub fn new(default_days: u32) -> Self {
        Self {
            clock: Arc::new(SystemClock::new()),
            default_days,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `healthy` while the server answers.
    pub status: String,
    /// RFC 3339 server time.
    pub timestamp: String,
}

/// Error response payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub message: String,
}

/// How a heatmap request picks its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SpanParam {
    /// Trailing `days` window.
    Days,
    /// One calendar year back from today.
    Year,
}

/// Query parameters for `POST /api/heatmap`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HeatmapQuery {
    /// Trailing window length, 1 to 730.
    pub days: Option<u32>,
    /// `days` (default) or `year`.
    #[param(value_type = Option<String>)]
    pub span: Option<SpanParam>,
    /// Override for today's date, `YYYY-MM-DD`.
    #[param(value_type = Option<String>, format = Date)]
    pub today: Option<NaiveDate>,
}

impl HeatmapQuery {
    fn window_span(&self, default_days: u32) -> Result<WindowSpan, String> {
        match (self.span, self.days) {
            (Some(SpanParam::Year), Some(_)) => {
                Err("days cannot be combined with span=year".to_string())
            }
            (Some(SpanParam::Year), None) => Ok(WindowSpan::YearBack),
            (_, days) => Ok(WindowSpan::TrailingDays(days.unwrap_or(default_days))),
        }
    }
}

/// Query parameters for `POST /api/ingest`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IngestQuery {
    /// Report window in days before today, 1 to 730.
    pub days: Option<u32>,
    /// Override for today's date, `YYYY-MM-DD`.
    #[param(value_type = Option<String>, format = Date)]
    pub today: Option<NaiveDate>,
}

/// Register every endpoint plus the body and query limits they rely on.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(query_config())
        .app_data(web::PayloadConfig::new(MAX_BODY_BYTES))
        .service(health)
        .service(heatmap)
        .service(ingest)
        .service(rules)
        .service(openapi_json);
}

/// Report malformed query strings as `ErrorResponse` JSON.
fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        InternalError::from_response(err, bad_request(message)).into()
    })
}

fn bad_request(message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse { message })
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Server is up", body = HealthResponse)
    ),
    tag = "system"
)]
#[get("/api/health")]
/// Report liveness.
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

#[utoipa::path(
    post,
    path = "/heatmap",
    params(HeatmapQuery),
    request_body(
        content = serde_json::Value,
        description = "Raw activity payload; any shape is accepted",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Normalized heatmap view", body = HeatmapView),
        (status = 400, description = "Invalid window or non-JSON body", body = ErrorResponse)
    ),
    tag = "heatmap"
)]
#[post("/api/heatmap")]
/// Normalize an activity payload into classified cells and a summary.
pub async fn heatmap(
    state: web::Data<AppState>,
    query: web::Query<HeatmapQuery>,
    body: web::Bytes,
) -> impl Responder {
    let span = match query.window_span(state.default_days) {
        Ok(span) => span,
        Err(message) => return bad_request(message),
    };
    let today = query.today.unwrap_or_else(|| state.clock.today());
    let window = match span.resolve(today) {
        Ok(window) => window,
        Err(err) => return bad_request(err.to_string()),
    };
    let payload = if body.iter().all(u8::is_ascii_whitespace) {
        ActivityPayload::default()
    } else {
        match ActivityPayload::from_json_slice(&body) {
            Ok(payload) => payload,
            Err(err) => return bad_request(err.to_string()),
        }
    };
    HttpResponse::Ok().json(build_view(&payload, window))
}

#[utoipa::path(
    post,
    path = "/ingest",
    params(IngestQuery),
    request_body(
        content = serde_json::Value,
        description = "CloudTrail document (`{\"Records\": [...]}`), optionally gzip-compressed",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Scored activity", body = ActivityReport),
        (status = 400, description = "Invalid window or unreadable document", body = ErrorResponse)
    ),
    tag = "ingest"
)]
#[post("/api/ingest")]
/// Score a CloudTrail document into an activity payload.
pub async fn ingest(
    state: web::Data<AppState>,
    query: web::Query<IngestQuery>,
    body: web::Bytes,
) -> impl Responder {
    let days = query.days.unwrap_or(DEFAULT_ACTIVITY_DAYS);
    let today = query.today.unwrap_or_else(|| state.clock.today());
    let result = web::block(move || {
        decode_log_bytes_limited(body.to_vec(), MAX_BODY_BYTES)
            .and_then(|bytes| parse_cloudtrail_document(&bytes))
    })
    .await;
    let events = match result {
        Ok(Ok(events)) => events,
        Ok(Err(err)) => {
            warn!("rejected CloudTrail document: {err}");
            return bad_request(err.to_string());
        }
        Err(err) => {
            warn!("CloudTrail decode task failed: {err}");
            return HttpResponse::InternalServerError().json(ErrorResponse {
                message: "failed to decode document".to_string(),
            });
        }
    };
    let mut ledger = ActivityLedger::new();
    let recorded = ledger.record_all(events);
    match ledger.report(today, days) {
        Ok(report) => {
            info!(
                "ingested {recorded} scored activities across {} days",
                report.heatmap.len()
            );
            HttpResponse::Ok().json(report)
        }
        Err(err) => bad_request(err.to_string()),
    }
}

#[utoipa::path(
    get,
    path = "/scoring/rules",
    responses(
        (status = 200, description = "Scoring table and caps", body = ScoringRules)
    ),
    tag = "ingest"
)]
#[get("/api/scoring/rules")]
/// List the CloudTrail scoring table.
pub async fn rules() -> impl Responder {
    HttpResponse::Ok().json(scoring_rules())
}

#[utoipa::path(
    get,
    path = "/openapi.json",
    responses(
        (status = 200, description = "OpenAPI document", body = serde_json::Value)
    ),
    tag = "system"
)]
#[get("/api/openapi.json")]
/// Serve the OpenAPI document.
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
