//! HTTP surface: contact intake, per-message risk, dashboard summary.
//!
//! Every handler delegates to `crate::risk`; nothing here re-implements a rule.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use crate::emergency::EmergencyGate;
use crate::logging::anon_hash;
use crate::message::Message;
use crate::metrics::{self as m, Metrics};
use crate::provider::{DisabledProvider, DynToneProvider};
use crate::risk::{self, RiskAssessment, RiskLevel, RiskSummary};
use crate::store::MessageStore;
use crate::tone::ToneAnalysis;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MessageStore>,
    pub provider: DynToneProvider,
    pub emergency: Arc<Mutex<EmergencyGate>>,
}

impl AppState {
    pub fn new(store: MessageStore, provider: DynToneProvider, cooldown_secs: i64) -> Self {
        Self {
            store: Arc::new(store),
            provider,
            emergency: Arc::new(Mutex::new(EmergencyGate::new(cooldown_secs))),
        }
    }

    /// Empty store, no provider, default cooldown. Handy for tests.
    pub fn in_memory() -> Self {
        Self::new(MessageStore::default(), Arc::new(DisabledProvider), 900)
    }

    fn observe_emergency(&self, msg: &Message, assessment: &RiskAssessment) {
        let mut gate = self.emergency.lock().unwrap_or_else(|e| e.into_inner());
        gate.observe(&msg.id, assessment, Utc::now());
    }
}

/// Build the API router. `metrics` adds `/metrics` when present.
pub fn router(state: AppState, metrics: Option<&Metrics>) -> Router {
    let mut app = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/contact", post(submit_contact))
        .route("/api/messages", get(list_messages))
        .route("/api/messages/{id}/risk", get(message_risk))
        .route("/api/risk/assess", post(assess_text))
        .route("/api/risk/summary", get(stored_summary).post(posted_summary));

    if let Some(mx) = metrics {
        app = app.merge(mx.router());
    }

    app.layer(CorsLayer::very_permissive()).with_state(state)
}

// ---------- errors ----------

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(e) => (StatusCode::BAD_REQUEST, e),
            ApiError::NotFound(e) => (StatusCode::NOT_FOUND, e),
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

// ---------- contact intake ----------

#[derive(Deserialize)]
struct ContactReq {
    #[serde(alias = "text")]
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContactResp {
    id: String,
    risk_level: RiskLevel,
}

async fn submit_contact(
    State(state): State<AppState>,
    Json(body): Json<ContactReq>,
) -> Result<(StatusCode, Json<ContactResp>), ApiError> {
    let msg = state
        .store
        .submit(&body.message, Utc::now())
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    // Text-only verdict now; refined once the provider answers.
    let assessment = risk::assess_message(&msg);
    m::record_classification(assessment.risk_level);
    info!(id = %msg.id, fp = %anon_hash(&msg.text), level = %assessment.risk_level, "contact message received");
    state.observe_emergency(&msg, &assessment);

    spawn_analysis(state.clone(), msg.clone(), assessment.risk_level);

    Ok((
        StatusCode::CREATED,
        Json(ContactResp {
            id: msg.id,
            risk_level: assessment.risk_level,
        }),
    ))
}

fn spawn_analysis(state: AppState, msg: Message, initial: RiskLevel) {
    tokio::spawn(async move {
        let provider = state.provider.name();
        let result = state.provider.analyze(&msg.text).await;
        match result {
            Ok(reply) => {
                m::record_provider_call(provider, true);
                if !state.store.attach_analysis(&msg.id, reply.analysis.clone()) {
                    debug!(id = %msg.id, "message evicted before analysis arrived");
                    return;
                }
                let analyzed = msg.with_analysis(reply.analysis);
                let assessment = risk::assess_message(&analyzed);
                if assessment.risk_level > initial {
                    m::record_classification(assessment.risk_level);
                    info!(id = %analyzed.id, from = %initial, to = %assessment.risk_level, "risk raised by tone analysis");
                    state.observe_emergency(&analyzed, &assessment);
                }
            }
            Err(e) => {
                m::record_provider_call(provider, false);
                warn!(id = %msg.id, provider, "tone analysis unavailable: {e:#}");
            }
        }
    });
}

// ---------- per-message views ----------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MessageView {
    #[serde(flatten)]
    message: Message,
    risk_level: RiskLevel,
}

async fn list_messages(State(state): State<AppState>) -> Json<Vec<MessageView>> {
    let out = state
        .store
        .all()
        .into_iter()
        .map(|message| MessageView {
            risk_level: risk::assess_message(&message).risk_level,
            message,
        })
        .collect();
    Json(out)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MessageRiskResp {
    id: String,
    #[serde(flatten)]
    assessment: RiskAssessment,
    analyzed: bool,
}

async fn message_risk(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageRiskResp>, ApiError> {
    let msg = state
        .store
        .get(&id)
        .ok_or_else(|| ApiError::NotFound(format!("unknown message id '{id}'")))?;
    Ok(Json(MessageRiskResp {
        assessment: risk::assess_message(&msg),
        analyzed: msg.analysis.is_some(),
        id: msg.id,
    }))
}

// ---------- stateless risk endpoints ----------

#[derive(Deserialize)]
struct AssessReq {
    #[serde(default)]
    text: String,
    #[serde(default, deserialize_with = "crate::tone::lenient_analysis")]
    analysis: Option<ToneAnalysis>,
}

async fn assess_text(Json(body): Json<AssessReq>) -> Json<RiskAssessment> {
    let tone = risk::NormalizedTone::from_analysis(body.analysis.as_ref());
    Json(risk::assess(&body.text, &tone))
}

async fn stored_summary(State(state): State<AppState>) -> Json<RiskSummary> {
    m::record_summary_request();
    Json(risk::compute_risk_summary(&state.store.all()))
}

/// Caller supplies the collection, newest first.
async fn posted_summary(Json(messages): Json<Vec<Message>>) -> Json<RiskSummary> {
    m::record_summary_request();
    Json(risk::compute_risk_summary(&messages))
}
