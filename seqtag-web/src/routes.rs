//! Rotas HTTP: tagging de texto livre e decodificação de tokens já segmentados.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use seqtag_core::{
    BeamError, BeamSearchConfig, CacheStats, EntitySpan, MaxEntModel, ProbabilityModel, Sequence,
    SequenceTagger, TaggedToken,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Estado compartilhado da aplicação
pub struct AppState {
    pub tagger: SequenceTagger<MaxEntModel>,
}

pub type SharedState = Arc<AppState>;

pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/model", get(model_handler))
        .route("/tag", post(tag_handler))
        .route("/decode", post(decode_handler))
        .layer(cors)
        .with_state(state)
}

/// Erros devolvidos ao cliente como `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    /// Requisição inválida (400)
    BadRequest(String),
    /// O decodificador recusou a entrada (422)
    Decode(BeamError),
    /// Falha interna, ex.: a tarefa bloqueante abortou (500)
    Internal(String),
}

impl From<BeamError> for ApiError {
    fn from(err: BeamError) -> Self {
        ApiError::Decode(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Decode(err) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        if status.is_server_error() {
            warn!(%status, error = %message, "request failed");
        }
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Roda o trabalho síncrono do decodificador fora do runtime async.
async fn blocking<T, F>(state: &SharedState, work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&AppState) -> Result<T, ApiError> + Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || work(&state))
        .await
        .map_err(|err| ApiError::Internal(format!("decoder task failed: {err}")))?
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(Serialize)]
struct ModelResponse {
    outcomes: Vec<String>,
    beam: BeamSearchConfig,
    cache: CacheStats,
}

/// Vocabulário de outcomes e configuração ativa do beam.
async fn model_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let search = state.tagger.search();
    Json(ModelResponse {
        outcomes: search.model().outcomes().into_iter().map(String::from).collect(),
        beam: *search.config(),
        cache: search.cache_stats(),
    })
}

#[derive(Deserialize)]
struct TagRequest {
    text: String,
}

#[derive(Serialize)]
struct TagResponse {
    tokens: Vec<TaggedToken>,
    entities: Vec<EntitySpan>,
    alternatives: Vec<Sequence>,
    total_tokens: usize,
    processing_ms: u64,
}

/// Tagging de texto livre via HTTP POST
async fn tag_handler(
    State(state): State<SharedState>,
    Json(req): Json<TagRequest>,
) -> Result<Json<TagResponse>, ApiError> {
    let started = Instant::now();
    let chars = req.text.chars().count();
    let result = blocking(&state, move |app| Ok(app.tagger.tag(&req.text)?)).await?;
    let processing_ms = started.elapsed().as_millis() as u64;

    info!(chars, entities = result.entities.len(), processing_ms, "tagged text");
    Ok(Json(TagResponse {
        total_tokens: result.tokens.len(),
        tokens: result.tokens,
        entities: result.entities,
        alternatives: result.alternatives,
        processing_ms,
    }))
}

#[derive(Deserialize)]
struct DecodeRequest {
    tokens: Vec<String>,
    #[serde(default)]
    aux: Option<Vec<String>>,
    #[serde(default = "default_n_best")]
    n_best: usize,
}

fn default_n_best() -> usize {
    1
}

#[derive(Serialize)]
struct DecodeResponse {
    sequences: Vec<Sequence>,
}

/// Decodificação de tokens já segmentados, com dados auxiliares opcionais.
async fn decode_handler(
    State(state): State<SharedState>,
    Json(req): Json<DecodeRequest>,
) -> Result<Json<DecodeResponse>, ApiError> {
    if req.n_best == 0 {
        return Err(ApiError::BadRequest("n_best must be at least 1".to_string()));
    }
    if let Some(aux) = &req.aux {
        if aux.len() != req.tokens.len() {
            return Err(ApiError::BadRequest(format!(
                "aux has {} entries for {} tokens",
                aux.len(),
                req.tokens.len()
            )));
        }
    }

    let sequences = blocking(&state, move |app| {
        Ok(app
            .tagger
            .tag_tokens(req.tokens.as_slice(), req.aux.as_deref(), req.n_best)?)
    })
    .await?;
    Ok(Json(DecodeResponse { sequences }))
}
