//! Bot API consumed by the WhatsApp integration.
//!
//! Endpoints:
//!
//! - `POST /chat`: One dialogue turn
//! - `POST /simple_chat`: Ask the knowledge base directly, no dialogue state
//! - `POST /extract_data`: What extraction and merge would make of a message
//! - `POST /next_question`: What the next turn would ask for a context

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::post,
};
use qaryz_core::{ExtractionResult, Intent, SessionState};
use qaryz_dialogue::{CompletionStatus, TurnInput, TurnResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::SharedState;

pub fn api_router(state: SharedState) -> Router {
    Router::new()
        .route("/chat", post(chat_handler))
        .route("/simple_chat", post(simple_chat_handler))
        .route("/extract_data", post(extract_data_handler))
        .route("/next_question", post(next_question_handler))
        .with_state(state)
}

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub whatsapp_id: String,
    pub message: String,
    /// Context snapshot returned by the previous turn.
    #[serde(default)]
    pub context: Value,
    #[serde(default)]
    pub session_state: SessionState,
}

impl ChatRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.whatsapp_id.trim().is_empty() {
            return Err(bad_request("whatsapp_id must not be empty"));
        }
        if self.message.trim().is_empty() {
            return Err(bad_request("message must not be empty"));
        }
        Ok(())
    }

    fn into_turn(self) -> TurnInput {
        TurnInput {
            conversation_id: self.whatsapp_id,
            message: self.message,
            context: self.context,
            session_state: self.session_state,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SimpleChatRequest {
    message: String,
}

#[derive(Serialize)]
struct SimpleChatResponse {
    response: String,
}

#[derive(Serialize)]
struct ExtractDataResponse {
    extraction_result: ExtractionResult,
    merged_context: Value,
}

#[derive(Serialize)]
struct NextQuestionResponse {
    next_question: Option<String>,
    completion_status: CompletionStatus,
    user_intent: Intent,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<TurnResponse>, ApiError> {
    payload.validate()?;
    info!(
        whatsapp_id = %payload.whatsapp_id,
        message_len = payload.message.chars().count(),
        "chat request"
    );

    if let Some(limiter) = &state.conversation_limiter
        && !limiter.check(&payload.whatsapp_id)
    {
        warn!(whatsapp_id = %payload.whatsapp_id, "Conversation rate limit exceeded");
        return Err((
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse {
                error: "too many messages for this conversation, try again later".into(),
            }),
        ));
    }

    let lock = state.locks.lock_for(&payload.whatsapp_id);
    let _turn = lock.lock().await;

    let response = state.controller.handle_turn(payload.into_turn()).await;
    Ok(Json(response))
}

async fn simple_chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<SimpleChatRequest>,
) -> Result<Json<SimpleChatResponse>, ApiError> {
    if payload.message.trim().is_empty() {
        return Err(bad_request("message must not be empty"));
    }
    info!(message_len = payload.message.chars().count(), "simple_chat request");

    let response = state.controller.answer_directly(&payload.message).await;
    Ok(Json(SimpleChatResponse { response }))
}

async fn extract_data_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ExtractDataResponse>, ApiError> {
    payload.validate()?;

    let (extraction_result, merged) = state
        .controller
        .preview_extraction(&payload.message, &payload.context)
        .await
        .map_err(|e| bad_request(e.to_string()))?;

    Ok(Json(ExtractDataResponse {
        extraction_result,
        merged_context: merged.to_snapshot(),
    }))
}

async fn next_question_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<NextQuestionResponse>, ApiError> {
    payload.validate()?;

    let (question, completion_status, user_intent) = state
        .controller
        .preview_next_question(&payload.context)
        .map_err(|e| bad_request(e.to_string()))?;

    Ok(Json(NextQuestionResponse {
        next_question: question.map(|q| q.question),
        completion_status,
        user_intent,
    }))
}
