//! HTTP API gateway for Qaryz.
//!
//! Exposes the dialogue engine to the WhatsApp integration, plus health and
//! debug endpoints. The caller keeps all conversation state; the gateway
//! only serializes turns per conversation.
//!
//! Built on Axum for high performance async HTTP.

pub mod api;
pub mod locks;
pub mod services;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware::{self, Next},
    response::Json,
    routing::get,
};
use qaryz_config::{AppConfig, GatewayConfig};
use qaryz_dialogue::DialogueController;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

pub use locks::ConversationLocks;
pub use services::{Components, Services, build_services};

/// Shared application state for the gateway.
pub struct GatewayState {
    pub controller: Arc<DialogueController>,
    pub components: Components,
    pub locks: ConversationLocks,
    /// `/chat` turns per `whatsapp_id`; `None` when disabled.
    pub(crate) conversation_limiter: Option<RateLimiter>,
    /// Static bearer token; `None` leaves the API open.
    pub api_token: Option<String>,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

pub type SharedState = Arc<GatewayState>;

impl GatewayState {
    pub fn new(services: Services, config: &GatewayConfig) -> Self {
        Self {
            controller: services.controller,
            components: services.components,
            locks: ConversationLocks::new(config.max_tracked_conversations),
            conversation_limiter: (config.conversation_rate_limit_per_minute > 0).then(|| {
                RateLimiter::new(
                    config.conversation_rate_limit_per_minute as usize,
                    std::time::Duration::from_secs(60),
                )
            }),
            api_token: config.api_token.clone().filter(|t| !t.is_empty()),
            started_at: chrono::Utc::now(),
        }
    }
}

/// Build the full router.
///
/// Layers applied:
/// - Bearer token authentication when `api_token` is set (`/health` and `/` exempt)
/// - Request body size limit
/// - In-memory rate limiting per bearer token (`/health` exempt); `/chat`
///   additionally limits each `whatsapp_id` on its own
/// - CORS for the bot endpoints
/// - HTTP trace logging
pub fn build_router(state: SharedState, config: &GatewayConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
        .max_age(std::time::Duration::from_secs(3600));

    let router = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .with_state(state.clone())
        .merge(api::api_router(state.clone()))
        .layer(middleware::from_fn_with_state(state, auth_middleware))
        .layer(DefaultBodyLimit::max(config.max_body_bytes));

    let router = if config.rate_limit_per_minute > 0 {
        let rate_limiter = Arc::new(RateLimiter::new(
            config.rate_limit_per_minute as usize,
            std::time::Duration::from_secs(60),
        ));
        router.layer(middleware::from_fn(move |req, next| {
            let limiter = rate_limiter.clone();
            rate_limit_middleware(limiter, req, next)
        }))
    } else {
        router
    };

    router
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
///
/// Builds the provider chain, the knowledge index and the dialogue
/// controller once and shares them across all requests.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let services = build_services(&config).await?;
    info!(
        provider = %services.components.provider,
        extractor = %services.components.extractor,
        phrasing = services.components.phrasing,
        knowledge_chunks = services.components.knowledge_chunks,
        "Dialogue engine ready"
    );
    if config.gateway.api_token.is_none() {
        warn!("No gateway.api_token configured; the API is open to anyone who can reach it");
    }

    let state = Arc::new(GatewayState::new(services, &config.gateway));
    let app = build_router(state, &config.gateway);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Rate Limiter ---

/// Simple in-memory sliding-window rate limiter.
///
/// Tracks request timestamps per client key: the bearer token (or
/// "anonymous") at the router, the `whatsapp_id` in `/chat`.
/// Thread-safe via `std::sync::Mutex` (non-async, held briefly).
pub(crate) struct RateLimiter {
    max_requests: usize,
    window: std::time::Duration,
    clients: std::sync::Mutex<HashMap<String, Vec<std::time::Instant>>>,
}

impl RateLimiter {
    fn new(max_requests: usize, window: std::time::Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: std::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Check if the client is within rate limits. Returns `true` if allowed.
    pub(crate) fn check(&self, client_key: &str) -> bool {
        let now = std::time::Instant::now();
        let mut clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());

        if clients.len() > 10_000 {
            clients.retain(|_, timestamps| {
                timestamps
                    .last()
                    .is_some_and(|t| now.duration_since(*t) < self.window)
            });
        }

        let timestamps = clients.entry(client_key.to_string()).or_default();
        timestamps.retain(|t| now.duration_since(*t) < self.window);

        if timestamps.len() >= self.max_requests {
            return false;
        }

        timestamps.push(now);
        true
    }
}

/// Returns 429 Too Many Requests once a client exceeds its window.
/// `/health` is exempt so monitoring can poll it freely.
async fn rate_limit_middleware(
    limiter: Arc<RateLimiter>,
    req: axum::extract::Request,
    next: Next,
) -> Result<axum::response::Response, StatusCode> {
    if req.uri().path() == "/health" {
        return Ok(next.run(req).await);
    }

    let client_key = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| "anonymous".to_string());

    if !limiter.check(&client_key) {
        warn!(client = %client_key.chars().take(20).collect::<String>(), "Rate limit exceeded");
        return Err(StatusCode::TOO_MANY_REQUESTS);
    }

    Ok(next.run(req).await)
}

/// Requires `Authorization: Bearer <api_token>` when a token is configured.
async fn auth_middleware(
    State(state): State<SharedState>,
    req: axum::extract::Request,
    next: Next,
) -> Result<axum::response::Response, StatusCode> {
    let Some(expected) = state.api_token.as_deref() else {
        return Ok(next.run(req).await);
    };

    if matches!(req.uri().path(), "/" | "/health") {
        return Ok(next.run(req).await);
    }

    let provided = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if provided == Some(expected) {
        Ok(next.run(req).await)
    } else {
        warn!(path = %req.uri().path(), "Unauthorized request: missing or invalid bearer token");
        Err(StatusCode::UNAUTHORIZED)
    }
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_secs: i64,
    components: Components,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: (chrono::Utc::now() - state.started_at).num_seconds(),
        components: state.components.clone(),
    })
}

#[derive(Serialize)]
struct RootResponse {
    message: &'static str,
    version: &'static str,
}

async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Qaryz bankruptcy consultation bot API",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use async_trait::async_trait;
    use qaryz_core::AnswerGenerator;

    pub struct CannedAnswers;

    #[async_trait]
    impl AnswerGenerator for CannedAnswers {
        async fn generate_answer(&self, _structured_query: &str) -> qaryz_core::Result<String> {
            Ok("Консультация из базы знаний.".into())
        }
    }

    pub fn services() -> Services {
        let controller = DialogueController::new(Arc::new(CannedAnswers));
        Services {
            components: Components {
                provider: "stub".into(),
                extractor: controller.extractor_name().to_string(),
                phrasing: "template",
                knowledge_chunks: 3,
                embeddings: false,
            },
            controller: Arc::new(controller),
        }
    }

    pub fn test_state_with(config: &GatewayConfig) -> SharedState {
        Arc::new(GatewayState::new(services(), config))
    }

    pub fn test_state() -> SharedState {
        test_state_with(&GatewayConfig::default())
    }
}
