//! HTTP server: payment webhook and VIN decode API

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use docuhaul_ai::AiBackend;
use docuhaul_app::app::{self, DecodeStep, DecodedVin, FlowError, WebhookOutcome};
use docuhaul_infra::lemonsqueezy::SIGNATURE_HEADER;
use docuhaul_infra::persistence::{FileAccountRepository, FileDocumentRepository};
use docuhaul_types::{Error, Result};

/// Errors returned to HTTP clients
#[derive(Debug)]
pub enum ServerError {
    Unauthorized(String),
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<FlowError> for ServerError {
    fn from(err: FlowError) -> Self {
        match err {
            FlowError::InvalidInput(msg) => ServerError::BadRequest(msg),
            FlowError::Unauthorized(msg) => ServerError::Unauthorized(msg),
            FlowError::NotFound(msg) => ServerError::NotFound(msg),
            FlowError::GenerationFailed(msg) | FlowError::Storage(msg) => ServerError::Internal(msg),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ServerError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ServerError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Shared server state
#[derive(Clone)]
pub struct AppState {
    pub documents: Arc<Mutex<FileDocumentRepository>>,
    pub accounts: Arc<Mutex<FileAccountRepository>>,
    pub backend: Arc<dyn AiBackend + Send + Sync>,
    pub webhook_secret: Option<String>,
    pub free_quota: u32,
}

fn lock<T>(mutex: &Mutex<T>) -> std::result::Result<MutexGuard<'_, T>, ServerError> {
    mutex
        .lock()
        .map_err(|_| ServerError::Internal("repository lock poisoned".to_string()))
}

/// Run store or backend work on the blocking pool so repository locks and
/// AI processes never hold up the async workers.
async fn blocking<T, F>(work: F) -> std::result::Result<T, ServerError>
where
    F: FnOnce() -> std::result::Result<T, ServerError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ServerError::Internal(format!("blocking task failed: {}", e)))?
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/webhooks/lemonsqueezy", post(webhook_handler))
        .route("/api/vin/decode", post(decode_handler))
        .with_state(state)
}

pub async fn health_handler() -> &'static str {
    "ok"
}

pub async fn webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> std::result::Result<Json<WebhookOutcome>, ServerError> {
    let secret = state.webhook_secret.clone().ok_or_else(|| {
        ServerError::Internal("webhook secret is not configured".to_string())
    })?;
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let outcome = blocking(move || {
        let accounts = lock(&state.accounts)?;
        app::handle_webhook(&*accounts, &secret, &body, signature.as_deref()).map_err(ServerError::from)
    })
    .await?;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodeRequest {
    pub vin: String,
    /// Account to decode for; anonymous requests only get the offline check
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub describe: bool,
}

pub async fn decode_handler(
    State(state): State<AppState>,
    Json(request): Json<DecodeRequest>,
) -> std::result::Result<Json<DecodedVin>, ServerError> {
    let Some(user_id) = request.user_id else {
        return Ok(Json(app::check_vin_input(&request.vin)));
    };

    let accounts = Arc::clone(&state.accounts);
    let free_quota = state.free_quota;
    let step = blocking(move || {
        let accounts = lock(&accounts)?;
        app::begin_decode(&*accounts, free_quota, &user_id, &request.vin, request.describe)
            .map_err(ServerError::from)
    })
    .await?;

    let pending = match step {
        DecodeStep::Done(decoded) => return Ok(Json(decoded)),
        DecodeStep::NeedsDescription(pending) => pending,
    };

    // No repository lock is held while the backend runs
    let backend = Arc::clone(&state.backend);
    let prompt = pending.prompt().to_string();
    let response = blocking(move || {
        backend
            .send_prompt(&prompt)
            .map_err(|e| ServerError::from(FlowError::from(e)))
    })
    .await?;

    let decoded = blocking(move || {
        let documents = lock(&state.documents)?;
        let accounts = lock(&state.accounts)?;
        app::finish_decode(&*documents, &*accounts, state.free_quota, pending, &response)
            .map_err(ServerError::from)
    })
    .await?;

    Ok(Json(decoded))
}

/// Bind and serve until Ctrl+C or SIGTERM
pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let app = router(state);

    let address = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(Error::Io)?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
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
}
