use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::client::AuraRelay;
use crate::config::Config;
use crate::domains::envelope::{DeliveryContext, InboundMessage};
use crate::error::{AuraRelayError, Result};
use crate::factories::relay_factory::RelayFactory;
use crate::interfaces::queue::QueuePublisher;
use crate::scheduler::Scheduler;
use crate::services::queue::ChannelPublisher;

pub const DELIVERY_COUNT_HEADER: &str = "x-delivery-count";
pub const MESSAGE_ID_HEADER: &str = "x-message-id";

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<AuraRelay>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    retryable: bool,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/messages", post(receive_message))
        .route("/heartbeat", post(heartbeat))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn receive_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let ctx = delivery_context(&headers);
    match state.relay.handle_message(inbound_from_body(&body), &ctx).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn heartbeat(State(state): State<AppState>) -> Response {
    match state.relay.heartbeat().await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({"status": "ok"}))).into_response(),
        Err(err) => error_response(err),
    }
}

/// JSON bodies are taken as delivered (a JSON string is text, anything else is
/// structured); bodies that are not JSON at all go through as raw text.
fn inbound_from_body(body: &Bytes) -> InboundMessage {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => InboundMessage::from(value),
        Err(_) => InboundMessage::Text(String::from_utf8_lossy(body).into_owned()),
    }
}

fn delivery_context(headers: &HeaderMap) -> DeliveryContext {
    let delivery_count = headers
        .get(DELIVERY_COUNT_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u32>().ok())
        .unwrap_or(1);
    let message_id = headers
        .get(MESSAGE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string());
    DeliveryContext {
        delivery_count,
        message_id,
    }
}

fn error_response(err: AuraRelayError) -> Response {
    let status = match &err {
        AuraRelayError::Parse(_)
        | AuraRelayError::InvalidEnvelope(_)
        | AuraRelayError::InvalidEnvelopeFields(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AuraRelayError::Forward { .. }
        | AuraRelayError::Upstream(_)
        | AuraRelayError::MalformedUpstreamResponse(_)
        | AuraRelayError::Heartbeat { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            retryable: err.is_retryable(),
            error: err.to_string(),
        }),
    )
        .into_response()
}

pub async fn run(host: &str, port: u16, config: Config) -> Result<()> {
    run_with_shutdown(host, port, config, futures::future::pending::<()>()).await
}

pub async fn run_with_shutdown<F>(host: &str, port: u16, config: Config, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let publisher = match RelayFactory::publisher_from_config(&config) {
        Some(publisher) => publisher,
        None => log_only_publisher(config.outbound_queue()),
    };
    let relay = Arc::new(RelayFactory::create_from_config(&config, publisher)?);

    let mut scheduler = Scheduler::new();
    if config.heartbeat_enabled() {
        info!(
            url = relay.heartbeat_url(),
            schedule = %relay.heartbeat_schedule(),
            "heartbeat scheduled"
        );
        scheduler.register_job(Arc::new(relay.heartbeat_job()));
    }
    scheduler.start();

    let app = build_router(AppState { relay });

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AuraRelayError::Runtime(e.to_string()))?;
    info!(addr = %addr, "relay listening");
    let shutdown = async move {
        shutdown.await;
        scheduler.stop().await;
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AuraRelayError::Runtime(e.to_string()))?;

    Ok(())
}

// Without a queue ingress, outbound messages are only logged.
fn log_only_publisher(queue: String) -> Arc<dyn QueuePublisher> {
    let (publisher, mut rx) = ChannelPublisher::new();
    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let payload = serde_json::to_string(&message).unwrap_or_default();
            warn!(queue = %queue, message = %payload, "no queue ingress configured, dropping outbound message");
        }
    });
    Arc::new(publisher)
}
