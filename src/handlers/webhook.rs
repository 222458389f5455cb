//! Webhook handler
//!
//! Receives GitHub webhook deliveries, verifies the HMAC signature over
//! the raw body, and acknowledges with 200 before any real work happens.
//! Pull request events are handed to the pipeline on a spawned task.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::AppError;
use crate::models::{EventKind, WebhookEvent, WebhookPayload};
use crate::services::pipeline::verify_signature;
use crate::AppState;

#[derive(Serialize)]
struct WebhookAck {
    status: &'static str,
    message: String,
    event_type: String,
    delivery_id: Option<String>,
    timestamp: String,
}

fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}

/// POST /webhook
///
/// Signature failures return 401 and malformed JSON returns 400; every
/// accepted delivery gets a 200 immediately, whether or not the pipeline
/// ends up doing anything with it.
pub async fn receive_webhook(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let signature = header(&req, "X-Hub-Signature-256");
    let event_type = header(&req, "X-GitHub-Event").unwrap_or("unknown").to_string();
    let delivery_id = header(&req, "X-GitHub-Delivery").map(String::from);

    if !verify_signature(state.config.webhook_secret.as_deref(), &body, signature) {
        warn!(event_type, ?delivery_id, "webhook signature verification failed");
        return Err(AppError::Unauthorized(
            "webhook signature verification failed".to_string(),
        ));
    }

    let payload: WebhookPayload = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("invalid JSON payload: {e}")))?;

    let event = WebhookEvent::new(&event_type, delivery_id.clone(), &payload);
    info!(
        event_type,
        ?delivery_id,
        repo = event.repo_full_name.as_deref().unwrap_or("unknown"),
        action = event.action.as_deref().unwrap_or(""),
        "webhook received"
    );

    let message = if event.kind == EventKind::PullRequest {
        let pipeline = state.pipeline.clone();
        let task_event = event.clone();
        tokio::spawn(async move {
            let outcome = pipeline.process(task_event).await;
            info!(?outcome, "pipeline finished");
        });
        "pull request event queued for processing".to_string()
    } else {
        format!("event type {event_type} acknowledged, no processing")
    };

    Ok(HttpResponse::Ok().json(WebhookAck {
        status: "accepted",
        message,
        event_type,
        delivery_id,
        timestamp: Utc::now().to_rfc3339(),
    }))
}
