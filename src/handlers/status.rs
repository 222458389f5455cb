//! Health and status handlers

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde_json::json;

use crate::AppState;

/// GET /health
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "github_token_configured": !state.config.github_token.is_empty(),
        "webhook_secret_configured": state.config.webhook_secret.is_some(),
        "llm_configured": state.config.llm_api_key.is_some(),
    }))
}

/// GET /status
pub async fn status(state: web::Data<AppState>) -> HttpResponse {
    let configured = |set: bool| if set { "configured" } else { "missing" };
    HttpResponse::Ok().json(json!({
        "service": "DocuSync Webhook Server",
        "status": "running",
        "configuration": {
            "github_token": configured(!state.config.github_token.is_empty()),
            "webhook_secret": configured(state.config.webhook_secret.is_some()),
            "llm": configured(state.config.llm_api_key.is_some()),
            "llm_model": state.config.llm_model,
            "write_back_mode": state.config.write_back_mode.as_str(),
            "port": state.config.port,
        },
        "endpoints": {
            "webhook": "/webhook",
            "health": "/health",
            "status": "/status",
        },
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
