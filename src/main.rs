use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docusync::config::Config;
use docusync::services::generator::ContentGenerator;
use docusync::services::github::GitHubClient;
use docusync::services::llm::LlmClient;
use docusync::services::loop_guard::{LoopGuard, LoopGuardConfig};
use docusync::services::pipeline::WebhookPipeline;
use docusync::services::write_back::WriteBackEngine;
use docusync::{handlers, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docusync=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().expect("Failed to load configuration");

    info!(
        "Starting DocuSync webhook server on {}:{}",
        config.host, config.port
    );
    if config.webhook_secret.is_none() {
        tracing::warn!("GITHUB_WEBHOOK_SECRET not set; signature verification is disabled");
    }
    if config.llm_api_key.is_none() {
        tracing::warn!("LLM_API_KEY not set; generation will use fallback templates");
    }

    let timeout = Duration::from_secs(config.request_timeout_secs);
    let github = GitHubClient::new(config.github_token.clone(), timeout)
        .expect("Failed to build GitHub client");
    let llm = LlmClient::new(config.llm_api_key.clone(), config.llm_model.clone(), timeout)
        .expect("Failed to build LLM client");

    let loop_guard = LoopGuard::new(LoopGuardConfig {
        suppress_window: chrono::Duration::seconds(config.loop_suppress_secs as i64),
        entry_ttl: chrono::Duration::seconds(config.loop_entry_ttl_secs as i64),
    });

    let pipeline = WebhookPipeline::new(
        config.clone(),
        github.clone(),
        ContentGenerator::new(llm),
        WriteBackEngine::new(github),
        loop_guard,
    );

    let app_state = web::Data::new(AppState {
        config: config.clone(),
        pipeline: Arc::new(pipeline),
    });

    let server_addr = format!("{}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(handlers::configure_routes)
    })
    .bind(&server_addr)?
    .run()
    .await
}
