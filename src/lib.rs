//! DocuSync - automated documentation for pull requests
//!
//! This library provides the webhook server, analysis pipeline, and
//! write-back services that keep repository documentation in step with
//! merged code changes.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

pub use config::{Config, WriteBackMode};
pub use error::AppError;

pub use models::{
    ChangeSignals, ClassifiedFile, DocRequirement, FileCategory, GeneratedContent, ImpactLevel,
    Priority, WebhookEvent, WebhookPayload,
};

pub use services::{
    ContentGenerator, DocClassifier, GitHubClient, LlmClient, LoopGuard, ProcessingState,
    SignalExtractor, WebhookPipeline, WriteBackEngine,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pipeline: Arc<WebhookPipeline>,
}
