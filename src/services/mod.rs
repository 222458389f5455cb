pub mod classifier;
pub mod extractor;
pub mod generator;
pub mod github;
pub mod llm;
pub mod loop_guard;
pub mod pipeline;
pub mod write_back;

pub use classifier::DocClassifier;
pub use extractor::{SignalExtractor, classify_file};
pub use generator::{ContentGenerator, GenerationContext};
pub use github::{ChangedFile, CommitInfo, FileContent, GitHubClient, GitHubError, IssueComment, PrDetails};
pub use llm::{GenerationParams, LlmClient, LlmError, extract_text};
pub use loop_guard::{LoopGuard, LoopGuardConfig, doc_only_change};
pub use pipeline::{ProcessingState, WebhookPipeline, verify_signature};
pub use write_back::{WriteBackEngine, WriteBackError};
