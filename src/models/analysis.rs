//! Analysis models
//!
//! Value types shared between the extraction, classification, generation
//! and write-back services.

use serde::{Deserialize, Serialize};

/// File role within the change set. Assigned by the extractor with a
/// fixed precedence: api beats config beats documentation beats test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    Api,
    Config,
    Documentation,
    Test,
    Other,
}

impl FileCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Config => "config",
            Self::Documentation => "documentation",
            Self::Test => "test",
            Self::Other => "other",
        }
    }
}

/// One changed file from the PR file listing, tagged with its category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedFile {
    pub path: String,
    pub category: FileCategory,
    pub additions: u64,
    pub deletions: u64,
    /// Patch text mentioned `public` or `export`, suggesting an interface
    /// change worth documenting even for non-api files.
    #[serde(default)]
    pub mentions_public_interface: bool,
}

/// Everything the classifier needs about a pull request's changes.
#[derive(Debug, Clone, Default)]
pub struct ChangeSignals {
    pub files: Vec<ClassifiedFile>,
    pub diff: String,
    pub additions: u64,
    pub deletions: u64,
}

impl ChangeSignals {
    pub fn files_in(&self, category: FileCategory) -> impl Iterator<Item = &ClassifiedFile> {
        self.files.iter().filter(move |f| f.category == category)
    }

    pub fn count_in(&self, category: FileCategory) -> usize {
        self.files_in(category).count()
    }

    /// Bounded prefix of the diff, cut on a char boundary. Carried on the
    /// analysis for logs and prompts that cannot take the whole diff.
    pub fn diff_preview(&self) -> &str {
        match self.diff.char_indices().nth(1000) {
            Some((idx, _)) => &self.diff[..idx],
            None => &self.diff,
        }
    }
}

/// Coarse impact level from the diff scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
}

impl ImpactLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Diff scan result: impact level plus the textual reasons behind it.
#[derive(Debug, Clone)]
pub struct DiffImpact {
    pub level: ImpactLevel,
    pub reasons: Vec<String>,
}

/// Documentation priority assigned by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Classifier verdict for one pull request.
#[derive(Debug, Clone, Serialize)]
pub struct DocRequirement {
    pub requires_docs: bool,
    pub priority: Priority,
    pub impact_level: ImpactLevel,
    pub confidence: f64,
    pub suggested_actions: Vec<String>,
    pub files_requiring_docs: Vec<String>,
    pub reasons: Vec<String>,
}

/// Where a piece of generated documentation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    Llm,
    Fallback,
}

/// Output of the content generator. Always present: the generator falls
/// back to a template when the model is unavailable or returns nothing.
#[derive(Debug, Clone)]
pub struct GeneratedContent {
    pub text: String,
    pub source: ContentSource,
}

/// Write-back outcome returned to the pipeline for logging. Comment mode
/// carries the id and url GitHub assigned to the created comment.
#[derive(Debug, Clone)]
pub struct WriteBackReport {
    pub target: String,
    pub detail: String,
    pub comment_id: Option<u64>,
    pub comment_url: Option<String>,
}
