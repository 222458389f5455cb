//! Change-signal extraction
//!
//! Classifies each changed file into a category and bundles the results
//! with the PR diff and aggregate counts. Classification is first-match:
//! api, then config, then documentation, then test, then other.

use crate::models::{ChangeSignals, ClassifiedFile, FileCategory};
use crate::services::github::ChangedFile;

const API_NAME_INDICATORS: &[&str] = &["api", "endpoint", "route", "controller", "service"];
const API_PATCH_INDICATORS: &[&str] = &[
    "def ",
    "function ",
    "class ",
    "interface ",
    "@app.route",
    "router.",
    "express.",
    "fastapi",
];
const CONFIG_EXTENSIONS: &[&str] = &[".json", ".yaml", ".yml", ".toml", ".ini", ".cfg"];
const DOC_EXTENSIONS: &[&str] = &[".md", ".rst", ".txt", ".adoc"];
const TEST_INDICATOR: &str = "test";

/// Assign a category to one file. Matching is case-insensitive and
/// first-match wins, so `api_test.py` is api, not test. A file counts as
/// api if either its name carries an api indicator or its patch contains
/// function/route-shaped tokens.
pub fn classify_file(path: &str, patch: &str) -> FileCategory {
    let lower = path.to_lowercase();

    if API_NAME_INDICATORS.iter().any(|ind| lower.contains(ind)) {
        return FileCategory::Api;
    }
    let patch_lower = patch.to_lowercase();
    if !patch_lower.is_empty()
        && API_PATCH_INDICATORS.iter().any(|ind| patch_lower.contains(ind))
    {
        return FileCategory::Api;
    }
    if CONFIG_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        return FileCategory::Config;
    }
    if DOC_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        return FileCategory::Documentation;
    }
    if lower.contains(TEST_INDICATOR) {
        return FileCategory::Test;
    }
    FileCategory::Other
}

pub struct SignalExtractor;

impl SignalExtractor {
    /// Build the classifier input from a PR file listing and its diff.
    pub fn extract(files: &[ChangedFile], diff: String) -> ChangeSignals {
        let classified: Vec<ClassifiedFile> = files
            .iter()
            .map(|f| {
                let patch = f.patch.as_deref().unwrap_or("");
                let patch_lower = patch.to_lowercase();
                ClassifiedFile {
                    path: f.filename.clone(),
                    category: classify_file(&f.filename, patch),
                    additions: f.additions,
                    deletions: f.deletions,
                    mentions_public_interface: patch_lower.contains("public")
                        || patch_lower.contains("export"),
                }
            })
            .collect();

        let additions = classified.iter().map(|f| f.additions).sum();
        let deletions = classified.iter().map(|f| f.deletions).sum();

        ChangeSignals {
            files: classified,
            diff,
            additions,
            deletions,
        }
    }

    /// Paths that should be called out in generated documentation:
    /// api-classified files, plus files whose patch touched something
    /// marked public or exported.
    pub fn files_requiring_docs(signals: &ChangeSignals) -> Vec<String> {
        signals
            .files
            .iter()
            .filter(|f| f.category == FileCategory::Api || f.mentions_public_interface)
            .map(|f| f.path.clone())
            .collect()
    }
}
