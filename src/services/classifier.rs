//! Documentation-requirement classifier
//!
//! Two passes over a change set. A coarse scan over the raw diff text
//! looks for API-shaped tokens and assigns an impact level. A scoring
//! pass over the classified files accumulates a confidence score and maps
//! the pair into a priority tier.

use crate::models::{ChangeSignals, DiffImpact, DocRequirement, FileCategory, ImpactLevel, Priority};
use crate::services::extractor::SignalExtractor;

const DIFF_KEYWORDS: &[&str] = &[
    "def ",
    "function ",
    "class ",
    "interface ",
    "endpoint",
    "route",
];
const CODE_EXTENSIONS: &[&str] = &[".py", ".js", ".ts", ".java"];

// Confidence is accumulated in hundredths so that 0.5 + 0.1 compares
// equal to the 0.6 cutoff instead of drifting past it.
const BASE_CONFIDENCE: u32 = 50;
const CODE_BONUS: u32 = 30;
const CONFIG_BONUS: u32 = 20;
const DOC_BONUS: u32 = 10;
const MAX_CONFIDENCE: u32 = 100;

const REQUIRES_CUTOFF: u32 = 60;
const HIGH_CUTOFF: u32 = 70;
const CRITICAL_CUTOFF: u32 = 80;
const MEDIUM_CUTOFF: u32 = 50;

pub struct DocClassifier;

impl DocClassifier {
    /// Coarse scan over the change set. API-shaped keywords in the raw
    /// diff mean high impact; a changed config-category file means
    /// medium; otherwise low.
    pub fn scan_diff(signals: &ChangeSignals) -> DiffImpact {
        let lower = signals.diff.to_lowercase();
        let mut reasons = Vec::new();
        let mut level = ImpactLevel::Low;

        let hit_keywords: Vec<&str> = DIFF_KEYWORDS
            .iter()
            .copied()
            .filter(|kw| lower.contains(kw))
            .collect();
        if !hit_keywords.is_empty() {
            level = ImpactLevel::High;
            reasons.push(format!(
                "diff contains API indicators: {}",
                hit_keywords.join(", ").trim()
            ));
        }

        if signals.count_in(FileCategory::Config) > 0 {
            if level == ImpactLevel::Low {
                level = ImpactLevel::Medium;
            }
            reasons.push("configuration files changed".to_string());
        }

        let readme_changed = signals
            .files
            .iter()
            .any(|f| f.path.to_lowercase().contains("readme"));
        if readme_changed {
            if level == ImpactLevel::Low {
                level = ImpactLevel::Medium;
            }
            reasons.push("README was modified".to_string());
        }

        DiffImpact { level, reasons }
    }

    /// Score the change set and map it into a DocRequirement.
    pub fn classify(signals: &ChangeSignals, diff_impact: &DiffImpact) -> DocRequirement {
        let mut confidence = BASE_CONFIDENCE;
        let mut actions = Vec::new();
        let mut reasons = Vec::new();

        let has_code_files = signals.files.iter().any(|f| {
            !matches!(
                f.category,
                FileCategory::Test | FileCategory::Documentation
            ) && CODE_EXTENSIONS
                .iter()
                .any(|ext| f.path.to_lowercase().ends_with(ext))
        });
        if has_code_files {
            confidence += CODE_BONUS;
            actions.push("review for API doc updates".to_string());
            reasons.push("code files changed".to_string());
        }
        if signals.count_in(FileCategory::Config) > 0 {
            confidence += CONFIG_BONUS;
            actions.push("update configuration documentation".to_string());
            reasons.push("config files changed".to_string());
        }
        if signals.count_in(FileCategory::Documentation) > 0 {
            confidence += DOC_BONUS;
            actions.push("review doc changes for consistency".to_string());
            reasons.push("documentation files changed".to_string());
        }
        confidence = confidence.min(MAX_CONFIDENCE);

        if actions.is_empty() {
            actions = diff_impact.reasons.clone();
        }

        let diff_says_update = diff_impact.level == ImpactLevel::High;
        let requires_docs =
            !signals.files.is_empty() && (diff_says_update || confidence > REQUIRES_CUTOFF);

        let priority = if !requires_docs {
            Priority::None
        } else if diff_impact.level == ImpactLevel::High && confidence > CRITICAL_CUTOFF {
            Priority::Critical
        } else if diff_impact.level == ImpactLevel::High || confidence > HIGH_CUTOFF {
            Priority::High
        } else if diff_impact.level == ImpactLevel::Medium || confidence > MEDIUM_CUTOFF {
            Priority::Medium
        } else {
            Priority::Low
        };

        DocRequirement {
            requires_docs,
            priority,
            impact_level: diff_impact.level,
            confidence: f64::from(confidence) / 100.0,
            suggested_actions: actions,
            files_requiring_docs: SignalExtractor::files_requiring_docs(signals),
            reasons,
        }
    }
}
