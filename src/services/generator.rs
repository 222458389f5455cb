//! Content generator
//!
//! Produces the documentation text for a PR, either from the LLM or from
//! a deterministic template. This service never fails: any LLM problem
//! degrades to the fallback path.

use crate::config::WriteBackMode;
use crate::models::{ContentSource, DocRequirement, GeneratedContent};
use crate::services::llm::{self, GenerationParams, LlmClient};
use tracing::{info, warn};

const DIFF_EXCERPT_LIMIT: usize = 2000;

const DEFAULT_ACTIONS: &[&str] = &[
    "Update relevant documentation sections",
    "Review API changes",
    "Verify code examples",
];

/// Inputs describing the PR being documented.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    pub repo_full_name: String,
    pub pr_number: u64,
    pub files_changed: usize,
    pub additions: u64,
    pub deletions: u64,
    pub diff: String,
}

pub struct ContentGenerator {
    llm: LlmClient,
}

impl ContentGenerator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    /// Generate documentation text. Tries the LLM first; an unconfigured
    /// key, a request error, or an empty extraction all fall back to the
    /// template, so the caller always gets content.
    pub async fn generate(
        &self,
        requirement: &DocRequirement,
        ctx: &GenerationContext,
        mode: WriteBackMode,
    ) -> GeneratedContent {
        let params = match mode {
            WriteBackMode::Readme => GenerationParams::for_readme(),
            WriteBackMode::Comment => GenerationParams::for_comment(),
        };

        match self.llm.generate(&build_prompt(requirement, ctx), params).await {
            Ok(response) => {
                let text = llm::extract_text(&response);
                if text.trim().is_empty() {
                    warn!(repo = %ctx.repo_full_name, pr = ctx.pr_number, "llm returned empty text, using fallback");
                    fallback(requirement, ctx, mode)
                } else {
                    info!(repo = %ctx.repo_full_name, pr = ctx.pr_number, chars = text.len(), "llm content generated");
                    GeneratedContent {
                        text,
                        source: ContentSource::Llm,
                    }
                }
            }
            Err(e) => {
                warn!(repo = %ctx.repo_full_name, pr = ctx.pr_number, error = %e, "llm unavailable, using fallback");
                fallback(requirement, ctx, mode)
            }
        }
    }
}

fn build_prompt(requirement: &DocRequirement, ctx: &GenerationContext) -> String {
    let actions = if requirement.suggested_actions.is_empty() {
        "None specified".to_string()
    } else {
        requirement.suggested_actions.join(", ")
    };
    let excerpt = truncate_diff(&ctx.diff);
    let diff_block = if excerpt.is_empty() {
        "Diff not available"
    } else {
        &excerpt
    };

    format!(
        "You are DocuSync AI, an expert technical documentation assistant. \
         Analyze this GitHub Pull Request and create comprehensive documentation insights.\n\n\
         **Repository**: {repo}\n\
         **PR Number**: #{pr}\n\
         **Priority**: {priority}\n\
         **Files Changed**: {files}\n\
         **Requires Documentation**: {requires}\n\
         **Suggested Actions**: {actions}\n\n\
         **PR Diff (if available)**:\n{diff}\n\n\
         Please generate a comprehensive documentation analysis that includes:\n\n\
         1. **Change Analysis**: Analyze the technical impact and scope of changes\n\
         2. **Documentation Requirements**: Specific documentation updates needed\n\
         3. **Implementation Insights**: Technical details about what was changed\n\
         4. **Developer Guidance**: Clear next steps for the development team\n\
         5. **Quality Assessment**: Overall code quality and documentation readiness\n\n\
         Format your response as a detailed technical analysis. Use clear headings, \
         bullet points, and actionable recommendations.",
        repo = ctx.repo_full_name,
        pr = ctx.pr_number,
        priority = requirement.priority.as_str(),
        files = ctx.files_changed,
        requires = requirement.requires_docs,
        actions = actions,
        diff = diff_block,
    )
}

/// Bounded diff excerpt, cut on a char boundary.
fn truncate_diff(diff: &str) -> String {
    diff.chars().take(DIFF_EXCERPT_LIMIT).collect()
}

fn fallback(
    requirement: &DocRequirement,
    ctx: &GenerationContext,
    mode: WriteBackMode,
) -> GeneratedContent {
    let text = match mode {
        WriteBackMode::Comment => comment_fallback(requirement, ctx),
        WriteBackMode::Readme => readme_fallback(requirement, ctx),
    };
    GeneratedContent {
        text,
        source: ContentSource::Fallback,
    }
}

fn action_bullets(requirement: &DocRequirement) -> String {
    let actions: Vec<String> = if requirement.suggested_actions.is_empty() {
        DEFAULT_ACTIONS.iter().map(|s| s.to_string()).collect()
    } else {
        requirement.suggested_actions.clone()
    };
    actions.iter().map(|a| format!("- {a}\n")).collect()
}

/// Component-built comment body used when no AI text is available in
/// comment mode: the analysis-details block plus a docs-required or
/// no-docs-needed section.
fn comment_fallback(requirement: &DocRequirement, ctx: &GenerationContext) -> String {
    let mut body = format!(
        "## DocuSync AI Analysis\n\n\
         ### Analysis Details\n\
         - **Priority**: {priority}\n\
         - **Files Changed**: {files}\n\
         - **Additions**: +{additions}\n\
         - **Deletions**: -{deletions}\n\
         - **Confidence Score**: {confidence:.2}\n\n",
        priority = requirement.priority.as_str(),
        files = ctx.files_changed,
        additions = ctx.additions,
        deletions = ctx.deletions,
        confidence = requirement.confidence,
    );
    if requirement.requires_docs {
        body.push_str(
            "### Documentation Updates Required\n\
             This PR requires documentation updates. Please review the suggested actions below:\n\n\
             **Suggested Actions:**\n",
        );
        body.push_str(&action_bullets(requirement));
    } else {
        body.push_str(
            "### No Documentation Updates Required\n\
             This PR does not require documentation updates based on the automated analysis.\n",
        );
    }
    body
}

fn readme_fallback(requirement: &DocRequirement, ctx: &GenerationContext) -> String {
    let priority = requirement.priority.as_str();
    if requirement.requires_docs {
        let bullets = action_bullets(requirement);
        format!(
            "## DocuSync AI Analysis\n\n\
             ### Technical Change Assessment\n\
             This pull request has been automatically analyzed and contains changes that impact documentation.\n\n\
             **Analysis Summary:**\n\
             - **Impact Priority**: {priority}\n\
             - **Files Modified**: {files}\n\
             - **Documentation Updates Required**: Yes\n\n\
             ### Documentation Requirements\n\
             Based on the automated code analysis, the following documentation updates are recommended:\n\n\
             {bullets}\n\
             ### Implementation Guidance\n\
             1. **Code Review**: Examine changes for new public APIs or modified interfaces\n\
             2. **Documentation Updates**: Update affected documentation sections\n\
             3. **Example Validation**: Test and update code examples as needed\n\
             4. **Changelog Updates**: Document user-facing changes\n",
            priority = priority,
            files = ctx.files_changed,
            bullets = bullets,
        )
    } else {
        format!(
            "## DocuSync AI Analysis\n\n\
             ### Technical Change Assessment\n\
             This pull request has been automatically analyzed and appears to be maintenance-focused.\n\n\
             **Analysis Summary:**\n\
             - **Impact Priority**: {priority}\n\
             - **Files Modified**: {files}\n\
             - **Documentation Updates Required**: Minimal or none needed\n\n\
             ### Change Classification\n\
             The modifications in this PR appear to be internal refactoring, bug fixes \
             that don't affect public interfaces, or maintenance updates with contained scope. \
             No significant documentation updates are required based on the automated analysis.\n",
            priority = priority,
            files = ctx.files_changed,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ImpactLevel, Priority};

    fn requirement(requires: bool, priority: Priority, actions: &[&str]) -> DocRequirement {
        DocRequirement {
            requires_docs: requires,
            priority,
            impact_level: ImpactLevel::Medium,
            confidence: 0.8,
            suggested_actions: actions.iter().map(|s| s.to_string()).collect(),
            files_requiring_docs: vec![],
            reasons: vec![],
        }
    }

    fn ctx(diff: &str) -> GenerationContext {
        GenerationContext {
            repo_full_name: "octo/widgets".into(),
            pr_number: 7,
            files_changed: 3,
            additions: 40,
            deletions: 5,
            diff: diff.into(),
        }
    }

    fn generator_without_key() -> ContentGenerator {
        ContentGenerator::new(LlmClient::with_base_url(
            None,
            "gemini-1.5-flash".into(),
            "http://localhost:1".into(),
        ))
    }

    #[tokio::test]
    async fn missing_key_yields_fallback_with_priority_and_actions() {
        let req = requirement(true, Priority::High, &["document the new endpoint"]);
        let content = generator_without_key()
            .generate(&req, &ctx("+def f():"), WriteBackMode::Readme)
            .await;
        assert_eq!(content.source, ContentSource::Fallback);
        assert!(content.text.contains("high"));
        assert!(content.text.contains("- document the new endpoint"));
    }

    #[tokio::test]
    async fn fallback_without_actions_uses_defaults() {
        let req = requirement(true, Priority::Medium, &[]);
        let content = generator_without_key()
            .generate(&req, &ctx(""), WriteBackMode::Comment)
            .await;
        assert!(content.text.contains("- Update relevant documentation sections"));
    }

    #[tokio::test]
    async fn maintenance_variant_when_docs_not_required() {
        let req = requirement(false, Priority::None, &[]);
        let content = generator_without_key()
            .generate(&req, &ctx(""), WriteBackMode::Readme)
            .await;
        assert_eq!(content.source, ContentSource::Fallback);
        assert!(content.text.contains("maintenance-focused"));
        assert!(content.text.contains("none"));
    }

    #[tokio::test]
    async fn comment_fallback_carries_analysis_details() {
        let req = requirement(true, Priority::High, &["refresh API docs"]);
        let content = generator_without_key()
            .generate(&req, &ctx("+x"), WriteBackMode::Comment)
            .await;
        assert!(content.text.contains("### Analysis Details"));
        assert!(content.text.contains("**Additions**: +40"));
        assert!(content.text.contains("**Deletions**: -5"));
        assert!(content.text.contains("**Confidence Score**: 0.80"));
        assert!(content.text.contains("- refresh API docs"));
    }

    #[tokio::test]
    async fn comment_fallback_no_docs_variant() {
        let req = requirement(false, Priority::None, &[]);
        let content = generator_without_key()
            .generate(&req, &ctx(""), WriteBackMode::Comment)
            .await;
        assert!(content.text.contains("No Documentation Updates Required"));
        assert!(!content.text.contains("Suggested Actions"));
    }

    #[test]
    fn prompt_embeds_pr_metadata_and_bounded_diff() {
        let req = requirement(true, Priority::Critical, &["a", "b"]);
        let long_diff = "x".repeat(5000);
        let prompt = build_prompt(&req, &ctx(&long_diff));
        assert!(prompt.contains("octo/widgets"));
        assert!(prompt.contains("#7"));
        assert!(prompt.contains("critical"));
        assert!(prompt.contains("a, b"));
        assert!(!prompt.contains(&"x".repeat(2001)));
        assert!(prompt.contains(&"x".repeat(2000)));
    }

    #[test]
    fn empty_diff_is_marked_unavailable() {
        let req = requirement(true, Priority::Low, &[]);
        let prompt = build_prompt(&req, &ctx(""));
        assert!(prompt.contains("Diff not available"));
        assert!(prompt.contains("None specified"));
    }
}
