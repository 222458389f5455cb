//! Write-back engine
//!
//! Publishes generated documentation either as a PR comment or as a
//! managed section in the repository README. The README merge keeps
//! exactly one "Recent Documentation Updates" section: an existing one is
//! replaced in place, otherwise the section is inserted near the top.

use crate::models::{GeneratedContent, WriteBackReport};
use crate::services::github::{GitHubClient, GitHubError};
use chrono::Utc;
use thiserror::Error;
use tracing::info;

const SECTION_HEADING: &str = "## Recent Documentation Updates";
const ATTRIBUTION_FOOTER: &str =
    "*This documentation update was automatically generated by DocuSync AI*";

#[derive(Debug, Error)]
pub enum WriteBackError {
    #[error("write-back failed: {0}")]
    GitHub(#[from] GitHubError),
}

pub struct WriteBackEngine {
    github: GitHubClient,
}

impl WriteBackEngine {
    pub fn new(github: GitHubClient) -> Self {
        Self { github }
    }

    /// Post the generated text as an issue comment on the PR.
    pub async fn post_comment(
        &self,
        repo: &str,
        pr_number: u64,
        content: &GeneratedContent,
    ) -> Result<WriteBackReport, WriteBackError> {
        let body = format!("{}\n\n---\n{}", content.text, ATTRIBUTION_FOOTER);
        let comment = self
            .github
            .create_issue_comment(repo, pr_number, &body)
            .await?;
        info!(repo, pr = pr_number, comment_id = comment.id, url = %comment.html_url, "posted documentation comment");
        Ok(WriteBackReport {
            target: "comment".to_string(),
            detail: format!("comment {} posted at {}", comment.id, comment.html_url),
            comment_id: Some(comment.id),
            comment_url: Some(comment.html_url),
        })
    }

    /// Merge the generated text into README.md on the PR branch. A missing
    /// README is created from a one-line title stub.
    pub async fn update_readme(
        &self,
        repo: &str,
        branch: &str,
        pr_number: u64,
        content: &GeneratedContent,
    ) -> Result<WriteBackReport, WriteBackError> {
        let (current, sha) = match self.github.get_file_content(repo, "README.md", branch).await? {
            Some(file) => (file.content, Some(file.sha)),
            None => {
                let repo_name = repo.rsplit('/').next().unwrap_or(repo);
                (format!("# {repo_name}\n\n"), None)
            }
        };

        let section = render_section(pr_number, &content.text);
        let merged = merge_section(&current, &section);
        let message = format!("docs: update documentation for PR #{pr_number}");
        self.github
            .put_file_content(repo, "README.md", branch, &message, &merged, sha.as_deref())
            .await?;
        info!(repo, branch, pr = pr_number, "README updated");
        Ok(WriteBackReport {
            target: "readme".to_string(),
            detail: format!("README.md updated on {branch}"),
            comment_id: None,
            comment_url: None,
        })
    }
}

/// Render the managed README block for one PR.
pub fn render_section(pr_number: u64, insight: &str) -> String {
    let date = Utc::now().format("%Y-%m-%d");
    format!(
        "\n{SECTION_HEADING}\n\n### PR #{pr_number} - AI-Enhanced Documentation ({date})\n\n{insight}\n\n---\n{ATTRIBUTION_FOOTER}\n"
    )
}

/// Merge the managed section into README text. If a previous section
/// exists its whole span is replaced; otherwise the section is inserted
/// after the title, before the first `##` heading, or appended.
pub fn merge_section(current: &str, section: &str) -> String {
    let lines: Vec<&str> = current.lines().collect();
    let section_lines: Vec<&str> = section.lines().collect();

    if let Some((start, end)) = existing_span(&lines) {
        let mut out: Vec<&str> = Vec::with_capacity(lines.len());
        out.extend_from_slice(&lines[..start]);
        out.extend_from_slice(&section_lines);
        out.extend_from_slice(&lines[end..]);
        return join(&out);
    }

    let insert_at = insertion_point(&lines);
    let mut out: Vec<&str> = Vec::with_capacity(lines.len() + section_lines.len());
    out.extend_from_slice(&lines[..insert_at]);
    out.extend_from_slice(&section_lines);
    out.extend_from_slice(&lines[insert_at..]);
    join(&out)
}

/// Locate the span of an existing managed section: from the heading (or
/// the blank line just before it) up to the next `##` heading or just
/// past the attribution footer.
fn existing_span(lines: &[&str]) -> Option<(usize, usize)> {
    let heading_idx = lines
        .iter()
        .position(|l| l.contains("Recent Documentation Updates"))?;

    let start = if heading_idx > 0 && lines[heading_idx - 1].trim().is_empty() {
        heading_idx - 1
    } else {
        heading_idx
    };

    let mut end = lines.len();
    for (j, line) in lines.iter().enumerate().skip(heading_idx + 1) {
        if line.starts_with("## ") && j > heading_idx + 1 {
            end = j;
            break;
        }
        if line.trim() == ATTRIBUTION_FOOTER {
            end = j + 1;
            break;
        }
    }
    Some((start, end))
}

/// Pick where a fresh section goes: after the document title and its
/// intro content, else before the first `##` heading, else end of file.
fn insertion_point(lines: &[&str]) -> usize {
    if let Some(title_idx) = lines.iter().position(|l| l.starts_with("# ")) {
        for (j, line) in lines.iter().enumerate().skip(title_idx + 1) {
            if line.starts_with('#') {
                return j;
            }
        }
        return lines.len();
    }
    if let Some(idx) = lines.iter().position(|l| l.starts_with("## ")) {
        return idx;
    }
    lines.len()
}

fn join(lines: &[&str]) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
