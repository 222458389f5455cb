use std::env;
use std::str::FromStr;

/// Where generated documentation is written back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteBackMode {
    /// Post the generated analysis as an issue comment on the PR.
    Comment,
    /// Merge the generated analysis into README.md on the PR branch.
    Readme,
}

impl WriteBackMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::Readme => "readme",
        }
    }
}

impl FromStr for WriteBackMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "comment" => Ok(Self::Comment),
            "readme" => Ok(Self::Readme),
            _ => Err(ConfigError::InvalidValue("WRITE_BACK_MODE")),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// GitHub access token used for all API calls (required)
    pub github_token: String,
    /// Shared secret for webhook signature verification.
    /// When unset, signature verification is disabled (accept-all mode).
    pub webhook_secret: Option<String>,
    /// LLM provider API key. When unset, generation always uses the
    /// deterministic fallback template.
    pub llm_api_key: Option<String>,
    /// LLM model identifier
    pub llm_model: String,
    /// Write-back target for generated documentation
    pub write_back_mode: WriteBackMode,
    /// Timeout for outbound GitHub/LLM requests in seconds (default: 30)
    pub request_timeout_secs: u64,
    /// Loop-guard suppression window in seconds (default: 180 = 3 minutes)
    pub loop_suppress_secs: u64,
    /// Loop-guard entry TTL in seconds (default: 600 = 10 minutes)
    pub loop_entry_ttl_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Fails fast when the GitHub token is missing; every other setting has
    /// a default or is optional.
    pub fn from_env() -> Result<Self, ConfigError> {
        let github_token =
            env::var("GITHUB_TOKEN").map_err(|_| ConfigError::MissingEnvVar("GITHUB_TOKEN"))?;
        if github_token.is_empty() {
            return Err(ConfigError::MissingEnvVar("GITHUB_TOKEN"));
        }

        let webhook_secret = env::var("GITHUB_WEBHOOK_SECRET")
            .ok()
            .filter(|s| !s.is_empty());
        let llm_api_key = env::var("LLM_API_KEY").ok().filter(|s| !s.is_empty());

        let llm_model = env::var("LLM_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string());

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let write_back_mode = env::var("WRITE_BACK_MODE")
            .unwrap_or_else(|_| "readme".to_string())
            .parse()?;

        let request_timeout_secs = env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("REQUEST_TIMEOUT_SECS"))?;

        let loop_suppress_secs = env::var("LOOP_SUPPRESS_SECS")
            .unwrap_or_else(|_| "180".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("LOOP_SUPPRESS_SECS"))?;

        let loop_entry_ttl_secs = env::var("LOOP_ENTRY_TTL_SECS")
            .unwrap_or_else(|_| "600".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("LOOP_ENTRY_TTL_SECS"))?;

        Ok(Self {
            host,
            port,
            github_token,
            webhook_secret,
            llm_api_key,
            llm_model,
            write_back_mode,
            request_timeout_secs,
            loop_suppress_secs,
            loop_entry_ttl_secs,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_back_mode_parses_case_insensitively() {
        assert_eq!(
            "comment".parse::<WriteBackMode>().unwrap(),
            WriteBackMode::Comment
        );
        assert_eq!(
            "Readme".parse::<WriteBackMode>().unwrap(),
            WriteBackMode::Readme
        );
        assert!("pr-comment".parse::<WriteBackMode>().is_err());
    }
}
