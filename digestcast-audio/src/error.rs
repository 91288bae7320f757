//! Error types for digestcast-audio

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure reported by a TTS provider, already classified for retry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Rate limit, timeout, connection drop or 5xx: worth another attempt
    #[error("transient provider error: {message}")]
    Transient {
        message: String,
        retry_after: Option<Duration>,
    },

    /// Bad credential, exhausted quota or malformed request: retrying will not help
    #[error("terminal provider error: {message}")]
    Terminal { message: String },
}

impl ProviderError {
    pub fn transient(message: impl Into<String>) -> Self {
        ProviderError::Transient {
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn terminal(message: impl Into<String>) -> Self {
        ProviderError::Terminal {
            message: message.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Transient { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            ProviderError::Transient { message, .. } => message,
            ProviderError::Terminal { message } => message,
        }
    }
}

/// Audio generation errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Storage error at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AudioError {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AudioError::Storage {
            path: path.into(),
            source,
        }
    }

    /// Whether the failure could plausibly go away if the caller tried again later
    pub fn is_retryable(&self) -> bool {
        matches!(self, AudioError::Provider(e) if e.is_transient())
    }

    /// Short, actionable hint for end users
    pub fn user_message(&self) -> String {
        match self {
            AudioError::InvalidInput(msg) => format!(
                "The transcript could not be converted ({}). Check that it has content.",
                msg
            ),
            AudioError::Configuration(msg) => format!(
                "Audio settings are invalid: {}. Fix the configuration and try again.",
                msg
            ),
            AudioError::Provider(ProviderError::Transient { message, .. }) => {
                let lower = message.to_lowercase();
                if lower.contains("rate limit") {
                    "The TTS API rate limit was exceeded. Wait a few minutes before trying again."
                        .to_string()
                } else {
                    format!(
                        "The TTS service could not be reached ({}). \
                         Check your network connection and try again.",
                        message
                    )
                }
            }
            AudioError::Provider(ProviderError::Terminal { message }) => {
                let lower = message.to_lowercase();
                if lower.contains("authentication") {
                    "TTS authentication failed. Check your API key.".to_string()
                } else if lower.contains("quota") {
                    "The TTS API quota is exhausted. Check your billing settings.".to_string()
                } else {
                    format!("The TTS service rejected the request: {}", message)
                }
            }
            AudioError::Storage { path, source } => format!(
                "Could not write audio to '{}': {}. Check permissions and free disk space.",
                path.display(),
                source
            ),
        }
    }
}
