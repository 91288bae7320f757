//! OpenAI speech endpoint client

use crate::config::AudioConfig;
use crate::error::{AudioError, ProviderError};
use crate::providers::{SpeechRequest, TtsProvider};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Client for `POST /v1/audio/speech`
pub struct OpenAiTts {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl OpenAiTts {
    /// Create a new OpenAI TTS client
    pub fn new(endpoint: &str, api_key: &str, timeout_secs: u64) -> Result<Self, AudioError> {
        if api_key.trim().is_empty() {
            return Err(AudioError::Configuration(
                "OpenAI API key not provided".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| {
                AudioError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn from_config(config: &AudioConfig) -> Result<Self, AudioError> {
        Self::new(&config.endpoint, &config.credential, config.timeout_secs)
    }

    fn speech_url(&self) -> String {
        format!("{}/v1/audio/speech", self.endpoint)
    }
}

#[async_trait]
impl TtsProvider for OpenAiTts {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Bytes, ProviderError> {
        let body = json!({
            "model": request.model,
            "input": request.input,
            "voice": request.voice.as_str(),
            "speed": request.speed,
            "response_format": "mp3",
        });

        debug!(
            "Requesting speech: {} chars, voice {}, speed {}",
            request.input.chars().count(),
            request.voice,
            request.speed
        );

        let response = self
            .client
            .post(self.speech_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers());
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(classify_status(status, &error_text, retry_after));
        }

        response.bytes().await.map_err(|e| {
            ProviderError::transient(format!("Failed to read audio response: {}", e))
        })
    }

    fn name(&self) -> &'static str {
        "OpenAI TTS"
    }
}

fn classify_transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::transient(format!("OpenAI TTS request timed out: {}", err))
    } else if err.is_connect() || err.is_request() {
        ProviderError::transient(format!("Network error during audio generation: {}", err))
    } else {
        ProviderError::terminal(format!("OpenAI TTS request failed: {}", err))
    }
}

fn classify_status(
    status: StatusCode,
    body: &str,
    retry_after: Option<Duration>,
) -> ProviderError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => ProviderError::Transient {
            message: format!("OpenAI TTS API rate limit exceeded: {}", body),
            retry_after,
        },
        StatusCode::REQUEST_TIMEOUT => {
            ProviderError::transient(format!("OpenAI TTS API request timeout: {}", body))
        }
        s if s.is_server_error() => {
            ProviderError::transient(format!("OpenAI TTS API server error ({}): {}", s, body))
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::terminal(format!(
            "OpenAI TTS API authentication failed ({}): {}",
            status, body
        )),
        StatusCode::PAYMENT_REQUIRED => {
            ProviderError::terminal(format!("OpenAI TTS API quota exceeded: {}", body))
        }
        s => ProviderError::terminal(format!("OpenAI TTS API error ({}): {}", s, body)),
    }
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
}
