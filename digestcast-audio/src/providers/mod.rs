//! TTS provider implementations

pub mod openai;

use crate::config::Voice;
use crate::error::ProviderError;
use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;

pub use openai::OpenAiTts;

/// One synthesis request as sent to a provider
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeechRequest {
    pub model: String,
    pub input: String,
    pub voice: Voice,
    pub speed: f32,
}

/// Trait for remote TTS providers
///
/// Implementations classify every failure as transient or terminal so the
/// generator can decide what to retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TtsProvider: Send + Sync {
    /// Synthesize the request into encoded audio bytes
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Bytes, ProviderError>;

    /// Provider name for logs
    fn name(&self) -> &'static str;
}
