//! Shared fixtures for digestcast-audio integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use digestcast_audio::{AudioConfig, ProviderError, SpeechRequest, TtsProvider};
use digestcast_core::RetryPolicy;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Provider that replays a fixed script of responses and counts calls
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<Bytes, ProviderError>>>,
    fallback: Result<Bytes, ProviderError>,
    calls: AtomicUsize,
    requests: Mutex<Vec<SpeechRequest>>,
}

impl ScriptedProvider {
    pub fn new(
        script: Vec<Result<Bytes, ProviderError>>,
        fallback: Result<Bytes, ProviderError>,
    ) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn always(response: Result<Bytes, ProviderError>) -> Self {
        Self::new(Vec::new(), response)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<SpeechRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl TtsProvider for ScriptedProvider {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Bytes, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());
        let next = self.script.lock().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

pub fn audio(bytes: &'static [u8]) -> Result<Bytes, ProviderError> {
    Ok(Bytes::from_static(bytes))
}

pub fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay_ms: 1,
        max_delay_ms: 10,
        multiplier: 2.0,
        jitter: false,
    }
}

/// Valid config writing under `root/audio_summaries`
pub fn test_config(root: &Path) -> AudioConfig {
    AudioConfig {
        enabled: true,
        output_directory: root.join("audio_summaries"),
        credential: "sk-test".to_string(),
        retry: fast_retry(3),
        ..AudioConfig::default()
    }
}
