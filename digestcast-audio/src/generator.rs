//! Transcript-to-audio generation
//!
//! The generator maps a date key to `<output_directory>/<date>.mp3` and turns
//! transcript text into that file. It never decides whether to skip work:
//! `generate` always overwrites, and callers that want skip-if-present
//! behavior check `exists` first.

use crate::config::AudioConfig;
use crate::error::{AudioError, ProviderError};
use crate::providers::{OpenAiTts, SpeechRequest, TtsProvider};
use crate::store::{parent_dir, write_atomically, AudioStore};
use digestcast_core::{retry_with_backoff, RetryDecision};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Longest input the speech endpoint accepts, in characters
pub const MAX_INPUT_CHARS: usize = 4096;

/// Converts transcript text into audio files on disk
pub struct AudioGenerator {
    config: Arc<AudioConfig>,
    provider: Arc<dyn TtsProvider>,
    store: AudioStore,
}

impl AudioGenerator {
    /// Create a generator around an existing provider
    pub fn new(
        config: Arc<AudioConfig>,
        provider: Arc<dyn TtsProvider>,
    ) -> Result<Self, AudioError> {
        config.validate().map_err(AudioError::Configuration)?;

        debug!(
            "Audio generator ready: provider {}, voice {}, speed {}",
            provider.name(),
            config.voice,
            config.speed
        );

        let store = AudioStore::new(config.output_directory.clone());
        Ok(Self {
            config,
            provider,
            store,
        })
    }

    /// Create a generator backed by the OpenAI speech endpoint
    pub fn with_openai(config: Arc<AudioConfig>) -> Result<Self, AudioError> {
        config.validate().map_err(AudioError::Configuration)?;
        let provider = OpenAiTts::from_config(&config)?;
        Self::new(config, Arc::new(provider))
    }

    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    pub fn store(&self) -> &AudioStore {
        &self.store
    }

    /// Path of the audio artifact for a `YYYY-MM-DD` date
    pub fn audio_path(&self, date: &str) -> PathBuf {
        self.store.path_for(date)
    }

    /// Whether the artifact for `date` is present; unreadable paths count as absent
    pub fn exists(&self, date: &str) -> bool {
        self.store.exists(date)
    }

    pub fn file_size(&self, date: &str) -> Option<u64> {
        self.store.file_size(date)
    }

    pub fn delete(&self, date: &str) -> Result<bool, AudioError> {
        self.store.delete(date)
    }

    /// Convert `text` to speech and write it to `output_path`, replacing any existing file.
    ///
    /// The provider call is retried on transient failures according to the
    /// configured [`RetryPolicy`](digestcast_core::RetryPolicy). The file is
    /// written to a temporary sibling first and renamed into place, so a
    /// failed write never leaves a partial artifact behind.
    pub async fn generate(
        &self,
        text: &str,
        output_path: impl AsRef<Path>,
    ) -> Result<PathBuf, AudioError> {
        let output_path = output_path.as_ref();

        if text.trim().is_empty() {
            return Err(AudioError::InvalidInput(
                "Text content cannot be empty".to_string(),
            ));
        }

        self.config.validate().map_err(AudioError::Configuration)?;

        let input = truncate_input(text);

        let directory = parent_dir(output_path);
        fs::create_dir_all(directory).map_err(|e| AudioError::storage(directory, e))?;

        let request = SpeechRequest {
            model: self.config.model.clone(),
            input: input.to_string(),
            voice: self.config.voice,
            speed: self.config.speed,
        };

        info!(
            "Generating audio for {} characters of text via {}",
            input.chars().count(),
            self.provider.name()
        );

        let provider = self.provider.as_ref();
        let request = &request;
        let audio = retry_with_backoff(
            &self.config.retry,
            "TTS synthesis",
            classify,
            move || provider.synthesize(request),
        )
        .await?;

        if audio.is_empty() {
            return Err(ProviderError::terminal("Provider returned an empty audio stream").into());
        }

        write_atomically(output_path, &audio).map_err(|e| AudioError::storage(output_path, e))?;

        info!(
            "Audio file generated successfully: {} ({} bytes)",
            output_path.display(),
            audio.len()
        );
        Ok(output_path.to_path_buf())
    }
}

fn classify(err: &ProviderError) -> RetryDecision {
    match err {
        ProviderError::Transient { retry_after, .. } => RetryDecision::Retry {
            after: *retry_after,
        },
        ProviderError::Terminal { .. } => RetryDecision::Abort,
    }
}

fn truncate_input(text: &str) -> &str {
    match text.char_indices().nth(MAX_INPUT_CHARS) {
        Some((cut, _)) => {
            warn!(
                "Text content is {} characters, truncating to {}",
                text.chars().count(),
                MAX_INPUT_CHARS
            );
            &text[..cut]
        }
        None => text,
    }
}
