//! digestcast-audio: spoken versions of daily digest transcripts
//!
//! Provides:
//! - Validated audio configuration (voice, speed, output directory, credential)
//! - A provider seam for remote TTS services, with an OpenAI implementation
//! - Date-keyed MP3 artifacts written atomically and overwritten on regeneration
//! - Retry of transient provider failures through `digestcast-core`

pub mod config;
pub mod error;
pub mod generator;
pub mod providers;
pub mod store;

pub use config::{AudioConfig, Voice};
pub use error::{AudioError, ProviderError};
pub use generator::AudioGenerator;
pub use providers::{OpenAiTts, SpeechRequest, TtsProvider};
pub use store::AudioStore;
