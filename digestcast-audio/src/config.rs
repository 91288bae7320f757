//! Configuration for audio generation

use digestcast_core::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

/// Lowest speed the TTS API accepts
pub const MIN_SPEED: f32 = 0.25;

/// Highest speed the TTS API accepts
pub const MAX_SPEED: f32 = 4.0;

const MAX_TIMEOUT_SECS: u64 = 300;

/// Audio generation configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Enable audio generation (off by default)
    pub enabled: bool,

    /// Directory that receives one `<date>.mp3` per transcript
    pub output_directory: PathBuf,

    /// Voice used for every request
    pub voice: Voice,

    /// Playback speed, 0.25 to 4.0
    pub speed: f32,

    /// API key, never serialized
    #[serde(skip_serializing)]
    pub credential: String,

    /// TTS model name
    pub model: String,

    /// API base URL
    pub endpoint: String,

    /// Per-request transport timeout in seconds
    pub timeout_secs: u64,

    /// Backoff schedule for transient provider failures
    pub retry: RetryPolicy,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: false, // Off by default
            output_directory: PathBuf::from("audio_summaries"),
            voice: Voice::default(),
            speed: 1.0,
            credential: String::new(),
            model: "tts-1".to_string(),
            endpoint: "https://api.openai.com".to_string(),
            timeout_secs: 60,
            retry: RetryPolicy::default(),
        }
    }
}

impl fmt::Debug for AudioConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioConfig")
            .field("enabled", &self.enabled)
            .field("output_directory", &self.output_directory)
            .field("voice", &self.voice)
            .field("speed", &self.speed)
            .field("credential", &redact(&self.credential))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .field("retry", &self.retry)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

impl AudioConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.output_directory.as_os_str().is_empty() {
            return Err("Audio output directory must be specified".to_string());
        }

        if !(MIN_SPEED..=MAX_SPEED).contains(&self.speed) {
            return Err(format!(
                "Invalid TTS speed '{}'. Speed must be between {} and {}",
                self.speed, MIN_SPEED, MAX_SPEED
            ));
        }

        if self.credential.trim().is_empty() {
            return Err("An API key is required for audio generation".to_string());
        }

        if self.model.trim().is_empty() {
            return Err("TTS model cannot be empty".to_string());
        }

        self.validate_endpoint()?;

        if self.timeout_secs == 0 {
            return Err("API timeout must be greater than 0".to_string());
        }

        if self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(format!(
                "API timeout too large (max {} seconds)",
                MAX_TIMEOUT_SECS
            ));
        }

        self.retry.validate()
    }

    fn validate_endpoint(&self) -> Result<(), String> {
        let url = Url::parse(&self.endpoint)
            .map_err(|e| format!("Invalid API endpoint '{}': {}", self.endpoint, e))?;

        match url.scheme() {
            "https" => Ok(()),
            "http" if is_loopback(&url) => Ok(()),
            _ => Err("API endpoint must use HTTPS".to_string()),
        }
    }
}

fn is_loopback(url: &Url) -> bool {
    matches!(
        url.host_str(),
        Some("localhost") | Some("127.0.0.1") | Some("[::1]")
    )
}

/// Voices offered by the TTS API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    #[default]
    Alloy,
    Echo,
    Fable,
    Onyx,
    Nova,
    Shimmer,
}

impl Voice {
    pub const ALL: [Voice; 6] = [
        Voice::Alloy,
        Voice::Echo,
        Voice::Fable,
        Voice::Onyx,
        Voice::Nova,
        Voice::Shimmer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Voice::Alloy => "alloy",
            Voice::Echo => "echo",
            Voice::Fable => "fable",
            Voice::Onyx => "onyx",
            Voice::Nova => "nova",
            Voice::Shimmer => "shimmer",
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Voice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Voice::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == wanted)
            .ok_or_else(|| {
                let valid: Vec<&str> = Voice::ALL.iter().map(Voice::as_str).collect();
                format!(
                    "Invalid TTS voice '{}'. Valid options: {}",
                    s,
                    valid.join(", ")
                )
            })
    }
}
