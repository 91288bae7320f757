//! Settings loading: optional file, then environment overrides

use anyhow::{anyhow, bail, Context, Result};
use digestcast_audio::{AudioConfig, Voice};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Process-wide settings, built once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding `<YYYY-MM-DD>.txt` transcripts
    pub transcript_directory: PathBuf,

    pub audio: AudioConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            transcript_directory: PathBuf::from("transcripts"),
            audio: AudioConfig::default(),
        }
    }
}

impl Settings {
    /// Defaults, overlaid by `path` if given, overlaid by the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Load settings from a TOML, JSON or YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        debug!("Loading settings from {}", path.display());

        let parsed = match extension.as_deref() {
            Some("toml") => toml::from_str(&content).map_err(|e| anyhow!(e)),
            Some("json") => serde_json::from_str(&content).map_err(|e| anyhow!(e)),
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content).map_err(|e| anyhow!(e)),
            _ => Self::parse(&content),
        };

        parsed.with_context(|| format!("Invalid settings file {}", path.display()))
    }

    /// Parse settings of unknown format
    pub fn parse(content: &str) -> Result<Self> {
        // Try JSON first
        if let Ok(settings) = serde_json::from_str::<Settings>(content) {
            return Ok(settings);
        }

        // Try TOML
        if let Ok(settings) = toml::from_str::<Settings>(content) {
            return Ok(settings);
        }

        // Try YAML
        if let Ok(settings) = serde_yaml::from_str::<Settings>(content) {
            return Ok(settings);
        }

        bail!("Unknown settings format (expected TOML, JSON or YAML)")
    }

    /// Apply environment overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.audio.credential = key;
        }

        if let Some(flag) = lookup("ENABLE_AUDIO_GENERATION") {
            self.audio.enabled = parse_flag(&flag);
        }

        if let Some(dir) = lookup("AUDIO_OUTPUT_DIRECTORY") {
            self.audio.output_directory = PathBuf::from(dir);
        }

        if let Some(voice) = lookup("TTS_VOICE") {
            self.audio.voice = voice.parse::<Voice>().map_err(|e| anyhow!(e))?;
        }

        if let Some(speed) = lookup("TTS_SPEED") {
            match speed.trim().parse::<f32>() {
                Ok(speed) => self.audio.speed = speed,
                Err(e) => warn!("Invalid TTS_SPEED environment variable '{}': {}", speed, e),
            }
        }

        if let Some(model) = lookup("TTS_MODEL") {
            self.audio.model = model;
        }

        if let Some(endpoint) = lookup("TTS_ENDPOINT") {
            self.audio.endpoint = endpoint;
        }

        if let Some(dir) = lookup("TRANSCRIPT_OUTPUT_DIRECTORY") {
            self.transcript_directory = PathBuf::from(dir);
        }

        Ok(())
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}
