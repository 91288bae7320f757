//! Caller-side audio policy: which dates to generate, what to skip, how to report

use chrono::NaiveDate;
use digestcast_audio::{AudioError, AudioGenerator};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Normalize a user-supplied date to `YYYY-MM-DD`
pub fn parse_date(raw: &str) -> Result<String, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map(|date| date.format("%Y-%m-%d").to_string())
        .map_err(|_| format!("Invalid date '{}'. Expected format YYYY-MM-DD", raw))
}

/// What happened for one date
#[derive(Debug)]
pub enum DateOutcome {
    Generated(PathBuf),
    SkippedExisting(PathBuf),
    MissingTranscript(PathBuf),
    Failed(AudioError),
}

impl DateOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            DateOutcome::MissingTranscript(_) | DateOutcome::Failed(_)
        )
    }
}

/// Tally of a multi-date run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub generated: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &DateOutcome) {
        if outcome.is_failure() {
            self.failed += 1;
        } else if let DateOutcome::SkippedExisting(_) = outcome {
            self.skipped += 1;
        } else {
            self.generated += 1;
        }
    }
}

/// Generates audio for transcripts, one date at a time
pub struct AudioWorkflow<'a> {
    generator: &'a AudioGenerator,
    transcript_directory: &'a Path,
    force: bool,
}

impl<'a> AudioWorkflow<'a> {
    pub fn new(
        generator: &'a AudioGenerator,
        transcript_directory: &'a Path,
        force: bool,
    ) -> Self {
        Self {
            generator,
            transcript_directory,
            force,
        }
    }

    fn transcript_path(&self, date: &str) -> PathBuf {
        self.transcript_directory.join(format!("{}.txt", date))
    }

    /// Generate audio for a single date, honoring skip-if-present unless forced
    pub async fn process_date(&self, date: &str) -> DateOutcome {
        let audio_path = self.generator.audio_path(date);

        if !self.force && self.generator.exists(date) {
            info!(
                "Audio already exists for {}: {} (use --force to regenerate)",
                date,
                audio_path.display()
            );
            return DateOutcome::SkippedExisting(audio_path);
        }

        let transcript_path = self.transcript_path(date);
        let text = match fs::read_to_string(&transcript_path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                error!("Transcript file not found: {}", transcript_path.display());
                return DateOutcome::MissingTranscript(transcript_path);
            }
            Err(e) => {
                error!(
                    "Failed to read transcript {}: {}",
                    transcript_path.display(),
                    e
                );
                return DateOutcome::Failed(AudioError::InvalidInput(format!(
                    "unreadable transcript {}: {}",
                    transcript_path.display(),
                    e
                )));
            }
        };

        match self.generator.generate(&text, &audio_path).await {
            Ok(path) => DateOutcome::Generated(path),
            Err(e) => {
                error!("Audio generation failed for {}: {}", date, e);
                warn!("{}", e.user_message());
                DateOutcome::Failed(e)
            }
        }
    }

    /// Process dates sequentially; a failing date never stops the ones after it
    pub async fn run(&self, dates: &[String]) -> RunSummary {
        let mut summary = RunSummary::default();
        for date in dates {
            let outcome = self.process_date(date).await;
            match &outcome {
                DateOutcome::Generated(path) => debug!("{}: wrote {}", date, path.display()),
                DateOutcome::SkippedExisting(path) => debug!("{}: kept {}", date, path.display()),
                DateOutcome::MissingTranscript(path) => {
                    debug!("{}: no transcript at {}", date, path.display())
                }
                DateOutcome::Failed(e) => debug!("{}: failed ({})", date, e),
            }
            summary.record(&outcome);
        }
        summary
    }
}
