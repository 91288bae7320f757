// digestcast Command Line Interface
// Turns daily digest transcripts into spoken audio

mod settings;
mod workflow;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use digestcast_audio::{AudioGenerator, AudioStore};
use settings::Settings;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use workflow::{parse_date, AudioWorkflow};

#[derive(Parser)]
#[command(name = "digestcast")]
#[command(about = "digestcast - spoken audio for daily email digests", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (TOML, JSON or YAML)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate audio for one or more dates (defaults to today)
    Generate {
        /// Dates in YYYY-MM-DD format
        dates: Vec<String>,

        /// Regenerate existing audio and ignore the enable flag
        #[arg(long, short)]
        force: bool,

        /// Transcript directory (overrides settings)
        #[arg(long)]
        transcript_dir: Option<PathBuf>,

        /// Audio output directory (overrides settings)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Print the audio path for a date
    Path {
        date: String,
    },

    /// Show whether audio exists for a date
    Status {
        date: String,
    },

    /// Delete the audio for a date
    Delete {
        date: String,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show effective configuration
    Show,

    /// Validate audio configuration
    Validate,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let mut settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate {
            dates,
            force,
            transcript_dir,
            output_dir,
        } => {
            if let Some(dir) = transcript_dir {
                settings.transcript_directory = dir;
            }
            if let Some(dir) = output_dir {
                settings.audio.output_directory = dir;
            }
            generate(settings, dates, force).await
        }
        Commands::Path { date } => {
            let date = parse_date(&date).map_err(|e| anyhow!(e))?;
            let store = AudioStore::new(settings.audio.output_directory);
            println!("{}", store.path_for(&date).display());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Status { date } => {
            let date = parse_date(&date).map_err(|e| anyhow!(e))?;
            let store = AudioStore::new(settings.audio.output_directory);
            let path = store.path_for(&date);
            match store.file_size(&date) {
                Some(size) => println!("✅ {} ({} bytes)", path.display(), size),
                None => println!("❌ No audio for {} (expected at {})", date, path.display()),
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Delete { date } => {
            let date = parse_date(&date).map_err(|e| anyhow!(e))?;
            let store = AudioStore::new(settings.audio.output_directory);
            if store.delete(&date)? {
                println!("🗑️  Deleted audio for {}", date);
            } else {
                println!("No audio for {}", date);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config(cmd) => handle_config_command(&settings, cmd),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn generate(
    settings: Settings,
    dates: Vec<String>,
    force: bool,
) -> anyhow::Result<ExitCode> {
    let dates = if dates.is_empty() {
        vec![chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()]
    } else {
        dates
            .iter()
            .map(|d| parse_date(d))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow!(e))?
    };

    if !settings.audio.enabled && !force {
        info!("Audio generation is disabled. Set ENABLE_AUDIO_GENERATION=true or pass --force.");
        return Ok(ExitCode::SUCCESS);
    }

    let generator = AudioGenerator::with_openai(Arc::new(settings.audio.clone()))
        .map_err(|e| anyhow!(e.user_message()))?;
    let workflow = AudioWorkflow::new(&generator, &settings.transcript_directory, force);

    let summary = workflow.run(&dates).await;

    println!(
        "🎧 Audio: {} generated, {} skipped, {} failed",
        summary.generated, summary.skipped, summary.failed
    );

    if summary.failed > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn handle_config_command(settings: &Settings, cmd: ConfigCommands) -> anyhow::Result<ExitCode> {
    match cmd {
        ConfigCommands::Show => {
            let rendered =
                toml::to_string_pretty(settings).context("Failed to render configuration")?;
            println!("{}", rendered.trim_end());
            let credential = if settings.audio.credential.is_empty() {
                "unset"
            } else {
                "set"
            };
            println!("# credential: {}", credential);
            Ok(ExitCode::SUCCESS)
        }
        ConfigCommands::Validate => {
            if let Err(e) = settings.audio.validate() {
                bail!("Invalid audio configuration: {}", e);
            }
            println!("✅ Audio configuration is valid");
            Ok(ExitCode::SUCCESS)
        }
    }
}
