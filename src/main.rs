//! Pose Coach - Real-time exercise pose evaluation engine
//!
//! Feeds camera-frame landmark captures through smoothing, per-exercise
//! scoring and a hold-to-complete countdown.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use pose_coach::app::cli::{Cli, Commands, ConfigAction};
use pose_coach::app::config::Config;
use pose_coach::exercise::ExerciseLibrary;
use pose_coach::pipeline::{FrameInput, Session};
use pose_coach::session::SessionEvent;
use pose_coach::time::MonotonicClock;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments first so we can use --verbose to set log level
    let cli = Cli::parse_args();

    // Initialize tracing (--verbose enables debug-level output)
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // Load config
    let config = if let Some(path) = &cli.config {
        Config::load(path)?
    } else {
        Config::load_default()?
    };

    match cli.command {
        Commands::Evaluate { input, exercise } => {
            run_evaluate(&input, exercise, &config)?;
        }
        Commands::Exercises { detailed } => {
            run_exercises(detailed, &config)?;
        }
        Commands::Validate { library } => {
            run_validate(&library)?;
        }
        Commands::Init { force } => {
            run_init(force, &config)?;
        }
        Commands::Config { action } => {
            run_config(action, &config)?;
        }
    }

    Ok(())
}

fn load_library(config: &Config) -> anyhow::Result<ExerciseLibrary> {
    match &config.library.path {
        Some(path) => Ok(ExerciseLibrary::load(path)?),
        None => Ok(ExerciseLibrary::builtin()),
    }
}

/// Replay a JSONL frame capture through a session, printing one output
/// line per processed frame. Stops once the hold completes.
fn run_evaluate(input: &Path, exercise: Option<String>, config: &Config) -> anyhow::Result<()> {
    let library = load_library(config)?;

    let file = File::open(input)?;
    let mut lines = BufReader::new(file).lines().peekable();

    // The session's exercise comes from the flag, or the first frame
    let first: FrameInput = match lines.peek() {
        Some(Ok(line)) => serde_json::from_str(line)?,
        _ => anyhow::bail!("input contains no frames"),
    };
    let exercise_id = exercise.unwrap_or(first.exercise_id);

    let session = Session::new(
        &library,
        &exercise_id,
        config.smoothing,
        Arc::new(MonotonicClock::new()),
    )?;
    info!(exercise = %exercise_id, session = %session.id(), "evaluating capture");

    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let frame: FrameInput = match serde_json::from_str(&line) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("skipping malformed frame: {}", e);
                continue;
            }
        };

        if let Some(output) = session.submit(&frame)? {
            println!("{}", serde_json::to_string(&output)?);
            if output.event == Some(SessionEvent::Completed) {
                break;
            }
        }
        if session.tick() == Some(SessionEvent::Completed) {
            break;
        }
    }

    let stats = session.stats();
    info!(
        processed = stats.frames_processed(),
        dropped = stats.frames_dropped(),
        "capture finished"
    );
    Ok(())
}

fn run_exercises(detailed: bool, config: &Config) -> anyhow::Result<()> {
    let library = load_library(config)?;
    for exercise in library.iter() {
        if detailed {
            println!(
                "{}  {} (hold {}s)\n    {}",
                exercise.id, exercise.name, exercise.hold_secs, exercise.instructions
            );
        } else {
            println!("{}", exercise.id);
        }
    }
    Ok(())
}

fn run_validate(path: &Path) -> anyhow::Result<()> {
    let library = ExerciseLibrary::load(path)?;
    println!("{}: {} exercises, valid", path.display(), library.len());
    Ok(())
}

fn run_init(force: bool, config: &Config) -> anyhow::Result<()> {
    let path = Config::default_path();
    if path.exists() && !force {
        anyhow::bail!(
            "config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }
    config.save(&path)?;
    info!("wrote config to {}", path.display());
    Ok(())
}

fn run_config(action: ConfigAction, config: &Config) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            println!("{}", config.to_toml()?);
        }
        ConfigAction::Get { key } => {
            let value: toml::Value = toml::from_str(&config.to_toml()?)?;
            let mut current = &value;
            for part in key.split('.') {
                current = current
                    .get(part)
                    .ok_or_else(|| anyhow::anyhow!("unknown config key: {}", key))?;
            }
            println!("{}", current);
        }
    }
    Ok(())
}
