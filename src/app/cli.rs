//! Command-Line Interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Pose Coach - Real-time exercise pose evaluation
#[derive(Parser, Debug)]
#[command(name = "pose-coach")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a captured frame stream (JSONL) through a session
    Evaluate {
        /// Input file with one frame JSON object per line
        #[arg(short, long)]
        input: PathBuf,

        /// Exercise id (overrides the id carried in the frames)
        #[arg(short, long)]
        exercise: Option<String>,
    },

    /// List available exercises
    Exercises {
        /// Show detailed information
        #[arg(short, long)]
        detailed: bool,
    },

    /// Validate an exercise library file
    Validate {
        /// Path to the exercise library JSON
        library: PathBuf,
    },

    /// Initialize configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Get a specific configuration value
    Get {
        /// Configuration key (e.g., "smoothing.alpha")
        key: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
