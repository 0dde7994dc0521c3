//! Gestura CLI — Command-line interface for gesture sessions and templates.
//!
//! Usage:
//!   gestura run <RECORDING>       Replay a landmark recording through a session
//!   gestura prepare <RECORDING>   Turn a recording into a classifier template
//!   gestura check                 Validate a session config and template model
//!   gestura config <ACTION>       Show, initialize, or locate the app config

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use gestura_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "gestura",
    about = "Hand-landmark gesture recognition and input control",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Application config file (defaults to the standard location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a gesture session over a recorded landmark stream
    Run {
        /// Recorded frames (JSONL)
        recording: PathBuf,

        /// Session config file (JSON); defaults derive from the app config
        #[arg(short, long)]
        session: Option<PathBuf>,

        /// Template model for the sequence classifier
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Append recognized gestures and commands to this JSONL journal
        #[arg(short, long)]
        journal: Option<PathBuf>,

        /// Write the end-of-session report as JSON
        #[arg(long)]
        report: Option<PathBuf>,

        /// Pace frames by their timestamps instead of as fast as possible
        #[arg(long)]
        realtime: bool,

        /// Ring the terminal bell on mode changes and committed gestures
        #[arg(long)]
        bell: bool,
    },

    /// Prepare a classifier template from a recording
    Prepare {
        /// Recorded frames (JSONL)
        recording: PathBuf,

        /// Gesture label of the recording
        #[arg(short, long)]
        label: String,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Append the recording to this model file, creating it if needed
        #[arg(long)]
        append_to: Option<PathBuf>,

        /// Normalization policy; an existing model keeps its own
        #[arg(long, value_enum)]
        policy: Option<commands::prepare::PolicyArg>,

        /// Frames per prepared sequence
        #[arg(long, default_value = "100")]
        frames: usize,

        /// Reject recordings with fewer dominant-hand frames than this
        #[arg(long, default_value = "10")]
        min_frames: usize,
    },

    /// Validate configuration and model files
    Check {
        /// Session config file to validate
        #[arg(short, long)]
        session: Option<PathBuf>,

        /// Template model to load
        #[arg(short, long)]
        model: Option<PathBuf>,
    },

    /// Manage the application config
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective config
    Show,
    /// Write the default config to the standard location
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the standard config path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let app = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(),
    };

    // Initialize logging
    let mut logging = app.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    gestura_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Run {
            recording,
            session,
            model,
            journal,
            report,
            realtime,
            bell,
        } => {
            commands::run::run(
                &app,
                commands::run::RunOptions {
                    recording,
                    session,
                    model,
                    journal,
                    report,
                    realtime,
                    bell,
                },
            )
            .await
        }
        Commands::Prepare {
            recording,
            label,
            output,
            append_to,
            policy,
            frames,
            min_frames,
        } => commands::prepare::run(
            &app,
            commands::prepare::PrepareOptions {
                recording,
                label,
                output,
                append_to,
                policy,
                frames,
                min_frames,
            },
        ),
        Commands::Check { session, model } => commands::check::run(&app, session, model),
        Commands::Config { action } => commands::config::run(&app, action),
    }
}
