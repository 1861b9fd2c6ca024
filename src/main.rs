use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{ConfigCommand, DraftCommand, ExerciseCommand, WeightCommand, WorkoutCommand};
use gymlog::config::Config;
use gymlog::Gateway;

#[derive(Parser)]
#[command(name = "gymlog")]
#[command(version)]
#[command(about = "A strength training log", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log and review workouts
    Workout(WorkoutCommand),

    /// Work on an in-progress workout
    Draft(DraftCommand),

    /// Manage the exercise library
    Exercise(ExerciseCommand),

    /// Track body weight
    Weight(WeightCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.clone())?;

    // RUST_LOG wins over the configured filter
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.value.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!(
        "Using database {} ({})",
        config.database_path.value.display(),
        config.database_path.source
    );

    let command = match cli.command {
        Some(Commands::Config(cmd)) => return cmd.run(&config, cli.config.as_deref()),
        Some(command) => command,
        None => {
            println!("Use --help to see available commands");
            return Ok(());
        }
    };

    let gateway = Gateway::open(&config.database_path.value).await?;
    let result = match command {
        Commands::Workout(cmd) => cmd.run(&gateway).await,
        Commands::Draft(cmd) => cmd.run(&gateway).await,
        Commands::Exercise(cmd) => cmd.run(&gateway).await,
        Commands::Weight(cmd) => cmd.run(&gateway).await,
        Commands::Config(_) => Ok(()),
    };
    gateway.close().await;

    result
}
