use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::{
    AuthCommand, ConfigCommand, DataCommand, MealCommand, PlanCommand, PrefsCommand,
    ProgressCommand, SupplementCommand, SyncCommand, WeightCommand, WorkoutCommand,
};
use gains::config::Config;
use gains::store::LocalStore;
use gains::sync::try_auto_push;
use gains::tracker::{ChangeSet, Tracker};

#[derive(Parser)]
#[command(name = "gains")]
#[command(version)]
#[command(about = "Track workouts, meals, supplements and weight", long_about = None)]
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

    /// Log meals and view the meal plan
    Meal(MealCommand),

    /// Track supplements
    Supplement(SupplementCommand),

    /// Track body weight
    Weight(WeightCommand),

    /// Weekly workout plan and planned exercises
    Plan(PlanCommand),

    /// Progress statistics
    Progress(ProgressCommand),

    /// Export, import and clear local data
    Data(DataCommand),

    /// Preferences
    Prefs(PrefsCommand),

    /// Account and session
    Auth(AuthCommand),

    /// Sync with the server
    Sync(SyncCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    let Some(command) = cli.command else {
        println!("Use --help to see available commands");
        return Ok(());
    };

    let store = LocalStore::open(config.data_dir.value.clone());

    let changes = match command {
        Commands::Auth(cmd) => {
            cmd.run(&config, &store).await?;
            ChangeSet::none()
        }
        Commands::Sync(cmd) => {
            cmd.run(&config, &store).await?;
            ChangeSet::none()
        }
        Commands::Config(cmd) => {
            cmd.run(&config)?;
            ChangeSet::none()
        }
        command => {
            let mut tracker = Tracker::open(store.clone(), config.schedule.clone());
            match command {
                Commands::Workout(cmd) => cmd.run(&mut tracker)?,
                Commands::Meal(cmd) => cmd.run(&mut tracker)?,
                Commands::Supplement(cmd) => cmd.run(&mut tracker)?,
                Commands::Weight(cmd) => cmd.run(&mut tracker)?,
                Commands::Plan(cmd) => cmd.run(&mut tracker)?,
                Commands::Data(cmd) => cmd.run(&mut tracker)?,
                Commands::Prefs(cmd) => cmd.run(&mut tracker)?,
                Commands::Progress(cmd) => {
                    cmd.run(&tracker)?;
                    ChangeSet::none()
                }
                Commands::Auth(_) | Commands::Sync(_) | Commands::Config(_) => ChangeSet::none(),
            }
        }
    };

    if !changes.is_empty() {
        try_auto_push(&config.sync, &store).await;
    }

    Ok(())
}
