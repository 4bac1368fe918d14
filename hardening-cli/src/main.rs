use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::{
    ConfigCommand, ExportCommand, ImportCommand, MealCommand, PhaseCommand, Session, SetCommand,
    ShowCommand, SleepCommand, StatusCommand, TaskCommand, WaterCommand, WeightCommand,
};
use config::Config;

#[derive(Parser)]
#[command(name = "harden")]
#[command(version)]
#[command(about = "System Hardening Protocol tracker", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export all tracked data to a backup file
    Export(ExportCommand),

    /// Restore tracked data from a backup file
    Import(ImportCommand),

    /// Show backup status
    Status(StatusCommand),

    /// Record body weight
    Weight(WeightCommand),

    /// Log and list meals
    Meal(MealCommand),

    /// Track water intake
    Water(WaterCommand),

    /// Track sleep
    Sleep(SleepCommand),

    /// Mark exercises done
    Task(TaskCommand),

    /// Log workout sets
    Set(SetCommand),

    /// Track mental phases
    Phase(PhaseCommand),

    /// Show a summary of tracked data
    Show(ShowCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hardening=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cli_config_path = cli.config.clone();
    let config = Config::load(cli.config)?;

    match &cli.command {
        Some(Commands::Export(cmd)) => cmd.run(&config).await?,
        Some(Commands::Import(cmd)) => cmd.run(&config).await?,
        Some(Commands::Status(cmd)) => cmd.run(&config).await?,
        Some(Commands::Config(cmd)) => cmd.run(&config, cli_config_path)?,
        Some(Commands::Weight(cmd)) => cmd.run(&Session::open(&config).await?).await?,
        Some(Commands::Meal(cmd)) => cmd.run(&Session::open(&config).await?).await?,
        Some(Commands::Water(cmd)) => cmd.run(&Session::open(&config).await?).await?,
        Some(Commands::Sleep(cmd)) => cmd.run(&Session::open(&config).await?).await?,
        Some(Commands::Task(cmd)) => cmd.run(&Session::open(&config).await?).await?,
        Some(Commands::Set(cmd)) => cmd.run(&Session::open(&config).await?).await?,
        Some(Commands::Phase(cmd)) => cmd.run(&Session::open(&config).await?).await?,
        Some(Commands::Show(cmd)) => cmd.run(&Session::open(&config).await?)?,
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
