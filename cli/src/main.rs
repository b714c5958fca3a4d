use clap::{Parser, Subcommand};
use rankline_cli::commands;
use rankline_core::EngineConfigExt;
use rankline_types::EngineConfig;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Activity counters and rank roles for community guilds")]
struct Cli {
    /// Config file (TOML). Defaults to the per-user config location.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a timestamped JSON-lines event log
    Replay {
        #[arg(short, long)]
        events: PathBuf,
        #[arg(short, long)]
        fixture: Option<PathBuf>,
    },
    /// Process JSON events from stdin with live timers
    Serve {
        #[arg(short, long)]
        fixture: Option<PathBuf>,
    },
    /// Show a user's rank progress from the data file
    Rank {
        #[arg(short, long)]
        guild: u64,
        #[arg(short, long)]
        user: u64,
    },
    CheckConfig,
}

fn init_logging() -> Option<WorkerGuard> {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    if let Ok(path) = std::env::var("RANKLINE_LOG_PATH") {
        if let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(writer)
                .init();
            return Some(guard);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
    None
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let _log_guard = init_logging();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::load_from(path).map_err(|e| e.to_string())?,
        None => EngineConfig::load(),
    };

    match &cli.command {
        Commands::Replay { events, fixture } => {
            commands::replay_file(&config, events, fixture.as_deref()).await
        }
        Commands::Serve { fixture } => commands::serve(&config, fixture.as_deref()).await,
        Commands::Rank { guild, user } => commands::show_rank(&config, *guild, *user),
        Commands::CheckConfig => commands::check_config(&config, cli.config.as_deref()),
    }
}
