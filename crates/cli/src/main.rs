use clap::{Parser, Subcommand};
use trade_calc_core::{AppConfig, ConfigLoader, ConfigWatcher};

mod commands;
mod tui_calculator;

use commands::CalcArgs;

#[derive(Parser)]
#[command(name = "trade-calc")]
#[command(about = "Trading calculator with transaction fees", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true, default_value = "config/Config.toml")]
    config: String,

    /// Config profile merged over the base file (Config.{profile}.toml)
    #[arg(long, global = true, env = "TRADE_CALC_PROFILE")]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate a single trade and print the breakdown
    Calc(CalcArgs),
    /// Interactive single-screen calculator
    Tui {
        /// Reload the fee configuration when the config file changes
        #[arg(long)]
        watch: bool,
        /// Optional log file path (logs to file instead of stderr)
        #[arg(long)]
        log_file: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging (disabled for TUI to prevent screen corruption, unless log_file is provided)
    match &cli.command {
        Commands::Tui {
            log_file: Some(path),
            ..
        } => {
            // Log to file for TUI
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
                )
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        Commands::Tui { .. } => {
            // No logging for TUI (prevents screen corruption)
        }
        Commands::Calc(_) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
                )
                .with_writer(std::io::stderr)
                .init();
        }
    }

    let config = load_config(&cli.config, cli.profile.as_deref())?;

    match cli.command {
        Commands::Calc(args) => {
            commands::run_calc(&args, &config)?;
        }
        Commands::Tui { watch, log_file: _ } => {
            run_tui(config, &cli.config, cli.profile, watch).await?;
        }
    }

    Ok(())
}

fn load_config(path: &str, profile: Option<&str>) -> anyhow::Result<AppConfig> {
    match profile {
        Some(profile) => ConfigLoader::load_with_profile(path, profile),
        None => ConfigLoader::load_from(path),
    }
}

async fn run_tui(
    config: AppConfig,
    config_path: &str,
    profile: Option<String>,
    watch: bool,
) -> anyhow::Result<()> {
    let updates = if watch {
        let (watcher, rx) = ConfigWatcher::new(config.clone());
        let watcher = watcher.with_profile(profile);
        let path = config_path.to_string();
        tokio::spawn(async move {
            if let Err(e) = watcher.watch(path).await {
                tracing::warn!("Config watcher stopped: {}", e);
            }
        });
        Some(rx)
    } else {
        None
    };

    tui_calculator::run(config, updates).await
}
