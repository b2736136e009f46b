use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use taskboard::config::TaskboardConfig;

mod cmd;

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(version, about = "Realtime collaborative kanban board")]
pub struct Cli {
    /// Path to taskboard.toml (defaults to ./taskboard.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the coordination point (HTTP + WebSocket)
    Serve {
        /// Address to bind (overrides config and TASKBOARD_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to serve on (overrides config and TASKBOARD_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Enable permissive CORS
        #[arg(long)]
        dev: bool,
    },
    /// Connect as a headless client and log every board change
    Watch {
        /// WebSocket URL of a running `taskboard serve`
        #[arg(long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = TaskboardConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config
        .apply_env(|key| std::env::var(key).ok())
        .context("Invalid environment override")?;

    let _telemetry = taskboard::telemetry::init(&config.logging, cli.verbose)?;

    match cli.command {
        Commands::Serve { host, port, dev } => {
            cmd::cmd_serve(config, host, port, dev).await?;
        }
        Commands::Watch { url } => {
            cmd::cmd_watch(config, url).await?;
        }
    }

    Ok(())
}
