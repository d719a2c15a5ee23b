mod args;
mod commands;

use anyhow::{anyhow, Result};
use chrono::Utc;
use clap::Parser;

use crate::{config::load_config_with_path, ports::ClockPort};

use args::{Cli, Commands};

#[derive(Debug, Clone, Copy)]
pub(crate) struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> chrono::DateTime<Utc> {
        Utc::now()
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Watch {
            config,
            wait_time_ms,
            max_changes,
        } => {
            if max_changes == Some(0) {
                return Err(anyhow!("--max-changes must be >= 1"));
            }
            let loaded = load_config_with_path(config.as_deref())?;
            let mut cfg = loaded.config;
            if let Some(wait_time_ms) = wait_time_ms {
                if wait_time_ms == 0 {
                    return Err(anyhow!("--wait-time-ms must be >= 1"));
                }
                cfg.wait_time_ms = wait_time_ms;
            }
            commands::watch::run(cfg, loaded.resolved_path, max_changes).await
        }
        Commands::Once { config } => {
            let loaded = load_config_with_path(config.as_deref())?;
            commands::once::run(loaded.config).await
        }
        Commands::Config { command } => commands::config::run(command),
    }
}
