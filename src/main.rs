mod app;
mod cli;
mod config;
mod extract;
mod merge;
mod model;
mod providers;
mod prune;
mod store;
mod transform;

use anyhow::Result;
use tracing::info;

use cli::Command;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    match cli::parse_args(&args)? {
        Command::Sync { config } => {
            let config = config::load_config(config.as_deref())?;
            let summary = app::run_sync(&config).await?;
            info!(
                remote = summary.remote,
                local = summary.local,
                persisted = ?summary.persisted,
                "Dashboard data generation complete"
            );
        }
        Command::Prune {
            config,
            today,
            policy,
        } => {
            let config = config::load_config(config.as_deref())?;
            let today = today.unwrap_or_else(|| chrono::Local::now().date_naive());
            let summary = app::run_prune(&config, today, policy)?;
            info!(
                kept = summary.kept,
                removed = summary.removed,
                date_errors = summary.date_errors,
                "Housekeeping complete for {today}"
            );
        }
        Command::Help => cli::print_help(),
    }

    Ok(())
}
