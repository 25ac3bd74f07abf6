//! Schema migration runner for Hallmark.
//!
//! Usage:
//!   migrator up             - Apply all pending revisions
//!   migrator up --sql       - Print the migration script instead
//!   migrator down [-n N]    - Revert the last N revisions
//!   migrator status         - Show applied and pending revisions

use clap::Parser;
use hallmark_db::entities;
use hallmark_db::runner::{self, MigrationMode, MigrationRuntime};
use hallmark_shared::{MigrationConfig, Settings, init_tracing, load_env_file};
use tracing::info;

mod commands;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // .env first so it can feed both settings overrides and DATABASE_URL
    let env_file = load_env_file()?;
    let settings = Settings::load(cli.config.as_deref())?;
    init_tracing(&settings.logging)?;
    if let Some(path) = env_file {
        info!(path = %path.display(), "Loaded environment file");
    }

    let config = MigrationConfig::from_env()?;
    let metadata = entities::metadata();

    match cli.command {
        Commands::Up { sql, from } => {
            let mut runtime = MigrationRuntime::new(MigrationMode::from_sql_flag(sql));
            if let Some(revision) = from {
                runtime = runtime.with_start_after(revision);
            }
            let report = runner::run(&config, metadata, &mut runtime).await?;
            info!(mode = %report.mode, applied = report.revisions.len(), "Upgrade finished");
        }
        Commands::Down { steps } => {
            let mut runtime = MigrationRuntime::new(MigrationMode::Online);
            let report = runner::downgrade(&config, metadata, &mut runtime, steps).await?;
            for revision in &report.revisions {
                println!("Reverted {revision}");
            }
        }
        Commands::Status => {
            let mut runtime = MigrationRuntime::new(MigrationMode::Online);
            for status in runner::status(&config, metadata, &mut runtime).await? {
                let state = if status.is_applied() { "applied" } else { "pending" };
                println!("{state:<8} {}", status.id);
            }
        }
    }

    Ok(())
}
