use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::schema::{self, MIGRATIONS};

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Create any missing tables and indexes")]
    Migrate,
}

pub async fn handle(cmd: DbCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        DbCommands::Migrate => {
            let db = super::connect(config).await?;
            schema::migrate(db.pool()).await?;
            let applied: Vec<&str> = MIGRATIONS.iter().map(|(name, _)| *name).collect();
            db.close().await;
            output_success(
                &output_format,
                &format!("Schema up to date ({} steps)", applied.len()),
                Some(json!({ "migrations": applied })),
            )
        }
    }
}
