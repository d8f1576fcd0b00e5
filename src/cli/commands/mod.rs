pub mod db;
pub mod seed;

use crate::config::AppConfig;
use crate::database::DatabaseManager;

/// Connect using `DATABASE_URL`; both commands need a live database
pub(crate) async fn connect(config: &AppConfig) -> anyhow::Result<DatabaseManager> {
    Ok(DatabaseManager::connect(&config.database).await?)
}
