use serde_json::json;

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::DatabaseManager;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    let pool = DatabaseManager::connect(&config.database).await?;

    DatabaseManager::migrate(&pool).await?;
    pool.close().await;

    output_format.success("Migrations applied", json!({}))
}
