//! Imports the flat-file JSON store into the relational database.
//!
//! Run with: cargo run --bin import-data
//!
//! The run is all-or-nothing: on any fatal error the transaction is rolled
//! back, nothing is left behind, and the process exits non-zero.

use tracing::{error, info, warn};

use menu_api::config;
use menu_api::db;
use menu_api::import::ImportRunner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load_config()?;
    config::init_tracing(&cfg.log_level, cfg.log_json);

    info!("=== Menu data import ===");

    let db = db::establish_connection_from_app_config(&cfg).await?;

    let mut runner = ImportRunner::from_config(&cfg);
    let summary = match runner.run(&db).await {
        Ok(summary) => summary,
        Err(e) => {
            error!("Import failed and was rolled back: {}", e);
            return Err(e.into());
        }
    };

    info!("Import completed successfully");
    info!(
        "  Categories: {} total ({} created, {} reused)",
        summary.categories_total, summary.categories_created, summary.categories_reused
    );
    info!(
        "  Menus: {} total ({} created, {} skipped)",
        summary.menus_total,
        summary.menus_created,
        summary.skipped.len()
    );
    for skip in &summary.skipped {
        warn!(title = %skip.title, reason = %skip.reason, "Menu skipped");
    }

    db::close_pool(db).await?;

    Ok(())
}
