//! One-shot import of the flat-file JSON store into the relational store.
//!
//! The run is a single-threaded batch: ensure tables, read both source
//! documents, migrate categories (building the old-id to new-id mapping),
//! migrate menus through that mapping, then commit everything in one
//! transaction. Any fatal error rolls the whole run back; re-running
//! against an already-populated store creates nothing new.

pub mod categories;
pub mod menus;
pub mod source;

pub use categories::{migrate_categories, CategoryOutcome};
pub use menus::{migrate_menus, MenuOutcome, SkipReason, SkippedMenu};

use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, TransactionTrait};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::db;
use crate::entities::{category, menu};
use crate::errors::ServiceError;

/// Where an import run currently stands. `Committed` and `Failed` are
/// terminal; `Failed` absorbs an error raised in any earlier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    NotStarted,
    TablesEnsured,
    CategoriesMigrated,
    MenusMigrated,
    Committed,
    Failed,
}

/// Result of a committed run, including per-record skip diagnostics for
/// operator visibility.
#[derive(Debug, Serialize)]
pub struct ImportSummary {
    /// Category rows in the target store after commit.
    pub categories_total: u64,
    /// Menu rows in the target store after commit.
    pub menus_total: u64,
    pub categories_created: u64,
    pub categories_reused: u64,
    pub menus_created: u64,
    pub skipped: Vec<SkippedMenu>,
}

/// Drives one import run from the configured source documents.
///
/// The runner owns the target store for the duration of the run: the
/// name/title dedup checks assume no concurrent writer is mutating
/// categories or menus while it executes.
pub struct ImportRunner {
    categories_file: PathBuf,
    menus_file: PathBuf,
    state: RunState,
}

impl ImportRunner {
    pub fn new(categories_file: impl Into<PathBuf>, menus_file: impl Into<PathBuf>) -> Self {
        Self {
            categories_file: categories_file.into(),
            menus_file: menus_file.into(),
            state: RunState::NotStarted,
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(cfg.categories_file.clone(), cfg.menus_file.clone())
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Runs the full import synchronously. On error the transaction is
    /// rolled back and the runner lands in `RunState::Failed` with no
    /// partial rows visible in the store.
    pub async fn run(&mut self, db: &DatabaseConnection) -> Result<ImportSummary, ServiceError> {
        match self.execute(db).await {
            Ok(summary) => Ok(summary),
            Err(e) => {
                self.state = RunState::Failed;
                Err(e)
            }
        }
    }

    async fn execute(&mut self, db: &DatabaseConnection) -> Result<ImportSummary, ServiceError> {
        db::run_migrations(db).await?;
        self.state = RunState::TablesEnsured;

        let source_categories = source::load_categories(&self.categories_file)?;
        let source_menus = source::load_menus(&self.menus_file)?;

        if source_categories.is_empty() && source_menus.is_empty() {
            info!("No data to migrate");
        }

        let txn = db.begin().await?;

        let applied = async {
            let cat_outcome = migrate_categories(&txn, &source_categories).await?;
            self.state = RunState::CategoriesMigrated;
            info!(
                "Processed {} categories ({} created, {} reused)",
                source_categories.len(),
                cat_outcome.created,
                cat_outcome.reused
            );

            let menu_outcome = migrate_menus(&txn, &source_menus, &cat_outcome.id_map).await?;
            self.state = RunState::MenusMigrated;
            info!(
                "Processed {} menus ({} created, {} skipped)",
                source_menus.len(),
                menu_outcome.created,
                menu_outcome.skipped.len()
            );

            Ok::<_, ServiceError>((cat_outcome, menu_outcome))
        }
        .await;

        let (cat_outcome, menu_outcome) = match applied {
            Ok(outcomes) => outcomes,
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    error!("Rollback failed after import error: {}", rollback_err);
                }
                return Err(e);
            }
        };

        txn.commit().await?;
        self.state = RunState::Committed;

        let categories_total = category::Entity::find().count(db).await?;
        let menus_total = menu::Entity::find().count(db).await?;

        Ok(ImportSummary {
            categories_total,
            menus_total,
            categories_created: cat_outcome.created,
            categories_reused: cat_outcome.reused,
            menus_created: menu_outcome.created,
            skipped: menu_outcome.skipped,
        })
    }
}
