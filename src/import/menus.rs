use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::{info, warn};

use super::source::SourceMenu;
use crate::config::{DEFAULT_CURRENCY, PLACEHOLDER_IMAGE};
use crate::entities::menu;
use crate::errors::ServiceError;

/// Why a source menu was left out of the target store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The menu's `categoryId` resolved to nothing in the id mapping.
    CategoryNotFound,
    /// A menu with the same title already exists in the target.
    Duplicate,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::CategoryNotFound => write!(f, "category not found"),
            SkipReason::Duplicate => write!(f, "duplicate"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedMenu {
    pub title: String,
    pub reason: SkipReason,
}

/// Outcome of the menu pass.
#[derive(Debug, Default)]
pub struct MenuOutcome {
    pub created: u64,
    pub skipped: Vec<SkippedMenu>,
}

/// Migrates source menus in input order against the id mapping produced by
/// the category pass.
///
/// An unresolvable category reference or an already-present title skips the
/// record and keeps going; both are reported, neither aborts the run.
pub async fn migrate_menus<C>(
    conn: &C,
    records: &[SourceMenu],
    id_map: &HashMap<String, i32>,
) -> Result<MenuOutcome, ServiceError>
where
    C: ConnectionTrait,
{
    let mut outcome = MenuOutcome::default();

    for record in records {
        let Some(&category_id) = id_map.get(&record.category_id) else {
            warn!(
                title = %record.title,
                category_id = %record.category_id,
                "Skipping menu - category not found"
            );
            outcome.skipped.push(SkippedMenu {
                title: record.title.clone(),
                reason: SkipReason::CategoryNotFound,
            });
            continue;
        };

        let existing = menu::Entity::find()
            .filter(menu::Column::Title.eq(record.title.as_str()))
            .one(conn)
            .await?;

        if existing.is_some() {
            warn!(title = %record.title, "Menu already exists, skipping");
            outcome.skipped.push(SkippedMenu {
                title: record.title.clone(),
                reason: SkipReason::Duplicate,
            });
            continue;
        }

        let model = menu::ActiveModel {
            category_id: Set(category_id),
            title: Set(record.title.clone()),
            description: Set(Some(record.description.clone().unwrap_or_default())),
            min_price: Set(resolve_min_price(record)),
            max_price: Set(record.max_price),
            promotion_price: Set(record.promotion_price),
            currency: Set(record
                .currency
                .clone()
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())),
            image: Set(record
                .image
                .clone()
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string())),
            available: Set(record.available.unwrap_or(true)),
            featured: Set(record.featured.unwrap_or(false)),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        info!(title = %model.title, id = model.id, "Created menu");
        outcome.created += 1;
    }

    Ok(outcome)
}

/// Reconciles the two historical price layouts: a present `minPrice` wins,
/// the legacy single `price` is the fallback, and neither means zero.
pub fn resolve_min_price(record: &SourceMenu) -> f64 {
    record.min_price.or(record.price).unwrap_or(0.0)
}
