use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use std::collections::HashMap;
use tracing::{debug, info};

use super::source::SourceCategory;
use crate::entities::category;
use crate::errors::ServiceError;

/// Outcome of the category pass: the old-id to new-id mapping consumed by
/// the menu pass, plus counts for the summary.
#[derive(Debug, Default)]
pub struct CategoryOutcome {
    pub id_map: HashMap<String, i32>,
    pub created: u64,
    pub reused: u64,
}

/// Migrates source categories in input order, deduplicating by exact name.
///
/// A name that already exists in the target maps the source id onto the
/// existing row instead of creating a duplicate, which is what makes
/// re-runs idempotent. Two source categories sharing a name therefore
/// collapse onto one target row, with both source ids in the map.
pub async fn migrate_categories<C>(
    conn: &C,
    records: &[SourceCategory],
) -> Result<CategoryOutcome, ServiceError>
where
    C: ConnectionTrait,
{
    let mut outcome = CategoryOutcome::default();

    for record in records {
        let existing = category::Entity::find()
            .filter(category::Column::Name.eq(record.name.as_str()))
            .one(conn)
            .await?;

        if let Some(existing) = existing {
            debug!(
                name = %record.name,
                old_id = %record.id,
                id = existing.id,
                "Category already exists, reusing"
            );
            outcome.id_map.insert(record.id.clone(), existing.id);
            outcome.reused += 1;
            continue;
        }

        let model = category::ActiveModel {
            name: Set(record.name.clone()),
            description: Set(Some(record.description.clone().unwrap_or_default())),
            order: Set(record.order.unwrap_or(0)),
            active: Set(record.active.unwrap_or(true)),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        info!(
            name = %model.name,
            old_id = %record.id,
            new_id = model.id,
            "Created category"
        );
        outcome.id_map.insert(record.id.clone(), model.id);
        outcome.created += 1;
    }

    Ok(outcome)
}
