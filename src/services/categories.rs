use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::repositories::{
    CategoryChanges, CategoryRecord, CategoryRepository, MenuRepository, NewCategory, Repositories,
};

/// A category together with the number of menu items it holds, as shown in
/// the admin listing.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryListing {
    #[serde(flatten)]
    pub category: CategoryRecord,
    pub menu_count: u64,
}

/// Service for managing categories
#[derive(Clone)]
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
    menus: Arc<dyn MenuRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>, menus: Arc<dyn MenuRepository>) -> Self {
        Self { categories, menus }
    }

    pub fn from_repositories(repos: &Repositories) -> Self {
        Self::new(repos.categories.clone(), repos.menus.clone())
    }

    /// Lists all categories with their menu counts, in display order.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<CategoryListing>, ServiceError> {
        let categories = self.categories.list().await?;
        let counts = self.menus.menu_counts().await?;

        Ok(categories
            .into_iter()
            .map(|category| {
                let menu_count = counts.get(&category.id).copied().unwrap_or(0);
                CategoryListing {
                    category,
                    menu_count,
                }
            })
            .collect())
    }

    /// Gets a single category by id.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Option<CategoryRecord>, ServiceError> {
        self.categories.get(id).await
    }

    /// Creates a new category.
    #[instrument(skip(self))]
    pub async fn create(&self, new: NewCategory) -> Result<CategoryRecord, ServiceError> {
        if new.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Category name must not be empty".to_string(),
            ));
        }

        let record = self.categories.create(new).await?;
        info!(id = %record.id, name = %record.name, "Category created");
        Ok(record)
    }

    /// Applies a partial update to an existing category.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: &str,
        changes: CategoryChanges,
    ) -> Result<CategoryRecord, ServiceError> {
        if let Some(name) = &changes.name {
            if name.trim().is_empty() {
                return Err(ServiceError::ValidationError(
                    "Category name must not be empty".to_string(),
                ));
            }
        }

        self.categories
            .update(id, changes)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Category {id} not found")))
    }

    /// Deletes a category. Refused while menu items still reference it, so
    /// nothing cascades away silently.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let menu_count = self.menus.count_by_category(id).await?;
        if menu_count > 0 {
            return Err(ServiceError::Conflict(format!(
                "Cannot delete category. {menu_count} menu item(s) are using this category."
            )));
        }

        if !self.categories.delete(id).await? {
            return Err(ServiceError::NotFound(format!("Category {id} not found")));
        }

        info!(id = %id, "Category deleted");
        Ok(())
    }
}
