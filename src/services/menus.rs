use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::config::PLACEHOLDER_IMAGE;
use crate::errors::ServiceError;
use crate::repositories::{MenuChanges, MenuRecord, MenuRepository, NewMenu, Repositories};

/// Image paths that are shared between items and must never be deleted
/// alongside one of them.
const SHARED_IMAGES: [&str; 2] = [PLACEHOLDER_IMAGE, "assets/images/default.jpg"];

/// Service for managing menu items
#[derive(Clone)]
pub struct MenuService {
    menus: Arc<dyn MenuRepository>,
}

impl MenuService {
    pub fn new(menus: Arc<dyn MenuRepository>) -> Self {
        Self { menus }
    }

    pub fn from_repositories(repos: &Repositories) -> Self {
        Self::new(repos.menus.clone())
    }

    /// Lists all menu items.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<MenuRecord>, ServiceError> {
        self.menus.list().await
    }

    /// Lists the menu items of one category.
    #[instrument(skip(self))]
    pub async fn list_by_category(
        &self,
        category_id: &str,
    ) -> Result<Vec<MenuRecord>, ServiceError> {
        let menus = self.menus.list().await?;
        Ok(menus
            .into_iter()
            .filter(|m| m.category_id == category_id)
            .collect())
    }

    /// Gets a single menu item by id.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Option<MenuRecord>, ServiceError> {
        self.menus.get(id).await
    }

    /// Creates a new menu item.
    #[instrument(skip(self))]
    pub async fn create(&self, new: NewMenu) -> Result<MenuRecord, ServiceError> {
        if new.title.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Menu title must not be empty".to_string(),
            ));
        }
        if !new.price.is_finite() || new.price < 0.0 {
            return Err(ServiceError::ValidationError(
                "Menu price must be a non-negative number".to_string(),
            ));
        }

        let record = self.menus.create(new).await?;
        info!(id = %record.id, title = %record.title, "Menu created");
        Ok(record)
    }

    /// Applies a partial update to an existing menu item.
    #[instrument(skip(self))]
    pub async fn update(&self, id: &str, changes: MenuChanges) -> Result<MenuRecord, ServiceError> {
        if let Some(title) = &changes.title {
            if title.trim().is_empty() {
                return Err(ServiceError::ValidationError(
                    "Menu title must not be empty".to_string(),
                ));
            }
        }
        if let Some(price) = changes.price {
            if !price.is_finite() || price < 0.0 {
                return Err(ServiceError::ValidationError(
                    "Menu price must be a non-negative number".to_string(),
                ));
            }
        }

        self.menus
            .update(id, changes)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Menu {id} not found")))
    }

    /// Deletes a menu item along with its uploaded image, if it has one of
    /// its own.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        if let Some(record) = self.menus.get(id).await? {
            remove_item_image(&record);
        }

        if !self.menus.delete(id).await? {
            return Err(ServiceError::NotFound(format!("Menu {id} not found")));
        }

        info!(id = %id, "Menu deleted");
        Ok(())
    }

    /// Menu item count per category id.
    #[instrument(skip(self))]
    pub async fn menu_counts(
        &self,
    ) -> Result<std::collections::HashMap<String, u64>, ServiceError> {
        self.menus.menu_counts().await
    }
}

fn remove_item_image(record: &MenuRecord) {
    let image = record.image.as_str();
    if image.is_empty() || SHARED_IMAGES.contains(&image) {
        return;
    }

    let path = Path::new(image);
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            warn!(image = %image, "Failed to remove menu image: {}", e);
        }
    }
}
