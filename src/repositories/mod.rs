//! Category and menu persistence behind one interface.
//!
//! Two interchangeable implementations exist: the legacy flat-file JSON
//! store and the relational store. Configuration picks exactly one at
//! startup; records cross the boundary as plain structs with string ids so
//! callers never see which backend is active.

pub mod json;
pub mod sql;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{AppConfig, StorageBackend, DEFAULT_CURRENCY, PLACEHOLDER_IMAGE};
use crate::errors::ServiceError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub order: i32,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuRecord {
    pub id: String,
    pub category_id: String,
    pub title: String,
    pub description: String,
    pub min_price: f64,
    pub max_price: Option<f64>,
    pub promotion_price: Option<f64>,
    pub currency: String,
    pub image: String,
    pub available: bool,
    pub featured: bool,
}

/// Fields for a category to be created.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl NewCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            order: 0,
            active: true,
        }
    }
}

/// Fields for a menu item to be created.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMenu {
    pub category_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub promotion_price: Option<f64>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_image")]
    pub image: String,
    #[serde(default = "default_true")]
    pub available: bool,
    #[serde(default)]
    pub featured: bool,
}

impl NewMenu {
    pub fn new(category_id: impl Into<String>, title: impl Into<String>, price: f64) -> Self {
        Self {
            category_id: category_id.into(),
            title: title.into(),
            description: String::new(),
            price,
            promotion_price: None,
            currency: default_currency(),
            image: default_image(),
            available: true,
            featured: false,
        }
    }
}

/// Partial update for a category; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub order: Option<i32>,
    pub active: Option<bool>,
}

/// Partial update for a menu item; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuChanges {
    pub category_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub promotion_price: Option<f64>,
    pub currency: Option<String>,
    pub image: Option<String>,
    pub available: Option<bool>,
    pub featured: Option<bool>,
}

fn default_true() -> bool {
    true
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_image() -> String {
    PLACEHOLDER_IMAGE.to_string()
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// All categories, ordered by display position.
    async fn list(&self) -> Result<Vec<CategoryRecord>, ServiceError>;
    async fn get(&self, id: &str) -> Result<Option<CategoryRecord>, ServiceError>;
    async fn create(&self, new: NewCategory) -> Result<CategoryRecord, ServiceError>;
    async fn update(
        &self,
        id: &str,
        changes: CategoryChanges,
    ) -> Result<Option<CategoryRecord>, ServiceError>;
    async fn delete(&self, id: &str) -> Result<bool, ServiceError>;
}

#[async_trait]
pub trait MenuRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<MenuRecord>, ServiceError>;
    async fn get(&self, id: &str) -> Result<Option<MenuRecord>, ServiceError>;
    async fn create(&self, new: NewMenu) -> Result<MenuRecord, ServiceError>;
    async fn update(
        &self,
        id: &str,
        changes: MenuChanges,
    ) -> Result<Option<MenuRecord>, ServiceError>;
    async fn delete(&self, id: &str) -> Result<bool, ServiceError>;
    /// Number of menu items referencing the given category.
    async fn count_by_category(&self, category_id: &str) -> Result<u64, ServiceError>;
    /// Menu item count per category id.
    async fn menu_counts(&self) -> Result<HashMap<String, u64>, ServiceError>;
}

/// The repository pair for the configured backend.
#[derive(Clone)]
pub struct Repositories {
    pub categories: Arc<dyn CategoryRepository>,
    pub menus: Arc<dyn MenuRepository>,
}

impl Repositories {
    /// Builds both repositories against the backend the configuration
    /// selects. The SQL backend needs an established connection; the JSON
    /// backend works directly off the configured document paths.
    pub fn from_config(
        cfg: &AppConfig,
        db: Option<Arc<DatabaseConnection>>,
    ) -> Result<Self, ServiceError> {
        match cfg.storage_backend {
            StorageBackend::Json => Ok(Self {
                categories: Arc::new(json::JsonCategoryRepository::new(
                    cfg.categories_file.clone(),
                )),
                menus: Arc::new(json::JsonMenuRepository::new(cfg.menus_file.clone())),
            }),
            StorageBackend::Sql => {
                let db = db.ok_or_else(|| {
                    ServiceError::InternalError(
                        "sql storage backend requires a database connection".to_string(),
                    )
                })?;
                Ok(Self {
                    categories: Arc::new(sql::SqlCategoryRepository::new(db.clone())),
                    menus: Arc::new(sql::SqlMenuRepository::new(db)),
                })
            }
        }
    }
}
