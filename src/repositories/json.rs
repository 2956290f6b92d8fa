//! Flat-file implementations of the category/menu repositories.
//!
//! Each call reads the whole JSON document, applies the change, and
//! rewrites the file. Ids are string-encoded millisecond timestamps, which
//! keeps them unique within one file's lifetime only.

use async_trait::async_trait;
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::{
    CategoryChanges, CategoryRecord, CategoryRepository, MenuChanges, MenuRecord, MenuRepository,
    NewCategory, NewMenu,
};
use crate::config::{DEFAULT_CURRENCY, PLACEHOLDER_IMAGE};
use crate::errors::ServiceError;
use crate::import::menus::resolve_min_price;
use crate::import::source::{CategoriesDocument, MenusDocument, SourceCategory, SourceMenu};

fn next_id() -> String {
    Utc::now().timestamp_millis().to_string()
}

fn read_document<T>(path: &Path, kind: &str) -> Result<T, ServiceError>
where
    T: Default + DeserializeOwned,
{
    if !path.exists() {
        return Ok(T::default());
    }

    let raw = fs::read_to_string(path).map_err(|e| {
        ServiceError::InternalError(format!("failed to read {kind} file {}: {e}", path.display()))
    })?;

    serde_json::from_str(&raw).map_err(|e| {
        ServiceError::SerializationError(format!(
            "malformed {kind} document {}: {e}",
            path.display()
        ))
    })
}

fn write_document<T>(path: &Path, kind: &str, doc: &T) -> Result<(), ServiceError>
where
    T: Serialize,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let raw = serde_json::to_string_pretty(doc)
        .map_err(|e| ServiceError::SerializationError(e.to_string()))?;
    fs::write(path, raw).map_err(|e| {
        ServiceError::InternalError(format!(
            "failed to write {kind} file {}: {e}",
            path.display()
        ))
    })
}

impl From<SourceCategory> for CategoryRecord {
    fn from(source: SourceCategory) -> Self {
        Self {
            id: source.id,
            name: source.name,
            description: source.description.unwrap_or_default(),
            order: source.order.unwrap_or(0),
            active: source.active.unwrap_or(true),
        }
    }
}

impl From<CategoryRecord> for SourceCategory {
    fn from(record: CategoryRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            description: Some(record.description),
            order: Some(record.order),
            active: Some(record.active),
        }
    }
}

impl From<SourceMenu> for MenuRecord {
    fn from(source: SourceMenu) -> Self {
        let min_price = resolve_min_price(&source);
        Self {
            id: source.id,
            category_id: source.category_id,
            title: source.title,
            description: source.description.unwrap_or_default(),
            min_price,
            max_price: source.max_price,
            promotion_price: source.promotion_price,
            currency: source
                .currency
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            image: source.image.unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            available: source.available.unwrap_or(true),
            featured: source.featured.unwrap_or(false),
        }
    }
}

impl From<MenuRecord> for SourceMenu {
    fn from(record: MenuRecord) -> Self {
        Self {
            id: record.id,
            category_id: record.category_id,
            title: record.title,
            description: Some(record.description),
            price: None,
            min_price: Some(record.min_price),
            max_price: record.max_price,
            promotion_price: record.promotion_price,
            currency: Some(record.currency),
            image: Some(record.image),
            available: Some(record.available),
            featured: Some(record.featured),
        }
    }
}

pub struct JsonCategoryRepository {
    path: PathBuf,
}

impl JsonCategoryRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> Result<CategoriesDocument, ServiceError> {
        read_document(&self.path, "categories")
    }

    fn write(&self, doc: &CategoriesDocument) -> Result<(), ServiceError> {
        write_document(&self.path, "categories", doc)
    }
}

#[async_trait]
impl CategoryRepository for JsonCategoryRepository {
    async fn list(&self) -> Result<Vec<CategoryRecord>, ServiceError> {
        let doc = self.read()?;
        let mut categories: Vec<CategoryRecord> =
            doc.categories.into_iter().map(Into::into).collect();
        categories.sort_by_key(|c| c.order);
        Ok(categories)
    }

    async fn get(&self, id: &str) -> Result<Option<CategoryRecord>, ServiceError> {
        let doc = self.read()?;
        Ok(doc
            .categories
            .into_iter()
            .find(|c| c.id == id)
            .map(Into::into))
    }

    async fn create(&self, new: NewCategory) -> Result<CategoryRecord, ServiceError> {
        let mut doc = self.read()?;
        let record = CategoryRecord {
            id: next_id(),
            name: new.name,
            description: new.description,
            order: new.order,
            active: new.active,
        };
        doc.categories.push(record.clone().into());
        self.write(&doc)?;
        Ok(record)
    }

    async fn update(
        &self,
        id: &str,
        changes: CategoryChanges,
    ) -> Result<Option<CategoryRecord>, ServiceError> {
        let mut doc = self.read()?;
        let Some(source) = doc.categories.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };

        if let Some(name) = changes.name {
            source.name = name;
        }
        if let Some(description) = changes.description {
            source.description = Some(description);
        }
        if let Some(order) = changes.order {
            source.order = Some(order);
        }
        if let Some(active) = changes.active {
            source.active = Some(active);
        }

        let record: CategoryRecord = source.clone().into();
        self.write(&doc)?;
        Ok(Some(record))
    }

    async fn delete(&self, id: &str) -> Result<bool, ServiceError> {
        let mut doc = self.read()?;
        let before = doc.categories.len();
        doc.categories.retain(|c| c.id != id);

        if doc.categories.len() == before {
            return Ok(false);
        }

        self.write(&doc)?;
        Ok(true)
    }
}

pub struct JsonMenuRepository {
    path: PathBuf,
}

impl JsonMenuRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> Result<MenusDocument, ServiceError> {
        read_document(&self.path, "menus")
    }

    fn write(&self, doc: &MenusDocument) -> Result<(), ServiceError> {
        write_document(&self.path, "menus", doc)
    }
}

#[async_trait]
impl MenuRepository for JsonMenuRepository {
    async fn list(&self) -> Result<Vec<MenuRecord>, ServiceError> {
        let doc = self.read()?;
        Ok(doc.menus.into_iter().map(Into::into).collect())
    }

    async fn get(&self, id: &str) -> Result<Option<MenuRecord>, ServiceError> {
        let doc = self.read()?;
        Ok(doc.menus.into_iter().find(|m| m.id == id).map(Into::into))
    }

    async fn create(&self, new: NewMenu) -> Result<MenuRecord, ServiceError> {
        let mut doc = self.read()?;
        let record = MenuRecord {
            id: next_id(),
            category_id: new.category_id,
            title: new.title,
            description: new.description,
            min_price: new.price,
            max_price: None,
            promotion_price: new.promotion_price,
            currency: new.currency,
            image: new.image,
            available: new.available,
            featured: new.featured,
        };
        doc.menus.push(record.clone().into());
        self.write(&doc)?;
        Ok(record)
    }

    async fn update(
        &self,
        id: &str,
        changes: MenuChanges,
    ) -> Result<Option<MenuRecord>, ServiceError> {
        let mut doc = self.read()?;
        let Some(source) = doc.menus.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };

        if let Some(category_id) = changes.category_id {
            source.category_id = category_id;
        }
        if let Some(title) = changes.title {
            source.title = title;
        }
        if let Some(description) = changes.description {
            source.description = Some(description);
        }
        if let Some(price) = changes.price {
            source.min_price = Some(price);
            source.price = None;
        }
        if let Some(promotion_price) = changes.promotion_price {
            source.promotion_price = Some(promotion_price);
        }
        if let Some(currency) = changes.currency {
            source.currency = Some(currency);
        }
        if let Some(image) = changes.image {
            source.image = Some(image);
        }
        if let Some(available) = changes.available {
            source.available = Some(available);
        }
        if let Some(featured) = changes.featured {
            source.featured = Some(featured);
        }

        let record: MenuRecord = source.clone().into();
        self.write(&doc)?;
        Ok(Some(record))
    }

    async fn delete(&self, id: &str) -> Result<bool, ServiceError> {
        let mut doc = self.read()?;
        let before = doc.menus.len();
        doc.menus.retain(|m| m.id != id);

        if doc.menus.len() == before {
            return Ok(false);
        }

        self.write(&doc)?;
        Ok(true)
    }

    async fn count_by_category(&self, category_id: &str) -> Result<u64, ServiceError> {
        let doc = self.read()?;
        Ok(doc
            .menus
            .iter()
            .filter(|m| m.category_id == category_id)
            .count() as u64)
    }

    async fn menu_counts(&self) -> Result<HashMap<String, u64>, ServiceError> {
        let doc = self.read()?;
        let mut counts = HashMap::new();
        for menu in &doc.menus {
            *counts.entry(menu.category_id.clone()).or_insert(0) += 1;
        }
        Ok(counts)
    }
}
