//! Wire shapes of the flat-file store documents.
//!
//! The same structs serve as the import source records and as the storage
//! schema of the JSON-backed repositories, so both sides tolerate the two
//! historical price layouts (single `price` vs `minPrice`/`maxPrice`).

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{info, warn};

use crate::errors::ServiceError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCategory {
    /// String-encoded millisecond timestamp assigned by the file store.
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMenu {
    pub id: String,
    /// References `SourceCategory::id`; nothing enforces the link in the
    /// file store.
    pub category_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Legacy single-price field, superseded by `min_price`/`max_price`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CategoriesDocument {
    #[serde(default)]
    pub categories: Vec<SourceCategory>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MenusDocument {
    #[serde(default)]
    pub menus: Vec<SourceMenu>,
}

/// Loads the categories document. A missing file is an empty store, not an
/// error; a malformed document is fatal.
pub fn load_categories(path: &Path) -> Result<Vec<SourceCategory>, ServiceError> {
    let doc: CategoriesDocument = read_document(path, "categories")?;
    info!(
        "Loaded {} categories from {}",
        doc.categories.len(),
        path.display()
    );
    Ok(doc.categories)
}

/// Loads the menus document with the same tolerant-read policy.
pub fn load_menus(path: &Path) -> Result<Vec<SourceMenu>, ServiceError> {
    let doc: MenusDocument = read_document(path, "menus")?;
    info!("Loaded {} menus from {}", doc.menus.len(), path.display());
    Ok(doc.menus)
}

fn read_document<T>(path: &Path, kind: &str) -> Result<T, ServiceError>
where
    T: Default + for<'de> Deserialize<'de>,
{
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!("{} file not found: {}", kind, path.display());
            return Ok(T::default());
        }
        Err(e) => {
            return Err(ServiceError::InternalError(format!(
                "failed to read {} file {}: {}",
                kind,
                path.display(),
                e
            )))
        }
    };

    serde_json::from_str(&raw).map_err(|e| {
        ServiceError::SerializationError(format!(
            "malformed {} document {}: {}",
            kind,
            path.display(),
            e
        ))
    })
}
