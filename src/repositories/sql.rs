//! Relational implementations of the category/menu repositories.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use std::collections::HashMap;
use std::sync::Arc;

use super::{
    CategoryChanges, CategoryRecord, CategoryRepository, MenuChanges, MenuRecord, MenuRepository,
    NewCategory, NewMenu,
};
use crate::entities::{category, menu};
use crate::errors::ServiceError;

fn parse_id(id: &str) -> Result<i32, ServiceError> {
    id.parse::<i32>()
        .map_err(|_| ServiceError::InvalidInput(format!("invalid id '{id}'")))
}

impl From<category::Model> for CategoryRecord {
    fn from(model: category::Model) -> Self {
        Self {
            id: model.id.to_string(),
            name: model.name,
            description: model.description.unwrap_or_default(),
            order: model.order,
            active: model.active,
        }
    }
}

impl From<menu::Model> for MenuRecord {
    fn from(model: menu::Model) -> Self {
        Self {
            id: model.id.to_string(),
            category_id: model.category_id.to_string(),
            title: model.title,
            description: model.description.unwrap_or_default(),
            min_price: model.min_price,
            max_price: model.max_price,
            promotion_price: model.promotion_price,
            currency: model.currency,
            image: model.image,
            available: model.available,
            featured: model.featured,
        }
    }
}

pub struct SqlCategoryRepository {
    db: Arc<DatabaseConnection>,
}

impl SqlCategoryRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryRepository for SqlCategoryRepository {
    async fn list(&self) -> Result<Vec<CategoryRecord>, ServiceError> {
        let categories = category::Entity::find()
            .order_by_asc(category::Column::Order)
            .all(&*self.db)
            .await?;

        Ok(categories.into_iter().map(Into::into).collect())
    }

    async fn get(&self, id: &str) -> Result<Option<CategoryRecord>, ServiceError> {
        let category = category::Entity::find_by_id(parse_id(id)?)
            .one(&*self.db)
            .await?;

        Ok(category.map(Into::into))
    }

    async fn create(&self, new: NewCategory) -> Result<CategoryRecord, ServiceError> {
        let model = category::ActiveModel {
            name: Set(new.name),
            description: Set(Some(new.description)),
            order: Set(new.order),
            active: Set(new.active),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        Ok(model.into())
    }

    async fn update(
        &self,
        id: &str,
        changes: CategoryChanges,
    ) -> Result<Option<CategoryRecord>, ServiceError> {
        let Some(existing) = category::Entity::find_by_id(parse_id(id)?)
            .one(&*self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut active_model: category::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            active_model.name = Set(name);
        }
        if let Some(description) = changes.description {
            active_model.description = Set(Some(description));
        }
        if let Some(order) = changes.order {
            active_model.order = Set(order);
        }
        if let Some(active) = changes.active {
            active_model.active = Set(active);
        }

        let updated = active_model.update(&*self.db).await?;
        Ok(Some(updated.into()))
    }

    async fn delete(&self, id: &str) -> Result<bool, ServiceError> {
        let result = category::Entity::delete_by_id(parse_id(id)?)
            .exec(&*self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}

pub struct SqlMenuRepository {
    db: Arc<DatabaseConnection>,
}

impl SqlMenuRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MenuRepository for SqlMenuRepository {
    async fn list(&self) -> Result<Vec<MenuRecord>, ServiceError> {
        let menus = menu::Entity::find()
            .order_by_asc(menu::Column::Id)
            .all(&*self.db)
            .await?;

        Ok(menus.into_iter().map(Into::into).collect())
    }

    async fn get(&self, id: &str) -> Result<Option<MenuRecord>, ServiceError> {
        let menu = menu::Entity::find_by_id(parse_id(id)?).one(&*self.db).await?;

        Ok(menu.map(Into::into))
    }

    async fn create(&self, new: NewMenu) -> Result<MenuRecord, ServiceError> {
        let model = menu::ActiveModel {
            category_id: Set(parse_id(&new.category_id)?),
            title: Set(new.title),
            description: Set(Some(new.description)),
            min_price: Set(new.price),
            max_price: Set(None),
            promotion_price: Set(new.promotion_price),
            currency: Set(new.currency),
            image: Set(new.image),
            available: Set(new.available),
            featured: Set(new.featured),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        Ok(model.into())
    }

    async fn update(
        &self,
        id: &str,
        changes: MenuChanges,
    ) -> Result<Option<MenuRecord>, ServiceError> {
        let Some(existing) = menu::Entity::find_by_id(parse_id(id)?).one(&*self.db).await? else {
            return Ok(None);
        };

        let mut active_model: menu::ActiveModel = existing.into();
        if let Some(category_id) = changes.category_id {
            active_model.category_id = Set(parse_id(&category_id)?);
        }
        if let Some(title) = changes.title {
            active_model.title = Set(title);
        }
        if let Some(description) = changes.description {
            active_model.description = Set(Some(description));
        }
        if let Some(price) = changes.price {
            active_model.min_price = Set(price);
        }
        if let Some(promotion_price) = changes.promotion_price {
            active_model.promotion_price = Set(Some(promotion_price));
        }
        if let Some(currency) = changes.currency {
            active_model.currency = Set(currency);
        }
        if let Some(image) = changes.image {
            active_model.image = Set(image);
        }
        if let Some(available) = changes.available {
            active_model.available = Set(available);
        }
        if let Some(featured) = changes.featured {
            active_model.featured = Set(featured);
        }

        let updated = active_model.update(&*self.db).await?;
        Ok(Some(updated.into()))
    }

    async fn delete(&self, id: &str) -> Result<bool, ServiceError> {
        let result = menu::Entity::delete_by_id(parse_id(id)?)
            .exec(&*self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn count_by_category(&self, category_id: &str) -> Result<u64, ServiceError> {
        let count = menu::Entity::find()
            .filter(menu::Column::CategoryId.eq(parse_id(category_id)?))
            .count(&*self.db)
            .await?;

        Ok(count)
    }

    async fn menu_counts(&self) -> Result<HashMap<String, u64>, ServiceError> {
        use sea_orm::sea_query::Expr;

        let rows: Vec<(i32, i64)> = menu::Entity::find()
            .select_only()
            .column(menu::Column::CategoryId)
            .column_as(Expr::col((menu::Entity, menu::Column::Id)).count(), "count")
            .group_by(menu::Column::CategoryId)
            .into_tuple()
            .all(&*self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(category_id, count)| (category_id.to_string(), count as u64))
            .collect())
    }
}
