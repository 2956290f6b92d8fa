mod common;

use common::{write_json, TestDb};
use sea_orm::{EntityTrait, PaginatorTrait, TransactionTrait};
use serde_json::json;

use menu_api::entities::{category, menu};
use menu_api::errors::ServiceError;
use menu_api::import::source::SourceCategory;
use menu_api::import::{
    migrate_categories, migrate_menus, source, ImportRunner, RunState, SkipReason,
};

fn source_category(id: &str, name: &str) -> SourceCategory {
    SourceCategory {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        order: None,
        active: None,
    }
}

#[tokio::test]
async fn end_to_end_import_creates_linked_rows() {
    let test_db = TestDb::new().await;
    let dir = tempfile::tempdir().unwrap();

    let categories_file = write_json(
        dir.path(),
        "categories.json",
        json!({"categories": [{"id": "1", "name": "Appetizer"}]}),
    );
    let menus_file = write_json(
        dir.path(),
        "menus.json",
        json!({"menus": [{"id": "100", "categoryId": "1", "title": "Spring Roll", "price": 5000}]}),
    );

    let mut runner = ImportRunner::new(&categories_file, &menus_file);
    let summary = runner.run(&test_db.pool).await.unwrap();

    assert_eq!(runner.state(), RunState::Committed);
    assert_eq!(summary.categories_total, 1);
    assert_eq!(summary.menus_total, 1);
    assert_eq!(summary.categories_created, 1);
    assert_eq!(summary.menus_created, 1);
    assert!(summary.skipped.is_empty());

    let category_row = category::Entity::find()
        .one(&test_db.pool)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(category_row.name, "Appetizer");
    assert_eq!(category_row.description.as_deref(), Some(""));
    assert!(category_row.active);

    let menu_row = menu::Entity::find()
        .one(&test_db.pool)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(menu_row.title, "Spring Roll");
    assert_eq!(menu_row.min_price, 5000.0);
    assert_eq!(menu_row.category_id, category_row.id);
    assert_eq!(menu_row.currency, "KHR");
    assert_eq!(menu_row.image, "static/images/default.jpg");
    assert!(menu_row.available);
    assert!(!menu_row.featured);
}

#[tokio::test]
async fn second_run_creates_nothing_new() {
    let test_db = TestDb::new().await;
    let dir = tempfile::tempdir().unwrap();

    let categories_file = write_json(
        dir.path(),
        "categories.json",
        json!({"categories": [
            {"id": "1", "name": "Appetizer"},
            {"id": "2", "name": "Soup"}
        ]}),
    );
    let menus_file = write_json(
        dir.path(),
        "menus.json",
        json!({"menus": [
            {"id": "100", "categoryId": "1", "title": "Spring Roll", "price": 5000},
            {"id": "101", "categoryId": "2", "title": "Tom Yum", "minPrice": 8000, "maxPrice": 12000}
        ]}),
    );

    let mut first = ImportRunner::new(&categories_file, &menus_file);
    let first_summary = first.run(&test_db.pool).await.unwrap();
    assert_eq!(first_summary.categories_created, 2);
    assert_eq!(first_summary.menus_created, 2);

    let mut second = ImportRunner::new(&categories_file, &menus_file);
    let second_summary = second.run(&test_db.pool).await.unwrap();

    assert_eq!(second.state(), RunState::Committed);
    assert_eq!(second_summary.categories_created, 0);
    assert_eq!(second_summary.categories_reused, 2);
    assert_eq!(second_summary.menus_created, 0);
    assert_eq!(second_summary.skipped.len(), 2);
    assert!(second_summary
        .skipped
        .iter()
        .all(|s| s.reason == SkipReason::Duplicate));

    assert_eq!(second_summary.categories_total, 2);
    assert_eq!(second_summary.menus_total, 2);
}

#[tokio::test]
async fn price_range_is_preserved() {
    let test_db = TestDb::new().await;
    let dir = tempfile::tempdir().unwrap();

    let categories_file = write_json(
        dir.path(),
        "categories.json",
        json!({"categories": [{"id": "1", "name": "Hotpot"}]}),
    );
    let menus_file = write_json(
        dir.path(),
        "menus.json",
        json!({"menus": [
            {"id": "100", "categoryId": "1", "title": "Seafood Hotpot", "minPrice": 8000, "maxPrice": 12000},
            {"id": "101", "categoryId": "1", "title": "Beef Hotpot", "price": 10000}
        ]}),
    );

    let mut runner = ImportRunner::new(&categories_file, &menus_file);
    runner.run(&test_db.pool).await.unwrap();

    let rows = menu::Entity::find().all(&test_db.pool).await.unwrap();
    let seafood = rows.iter().find(|m| m.title == "Seafood Hotpot").unwrap();
    assert_eq!(seafood.min_price, 8000.0);
    assert_eq!(seafood.max_price, Some(12000.0));

    let beef = rows.iter().find(|m| m.title == "Beef Hotpot").unwrap();
    assert_eq!(beef.min_price, 10000.0);
    assert_eq!(beef.max_price, None);
}

#[tokio::test]
async fn unresolvable_category_skips_the_menu() {
    let test_db = TestDb::new().await;
    let dir = tempfile::tempdir().unwrap();

    let categories_file = write_json(
        dir.path(),
        "categories.json",
        json!({"categories": [{"id": "1", "name": "Appetizer"}]}),
    );
    let menus_file = write_json(
        dir.path(),
        "menus.json",
        json!({"menus": [{"id": "100", "categoryId": "999", "title": "Orphan Dish", "price": 4000}]}),
    );

    let mut runner = ImportRunner::new(&categories_file, &menus_file);
    let summary = runner.run(&test_db.pool).await.unwrap();

    assert_eq!(runner.state(), RunState::Committed);
    assert_eq!(summary.menus_created, 0);
    assert_eq!(summary.menus_total, 0);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].title, "Orphan Dish");
    assert_eq!(summary.skipped[0].reason, SkipReason::CategoryNotFound);
    assert_eq!(summary.skipped[0].reason.to_string(), "category not found");
}

#[tokio::test]
async fn colliding_names_collapse_to_one_row() {
    let test_db = TestDb::new().await;

    let records = vec![
        source_category("1", "Dessert"),
        source_category("2", "Dessert"),
    ];

    let txn = test_db.pool.begin().await.unwrap();
    let outcome = migrate_categories(&txn, &records).await.unwrap();
    txn.commit().await.unwrap();

    assert_eq!(outcome.created, 1);
    assert_eq!(outcome.reused, 1);
    assert_eq!(outcome.id_map["1"], outcome.id_map["2"]);

    let total = category::Entity::find().count(&test_db.pool).await.unwrap();
    assert_eq!(total, 1);
}

#[tokio::test]
async fn failed_menu_batch_rolls_back_everything() {
    let test_db = TestDb::new().await;

    let categories = vec![source_category("1", "Appetizer")];
    let menus_doc: source::MenusDocument = serde_json::from_value(json!({"menus": [
        {"id": "100", "categoryId": "999", "title": "Spring Roll", "price": 5000}
    ]}))
    .unwrap();

    let txn = test_db.pool.begin().await.unwrap();
    let outcome = migrate_categories(&txn, &categories).await.unwrap();

    // Point the dangling source reference at a category id that does not
    // exist, so the insert trips the foreign key mid-batch.
    let mut id_map = outcome.id_map;
    id_map.insert("999".to_string(), 424_242);

    let result = migrate_menus(&txn, &menus_doc.menus, &id_map).await;
    assert!(result.is_err());
    txn.rollback().await.unwrap();

    let categories_total = category::Entity::find().count(&test_db.pool).await.unwrap();
    let menus_total = menu::Entity::find().count(&test_db.pool).await.unwrap();
    assert_eq!(categories_total, 0);
    assert_eq!(menus_total, 0);
}

#[tokio::test]
async fn malformed_source_document_fails_the_run() {
    let test_db = TestDb::new().await;
    let dir = tempfile::tempdir().unwrap();

    let categories_file = write_json(
        dir.path(),
        "categories.json",
        json!({"categories": [{"id": "1", "name": "Appetizer"}]}),
    );
    let menus_file = dir.path().join("menus.json");
    std::fs::write(&menus_file, "{not json").unwrap();

    let mut runner = ImportRunner::new(&categories_file, &menus_file);
    let err = runner.run(&test_db.pool).await.unwrap_err();

    assert_eq!(runner.state(), RunState::Failed);
    assert!(matches!(err, ServiceError::SerializationError(_)));

    let categories_total = category::Entity::find().count(&test_db.pool).await.unwrap();
    assert_eq!(categories_total, 0);
}

#[tokio::test]
async fn missing_source_files_commit_an_empty_run() {
    let test_db = TestDb::new().await;
    let dir = tempfile::tempdir().unwrap();

    let mut runner = ImportRunner::new(
        dir.path().join("categories.json"),
        dir.path().join("menus.json"),
    );
    let summary = runner.run(&test_db.pool).await.unwrap();

    assert_eq!(runner.state(), RunState::Committed);
    assert_eq!(summary.categories_total, 0);
    assert_eq!(summary.menus_total, 0);
    assert!(summary.skipped.is_empty());
}
