mod common;

use common::TestDb;
use std::sync::Arc;

use menu_api::config::AppConfig;
use menu_api::errors::ServiceError;
use menu_api::repositories::{CategoryChanges, MenuChanges, NewCategory, NewMenu, Repositories};
use menu_api::services::{CategoryService, MenuService, UploadService};

fn sql_repositories(test_db: &TestDb) -> Repositories {
    let cfg = AppConfig::new("sqlite::memory:");
    Repositories::from_config(&cfg, Some(Arc::new(test_db.pool.clone()))).unwrap()
}

#[tokio::test]
async fn category_crud_flow() {
    let test_db = TestDb::new().await;
    let repos = sql_repositories(&test_db);
    let service = CategoryService::from_repositories(&repos);

    let created = service
        .create(NewCategory {
            description: "Cold drinks".to_string(),
            order: 2,
            ..NewCategory::new("Drinks")
        })
        .await
        .unwrap();
    assert_eq!(created.name, "Drinks");
    assert!(created.id.parse::<i32>().is_ok());

    let listings = service.list().await.unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].category.name, "Drinks");
    assert_eq!(listings[0].menu_count, 0);

    let updated = service
        .update(
            &created.id,
            CategoryChanges {
                description: Some("Hot and cold drinks".to_string()),
                active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.description, "Hot and cold drinks");
    assert!(!updated.active);

    let fetched = service.get(&created.id).await.unwrap().unwrap();
    assert_eq!(fetched, updated);

    service.delete(&created.id).await.unwrap();
    assert!(service.get(&created.id).await.unwrap().is_none());
}

#[tokio::test]
async fn categories_list_in_display_order() {
    let test_db = TestDb::new().await;
    let repos = sql_repositories(&test_db);
    let service = CategoryService::from_repositories(&repos);

    service
        .create(NewCategory {
            order: 5,
            ..NewCategory::new("Dessert")
        })
        .await
        .unwrap();
    service
        .create(NewCategory {
            order: 1,
            ..NewCategory::new("Appetizer")
        })
        .await
        .unwrap();

    let names: Vec<String> = service
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.category.name)
        .collect();
    assert_eq!(names, vec!["Appetizer", "Dessert"]);
}

#[tokio::test]
async fn deleting_a_referenced_category_is_rejected() {
    let test_db = TestDb::new().await;
    let repos = sql_repositories(&test_db);
    let categories = CategoryService::from_repositories(&repos);
    let menus = MenuService::from_repositories(&repos);

    let category = categories.create(NewCategory::new("Soup")).await.unwrap();
    let menu = menus
        .create(NewMenu::new(category.id.clone(), "Tom Yum", 8000.0))
        .await
        .unwrap();

    let err = categories.delete(&category.id).await.unwrap_err();
    match err {
        ServiceError::Conflict(message) => {
            assert!(message.contains("1 menu item(s)"), "message: {message}");
        }
        other => panic!("expected Conflict, got {other:?}"),
    }

    menus.delete(&menu.id).await.unwrap();
    categories.delete(&category.id).await.unwrap();
}

#[tokio::test]
async fn menu_crud_flow_with_counts() {
    let test_db = TestDb::new().await;
    let repos = sql_repositories(&test_db);
    let categories = CategoryService::from_repositories(&repos);
    let menus = MenuService::from_repositories(&repos);

    let category = categories.create(NewCategory::new("Grill")).await.unwrap();

    let created = menus
        .create(NewMenu {
            description: "Charcoal grilled".to_string(),
            promotion_price: Some(15000.0),
            featured: true,
            ..NewMenu::new(category.id.clone(), "Grilled Fish", 20000.0)
        })
        .await
        .unwrap();
    assert_eq!(created.min_price, 20000.0);
    assert_eq!(created.currency, "KHR");
    assert_eq!(created.image, "static/images/default.jpg");

    let listings = categories.list().await.unwrap();
    assert_eq!(listings[0].menu_count, 1);

    let by_category = menus.list_by_category(&category.id).await.unwrap();
    assert_eq!(by_category.len(), 1);

    let updated = menus
        .update(
            &created.id,
            MenuChanges {
                price: Some(18000.0),
                available: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.min_price, 18000.0);
    assert!(!updated.available);

    menus.delete(&created.id).await.unwrap();
    let err = menus.get(&created.id).await.unwrap();
    assert!(err.is_none());
}

#[tokio::test]
async fn menu_validation_rejects_bad_input() {
    let test_db = TestDb::new().await;
    let repos = sql_repositories(&test_db);
    let categories = CategoryService::from_repositories(&repos);
    let menus = MenuService::from_repositories(&repos);

    let category = categories.create(NewCategory::new("Salad")).await.unwrap();

    let err = menus
        .create(NewMenu::new(category.id.clone(), "  ", 1000.0))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));

    let err = menus
        .create(NewMenu::new(category.id.clone(), "Green Salad", -1.0))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn update_of_missing_records_reports_not_found() {
    let test_db = TestDb::new().await;
    let repos = sql_repositories(&test_db);
    let categories = CategoryService::from_repositories(&repos);
    let menus = MenuService::from_repositories(&repos);

    let err = categories
        .update("12345", CategoryChanges::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let err = menus.update("12345", MenuChanges::default()).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn deleting_a_menu_removes_its_uploaded_image() {
    let test_db = TestDb::new().await;
    let repos = sql_repositories(&test_db);
    let categories = CategoryService::from_repositories(&repos);
    let menus = MenuService::from_repositories(&repos);

    let dir = tempfile::tempdir().unwrap();
    let image_path = dir.path().join("dish.jpg");
    std::fs::write(&image_path, b"jpeg bytes").unwrap();

    let category = categories.create(NewCategory::new("Curry")).await.unwrap();
    let menu = menus
        .create(NewMenu {
            image: image_path.to_string_lossy().into_owned(),
            ..NewMenu::new(category.id.clone(), "Red Curry", 12000.0)
        })
        .await
        .unwrap();

    menus.delete(&menu.id).await.unwrap();
    assert!(!image_path.exists());
}

#[tokio::test]
async fn upload_validation_and_storage() {
    let dir = tempfile::tempdir().unwrap();
    let service = UploadService::new(dir.path().join("uploads"), 16);

    let err = service
        .store(b"plain text", "text/plain", "notes.txt")
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    let err = service
        .store(&[0u8; 32], "image/png", "big.png")
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    let path = service.store(b"png bytes", "image/png", "dish.png").unwrap();
    assert!(path.ends_with(".png"), "path: {path}");
    let stored = std::path::Path::new(&path);
    assert!(stored.exists());
    assert_eq!(std::fs::read(stored).unwrap(), b"png bytes");
}
