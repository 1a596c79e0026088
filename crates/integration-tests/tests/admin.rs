//! Catalog administration against the mock backend.

#![allow(clippy::unwrap_used)]

use comanda_client::{AdminError, AdminService, ApiError};
use comanda_core::catalog::{CatalogError, CategoryDraft, CategoryFilter, ProductDraft};
use comanda_core::notice::NoticeLevel;
use comanda_core::types::{CategoryId, ProductId};
use comanda_integration_tests::{
    ADMIN_EMAIL, ADMIN_PASSWORD, CUSTOMER_EMAIL, CUSTOMER_PASSWORD, MockBackend,
};
use rust_decimal::Decimal;

async fn admin(backend: &MockBackend) -> AdminService {
    let (api, state) = backend.logged_in(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    AdminService::new(api, state)
}

#[tokio::test]
async fn test_customers_and_guests_are_refused() {
    let backend = MockBackend::start().await.unwrap();

    let (api, state) = backend.logged_in(CUSTOMER_EMAIL, CUSTOMER_PASSWORD).await;
    let customer = AdminService::new(api, state);
    assert!(matches!(
        customer.snapshot().await,
        Err(AdminError::NotAuthorized)
    ));

    let (api, state) = backend.client();
    let guest = AdminService::new(api, state);
    assert!(matches!(
        guest.delete_product(&ProductId::new("10")).await,
        Err(AdminError::NotAuthorized)
    ));
    assert_eq!(backend.state().products.len(), 4);
}

#[tokio::test]
async fn test_dashboard_figures() {
    let backend = MockBackend::start().await.unwrap();
    let admin = admin(&backend).await;

    let (stats, warning) = admin.dashboard().await.unwrap();

    assert_eq!(stats.total_products, 4);
    assert_eq!(stats.active_products, 4);
    assert_eq!(stats.total_categories, 3);
    assert_eq!(stats.low_stock_products, 2);
    assert_eq!(stats.most_expensive.unwrap().name, "Doble");
    assert_eq!(stats.least_expensive.unwrap().name, "Inca Kola");
    assert_eq!(warning.unwrap().level, NoticeLevel::Warning);
}

#[tokio::test]
async fn test_product_lifecycle() {
    let backend = MockBackend::start().await.unwrap();
    let admin = admin(&backend).await;

    let draft = ProductDraft {
        name: " Tequeños ".to_string(),
        description: "Con guacamole".to_string(),
        price: Some(Decimal::new(1200, 2)),
        category_id: Some(CategoryId::new("1")),
        stock: 15,
        active: true,
        ..ProductDraft::default()
    };
    let notice = admin.save_product(None, &draft).await.unwrap();
    assert_eq!(notice.message, "Product created successfully");

    let snapshot = admin.snapshot().await.unwrap();
    let created = snapshot
        .filter_products("tequeños", &CategoryFilter::All)
        .into_iter()
        .next()
        .cloned()
        .unwrap();
    assert_eq!(created.name, "Tequeños");
    assert_eq!(created.price, Decimal::new(1200, 2));
    assert_eq!(created.category.name, "Hamburguesas");

    let mut update = ProductDraft::from(&created);
    update.price = Some(Decimal::new(1350, 2));
    update.category_id = Some(CategoryId::new("2"));
    let notice = admin.save_product(Some(&created.id), &update).await.unwrap();
    assert_eq!(notice.message, "Product updated successfully");

    let snapshot = admin.snapshot().await.unwrap();
    let updated = snapshot.product(&created.id).unwrap();
    assert_eq!(updated.price, Decimal::new(1350, 2));
    assert_eq!(updated.category.name, "Bebidas");

    let notice = admin.toggle_product(updated).await.unwrap();
    assert_eq!(notice.message, "Product deactivated");
    let snapshot = admin.snapshot().await.unwrap();
    assert!(!snapshot.product(&created.id).unwrap().active);

    admin.delete_product(&created.id).await.unwrap();
    assert!(admin.snapshot().await.unwrap().product(&created.id).is_none());
}

#[tokio::test]
async fn test_invalid_product_is_not_sent() {
    let backend = MockBackend::start().await.unwrap();
    let admin = admin(&backend).await;

    let draft = ProductDraft {
        name: "Sin precio".to_string(),
        category_id: Some(CategoryId::new("1")),
        ..ProductDraft::default()
    };
    assert!(matches!(
        admin.save_product(None, &draft).await,
        Err(AdminError::Catalog(CatalogError::MissingProductFields))
    ));
    assert_eq!(backend.state().products.len(), 4);
}

#[tokio::test]
async fn test_category_lifecycle() {
    let backend = MockBackend::start().await.unwrap();
    let admin = admin(&backend).await;

    let draft = CategoryDraft {
        name: "Entradas".to_string(),
        icon: "🥟".to_string(),
        display_order: 4,
        active: true,
        ..CategoryDraft::default()
    };
    let notice = admin.save_category(None, &draft).await.unwrap();
    assert_eq!(notice.message, "Category created successfully");

    let snapshot = admin.snapshot().await.unwrap();
    let created = snapshot
        .categories
        .iter()
        .find(|c| c.name == "Entradas")
        .cloned()
        .unwrap();
    assert_eq!(created.display_order, 4);

    let notice = admin.toggle_category(&created).await.unwrap();
    assert_eq!(notice.message, "Category deactivated");

    admin.delete_category(&created.id).await.unwrap();
    assert!(admin.snapshot().await.unwrap().category(&created.id).is_none());
}

#[tokio::test]
async fn test_backend_refusal_is_shown_verbatim() {
    let backend = MockBackend::start().await.unwrap();
    let admin = admin(&backend).await;

    let err = admin
        .delete_category(&CategoryId::new("1"))
        .await
        .unwrap_err();

    assert!(matches!(err, AdminError::Api(ApiError::Status { status: 400, .. })));
    assert_eq!(
        err.to_string(),
        "No se puede eliminar una categoría con productos"
    );
    assert!(backend.state().category("1").is_some());
}
