//! Menu browsing and cart rules against the mock backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use comanda_client::{MenuError, MenuService};
use comanda_core::cart::CartError;
use comanda_core::catalog::CategoryFilter;
use comanda_core::types::{CategoryId, ProductId};
use comanda_integration_tests::{ADMIN_EMAIL, ADMIN_PASSWORD, MockBackend};

#[tokio::test]
async fn test_menu_lists_active_categories_in_order() {
    let backend = MockBackend::start().await.unwrap();
    let (api, state) = backend.client();
    let menu = MenuService::new(api, state);

    let view = menu.load(&CategoryFilter::All).await.unwrap();

    let labels: Vec<&str> = view.tabs.iter().map(|t| t.label.as_str()).collect();
    assert_eq!(labels, ["🍽️ All", "🍔 Hamburguesas", "🥤 Bebidas"]);
    assert!(view.tabs[0].selected);
    assert_eq!(view.cards.len(), 4);

    let doble = view.cards.iter().find(|c| c.name == "Doble").unwrap();
    assert_eq!(doble.badge.as_deref(), Some("Only 3 left!"));
    let chicha = view.cards.iter().find(|c| c.name == "Chicha morada").unwrap();
    assert!(!chicha.available);
    assert_eq!(chicha.badge.as_deref(), Some("Sold out"));
}

#[tokio::test]
async fn test_category_filter_queries_backend() {
    let backend = MockBackend::start().await.unwrap();
    let (api, state) = backend.client();
    let menu = MenuService::new(api, state);

    let drinks = CategoryFilter::Category(CategoryId::new("2"));
    let view = menu.load(&drinks).await.unwrap();
    assert_eq!(view.cards.len(), 2);
    assert!(view.tabs[2].selected);

    let empty = CategoryFilter::Category(CategoryId::new("3"));
    let view = menu.load(&empty).await.unwrap();
    assert!(view.cards.is_empty());
    assert!(view.empty_message.is_some());
}

#[tokio::test]
async fn test_cart_rules() {
    let backend = MockBackend::start().await.unwrap();
    let (api, state) = backend.client();
    let menu = MenuService::new(api, state);

    let notice = menu.add_to_cart(&ProductId::new("11"), 2).await.unwrap();
    assert_eq!(notice.message, "✅ Doble added to the cart");

    let err = menu.add_to_cart(&ProductId::new("11"), 2).await.unwrap_err();
    assert!(matches!(
        err,
        MenuError::Cart(CartError::StockExceeded { available: 3, .. })
    ));

    assert!(matches!(
        menu.add_to_cart(&ProductId::new("20"), 1).await,
        Err(MenuError::Cart(CartError::Unavailable))
    ));
    assert!(matches!(
        menu.add_to_cart(&ProductId::new("404"), 1).await,
        Err(MenuError::ProductNotFound(_))
    ));

    let cart = menu.set_quantity(&ProductId::new("11"), 3).unwrap();
    assert_eq!(cart.item_count(), 3);
    let cart = menu.set_quantity(&ProductId::new("11"), 0).unwrap();
    assert!(cart.is_empty());
    assert!(matches!(
        menu.remove(&ProductId::new("11")),
        Err(MenuError::Cart(CartError::NotInCart(_)))
    ));
}

#[tokio::test]
async fn test_admin_cannot_add_to_cart() {
    let backend = MockBackend::start().await.unwrap();
    let (api, state) = backend.logged_in(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let menu = MenuService::new(api, state);

    assert!(matches!(
        menu.add_to_cart(&ProductId::new("10"), 1).await,
        Err(MenuError::Cart(CartError::AdministratorMode))
    ));
    assert!(menu.cart().unwrap().is_empty());
}

#[tokio::test]
async fn test_product_detail_stock_note() {
    let backend = MockBackend::start().await.unwrap();
    let (api, state) = backend.client();
    let menu = MenuService::new(api, state);

    let detail = menu.detail(&ProductId::new("11")).await.unwrap();
    assert_eq!(detail.price, "S/ 22.50");
    assert_eq!(detail.stock_note.as_deref(), Some("Stock available: 3"));

    let detail = menu.detail(&ProductId::new("21")).await.unwrap();
    assert!(detail.stock_note.is_none());
}
