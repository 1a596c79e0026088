//! End-to-end checkout against the mock backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use chrono::{Datelike, Duration, Local, Utc};
use comanda_client::storage::keys;
use comanda_client::{
    ApiError, CheckoutError, CheckoutService, KeyValueStore, LocalState, LookupSource,
    MemoryStore, MenuService, SessionService, StorageError,
};
use comanda_core::cart::CartError;
use comanda_core::checkout::{CheckoutForm, Step, Wizard, WizardError};
use comanda_core::types::{DeliveryMethod, PaymentMethod, ProductId, ReceiptType};
use comanda_integration_tests::{CUSTOMER_EMAIL, CUSTOMER_PASSWORD, MockBackend};
use rust_decimal::Decimal;
use secrecy::SecretString;

fn yape_pickup_form() -> CheckoutForm {
    CheckoutForm {
        first_name: "Ana".to_string(),
        last_name: "Quispe".to_string(),
        email: CUSTOMER_EMAIL.to_string(),
        phone: "987654321".to_string(),
        receipt_type: ReceiptType::Boleta,
        dni: "12345678".to_string(),
        delivery_method: DeliveryMethod::Pickup,
        payment_method: PaymentMethod::Yape,
        yape_phone: "912345678".to_string(),
        yape_code: "123456".to_string(),
        ..CheckoutForm::default()
    }
}

fn card_delivery_form() -> CheckoutForm {
    let next_year = Local::now().year() % 100 + 1;
    CheckoutForm {
        receipt_type: ReceiptType::Factura,
        ruc: "20123456789".to_string(),
        delivery_method: DeliveryMethod::Delivery,
        address: "Av. Arequipa 123".to_string(),
        reference: "Frente al parque".to_string(),
        payment_method: PaymentMethod::Card,
        card_number: "4111 1111 1111 1111".to_string(),
        expiry: format!("12/{next_year:02}"),
        card_holder: "ANA QUISPE".to_string(),
        cvv: "123".to_string(),
        ..yape_pickup_form()
    }
}

/// A wizard advanced to the payment step.
fn wizard_for(form: &CheckoutForm) -> Wizard {
    let mut wizard = Wizard::new();
    wizard.next(form).unwrap();
    wizard.next(form).unwrap();
    assert_eq!(wizard.step(), Step::Payment);
    wizard
}

async fn customer_with_cart(backend: &MockBackend) -> (MenuService, CheckoutService) {
    let (api, state) = backend.logged_in(CUSTOMER_EMAIL, CUSTOMER_PASSWORD).await;
    let menu = MenuService::new(api.clone(), state.clone());
    menu.add_to_cart(&ProductId::new("10"), 2).await.unwrap();
    menu.add_to_cart(&ProductId::new("21"), 1).await.unwrap();
    let checkout = CheckoutService::new(api, state, Decimal::new(500, 2));
    (menu, checkout)
}

#[tokio::test]
async fn test_pickup_order_with_yape() {
    let backend = MockBackend::start().await.unwrap();
    let (menu, checkout) = customer_with_cart(&backend).await;
    let form = yape_pickup_form();
    let mut wizard = wizard_for(&form);

    let order = checkout.submit(&mut wizard, &form).await.unwrap();

    assert_eq!(order.order_number.as_str(), "ORD-00001");
    assert_eq!(order.totals.subtotal, Decimal::new(3680, 2));
    assert_eq!(order.totals.delivery_cost, Decimal::ZERO);
    assert_eq!(order.totals.total, Decimal::new(3680, 2));
    assert_eq!(order.headline(), "ORDER CONFIRMED, ANA QUISPE!");
    assert!(wizard.is_submitted());
    assert!(menu.cart().unwrap().is_empty());
    assert!(!checkout.control().is_busy());

    let stored = checkout.last_order(Utc::now()).unwrap();
    assert_eq!(stored.order_number, order.order_number);

    let state = backend.state();
    let body = &state.orders[0];
    assert_eq!(body["cliente_dni"], "12345678");
    assert!(body["cliente_ruc"].is_null());
    assert!(body["entrega_direccion"].is_null());
    assert_eq!(body["metodo_entrega"], "recoger");
    assert_eq!(body["pago_detalles"]["yape_numero"], "912345678");
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["total"], 36.8);
    assert_eq!(state.product("10").unwrap()["stock"], 18);
}

#[tokio::test]
async fn test_delivery_order_with_card() {
    let backend = MockBackend::start().await.unwrap();
    let (_menu, checkout) = customer_with_cart(&backend).await;
    let form = card_delivery_form();

    let totals = checkout.totals(&form).unwrap();
    assert_eq!(totals.delivery_cost, Decimal::new(500, 2));
    assert_eq!(totals.total, Decimal::new(4180, 2));

    let mut wizard = wizard_for(&form);
    let order = checkout.submit(&mut wizard, &form).await.unwrap();
    assert_eq!(order.totals.total, Decimal::new(4180, 2));
    assert_eq!(order.delivery_estimate().window, "25-40 minutes");
    assert_eq!(
        order.delivery_estimate().address.as_deref(),
        Some("Av. Arequipa 123")
    );

    let state = backend.state();
    let body = &state.orders[0];
    assert_eq!(body["tipo_comprobante"], "factura");
    assert_eq!(body["cliente_ruc"], "20123456789");
    assert!(body["cliente_dni"].is_null());
    assert_eq!(
        body["pago_detalles"]["numero_tarjeta_masked"],
        "**** **** **** 1111"
    );
    assert!(body["pago_detalles"].get("cvv").is_none());
    assert_eq!(body["costo_delivery"], 5.0);
}

#[tokio::test]
async fn test_rejected_order_keeps_cart_and_allows_retry() {
    let backend = MockBackend::start().await.unwrap();
    let (menu, checkout) = customer_with_cart(&backend).await;
    backend.state().order_rejection = Some("Stock insuficiente para Clásica".to_string());

    let form = yape_pickup_form();
    let mut wizard = wizard_for(&form);
    let err = checkout.submit(&mut wizard, &form).await.unwrap_err();

    match &err {
        CheckoutError::Api(ApiError::Rejected { message }) => {
            assert_eq!(message, "Stock insuficiente para Clásica");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().ends_with("Stock insuficiente para Clásica"));
    assert_eq!(menu.cart().unwrap().item_count(), 3);
    assert!(!wizard.is_submitted());
    assert!(!checkout.control().is_busy());
    assert!(matches!(
        checkout.last_order(Utc::now()),
        Err(CheckoutError::NoOrder)
    ));

    backend.state().order_rejection = None;
    let order = checkout.submit(&mut wizard, &form).await.unwrap();
    assert_eq!(order.items.len(), 2);
    assert_eq!(backend.state().order_attempts, 2);
}

/// Memory store whose confirmation writes fail.
#[derive(Default)]
struct NoSnapshotStore {
    inner: MemoryStore,
}

impl KeyValueStore for NoSnapshotStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if key == keys::LAST_ORDER {
            return Err(StorageError::Io(std::io::Error::other("disk full")));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}

#[tokio::test]
async fn test_placed_order_survives_snapshot_failure() {
    let backend = MockBackend::start().await.unwrap();
    let (api, _) = backend.client();
    let state = LocalState::new(NoSnapshotStore::default());
    SessionService::new(api.clone(), state.clone())
        .login(
            CUSTOMER_EMAIL,
            &SecretString::from(CUSTOMER_PASSWORD.to_string()),
            false,
        )
        .await
        .unwrap();
    let menu = MenuService::new(api.clone(), state.clone());
    menu.add_to_cart(&ProductId::new("10"), 2).await.unwrap();
    let checkout = CheckoutService::new(api, state, Decimal::new(500, 2));

    let form = yape_pickup_form();
    let mut wizard = wizard_for(&form);
    let order = checkout.submit(&mut wizard, &form).await.unwrap();

    assert_eq!(order.order_number.as_str(), "ORD-00001");
    assert!(wizard.is_submitted());
    assert!(menu.cart().unwrap().is_empty());
    assert!(matches!(
        checkout.last_order(Utc::now()),
        Err(CheckoutError::NoOrder)
    ));

    // Retrying does not place a second order
    assert!(matches!(
        checkout.submit(&mut wizard, &form).await,
        Err(CheckoutError::Wizard(WizardError::AlreadySubmitted))
    ));
    assert_eq!(backend.state().orders.len(), 1);
    assert_eq!(backend.state().order_attempts, 1);
}

#[tokio::test]
async fn test_concurrent_submit_is_refused() {
    let backend = MockBackend::start().await.unwrap();
    let (_menu, checkout) = customer_with_cart(&backend).await;
    let form = yape_pickup_form();
    let mut first = wizard_for(&form);
    let mut second = wizard_for(&form);

    let (a, b) = tokio::join!(
        checkout.submit(&mut first, &form),
        checkout.submit(&mut second, &form)
    );

    assert!(a.is_ok());
    assert!(matches!(b, Err(CheckoutError::Busy)));
    assert_eq!(backend.state().order_attempts, 1);
}

#[tokio::test]
async fn test_preconditions_send_nothing() {
    let backend = MockBackend::start().await.unwrap();
    let form = yape_pickup_form();

    // Not logged in
    let (api, state) = backend.client();
    let checkout = CheckoutService::new(api, state, Decimal::new(500, 2));
    let mut wizard = wizard_for(&form);
    assert!(matches!(
        checkout.submit(&mut wizard, &form).await,
        Err(CheckoutError::NotLoggedIn)
    ));

    // Empty cart
    let (api, state) = backend.logged_in(CUSTOMER_EMAIL, CUSTOMER_PASSWORD).await;
    let checkout = CheckoutService::new(api, state, Decimal::new(500, 2));
    assert!(matches!(
        checkout.submit(&mut wizard, &form).await,
        Err(CheckoutError::Cart(CartError::Empty))
    ));

    // Invalid field on the payment step
    let bad = CheckoutForm {
        yape_code: "12".to_string(),
        ..form
    };
    let err = checkout.submit(&mut wizard, &bad).await.unwrap_err();
    match err {
        CheckoutError::Wizard(WizardError::Incomplete { step, failures }) => {
            assert_eq!(step, Step::Payment);
            assert_eq!(failures.len(), 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(backend.state().order_attempts, 0);
}

#[tokio::test]
async fn test_expired_confirmation_is_discarded() {
    let backend = MockBackend::start().await.unwrap();
    let (_menu, checkout) = customer_with_cart(&backend).await;
    let form = yape_pickup_form();
    let mut wizard = wizard_for(&form);
    checkout.submit(&mut wizard, &form).await.unwrap();

    let receipt = checkout.receipt(Utc::now()).unwrap();
    assert_eq!(receipt.file_name, "receipt-ORD-00001.txt");
    assert!(receipt.text.contains("ORD-00001"));

    let later = Utc::now() + Duration::hours(25);
    assert!(matches!(
        checkout.last_order(later),
        Err(CheckoutError::NoOrder)
    ));
    // Discarded, not just hidden
    assert!(matches!(
        checkout.last_order(Utc::now()),
        Err(CheckoutError::NoOrder)
    ));
}

#[tokio::test]
async fn test_lookups_from_backend_and_fallback() {
    let backend = MockBackend::start().await.unwrap();
    let (api, state) = backend.client();
    let checkout = CheckoutService::new(api, state, Decimal::ZERO);

    let lookups = checkout.lookups().await;
    assert_eq!(lookups.source, LookupSource::Backend);
    assert_eq!(lookups.receipt_types[1].name, "factura");

    // Cached lists survive the backend going down
    backend.state().lookups_down = true;
    assert_eq!(checkout.lookups().await.source, LookupSource::Backend);

    let (api, state) = backend.client();
    let fresh = CheckoutService::new(api, state, Decimal::ZERO);
    let lookups = fresh.lookups().await;
    assert_eq!(lookups.source, LookupSource::Fallback);
    assert_eq!(lookups.delivery_methods[0].name, "delivery");
    assert_eq!(lookups.payment_methods.len(), 2);
}
