//! Integration test support for Comanda.
//!
//! [`MockBackend`] serves the ordering REST API from an in-process axum
//! router on `127.0.0.1:0`, so the client and services can be driven over
//! real HTTP without the hosted backend.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p comanda-integration-tests
//! ```
//!
//! # Seed Data
//!
//! - Users: `ana@example.com` / `secret123` (customer, id 1) and
//!   `admin@example.com` / `admin123` (administrator, id 2)
//! - Categories: 1 Hamburguesas (order 1), 2 Bebidas (order 2), 3 Postres
//!   (inactive)
//! - Products: 10 Clásica (S/ 15.90, stock 20), 11 Doble (S/ 22.50, stock 3),
//!   20 Chicha morada (S/ 6.00, stock 0), 21 Inca Kola (S/ 5.00, stock 50)

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use comanda_client::{ApiClient, ClientConfig, ConfigError, LocalState, SessionService};
use secrecy::SecretString;
use serde_json::{Map, Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const CUSTOMER_EMAIL: &str = "ana@example.com";
pub const CUSTOMER_PASSWORD: &str = "secret123";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin123";

type Reply = (StatusCode, Json<Value>);
type Shared = Arc<Mutex<BackendState>>;

/// Mutable backend data, inspectable from tests.
#[derive(Debug, Default)]
pub struct BackendState {
    pub users: Vec<Value>,
    pub passwords: HashMap<String, String>,
    pub categories: Vec<Value>,
    pub products: Vec<Value>,
    /// Order bodies accepted so far.
    pub orders: Vec<Value>,
    /// Every `POST /orders` received, accepted or not.
    pub order_attempts: usize,
    /// When set, `POST /orders` answers `success: false` with this message.
    pub order_rejection: Option<String>,
    /// When set, the lookup endpoints answer HTTP 500.
    pub lookups_down: bool,
    next_id: u64,
}

impl BackendState {
    fn seeded() -> Self {
        let mut state = Self {
            next_id: 100,
            ..Self::default()
        };

        state.users = vec![
            json!({"id_usuario": 1, "nombre": "Ana María Quispe", "email": CUSTOMER_EMAIL,
                   "telefono": "987654321", "direccion": "Av. Arequipa 123", "rol": "cliente"}),
            json!({"id_usuario": 2, "nombre": "Admin", "email": ADMIN_EMAIL, "rol": "admin"}),
        ];
        state
            .passwords
            .insert(CUSTOMER_EMAIL.to_string(), CUSTOMER_PASSWORD.to_string());
        state
            .passwords
            .insert(ADMIN_EMAIL.to_string(), ADMIN_PASSWORD.to_string());

        state.categories = vec![
            json!({"id_categoria": 1, "nombre": "Hamburguesas", "icono": "🍔", "activo": true, "orden_display": 1}),
            json!({"id_categoria": 2, "nombre": "Bebidas", "icono": "🥤", "activo": true, "orden_display": 2}),
            json!({"id_categoria": 3, "nombre": "Postres", "icono": "🍰", "activo": false, "orden_display": 3}),
        ];

        let products = vec![
            state.product_json(10, "Clásica", "15.90", 20, 1),
            state.product_json(11, "Doble", "22.50", 3, 1),
            state.product_json(20, "Chicha morada", "6.00", 0, 2),
            state.product_json(21, "Inca Kola", "5.00", 50, 2),
        ];
        state.products = products;
        state
    }

    fn product_json(&self, id: u64, name: &str, price: &str, stock: i64, category: u64) -> Value {
        json!({
            "id_producto": id,
            "nombre": name,
            "descripcion": format!("{name} de la casa"),
            "precio": price,
            "stock": stock,
            "activo": true,
            "categoria": self.category_ref(&json!(category)),
        })
    }

    fn category_ref(&self, id: &Value) -> Value {
        let id = id_text(id);
        self.categories
            .iter()
            .find(|c| id_text(&c["id_categoria"]) == id)
            .map_or(Value::Null, |c| {
                json!({"id_categoria": c["id_categoria"], "nombre": c["nombre"], "icono": c["icono"]})
            })
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// The user owning the request's bearer token.
    fn user_for(&self, headers: &HeaderMap) -> Option<&Value> {
        let token = headers
            .get("authorization")?
            .to_str()
            .ok()?
            .strip_prefix("Bearer token-")?;
        self.users.iter().find(|u| id_text(&u["id_usuario"]) == token)
    }

    /// Find a product by id.
    #[must_use]
    pub fn product(&self, id: &str) -> Option<&Value> {
        self.products.iter().find(|p| id_text(&p["id_producto"]) == id)
    }

    /// Find a category by id.
    #[must_use]
    pub fn category(&self, id: &str) -> Option<&Value> {
        self.categories
            .iter()
            .find(|c| id_text(&c["id_categoria"]) == id)
    }
}

/// IDs arrive as numbers from the seed and as strings from the client.
fn id_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn ok(mut body: Value) -> Reply {
    if let Some(map) = body.as_object_mut() {
        map.insert("success".to_string(), Value::Bool(true));
    }
    (StatusCode::OK, Json(body))
}

fn fail(status: StatusCode, msg: &str) -> Reply {
    (status, Json(json!({"success": false, "msg": msg})))
}

fn lock(state: &Shared) -> MutexGuard<'_, BackendState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Server
// =============================================================================

/// A running mock backend.
pub struct MockBackend {
    addr: SocketAddr,
    state: Shared,
    task: JoinHandle<()>,
}

impl MockBackend {
    /// Start the backend with the seed data.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn start() -> std::io::Result<Self> {
        let state: Shared = Arc::new(Mutex::new(BackendState::seeded()));
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let app = router(Arc::clone(&state));
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { addr, state, task })
    }

    /// Base URL of the API, including the `/api` prefix.
    #[must_use]
    pub fn api_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Client configuration pointing at this backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is rejected.
    pub fn config(&self) -> Result<ClientConfig, ConfigError> {
        ClientConfig::for_api_url(&self.api_url(), "unused-state.json")
    }

    /// An anonymous API client for this backend and fresh in-memory state.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client(&self) -> (ApiClient, LocalState) {
        let config = self.config().expect("mock config");
        let api = ApiClient::new(&config).expect("mock client");
        (api, LocalState::in_memory())
    }

    /// Client and fresh state logged in as `email`.
    ///
    /// # Panics
    ///
    /// Panics if the login is refused.
    pub async fn logged_in(&self, email: &str, password: &str) -> (ApiClient, LocalState) {
        let (api, state) = self.client();
        SessionService::new(api.clone(), state.clone())
            .login(email, &SecretString::from(password.to_string()), false)
            .await
            .expect("mock login");
        (api, state)
    }

    /// Lock the backend data for inspection or changes.
    pub fn state(&self) -> MutexGuard<'_, BackendState> {
        lock(&self.state)
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/verify", get(verify))
        .route("/api/auth/me", get(me))
        .route("/api/categories", get(list_categories).post(create_category))
        .route(
            "/api/categories/{id}",
            put(update_category).delete(delete_category),
        )
        .route("/api/products", get(list_products).post(create_product))
        .route(
            "/api/products/{id}",
            put(update_product).delete(delete_product),
        )
        .route("/api/orders", post(create_order))
        .route("/api/config/metodos-entrega", get(delivery_methods))
        .route("/api/config/metodos-pago", get(payment_methods))
        .route("/api/config/tipos-comprobante", get(receipt_types))
        .with_state(state)
}

// =============================================================================
// Auth
// =============================================================================

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    let state = lock(&state);
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    if state.passwords.get(email).map(String::as_str) != Some(password) {
        return fail(StatusCode::UNAUTHORIZED, "Credenciales inválidas");
    }
    state
        .users
        .iter()
        .find(|u| u["email"] == email)
        .map_or_else(
            || fail(StatusCode::UNAUTHORIZED, "Credenciales inválidas"),
            |u| ok(json!({"token": format!("token-{}", id_text(&u["id_usuario"]))})),
        )
}

async fn register(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    let mut state = lock(&state);
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if state.passwords.contains_key(&email) {
        return fail(StatusCode::BAD_REQUEST, "El email ya está registrado");
    }

    let id = state.next_id();
    let password = body["password"].as_str().unwrap_or_default().to_string();
    state.passwords.insert(email.clone(), password);
    state.users.push(json!({
        "id_usuario": id,
        "nombre": body["nombre"],
        "email": email,
        "telefono": body.get("telefono").cloned().unwrap_or(Value::Null),
        "direccion": body.get("direccion").cloned().unwrap_or(Value::Null),
        "rol": "cliente",
    }));
    ok(json!({"msg": "Usuario registrado"}))
}

async fn verify(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let state = lock(&state);
    match state.user_for(&headers) {
        Some(_) => ok(json!({})),
        None => fail(StatusCode::UNAUTHORIZED, "Token inválido"),
    }
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let state = lock(&state);
    match state.user_for(&headers) {
        Some(user) => ok(json!({"user": user})),
        None => fail(StatusCode::UNAUTHORIZED, "Token inválido"),
    }
}

fn require_admin(state: &BackendState, headers: &HeaderMap) -> Result<(), Reply> {
    match state.user_for(headers) {
        Some(user) if user["rol"] == "admin" => Ok(()),
        Some(_) => Err(fail(StatusCode::FORBIDDEN, "Acceso denegado")),
        None => Err(fail(StatusCode::UNAUTHORIZED, "Token inválido")),
    }
}

// =============================================================================
// Catalog
// =============================================================================

async fn list_categories(State(state): State<Shared>) -> Reply {
    let state = lock(&state);
    ok(json!({"data": state.categories}))
}

async fn create_category(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut state = lock(&state);
    if let Err(reply) = require_admin(&state, &headers) {
        return reply;
    }
    let mut category = body;
    let id = state.next_id();
    if let Some(map) = category.as_object_mut() {
        map.insert("id_categoria".to_string(), json!(id));
    }
    state.categories.push(category);
    ok(json!({"msg": "Categoría creada"}))
}

async fn update_category(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    let mut state = lock(&state);
    if let Err(reply) = require_admin(&state, &headers) {
        return reply;
    }
    let Some(category) = state
        .categories
        .iter_mut()
        .find(|c| id_text(&c["id_categoria"]) == id)
    else {
        return fail(StatusCode::NOT_FOUND, "Categoría no encontrada");
    };
    merge(category, &body);
    ok(json!({"msg": "Categoría actualizada"}))
}

async fn delete_category(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    let mut state = lock(&state);
    if let Err(reply) = require_admin(&state, &headers) {
        return reply;
    }
    let in_use = state
        .products
        .iter()
        .any(|p| id_text(&p["categoria"]["id_categoria"]) == id);
    if in_use {
        return fail(
            StatusCode::BAD_REQUEST,
            "No se puede eliminar una categoría con productos",
        );
    }
    state.categories.retain(|c| id_text(&c["id_categoria"]) != id);
    ok(json!({"msg": "Categoría eliminada"}))
}

async fn list_products(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    let state = lock(&state);
    let products: Vec<&Value> = state
        .products
        .iter()
        .filter(|p| {
            query
                .get("categoria")
                .is_none_or(|c| id_text(&p["categoria"]["id_categoria"]) == *c)
        })
        .collect();
    ok(json!({"data": products}))
}

async fn create_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut state = lock(&state);
    if let Err(reply) = require_admin(&state, &headers) {
        return reply;
    }
    let id = state.next_id();
    let mut product = json!({"id_producto": id});
    merge(&mut product, &body);
    product["categoria"] = state.category_ref(&body["id_categoria"]);
    state.products.push(product);
    ok(json!({"msg": "Producto creado"}))
}

async fn update_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    let mut state = lock(&state);
    if let Err(reply) = require_admin(&state, &headers) {
        return reply;
    }
    let category = body
        .get("id_categoria")
        .map(|c| state.category_ref(c));
    let Some(product) = state
        .products
        .iter_mut()
        .find(|p| id_text(&p["id_producto"]) == id)
    else {
        return fail(StatusCode::NOT_FOUND, "Producto no encontrado");
    };
    merge(product, &body);
    if let Some(category) = category {
        product["categoria"] = category;
    }
    ok(json!({"msg": "Producto actualizado"}))
}

async fn delete_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    let mut state = lock(&state);
    if let Err(reply) = require_admin(&state, &headers) {
        return reply;
    }
    state.products.retain(|p| id_text(&p["id_producto"]) != id);
    ok(json!({"msg": "Producto eliminado"}))
}

fn merge(target: &mut Value, patch: &Value) {
    if let (Some(target), Some(patch)) = (target.as_object_mut(), patch.as_object()) {
        let patch: &Map<String, Value> = patch;
        for (key, value) in patch {
            target.insert(key.clone(), value.clone());
        }
    }
}

// =============================================================================
// Orders and lookups
// =============================================================================

async fn create_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut state = lock(&state);
    state.order_attempts += 1;

    if state.user_for(&headers).is_none() {
        return fail(StatusCode::UNAUTHORIZED, "Token inválido");
    }
    if let Some(message) = state.order_rejection.clone() {
        return (StatusCode::OK, Json(json!({"success": false, "msg": message})));
    }

    let items = body["items"].as_array().cloned().unwrap_or_default();
    for item in &items {
        let id = id_text(&item["id_producto"]);
        let wanted = item["cantidad"].as_i64().unwrap_or_default();
        let stock = state
            .product(&id)
            .and_then(|p| p["stock"].as_i64())
            .unwrap_or_default();
        if wanted > stock {
            let name = item["nombre_producto"].as_str().unwrap_or_default();
            return (
                StatusCode::OK,
                Json(json!({"success": false, "msg": format!("Stock insuficiente para {name}")})),
            );
        }
    }
    for item in &items {
        let id = id_text(&item["id_producto"]);
        let wanted = item["cantidad"].as_i64().unwrap_or_default();
        if let Some(product) = state
            .products
            .iter_mut()
            .find(|p| id_text(&p["id_producto"]) == id)
        {
            let stock = product["stock"].as_i64().unwrap_or_default();
            product["stock"] = json!(stock - wanted);
        }
    }

    state.orders.push(body);
    let number = format!("ORD-{:05}", state.orders.len());
    ok(json!({"msg": "Pedido creado", "orden": {"numero_orden": number}}))
}

fn lookup(state: &Shared, data: Value) -> Reply {
    if lock(state).lookups_down {
        return fail(StatusCode::INTERNAL_SERVER_ERROR, "Error interno");
    }
    ok(json!({"data": data}))
}

async fn delivery_methods(State(state): State<Shared>) -> Reply {
    lookup(
        &state,
        json!([
            {"id_metodo_entrega": 1, "nombre_metodo": "delivery"},
            {"id_metodo_entrega": 2, "nombre_metodo": "recoger"},
        ]),
    )
}

async fn payment_methods(State(state): State<Shared>) -> Reply {
    lookup(
        &state,
        json!([
            {"id_metodo_pago": 1, "nombre_metodo": "tarjeta"},
            {"id_metodo_pago": 2, "nombre_metodo": "yape"},
        ]),
    )
}

async fn receipt_types(State(state): State<Shared>) -> Reply {
    lookup(
        &state,
        json!([
            {"id_comprobante": 1, "tipo_comprobante": "boleta"},
            {"id_comprobante": 2, "tipo_comprobante": "factura"},
        ]),
    )
}
