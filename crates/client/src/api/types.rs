//! Wire types for the backend REST API and their domain conversions.
//!
//! Field names follow the backend. Optional fields default rather than
//! fail, since older rows are known to omit them.

use comanda_core::catalog::{Category, CategoryDraft, CategoryRef, Product, ProductDraft};
use comanda_core::types::{CategoryId, OrderNumber, ProductId, User};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

comanda_core::define_id!(LookupId);

// =============================================================================
// Envelope
// =============================================================================

/// `{success, msg?, ...}` wrapper every endpoint answers with.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub body: T,
}

impl<T> Envelope<T> {
    pub fn message(&self) -> Option<String> {
        self.msg.clone().or_else(|| self.error.clone())
    }
}

/// Message-only envelope, used to read errors from non-2xx bodies.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Empty {}

#[derive(Debug, Deserialize)]
pub(crate) struct DataBody<T> {
    pub data: Option<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenBody {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserBody {
    pub user: Option<User>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrderBody {
    pub orden: Option<OrderRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrderRef {
    pub numero_orden: OrderNumber,
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CategoryWire {
    pub id_categoria: CategoryId,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub icono: Option<String>,
    #[serde(default)]
    pub descripcion: Option<String>,
    #[serde(default = "default_active")]
    pub activo: bool,
    #[serde(default)]
    pub orden_display: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CategoryRefWire {
    pub id_categoria: CategoryId,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub icono: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ProductWire {
    pub id_producto: ProductId,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    pub precio: Decimal,
    #[serde(default)]
    pub imagen: Option<String>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default = "default_active")]
    pub activo: bool,
    #[serde(default)]
    pub categoria: Option<CategoryRefWire>,
    #[serde(default)]
    pub id_categoria: Option<CategoryId>,
}

const fn default_active() -> bool {
    true
}

impl From<CategoryWire> for Category {
    fn from(wire: CategoryWire) -> Self {
        Self {
            id: wire.id_categoria,
            name: wire.nombre,
            icon: wire.icono.unwrap_or_default(),
            description: wire.descripcion.unwrap_or_default(),
            active: wire.activo,
            display_order: wire.orden_display.unwrap_or_default(),
        }
    }
}

impl From<ProductWire> for Product {
    fn from(wire: ProductWire) -> Self {
        let category = match (wire.categoria, wire.id_categoria) {
            (Some(c), _) => CategoryRef {
                id: c.id_categoria,
                name: c.nombre,
                icon: c.icono.unwrap_or_default(),
            },
            (None, id) => CategoryRef {
                id: id.unwrap_or_else(|| CategoryId::new("")),
                name: String::new(),
                icon: String::new(),
            },
        };

        Self {
            id: wire.id_producto,
            name: wire.nombre,
            description: wire.descripcion.unwrap_or_default(),
            price: wire.precio,
            image: wire.imagen.filter(|i| !i.is_empty()),
            // Negative stock is treated as sold out.
            stock: u32::try_from(wire.stock.max(0)).unwrap_or(u32::MAX),
            active: wire.activo,
            category,
        }
    }
}

/// Body of `POST /products` and `PUT /products/{id}`.
#[derive(Debug, Serialize)]
pub(crate) struct ProductBody<'a> {
    pub nombre: &'a str,
    pub descripcion: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    pub precio: Decimal,
    pub imagen: &'a str,
    pub id_categoria: Option<&'a CategoryId>,
    pub stock: u32,
    pub activo: bool,
}

impl<'a> From<&'a ProductDraft> for ProductBody<'a> {
    fn from(draft: &'a ProductDraft) -> Self {
        Self {
            nombre: draft.name.trim(),
            descripcion: draft.description.trim(),
            precio: draft.price.unwrap_or_default(),
            imagen: draft.image.trim(),
            id_categoria: draft.category_id.as_ref(),
            stock: draft.stock,
            activo: draft.active,
        }
    }
}

/// Body of `POST /categories` and `PUT /categories/{id}`.
#[derive(Debug, Serialize)]
pub(crate) struct CategoryBody<'a> {
    pub nombre: &'a str,
    pub icono: &'a str,
    pub descripcion: &'a str,
    pub orden_display: i32,
    pub activo: bool,
}

impl<'a> From<&'a CategoryDraft> for CategoryBody<'a> {
    fn from(draft: &'a CategoryDraft) -> Self {
        Self {
            nombre: draft.name.trim(),
            icono: draft.icon.trim(),
            descripcion: draft.description.trim(),
            orden_display: draft.display_order,
            activo: draft.active,
        }
    }
}

/// Body of an activate/deactivate toggle.
#[derive(Debug, Serialize)]
pub(crate) struct ActiveBody {
    pub activo: bool,
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct LoginBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Registration data sent to `POST /auth/register`.
#[derive(Debug, Serialize)]
pub struct Registration {
    #[serde(rename = "nombre")]
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: secrecy::SecretString,
    #[serde(rename = "telefono", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "direccion", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterBody<'a> {
    #[serde(flatten)]
    pub registration: &'a Registration,
    pub password: &'a str,
}

// =============================================================================
// Checkout lookups
// =============================================================================

/// One option of a checkout lookup list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupOption {
    #[serde(alias = "id_metodo_entrega", alias = "id_metodo_pago", alias = "id_comprobante")]
    pub id: LookupId,
    #[serde(alias = "nombre_metodo", alias = "tipo_comprobante")]
    pub name: String,
}

impl LookupOption {
    fn pair(value: &str) -> Self {
        Self {
            id: LookupId::new(value),
            name: value.to_string(),
        }
    }
}

/// The three checkout lookup lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    DeliveryMethods,
    PaymentMethods,
    ReceiptTypes,
}

impl LookupKind {
    pub(crate) const fn path(self) -> &'static str {
        match self {
            Self::DeliveryMethods => "config/metodos-entrega",
            Self::PaymentMethods => "config/metodos-pago",
            Self::ReceiptTypes => "config/tipos-comprobante",
        }
    }

    /// Options used when the backend cannot provide the list.
    #[must_use]
    pub fn defaults(self) -> Vec<LookupOption> {
        let values: &[&str] = match self {
            Self::DeliveryMethods => &["delivery", "recoger"],
            Self::PaymentMethods => &["tarjeta", "yape"],
            Self::ReceiptTypes => &["boleta", "factura"],
        };
        values.iter().map(|v| LookupOption::pair(v)).collect()
    }
}

/// Where a lookup list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupSource {
    Backend,
    /// At least one list could not be fetched and uses its defaults.
    Fallback,
}

/// Options shown on the checkout form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLookups {
    pub delivery_methods: Vec<LookupOption>,
    pub payment_methods: Vec<LookupOption>,
    pub receipt_types: Vec<LookupOption>,
    pub source: LookupSource,
}
