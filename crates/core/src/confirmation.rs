//! Last-order confirmation.
//!
//! After a successful submission the client stores an [`OrderConfirmation`]
//! under `ultimo_pedido`. The confirmation page reads it back, shows the
//! delivery estimate and can export a plain-text [`Receipt`].

use chrono::{DateTime, Local, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::checkout::{ItemLine, OrderPayload, Totals};
use crate::types::{DeliveryMethod, OrderNumber, OrderStatus, Price, ReceiptType};

/// Snapshots older than this are discarded.
pub const SNAPSHOT_TTL_HOURS: i64 = 24;

/// Customer block of the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerBlock {
    #[serde(rename = "nombres")]
    pub first_name: String,
    #[serde(rename = "apellidos")]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "telefono", default)]
    pub phone: String,
    #[serde(rename = "comprobante", default)]
    pub receipt_type: ReceiptType,
    #[serde(default)]
    pub dni: Option<String>,
    #[serde(default)]
    pub ruc: Option<String>,
}

impl CustomerBlock {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }

    /// "DNI: ..." or "RUC: ..." depending on the receipt type.
    #[must_use]
    pub fn document_line(&self) -> String {
        match self.receipt_type {
            ReceiptType::Boleta => format!("DNI: {}", self.dni.as_deref().unwrap_or_default()),
            ReceiptType::Factura => format!("RUC: {}", self.ruc.as_deref().unwrap_or_default()),
        }
    }

    /// "Boleta (DNI: ...)" or "Factura (RUC: ...)".
    #[must_use]
    pub fn receipt_label(&self) -> String {
        let kind = match self.receipt_type {
            ReceiptType::Boleta => "Boleta",
            ReceiptType::Factura => "Factura",
        };
        format!("{kind} ({})", self.document_line())
    }
}

/// Delivery block of the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryBlock {
    #[serde(rename = "metodo", default)]
    pub method: DeliveryMethod,
    #[serde(rename = "direccion", default)]
    pub address: Option<String>,
    #[serde(rename = "referencia", default)]
    pub reference: Option<String>,
}

/// The stored last order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    #[serde(rename = "numero_orden")]
    pub order_number: OrderNumber,
    #[serde(rename = "cliente")]
    pub customer: CustomerBlock,
    #[serde(rename = "entrega")]
    pub delivery: DeliveryBlock,
    #[serde(default)]
    pub items: Vec<ItemLine>,
    #[serde(flatten)]
    pub totals: Totals,
    #[serde(rename = "fecha_pedido")]
    pub placed_at: DateTime<Utc>,
    #[serde(rename = "estado", default)]
    pub status: OrderStatus,
}

/// When and how the order arrives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryEstimate {
    pub message: String,
    pub window: &'static str,
    pub eta: DateTime<Utc>,
    pub address: Option<String>,
    pub reference: Option<String>,
}

impl OrderConfirmation {
    /// Snapshot a submitted payload.
    #[must_use]
    pub fn from_payload(
        order_number: OrderNumber,
        payload: &OrderPayload,
        placed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            order_number,
            customer: CustomerBlock {
                first_name: payload.first_name.clone(),
                last_name: payload.last_name.clone(),
                email: payload.email.clone(),
                phone: payload.phone.clone(),
                receipt_type: payload.receipt_type,
                dni: payload.dni.clone(),
                ruc: payload.ruc.clone(),
            },
            delivery: DeliveryBlock {
                method: payload.delivery_method,
                address: payload.address.clone(),
                reference: payload.reference.clone(),
            },
            items: payload.items.clone(),
            totals: payload.totals(),
            placed_at,
            status: OrderStatus::Pending,
        }
    }

    /// A snapshot with no items is treated as missing.
    #[must_use]
    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.placed_at) >= TimeDelta::hours(SNAPSHOT_TTL_HOURS)
    }

    /// Page headline.
    #[must_use]
    pub fn headline(&self) -> String {
        format!("ORDER CONFIRMED, {}!", self.customer.full_name().to_uppercase())
    }

    #[must_use]
    pub fn delivery_estimate(&self) -> DeliveryEstimate {
        let (message, window, minutes) = match self.delivery.method {
            DeliveryMethod::Delivery => (
                "Your order will arrive in about 25-40 minutes.",
                "25-40 minutes",
                40,
            ),
            DeliveryMethod::Pickup => (
                "Your order will be ready for pickup in about 15-25 minutes.",
                "15-25 minutes",
                25,
            ),
        };
        let is_delivery = self.delivery.method == DeliveryMethod::Delivery;
        DeliveryEstimate {
            message: message.to_owned(),
            window,
            eta: self.placed_at + TimeDelta::minutes(minutes),
            address: self.delivery.address.clone().filter(|_| is_delivery),
            reference: self.delivery.reference.clone().filter(|_| is_delivery),
        }
    }

    /// Countdown to the estimate, "M:SS", or a ready message once it passed.
    #[must_use]
    pub fn countdown(&self, now: DateTime<Utc>) -> String {
        let remaining = self.delivery_estimate().eta.signed_duration_since(now);
        if remaining > TimeDelta::zero() {
            let seconds = remaining.num_seconds();
            format!("Estimated time: {}:{:02}", seconds / 60, seconds % 60)
        } else {
            "Your order should be ready!".to_owned()
        }
    }

    /// Text for sharing the order.
    #[must_use]
    pub fn share_text(&self) -> String {
        format!("I just placed an order! Number: {}", self.order_number)
    }
}

/// Plain-text receipt ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub file_name: String,
    pub text: String,
}

impl From<&OrderConfirmation> for Receipt {
    fn from(order: &OrderConfirmation) -> Self {
        let money = |amount| Price::soles(amount).display();
        let or_unset = |s: &str| {
            if s.trim().is_empty() {
                "Not provided".to_owned()
            } else {
                s.to_owned()
            }
        };
        let placed = order
            .placed_at
            .with_timezone(&Local)
            .format("%d/%m/%Y %H:%M");

        let mut lines = vec![
            "ORDER RECEIPT".to_owned(),
            "=============".to_owned(),
            String::new(),
            format!("Order number: {}", order.order_number),
            format!("Date: {placed}"),
            format!("Status: {}", order.status),
            String::new(),
            "CUSTOMER".to_owned(),
            "--------".to_owned(),
            format!("Name: {}", order.customer.full_name()),
            format!("Email: {}", or_unset(&order.customer.email)),
            format!("Phone: {}", or_unset(&order.customer.phone)),
            format!("Document: {}", order.customer.document_line()),
            String::new(),
            "ITEMS".to_owned(),
            "-----".to_owned(),
        ];
        lines.extend(order.items.iter().map(|item| {
            format!("{} x{} - {}", item.name, item.quantity, money(item.subtotal))
        }));
        lines.extend([
            String::new(),
            "TOTALS".to_owned(),
            "------".to_owned(),
            format!("Subtotal: {}", money(order.totals.subtotal)),
            format!("Delivery: {}", money(order.totals.delivery_cost)),
            format!("Total: {}", money(order.totals.total)),
            String::new(),
            "DELIVERY".to_owned(),
            "--------".to_owned(),
            format!("Method: {}", order.delivery.method.label()),
        ]);
        if let Some(address) = order.delivery.address.as_deref().filter(|a| !a.is_empty()) {
            lines.push(format!("Address: {address}"));
        }
        if let Some(reference) = order.delivery.reference.as_deref().filter(|r| !r.is_empty()) {
            lines.push(format!("Reference: {reference}"));
        }
        lines.extend([String::new(), "Thank you for your order!".to_owned()]);

        Self {
            file_name: format!("receipt-{}.txt", order.order_number),
            text: lines.join("\n"),
        }
    }
}
