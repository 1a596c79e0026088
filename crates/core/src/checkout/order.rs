//! Order payload assembly.
//!
//! [`OrderPayload`] is built once from the validated form and the cart and
//! is never modified afterwards. Amounts go over the wire as JSON numbers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::CheckoutForm;
use crate::cart::{Cart, CartError, CartItem};
use crate::types::{DeliveryMethod, PaymentMethod, ProductId, ReceiptType, round_money};
use crate::validation::digits_only;

/// Order amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(rename = "deliveryCost", with = "rust_decimal::serde::float")]
    pub delivery_cost: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

impl Totals {
    /// `total = subtotal + delivery_cost`; the fee only applies to delivery.
    #[must_use]
    pub fn compute(subtotal: Decimal, method: DeliveryMethod, delivery_fee: Decimal) -> Self {
        let subtotal = round_money(subtotal);
        let delivery_cost = match method {
            DeliveryMethod::Delivery => round_money(delivery_fee),
            DeliveryMethod::Pickup => Decimal::ZERO,
        };
        Self {
            subtotal,
            delivery_cost,
            total: subtotal + delivery_cost,
        }
    }

    /// Totals for a cart.
    #[must_use]
    pub fn for_cart(cart: &Cart, method: DeliveryMethod, delivery_fee: Decimal) -> Self {
        Self::compute(cart.total(), method, delivery_fee)
    }
}

/// Mask a card number down to its last four digits.
#[must_use]
pub fn mask_card_number(card_number: &str) -> String {
    let digits = digits_only(card_number, usize::MAX);
    let last_four = digits
        .char_indices()
        .rev()
        .nth(3)
        .and_then(|(i, _)| digits.get(i..))
        .unwrap_or(&digits);
    format!("**** **** **** {last_four}")
}

/// Payment instrument details. The CVV is never part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaymentDetails {
    Card {
        #[serde(rename = "numero_tarjeta_masked")]
        masked_number: String,
        #[serde(rename = "fecha_vencimiento")]
        expiry: String,
        #[serde(rename = "titular")]
        holder: String,
    },
    Yape {
        #[serde(rename = "yape_numero")]
        phone: String,
        #[serde(rename = "codigo_confirmacion")]
        confirmation_code: String,
    },
}

/// One ordered product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemLine {
    #[serde(rename = "id_producto")]
    pub product_id: ProductId,
    #[serde(rename = "nombre_producto")]
    pub name: String,
    #[serde(rename = "cantidad")]
    pub quantity: u32,
    #[serde(rename = "precio_unitario", with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
}

impl From<&CartItem> for ItemLine {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            name: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            subtotal: item.line_total(),
        }
    }
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderPayload {
    #[serde(rename = "cliente_nombres")]
    pub first_name: String,
    #[serde(rename = "cliente_apellidos")]
    pub last_name: String,
    #[serde(rename = "cliente_email")]
    pub email: String,
    #[serde(rename = "cliente_telefono")]
    pub phone: String,
    #[serde(rename = "cliente_dni")]
    pub dni: Option<String>,
    #[serde(rename = "cliente_ruc")]
    pub ruc: Option<String>,
    #[serde(rename = "tipo_comprobante")]
    pub receipt_type: ReceiptType,

    #[serde(rename = "metodo_entrega")]
    pub delivery_method: DeliveryMethod,
    #[serde(rename = "entrega_direccion")]
    pub address: Option<String>,
    #[serde(rename = "entrega_referencia")]
    pub reference: Option<String>,

    #[serde(rename = "metodo_pago")]
    pub payment_method: PaymentMethod,
    #[serde(rename = "pago_detalles")]
    pub payment: PaymentDetails,

    pub items: Vec<ItemLine>,

    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(rename = "costo_delivery", with = "rust_decimal::serde::float")]
    pub delivery_cost: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

impl OrderPayload {
    /// Snapshot the form and cart into a payload.
    ///
    /// Only the fields that apply to the form's selections are carried;
    /// the others are sent as `null`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Empty`] when there is nothing to order.
    pub fn build(form: &CheckoutForm, cart: &Cart, delivery_fee: Decimal) -> Result<Self, CartError> {
        if cart.is_empty() {
            return Err(CartError::Empty);
        }

        let text = |s: &str| s.trim().to_owned();
        let is_boleta = form.receipt_type == ReceiptType::Boleta;
        let is_delivery = form.delivery_method == DeliveryMethod::Delivery;

        let payment = match form.payment_method {
            PaymentMethod::Card => PaymentDetails::Card {
                masked_number: mask_card_number(&form.card_number),
                expiry: text(&form.expiry),
                holder: text(&form.card_holder),
            },
            PaymentMethod::Yape => PaymentDetails::Yape {
                phone: text(&form.yape_phone),
                confirmation_code: text(&form.yape_code),
            },
        };

        let totals = Totals::for_cart(cart, form.delivery_method, delivery_fee);

        Ok(Self {
            first_name: text(&form.first_name),
            last_name: text(&form.last_name),
            email: text(&form.email),
            phone: text(&form.phone),
            dni: is_boleta.then(|| text(&form.dni)),
            ruc: (!is_boleta).then(|| text(&form.ruc)),
            receipt_type: form.receipt_type,
            delivery_method: form.delivery_method,
            address: is_delivery.then(|| text(&form.address)),
            reference: is_delivery.then(|| text(&form.reference)),
            payment_method: form.payment_method,
            payment,
            items: cart.items().iter().map(ItemLine::from).collect(),
            subtotal: totals.subtotal,
            delivery_cost: totals.delivery_cost,
            total: totals.total,
        })
    }

    #[must_use]
    pub const fn totals(&self) -> Totals {
        Totals {
            subtotal: self.subtotal,
            delivery_cost: self.delivery_cost,
            total: self.total,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::product;

    fn fee() -> Decimal {
        Decimal::new(500, 2)
    }

    fn cart_of_two() -> Cart {
        let mut cart = Cart::new();
        cart.add(&product("p1", "1", 10, 5), 2).unwrap();
        cart
    }

    #[test]
    fn test_pickup_has_no_delivery_cost() {
        let totals = Totals::for_cart(&cart_of_two(), DeliveryMethod::Pickup, fee());
        assert_eq!(totals.subtotal, Decimal::new(2000, 2));
        assert_eq!(totals.delivery_cost, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::new(2000, 2));
    }

    #[test]
    fn test_delivery_adds_fee() {
        let totals = Totals::for_cart(&cart_of_two(), DeliveryMethod::Delivery, fee());
        assert_eq!(totals.delivery_cost, fee());
        assert_eq!(totals.total, totals.subtotal + totals.delivery_cost);
        assert_eq!(totals.total, Decimal::new(2500, 2));
    }

    #[test]
    fn test_mask_card_number() {
        assert_eq!(mask_card_number("4111 1111 1111 1234"), "**** **** **** 1234");
        assert_eq!(mask_card_number("12"), "**** **** **** 12");
    }

    #[test]
    fn test_payload_wire_shape() {
        let form = CheckoutForm {
            first_name: " Ana ".to_owned(),
            last_name: "Torres".to_owned(),
            email: "ana@example.com".to_owned(),
            phone: "987654321".to_owned(),
            dni: "12345678".to_owned(),
            ruc: "20123456789".to_owned(),
            address: "Av. Siempre Viva 742".to_owned(),
            card_number: "4111111111111234".to_owned(),
            expiry: "12/30".to_owned(),
            card_holder: "ANA TORRES".to_owned(),
            cvv: "999".to_owned(),
            ..CheckoutForm::default()
        };
        let payload = OrderPayload::build(&form, &cart_of_two(), fee()).unwrap();
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["cliente_nombres"], "Ana");
        assert_eq!(json["cliente_dni"], "12345678");
        assert!(json["cliente_ruc"].is_null());
        assert_eq!(json["metodo_entrega"], "recoger");
        assert!(json["entrega_direccion"].is_null());
        assert_eq!(json["metodo_pago"], "tarjeta");
        assert_eq!(
            json["pago_detalles"],
            serde_json::json!({
                "numero_tarjeta_masked": "**** **** **** 1234",
                "fecha_vencimiento": "12/30",
                "titular": "ANA TORRES"
            })
        );
        assert!(!json.to_string().contains("999"));
        assert_eq!(json["items"][0]["subtotal"], 20.0);
        assert_eq!(json["total"], 20.0);
        assert_eq!(json["costo_delivery"], 0.0);
    }

    #[test]
    fn test_payload_yape_delivery_factura() {
        let form = CheckoutForm {
            receipt_type: ReceiptType::Factura,
            ruc: "20123456789".to_owned(),
            delivery_method: DeliveryMethod::Delivery,
            address: "Jr. Lima 100".to_owned(),
            reference: "Near the park".to_owned(),
            payment_method: PaymentMethod::Yape,
            yape_phone: "912345678".to_owned(),
            yape_code: "654321".to_owned(),
            ..CheckoutForm::default()
        };
        let payload = OrderPayload::build(&form, &cart_of_two(), fee()).unwrap();
        assert!(payload.dni.is_none());
        assert_eq!(payload.ruc.as_deref(), Some("20123456789"));
        assert_eq!(payload.reference.as_deref(), Some("Near the park"));
        assert_eq!(
            payload.payment,
            PaymentDetails::Yape {
                phone: "912345678".to_owned(),
                confirmation_code: "654321".to_owned()
            }
        );
        assert_eq!(payload.total, Decimal::new(2500, 2));
    }

    #[test]
    fn test_empty_cart_is_rejected() {
        assert_eq!(
            OrderPayload::build(&CheckoutForm::default(), &Cart::new(), fee()),
            Err(CartError::Empty)
        );
    }
}
