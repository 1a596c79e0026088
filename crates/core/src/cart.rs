//! Shopping cart.
//!
//! The cart is a list of lines keyed by product. It serializes as a flat
//! JSON array stored under the `carrito` key.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Product;
use crate::types::{ProductId, round_money};

/// Errors from cart mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The product is inactive or has no stock.
    #[error("This product is not available right now.")]
    Unavailable,

    /// The requested quantity would exceed the product's stock.
    #[error("Only {available} units of {name} are available.")]
    StockExceeded { name: String, available: u32 },

    /// Quantities start at one.
    #[error("Quantity must be at least 1")]
    ZeroQuantity,

    /// No line for the given product.
    #[error("Product {0} is not in the cart")]
    NotInCart(ProductId),

    /// Nothing to order.
    #[error("Your cart is empty.")]
    Empty,

    /// Administrators browse the menu but cannot order.
    #[error("Administrator mode: products cannot be added to the cart.")]
    AdministratorMode,
}

/// One cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(rename = "_id")]
    pub product_id: ProductId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(
        rename = "precio",
        serialize_with = "rust_decimal::serde::float::serialize"
    )]
    pub unit_price: Decimal,
    #[serde(rename = "cantidad")]
    pub quantity: u32,
    #[serde(rename = "stock_disponible")]
    pub available_stock: u32,
    #[serde(rename = "imagen", default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl CartItem {
    /// `quantity × unit_price`, rounded to cents.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        round_money(self.unit_price * Decimal::from(self.quantity))
    }
}

/// The shopper's cart.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add `quantity` units of `product`.
    ///
    /// Increments the existing line when the product is already in the
    /// cart. The stored stock is refreshed from `product` on every add.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Unavailable`] for inactive or out-of-stock
    /// products and [`CartError::StockExceeded`] when the resulting
    /// quantity would exceed the product's stock.
    pub fn add(&mut self, product: &Product, quantity: u32) -> Result<&CartItem, CartError> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }
        if !product.is_available() {
            return Err(CartError::Unavailable);
        }

        let exceeded = || CartError::StockExceeded {
            name: product.name.clone(),
            available: product.stock,
        };

        let index = match self.items.iter().position(|i| i.product_id == product.id) {
            Some(index) => {
                let line = self.items.get_mut(index).ok_or_else(exceeded)?;
                let wanted = line.quantity.checked_add(quantity).ok_or_else(exceeded)?;
                if wanted > product.stock {
                    return Err(exceeded());
                }
                line.quantity = wanted;
                line.available_stock = product.stock;
                line.unit_price = product.price;
                index
            }
            None => {
                if quantity > product.stock {
                    return Err(exceeded());
                }
                self.items.push(CartItem {
                    product_id: product.id.clone(),
                    name: product.name.clone(),
                    unit_price: product.price,
                    quantity,
                    available_stock: product.stock,
                    image: product.image.clone(),
                });
                self.items.len() - 1
            }
        };

        self.items.get(index).ok_or_else(exceeded)
    }

    /// Remove a product's line, returning it if present.
    pub fn remove(&mut self, product_id: &ProductId) -> Option<CartItem> {
        let index = self.items.iter().position(|i| &i.product_id == product_id)?;
        Some(self.items.remove(index))
    }

    /// Set a line's quantity. Zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] for unknown products and
    /// [`CartError::StockExceeded`] above the stored stock.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return self
                .remove(product_id)
                .map(|_| ())
                .ok_or_else(|| CartError::NotInCart(product_id.clone()));
        }

        let line = self
            .items
            .iter_mut()
            .find(|i| &i.product_id == product_id)
            .ok_or_else(|| CartError::NotInCart(product_id.clone()))?;
        if quantity > line.available_stock {
            return Err(CartError::StockExceeded {
                name: line.name.clone(),
                available: line.available_stock,
            });
        }
        line.quantity = quantity;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Σ quantity × unit price, rounded to cents.
    #[must_use]
    pub fn total(&self) -> Decimal {
        round_money(self.items.iter().map(CartItem::line_total).sum())
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.product_id == product_id)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<Vec<CartItem>> for Cart {
    fn from(items: Vec<CartItem>) -> Self {
        Self { items }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::product;

    #[test]
    fn test_add_increments_existing_line() {
        let mut cart = Cart::new();
        let burger = product("p1", "1", 10, 5);
        cart.add(&burger, 1).unwrap();
        let line = cart.add(&burger, 2).unwrap();
        assert_eq!(line.quantity, 3);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_add_never_exceeds_stock() {
        let mut cart = Cart::new();
        let burger = product("p1", "1", 10, 2);
        cart.add(&burger, 2).unwrap();
        let err = cart.add(&burger, 1).unwrap_err();
        assert_eq!(
            err,
            CartError::StockExceeded {
                name: "Product p1".to_owned(),
                available: 2
            }
        );
        assert_eq!(cart.get(&burger.id).unwrap().quantity, 2);

        let mut fresh = Cart::new();
        assert!(fresh.add(&burger, 3).is_err());
        assert!(fresh.is_empty());
    }

    #[test]
    fn test_add_rejects_unavailable() {
        let mut cart = Cart::new();
        assert_eq!(
            cart.add(&product("p1", "1", 10, 0), 1).unwrap_err(),
            CartError::Unavailable
        );
        let mut inactive = product("p2", "1", 10, 4);
        inactive.active = false;
        assert_eq!(cart.add(&inactive, 1).unwrap_err(), CartError::Unavailable);
        assert_eq!(
            cart.add(&product("p3", "1", 10, 4), 0).unwrap_err(),
            CartError::ZeroQuantity
        );
    }

    #[test]
    fn test_total() {
        let mut cart = Cart::new();
        let mut fries = product("p2", "1", 0, 10);
        fries.price = Decimal::new(450, 2);
        cart.add(&product("p1", "1", 10, 5), 2).unwrap();
        cart.add(&fries, 3).unwrap();
        assert_eq!(cart.total(), Decimal::new(3350, 2));
    }

    #[test]
    fn test_set_quantity_and_remove() {
        let mut cart = Cart::new();
        let burger = product("p1", "1", 10, 5);
        cart.add(&burger, 1).unwrap();

        cart.set_quantity(&burger.id, 4).unwrap();
        assert_eq!(cart.item_count(), 4);
        assert!(cart.set_quantity(&burger.id, 6).is_err());

        cart.set_quantity(&burger.id, 0).unwrap();
        assert!(cart.is_empty());
        assert_eq!(
            cart.set_quantity(&burger.id, 1).unwrap_err(),
            CartError::NotInCart(burger.id.clone())
        );
        assert!(cart.remove(&burger.id).is_none());
    }

    #[test]
    fn test_serializes_as_flat_list() {
        let mut cart = Cart::new();
        cart.add(&product("p1", "1", 10, 5), 2).unwrap();
        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "_id": "p1",
                "nombre": "Product p1",
                "precio": 10.0,
                "cantidad": 2,
                "stock_disponible": 5
            }])
        );
    }

    #[test]
    fn test_reads_stored_cart() {
        let stored = r#"[{"_id": 7, "nombre": "Classic", "precio": 12.5,
            "imagen": "classic.png", "cantidad": 1, "stock_disponible": 3}]"#;
        let cart: Cart = serde_json::from_str(stored).unwrap();
        let line = cart.get(&ProductId::from(7)).unwrap();
        assert_eq!(line.unit_price, Decimal::new(125, 1));
        assert_eq!(line.image.as_deref(), Some("classic.png"));
    }
}
