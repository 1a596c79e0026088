//! Enumerations for checkout selections, roles and order state.
//!
//! Serialized names are the literal values the backend and the persisted
//! client state use, which is why they are Spanish.

use serde::{Deserialize, Serialize};

/// How an order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DeliveryMethod {
    /// Courier delivery to an address; adds the delivery fee.
    #[serde(rename = "delivery")]
    Delivery,
    /// In-store pickup.
    #[default]
    #[serde(rename = "recoger")]
    Pickup,
}

impl DeliveryMethod {
    /// Wire value of the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Delivery => "delivery",
            Self::Pickup => "recoger",
        }
    }

    /// Human label for summaries and receipts.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Delivery => "Delivery",
            Self::Pickup => "In-store pickup",
        }
    }
}

/// How an order is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    /// Credit or debit card.
    #[default]
    #[serde(rename = "tarjeta")]
    Card,
    /// Yape mobile payment (phone number + confirmation code).
    #[serde(rename = "yape")]
    Yape,
}

impl PaymentMethod {
    /// Wire value of the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Card => "tarjeta",
            Self::Yape => "yape",
        }
    }
}

/// Tax document issued for the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ReceiptType {
    /// Personal receipt, identified by DNI.
    #[default]
    #[serde(rename = "boleta")]
    Boleta,
    /// Business invoice, identified by RUC.
    #[serde(rename = "factura")]
    Factura,
}

impl ReceiptType {
    /// Wire value of the receipt type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boleta => "boleta",
            Self::Factura => "factura",
        }
    }
}

macro_rules! impl_wire_display {
    ($($ty:ty),+) => {
        $(
            impl std::fmt::Display for $ty {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )+
    };
}

impl_wire_display!(DeliveryMethod, PaymentMethod, ReceiptType);

impl std::str::FromStr for DeliveryMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delivery" => Ok(Self::Delivery),
            "recoger" | "pickup" => Ok(Self::Pickup),
            _ => Err(format!("invalid delivery method: {s}")),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tarjeta" | "card" => Ok(Self::Card),
            "yape" => Ok(Self::Yape),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

impl std::str::FromStr for ReceiptType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "boleta" => Ok(Self::Boleta),
            "factura" => Ok(Self::Factura),
            _ => Err(format!("invalid receipt type: {s}")),
        }
    }
}

/// Role of an authenticated user.
///
/// The backend only distinguishes administrators; any other role string is
/// treated as a regular customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum UserRole {
    /// Can manage the catalog; cannot place orders.
    Admin,
    /// Regular shopper.
    #[default]
    Customer,
}

impl UserRole {
    /// Wire value of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Customer => "cliente",
        }
    }
}

impl From<String> for UserRole {
    fn from(role: String) -> Self {
        if role.eq_ignore_ascii_case("admin") {
            Self::Admin
        } else {
            Self::Customer
        }
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.as_str().to_owned()
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state shown on the confirmation page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "Pendiente")]
    Pending,
    #[serde(rename = "Preparando")]
    Preparing,
    #[serde(rename = "En camino")]
    OnTheWay,
    #[serde(rename = "Entregado")]
    Delivered,
    #[serde(rename = "Cancelado")]
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pending => "Pending",
            Self::Preparing => "Preparing",
            Self::OnTheWay => "On the way",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        };
        f.write_str(label)
    }
}

/// Persisted colour theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Theme {
    #[default]
    #[serde(rename = "claro")]
    Light,
    #[serde(rename = "oscuro")]
    Dark,
}

impl Theme {
    /// Stored value of the theme.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "claro",
            Self::Dark => "oscuro",
        }
    }

    /// The other theme.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "claro" | "light" => Ok(Self::Light),
            "oscuro" | "dark" => Ok(Self::Dark),
            _ => Err(format!("invalid theme: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_method_wire_names() {
        assert_eq!(
            serde_json::to_string(&DeliveryMethod::Pickup).unwrap(),
            "\"recoger\""
        );
        let parsed: DeliveryMethod = serde_json::from_str("\"delivery\"").unwrap();
        assert_eq!(parsed, DeliveryMethod::Delivery);
    }

    #[test]
    fn test_user_role_unknown_is_customer() {
        let role: UserRole = serde_json::from_str("\"empleado\"").unwrap();
        assert_eq!(role, UserRole::Customer);
        let role: UserRole = serde_json::from_str("\"ADMIN\"").unwrap();
        assert_eq!(role, UserRole::Admin);
    }

    #[test]
    fn test_theme_toggle() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!("oscuro".parse::<Theme>().unwrap(), Theme::Dark);
    }

    #[test]
    fn test_order_status_default_is_pending() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::default()).unwrap(),
            "\"Pendiente\""
        );
    }
}
