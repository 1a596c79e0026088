//! Authenticated user profile.

use serde::{Deserialize, Serialize};

use super::{UserId, UserRole};

/// A user as returned by `/auth/me` and stored under the `user` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "id_usuario")]
    pub id: UserId,
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "telefono", default)]
    pub phone: Option<String>,
    #[serde(rename = "direccion", default)]
    pub address: Option<String>,
    #[serde(rename = "rol", default)]
    pub role: UserRole,
    #[serde(rename = "fecha_creacion", default)]
    pub created_at: Option<String>,
}

/// Where a user lands after logging in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    AdminPanel,
    Home,
}

impl User {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }

    #[must_use]
    pub const fn landing(&self) -> Landing {
        if self.is_admin() {
            Landing::AdminPanel
        } else {
            Landing::Home
        }
    }

    /// First word of the name and the remainder, for the checkout form.
    #[must_use]
    pub fn split_name(&self) -> (String, String) {
        let mut words = self.name.split_whitespace();
        let first = words.next().unwrap_or_default().to_owned();
        let rest = words.collect::<Vec<_>>().join(" ");
        (first, rest)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_me_payload() {
        let json = r#"{"id_usuario": 3, "nombre": "Ana María Torres",
            "email": "ana@example.com", "telefono": null, "rol": "admin"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id.as_str(), "3");
        assert!(user.is_admin());
        assert_eq!(user.landing(), Landing::AdminPanel);
        assert!(user.phone.is_none());
    }

    #[test]
    fn test_split_name() {
        let json = r#"{"id_usuario": "u1", "nombre": "Ana María Torres"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(
            user.split_name(),
            ("Ana".to_owned(), "María Torres".to_owned())
        );
        assert_eq!(user.landing(), Landing::Home);
    }
}
