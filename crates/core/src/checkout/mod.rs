//! Checkout: the form state, the three-step wizard and the order payload.

pub mod order;
pub mod wizard;

pub use order::{ItemLine, OrderPayload, PaymentDetails, Totals, mask_card_number};
pub use wizard::{Progress, Step, Wizard, WizardError};

use crate::types::{DeliveryMethod, PaymentMethod, ReceiptType, User};
use crate::validation::Field;

/// Every value entered across the three checkout steps.
///
/// Fields that do not apply to the current selections (RUC for a boleta,
/// the address for pickup, card fields when paying with Yape) may hold
/// anything; they are neither validated nor sent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CheckoutForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub receipt_type: ReceiptType,
    pub dni: String,
    pub ruc: String,

    pub delivery_method: DeliveryMethod,
    pub address: String,
    pub reference: String,

    pub payment_method: PaymentMethod,
    pub card_number: String,
    pub expiry: String,
    pub card_holder: String,
    pub cvv: String,
    pub yape_phone: String,
    pub yape_code: String,
}

impl CheckoutForm {
    /// Fill the customer block from a logged-in user's profile.
    ///
    /// Only blank fields are overwritten.
    pub fn prefill(&mut self, user: &User) {
        let (first, last) = user.split_name();
        fill_blank(&mut self.first_name, first);
        fill_blank(&mut self.last_name, last);
        fill_blank(&mut self.email, user.email.clone());
        if let Some(phone) = &user.phone {
            fill_blank(&mut self.phone, phone.clone());
        }
        if let Some(address) = &user.address {
            fill_blank(&mut self.address, address.clone());
        }
    }

    /// Current value of a field.
    #[must_use]
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
            Field::Dni => &self.dni,
            Field::Ruc => &self.ruc,
            Field::Address => &self.address,
            Field::Reference => &self.reference,
            Field::CardNumber => &self.card_number,
            Field::Expiry => &self.expiry,
            Field::CardHolder => &self.card_holder,
            Field::Cvv => &self.cvv,
            Field::YapePhone => &self.yape_phone,
            Field::YapeCode => &self.yape_code,
            Field::Password => "",
        }
    }

    /// Mutable access to a field, for UIs that edit by field.
    ///
    /// Returns `None` for fields that are not part of the checkout form.
    pub fn value_mut(&mut self, field: Field) -> Option<&mut String> {
        let slot = match field {
            Field::FirstName => &mut self.first_name,
            Field::LastName => &mut self.last_name,
            Field::Email => &mut self.email,
            Field::Phone => &mut self.phone,
            Field::Dni => &mut self.dni,
            Field::Ruc => &mut self.ruc,
            Field::Address => &mut self.address,
            Field::Reference => &mut self.reference,
            Field::CardNumber => &mut self.card_number,
            Field::Expiry => &mut self.expiry,
            Field::CardHolder => &mut self.card_holder,
            Field::Cvv => &mut self.cvv,
            Field::YapePhone => &mut self.yape_phone,
            Field::YapeCode => &mut self.yape_code,
            Field::Password => return None,
        };
        Some(slot)
    }
}

fn fill_blank(slot: &mut String, value: String) {
    if slot.trim().is_empty() {
        *slot = value;
    }
}
