//! Three-step checkout wizard.
//!
//! ```text
//! Customer ──next──▶ Delivery ──next──▶ Payment ──submit──▶ Submitted
//!    ◀──back──────────  ◀──back──────────
//! ```
//!
//! Forward moves are gated on every required field of the current step
//! passing validation. Which fields are required depends on the form's
//! current selections.

use chrono::{Local, NaiveDate};
use serde::Serialize;
use thiserror::Error;

use super::CheckoutForm;
use crate::types::{DeliveryMethod, PaymentMethod, ReceiptType};
use crate::validation::{self, Field, ValidationFailure};

/// Number of steps before submission.
pub const STEP_COUNT: u8 = 3;

/// A wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Identity and receipt type.
    Customer,
    /// Delivery method and address.
    Delivery,
    /// Payment instrument.
    Payment,
}

impl Step {
    /// 1-based position.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Customer => 1,
            Self::Delivery => 2,
            Self::Payment => 3,
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Customer => "Customer details",
            Self::Delivery => "Delivery",
            Self::Payment => "Payment",
        }
    }

    const fn next(self) -> Option<Self> {
        match self {
            Self::Customer => Some(Self::Delivery),
            Self::Delivery => Some(Self::Payment),
            Self::Payment => None,
        }
    }

    const fn previous(self) -> Self {
        match self {
            Self::Customer | Self::Delivery => Self::Customer,
            Self::Payment => Self::Delivery,
        }
    }

    /// Fields this step requires given the form's current selections.
    #[must_use]
    pub fn required_fields(self, form: &CheckoutForm) -> Vec<Field> {
        match self {
            Self::Customer => {
                let document = match form.receipt_type {
                    ReceiptType::Boleta => Field::Dni,
                    ReceiptType::Factura => Field::Ruc,
                };
                vec![
                    Field::FirstName,
                    Field::LastName,
                    Field::Email,
                    Field::Phone,
                    document,
                ]
            }
            Self::Delivery => match form.delivery_method {
                DeliveryMethod::Delivery => vec![Field::Address, Field::Reference],
                DeliveryMethod::Pickup => Vec::new(),
            },
            Self::Payment => match form.payment_method {
                PaymentMethod::Card => vec![
                    Field::CardNumber,
                    Field::Expiry,
                    Field::CardHolder,
                    Field::Cvv,
                ],
                PaymentMethod::Yape => vec![Field::YapePhone, Field::YapeCode],
            },
        }
    }

    /// Check every required field of this step.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Incomplete`] listing each failing field.
    pub fn validate(self, form: &CheckoutForm, today: NaiveDate) -> Result<(), WizardError> {
        let failures: Vec<FieldFailure> = self
            .required_fields(form)
            .into_iter()
            .filter_map(|field| {
                validation::check(field, form.value(field), today)
                    .err()
                    .map(|failure| FieldFailure { field, failure })
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(WizardError::Incomplete {
                step: self,
                failures,
            })
        }
    }
}

/// A field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
    pub field: Field,
    pub failure: ValidationFailure,
}

/// Rejected wizard transitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WizardError {
    /// Some required field of the step is blank or malformed.
    #[error("Please complete every required field correctly.")]
    Incomplete {
        step: Step,
        failures: Vec<FieldFailure>,
    },

    /// Submission requested before reaching the payment step.
    #[error("Complete the previous steps before confirming the order.")]
    NotOnPaymentStep,

    /// The order was already placed.
    #[error("This order has already been submitted.")]
    AlreadySubmitted,
}

impl WizardError {
    /// Failing fields, empty for non-validation errors.
    #[must_use]
    pub fn failures(&self) -> &[FieldFailure] {
        match self {
            Self::Incomplete { failures, .. } => failures,
            Self::NotOnPaymentStep | Self::AlreadySubmitted => &[],
        }
    }
}

/// Progress indicator for the current step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub percent: u8,
    pub label: String,
}

/// Checkout wizard state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wizard {
    step: Step,
    submitted: bool,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            step: Step::Customer,
            submitted: false,
        }
    }

    #[must_use]
    pub const fn step(&self) -> Step {
        self.step
    }

    #[must_use]
    pub const fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Advance one step, validating against today's date.
    ///
    /// # Errors
    ///
    /// See [`Wizard::next_on`].
    pub fn next(&mut self, form: &CheckoutForm) -> Result<Step, WizardError> {
        self.next_on(form, Local::now().date_naive())
    }

    /// Advance one step if the current step is complete.
    ///
    /// On the payment step a successful check leaves the wizard where it
    /// is; submission is the only way forward from there.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Incomplete`] with the state unchanged when a
    /// required field fails, or [`WizardError::AlreadySubmitted`].
    pub fn next_on(&mut self, form: &CheckoutForm, today: NaiveDate) -> Result<Step, WizardError> {
        if self.submitted {
            return Err(WizardError::AlreadySubmitted);
        }
        self.step.validate(form, today)?;
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Ok(self.step)
    }

    /// Go back one step. Never validates.
    pub const fn back(&mut self) -> Step {
        if !self.submitted {
            self.step = self.step.previous();
        }
        self.step
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        let n = self.step.number();
        Progress {
            percent: n * 100 / STEP_COUNT,
            label: format!("Step {n} of {STEP_COUNT}"),
        }
    }

    /// Whether the order may be submitted now: on the payment step with
    /// every step's required fields valid.
    ///
    /// # Errors
    ///
    /// Returns the first reason submission is not allowed.
    pub fn ready_to_submit(&self, form: &CheckoutForm, today: NaiveDate) -> Result<(), WizardError> {
        if self.submitted {
            return Err(WizardError::AlreadySubmitted);
        }
        if self.step != Step::Payment {
            return Err(WizardError::NotOnPaymentStep);
        }
        for step in [Step::Customer, Step::Delivery, Step::Payment] {
            step.validate(form, today)?;
        }
        Ok(())
    }

    /// Record a successful submission. Called by the order service only.
    pub const fn mark_submitted(&mut self) {
        self.submitted = true;
    }
}
