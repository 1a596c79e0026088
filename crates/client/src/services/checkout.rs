//! Order submission and the confirmation page.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Local, Utc};
use comanda_core::cart::CartError;
use comanda_core::checkout::{CheckoutForm, OrderPayload, Totals, Wizard, WizardError};
use comanda_core::confirmation::{OrderConfirmation, Receipt};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use super::authorized;
use crate::api::{ApiClient, CheckoutLookups};
use crate::error::ApiError;
use crate::storage::{LocalState, StorageError};

/// Errors from checkout operations.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A submission is already in flight.
    #[error("Your order is already being processed.")]
    Busy,

    /// The form is incomplete or the wizard is not on the payment step.
    #[error(transparent)]
    Wizard(#[from] WizardError),

    /// Orders need a logged-in user.
    #[error("You need to log in to confirm your order.")]
    NotLoggedIn,

    /// The cart is empty.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// The backend refused the order or could not be reached.
    #[error("There was an error processing your order: {}", .0.user_message())]
    Api(#[from] ApiError),

    /// No confirmation is stored, or it expired.
    #[error("No order data found. Your session may have expired.")]
    NoOrder,

    /// The local store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

// =============================================================================
// Submit guard
// =============================================================================

/// Busy flag for the submit control.
///
/// Clones share the flag. While a [`SubmitGuard`] is alive the control is
/// busy and further [`SubmitControl::try_acquire`] calls fail.
#[derive(Debug, Clone, Default)]
pub struct SubmitControl {
    busy: Arc<AtomicBool>,
}

impl SubmitControl {
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Mark the control busy, or `None` if it already is.
    #[must_use]
    pub fn try_acquire(&self) -> Option<SubmitGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SubmitGuard {
                busy: Arc::clone(&self.busy),
            })
    }
}

/// Releases the submit control when dropped.
#[derive(Debug)]
pub struct SubmitGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for SubmitGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

// =============================================================================
// CheckoutService
// =============================================================================

/// Checkout page logic.
#[derive(Debug, Clone)]
pub struct CheckoutService {
    api: ApiClient,
    state: LocalState,
    delivery_fee: Decimal,
    control: SubmitControl,
}

impl CheckoutService {
    #[must_use]
    pub fn new(api: ApiClient, state: LocalState, delivery_fee: Decimal) -> Self {
        Self {
            api,
            state,
            delivery_fee,
            control: SubmitControl::default(),
        }
    }

    /// The submit control, for front ends that render its busy state.
    #[must_use]
    pub const fn control(&self) -> &SubmitControl {
        &self.control
    }

    #[must_use]
    pub const fn delivery_fee(&self) -> Decimal {
        self.delivery_fee
    }

    /// Delivery, payment and receipt options; defaults when unavailable.
    pub async fn lookups(&self) -> CheckoutLookups {
        self.api.checkout_lookups().await
    }

    /// Current totals for the stored cart and the form's delivery method.
    ///
    /// # Errors
    ///
    /// Returns an error if the local store fails.
    pub fn totals(&self, form: &CheckoutForm) -> Result<Totals, CheckoutError> {
        let cart = self.state.cart()?;
        Ok(Totals::for_cart(&cart, form.delivery_method, self.delivery_fee))
    }

    /// Submit the order, validating against today's date.
    ///
    /// # Errors
    ///
    /// See [`CheckoutService::submit_on`].
    pub async fn submit(
        &self,
        wizard: &mut Wizard,
        form: &CheckoutForm,
    ) -> Result<OrderConfirmation, CheckoutError> {
        self.submit_on(wizard, form, Local::now().date_naive(), Utc::now())
            .await
    }

    /// Submit the order.
    ///
    /// Preconditions are checked before any request: the submit control is
    /// free, the wizard is ready, a token is stored and the cart is not
    /// empty. Once the server accepts the order the wizard is marked
    /// submitted, the cart is cleared and the confirmation is stored. Local
    /// storage failures after that point are logged, not returned. On
    /// failure before the request completes nothing changes and the caller
    /// may retry.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Busy`] while another submission runs, a
    /// precondition error, or [`CheckoutError::Api`] carrying the server's
    /// message.
    #[instrument(skip_all)]
    pub async fn submit_on(
        &self,
        wizard: &mut Wizard,
        form: &CheckoutForm,
        today: chrono::NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<OrderConfirmation, CheckoutError> {
        let Some(_guard) = self.control.try_acquire() else {
            return Err(CheckoutError::Busy);
        };

        wizard.ready_to_submit(form, today)?;
        let api = authorized(&self.api, &self.state)?.ok_or(CheckoutError::NotLoggedIn)?;
        let cart = self.state.cart()?;
        let payload = OrderPayload::build(form, &cart, self.delivery_fee)?;

        let order_number = match api.create_order(&payload).await {
            Ok(number) => number,
            Err(e) => {
                warn!(error = %e, "Order submission failed");
                return Err(e.into());
            }
        };

        // The order exists server-side from here on
        wizard.mark_submitted();
        let confirmation = OrderConfirmation::from_payload(order_number, &payload, now);
        if let Err(e) = self.state.clear_cart() {
            error!(error = %e, order_number = %confirmation.order_number, "Could not clear the cart");
        }
        if let Err(e) = self.state.save_last_order(&confirmation) {
            error!(error = %e, order_number = %confirmation.order_number, "Could not store the confirmation");
        }

        info!(
            order_number = %confirmation.order_number,
            total = %confirmation.totals.total,
            "Order placed"
        );
        Ok(confirmation)
    }

    /// The stored confirmation, discarding it once expired.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NoOrder`] when nothing usable is stored.
    pub fn last_order(&self, now: DateTime<Utc>) -> Result<OrderConfirmation, CheckoutError> {
        let order = self
            .state
            .last_order()?
            .filter(OrderConfirmation::has_items)
            .ok_or(CheckoutError::NoOrder)?;
        if order.is_expired(now) {
            self.state.clear_last_order()?;
            return Err(CheckoutError::NoOrder);
        }
        Ok(order)
    }

    /// Plain-text receipt for the stored confirmation.
    ///
    /// # Errors
    ///
    /// See [`CheckoutService::last_order`].
    pub fn receipt(&self, now: DateTime<Utc>) -> Result<Receipt, CheckoutError> {
        Ok(Receipt::from(&self.last_order(now)?))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    #[test]
    fn test_guard_releases_on_drop() {
        let control = SubmitControl::default();
        let guard = control.try_acquire().unwrap();
        assert!(control.is_busy());
        assert!(control.clone().try_acquire().is_none());
        drop(guard);
        assert!(!control.is_busy());
        assert!(control.try_acquire().is_some());
    }

    #[tokio::test]
    async fn test_busy_control_rejects_without_request() {
        let config = ClientConfig::for_api_url("http://127.0.0.1:9/api", "/tmp/unused.json").unwrap();
        let service = CheckoutService::new(
            ApiClient::new(&config).unwrap(),
            LocalState::in_memory(),
            Decimal::new(500, 2),
        );
        let _held = service.control().try_acquire().unwrap();
        let mut wizard = Wizard::new();
        let result = service.submit(&mut wizard, &CheckoutForm::default()).await;
        assert!(matches!(result, Err(CheckoutError::Busy)));
    }

    #[tokio::test]
    async fn test_incomplete_form_fails_before_request() {
        let config = ClientConfig::for_api_url("http://127.0.0.1:9/api", "/tmp/unused.json").unwrap();
        let service = CheckoutService::new(
            ApiClient::new(&config).unwrap(),
            LocalState::in_memory(),
            Decimal::new(500, 2),
        );
        let mut wizard = Wizard::new();
        let result = service.submit(&mut wizard, &CheckoutForm::default()).await;
        assert!(matches!(
            result,
            Err(CheckoutError::Wizard(WizardError::NotOnPaymentStep))
        ));
        assert!(!service.control().is_busy());
    }

    #[test]
    fn test_last_order_missing() {
        let config = ClientConfig::for_api_url("http://127.0.0.1:9/api", "/tmp/unused.json").unwrap();
        let service = CheckoutService::new(
            ApiClient::new(&config).unwrap(),
            LocalState::in_memory(),
            Decimal::ZERO,
        );
        assert!(matches!(service.last_order(Utc::now()), Err(CheckoutError::NoOrder)));
    }
}
