//! Checkout configuration lookups.
//!
//! The checkout form works without these lists: when one cannot be fetched
//! its defaults are used and the result is marked [`LookupSource::Fallback`].

use reqwest::Method;
use tracing::{debug, instrument, warn};

use super::ApiClient;
use super::types::{CheckoutLookups, DataBody, LookupKind, LookupOption, LookupSource};
use crate::error::ApiError;

impl ApiClient {
    /// Fetch delivery methods, payment methods and receipt types.
    ///
    /// The three lists are requested concurrently. Successful lists are
    /// cached for the configured TTL; fallbacks are not.
    #[instrument(skip(self))]
    pub async fn checkout_lookups(&self) -> CheckoutLookups {
        let (delivery, payment, receipt) = tokio::join!(
            self.lookup(LookupKind::DeliveryMethods),
            self.lookup(LookupKind::PaymentMethods),
            self.lookup(LookupKind::ReceiptTypes),
        );

        let mut source = LookupSource::Backend;
        let mut resolve = |kind: LookupKind, result: Result<Vec<LookupOption>, ApiError>| {
            result.unwrap_or_else(|e| {
                warn!(?kind, error = %e, "Using default checkout lookup");
                source = LookupSource::Fallback;
                kind.defaults()
            })
        };

        let delivery_methods = resolve(LookupKind::DeliveryMethods, delivery);
        let payment_methods = resolve(LookupKind::PaymentMethods, payment);
        let receipt_types = resolve(LookupKind::ReceiptTypes, receipt);

        CheckoutLookups {
            delivery_methods,
            payment_methods,
            receipt_types,
            source,
        }
    }

    /// Fetch one lookup list, from cache when possible.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the list is empty.
    pub async fn lookup(&self, kind: LookupKind) -> Result<Vec<LookupOption>, ApiError> {
        if let Some(options) = self.inner.lookups.get(&kind).await {
            debug!(?kind, "Cache hit for lookup");
            return Ok(options);
        }

        let request = self.request(Method::GET, kind.path())?;
        let DataBody { data } = self
            .send::<DataBody<Vec<LookupOption>>>(request, "GET config lookup")
            .await?;
        let options = data.filter(|d| !d.is_empty()).ok_or_else(|| ApiError::Decode {
            context: "GET config lookup",
            detail: "empty list".to_string(),
        })?;

        self.inner.lookups.insert(kind, options.clone()).await;
        Ok(options)
    }
}
