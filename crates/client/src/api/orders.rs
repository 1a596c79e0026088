//! Order endpoint.

use comanda_core::checkout::OrderPayload;
use comanda_core::types::OrderNumber;
use reqwest::Method;
use tracing::instrument;

use super::ApiClient;
use super::types::OrderBody;
use crate::error::ApiError;

impl ApiClient {
    /// Place an order and return its number.
    ///
    /// Never retried: a second call would place a second order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] with the server's message when the
    /// order is refused, or another variant if the request fails.
    #[instrument(skip(self, payload), fields(items = payload.items.len(), total = %payload.total))]
    pub async fn create_order(&self, payload: &OrderPayload) -> Result<OrderNumber, ApiError> {
        let request = self.request(Method::POST, "orders")?.json(payload);
        let OrderBody { orden } = self.send(request, "POST orders").await?;
        orden.map(|o| o.numero_orden).ok_or_else(|| ApiError::Decode {
            context: "POST orders",
            detail: "response has no order number".to_string(),
        })
    }
}
