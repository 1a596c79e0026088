//! Menu browsing and the cart.

use comanda_core::cart::{Cart, CartError};
use comanda_core::catalog::{CategoryFilter, MenuView, Product, ProductDetail};
use comanda_core::notice::{MENU_NOTICE_DURATION, Notice};
use comanda_core::types::ProductId;
use thiserror::Error;
use tracing::{debug, instrument};

use super::authorized;
use crate::api::ApiClient;
use crate::error::ApiError;
use crate::storage::{LocalState, StorageError};

/// Errors from menu and cart operations.
#[derive(Debug, Error)]
pub enum MenuError {
    /// The product id does not exist in the catalog.
    #[error("Product {0} was not found.")]
    ProductNotFound(ProductId),

    /// The cart refused the change.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// The backend refused or failed the request.
    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),

    /// The local store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Menu page logic.
#[derive(Debug, Clone)]
pub struct MenuService {
    api: ApiClient,
    state: LocalState,
}

impl MenuService {
    #[must_use]
    pub const fn new(api: ApiClient, state: LocalState) -> Self {
        Self { api, state }
    }

    fn client(&self) -> Result<ApiClient, StorageError> {
        Ok(authorized(&self.api, &self.state)?.unwrap_or_else(|| self.api.clone()))
    }

    /// Load categories and the filtered products, concurrently.
    ///
    /// # Errors
    ///
    /// Returns an error if either request fails.
    #[instrument(skip(self))]
    pub async fn load(&self, filter: &CategoryFilter) -> Result<MenuView, MenuError> {
        let api = self.client()?;
        let (categories, products) =
            tokio::try_join!(api.list_categories(), api.list_products(filter))?;
        debug!(
            categories = categories.len(),
            products = products.len(),
            "Loaded menu"
        );
        Ok(MenuView::build(&categories, &products, filter))
    }

    /// Find one product in the full catalog.
    ///
    /// # Errors
    ///
    /// Returns [`MenuError::ProductNotFound`] or the request error.
    #[instrument(skip(self))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, MenuError> {
        self.client()?
            .list_products(&CategoryFilter::All)
            .await?
            .into_iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| MenuError::ProductNotFound(id.clone()))
    }

    /// Product detail view.
    ///
    /// # Errors
    ///
    /// See [`MenuService::product`].
    pub async fn detail(&self, id: &ProductId) -> Result<ProductDetail, MenuError> {
        Ok(ProductDetail::from(&self.product(id).await?))
    }

    /// Add a product to the cart.
    ///
    /// Logged-in administrators cannot add to the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError`] for administrators, unavailable products and
    /// stock overruns, or the lookup error.
    #[instrument(skip(self))]
    pub async fn add_to_cart(&self, id: &ProductId, quantity: u32) -> Result<Notice, MenuError> {
        if self.is_admin()? {
            return Err(CartError::AdministratorMode.into());
        }

        let product = self.product(id).await?;
        let mut cart = self.state.cart()?;
        cart.add(&product, quantity)?;
        self.state.save_cart(&cart)?;

        Ok(Notice::success(format!("✅ {} added to the cart", product.name))
            .lasting(MENU_NOTICE_DURATION))
    }

    fn is_admin(&self) -> Result<bool, StorageError> {
        if self.state.token()?.is_none() {
            return Ok(false);
        }
        Ok(self.state.user()?.is_some_and(|u| u.is_admin()))
    }

    /// # Errors
    ///
    /// Returns an error if the local store fails.
    pub fn cart(&self) -> Result<Cart, MenuError> {
        Ok(self.state.cart()?)
    }

    /// Change a line's quantity; zero removes it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError`] for unknown lines or stock overruns.
    pub fn set_quantity(&self, id: &ProductId, quantity: u32) -> Result<Cart, MenuError> {
        let mut cart = self.state.cart()?;
        cart.set_quantity(id, quantity)?;
        self.state.save_cart(&cart)?;
        Ok(cart)
    }

    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] for unknown lines.
    pub fn remove(&self, id: &ProductId) -> Result<Cart, MenuError> {
        let mut cart = self.state.cart()?;
        cart.remove(id)
            .ok_or_else(|| CartError::NotInCart(id.clone()))?;
        self.state.save_cart(&cart)?;
        Ok(cart)
    }

    /// # Errors
    ///
    /// Returns an error if the local store fails.
    pub fn clear_cart(&self) -> Result<(), MenuError> {
        Ok(self.state.clear_cart()?)
    }
}
