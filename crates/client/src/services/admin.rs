//! Administrative catalog management.

use comanda_core::catalog::{
    self, CatalogError, Category, CategoryDraft, CategoryFilter, DashboardStats, Product,
    ProductDraft,
};
use comanda_core::notice::{FORM_NOTICE_DURATION, Notice};
use comanda_core::types::{CategoryId, ProductId};
use thiserror::Error;
use tracing::{info, instrument};

use super::authorized;
use crate::api::ApiClient;
use crate::error::ApiError;
use crate::storage::{LocalState, StorageError};

/// Errors from admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// No token is stored, or the user is not an administrator.
    #[error("Administrator access required.")]
    NotAuthorized,

    /// The form failed validation.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The backend refused or failed the request.
    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),

    /// The local store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Categories and products as the admin panel sees them, inactive included.
#[derive(Debug, Clone, Default)]
pub struct AdminSnapshot {
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
}

impl AdminSnapshot {
    #[must_use]
    pub fn stats(&self) -> DashboardStats {
        DashboardStats::compute(&self.categories, &self.products)
    }

    /// Products matching both the search term and the category filter.
    #[must_use]
    pub fn filter_products(&self, term: &str, filter: &CategoryFilter) -> Vec<&Product> {
        catalog::search(&self.products, term)
            .into_iter()
            .filter(|p| filter.matches(p))
            .collect()
    }

    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    #[must_use]
    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| &c.id == id)
    }
}

/// Admin panel logic. Every call requires an administrator session.
#[derive(Debug, Clone)]
pub struct AdminService {
    api: ApiClient,
    state: LocalState,
}

impl AdminService {
    #[must_use]
    pub const fn new(api: ApiClient, state: LocalState) -> Self {
        Self { api, state }
    }

    /// Client for an administrator session.
    ///
    /// Uses the stored user's role, asking `/auth/me` when none is stored.
    async fn admin_client(&self) -> Result<ApiClient, AdminError> {
        let api = authorized(&self.api, &self.state)?.ok_or(AdminError::NotAuthorized)?;
        let is_admin = match self.state.user()? {
            Some(user) => user.is_admin(),
            None => api.me().await?.is_admin(),
        };
        if !is_admin {
            return Err(AdminError::NotAuthorized);
        }
        Ok(api)
    }

    /// Load categories and all products concurrently.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotAuthorized`] or the request error.
    #[instrument(skip(self))]
    pub async fn snapshot(&self) -> Result<AdminSnapshot, AdminError> {
        let api = self.admin_client().await?;
        let (categories, products) = tokio::try_join!(
            api.list_categories(),
            api.list_products(&CategoryFilter::All)
        )?;
        Ok(AdminSnapshot {
            categories,
            products,
        })
    }

    /// Dashboard figures and the low-stock warning, if any.
    ///
    /// # Errors
    ///
    /// See [`AdminService::snapshot`].
    pub async fn dashboard(&self) -> Result<(DashboardStats, Option<Notice>), AdminError> {
        let stats = self.snapshot().await?.stats();
        let notice = stats
            .low_stock_notice()
            .map(|n| n.lasting(FORM_NOTICE_DURATION));
        Ok((stats, notice))
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Create a product, or update it when `id` is given.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Catalog`] before any request when the form is
    /// invalid.
    #[instrument(skip(self, draft))]
    pub async fn save_product(
        &self,
        id: Option<&ProductId>,
        draft: &ProductDraft,
    ) -> Result<Notice, AdminError> {
        draft.validate()?;
        let api = self.admin_client().await?;
        let message = match id {
            Some(id) => {
                api.update_product(id, draft).await?;
                "Product updated successfully"
            }
            None => {
                api.create_product(draft).await?;
                "Product created successfully"
            }
        };
        info!(name = %draft.name.trim(), "Product saved");
        Ok(Notice::success(message).lasting(FORM_NOTICE_DURATION))
    }

    /// # Errors
    ///
    /// Returns [`AdminError::NotAuthorized`] or the request error.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<Notice, AdminError> {
        self.admin_client().await?.delete_product(id).await?;
        Ok(Notice::success("Product deleted").lasting(FORM_NOTICE_DURATION))
    }

    /// Flip a product's active flag.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotAuthorized`] or the request error.
    #[instrument(skip(self, product), fields(id = %product.id))]
    pub async fn toggle_product(&self, product: &Product) -> Result<Notice, AdminError> {
        let active = !product.active;
        self.admin_client()
            .await?
            .set_product_active(&product.id, active)
            .await?;
        Ok(Notice::success(if active {
            "Product activated"
        } else {
            "Product deactivated"
        })
        .lasting(FORM_NOTICE_DURATION))
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Create a category, or update it when `id` is given.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Catalog`] before any request when the form is
    /// invalid.
    #[instrument(skip(self, draft))]
    pub async fn save_category(
        &self,
        id: Option<&CategoryId>,
        draft: &CategoryDraft,
    ) -> Result<Notice, AdminError> {
        draft.validate()?;
        let api = self.admin_client().await?;
        let message = match id {
            Some(id) => {
                api.update_category(id, draft).await?;
                "Category updated successfully"
            }
            None => {
                api.create_category(draft).await?;
                "Category created successfully"
            }
        };
        info!(name = %draft.name.trim(), "Category saved");
        Ok(Notice::success(message).lasting(FORM_NOTICE_DURATION))
    }

    /// # Errors
    ///
    /// Returns [`AdminError::NotAuthorized`] or the request error.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: &CategoryId) -> Result<Notice, AdminError> {
        self.admin_client().await?.delete_category(id).await?;
        Ok(Notice::success("Category deleted").lasting(FORM_NOTICE_DURATION))
    }

    /// Flip a category's active flag.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotAuthorized`] or the request error.
    #[instrument(skip(self, category), fields(id = %category.id))]
    pub async fn toggle_category(&self, category: &Category) -> Result<Notice, AdminError> {
        let active = !category.active;
        self.admin_client()
            .await?
            .set_category_active(&category.id, active)
            .await?;
        Ok(Notice::success(if active {
            "Category activated"
        } else {
            "Category deactivated"
        })
        .lasting(FORM_NOTICE_DURATION))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use comanda_core::catalog::CategoryRef;
    use rust_decimal::Decimal;

    fn product(id: &str, name: &str, category: &str, stock: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            description: String::new(),
            price: Decimal::new(1000, 2),
            image: None,
            stock,
            active: true,
            category: CategoryRef {
                id: CategoryId::new(category),
                name: String::new(),
                icon: String::new(),
            },
        }
    }

    fn service() -> AdminService {
        let config = ClientConfig::for_api_url("http://127.0.0.1:9/api", "/tmp/unused.json").unwrap();
        AdminService::new(ApiClient::new(&config).unwrap(), LocalState::in_memory())
    }

    #[tokio::test]
    async fn test_requires_token() {
        let result = service().snapshot().await;
        assert!(matches!(result, Err(AdminError::NotAuthorized)));
    }

    #[tokio::test]
    async fn test_invalid_draft_fails_before_auth() {
        let result = service().save_product(None, &ProductDraft::default()).await;
        assert!(matches!(
            result,
            Err(AdminError::Catalog(CatalogError::MissingProductFields))
        ));
    }

    #[test]
    fn test_snapshot_filters() {
        let snapshot = AdminSnapshot {
            categories: Vec::new(),
            products: vec![
                product("1", "Clásica", "10", 3),
                product("2", "Chicha morada", "20", 30),
            ],
        };
        assert_eq!(snapshot.filter_products("CLÁS", &CategoryFilter::All).len(), 1);
        let drinks = CategoryFilter::Category(CategoryId::new("20"));
        assert_eq!(snapshot.filter_products("", &drinks).len(), 1);
        assert!(snapshot.filter_products("clás", &drinks).is_empty());
        assert_eq!(snapshot.stats().low_stock_products, 1);
        assert!(snapshot.product(&ProductId::new("2")).is_some());
    }
}
