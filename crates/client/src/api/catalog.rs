//! Category and product endpoints.

use comanda_core::catalog::{Category, CategoryDraft, CategoryFilter, Product, ProductDraft};
use comanda_core::types::{CategoryId, ProductId};
use reqwest::Method;
use tracing::instrument;

use super::ApiClient;
use super::types::{
    ActiveBody, CategoryBody, CategoryWire, DataBody, Empty, ProductBody, ProductWire,
};
use crate::error::ApiError;

impl ApiClient {
    // =========================================================================
    // Categories
    // =========================================================================

    /// List every category, active or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        let request = self.request(Method::GET, "categories")?;
        let DataBody { data } = self
            .send::<DataBody<Vec<CategoryWire>>>(request, "GET categories")
            .await?;
        Ok(data.unwrap_or_default().into_iter().map(Category::from).collect())
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_category(&self, draft: &CategoryDraft) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "categories")?
            .json(&CategoryBody::from(draft));
        let Empty {} = self.send(request, "POST categories").await?;
        Ok(())
    }

    /// Replace a category's fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, draft))]
    pub async fn update_category(&self, id: &CategoryId, draft: &CategoryDraft) -> Result<(), ApiError> {
        let request = self
            .request(Method::PUT, &format!("categories/{id}"))?
            .json(&CategoryBody::from(draft));
        let Empty {} = self.send(request, "PUT categories").await?;
        Ok(())
    }

    /// Activate or deactivate a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn set_category_active(&self, id: &CategoryId, active: bool) -> Result<(), ApiError> {
        let request = self
            .request(Method::PUT, &format!("categories/{id}"))?
            .json(&ActiveBody { activo: active });
        let Empty {} = self.send(request, "PUT categories").await?;
        Ok(())
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: &CategoryId) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, &format!("categories/{id}"))?;
        let Empty {} = self.send(request, "DELETE categories").await?;
        Ok(())
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List products, optionally restricted to one category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn list_products(&self, filter: &CategoryFilter) -> Result<Vec<Product>, ApiError> {
        let mut request = self.request(Method::GET, "products")?;
        if let Some(id) = filter.category_id() {
            request = request.query(&[("categoria", id.as_str())]);
        }
        let DataBody { data } = self
            .send::<DataBody<Vec<ProductWire>>>(request, "GET products")
            .await?;
        Ok(data.unwrap_or_default().into_iter().map(Product::from).collect())
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_product(&self, draft: &ProductDraft) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "products")?
            .json(&ProductBody::from(draft));
        let Empty {} = self.send(request, "POST products").await?;
        Ok(())
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, draft))]
    pub async fn update_product(&self, id: &ProductId, draft: &ProductDraft) -> Result<(), ApiError> {
        let request = self
            .request(Method::PUT, &format!("products/{id}"))?
            .json(&ProductBody::from(draft));
        let Empty {} = self.send(request, "PUT products").await?;
        Ok(())
    }

    /// Activate or deactivate a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn set_product_active(&self, id: &ProductId, active: bool) -> Result<(), ApiError> {
        let request = self
            .request(Method::PUT, &format!("products/{id}"))?
            .json(&ActiveBody { activo: active });
        let Empty {} = self.send(request, "PUT products").await?;
        Ok(())
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, &format!("products/{id}"))?;
        let Empty {} = self.send(request, "DELETE products").await?;
        Ok(())
    }
}
