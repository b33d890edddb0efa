//! Catalog endpoints: products and categories. Public, unauthenticated.

use reqwest::Method;
use tracing::instrument;

use tamarind_core::ProductId;

use super::client::ApiClient;
use super::types::{Category, Product, ProductQuery};
use super::ApiError;

impl ApiClient {
    /// List products, optionally filtered.
    ///
    /// Text search, category, price-range, and flag filters are all applied
    /// by the backend; the storefront forwards them verbatim as query
    /// parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError> {
        let request = self.request(Method::GET, "products/").query(query);
        self.execute(request).await
    }

    /// Fetch a single product by ID.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the product does not exist.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(&self, product_id: ProductId) -> Result<Product, ApiError> {
        let request = self.request(Method::GET, &format!("products/{product_id}/"));
        self.execute(request).await
    }

    /// List all categories with their product counts.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        let request = self.request(Method::GET, "products/categories/");
        self.execute(request).await
    }

    /// List the products belonging to a category, by slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn list_category_products(&self, slug: &str) -> Result<Vec<Product>, ApiError> {
        let request = self.request(Method::GET, &format!("products/category/{slug}/"));
        self.execute(request).await
    }
}
