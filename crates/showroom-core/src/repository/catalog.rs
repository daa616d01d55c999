//! Catalog repository trait definition.

use showroom_types::catalog::{
    Category, CategoryId, Image, ImageId, NewProduct, Product, ProductField, ProductId,
    Subcategory, SubcategoryId,
};
use showroom_types::error::RepositoryError;

/// Repository trait for the product catalog.
///
/// Implementations live in showroom-infra (e.g., SqliteCatalogRepository).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
///
/// Product lists are ordered by name and carry their images ordered by
/// `position`. Lookups return `Ok(None)` for a missing row; writes against a
/// missing row return `RepositoryError::NotFound`.
pub trait CatalogRepository: Send + Sync {
    /// All categories, ordered by name.
    fn list_categories(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Category>, RepositoryError>> + Send;

    fn get_category(
        &self,
        id: CategoryId,
    ) -> impl std::future::Future<Output = Result<Option<Category>, RepositoryError>> + Send;

    /// Subcategories of one category, ordered by name.
    fn list_subcategories(
        &self,
        category_id: CategoryId,
    ) -> impl std::future::Future<Output = Result<Vec<Subcategory>, RepositoryError>> + Send;

    fn get_subcategory(
        &self,
        id: SubcategoryId,
    ) -> impl std::future::Future<Output = Result<Option<Subcategory>, RepositoryError>> + Send;

    /// Products inside a subcategory.
    fn list_products(
        &self,
        subcategory_id: SubcategoryId,
    ) -> impl std::future::Future<Output = Result<Vec<Product>, RepositoryError>> + Send;

    /// Products attached to a category with no subcategory.
    fn list_products_by_category_only(
        &self,
        category_id: CategoryId,
    ) -> impl std::future::Future<Output = Result<Vec<Product>, RepositoryError>> + Send;

    /// One product with its images.
    fn get_product(
        &self,
        id: ProductId,
    ) -> impl std::future::Future<Output = Result<Option<Product>, RepositoryError>> + Send;

    /// Case-insensitive substring match on the product name.
    fn search_products_by_name(
        &self,
        term: &str,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<Product>, RepositoryError>> + Send;

    /// Bounded listing of the whole catalog.
    fn list_all_products(
        &self,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<Product>, RepositoryError>> + Send;

    /// Create a product and all of its images in one transaction.
    ///
    /// Either every row is written or none is.
    fn create_product(
        &self,
        product: &NewProduct,
    ) -> impl std::future::Future<Output = Result<Product, RepositoryError>> + Send;

    /// Apply a single field update to a persisted product.
    fn update_product_field(
        &self,
        id: ProductId,
        field: &ProductField,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Append an image after the product's current last position.
    fn add_image(
        &self,
        product_id: ProductId,
        reference: &str,
    ) -> impl std::future::Future<Output = Result<Image, RepositoryError>> + Send;

    fn delete_image(
        &self,
        id: ImageId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Images of one product, ordered by position.
    fn list_images(
        &self,
        product_id: ProductId,
    ) -> impl std::future::Future<Output = Result<Vec<Image>, RepositoryError>> + Send;

    fn create_category(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<Category, RepositoryError>> + Send;

    fn create_subcategory(
        &self,
        category_id: CategoryId,
        name: &str,
    ) -> impl std::future::Future<Output = Result<Subcategory, RepositoryError>> + Send;

    /// Delete a product and its images.
    fn delete_product(
        &self,
        id: ProductId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
