//! Catalog domain types: categories, subcategories, products, and images.
//!
//! Ids are SQLite rowids. A product may hang directly off a category (no
//! subcategory) or sit inside a subcategory; when both ids are set the
//! subcategory must belong to the category.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type CategoryId = i64;
pub type SubcategoryId = i64;
pub type ProductId = i64;
pub type ImageId = i64;

/// Maximum number of images attached to one product.
pub const MAX_PRODUCT_IMAGES: usize = 10;

/// Result cap for product name search.
pub const SEARCH_LIMIT: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: SubcategoryId,
    pub name: String,
    pub category_id: CategoryId,
}

/// A product image. `reference` is either an http(s) URL or an opaque
/// media handle issued by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: ImageId,
    pub product_id: ProductId,
    pub reference: String,
    /// Zero-based insertion order within the product.
    pub position: u32,
}

/// A catalog product with its images in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub short_description: String,
    /// Empty when the author skipped it.
    pub additional_info: String,
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<SubcategoryId>,
    pub images: Vec<Image>,
    pub created_at: DateTime<Utc>,
}

/// Everything needed to create a product and its images in one write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub short_description: String,
    pub additional_info: String,
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<SubcategoryId>,
    /// Image references, stored with `position` equal to their index.
    pub images: Vec<String>,
}

/// One field update applied to a persisted product.
///
/// Category and subcategory travel together so the placement invariant is
/// never written half-way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductField {
    Name(String),
    ShortDescription(String),
    AdditionalInfo(String),
    Placement {
        category_id: CategoryId,
        subcategory_id: Option<SubcategoryId>,
    },
}

impl ProductField {
    /// Short label used in logs and confirmations.
    pub fn label(&self) -> &'static str {
        match self {
            ProductField::Name(_) => "name",
            ProductField::ShortDescription(_) => "short description",
            ProductField::AdditionalInfo(_) => "additional info",
            ProductField::Placement { .. } => "category",
        }
    }
}

/// Whether an image reference is a web URL rather than a media handle.
pub fn is_url(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}
