//! Per-user session storage and draft construction.

pub mod store;

pub use store::{InMemorySessionStore, SessionStore};

use showroom_types::catalog::Product;
use showroom_types::session::{CollectedImage, Draft, ImageCollector};

/// Minimum images a new product must carry.
pub const MIN_NEW_PRODUCT_IMAGES: usize = 1;

/// Empty draft for the add-product flow.
pub fn new_creation_draft() -> Draft {
    Draft {
        images: ImageCollector::with_minimum(MIN_NEW_PRODUCT_IMAGES),
        ..Default::default()
    }
}

/// Draft for the edit flow, mirroring a persisted product.
///
/// The collector is keyed by persisted image id so deletions map straight
/// onto repository rows.
pub fn new_edit_draft(product: &Product) -> Draft {
    let mut images = ImageCollector::with_minimum(0);
    images.items = product
        .images
        .iter()
        .map(|image| CollectedImage {
            key: image.id as u64,
            reference: image.reference.clone(),
        })
        .collect();
    images.next_key = images.items.iter().map(|i| i.key + 1).max().unwrap_or(1);

    Draft {
        name: Some(product.name.clone()),
        short_description: Some(product.short_description.clone()),
        additional_info: Some(product.additional_info.clone()),
        category_id: product.category_id,
        subcategory_id: product.subcategory_id,
        images,
        product_id: Some(product.id),
        pending_category_id: None,
    }
}
