//! Commit and abort for the add-product flow.
//!
//! `commit` re-checks the whole draft against the catalog before a single
//! transactional write; `abort` throws the session away without touching
//! the catalog.

use std::sync::Arc;

use showroom_types::catalog::{NewProduct, Product};
use showroom_types::error::CommitError;
use showroom_types::session::Draft;
use tracing::{info, warn};

use crate::repository::catalog::CatalogRepository;
use crate::session::SessionStore;
use crate::wizard::images::ImageCollectorExt;
use crate::wizard::validate::{
    validate_additional_info, validate_name, validate_short_description,
};

/// Validates completed drafts and writes them to the catalog.
pub struct CommitHandler<R: CatalogRepository> {
    repo: Arc<R>,
}

impl<R: CatalogRepository> CommitHandler<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Create the product described by `draft`, images included, in one
    /// write. The draft is never modified; on error the caller keeps it.
    pub async fn commit(&self, draft: &Draft) -> Result<Product, CommitError> {
        let product = self.prepare(draft).await?;
        let created = self.repo.create_product(&product).await?;
        info!(
            product_id = created.id,
            images = created.images.len(),
            "product created"
        );
        Ok(created)
    }

    /// Turn a draft into a `NewProduct`, checking every field rule and the
    /// category placement against the current catalog.
    async fn prepare(&self, draft: &Draft) -> Result<NewProduct, CommitError> {
        let failed = |reason: String| {
            warn!(reason = %reason, "draft rejected at commit");
            CommitError::ValidationFailed(reason)
        };
        let misplaced = |reason: String| {
            warn!(reason = %reason, "draft placement rejected at commit");
            CommitError::PlacementInvalid(reason)
        };

        let name = validate_name(draft.name.as_deref().unwrap_or_default())
            .map_err(|e| failed(e.to_string()))?;
        let short_description =
            validate_short_description(draft.short_description.as_deref().unwrap_or_default())
                .map_err(|e| failed(e.to_string()))?;
        let additional_info = match draft.additional_info.as_deref() {
            None | Some("") => String::new(),
            Some(text) => validate_additional_info(text).map_err(|e| failed(e.to_string()))?,
        };

        match (draft.category_id, draft.subcategory_id) {
            (None, Some(_)) => {
                return Err(misplaced("subcategory set without a category".to_string()));
            }
            (None, None) => {}
            (Some(category_id), subcategory_id) => {
                if self.repo.get_category(category_id).await?.is_none() {
                    return Err(misplaced(format!("category {category_id} no longer exists")));
                }
                if let Some(subcategory_id) = subcategory_id {
                    match self.repo.get_subcategory(subcategory_id).await? {
                        Some(sub) if sub.category_id == category_id => {}
                        Some(_) => {
                            return Err(misplaced(format!(
                                "subcategory {subcategory_id} is not in category {category_id}"
                            )));
                        }
                        None => {
                            return Err(misplaced(format!(
                                "subcategory {subcategory_id} no longer exists"
                            )));
                        }
                    }
                }
            }
        }

        draft.images.done().map_err(|e| failed(e.to_string()))?;

        Ok(NewProduct {
            name,
            short_description,
            additional_info,
            category_id: draft.category_id,
            subcategory_id: draft.subcategory_id,
            images: draft.images.references(),
        })
    }
}

/// Discard the user's session. Safe to call when there is none.
pub fn abort<S: SessionStore>(sessions: &S, user_id: &str) -> bool {
    let existed = sessions.clear(user_id);
    if existed {
        info!(user_id, "session aborted");
    }
    existed
}
