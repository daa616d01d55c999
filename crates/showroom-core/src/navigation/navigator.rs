//! Browse views and back-navigation.
//!
//! Rendering is stateless: each view is rebuilt from its `Location` and the
//! repository, and every button carries the full token for the view it
//! opens. Back targets skip a level when the catalog has no subcategory
//! layer at that point.

use std::sync::Arc;

use showroom_types::catalog::Product;
use showroom_types::error::NavError;
use showroom_types::navigation::{Location, ProductScope};
use showroom_types::reply::{MediaPlan, Reply};
use tracing::{debug, warn};

use super::codec::encode_location;
use crate::repository::catalog::CatalogRepository;

const BACK_LABEL: &str = "« Back";

/// Resolves and renders browse locations against a catalog repository.
pub struct Navigator<R: CatalogRepository> {
    repo: Arc<R>,
}

impl<R: CatalogRepository> Navigator<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Back-navigation target for `location`, or `None` at the root.
    ///
    /// Only `ProductDetail` consults the repository; a product that no
    /// longer exists yields `NotFound`.
    pub async fn back(&self, location: Location) -> Result<Option<Location>, NavError> {
        match location {
            Location::Categories => Ok(None),
            Location::Subcategories { .. } => Ok(Some(Location::Categories)),
            Location::Products(ProductScope::Subcategory { category_id, .. }) => {
                Ok(Some(Location::Subcategories { category_id }))
            }
            Location::Products(ProductScope::Category { .. }) => Ok(Some(Location::Categories)),
            Location::ProductDetail { product_id } => {
                let product = self
                    .repo
                    .get_product(product_id)
                    .await?
                    .ok_or(NavError::NotFound {
                        entity: "product",
                        id: product_id,
                    })?;
                self.listing_for(&product).await.map(Some)
            }
        }
    }

    /// The product listing a product is shown in.
    async fn listing_for(&self, product: &Product) -> Result<Location, NavError> {
        match (product.subcategory_id, product.category_id) {
            (Some(subcategory_id), Some(category_id)) => {
                Ok(Location::Products(ProductScope::Subcategory {
                    subcategory_id,
                    category_id,
                }))
            }
            (Some(subcategory_id), None) => {
                // Parent category is not stored on the product; take it from
                // the subcategory.
                match self.repo.get_subcategory(subcategory_id).await? {
                    Some(sub) => Ok(Location::Products(ProductScope::Subcategory {
                        subcategory_id,
                        category_id: sub.category_id,
                    })),
                    None => Ok(Location::Categories),
                }
            }
            (None, Some(category_id)) => {
                Ok(Location::Products(ProductScope::Category { category_id }))
            }
            (None, None) => Ok(Location::Categories),
        }
    }

    /// Render `location`, walking up to the nearest ancestor that still
    /// exists when the entities it names have been deleted.
    pub async fn show(&self, location: Location) -> Result<Reply, NavError> {
        let mut current = location;
        let mut notice = None;
        loop {
            match self.render(current).await {
                Ok(reply) => {
                    return Ok(match notice {
                        Some(text) => reply.with_notice(text),
                        None => reply,
                    });
                }
                Err(NavError::NotFound { entity, id }) if current != Location::Categories => {
                    warn!(entity, id, view = ?current.view(), "stale navigation target");
                    notice = Some(format!("That {entity} is no longer available."));
                    current = fallback_ancestor(current);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Render one browse view.
    pub async fn render(&self, location: Location) -> Result<Reply, NavError> {
        debug!(view = ?location.view(), "rendering browse view");
        match location {
            Location::Categories => self.render_categories().await,
            Location::Subcategories { category_id } => {
                self.render_subcategories(location, category_id).await
            }
            Location::Products(scope) => self.render_products(location, scope).await,
            Location::ProductDetail { product_id } => self.render_product(product_id).await,
        }
    }

    async fn render_categories(&self) -> Result<Reply, NavError> {
        let categories = self.repo.list_categories().await?;
        if categories.is_empty() {
            return Ok(Reply::text("The catalog is empty for now."));
        }

        let mut reply = Reply::text("Choose a category:");
        for category in categories {
            // A category without subcategories opens its products directly.
            let has_subcategories = !self
                .repo
                .list_subcategories(category.id)
                .await?
                .is_empty();
            let target = if has_subcategories {
                Location::Subcategories {
                    category_id: category.id,
                }
            } else {
                Location::Products(ProductScope::Category {
                    category_id: category.id,
                })
            };
            reply = reply.with_choice(category.name, encode_location(target)?);
        }
        Ok(reply)
    }

    async fn render_subcategories(
        &self,
        location: Location,
        category_id: i64,
    ) -> Result<Reply, NavError> {
        let category = self
            .repo
            .get_category(category_id)
            .await?
            .ok_or(NavError::NotFound {
                entity: "category",
                id: category_id,
            })?;
        let subcategories = self.repo.list_subcategories(category_id).await?;

        let mut reply = Reply::text(format!("{}\n\nChoose a subcategory:", category.name));
        for sub in subcategories {
            let target = Location::Products(ProductScope::Subcategory {
                subcategory_id: sub.id,
                category_id,
            });
            reply = reply.with_choice(sub.name, encode_location(target)?);
        }

        let direct = self.repo.list_products_by_category_only(category_id).await?;
        if !direct.is_empty() {
            let target = Location::Products(ProductScope::Category { category_id });
            reply = reply.with_choice(
                format!("Other {}", category.name.to_lowercase()),
                encode_location(target)?,
            );
        }
        self.with_back(reply, location).await
    }

    async fn render_products(
        &self,
        location: Location,
        scope: ProductScope,
    ) -> Result<Reply, NavError> {
        let (title, products) = match scope {
            ProductScope::Subcategory {
                subcategory_id,
                category_id,
            } => {
                let sub = self
                    .repo
                    .get_subcategory(subcategory_id)
                    .await?
                    .filter(|s| s.category_id == category_id)
                    .ok_or(NavError::NotFound {
                        entity: "subcategory",
                        id: subcategory_id,
                    })?;
                (sub.name, self.repo.list_products(subcategory_id).await?)
            }
            ProductScope::Category { category_id } => {
                let category = self
                    .repo
                    .get_category(category_id)
                    .await?
                    .ok_or(NavError::NotFound {
                        entity: "category",
                        id: category_id,
                    })?;
                (
                    category.name,
                    self.repo.list_products_by_category_only(category_id).await?,
                )
            }
        };

        let mut reply = if products.is_empty() {
            Reply::text(format!("{title}\n\nNo products here yet."))
        } else {
            Reply::text(format!("{title}\n\nChoose a product:"))
        };
        for product in products {
            let target = Location::ProductDetail {
                product_id: product.id,
            };
            reply = reply.with_choice(product.name, encode_location(target)?);
        }
        self.with_back(reply, location).await
    }

    async fn render_product(&self, product_id: i64) -> Result<Reply, NavError> {
        let product = self
            .repo
            .get_product(product_id)
            .await?
            .ok_or(NavError::NotFound {
                entity: "product",
                id: product_id,
            })?;

        let mut reply = Reply::text(product_card(&product));
        if let Some(first) = product.images.first() {
            reply = reply.with_media(MediaPlan::for_reference(&first.reference));
        }
        let back = self.listing_for(&product).await?;
        Ok(reply.with_choice(BACK_LABEL, encode_location(back)?))
    }

    async fn with_back(&self, reply: Reply, location: Location) -> Result<Reply, NavError> {
        match self.back(location).await? {
            Some(target) => Ok(reply.with_choice(BACK_LABEL, encode_location(target)?)),
            None => Ok(reply),
        }
    }
}

/// Plain-text product card used by the browse detail view and the editor.
pub fn product_card(product: &Product) -> String {
    let mut text = format!("{}\n\n{}", product.name, product.short_description);
    if !product.additional_info.is_empty() {
        text.push_str(&format!("\n\n{}", product.additional_info));
    }
    match product.images.len() {
        0 => {}
        1 => text.push_str("\n\n1 photo"),
        n => text.push_str(&format!("\n\n{n} photos")),
    }
    text
}

/// Nearest ancestor to show when `location` points at a deleted entity.
fn fallback_ancestor(location: Location) -> Location {
    match location {
        Location::Products(ProductScope::Subcategory { category_id, .. }) => {
            Location::Subcategories { category_id }
        }
        Location::Categories
        | Location::Subcategories { .. }
        | Location::Products(ProductScope::Category { .. })
        | Location::ProductDetail { .. } => Location::Categories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::codec::decode_location;
    use crate::testing::InMemoryCatalog;

    struct Fixture {
        nav: Navigator<InMemoryCatalog>,
        repo: Arc<InMemoryCatalog>,
        beds: i64,
        double: i64,
        kitchens: i64,
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(InMemoryCatalog::new());
        let beds = repo.add_category("Beds");
        let double = repo.add_subcategory(beds, "Double beds");
        let kitchens = repo.add_category("Kitchens");
        Fixture {
            nav: Navigator::new(Arc::clone(&repo)),
            repo,
            beds,
            double,
            kitchens,
        }
    }

    fn back_target(reply: &Reply) -> Location {
        let back = reply
            .options
            .iter()
            .find(|c| c.label == BACK_LABEL)
            .expect("back button");
        decode_location(&back.action).unwrap()
    }

    #[tokio::test]
    async fn test_back_rule_table() {
        let f = fixture();
        assert_eq!(f.nav.back(Location::Categories).await.unwrap(), None);
        assert_eq!(
            f.nav
                .back(Location::Subcategories { category_id: f.beds })
                .await
                .unwrap(),
            Some(Location::Categories)
        );
        assert_eq!(
            f.nav
                .back(Location::Products(ProductScope::Subcategory {
                    subcategory_id: f.double,
                    category_id: f.beds,
                }))
                .await
                .unwrap(),
            Some(Location::Subcategories { category_id: f.beds })
        );
        assert_eq!(
            f.nav
                .back(Location::Products(ProductScope::Category {
                    category_id: f.kitchens
                }))
                .await
                .unwrap(),
            Some(Location::Categories)
        );
    }

    #[tokio::test]
    async fn test_product_without_subcategory_skips_level() {
        let f = fixture();
        let milan = f.repo.add_product("Milan", Some(f.kitchens), None, &[]);
        let back = f
            .nav
            .back(Location::ProductDetail { product_id: milan })
            .await
            .unwrap();
        let expected = Location::Products(ProductScope::Category {
            category_id: f.kitchens,
        });
        assert_eq!(back, Some(expected));
        // And one more step lands on the root, never on a subcategory list.
        assert_eq!(f.nav.back(expected).await.unwrap(), Some(Location::Categories));
    }

    #[tokio::test]
    async fn test_product_in_subcategory_goes_back_to_it() {
        let f = fixture();
        let oslo = f.repo.add_product("Oslo", Some(f.beds), Some(f.double), &["AgAC1"]);
        let reply = f
            .nav
            .render(Location::ProductDetail { product_id: oslo })
            .await
            .unwrap();
        assert_eq!(
            back_target(&reply),
            Location::Products(ProductScope::Subcategory {
                subcategory_id: f.double,
                category_id: f.beds,
            })
        );
        assert_eq!(reply.media, Some(MediaPlan::Photo("AgAC1".into())));
    }

    #[tokio::test]
    async fn test_orphan_product_goes_back_to_root() {
        let f = fixture();
        let loose = f.repo.add_product("Loose", None, None, &[]);
        assert_eq!(
            f.nav
                .back(Location::ProductDetail { product_id: loose })
                .await
                .unwrap(),
            Some(Location::Categories)
        );
    }

    #[tokio::test]
    async fn test_back_from_deleted_product_is_not_found() {
        let f = fixture();
        let err = f
            .nav
            .back(Location::ProductDetail { product_id: 999 })
            .await
            .unwrap_err();
        assert!(matches!(err, NavError::NotFound { entity: "product", id: 999 }));
    }

    #[tokio::test]
    async fn test_categories_link_flat_categories_to_products() {
        let f = fixture();
        let reply = f.nav.render(Location::Categories).await.unwrap();
        assert_eq!(reply.options.len(), 2);
        let beds = decode_location(&reply.options[0].action).unwrap();
        let kitchens = decode_location(&reply.options[1].action).unwrap();
        assert_eq!(beds, Location::Subcategories { category_id: f.beds });
        assert_eq!(
            kitchens,
            Location::Products(ProductScope::Category {
                category_id: f.kitchens
            })
        );
    }

    #[tokio::test]
    async fn test_subcategories_offer_direct_products() {
        let f = fixture();
        f.repo.add_product("Bunk", Some(f.beds), None, &[]);
        let reply = f
            .nav
            .render(Location::Subcategories { category_id: f.beds })
            .await
            .unwrap();
        let labels: Vec<&str> = reply.options.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Double beds", "Other beds", BACK_LABEL]);
    }

    #[tokio::test]
    async fn test_show_falls_back_from_stale_subcategory() {
        let f = fixture();
        let location = Location::Products(ProductScope::Subcategory {
            subcategory_id: f.double,
            category_id: f.beds,
        });
        f.repo.remove_subcategory(f.double);
        let reply = f.nav.show(location).await.unwrap();
        assert!(reply.text.starts_with("That subcategory is no longer available."));
        assert!(reply.text.contains("Beds"));

        f.repo.remove_category(f.beds);
        let reply = f.nav.show(location).await.unwrap();
        assert!(reply.text.contains("Choose a category:"));
    }

    #[tokio::test]
    async fn test_show_stale_product_lands_on_categories() {
        let f = fixture();
        let reply = f
            .nav
            .show(Location::ProductDetail { product_id: 404 })
            .await
            .unwrap();
        assert!(reply.text.starts_with("That product is no longer available."));
        assert!(reply.text.ends_with("Choose a category:"));
    }

    #[tokio::test]
    async fn test_product_card_mentions_photos() {
        let f = fixture();
        let id = f
            .repo
            .add_product("Oslo", Some(f.beds), Some(f.double), &["a", "b"]);
        let reply = f
            .nav
            .render(Location::ProductDetail { product_id: id })
            .await
            .unwrap();
        assert!(reply.text.starts_with("Oslo"));
        assert!(reply.text.ends_with("2 photos"));
    }
}
