//! Navigation tokens and flow actions.
//!
//! A `NavToken` is the stateless context attached to every browse button:
//! the view to show, the entity it is scoped to, and that entity's
//! immediate parent. Deeper ancestors are never carried; they are looked up
//! again when needed. `Location` is the typed reading of a token, with one
//! variant per legal combination.

use serde::{Deserialize, Serialize};

use crate::catalog::{CategoryId, ImageId, ProductId, SubcategoryId};
use crate::error::NavError;

/// Browse view kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Categories,
    Subcategories,
    Products,
    ProductDetail,
}

impl View {
    /// Single-character wire tag.
    pub fn tag(self) -> char {
        match self {
            View::Categories => 'c',
            View::Subcategories => 's',
            View::Products => 'p',
            View::ProductDetail => 'd',
        }
    }

    pub fn from_tag(tag: &str) -> Option<View> {
        match tag {
            "c" => Some(View::Categories),
            "s" => Some(View::Subcategories),
            "p" => Some(View::Products),
            "d" => Some(View::ProductDetail),
            _ => None,
        }
    }
}

/// Raw navigation token: `{view, entity_id, parent_id?}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NavToken {
    pub view: View,
    pub entity_id: i64,
    pub parent_id: Option<i64>,
}

impl NavToken {
    pub fn new(view: View, entity_id: i64, parent_id: Option<i64>) -> Self {
        Self {
            view,
            entity_id,
            parent_id,
        }
    }
}

/// Which set of products a `Products` view lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductScope {
    /// Products inside a subcategory.
    Subcategory {
        subcategory_id: SubcategoryId,
        category_id: CategoryId,
    },
    /// Products attached directly to a category with no subcategory.
    Category { category_id: CategoryId },
}

/// Typed browse location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    Categories,
    Subcategories { category_id: CategoryId },
    Products(ProductScope),
    ProductDetail { product_id: ProductId },
}

impl Location {
    pub fn view(&self) -> View {
        match self {
            Location::Categories => View::Categories,
            Location::Subcategories { .. } => View::Subcategories,
            Location::Products(_) => View::Products,
            Location::ProductDetail { .. } => View::ProductDetail,
        }
    }

    pub fn to_token(self) -> NavToken {
        match self {
            Location::Categories => NavToken::new(View::Categories, 0, None),
            Location::Subcategories { category_id } => {
                NavToken::new(View::Subcategories, category_id, None)
            }
            Location::Products(ProductScope::Subcategory {
                subcategory_id,
                category_id,
            }) => NavToken::new(View::Products, subcategory_id, Some(category_id)),
            Location::Products(ProductScope::Category { category_id }) => {
                NavToken::new(View::Products, category_id, None)
            }
            Location::ProductDetail { product_id } => {
                NavToken::new(View::ProductDetail, product_id, None)
            }
        }
    }
}

impl TryFrom<NavToken> for Location {
    type Error = NavError;

    fn try_from(token: NavToken) -> Result<Self, Self::Error> {
        if token.entity_id < 0 || token.parent_id.is_some_and(|p| p < 0) {
            return Err(NavError::InvalidToken("negative id".to_string()));
        }
        match (token.view, token.parent_id) {
            (View::Categories, None) if token.entity_id == 0 => Ok(Location::Categories),
            (View::Categories, _) => Err(NavError::InvalidToken(
                "categories view takes no entity".to_string(),
            )),
            (View::Subcategories, None) => Ok(Location::Subcategories {
                category_id: token.entity_id,
            }),
            (View::Products, Some(category_id)) => {
                Ok(Location::Products(ProductScope::Subcategory {
                    subcategory_id: token.entity_id,
                    category_id,
                }))
            }
            (View::Products, None) => Ok(Location::Products(ProductScope::Category {
                category_id: token.entity_id,
            })),
            (View::ProductDetail, None) => Ok(Location::ProductDetail {
                product_id: token.entity_id,
            }),
            (view, Some(_)) => Err(NavError::InvalidToken(format!(
                "{view:?} view takes no parent"
            ))),
        }
    }
}

/// Literal actions understood by the admin flows.
///
/// Id-carrying variants are only meaningful in the wizard step that offered
/// them; the transition tables reject them anywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowAction {
    AdminMenu,
    StartAdd,
    StartEdit,
    Cancel,
    PickCategory(CategoryId),
    PickSubcategory(SubcategoryId),
    SkipSubcategory,
    ImagesDone,
    ConfirmSave,
    PickProduct(ProductId),
    NewSearch,
    ShowAll,
    EditName,
    EditShortDescription,
    EditAdditionalInfo,
    EditCategory,
    EditImages,
    ViewProduct,
    FinishEdit,
    BackToMenu,
    AddImage,
    ListImages(u32),
    DeleteImageMenu,
    DeleteImage(ImageId),
    BackToImages,
}

/// Any action a button can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionToken {
    Nav(NavToken),
    Flow(FlowAction),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_tag_roundtrip() {
        for view in [
            View::Categories,
            View::Subcategories,
            View::Products,
            View::ProductDetail,
        ] {
            assert_eq!(View::from_tag(&view.tag().to_string()), Some(view));
        }
        assert_eq!(View::from_tag("x"), None);
    }

    #[test]
    fn test_location_token_roundtrip() {
        let locations = [
            Location::Categories,
            Location::Subcategories { category_id: 4 },
            Location::Products(ProductScope::Subcategory {
                subcategory_id: 9,
                category_id: 4,
            }),
            Location::Products(ProductScope::Category { category_id: 4 }),
            Location::ProductDetail { product_id: 31 },
        ];
        for location in locations {
            let back = Location::try_from(location.to_token()).unwrap();
            assert_eq!(back, location);
        }
    }

    #[test]
    fn test_products_scope_follows_parent() {
        let with_parent = Location::try_from(NavToken::new(View::Products, 9, Some(4))).unwrap();
        assert!(matches!(
            with_parent,
            Location::Products(ProductScope::Subcategory { .. })
        ));
        let flat = Location::try_from(NavToken::new(View::Products, 4, None)).unwrap();
        assert_eq!(
            flat,
            Location::Products(ProductScope::Category { category_id: 4 })
        );
    }

    #[test]
    fn test_rejects_impossible_tokens() {
        for token in [
            NavToken::new(View::Categories, 3, None),
            NavToken::new(View::Categories, 0, Some(1)),
            NavToken::new(View::Subcategories, 3, Some(1)),
            NavToken::new(View::ProductDetail, 3, Some(1)),
            NavToken::new(View::Products, -1, None),
        ] {
            assert!(matches!(
                Location::try_from(token),
                Err(NavError::InvalidToken(_))
            ));
        }
    }
}
