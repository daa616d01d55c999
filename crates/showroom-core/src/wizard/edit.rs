//! Edit-product wizard.
//!
//! Menu-driven: every field leaf returns to `FieldMenu`, every image leaf
//! returns to `ImageMenu`. Field edits are written as they are accepted,
//! so leaving the menu never has anything left to save.

use showroom_types::session::EditStep;

use super::Wizard;

/// Size of the whole-catalog listing shown when a search finds nothing.
pub const FALLBACK_LISTING_LIMIT: u32 = 10;

/// Inputs that move the edit-product wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditEvent {
    /// A search ran; `matches` is the number of hits.
    Searched { matches: usize },
    ShowAll,
    ProductPicked,
    NewSearch,
    OpenName,
    OpenShortDescription,
    OpenAdditionalInfo,
    OpenCategory,
    OpenImages,
    ViewProduct,
    CategoryPicked,
    FieldSaved,
    BackToMenu,
    OpenAddImage,
    ImageAdded,
    OpenImageList { page: u32 },
    OpenDeleteImage,
    ImageDeleted,
    BackToImages,
    /// The product being edited no longer exists.
    ProductLost,
    Finish,
    Cancelled,
}

pub struct EditWizard;

impl Wizard for EditWizard {
    type Step = EditStep;
    type Event = EditEvent;

    fn next(step: EditStep, event: &EditEvent) -> Option<EditStep> {
        use EditEvent as E;
        use EditStep as S;

        let next = match (step, *event) {
            (S::SearchByName, E::Searched { matches: 0 }) => S::SearchByName,
            (S::SearchByName, E::Searched { matches: 1 }) => S::FieldMenu,
            (S::SearchByName, E::Searched { .. }) => S::ChooseProduct,
            (S::SearchByName, E::ShowAll) => S::SearchByName,
            // The zero-match listing offers products to pick directly.
            (S::SearchByName | S::ChooseProduct, E::ProductPicked) => S::FieldMenu,
            (S::ChooseProduct | S::FieldMenu, E::NewSearch) => S::SearchByName,

            (S::FieldMenu, E::OpenName) => S::NameEdit,
            (S::FieldMenu, E::OpenShortDescription) => S::ShortDescEdit,
            (S::FieldMenu, E::OpenAdditionalInfo) => S::AdditionalInfoEdit,
            (S::FieldMenu, E::OpenCategory) => S::CategoryEdit,
            (S::FieldMenu, E::OpenImages) => S::ImageMenu,
            (S::FieldMenu, E::ViewProduct) => S::FieldMenu,
            (S::FieldMenu, E::Finish) => S::Finished,

            (S::CategoryEdit, E::CategoryPicked) => S::SubcategoryEdit,
            (
                S::NameEdit | S::ShortDescEdit | S::AdditionalInfoEdit | S::SubcategoryEdit,
                E::FieldSaved,
            ) => S::FieldMenu,
            (
                S::NameEdit
                | S::ShortDescEdit
                | S::AdditionalInfoEdit
                | S::CategoryEdit
                | S::SubcategoryEdit
                | S::ImageMenu,
                E::BackToMenu,
            ) => S::FieldMenu,

            (S::ImageMenu, E::OpenAddImage) => S::AddImage,
            (S::AddImage, E::ImageAdded) => S::ImageMenu,
            (S::ImageMenu | S::ListImages { .. }, E::OpenImageList { page }) => {
                S::ListImages { page }
            }
            (S::ImageMenu, E::OpenDeleteImage) => S::DeleteImage,
            (S::DeleteImage, E::ImageDeleted) => S::ImageMenu,
            (S::AddImage | S::ListImages { .. } | S::DeleteImage, E::BackToImages) => S::ImageMenu,

            // A deleted product sends the user back to search.
            (_, E::ProductLost) => S::SearchByName,
            (_, E::Cancelled) => S::Cancelled,
            _ => return None,
        };
        Some(next)
    }

    fn is_terminal(step: EditStep) -> bool {
        matches!(step, EditStep::Finished | EditStep::Cancelled)
    }
}

/// Prompt shown on entering a text-input step.
pub fn prompt(step: EditStep) -> &'static str {
    match step {
        EditStep::SearchByName => "Enter the product name, or part of it:",
        EditStep::ChooseProduct => "Several products match. Choose one:",
        EditStep::FieldMenu => "What would you like to change?",
        EditStep::NameEdit => "Enter the new name:",
        EditStep::ShortDescEdit => "Enter the new short description (at least 10 characters):",
        EditStep::AdditionalInfoEdit => {
            "Enter the new additional information, or send \"none\" to clear it:"
        }
        EditStep::CategoryEdit => "Choose the new category:",
        EditStep::SubcategoryEdit => "Choose the new subcategory, or skip:",
        EditStep::ImageMenu => "Manage product images:",
        EditStep::AddImage => "Send a photo or an image URL:",
        EditStep::ListImages { .. } => "Product images:",
        EditStep::DeleteImage => "Choose the image to delete:",
        EditStep::Finished => "Editing finished.",
        EditStep::Cancelled => "Editing cancelled.",
    }
}
