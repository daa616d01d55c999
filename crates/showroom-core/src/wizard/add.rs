//! Add-product wizard.
//!
//! Linear with one branch: the subcategory step only appears when the
//! chosen category has subcategories.

use showroom_types::session::AddStep;

use super::Wizard;

/// Inputs that move the add-product wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddEvent {
    Begin,
    NameAccepted,
    CategoryChosen { has_subcategories: bool },
    SubcategoryChosen,
    SubcategorySkipped,
    ShortDescriptionAccepted,
    AdditionalInfoAccepted,
    ImageAdded,
    ImagesDone,
    Confirmed,
    /// Save found the chosen category or subcategory gone.
    PlacementInvalid,
    Cancelled,
}

pub struct AddWizard;

impl Wizard for AddWizard {
    type Step = AddStep;
    type Event = AddEvent;

    fn next(step: AddStep, event: &AddEvent) -> Option<AddStep> {
        use AddEvent as E;
        use AddStep as S;

        let next = match (step, *event) {
            (S::Start, E::Begin) => S::Name,
            (S::Name, E::NameAccepted) => S::Category,
            (
                S::Category,
                E::CategoryChosen {
                    has_subcategories: true,
                },
            ) => S::Subcategory,
            (
                S::Category,
                E::CategoryChosen {
                    has_subcategories: false,
                },
            ) => S::ShortDescription,
            (S::Subcategory, E::SubcategoryChosen | E::SubcategorySkipped) => S::ShortDescription,
            (S::ShortDescription, E::ShortDescriptionAccepted) => S::AdditionalInfo,
            (S::AdditionalInfo, E::AdditionalInfoAccepted) => S::Images,
            (S::Images, E::ImageAdded) => S::Images,
            (S::Images, E::ImagesDone) => S::Confirm,
            (S::Confirm, E::Confirmed) => S::Committed,
            (S::Confirm, E::PlacementInvalid) => S::Category,
            (_, E::Cancelled) => S::Aborted,
            _ => return None,
        };
        Some(next)
    }

    fn is_terminal(step: AddStep) -> bool {
        matches!(step, AddStep::Committed | AddStep::Aborted)
    }
}

/// Prompt shown on entering a text-input step.
pub fn prompt(step: AddStep) -> &'static str {
    match step {
        AddStep::Start | AddStep::Name => "Enter the product name:",
        AddStep::Category => "Choose a category:",
        AddStep::Subcategory => "Choose a subcategory, or skip:",
        AddStep::ShortDescription => "Enter a short description (at least 10 characters):",
        AddStep::AdditionalInfo => {
            "Enter additional information, or send \"none\" to leave it empty:"
        }
        AddStep::Images => {
            "Send product photos or image URLs one at a time (up to 10). Press Done when finished."
        }
        AddStep::Confirm => "Check the product and save it:",
        AddStep::Committed => "Product saved.",
        AddStep::Aborted => "Product creation cancelled.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::advance;

    fn walk(events: &[AddEvent]) -> Result<AddStep, showroom_types::error::IllegalTransition> {
        let mut step = AddStep::Start;
        for event in events {
            step = advance::<AddWizard>(step, event)?;
        }
        Ok(step)
    }

    #[test]
    fn test_full_path_with_subcategory() {
        let step = walk(&[
            AddEvent::Begin,
            AddEvent::NameAccepted,
            AddEvent::CategoryChosen {
                has_subcategories: true,
            },
            AddEvent::SubcategoryChosen,
            AddEvent::ShortDescriptionAccepted,
            AddEvent::AdditionalInfoAccepted,
            AddEvent::ImageAdded,
            AddEvent::ImageAdded,
            AddEvent::ImagesDone,
            AddEvent::Confirmed,
        ])
        .unwrap();
        assert_eq!(step, AddStep::Committed);
    }

    #[test]
    fn test_category_without_subcategories_skips_step() {
        let step = walk(&[
            AddEvent::Begin,
            AddEvent::NameAccepted,
            AddEvent::CategoryChosen {
                has_subcategories: false,
            },
        ])
        .unwrap();
        assert_eq!(step, AddStep::ShortDescription);
    }

    #[test]
    fn test_explicit_subcategory_skip() {
        let step = advance::<AddWizard>(AddStep::Subcategory, &AddEvent::SubcategorySkipped);
        assert_eq!(step, Ok(AddStep::ShortDescription));
    }

    #[test]
    fn test_cancel_from_every_live_step() {
        for step in [
            AddStep::Start,
            AddStep::Name,
            AddStep::Category,
            AddStep::Subcategory,
            AddStep::ShortDescription,
            AddStep::AdditionalInfo,
            AddStep::Images,
            AddStep::Confirm,
        ] {
            assert_eq!(
                advance::<AddWizard>(step, &AddEvent::Cancelled),
                Ok(AddStep::Aborted)
            );
        }
    }

    #[test]
    fn test_invalid_placement_returns_to_category() {
        assert_eq!(
            advance::<AddWizard>(AddStep::Confirm, &AddEvent::PlacementInvalid),
            Ok(AddStep::Category)
        );
        assert!(advance::<AddWizard>(AddStep::Images, &AddEvent::PlacementInvalid).is_err());
    }

    #[test]
    fn test_illegal_pairs_are_rejected() {
        assert!(advance::<AddWizard>(AddStep::Name, &AddEvent::ImagesDone).is_err());
        assert!(advance::<AddWizard>(AddStep::Images, &AddEvent::Confirmed).is_err());
        assert!(advance::<AddWizard>(AddStep::Category, &AddEvent::SubcategorySkipped).is_err());
        let err = advance::<AddWizard>(AddStep::Committed, &AddEvent::Cancelled).unwrap_err();
        assert_eq!(err.step, "Committed");
        assert_eq!(err.event, "Cancelled");
    }
}
