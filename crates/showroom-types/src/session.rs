//! Conversation session, wizard steps, and draft types.
//!
//! A `Session` is the per-user ephemeral context: which wizard step the
//! user is in and the `Draft` accumulated so far. Lifecycle and mutation
//! logic lives in `showroom-core`; this module only holds the data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{CategoryId, MAX_PRODUCT_IMAGES, ProductId, SubcategoryId};

/// Transport-level user identity.
pub type UserId = String;

/// Steps of the add-product wizard.
///
/// `Start` is the entry point before the first prompt; `Committed` and
/// `Aborted` are terminal and never stored in a live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddStep {
    Start,
    Name,
    Category,
    Subcategory,
    ShortDescription,
    AdditionalInfo,
    Images,
    Confirm,
    Committed,
    Aborted,
}

/// Steps of the edit-product wizard. `FieldMenu` is the hub every leaf
/// returns to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditStep {
    SearchByName,
    ChooseProduct,
    FieldMenu,
    NameEdit,
    ShortDescEdit,
    AdditionalInfoEdit,
    CategoryEdit,
    SubcategoryEdit,
    ImageMenu,
    AddImage,
    ListImages { page: u32 },
    DeleteImage,
    Finished,
    Cancelled,
}

/// Where a user currently is in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No wizard running; browse tokens and commands only.
    #[default]
    Idle,
    Adding(AddStep),
    Editing(EditStep),
}

/// One image held by an `ImageCollector`.
///
/// `key` is collector-local in the add flow and the persisted image id in
/// the edit flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedImage {
    pub key: u64,
    pub reference: String,
}

/// Bounded, insertion-ordered image list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageCollector {
    pub items: Vec<CollectedImage>,
    pub capacity: usize,
    /// Images required before `done()` succeeds.
    pub minimum: usize,
    pub next_key: u64,
}

impl ImageCollector {
    pub fn with_minimum(minimum: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity: MAX_PRODUCT_IMAGES,
            minimum,
            next_key: 1,
        }
    }
}

impl Default for ImageCollector {
    fn default() -> Self {
        Self::with_minimum(0)
    }
}

/// Fields accumulated by a wizard before (or while) touching the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Draft {
    pub name: Option<String>,
    pub short_description: Option<String>,
    pub additional_info: Option<String>,
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<SubcategoryId>,
    pub images: ImageCollector,
    /// Product being edited (edit flow only).
    pub product_id: Option<ProductId>,
    /// Category picked in `CategoryEdit`, waiting for the subcategory choice.
    pub pending_category_id: Option<CategoryId>,
}

/// Per-user conversation context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub state: SessionState,
    pub draft: Draft,
    pub touched_at: DateTime<Utc>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            state: SessionState::Idle,
            draft: Draft::default(),
            touched_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_session_is_idle_and_empty() {
        let session = Session::default();
        assert_eq!(session.state, SessionState::Idle);
        assert_eq!(session.draft, Draft::default());
        assert!(session.draft.images.items.is_empty());
    }

    #[test]
    fn test_collector_defaults() {
        let collector = ImageCollector::with_minimum(1);
        assert_eq!(collector.capacity, 10);
        assert_eq!(collector.minimum, 1);
        assert_eq!(collector.next_key, 1);
    }

    #[test]
    fn test_session_state_serde() {
        let state = SessionState::Editing(EditStep::ListImages { page: 2 });
        let json = serde_json::to_string(&state).unwrap();
        let parsed: SessionState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, state);
    }
}
