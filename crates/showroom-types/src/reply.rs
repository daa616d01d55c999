//! Outbound render instructions.
//!
//! The core never formats platform markup. A `Reply` is plain text, a list
//! of labeled choices each carrying an encoded action token, and optional
//! media to attach.

use serde::{Deserialize, Serialize};

use crate::catalog::is_url;

/// A labeled button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub label: String,
    /// Encoded navigation token or flow action, echoed back verbatim by the
    /// transport when pressed.
    pub action: String,
}

/// How the presentation layer should attach an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "as", content = "reference", rename_all = "snake_case")]
pub enum MediaPlan {
    Photo(String),
    Document(String),
    /// Give up on the image and send text only.
    TextOnly,
}

impl MediaPlan {
    /// First attempt for a stored image reference. URLs and transport
    /// handles both start as a photo.
    pub fn for_reference(reference: &str) -> Self {
        MediaPlan::Photo(reference.to_string())
    }

    /// Next attempt after the presentation layer reported `failure`.
    ///
    /// A handle refused as a photo is retried as a document. Anything else
    /// degrades to text only, which is terminal.
    pub fn fallback(&self, failure: MediaFailure) -> MediaPlan {
        match (self, failure) {
            (MediaPlan::Photo(reference), MediaFailure::WrongType) if !is_url(reference) => {
                MediaPlan::Document(reference.clone())
            }
            (MediaPlan::Photo(_), MediaFailure::WrongType) => MediaPlan::TextOnly,
            (MediaPlan::Document(_), MediaFailure::WrongType) => MediaPlan::TextOnly,
            (_, MediaFailure::Unreachable) => MediaPlan::TextOnly,
            (MediaPlan::TextOnly, MediaFailure::WrongType) => MediaPlan::TextOnly,
        }
    }

    pub fn reference(&self) -> Option<&str> {
        match self {
            MediaPlan::Photo(r) | MediaPlan::Document(r) => Some(r),
            MediaPlan::TextOnly => None,
        }
    }
}

/// Why the presentation layer could not deliver a `MediaPlan`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaFailure {
    /// The surface refused the reference for this presentation kind.
    WrongType,
    /// The reference could not be fetched at all.
    Unreachable,
}

/// One render instruction for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaPlan>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_choice(mut self, label: impl Into<String>, action: impl Into<String>) -> Self {
        self.options.push(Choice {
            label: label.into(),
            action: action.into(),
        });
        self
    }

    pub fn with_media(mut self, plan: MediaPlan) -> Self {
        self.media = Some(plan);
        self
    }

    /// Prefix the text with a notice line (errors, confirmations).
    pub fn with_notice(mut self, notice: impl AsRef<str>) -> Self {
        self.text = format!("{}\n\n{}", notice.as_ref(), self.text);
        self
    }
}
