//! Inbound transport events.
//!
//! Every user interaction reaches the core as one `InboundEvent`: free
//! text, a media upload (carried as an opaque handle), or the action token
//! attached to a button the user pressed.

use serde::{Deserialize, Serialize};

use crate::session::UserId;

/// Payload of an inbound event, tagged by kind.
///
/// Serialized as `{"kind": "text", "payload": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum EventKind {
    Text(String),
    /// Opaque media handle issued by the transport.
    Media(String),
    /// Encoded navigation token or flow action.
    Action(String),
}

/// One user interaction delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub user_id: UserId,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl InboundEvent {
    pub fn text(user_id: impl Into<UserId>, text: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            kind: EventKind::Text(text.into()),
        }
    }

    pub fn media(user_id: impl Into<UserId>, handle: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            kind: EventKind::Media(handle.into()),
        }
    }

    pub fn action(user_id: impl Into<UserId>, token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            kind: EventKind::Action(token.into()),
        }
    }

    /// Kind name for logging.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            EventKind::Text(_) => "text",
            EventKind::Media(_) => "media",
            EventKind::Action(_) => "action",
        }
    }
}
