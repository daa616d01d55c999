//! Conversation dispatcher.
//!
//! Every inbound event goes through [`Conversation::handle`], which:
//!
//! 1. Serializes events per user behind an async mutex, so a transport that
//!    duplicates or reorders deliveries cannot interleave two handlers for
//!    the same session.
//! 2. Routes the event by kind and session state to the browse navigator or
//!    one of the wizards.
//! 3. Catches errors and panics at the session boundary. A fault resets that
//!    user's session and answers with a generic notice; other users are
//!    unaffected.

mod add;
mod edit;
mod render;

use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::Duration;
use dashmap::DashMap;
use futures_util::FutureExt;
use showroom_types::config::ShowroomConfig;
use showroom_types::error::{ConversationError, IllegalTransition};
use showroom_types::event::{EventKind, InboundEvent};
use showroom_types::navigation::{ActionToken, FlowAction, Location};
use showroom_types::reply::Reply;
use showroom_types::session::{Draft, Session, SessionState, UserId};
use tokio::sync::Mutex;
use tracing::{Instrument, error, info, info_span, warn};

use crate::commit::{CommitHandler, abort};
use crate::navigation::Navigator;
use crate::navigation::codec::{ROOT_TOKEN, decode_action};
use crate::repository::catalog::CatalogRepository;
use crate::session::SessionStore;

pub(crate) use render::ReplyExt;

/// Notice returned after an internal fault.
pub const GENERIC_FAULT_NOTICE: &str = "Something went wrong. Please start again.";

/// One user input after decoding, ready for a wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Input {
    Text(String),
    Media(String),
    Flow(FlowAction),
}

/// Drives conversations for all users against one catalog and one
/// session store.
pub struct Conversation<R: CatalogRepository, S: SessionStore> {
    repo: Arc<R>,
    sessions: Arc<S>,
    navigator: Navigator<R>,
    committer: CommitHandler<R>,
    admin_ids: HashSet<String>,
    /// Per-user event locks. Entries nobody holds are pruned by `evict_idle`.
    locks: DashMap<UserId, Arc<Mutex<()>>>,
}

impl<R: CatalogRepository, S: SessionStore> Conversation<R, S> {
    pub fn new(repo: Arc<R>, sessions: Arc<S>, config: &ShowroomConfig) -> Self {
        Self {
            navigator: Navigator::new(Arc::clone(&repo)),
            committer: CommitHandler::new(Arc::clone(&repo)),
            repo,
            sessions,
            admin_ids: config.admin_ids.iter().cloned().collect(),
            locks: DashMap::new(),
        }
    }

    /// Whether `user_id` may run the add and edit flows.
    pub fn is_admin(&self, user_id: &str) -> bool {
        self.admin_ids.contains(user_id)
    }

    /// Process one inbound event and return what to show the user.
    ///
    /// Never fails: errors and panics inside the handler are logged, the
    /// user's session is reset, and a generic notice is returned.
    pub async fn handle(&self, event: InboundEvent) -> Reply {
        let user_id = event.user_id.clone();
        let lock = self.user_lock(&user_id);
        let _guard = lock.lock().await;

        let span = info_span!(
            "conversation.event",
            user_id = %user_id,
            kind = event.kind_name(),
        );
        let outcome = AssertUnwindSafe(self.dispatch(event))
            .catch_unwind()
            .instrument(span)
            .await;

        match outcome {
            Ok(Ok(reply)) => reply,
            Ok(Err(ConversationError::IllegalTransition(err))) => {
                warn!(
                    user_id = %user_id,
                    step = %err.step,
                    event = %err.event,
                    "rejected illegal transition"
                );
                self.not_available(&user_id)
            }
            Ok(Err(err)) => {
                error!(user_id = %user_id, error = %err, "conversation handler failed");
                self.reset_after_fault(&user_id)
            }
            Err(_) => {
                error!(user_id = %user_id, "conversation handler panicked");
                self.reset_after_fault(&user_id)
            }
        }
    }

    /// Drop the user's session, waiting for any in-flight event first.
    pub async fn abort(&self, user_id: &str) -> bool {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;
        abort(self.sessions.as_ref(), user_id)
    }

    /// Snapshot of a user's session.
    pub fn session(&self, user_id: &str) -> Option<Session> {
        self.sessions.get(user_id)
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Evict sessions idle longer than `max_idle` and prune unused locks.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let evicted = self.sessions.evict_idle(max_idle);
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        if evicted > 0 {
            info!(evicted, "idle sessions evicted");
        }
        evicted
    }

    fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        self.locks.entry(user_id.to_string()).or_default().clone()
    }

    async fn dispatch(&self, event: InboundEvent) -> Result<Reply, ConversationError> {
        let InboundEvent { user_id, kind } = event;
        let input = match kind {
            EventKind::Text(text) if text.trim_start().starts_with('/') => {
                match self.command(&user_id, text.trim()).await? {
                    Some(reply) => return Ok(reply),
                    None => Input::Flow(FlowAction::Cancel),
                }
            }
            EventKind::Text(text) => Input::Text(text),
            EventKind::Media(handle) => Input::Media(handle),
            EventKind::Action(raw) => match decode_action(&raw) {
                Ok(ActionToken::Nav(token)) => {
                    let location = Location::try_from(token)?;
                    return Ok(self.navigator.show(location).await?);
                }
                Ok(ActionToken::Flow(action)) => Input::Flow(action),
                Err(err) => {
                    warn!(user_id = %user_id, error = %err, "undecodable action; resetting to root");
                    self.sessions.clear(&user_id);
                    return Ok(self
                        .navigator
                        .show(Location::Categories)
                        .await?
                        .with_notice("That button is no longer valid."));
                }
            },
        };

        match input {
            Input::Flow(FlowAction::AdminMenu) => self.admin_entry(&user_id).await,
            Input::Flow(FlowAction::StartAdd) if self.is_admin(&user_id) => {
                self.start_add(&user_id).await
            }
            Input::Flow(FlowAction::StartEdit) if self.is_admin(&user_id) => {
                self.start_edit(&user_id)
            }
            Input::Flow(FlowAction::StartAdd | FlowAction::StartEdit) => {
                self.admin_entry(&user_id).await
            }
            input => {
                let session = self.sessions.get(&user_id).unwrap_or_default();
                match session.state {
                    SessionState::Idle => self.idle(input).await,
                    SessionState::Adding(step) => {
                        self.continue_add(&user_id, step, session.draft, input).await
                    }
                    SessionState::Editing(step) => {
                        self.continue_edit(&user_id, step, session.draft, input)
                            .await
                    }
                }
            }
        }
    }

    /// Slash commands. `/cancel` returns `None` and is routed like the
    /// cancel button.
    async fn command(
        &self,
        user_id: &str,
        command: &str,
    ) -> Result<Option<Reply>, ConversationError> {
        let name = command.split_whitespace().next().unwrap_or_default();
        match name {
            "/start" => {
                abort(self.sessions.as_ref(), user_id);
                let reply = self.navigator.show(Location::Categories).await?;
                Ok(Some(reply.with_notice("Welcome to the showroom!")))
            }
            "/admin" => Ok(Some(self.admin_entry(user_id).await?)),
            "/cancel" => Ok(None),
            "/help" => Ok(Some(
                Reply::text(
                    "/start - browse the catalog\n/admin - admin panel\n/cancel - cancel the current action",
                )
                .with_choice("Catalog", ROOT_TOKEN),
            )),
            other => Ok(Some(
                Reply::text(format!("Unknown command {other}. Send /help for the list."))
                    .with_choice("Catalog", ROOT_TOKEN),
            )),
        }
    }

    /// Admin panel for admins; the catalog root with a notice for everyone
    /// else.
    async fn admin_entry(&self, user_id: &str) -> Result<Reply, ConversationError> {
        if self.is_admin(user_id) {
            abort(self.sessions.as_ref(), user_id);
            Ok(render::admin_menu())
        } else {
            warn!(user_id, "non-admin asked for the admin panel");
            Ok(self
                .navigator
                .show(Location::Categories)
                .await?
                .with_notice("This section is for administrators only."))
        }
    }

    async fn idle(&self, input: Input) -> Result<Reply, ConversationError> {
        match input {
            Input::Flow(FlowAction::Cancel) => Ok(self
                .navigator
                .show(Location::Categories)
                .await?
                .with_notice("Nothing to cancel.")),
            Input::Flow(action) => Err(IllegalTransition {
                step: "Idle".to_string(),
                event: format!("{action:?}"),
            }
            .into()),
            Input::Text(_) | Input::Media(_) => Ok(self
                .navigator
                .show(Location::Categories)
                .await?
                .with_notice("Use the buttons below to browse the catalog.")),
        }
    }

    fn not_available(&self, user_id: &str) -> Reply {
        let reply = Reply::text("That option is not available at this step.");
        match self.sessions.get(user_id).map(|s| s.state) {
            Some(SessionState::Adding(_) | SessionState::Editing(_)) => {
                reply.with_action("Cancel", FlowAction::Cancel)
            }
            _ => reply.with_choice("Catalog", ROOT_TOKEN),
        }
    }

    fn reset_after_fault(&self, user_id: &str) -> Reply {
        self.sessions.clear(user_id);
        Reply::text(GENERIC_FAULT_NOTICE).with_choice("Catalog", ROOT_TOKEN)
    }

    fn store(&self, user_id: &str, state: SessionState, draft: Draft) {
        self.sessions.put(
            user_id,
            Session {
                state,
                draft,
                ..Default::default()
            },
        );
    }
}

/// A wizard received an input its current step has no entry for.
fn unexpected(step: impl std::fmt::Debug, input: &Input) -> ConversationError {
    IllegalTransition {
        step: format!("{step:?}"),
        event: format!("{input:?}"),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::codec::encode_action;
    use crate::session::InMemorySessionStore;
    use crate::testing::InMemoryCatalog;
    use showroom_types::catalog::{
        Category, Image, NewProduct, Product, ProductField, Subcategory,
    };
    use showroom_types::error::RepositoryError;
    use showroom_types::session::AddStep;

    pub(crate) const ADMIN: &str = "1001";

    pub(crate) fn conversation() -> (
        Conversation<InMemoryCatalog, InMemorySessionStore>,
        Arc<InMemoryCatalog>,
    ) {
        let repo = Arc::new(InMemoryCatalog::new());
        let config = ShowroomConfig {
            admin_ids: vec![ADMIN.to_string()],
            ..Default::default()
        };
        let conversation = Conversation::new(
            Arc::clone(&repo),
            Arc::new(InMemorySessionStore::new()),
            &config,
        );
        (conversation, repo)
    }

    pub(crate) fn press(action: FlowAction) -> InboundEvent {
        InboundEvent::action(ADMIN, encode_action(action))
    }

    #[tokio::test]
    async fn test_start_shows_categories() {
        let (conv, repo) = conversation();
        repo.add_category("Beds");
        let reply = conv.handle(InboundEvent::text("5", "/start")).await;
        assert!(reply.text.starts_with("Welcome to the showroom!"));
        assert_eq!(reply.options[0].label, "Beds");
    }

    #[tokio::test]
    async fn test_invalid_token_resets_to_root() {
        let (conv, repo) = conversation();
        repo.add_category("Beds");
        conv.handle(press(FlowAction::StartAdd)).await;
        let reply = conv.handle(InboundEvent::action(ADMIN, "n:q:1")).await;
        assert!(reply.text.starts_with("That button is no longer valid."));
        assert!(reply.text.ends_with("Choose a category:"));
        assert!(conv.session(ADMIN).is_none());
    }

    #[tokio::test]
    async fn test_non_admin_cannot_start_flows() {
        let (conv, _repo) = conversation();
        let reply = conv
            .handle(InboundEvent::action("42", encode_action(FlowAction::StartAdd)))
            .await;
        assert!(reply.text.starts_with("This section is for administrators only."));
        assert!(conv.session("42").is_none());
    }

    #[test]
    fn test_admin_membership_comes_from_config() {
        let (conv, _repo) = conversation();
        assert!(conv.is_admin(ADMIN));
        assert!(!conv.is_admin("42"));
        assert!(!conv.is_admin(""));
    }

    #[tokio::test]
    async fn test_illegal_action_keeps_session() {
        let (conv, _repo) = conversation();
        conv.handle(press(FlowAction::StartAdd)).await;
        let reply = conv.handle(press(FlowAction::ConfirmSave)).await;
        assert_eq!(reply.text, "That option is not available at this step.");
        assert_eq!(
            conv.session(ADMIN).unwrap().state,
            SessionState::Adding(AddStep::Name)
        );
    }

    #[tokio::test]
    async fn test_idle_flow_action_is_rejected() {
        let (conv, _repo) = conversation();
        let reply = conv.handle(press(FlowAction::ImagesDone)).await;
        assert_eq!(reply.text, "That option is not available at this step.");
        assert_eq!(reply.options[0].action, ROOT_TOKEN);
    }

    #[tokio::test]
    async fn test_cancel_command_matches_cancel_button() {
        let (conv, _repo) = conversation();
        conv.handle(press(FlowAction::StartAdd)).await;
        conv.handle(InboundEvent::text(ADMIN, "/cancel")).await;
        assert!(conv.session(ADMIN).is_none());
        let reply = conv.handle(InboundEvent::text(ADMIN, "/cancel")).await;
        assert!(reply.text.starts_with("Nothing to cancel."));
    }

    #[tokio::test]
    async fn test_abort_is_idempotent() {
        let (conv, _repo) = conversation();
        conv.handle(press(FlowAction::StartEdit)).await;
        assert!(conv.abort(ADMIN).await);
        assert!(!conv.abort(ADMIN).await);
    }

    #[tokio::test]
    async fn test_evict_idle_prunes_locks() {
        let (conv, _repo) = conversation();
        conv.handle(press(FlowAction::StartAdd)).await;
        assert_eq!(conv.locks.len(), 1);
        assert_eq!(conv.evict_idle(Duration::minutes(30)), 0);
        assert!(conv.locks.is_empty());
        assert_eq!(conv.active_sessions(), 1);
    }

    /// A repository whose reads panic, to exercise the session boundary.
    struct PanickingCatalog;

    impl CatalogRepository for PanickingCatalog {
        async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
            panic!("storage exploded")
        }
        async fn get_category(&self, _id: i64) -> Result<Option<Category>, RepositoryError> {
            panic!("storage exploded")
        }
        async fn list_subcategories(&self, _id: i64) -> Result<Vec<Subcategory>, RepositoryError> {
            panic!("storage exploded")
        }
        async fn get_subcategory(&self, _id: i64) -> Result<Option<Subcategory>, RepositoryError> {
            panic!("storage exploded")
        }
        async fn list_products(&self, _id: i64) -> Result<Vec<Product>, RepositoryError> {
            panic!("storage exploded")
        }
        async fn list_products_by_category_only(
            &self,
            _id: i64,
        ) -> Result<Vec<Product>, RepositoryError> {
            panic!("storage exploded")
        }
        async fn get_product(&self, _id: i64) -> Result<Option<Product>, RepositoryError> {
            panic!("storage exploded")
        }
        async fn search_products_by_name(
            &self,
            _term: &str,
            _limit: u32,
        ) -> Result<Vec<Product>, RepositoryError> {
            panic!("storage exploded")
        }
        async fn list_all_products(&self, _limit: u32) -> Result<Vec<Product>, RepositoryError> {
            panic!("storage exploded")
        }
        async fn create_product(&self, _product: &NewProduct) -> Result<Product, RepositoryError> {
            panic!("storage exploded")
        }
        async fn update_product_field(
            &self,
            _id: i64,
            _field: &ProductField,
        ) -> Result<(), RepositoryError> {
            panic!("storage exploded")
        }
        async fn add_image(&self, _id: i64, _reference: &str) -> Result<Image, RepositoryError> {
            panic!("storage exploded")
        }
        async fn delete_image(&self, _id: i64) -> Result<(), RepositoryError> {
            panic!("storage exploded")
        }
        async fn list_images(&self, _id: i64) -> Result<Vec<Image>, RepositoryError> {
            panic!("storage exploded")
        }
        async fn create_category(&self, _name: &str) -> Result<Category, RepositoryError> {
            panic!("storage exploded")
        }
        async fn create_subcategory(
            &self,
            _id: i64,
            _name: &str,
        ) -> Result<Subcategory, RepositoryError> {
            panic!("storage exploded")
        }
        async fn delete_product(&self, _id: i64) -> Result<(), RepositoryError> {
            panic!("storage exploded")
        }
    }

    #[tokio::test]
    async fn test_panic_is_contained_to_one_session() {
        let sessions = Arc::new(InMemorySessionStore::new());
        let config = ShowroomConfig {
            admin_ids: vec![ADMIN.to_string()],
            ..Default::default()
        };
        let conv = Conversation::new(Arc::new(PanickingCatalog), Arc::clone(&sessions), &config);

        sessions.update("bystander", |s| {
            s.state = SessionState::Adding(AddStep::Name);
        });

        conv.handle(press(FlowAction::StartEdit)).await;
        let reply = conv.handle(InboundEvent::text(ADMIN, "oslo")).await;
        assert_eq!(reply.text, GENERIC_FAULT_NOTICE);
        assert!(conv.session(ADMIN).is_none());
        assert_eq!(
            conv.session("bystander").unwrap().state,
            SessionState::Adding(AddStep::Name)
        );

        // The same user can keep talking after the fault.
        let reply = conv.handle(press(FlowAction::StartEdit)).await;
        assert!(reply.text.contains("Enter the product name"));
    }
}
