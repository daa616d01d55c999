//! Add-product flow handlers.

use showroom_types::error::{CommitError, ConversationError};
use showroom_types::navigation::FlowAction;
use showroom_types::reply::Reply;
use showroom_types::session::{AddStep, Draft, SessionState};
use tracing::{info, warn};

use super::render::{self, ReplyExt};
use super::{Conversation, Input};
use crate::commit::abort;
use crate::repository::catalog::CatalogRepository;
use crate::session::{SessionStore, new_creation_draft};
use crate::wizard::add::prompt;
use crate::wizard::images::ImageCollectorExt;
use crate::wizard::validate::{
    validate_additional_info, validate_image_url, validate_name, validate_short_description,
};
use crate::wizard::{AddEvent, AddWizard, advance};

impl<R: CatalogRepository, S: SessionStore> Conversation<R, S> {
    pub(super) async fn start_add(&self, user_id: &str) -> Result<Reply, ConversationError> {
        let step = advance::<AddWizard>(AddStep::Start, &AddEvent::Begin)?;
        let draft = new_creation_draft();
        self.store(user_id, SessionState::Adding(step), draft.clone());
        info!(user_id, "add-product flow started");
        self.render_add(step, &draft).await
    }

    pub(super) async fn continue_add(
        &self,
        user_id: &str,
        step: AddStep,
        mut draft: Draft,
        input: Input,
    ) -> Result<Reply, ConversationError> {
        match (step, input) {
            (_, Input::Flow(FlowAction::Cancel)) => {
                advance::<AddWizard>(step, &AddEvent::Cancelled)?;
                abort(self.sessions.as_ref(), user_id);
                Ok(render::admin_menu().with_notice(prompt(AddStep::Aborted)))
            }

            (AddStep::Name, Input::Text(text)) => match validate_name(&text) {
                Ok(name) => {
                    let next = advance::<AddWizard>(step, &AddEvent::NameAccepted)?;
                    draft.name = Some(name);
                    self.move_add(user_id, next, draft).await
                }
                Err(e) => self.reprompt_add(step, &draft, e.to_string()).await,
            },

            (AddStep::Category, Input::Flow(FlowAction::PickCategory(category_id))) => {
                if self.repo.get_category(category_id).await?.is_none() {
                    return self
                        .reprompt_add(step, &draft, "That category no longer exists.")
                        .await;
                }
                let has_subcategories = !self
                    .repo
                    .list_subcategories(category_id)
                    .await?
                    .is_empty();
                let next =
                    advance::<AddWizard>(step, &AddEvent::CategoryChosen { has_subcategories })?;
                draft.category_id = Some(category_id);
                draft.subcategory_id = None;
                self.move_add(user_id, next, draft).await
            }

            (AddStep::Subcategory, Input::Flow(FlowAction::PickSubcategory(subcategory_id))) => {
                let belongs = self
                    .repo
                    .get_subcategory(subcategory_id)
                    .await?
                    .is_some_and(|sub| Some(sub.category_id) == draft.category_id);
                if !belongs {
                    return self
                        .reprompt_add(step, &draft, "That subcategory no longer exists.")
                        .await;
                }
                let next = advance::<AddWizard>(step, &AddEvent::SubcategoryChosen)?;
                draft.subcategory_id = Some(subcategory_id);
                self.move_add(user_id, next, draft).await
            }

            (AddStep::Subcategory, Input::Flow(FlowAction::SkipSubcategory)) => {
                let next = advance::<AddWizard>(step, &AddEvent::SubcategorySkipped)?;
                draft.subcategory_id = None;
                self.move_add(user_id, next, draft).await
            }

            (AddStep::ShortDescription, Input::Text(text)) => {
                match validate_short_description(&text) {
                    Ok(short) => {
                        let next =
                            advance::<AddWizard>(step, &AddEvent::ShortDescriptionAccepted)?;
                        draft.short_description = Some(short);
                        self.move_add(user_id, next, draft).await
                    }
                    Err(e) => self.reprompt_add(step, &draft, e.to_string()).await,
                }
            }

            (AddStep::AdditionalInfo, Input::Text(text)) => match validate_additional_info(&text) {
                Ok(info) => {
                    let next = advance::<AddWizard>(step, &AddEvent::AdditionalInfoAccepted)?;
                    draft.additional_info = Some(info);
                    self.move_add(user_id, next, draft).await
                }
                Err(e) => self.reprompt_add(step, &draft, e.to_string()).await,
            },

            (AddStep::Images, Input::Media(handle)) => {
                self.collect_image(user_id, step, draft, handle).await
            }
            (AddStep::Images, Input::Text(text)) => match validate_image_url(&text) {
                Ok(url) => self.collect_image(user_id, step, draft, url).await,
                Err(e) => self.reprompt_add(step, &draft, e.to_string()).await,
            },
            (AddStep::Images, Input::Flow(FlowAction::ImagesDone)) => {
                if let Err(e) = draft.images.done() {
                    return self.reprompt_add(step, &draft, e.to_string()).await;
                }
                let next = advance::<AddWizard>(step, &AddEvent::ImagesDone)?;
                self.move_add(user_id, next, draft).await
            }

            (AddStep::Confirm, Input::Flow(FlowAction::ConfirmSave)) => {
                advance::<AddWizard>(step, &AddEvent::Confirmed)?;
                match self.committer.commit(&draft).await {
                    Ok(product) => {
                        self.sessions.clear(user_id);
                        info!(user_id, product_id = product.id, "add-product flow committed");
                        Ok(render::admin_menu()
                            .with_notice(format!("Product \"{}\" saved.", product.name)))
                    }
                    Err(CommitError::ValidationFailed(reason)) => {
                        self.reprompt_add(step, &draft, format!("Cannot save yet: {reason}"))
                            .await
                    }
                    Err(CommitError::PlacementInvalid(reason)) => {
                        let next = advance::<AddWizard>(step, &AddEvent::PlacementInvalid)?;
                        draft.category_id = None;
                        draft.subcategory_id = None;
                        warn!(user_id, reason = %reason, "draft placement reset");
                        let reply = self.move_add(user_id, next, draft).await?;
                        Ok(reply.with_notice(
                            "The chosen category is no longer available. Please choose again.",
                        ))
                    }
                    Err(CommitError::Repository(err)) => {
                        warn!(user_id, error = %err, "product commit failed");
                        self.reprompt_add(step, &draft, "Saving failed. Please try again.")
                            .await
                    }
                }
            }

            (
                AddStep::Name | AddStep::ShortDescription | AddStep::AdditionalInfo,
                Input::Media(_),
            ) => self.reprompt_add(step, &draft, "Please send text.").await,
            (
                AddStep::Category | AddStep::Subcategory | AddStep::Confirm,
                Input::Text(_) | Input::Media(_),
            ) => {
                self.reprompt_add(step, &draft, "Please use the buttons below.")
                    .await
            }

            (step, input) => Err(super::unexpected(step, &input)),
        }
    }

    async fn collect_image(
        &self,
        user_id: &str,
        step: AddStep,
        mut draft: Draft,
        reference: String,
    ) -> Result<Reply, ConversationError> {
        let next = advance::<AddWizard>(step, &AddEvent::ImageAdded)?;
        if let Err(e) = draft.images.add(reference) {
            return self.reprompt_add(step, &draft, e.to_string()).await;
        }
        let notice = format!(
            "Image {} of {} added.",
            draft.images.list().len(),
            draft.images.capacity
        );
        self.store(user_id, SessionState::Adding(next), draft.clone());
        Ok(self.render_add(next, &draft).await?.with_notice(notice))
    }

    async fn move_add(
        &self,
        user_id: &str,
        next: AddStep,
        draft: Draft,
    ) -> Result<Reply, ConversationError> {
        self.store(user_id, SessionState::Adding(next), draft.clone());
        self.render_add(next, &draft).await
    }

    async fn reprompt_add(
        &self,
        step: AddStep,
        draft: &Draft,
        notice: impl AsRef<str>,
    ) -> Result<Reply, ConversationError> {
        Ok(self.render_add(step, draft).await?.with_notice(notice))
    }

    /// Screen for an add-product step.
    async fn render_add(&self, step: AddStep, draft: &Draft) -> Result<Reply, ConversationError> {
        let reply = match step {
            AddStep::Category => {
                let categories = self.repo.list_categories().await?;
                render::category_choices(prompt(step), &categories)
            }
            AddStep::Subcategory => {
                let subcategories = match draft.category_id {
                    Some(category_id) => self.repo.list_subcategories(category_id).await?,
                    None => Vec::new(),
                };
                render::subcategory_choices(prompt(step), &subcategories)
            }
            AddStep::Images => {
                let reply = Reply::text(format!(
                    "{}\n\nImages so far: {}",
                    prompt(step),
                    draft.images.list().len()
                ));
                if draft.images.done().is_ok() {
                    reply.with_action("Done", FlowAction::ImagesDone)
                } else {
                    reply
                }
            }
            AddStep::Confirm => {
                let category = match draft.category_id {
                    Some(id) => self.repo.get_category(id).await?.map(|c| c.name),
                    None => None,
                };
                let subcategory = match draft.subcategory_id {
                    Some(id) => self.repo.get_subcategory(id).await?.map(|s| s.name),
                    None => None,
                };
                let card = render::draft_card(draft, category.as_deref(), subcategory.as_deref());
                Reply {
                    text: format!("{}\n\n{}", prompt(step), card.text),
                    ..card
                }
                .with_action("Save", FlowAction::ConfirmSave)
            }
            AddStep::Start
            | AddStep::Name
            | AddStep::ShortDescription
            | AddStep::AdditionalInfo
            | AddStep::Committed
            | AddStep::Aborted => Reply::text(prompt(step)),
        };
        Ok(reply.with_action("Cancel", FlowAction::Cancel))
    }
}
