//! Edit-product flow handlers.
//!
//! Each accepted field is written immediately as its own update; the
//! draft only mirrors the persisted product between events.

use showroom_types::catalog::{Product, ProductField, SEARCH_LIMIT};
use showroom_types::error::{ConversationError, RepositoryError};
use showroom_types::navigation::FlowAction;
use showroom_types::reply::Reply;
use showroom_types::session::{Draft, EditStep, SessionState};
use tracing::{info, warn};

use super::render::{self, ReplyExt};
use super::{Conversation, Input, unexpected};
use crate::commit::abort;
use crate::repository::catalog::CatalogRepository;
use crate::session::{SessionStore, new_edit_draft};
use crate::wizard::edit::{FALLBACK_LISTING_LIMIT, prompt};
use crate::wizard::images::ImageCollectorExt;
use crate::wizard::validate::{
    validate_additional_info, validate_image_url, validate_name, validate_search_query,
    validate_short_description,
};
use crate::wizard::{EditEvent, EditWizard, advance};

fn search_prompt() -> Reply {
    Reply::text(prompt(EditStep::SearchByName))
        .with_action("Show all products", FlowAction::ShowAll)
        .with_action("Cancel", FlowAction::Cancel)
}

fn field_prompt(step: EditStep, product: &Product) -> Reply {
    let current = match step {
        EditStep::NameEdit => product.name.as_str(),
        EditStep::ShortDescEdit => product.short_description.as_str(),
        _ if product.additional_info.is_empty() => "(empty)",
        _ => product.additional_info.as_str(),
    };
    Reply::text(format!("Current value: {current}\n\n{}", prompt(step)))
        .with_action("« Back", FlowAction::BackToMenu)
        .with_action("Cancel", FlowAction::Cancel)
}

fn saved_notice(field: &ProductField) -> &'static str {
    match field {
        ProductField::Name(_) => "Name updated.",
        ProductField::ShortDescription(_) => "Short description updated.",
        ProductField::AdditionalInfo(_) => "Additional info updated.",
        ProductField::Placement { .. } => "Category updated.",
    }
}

impl<R: CatalogRepository, S: SessionStore> Conversation<R, S> {
    pub(super) fn start_edit(&self, user_id: &str) -> Result<Reply, ConversationError> {
        self.store(
            user_id,
            SessionState::Editing(EditStep::SearchByName),
            Draft::default(),
        );
        info!(user_id, "edit-product flow started");
        Ok(search_prompt())
    }

    pub(super) async fn continue_edit(
        &self,
        user_id: &str,
        step: EditStep,
        mut draft: Draft,
        input: Input,
    ) -> Result<Reply, ConversationError> {
        use EditStep as Step;
        use FlowAction as A;

        match (step, input) {
            (_, Input::Flow(A::Cancel)) => {
                advance::<EditWizard>(step, &EditEvent::Cancelled)?;
                abort(self.sessions.as_ref(), user_id);
                Ok(render::admin_menu()
                    .with_notice("Editing cancelled. Changes already saved are kept."))
            }

            // Search and selection
            (Step::SearchByName | Step::ChooseProduct, Input::Text(query)) => {
                self.search(user_id, step, &query).await
            }
            (Step::SearchByName, Input::Flow(A::ShowAll)) => {
                let next = advance::<EditWizard>(step, &EditEvent::ShowAll)?;
                self.store(user_id, SessionState::Editing(next), Draft::default());
                self.catalog_listing("Products in the catalog:".to_string())
                    .await
            }
            (Step::SearchByName | Step::ChooseProduct, Input::Flow(A::PickProduct(product_id))) => {
                match self.repo.get_product(product_id).await? {
                    Some(product) => {
                        self.select(user_id, step, EditEvent::ProductPicked, &product)
                    }
                    None => self.product_lost(user_id, step).await,
                }
            }
            (Step::ChooseProduct | Step::FieldMenu, Input::Flow(A::NewSearch)) => {
                let next = advance::<EditWizard>(step, &EditEvent::NewSearch)?;
                self.store(user_id, SessionState::Editing(next), Draft::default());
                Ok(search_prompt())
            }

            // Field menu
            (Step::FieldMenu, Input::Flow(A::EditName)) => {
                self.open(user_id, step, draft, EditEvent::OpenName).await
            }
            (Step::FieldMenu, Input::Flow(A::EditShortDescription)) => {
                self.open(user_id, step, draft, EditEvent::OpenShortDescription)
                    .await
            }
            (Step::FieldMenu, Input::Flow(A::EditAdditionalInfo)) => {
                self.open(user_id, step, draft, EditEvent::OpenAdditionalInfo)
                    .await
            }
            (Step::FieldMenu, Input::Flow(A::EditCategory)) => {
                draft.pending_category_id = None;
                self.open(user_id, step, draft, EditEvent::OpenCategory).await
            }
            (Step::FieldMenu, Input::Flow(A::EditImages)) => {
                if !self.refresh_images(&mut draft).await? {
                    return self.product_lost(user_id, step).await;
                }
                self.open(user_id, step, draft, EditEvent::OpenImages).await
            }
            (Step::FieldMenu, Input::Flow(A::ViewProduct)) => {
                self.open(user_id, step, draft, EditEvent::ViewProduct).await
            }
            (Step::FieldMenu, Input::Flow(A::FinishEdit)) => {
                advance::<EditWizard>(step, &EditEvent::Finish)?;
                self.sessions.clear(user_id);
                info!(user_id, product_id = ?draft.product_id, "edit-product flow finished");
                Ok(render::admin_menu().with_notice(prompt(Step::Finished)))
            }

            // Field leaves
            (Step::NameEdit, Input::Text(text)) => match validate_name(&text) {
                Ok(name) => {
                    self.save_field(user_id, step, draft, ProductField::Name(name))
                        .await
                }
                Err(e) => self.reprompt_edit(user_id, step, draft, e.to_string()).await,
            },
            (Step::ShortDescEdit, Input::Text(text)) => match validate_short_description(&text) {
                Ok(short) => {
                    self.save_field(user_id, step, draft, ProductField::ShortDescription(short))
                        .await
                }
                Err(e) => self.reprompt_edit(user_id, step, draft, e.to_string()).await,
            },
            (Step::AdditionalInfoEdit, Input::Text(text)) => match validate_additional_info(&text) {
                Ok(info) => {
                    self.save_field(user_id, step, draft, ProductField::AdditionalInfo(info))
                        .await
                }
                Err(e) => self.reprompt_edit(user_id, step, draft, e.to_string()).await,
            },
            (Step::CategoryEdit, Input::Flow(A::PickCategory(category_id))) => {
                if self.repo.get_category(category_id).await?.is_none() {
                    return self
                        .reprompt_edit(user_id, step, draft, "That category no longer exists.")
                        .await;
                }
                let subcategories = self.repo.list_subcategories(category_id).await?;
                let next = advance::<EditWizard>(step, &EditEvent::CategoryPicked)?;
                draft.pending_category_id = Some(category_id);
                if subcategories.is_empty() {
                    let placement = ProductField::Placement {
                        category_id,
                        subcategory_id: None,
                    };
                    return self.save_field(user_id, next, draft, placement).await;
                }
                self.move_edit(user_id, next, draft).await
            }
            (Step::SubcategoryEdit, Input::Flow(A::PickSubcategory(subcategory_id))) => {
                let Some(category_id) = draft.pending_category_id else {
                    let input = Input::Flow(A::PickSubcategory(subcategory_id));
                    return Err(unexpected(step, &input));
                };
                let belongs = self
                    .repo
                    .get_subcategory(subcategory_id)
                    .await?
                    .is_some_and(|sub| sub.category_id == category_id);
                if !belongs {
                    return self
                        .reprompt_edit(user_id, step, draft, "That subcategory no longer exists.")
                        .await;
                }
                let placement = ProductField::Placement {
                    category_id,
                    subcategory_id: Some(subcategory_id),
                };
                self.save_field(user_id, step, draft, placement).await
            }
            (Step::SubcategoryEdit, Input::Flow(A::SkipSubcategory)) => {
                let Some(category_id) = draft.pending_category_id else {
                    return Err(unexpected(step, &Input::Flow(A::SkipSubcategory)));
                };
                let placement = ProductField::Placement {
                    category_id,
                    subcategory_id: None,
                };
                self.save_field(user_id, step, draft, placement).await
            }
            (
                Step::NameEdit
                | Step::ShortDescEdit
                | Step::AdditionalInfoEdit
                | Step::CategoryEdit
                | Step::SubcategoryEdit
                | Step::ImageMenu,
                Input::Flow(A::BackToMenu),
            ) => {
                let next = advance::<EditWizard>(step, &EditEvent::BackToMenu)?;
                draft.pending_category_id = None;
                self.move_edit(user_id, next, draft).await
            }

            // Images
            (Step::ImageMenu, Input::Flow(A::AddImage)) => {
                if !self.refresh_images(&mut draft).await? {
                    return self.product_lost(user_id, step).await;
                }
                if let Err(e) = draft.images.ensure_room() {
                    return self.reprompt_edit(user_id, step, draft, e.to_string()).await;
                }
                let next = advance::<EditWizard>(step, &EditEvent::OpenAddImage)?;
                self.move_edit(user_id, next, draft).await
            }
            (Step::AddImage, Input::Media(handle)) => {
                self.attach_image(user_id, step, draft, handle).await
            }
            (Step::AddImage, Input::Text(text)) => match validate_image_url(&text) {
                Ok(url) => self.attach_image(user_id, step, draft, url).await,
                Err(e) => self.reprompt_edit(user_id, step, draft, e.to_string()).await,
            },
            (Step::ImageMenu | Step::ListImages { .. }, Input::Flow(A::ListImages(page))) => {
                if !self.refresh_images(&mut draft).await? {
                    return self.product_lost(user_id, step).await;
                }
                if draft.images.list().is_empty() {
                    let next = match step {
                        Step::ImageMenu => step,
                        _ => advance::<EditWizard>(step, &EditEvent::BackToImages)?,
                    };
                    return self
                        .reprompt_edit(user_id, next, draft, "This product has no images yet.")
                        .await;
                }
                let page = page.min(draft.images.page_count().saturating_sub(1));
                let next = advance::<EditWizard>(step, &EditEvent::OpenImageList { page })?;
                self.move_edit(user_id, next, draft).await
            }
            (Step::ImageMenu, Input::Flow(A::DeleteImageMenu)) => {
                if !self.refresh_images(&mut draft).await? {
                    return self.product_lost(user_id, step).await;
                }
                if draft.images.list().is_empty() {
                    return self
                        .reprompt_edit(user_id, step, draft, "This product has no images yet.")
                        .await;
                }
                let next = advance::<EditWizard>(step, &EditEvent::OpenDeleteImage)?;
                self.move_edit(user_id, next, draft).await
            }
            (Step::DeleteImage, Input::Flow(A::DeleteImage(image_id))) => {
                self.delete_image(user_id, step, draft, image_id).await
            }
            (Step::AddImage | Step::ListImages { .. } | Step::DeleteImage, Input::Flow(A::BackToImages)) => {
                if !self.refresh_images(&mut draft).await? {
                    return self.product_lost(user_id, step).await;
                }
                let next = advance::<EditWizard>(step, &EditEvent::BackToImages)?;
                self.move_edit(user_id, next, draft).await
            }

            (Step::NameEdit | Step::ShortDescEdit | Step::AdditionalInfoEdit, Input::Media(_)) => {
                self.reprompt_edit(user_id, step, draft, "Please send text.")
                    .await
            }
            (
                Step::FieldMenu
                | Step::CategoryEdit
                | Step::SubcategoryEdit
                | Step::ImageMenu
                | Step::ListImages { .. }
                | Step::DeleteImage,
                Input::Text(_) | Input::Media(_),
            ) => {
                self.reprompt_edit(user_id, step, draft, "Please use the buttons below.")
                    .await
            }
            (Step::SearchByName | Step::ChooseProduct, Input::Media(_)) => {
                self.reprompt_edit(user_id, step, draft, "Please send the product name as text.")
                    .await
            }

            (step, input) => Err(unexpected(step, &input)),
        }
    }

    async fn search(
        &self,
        user_id: &str,
        step: EditStep,
        raw: &str,
    ) -> Result<Reply, ConversationError> {
        let query = match validate_search_query(raw) {
            Ok(query) => query,
            Err(e) => return Ok(search_prompt().with_notice(e.to_string())),
        };
        let step = match step {
            EditStep::ChooseProduct => advance::<EditWizard>(step, &EditEvent::NewSearch)?,
            _ => step,
        };

        let found = self
            .repo
            .search_products_by_name(&query, SEARCH_LIMIT)
            .await?;
        let event = EditEvent::Searched {
            matches: found.len(),
        };
        info!(user_id, query = %query, matches = found.len(), "product search");

        match found.as_slice() {
            [only] => self.select(user_id, step, event, only),
            [] => {
                let next = advance::<EditWizard>(step, &event)?;
                self.store(user_id, SessionState::Editing(next), Draft::default());
                self.catalog_listing(format!(
                    "Nothing matches \"{query}\". Products in the catalog:"
                ))
                .await
            }
            many => {
                let next = advance::<EditWizard>(step, &event)?;
                self.store(user_id, SessionState::Editing(next), Draft::default());
                Ok(render::product_choices(
                    format!("Found {} products. {}", many.len(), prompt(next)),
                    many,
                )
                .with_action("New search", FlowAction::NewSearch)
                .with_action("Cancel", FlowAction::Cancel))
            }
        }
    }

    /// Bounded whole-catalog listing. The session stays in `SearchByName`,
    /// so the user can pick from it or type another query.
    async fn catalog_listing(&self, title: String) -> Result<Reply, ConversationError> {
        let products = self.repo.list_all_products(FALLBACK_LISTING_LIMIT).await?;
        if products.is_empty() {
            return Ok(search_prompt().with_notice("The catalog has no products yet."));
        }
        Ok(render::product_choices(title, &products).with_action("Cancel", FlowAction::Cancel))
    }

    fn select(
        &self,
        user_id: &str,
        step: EditStep,
        event: EditEvent,
        product: &Product,
    ) -> Result<Reply, ConversationError> {
        let next = advance::<EditWizard>(step, &event)?;
        self.store(user_id, SessionState::Editing(next), new_edit_draft(product));
        info!(user_id, product_id = product.id, "product selected for editing");
        Ok(render::field_menu(product))
    }

    async fn open(
        &self,
        user_id: &str,
        step: EditStep,
        draft: Draft,
        event: EditEvent,
    ) -> Result<Reply, ConversationError> {
        let next = advance::<EditWizard>(step, &event)?;
        self.move_edit(user_id, next, draft).await
    }

    async fn save_field(
        &self,
        user_id: &str,
        step: EditStep,
        draft: Draft,
        field: ProductField,
    ) -> Result<Reply, ConversationError> {
        let Some(product_id) = draft.product_id else {
            return self.product_lost(user_id, step).await;
        };
        let next = advance::<EditWizard>(step, &EditEvent::FieldSaved)?;

        match self.repo.update_product_field(product_id, &field).await {
            Ok(()) => {
                info!(user_id, product_id, field = field.label(), "product field updated");
                match self.repo.get_product(product_id).await? {
                    Some(product) => {
                        self.store(user_id, SessionState::Editing(next), new_edit_draft(&product));
                        Ok(render::field_menu(&product).with_notice(saved_notice(&field)))
                    }
                    None => self.product_lost(user_id, next).await,
                }
            }
            Err(RepositoryError::NotFound) => self.product_lost(user_id, step).await,
            Err(err) => {
                warn!(user_id, product_id, error = %err, "product field update failed");
                self.reprompt_edit(user_id, step, draft, "Saving failed. Please try again.")
                    .await
            }
        }
    }

    async fn attach_image(
        &self,
        user_id: &str,
        step: EditStep,
        mut draft: Draft,
        reference: String,
    ) -> Result<Reply, ConversationError> {
        if !self.refresh_images(&mut draft).await? {
            return self.product_lost(user_id, step).await;
        }
        let Some(product_id) = draft.product_id else {
            return self.product_lost(user_id, step).await;
        };
        if let Err(e) = draft.images.ensure_room() {
            return self.reprompt_edit(user_id, step, draft, e.to_string()).await;
        }
        let next = advance::<EditWizard>(step, &EditEvent::ImageAdded)?;

        match self.repo.add_image(product_id, &reference).await {
            Ok(image) => {
                info!(user_id, product_id, image_id = image.id, "image added");
                if let Err(e) = draft.images.insert_keyed(image.id as u64, image.reference) {
                    return self.reprompt_edit(user_id, next, draft, e.to_string()).await;
                }
                self.reprompt_edit(user_id, next, draft, "Image added.").await
            }
            Err(RepositoryError::NotFound) => self.product_lost(user_id, step).await,
            Err(err) => {
                warn!(user_id, product_id, error = %err, "adding image failed");
                self.reprompt_edit(user_id, step, draft, "Saving failed. Please try again.")
                    .await
            }
        }
    }

    async fn delete_image(
        &self,
        user_id: &str,
        step: EditStep,
        mut draft: Draft,
        image_id: i64,
    ) -> Result<Reply, ConversationError> {
        if !self.refresh_images(&mut draft).await? {
            return self.product_lost(user_id, step).await;
        }
        let before = draft.images.clone();
        // The refreshed collector only holds this product's images.
        if draft.images.remove(image_id as u64).is_err() {
            return self
                .reprompt_edit(user_id, step, draft, "That image no longer exists.")
                .await;
        }
        let next = advance::<EditWizard>(step, &EditEvent::ImageDeleted)?;

        match self.repo.delete_image(image_id).await {
            Ok(()) => {
                info!(user_id, product_id = ?draft.product_id, image_id, "image deleted");
                self.reprompt_edit(user_id, next, draft, "Image deleted.").await
            }
            Err(RepositoryError::NotFound) => {
                self.reprompt_edit(user_id, step, draft, "That image no longer exists.")
                    .await
            }
            Err(err) => {
                warn!(user_id, image_id, error = %err, "deleting image failed");
                draft.images = before;
                self.reprompt_edit(user_id, step, draft, "Deleting failed. Please try again.")
                    .await
            }
        }
    }

    /// Reload the collector from the persisted images. `false` when the
    /// product is gone.
    async fn refresh_images(&self, draft: &mut Draft) -> Result<bool, ConversationError> {
        match self.edited_product(draft).await? {
            Some(product) => {
                draft.images = new_edit_draft(&product).images;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn edited_product(&self, draft: &Draft) -> Result<Option<Product>, ConversationError> {
        match draft.product_id {
            Some(id) => Ok(self.repo.get_product(id).await?),
            None => Ok(None),
        }
    }

    async fn product_lost(
        &self,
        user_id: &str,
        step: EditStep,
    ) -> Result<Reply, ConversationError> {
        let next = advance::<EditWizard>(step, &EditEvent::ProductLost)?;
        warn!(user_id, step = ?step, "edited product no longer exists");
        self.store(user_id, SessionState::Editing(next), Draft::default());
        Ok(search_prompt().with_notice("That product no longer exists."))
    }

    async fn move_edit(
        &self,
        user_id: &str,
        next: EditStep,
        draft: Draft,
    ) -> Result<Reply, ConversationError> {
        self.reprompt_edit(user_id, next, draft, "").await
    }

    /// Store `(step, draft)` and render that step, prefixed by `notice`
    /// unless it is empty.
    async fn reprompt_edit(
        &self,
        user_id: &str,
        step: EditStep,
        draft: Draft,
        notice: impl AsRef<str>,
    ) -> Result<Reply, ConversationError> {
        let reply = match step {
            EditStep::SearchByName | EditStep::ChooseProduct => search_prompt(),
            EditStep::FieldMenu
            | EditStep::NameEdit
            | EditStep::ShortDescEdit
            | EditStep::AdditionalInfoEdit => match self.edited_product(&draft).await? {
                Some(product) if step == EditStep::FieldMenu => render::field_menu(&product),
                Some(product) => field_prompt(step, &product),
                None => return self.product_lost(user_id, step).await,
            },
            EditStep::CategoryEdit => {
                let categories = self.repo.list_categories().await?;
                render::category_choices(prompt(step), &categories)
                    .with_action("« Back", FlowAction::BackToMenu)
                    .with_action("Cancel", FlowAction::Cancel)
            }
            EditStep::SubcategoryEdit => {
                let subcategories = match draft.pending_category_id {
                    Some(category_id) => self.repo.list_subcategories(category_id).await?,
                    None => Vec::new(),
                };
                render::subcategory_choices(prompt(step), &subcategories)
                    .with_action("« Back", FlowAction::BackToMenu)
                    .with_action("Cancel", FlowAction::Cancel)
            }
            EditStep::ImageMenu => render::image_menu(&draft.images),
            EditStep::AddImage => Reply::text(prompt(step))
                .with_action("« Back", FlowAction::BackToImages)
                .with_action("Cancel", FlowAction::Cancel),
            EditStep::ListImages { page } => render::image_page(&draft.images, page),
            EditStep::DeleteImage => render::delete_menu(&draft.images),
            EditStep::Finished | EditStep::Cancelled => Reply::text(prompt(step)),
        };

        self.store(user_id, SessionState::Editing(step), draft);
        let notice = notice.as_ref();
        Ok(if notice.is_empty() {
            reply
        } else {
            reply.with_notice(notice)
        })
    }
}
