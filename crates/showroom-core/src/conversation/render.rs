//! Screens shared by the admin flows.

use showroom_types::catalog::{Category, Product, Subcategory};
use showroom_types::navigation::FlowAction;
use showroom_types::reply::{MediaPlan, Reply};
use showroom_types::session::{Draft, ImageCollector};

use crate::navigation::codec::{ROOT_TOKEN, encode_action};
use crate::navigation::product_card;
use crate::wizard::images::ImageCollectorExt;

pub(crate) trait ReplyExt {
    /// Add a button carrying a flow action.
    fn with_action(self, label: impl Into<String>, action: FlowAction) -> Self;
}

impl ReplyExt for Reply {
    fn with_action(self, label: impl Into<String>, action: FlowAction) -> Self {
        self.with_choice(label, encode_action(action))
    }
}

pub(crate) fn admin_menu() -> Reply {
    Reply::text("Admin panel")
        .with_action("Add product", FlowAction::StartAdd)
        .with_action("Edit product", FlowAction::StartEdit)
        .with_choice("Browse catalog", ROOT_TOKEN)
}

pub(crate) fn category_choices(prompt: &str, categories: &[Category]) -> Reply {
    if categories.is_empty() {
        return Reply::text("There are no categories yet. Seed the catalog first.");
    }
    categories.iter().fold(Reply::text(prompt), |reply, c| {
        reply.with_action(c.name.clone(), FlowAction::PickCategory(c.id))
    })
}

pub(crate) fn subcategory_choices(prompt: &str, subcategories: &[Subcategory]) -> Reply {
    subcategories
        .iter()
        .fold(Reply::text(prompt), |reply, s| {
            reply.with_action(s.name.clone(), FlowAction::PickSubcategory(s.id))
        })
        .with_action("Skip", FlowAction::SkipSubcategory)
}

pub(crate) fn product_choices(text: String, products: &[Product]) -> Reply {
    products.iter().fold(Reply::text(text), |reply, p| {
        reply.with_action(p.name.clone(), FlowAction::PickProduct(p.id))
    })
}

/// Summary of an add-product draft before saving.
pub(crate) fn draft_card(draft: &Draft, category: Option<&str>, subcategory: Option<&str>) -> Reply {
    let mut text = format!(
        "{}\n\n{}",
        draft.name.as_deref().unwrap_or_default(),
        draft.short_description.as_deref().unwrap_or_default()
    );
    if let Some(info) = draft.additional_info.as_deref().filter(|i| !i.is_empty()) {
        text.push_str(&format!("\n\n{info}"));
    }
    match (category, subcategory) {
        (Some(c), Some(s)) => text.push_str(&format!("\n\nCategory: {c} / {s}")),
        (Some(c), None) => text.push_str(&format!("\n\nCategory: {c}")),
        _ => {}
    }
    text.push_str(&format!("\nImages: {}", draft.images.list().len()));

    let reply = Reply::text(text);
    match draft.images.list().first() {
        Some(first) => reply.with_media(MediaPlan::for_reference(&first.reference)),
        None => reply,
    }
}

/// The edit hub for one product.
pub(crate) fn field_menu(product: &Product) -> Reply {
    let mut reply = Reply::text(format!(
        "{}\n\nWhat would you like to change?",
        product_card(product)
    ))
    .with_action("Name", FlowAction::EditName)
    .with_action("Short description", FlowAction::EditShortDescription)
    .with_action("Additional info", FlowAction::EditAdditionalInfo)
    .with_action("Category", FlowAction::EditCategory)
    .with_action("Images", FlowAction::EditImages)
    .with_action("Refresh", FlowAction::ViewProduct)
    .with_action("Find another product", FlowAction::NewSearch)
    .with_action("Finish", FlowAction::FinishEdit)
    .with_action("Cancel", FlowAction::Cancel);
    if let Some(first) = product.images.first() {
        reply = reply.with_media(MediaPlan::for_reference(&first.reference));
    }
    reply
}

pub(crate) fn image_menu(images: &ImageCollector) -> Reply {
    let count = images.list().len();
    let mut reply = Reply::text(format!(
        "Manage product images ({count} of {}):",
        images.capacity
    ));
    if images.ensure_room().is_ok() {
        reply = reply.with_action("Add image", FlowAction::AddImage);
    }
    if count > 0 {
        reply = reply
            .with_action("Show images", FlowAction::ListImages(0))
            .with_action("Delete image", FlowAction::DeleteImageMenu);
    }
    reply.with_action("« Back", FlowAction::BackToMenu)
}

pub(crate) fn image_page(images: &ImageCollector, page: u32) -> Reply {
    let offset = page as usize * crate::wizard::images::IMAGE_PAGE_SIZE;
    let lines: Vec<String> = images
        .page(page)
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", offset + i + 1, item.reference))
        .collect();
    let mut reply = Reply::text(format!(
        "Product images (page {} of {}):\n{}",
        page + 1,
        images.page_count().max(1),
        lines.join("\n")
    ));
    if let Some(first) = images.page(page).first() {
        reply = reply.with_media(MediaPlan::for_reference(&first.reference));
    }
    if page > 0 {
        reply = reply.with_action("‹ Previous", FlowAction::ListImages(page - 1));
    }
    if page + 1 < images.page_count() {
        reply = reply.with_action("Next ›", FlowAction::ListImages(page + 1));
    }
    reply.with_action("« Back", FlowAction::BackToImages)
}

pub(crate) fn delete_menu(images: &ImageCollector) -> Reply {
    images
        .list()
        .iter()
        .enumerate()
        .fold(
            Reply::text("Choose the image to delete:"),
            |reply, (i, item)| {
                reply.with_action(
                    format!("Delete image {}", i + 1),
                    FlowAction::DeleteImage(item.key as i64),
                )
            },
        )
        .with_action("« Back", FlowAction::BackToImages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::codec::decode_action;
    use showroom_types::navigation::ActionToken;

    #[test]
    fn test_admin_menu_actions_decode() {
        let menu = admin_menu();
        let actions: Vec<ActionToken> = menu
            .options
            .iter()
            .map(|c| decode_action(&c.action).unwrap())
            .collect();
        assert_eq!(actions[0], ActionToken::Flow(FlowAction::StartAdd));
        assert_eq!(actions[1], ActionToken::Flow(FlowAction::StartEdit));
        assert!(matches!(actions[2], ActionToken::Nav(_)));
    }

    #[test]
    fn test_image_menu_hides_add_when_full() {
        let mut images = ImageCollector::default();
        for i in 0..10 {
            images.add(format!("img-{i}")).unwrap();
        }
        let labels: Vec<String> = image_menu(&images)
            .options
            .into_iter()
            .map(|c| c.label)
            .collect();
        assert!(!labels.contains(&"Add image".to_string()));
        assert!(labels.contains(&"Delete image".to_string()));
    }

    #[test]
    fn test_delete_menu_uses_image_keys() {
        let mut images = ImageCollector::default();
        images.insert_keyed(31, "a".into()).unwrap();
        images.insert_keyed(35, "b".into()).unwrap();
        let menu = delete_menu(&images);
        assert_eq!(
            decode_action(&menu.options[1].action).unwrap(),
            ActionToken::Flow(FlowAction::DeleteImage(35))
        );
    }
}
