//! Terminal rendering of conversation replies.
//!
//! The terminal cannot show images, so media is printed as a labeled
//! reference. It still follows the media fallback chain: a transport
//! handle means nothing to a terminal "photo", so it is retried as a
//! document, and anything the surface refuses ends as text only.

use console::style;
use showroom_types::catalog::is_url;
use showroom_types::reply::{MediaFailure, MediaPlan, Reply};

/// How the terminal presents one media plan.
fn present(plan: &MediaPlan) -> Result<Option<String>, MediaFailure> {
    match plan {
        MediaPlan::Photo(reference) if is_url(reference) => Ok(Some(format!("[photo] {reference}"))),
        MediaPlan::Photo(_) => Err(MediaFailure::WrongType),
        MediaPlan::Document(reference) => Ok(Some(format!("[document] {reference}"))),
        MediaPlan::TextOnly => Ok(None),
    }
}

/// Walk the fallback chain until the terminal accepts a plan.
pub fn media_line(plan: &MediaPlan) -> Option<String> {
    let mut current = plan.clone();
    loop {
        match present(&current) {
            Ok(line) => return line,
            Err(failure) => {
                tracing::debug!(?current, ?failure, "media refused, falling back");
                current = current.fallback(failure);
            }
        }
    }
}

/// Render a reply as terminal lines: media, text, numbered buttons.
pub fn render_reply(reply: &Reply) -> String {
    let mut out = String::new();
    if let Some(line) = reply.media.as_ref().and_then(media_line) {
        out.push_str(&format!("  {}\n", style(line).magenta()));
    }
    for line in reply.text.lines() {
        out.push_str(&format!("  {line}\n"));
    }
    if !reply.options.is_empty() {
        out.push('\n');
        for (i, choice) in reply.options.iter().enumerate() {
            out.push_str(&format!(
                "  {} {}\n",
                style(format!("[{}]", i + 1)).cyan().bold(),
                choice.label
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_shown_as_photo() {
        let plan = MediaPlan::for_reference("https://cdn.example.com/oslo.jpg");
        assert_eq!(
            media_line(&plan).as_deref(),
            Some("[photo] https://cdn.example.com/oslo.jpg")
        );
    }

    #[test]
    fn test_handle_falls_back_to_document() {
        let plan = MediaPlan::for_reference("AgACAgIAAxkB");
        assert_eq!(media_line(&plan).as_deref(), Some("[document] AgACAgIAAxkB"));
    }

    #[test]
    fn test_buttons_are_numbered() {
        console::set_colors_enabled(false);
        let reply = Reply::text("Choose a category:")
            .with_choice("Beds", "n:s:1")
            .with_choice("Sofas", "n:p:2");
        let out = render_reply(&reply);
        assert!(out.contains("  Choose a category:\n"));
        assert!(out.contains("[1] Beds\n"));
        assert!(out.contains("[2] Sofas\n"));
    }
}
