//! Turning terminal input into inbound events.
//!
//! A few slash commands are handled by the terminal itself; everything else
//! becomes an event. A bare number presses the matching button of the last
//! reply. Other slash commands (`/start`, `/admin`, `/cancel`) go to the
//! conversation as text.

use console::style;
use showroom_types::event::InboundEvent;
use showroom_types::reply::Reply;

/// Commands handled locally by the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    Help,
    Clear,
    Exit,
    /// Send a media event carrying this handle.
    Photo(String),
    /// A local command used wrongly.
    Invalid(String),
}

/// Parse a local command. `None` for anything the conversation should see.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    let (cmd, arg) = match trimmed.split_once(' ') {
        Some((cmd, arg)) => (cmd, arg.trim()),
        None => (trimmed, ""),
    };

    match cmd.to_lowercase().as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/clear" | "/cls" => Some(ChatCommand::Clear),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        "/photo" if arg.is_empty() => Some(ChatCommand::Invalid(
            "/photo requires a media handle".to_string(),
        )),
        "/photo" => Some(ChatCommand::Photo(arg.to_string())),
        _ => None,
    }
}

/// Build the event for a line of input, given the reply currently on screen.
pub fn to_event(user_id: &str, line: &str, last_reply: Option<&Reply>) -> InboundEvent {
    let pressed = line
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| last_reply.and_then(|r| r.options.get(i)));
    match pressed {
        Some(choice) => InboundEvent::action(user_id, choice.action.clone()),
        None => InboundEvent::text(user_id, line),
    }
}

pub fn print_help() {
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    println!("  {}          {}", style("<n>").cyan(), "Press button number n");
    println!("  {}  {}", style("/photo <id>").cyan(), "Send a photo by media handle");
    println!("  {}       {}", style("/start").cyan(), "Back to the catalog");
    println!("  {}       {}", style("/admin").cyan(), "Open the admin panel");
    println!("  {}      {}", style("/cancel").cyan(), "Cancel the current action");
    println!("  {}       {}", style("/clear").cyan(), "Clear the screen");
    println!("  {}        {}", style("/exit").cyan(), "Leave the chat");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use showroom_types::event::EventKind;

    #[test]
    fn test_parse_local_commands() {
        assert_eq!(parse("/help"), Some(ChatCommand::Help));
        assert_eq!(parse("/EXIT"), Some(ChatCommand::Exit));
        assert_eq!(
            parse("/photo AgACAgIAAxkB"),
            Some(ChatCommand::Photo("AgACAgIAAxkB".to_string()))
        );
        assert!(matches!(parse("/photo"), Some(ChatCommand::Invalid(_))));
    }

    #[test]
    fn test_conversation_commands_pass_through() {
        assert_eq!(parse("/start"), None);
        assert_eq!(parse("/cancel"), None);
        assert_eq!(parse("Oslo bed"), None);
    }

    #[test]
    fn test_number_presses_button() {
        let reply = Reply::text("Choose a category:")
            .with_choice("Beds", "n:s:1")
            .with_choice("Sofas", "n:p:2");

        let event = to_event("7", "2", Some(&reply));
        assert_eq!(event.kind, EventKind::Action("n:p:2".to_string()));

        // Out of range and zero are plain text.
        assert_eq!(to_event("7", "3", Some(&reply)).kind, EventKind::Text("3".into()));
        assert_eq!(to_event("7", "0", Some(&reply)).kind, EventKind::Text("0".into()));
        assert_eq!(to_event("7", "1", None).kind, EventKind::Text("1".into()));
    }
}
