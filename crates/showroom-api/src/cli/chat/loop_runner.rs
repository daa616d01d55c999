//! Main chat loop orchestration.
//!
//! Opens with `/start`, then feeds every line through the conversation and
//! prints the reply. The session is aborted when the loop ends, so an
//! unfinished draft never outlives the terminal.

use std::time::Instant;

use console::style;
use showroom_types::event::InboundEvent;
use showroom_types::reply::Reply;
use tracing::{debug, info};

use crate::state::AppState;

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::render_reply;

/// Run the interactive chat loop as `user_id`.
pub async fn run_chat_loop(state: &AppState, user_id: &str) -> anyhow::Result<()> {
    let conversation = &state.conversation;
    print_welcome_banner(user_id, conversation.is_admin(user_id));
    info!(user_id, "terminal chat started");

    let mut last_reply = send(state, InboundEvent::text(user_id, "/start")).await;

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, _writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        let line = match chat_input.read_line().await {
            InputEvent::Eof => break,
            InputEvent::Interrupted => {
                println!("\n  {}", style("Press Ctrl+D or type /exit to leave.").dim());
                continue;
            }
            InputEvent::Line(line) if line.is_empty() => continue,
            InputEvent::Line(line) => line,
        };

        let event = match commands::parse(&line) {
            Some(ChatCommand::Help) => {
                commands::print_help();
                continue;
            }
            Some(ChatCommand::Clear) => {
                chat_input.clear();
                continue;
            }
            Some(ChatCommand::Exit) => break,
            Some(ChatCommand::Invalid(msg)) => {
                println!("\n  {} {msg}\n", style("?").yellow().bold());
                continue;
            }
            Some(ChatCommand::Photo(handle)) => InboundEvent::media(user_id, handle),
            None => commands::to_event(user_id, &line, Some(&last_reply)),
        };

        last_reply = send(state, event).await;
    }

    chat_input.flush();
    conversation.abort(user_id).await;
    println!("\n  {}", style("Session ended.").dim());
    info!(user_id, "terminal chat ended");
    Ok(())
}

async fn send(state: &AppState, event: InboundEvent) -> Reply {
    let start = Instant::now();
    let reply = state.conversation.handle(event).await;
    debug!(elapsed_ms = start.elapsed().as_millis() as u64, "reply ready");

    println!();
    print!("{}", render_reply(&reply));
    println!();
    reply
}
