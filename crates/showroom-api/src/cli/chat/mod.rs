//! Interactive terminal transport for Showroom.
//!
//! Plays the role of a chat platform: every line the user types becomes an
//! inbound event, every reply is printed with numbered buttons. Entry point:
//! `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;
