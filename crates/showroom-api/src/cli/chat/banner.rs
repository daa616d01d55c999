//! Welcome banner display for chat sessions.

use console::style;

/// Print the banner shown when a terminal chat starts.
pub fn print_welcome_banner(user_id: &str, is_admin: bool) {
    println!();
    println!(
        "  {} {}",
        style("*").bold(),
        style("Showroom").cyan().bold()
    );
    println!("  {}", style("Browse the catalog like a chat user would.").dim());
    println!();
    println!("  {}  {}", style("User:").bold(), style(user_id).dim());
    if is_admin {
        println!("  {}  {}", style("Role:").bold(), style("admin (/admin)").green());
    }
    println!();
    println!(
        "  {}",
        style("Type a button number to press it, /help for commands, /exit to leave").dim()
    );
    println!("  {}", style("---").dim());
    println!();
}
