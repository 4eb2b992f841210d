//! Welcome banner display for chat sessions.

use console::style;

/// Print the banner shown once the session is established.
pub fn print_welcome_banner(base_url: &str, session_id: &str) {
    println!();
    println!("  ◆ {}", style("Course Design Assistant").cyan().bold());
    println!(
        "  {}",
        style("Build a course step by step, then export the design.").dim()
    );
    println!();
    println!("  {}  {}", style("Service:").bold(), style(base_url).dim());
    println!(
        "  {}  {}",
        style("Session:").bold(),
        style(session_id.chars().take(8).collect::<String>()).dim()
    );
    println!();
    println!(
        "  {}",
        style("Type /help for commands, Ctrl+D to exit").dim()
    );
    println!("  {}", style("---").dim());
    println!();
}
