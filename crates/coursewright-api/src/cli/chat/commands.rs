//! Slash command parsing for the chat loop.
//!
//! Commands start with `/` and give in-chat access to exports, progress,
//! the connectivity switch, and the error banner.

use console::style;

use coursewright_types::export::ExportFormat;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Clear the terminal screen.
    Clear,
    /// Exit the chat session.
    Exit,
    /// Export the session in a format.
    Export(ExportFormat),
    /// Fetch and show the structured summary.
    Summary,
    /// Show the current progress metadata.
    Progress,
    /// Show the full message log.
    History,
    /// Mark connectivity as down.
    Offline,
    /// Mark connectivity as restored.
    Online,
    /// Dismiss the error banner.
    Dismiss,
    /// Unknown or malformed command.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let parts: Vec<&str> = trimmed.splitn(2, ' ').collect();
    let cmd = parts[0].to_lowercase();
    let arg = parts.get(1).map(|s| s.trim()).filter(|s| !s.is_empty());

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/clear" | "/cls" => Some(ChatCommand::Clear),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        "/export" => match arg.map(str::parse::<ExportFormat>) {
            Some(Ok(format)) => Some(ChatCommand::Export(format)),
            Some(Err(e)) => Some(ChatCommand::Unknown(e)),
            None => Some(ChatCommand::Unknown(
                "/export requires a format (pdf, csv, json)".to_string(),
            )),
        },
        "/summary" => Some(ChatCommand::Summary),
        "/progress" => Some(ChatCommand::Progress),
        "/history" => Some(ChatCommand::History),
        "/offline" => Some(ChatCommand::Offline),
        "/online" => Some(ChatCommand::Online),
        "/dismiss" => Some(ChatCommand::Dismiss),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

/// Print the help text listing all available commands.
pub fn print_help() {
    let rows = [
        ("/help", "Show this help message"),
        ("/export <fmt>", "Export the design as pdf, csv, or json"),
        ("/summary", "Show the course design summary"),
        ("/progress", "Show current step and completion"),
        ("/history", "Show the conversation so far"),
        ("/offline", "Simulate losing the connection"),
        ("/online", "Simulate the connection coming back"),
        ("/dismiss", "Dismiss the error banner"),
        ("/clear", "Clear the screen"),
        ("/exit", "End the chat session"),
    ];

    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    for (command, description) in rows {
        println!("  {:<16}{}", style(command).cyan(), description);
    }
    println!();
    println!(
        "  {}",
        style("Ctrl+D to exit, Ctrl+C safe (no message loss)").dim()
    );
    println!();
}
