//! Terminal rendering of session events.
//!
//! `ChatRenderer` turns [`SessionEvent`]s into styled terminal output.
//! Assistant prose goes through `termimad` so the service's markdown
//! (lists, emphasis, headings) reads well in a terminal.

use console::style;
use termimad::MadSkin;

use coursewright_types::chat::{ConversationMetadata, Message, MessageType, Sender};
use coursewright_types::event::SessionEvent;
use coursewright_types::export::CompletionBand;

/// Terminal renderer for the chat transcript.
pub struct ChatRenderer {
    skin: MadSkin,
}

impl ChatRenderer {
    pub fn new() -> Self {
        let mut skin = MadSkin::default_dark();
        skin.inline_code
            .set_fg(termimad::crossterm::style::Color::Yellow);
        Self { skin }
    }

    /// Render one event. User messages are skipped because the prompt has
    /// already echoed them.
    pub fn render_event(&self, event: &SessionEvent) {
        match event {
            SessionEvent::MessageAppended { message } if message.sender == Sender::Assistant => {
                self.print_message(message);
            }
            SessionEvent::MetadataUpdated { metadata } => self.print_progress(metadata),
            SessionEvent::ErrorChanged { error: Some(error) } => {
                println!(
                    "  {} {} {}",
                    style("!").red().bold(),
                    style(error).red(),
                    style("(/dismiss to clear)").dim()
                );
            }
            SessionEvent::Announcement { announcement } => {
                println!("  {}", style(announcement).dim().italic());
            }
            _ => {}
        }
    }

    /// Print a message with a style matching its sender and type.
    pub fn print_message(&self, message: &Message) {
        match (message.sender, message.message_type) {
            (Sender::User, _) => {
                println!("  {} {}", style("You >").green().bold(), message.content);
            }
            (Sender::Assistant, MessageType::Error) => {
                println!(
                    "  {} {}",
                    style("✗").red().bold(),
                    style(&message.content).red()
                );
            }
            (Sender::Assistant, MessageType::SafetyNotice) => {
                println!(
                    "  {} {}",
                    style("⚠").yellow().bold(),
                    style(&message.content).yellow()
                );
            }
            (Sender::Assistant, MessageType::Normal) => {
                let rendered = self.skin.term_text(&message.content);
                println!("{}", indent(&rendered.to_string()));
            }
        }
        println!();
    }

    /// Print the "Step X of Y" progress line.
    pub fn print_progress(&self, metadata: &ConversationMetadata) {
        let percentage = metadata.completion_percentage;
        let styled = match CompletionBand::from_percentage(percentage) {
            CompletionBand::High => style(format!("{percentage:.0}%")).green(),
            CompletionBand::Medium => style(format!("{percentage:.0}%")).yellow(),
            CompletionBand::Low => style(format!("{percentage:.0}%")).red(),
        };
        println!(
            "  {} Step {} of {} {} {}",
            style("|").dim(),
            metadata.current_step,
            metadata.total_steps,
            style("\u{00b7}").dim(),
            styled
        );
        if !metadata.framework_areas_covered.is_empty() {
            let areas: Vec<&str> = metadata
                .framework_areas_covered
                .iter()
                .map(String::as_str)
                .collect();
            println!("  {} {}", style("|").dim(), style(areas.join(", ")).dim());
        }
    }
}

impl Default for ChatRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Indent every line by two spaces to line up with the prompt.
fn indent(text: &str) -> String {
    text.trim_end()
        .lines()
        .map(|line| format!("  {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indent_prefixes_each_line() {
        assert_eq!(indent("a\nb\n"), "  a\n  b");
        assert_eq!(indent(""), "");
    }
}
