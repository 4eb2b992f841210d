//! Main chat loop orchestration.
//!
//! Opens a session, prints the banner and welcome message, then reads
//! lines until the user exits. Lines starting with `/` are commands;
//! anything else goes to the session manager verbatim. Output is driven by
//! the manager's event stream, drained after every action.

use std::sync::Arc;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{info, warn};

use coursewright_types::chat::{SendBlock, SendOutcome, Sender};
use coursewright_types::event::SessionEvent;

use crate::cli::export::print_export_state;
use crate::state::AppState;

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::ChatRenderer;

/// Run the interactive chat loop against a fresh session.
pub async fn run_chat_loop(state: &AppState) -> anyhow::Result<()> {
    let manager = &state.manager;
    let renderer = ChatRenderer::new();
    let mut events = manager.events().subscribe();

    let spinner = spinner("connecting...");
    let opened = manager.initialize().await;
    spinner.finish_and_clear();

    let Some(session) = manager.session().filter(|_| opened) else {
        eprintln!(
            "\n  {} Could not start a session with {}",
            style("!").red().bold(),
            style(&state.config.base_url).dim()
        );
        anyhow::bail!("session initialization failed");
    };

    print_welcome_banner(&state.config.base_url, &session.id);
    drain_events(&mut events, &renderer);

    let watcher = Arc::clone(manager).watch_connectivity();

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, _writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        match chat_input.read_line().await {
            InputEvent::Eof => {
                println!("\n  {}", style("Session ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                println!(
                    "\n  {}",
                    style("Press Ctrl+D to exit, or keep chatting.").dim()
                );
                continue;
            }
            InputEvent::Message(text) => {
                if let Some(cmd) = commands::parse(&text) {
                    if !run_command(state, &mut chat_input, &renderer, cmd).await {
                        break;
                    }
                } else {
                    send(state, &text).await;
                }
                drain_events(&mut events, &renderer);
            }
        }
    }

    watcher.abort();
    info!(
        session_id = %session.id,
        messages = manager.message_count(),
        "chat session ended"
    );
    Ok(())
}

/// Execute a slash command. Returns `false` when the loop should end.
async fn run_command(
    state: &AppState,
    chat_input: &mut ChatInput,
    renderer: &ChatRenderer,
    cmd: ChatCommand,
) -> bool {
    let manager = &state.manager;
    match cmd {
        ChatCommand::Help => commands::print_help(),
        ChatCommand::Clear => chat_input.clear(),
        ChatCommand::Exit => {
            println!("\n  {}", style("Session ended.").dim());
            return false;
        }
        ChatCommand::Export(format) => {
            let spinner = spinner(&format!("exporting {format}..."));
            let result = state.exports.export_as(format).await;
            spinner.finish_and_clear();
            print_export_state(state, &result);
        }
        ChatCommand::Summary => {
            let spinner = spinner("fetching summary...");
            let result = state.exports.get_summary().await;
            spinner.finish_and_clear();
            print_export_state(state, &result);
        }
        ChatCommand::Progress => match manager.metadata() {
            Some(metadata) => {
                println!();
                renderer.print_progress(&metadata);
                println!();
            }
            None => println!("\n  {}\n", style("No progress reported yet.").dim()),
        },
        ChatCommand::History => {
            println!();
            for message in manager.messages() {
                renderer.print_message(&message);
            }
        }
        ChatCommand::Offline => manager.set_online(false),
        ChatCommand::Online => manager.set_online(true),
        ChatCommand::Dismiss => {
            if manager.error().is_some() {
                manager.dismiss_error();
                println!("  {}", style("Error dismissed.").dim());
            }
        }
        ChatCommand::Unknown(name) => {
            println!(
                "\n  {} Unknown command: {}. Type /help for available commands.\n",
                style("?").yellow().bold(),
                style(name).dim()
            );
        }
    }
    true
}

/// Send one line through the session manager with a spinner.
async fn send(state: &AppState, text: &str) {
    let spinner = spinner("thinking...");
    let outcome = state.manager.send_text(text).await;
    spinner.finish_and_clear();

    if let SendOutcome::Blocked(reason) = outcome {
        let hint = match reason {
            // An empty line is not worth a hint
            SendBlock::EmptyInput => return,
            SendBlock::NoSession => "No session is open.",
            SendBlock::AlreadySending => "Still waiting on the previous message.",
            SendBlock::Offline => "You're offline. Use /online once the connection is back.",
        };
        println!("  {}", style(hint).dim());
    }
}

/// Render every event queued since the last drain.
fn drain_events(events: &mut broadcast::Receiver<SessionEvent>, renderer: &ChatRenderer) {
    loop {
        match events.try_recv() {
            Ok(SessionEvent::MessageAppended { message }) if message.sender == Sender::User => {}
            Ok(event) => renderer.render_event(&event),
            Err(TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "renderer fell behind the event stream");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}
