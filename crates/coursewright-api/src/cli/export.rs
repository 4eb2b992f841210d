//! Export and summary commands.
//!
//! `cwright export <format>` and `cwright summary` open a fresh session and
//! run a single export request. The summary renderer is shared with the
//! chat loop's `/summary` and `/export json` commands.

use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use coursewright_types::export::{
    CompletionBand, ExportFormat, ExportRequestState, ExportStatus, ExportSummary,
};

use crate::state::AppState;

/// Run one export against a new session.
pub async fn export_once(state: &AppState, format: ExportFormat, json: bool) -> anyhow::Result<()> {
    open_session(state).await?;
    let result = state.exports.export_as(format).await;
    report(state, &result, json)
}

/// Fetch and print the summary for a new session.
pub async fn summary_once(state: &AppState, json: bool) -> anyhow::Result<()> {
    open_session(state).await?;
    let result = state.exports.get_summary().await;
    report(state, &result, json)
}

async fn open_session(state: &AppState) -> anyhow::Result<()> {
    if state.manager.initialize().await {
        Ok(())
    } else {
        anyhow::bail!(
            "could not open a session with {}",
            state.config.base_url
        )
    }
}

fn report(state: &AppState, result: &ExportRequestState, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        print_export_state(state, result);
    }

    if result.status == ExportStatus::Error {
        anyhow::bail!("{}", result.message);
    }
    Ok(())
}

/// Print the status line and, for structured results, the summary.
pub fn print_export_state(state: &AppState, result: &ExportRequestState) {
    match result.status {
        ExportStatus::Success => {
            println!("\n  {} {}", style("✓").green().bold(), result.message);
            if result.payload.is_none() {
                if let Some(path) = state.exports.last_download() {
                    println!("  {}", style(path.display()).dim());
                }
            }
        }
        ExportStatus::Error => {
            println!("\n  {} {}", style("✗").red().bold(), result.message);
        }
        ExportStatus::Idle | ExportStatus::InFlight => {}
    }

    if let Some(summary) = &result.payload {
        if result.status == ExportStatus::Success {
            print_summary(summary);
        }
    }
}

/// Render a structured course design summary.
pub fn print_summary(summary: &ExportSummary) {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Section").fg(Color::White),
        Cell::new("Value").fg(Color::White),
    ]);

    if let Some(design) = &summary.course_design {
        let fields = [
            ("Title", &design.title),
            ("Target audience", &design.target_audience),
            ("Level", &design.educational_level),
            ("Duration", &design.duration),
        ];
        for (label, value) in fields {
            if let Some(value) = value {
                table.add_row(vec![Cell::new(label).fg(Color::Cyan), Cell::new(value)]);
            }
        }
    }

    if let Some(progress) = &summary.progress {
        table.add_row(vec![
            Cell::new("Completion").fg(Color::Cyan),
            Cell::new(format!("{:.0}%", progress.completion_percentage))
                .fg(band_color(progress.completion_percentage)),
        ]);
        table.add_row(vec![
            Cell::new("Step").fg(Color::Cyan),
            Cell::new(format!(
                "{} of {}",
                progress.current_step, progress.total_steps
            )),
        ]);
        if let Some(status) = &progress.status {
            let cell = if progress.is_completed() {
                Cell::new(status).fg(Color::Green)
            } else {
                Cell::new(status).fg(Color::Yellow)
            };
            table.add_row(vec![Cell::new("Status").fg(Color::Cyan), cell]);
        }
    }

    if let Some(quality) = &summary.quality_metrics {
        table.add_row(vec![
            Cell::new("Messages").fg(Color::Cyan),
            Cell::new(quality.total_messages),
        ]);
        table.add_row(vec![
            Cell::new("Completeness").fg(Color::Cyan),
            Cell::new(format!("{:.0}%", quality.completeness_score))
                .fg(band_color(quality.completeness_score)),
        ]);
        table.add_row(vec![
            Cell::new("Confidence").fg(Color::Cyan),
            Cell::new(format!("{:.0}%", quality.average_confidence * 100.0)),
        ]);
    }

    if !summary.framework_analysis.is_empty() {
        table.add_row(vec![
            Cell::new("Framework").fg(Color::Cyan),
            Cell::new(coverage_line(summary)),
        ]);
    }
    for (area, covered) in &summary.framework_analysis {
        let mark = if *covered {
            Cell::new("● covered").fg(Color::Green)
        } else {
            Cell::new("○ pending").fg(Color::DarkGrey)
        };
        table.add_row(vec![Cell::new(humanize(area)), mark]);
    }

    println!();
    println!("{table}");

    print_list("Key insights", &summary.key_insights);
    print_list("Recommendations", &summary.recommendations);
    println!();
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!();
    println!("  {}", style(title).bold());
    for (i, item) in items.iter().enumerate() {
        println!("  {}. {}", style(i + 1).dim(), item);
    }
}

/// `2 of 5 areas covered`.
fn coverage_line(summary: &ExportSummary) -> String {
    format!(
        "{} of {} areas covered",
        summary.covered_areas().len(),
        summary.framework_analysis.len()
    )
}

fn band_color(percentage: f64) -> Color {
    match CompletionBand::from_percentage(percentage) {
        CompletionBand::High => Color::Green,
        CompletionBand::Medium => Color::Yellow,
        CompletionBand::Low => Color::Red,
    }
}

/// `learning_objectives` -> `Learning objectives`.
fn humanize(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
