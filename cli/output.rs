use anyhow::{Context, Result};
use colored::*;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table, presets::UTF8_FULL};
use formatall_core::{BatchSummary, ItemOutcome};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Debug, Serialize)]
pub struct CandidateEntry {
    pub index: usize,
    pub path: String,
}

pub fn print_json<T: Serialize + ?Sized>(data: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(data).context("Failed to serialize JSON output")?;
    write_to_stdout(&content)
}

pub fn print_candidates_table(candidates: &[CandidateEntry]) -> Result<()> {
    if candidates.is_empty() {
        println!("{}", "(No files selected)".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("#").fg(Color::Green),
        Cell::new("Path").fg(Color::Green),
    ]);
    for entry in candidates {
        table.add_row(vec![
            Cell::new(entry.index).set_alignment(CellAlignment::Right),
            Cell::new(&entry.path).fg(Color::Cyan),
        ]);
    }
    println!("{table}");
    println!(
        "{:<12} {}",
        "Total:".green(),
        candidates.len().to_string().cyan()
    );
    Ok(())
}

pub fn print_summary_pretty(summary: &BatchSummary) -> Result<()> {
    let problems: Vec<_> = summary
        .items
        .iter()
        .filter(|item| !matches!(item.outcome, ItemOutcome::Succeeded))
        .collect();

    if !problems.is_empty() {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("File").fg(Color::Green),
            Cell::new("Status").fg(Color::Green),
            Cell::new("Details").fg(Color::Green),
        ]);
        for item in problems {
            let (status, details) = match &item.outcome {
                ItemOutcome::Failed { errors } => {
                    (Cell::new("failed").fg(Color::Red), errors.join("\n"))
                }
                ItemOutcome::Skipped { reason } => {
                    (Cell::new("skipped").fg(Color::Yellow), reason.clone())
                }
                ItemOutcome::Succeeded => continue,
            };
            table.add_row(vec![
                Cell::new(&item.name).fg(Color::Cyan),
                status,
                Cell::new(details).fg(Color::DarkGrey),
            ]);
        }
        println!("{table}");
    }

    println!();
    println!("{}", " Run Summary ".green().bold().underline());
    println!("{:<12} {}", "Total:".green(), summary.total.to_string().cyan());
    println!(
        "{:<12} {}",
        "Succeeded:".green(),
        summary.succeeded.to_string().cyan()
    );
    let failed = summary.failed.to_string();
    println!(
        "{:<12} {}",
        "Failed:".green(),
        if summary.failed > 0 {
            failed.red().bold()
        } else {
            failed.cyan()
        }
    );
    println!(
        "{:<12} {}",
        "Skipped:".green(),
        summary.skipped.to_string().yellow()
    );
    Ok(())
}

fn write_to_stdout(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    if !content.ends_with('\n') {
        handle
            .write_all(b"\n")
            .context("Failed to write newline to stdout")?;
    }
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}
