//! Table formatting utilities using comfy-table.

use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;

use arbor_core::{Error, HoistReport, RunReport};

use super::Status;

fn styled_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(*h).add_attribute(comfy_table::Attribute::Bold))
                .collect::<Vec<_>>(),
        )
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
    table
}

/// Prints a simple list of names (one per line).
pub fn print_package_list(names: &[String]) {
    if names.is_empty() {
        println!("  {} {}", "→".cyan(), "(none)".bright_black());
        return;
    }

    for name in names {
        println!("  {} {}", "→".cyan(), name.bold().white());
    }
}

fn failure_details(error: &Error) -> String {
    match error {
        Error::Spawn { stderr, .. } if !stderr.trim().is_empty() => {
            // Last line is usually the one that says what went wrong.
            let last = stderr.trim().lines().last().unwrap_or_default();
            format!("{}\n{}", error, last)
        }
        other => other.to_string(),
    }
}

/// Prints one row per package with its outcome.
pub fn print_run_summary(report: &RunReport) {
    println!("{}", run_summary_table(report));
}

fn run_summary_table(report: &RunReport) -> Table {
    let mut table = styled_table(&["Status", "Package", "Details"]);

    for (name, outcome) in &report.outcomes {
        match outcome {
            Ok(()) => table.add_row(vec![
                Cell::new(Status::Success.symbol()).fg(comfy_table::Color::Green),
                Cell::new(name).fg(comfy_table::Color::White),
                Cell::new(""),
            ]),
            Err(e) => table.add_row(vec![
                Cell::new(Status::Error.symbol()).fg(comfy_table::Color::Red),
                Cell::new(name).fg(comfy_table::Color::Red),
                Cell::new(failure_details(e)).fg(comfy_table::Color::Red),
            ]),
        };
    }

    for name in &report.not_run {
        table.add_row(vec![
            Cell::new(Status::Warning.symbol()).fg(comfy_table::Color::Yellow),
            Cell::new(name).fg(comfy_table::Color::DarkGrey),
            Cell::new("not run").fg(comfy_table::Color::DarkGrey),
        ]);
    }

    table
}

/// Prints what each hoist added to or changed in the root manifest.
pub fn print_hoist_table(reports: &[&HoistReport]) {
    let mut table = styled_table(&["Package", "Added", "Updated"]);

    for report in reports {
        let mut added = report.added.join(", ");
        if report.linked {
            if !added.is_empty() {
                added.push_str(", ");
            }
            added.push_str(&format!("{} (link)", report.package));
        }
        table.add_row(vec![
            Cell::new(&report.package).fg(comfy_table::Color::White),
            Cell::new(added).fg(comfy_table::Color::Green),
            Cell::new(report.updated.join(", ")).fg(comfy_table::Color::Yellow),
        ]);
    }

    println!("{}", table);
}
