//! Summary tables printed after each command.

use std::path::PathBuf;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use vts_sync::{SyncPlan, SyncReport};
use vts_transform::ExportBundle;

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn short_hash(hash: &str) -> String {
    hash.chars().take(12).collect()
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn print_header(bundle: &ExportBundle) {
    let summary = &bundle.summary;
    println!("Document: {}", summary.file_name);
    println!(
        "Format: {} ({}), exported at {}",
        summary.format, summary.export_type, summary.exported_at
    );
}

pub fn print_export_summary(bundle: &ExportBundle, written: &[PathBuf]) {
    print_header(bundle);
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Collections"),
        header_cell("Variables"),
        header_cell("Hash"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for (document, path) in bundle.documents.iter().zip(written) {
        table.add_row(vec![
            Cell::new(path.display()),
            Cell::new(document.collections_count),
            Cell::new(document.variables_count),
            Cell::new(short_hash(&document.content_hash)).fg(Color::DarkGrey),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(bundle.summary.collections_count).add_attribute(Attribute::Bold),
        Cell::new(bundle.summary.variables_count).add_attribute(Attribute::Bold),
        Cell::new(short_hash(&bundle.summary.bundle_hash)).fg(Color::DarkGrey),
    ]);
    println!("{table}");
}

pub fn print_plan(bundle: &ExportBundle, plan: &SyncPlan) {
    print_header(bundle);
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Path"),
        header_cell("Status"),
        header_cell("Stored"),
        header_cell("Current"),
    ]);
    apply_table_style(&mut table);
    for file in &plan.changed {
        let (label, color) = if file.previous_hash.is_some() {
            ("changed", Color::Yellow)
        } else {
            ("new", Color::Green)
        };
        table.add_row(vec![
            Cell::new(&file.repo_path),
            Cell::new(label).fg(color),
            Cell::new(
                file.previous_hash
                    .as_deref()
                    .map_or_else(|| "-".to_string(), short_hash),
            ),
            Cell::new(short_hash(&file.content_hash)),
        ]);
    }
    for path in &plan.unchanged {
        let hash = plan
            .hashes
            .get(path)
            .map(String::as_str)
            .map(short_hash)
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(path),
            Cell::new("unchanged").fg(Color::DarkGrey),
            Cell::new(&hash),
            Cell::new(&hash),
        ]);
    }
    println!("{table}");
    if plan.is_empty() {
        println!("Nothing to push.");
    } else {
        println!("{} of {} documents to push.", plan.changed.len(), plan.hashes.len());
    }
}

pub fn print_sync_report(report: &SyncReport) {
    if report.skipped {
        println!("Nothing to push: repository already up to date.");
    } else {
        for path in &report.written {
            println!("  wrote {path}");
        }
        println!("Pushed {} document(s).", report.written.len());
    }
    if let Some(message) = &report.message {
        println!("Commit message: {message}");
    }
    if let Some(url) = &report.url {
        println!("URL: {url}");
    }
}
