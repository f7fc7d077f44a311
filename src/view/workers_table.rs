//! Plain-text rendering of the workers table.
//!
//! Rows are pure functions of a worker and the view's current edit session,
//! so they can be rendered and tested without a view.

use super::EditSession;
use crate::api::Worker;

const COLUMNS: usize = 6;
const HEADERS: [&str; COLUMNS] = ["#", "Name", "Title", "Hard chores", "Outer partner", ""];

/// Cells of one row. A row shows the edit fields only when `editing` targets it.
pub fn row_cells(worker: &Worker, editing: Option<&EditSession>) -> [String; COLUMNS] {
    let id = worker.id.to_string();
    let hard = worker.hard_chores_counter.to_string();
    let outer = worker.outer_partner_counter.to_string();

    match editing.filter(|edit| edit.id == worker.id) {
        Some(edit) => [
            id,
            format!("[{}]", edit.name),
            format!("[{}]", edit.title),
            hard,
            outer,
            "Save Cancel".into(),
        ],
        None => [
            id,
            worker.name.clone(),
            worker.title.clone().unwrap_or_default(),
            hard,
            outer,
            "Edit Delete".into(),
        ],
    }
}

pub fn render_table(workers: &[&Worker], editing: Option<&EditSession>) -> String {
    let header = HEADERS.map(String::from);
    let rows: Vec<[String; COLUMNS]> = workers.iter().map(|w| row_cells(w, editing)).collect();

    let mut widths = [0usize; COLUMNS];
    for cells in std::iter::once(&header).chain(rows.iter()) {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("-+-"));
    out.push('\n');
    for cells in &rows {
        push_line(&mut out, cells, &widths);
    }
    out
}

// Name and title are left-aligned, everything else right-aligned
fn push_line(out: &mut String, cells: &[String; COLUMNS], widths: &[usize; COLUMNS]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, width))| match i {
            1 | 2 => format!("{:<width$}", cell, width = *width),
            _ => format!("{:>width$}", cell, width = *width),
        })
        .collect();
    out.push_str(line.join(" | ").trim_end());
    out.push('\n');
}
