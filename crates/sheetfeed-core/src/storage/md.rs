//! Markdown export of loaded worksheets

use crate::document::{Spreadsheet, Worksheet};
use std::fmt::Write as _;
use std::path::Path;

/// Write every loaded worksheet of the spreadsheet to a markdown file
pub fn write_markdown(path: &Path, spreadsheet: &Spreadsheet) -> std::io::Result<()> {
    std::fs::write(path, render_markdown(spreadsheet))
}

/// Render the spreadsheet as markdown: one section and table per worksheet.
pub fn render_markdown(spreadsheet: &Spreadsheet) -> String {
    let mut out = String::new();
    let heading = spreadsheet.title.as_deref().unwrap_or(&spreadsheet.id);
    let _ = writeln!(out, "# {}", escape_markdown(heading));

    if spreadsheet.worksheets.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "*No worksheets loaded*");
        return out;
    }

    for worksheet in &spreadsheet.worksheets {
        let _ = writeln!(out);
        render_worksheet(&mut out, worksheet);
    }
    out
}

fn render_worksheet(out: &mut String, worksheet: &Worksheet) {
    let _ = writeln!(
        out,
        "## {} ({} x {})",
        escape_markdown(&worksheet.title),
        worksheet.row_count,
        worksheet.col_count
    );
    let _ = writeln!(out);

    // Column keys in first-seen order across all rows.
    let mut keys: Vec<&str> = Vec::new();
    for row in &worksheet.rows {
        for key in row.keys() {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
    }

    if keys.is_empty() {
        let _ = writeln!(out, "*Empty worksheet*");
        return;
    }

    out.push('|');
    for key in &keys {
        let _ = write!(out, " {} |", escape_markdown(key));
    }
    out.push('\n');
    out.push('|');
    for _ in &keys {
        out.push_str("---|");
    }
    out.push('\n');

    for row in &worksheet.rows {
        out.push('|');
        for key in &keys {
            let value = row.by_key(key).unwrap_or_default();
            let _ = write!(out, " {} |", escape_markdown(value));
        }
        out.push('\n');
    }
}

/// Escape special markdown characters in cell content
fn escape_markdown(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ").replace('\r', "")
}
