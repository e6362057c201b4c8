// src/csv.rs
//! Delimited text in and out. Sources hand us spreadsheet exports (BOM, CRLF,
//! quoted commas, trailing blank lines); we hand back plain CSV/TSV.

use std::fmt::Write;
use std::mem::take;

/* ---------------- Parsing ---------------- */

#[derive(Default)]
struct RowBuilder {
    rows: Vec<Vec<String>>,
    row: Vec<String>,
    field: String,
}

impl RowBuilder {
    fn end_field(&mut self) {
        self.row.push(take(&mut self.field));
    }

    /// Rows made only of whitespace never reach the adapters.
    fn end_row(&mut self) {
        self.end_field();
        let row = take(&mut self.row);
        if !row.iter().all(|c| c.trim().is_empty()) {
            self.rows.push(row);
        }
    }
}

/// Split `text` into rows of cells. Double quotes group and escape (`""`);
/// `\n`, `\r\n` and lone `\r` all end a row. An unterminated quote runs to
/// the end of the input.
pub fn parse_rows(text: &str, sep: char) -> Vec<Vec<String>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut b = RowBuilder::default();
    let mut quoted = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if quoted && chars.peek() == Some(&'"') => {
                chars.next();
                b.field.push('"');
            }
            '"' => quoted = !quoted,
            c if quoted => b.field.push(c),
            c if c == sep => b.end_field(),
            '\r' => {
                chars.next_if_eq(&'\n');
                b.end_row();
            }
            '\n' => b.end_row(),
            c => b.field.push(c),
        }
    }
    b.end_row();
    b.rows
}

/* ---------------- Writing ---------------- */

fn push_cell(out: &mut String, cell: &str, sep: char) {
    if cell.contains([sep, '"', '\n', '\r']) {
        let _ = write!(out, "\"{}\"", cell.replace('"', "\"\""));
    } else {
        out.push_str(cell);
    }
}

/// Append one row, newline-terminated.
pub fn write_row(out: &mut String, row: &[String], sep: char) {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            out.push(sep);
        }
        push_cell(out, cell, sep);
    }
    out.push('\n');
}

pub fn rows_to_string(rows: &[Vec<String>], headers: Option<&[String]>, sep: char) -> String {
    let mut out = String::new();
    if let Some(h) = headers {
        write_row(&mut out, h, sep);
    }
    for r in rows {
        write_row(&mut out, r, sep);
    }
    out
}
