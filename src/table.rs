use std::io::{self, Write};

use crate::data_handling::Row;

/// Write `header` and then the rows as an ASCII table.
pub fn print_rows<W: Write>(out: &mut W, header: &str, rows: &[Row]) -> io::Result<()> {
    writeln!(out, "{}", header)?;
    if rows.is_empty() {
        writeln!(out, "No rows returned")?;
    } else {
        write!(out, "{}", render(rows))?;
    }
    writeln!(out)
}

/// Column headers come from the first row; every row of a result set shares them.
pub fn render(rows: &[Row]) -> String {
    let columns: Vec<&str> = match rows.first() {
        Some(row) => row.columns().collect(),
        None => return String::new(),
    };
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.values().map(|v| v.to_string()).collect())
        .collect();

    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let mut border = String::from("+");
    for width in &widths {
        border.push_str(&"-".repeat(width + 2));
        border.push('+');
    }
    border.push('\n');

    let mut output = border.clone();
    output.push_str(&line(columns.iter().copied(), &widths));
    output.push_str(&border);
    for row in &cells {
        output.push_str(&line(row.iter().map(String::as_str), &widths));
    }
    output.push_str(&border);
    output
}

fn line<'a, I: Iterator<Item = &'a str>>(cells: I, widths: &[usize]) -> String {
    let mut out = String::from("|");
    for (cell, width) in cells.zip(widths) {
        out.push_str(&format!(" {:width$} |", cell, width = *width));
    }
    out.push('\n');
    out
}
