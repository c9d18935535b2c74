//! Column layout for name lists.

/// Spaces between adjacent columns.
const COLUMN_GAP: usize = 2;

/// Lay out `names` column-major in as many columns as fit in `width`.
///
/// Each column is as wide as its widest entry, every line starts with
/// `prefix`, and trailing spaces are trimmed. A list too wide for two
/// columns comes out one name per line. The result has no trailing
/// newline.
pub fn columnize(names: &[String], width: usize, prefix: &str) -> String {
    if names.is_empty() {
        return String::new();
    }
    let lens: Vec<usize> = names.iter().map(|n| n.chars().count()).collect();
    let prefix_len = prefix.chars().count();

    let mut rows = names.len();
    let mut widths = vec![lens.iter().copied().max().unwrap_or(0)];
    for nrows in 1..names.len() {
        let candidate = column_widths(&lens, nrows);
        let total =
            prefix_len + candidate.iter().sum::<usize>() + COLUMN_GAP * (candidate.len() - 1);
        if total <= width {
            rows = nrows;
            widths = candidate;
            break;
        }
    }

    let mut lines = Vec::with_capacity(rows);
    for row in 0..rows {
        let mut line = String::from(prefix);
        for (col, col_width) in widths.iter().enumerate() {
            let Some(name) = names.get(col * rows + row) else {
                break;
            };
            if col > 0 {
                line.push_str(&" ".repeat(COLUMN_GAP));
            }
            line.push_str(&format!("{name:<col_width$}"));
        }
        lines.push(line.trim_end().to_string());
    }
    lines.join("\n")
}

fn column_widths(lens: &[usize], rows: usize) -> Vec<usize> {
    lens.chunks(rows)
        .map(|col| col.iter().copied().max().unwrap_or(0))
        .collect()
}
