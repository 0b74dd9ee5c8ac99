//! Console-style text rendering of recorded arguments.

use serde_json::Value;

/// Strings render raw, everything else as compact JSON.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

/// Joins arguments with single spaces, the way a console prints them, and
/// truncates the result to `max_bytes`.
pub fn render_args(data: &[Value], max_bytes: usize) -> String {
    let rendered = data.iter().map(render_value).collect::<Vec<_>>().join(" ");
    truncate(rendered, max_bytes)
}

pub fn render_pretty(value: &Value, max_bytes: usize) -> String {
    let rendered = match value {
        Value::String(text) => format!("{text:?}"),
        other => serde_json::to_string_pretty(other).unwrap_or_default(),
    };
    truncate(rendered, max_bytes)
}

/// Cuts `text` to at most `max_bytes`, marking the cut with `...` when the
/// budget leaves room for it.
pub fn truncate(mut text: String, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text;
    }
    let ellipsis = if max_bytes >= 3 { "..." } else { "" };
    let mut cut = max_bytes - ellipsis.len();
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
    text.push_str(ellipsis);
    text
}

/// Renders arrays and objects as an aligned text table with an `(index)`
/// column. Rows that are not objects land in a `Values` column. Anything else
/// renders as a plain value.
pub fn render_table(data: &Value, columns: Option<&[String]>) -> String {
    let rows: Vec<(String, &Value)> = match data {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(idx, item)| (idx.to_string(), item))
            .collect(),
        Value::Object(map) => map.iter().map(|(key, item)| (key.clone(), item)).collect(),
        other => return render_value(other),
    };

    let mut headers: Vec<String> = Vec::new();
    match columns {
        Some(names) => headers.extend(names.iter().cloned()),
        None => {
            for (_, row) in &rows {
                if let Value::Object(fields) = row {
                    for key in fields.keys() {
                        if !headers.contains(key) {
                            headers.push(key.clone());
                        }
                    }
                }
            }
        }
    }
    let has_values = rows.iter().any(|(_, row)| !row.is_object());

    let mut header_line = vec!["(index)".to_string()];
    header_line.extend(headers.iter().cloned());
    if has_values {
        header_line.push("Values".to_string());
    }

    let mut table = vec![header_line];
    for (index, row) in &rows {
        let mut line = vec![index.clone()];
        for header in &headers {
            let cell = match row {
                Value::Object(fields) => fields.get(header).map(render_value).unwrap_or_default(),
                _ => String::new(),
            };
            line.push(cell);
        }
        if has_values {
            line.push(if row.is_object() {
                String::new()
            } else {
                render_value(row)
            });
        }
        table.push(line);
    }

    let widths: Vec<usize> = (0..table[0].len())
        .map(|col| {
            table
                .iter()
                .map(|line| line[col].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let format_line = |line: &[String]| {
        line.iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![format_line(table[0].as_slice())];
    out.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    out.extend(table[1..].iter().map(|line| format_line(line.as_slice())));
    out.join("\n")
}
