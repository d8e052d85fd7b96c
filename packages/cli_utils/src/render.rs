//! Terminal rendering helpers.

use serde::Serialize;

/// Characters of pretty JSON shown when previewing a result.
pub const DEFAULT_DISPLAY_LIMIT: usize = 20_000;

/// Serializes `value` as JSON indented with two spaces.
///
/// # Errors
///
/// Returns [`serde_json::Error`] if `value` cannot be serialized.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

/// Returns at most the first `max_chars` characters of `text`.
///
/// Counts `char`s, so the cut never lands inside a multi-byte character.
#[must_use]
pub fn truncate_for_display(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// Pretty JSON for display, truncated to `max_chars`.
///
/// # Errors
///
/// Returns [`serde_json::Error`] if `value` cannot be serialized.
pub fn preview<T: Serialize + ?Sized>(
    value: &T,
    max_chars: usize,
) -> Result<String, serde_json::Error> {
    let text = to_pretty_json(value)?;
    if text.chars().count() > max_chars {
        log::debug!("Preview truncated to {max_chars} characters");
    }
    Ok(truncate_for_display(&text, max_chars).to_owned())
}

/// Renders a left-aligned text table with a dashed rule under the header.
#[must_use]
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = format_row(headers.iter().copied(), &widths);
    out.push('\n');
    out.push_str(&"-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)));
    for row in rows {
        out.push('\n');
        out.push_str(&format_row(row.iter().map(String::as_str), &widths));
    }
    out
}

fn format_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let line = cells
        .zip(widths.iter().copied())
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_owned()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn pretty_json_uses_two_spaces() {
        let text = to_pretty_json(&json!({ "a": [1] })).unwrap();
        assert_eq!(text, "{\n  \"a\": [\n    1\n  ]\n}");
    }

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate_for_display("héllo", 2), "hé");
        assert_eq!(truncate_for_display("abc", 10), "abc");
        assert_eq!(truncate_for_display("abc", 0), "");
    }

    #[test]
    fn preview_limits_output() {
        let text = preview(&json!({ "key": "value" }), 5).unwrap();
        assert_eq!(text, "{\n  \"");
    }

    #[test]
    fn renders_aligned_table() {
        let out = table(
            &["Error Type", "Property", "Message"],
            &[vec!["Missing Property".to_owned(), "title".to_owned(), "required".to_owned()]],
        );

        assert_eq!(
            out,
            "Error Type        Property  Message\n\
             ------------------------------------\n\
             Missing Property  title     required"
        );
    }
}
