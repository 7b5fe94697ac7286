#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

const MIN_COLUMN: usize = 6;

/// Render an aligned table for string rows. Widths count chars, not bytes.
#[must_use]
pub fn render_entity_table(
    headers: &[&str],
    rows: &[Vec<String>],
    options: TableOptions,
) -> String {
    let mut widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(|cell| display_len(cell))
                .max()
                .unwrap_or(0)
                .max(display_len(header))
                .max(MIN_COLUMN)
        })
        .collect();

    fit_widths(&mut widths, headers, options.max_width);

    let header_line = headers
        .iter()
        .zip(widths.iter())
        .map(|(header, width)| pad(&truncate_text(header, *width), *width, false))
        .collect::<Vec<_>>()
        .join("  ");

    let divider = "-".repeat(display_len(&header_line));

    let row_lines = rows.iter().map(|row| {
        widths
            .iter()
            .enumerate()
            .map(|(index, width)| {
                let value = row.get(index).map_or("-", String::as_str);
                let cell = single_line(value);
                let truncated = truncate_text(&cell, *width);
                let numeric = looks_numeric(&truncated);
                let padded = pad(&truncated, *width, numeric);
                if options.color {
                    colorize_status(&truncated, padded)
                } else {
                    padded
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    });

    let mut lines = Vec::with_capacity(2 + rows.len());
    lines.push(header_line.trim_end().to_string());
    lines.push(divider.trim_end().to_string());
    lines.extend(row_lines);
    lines.join("\n")
}

fn display_len(value: &str) -> usize {
    value.chars().count()
}

fn single_line(value: &str) -> String {
    value.replace(['\n', '\r'], " ")
}

fn fit_widths(widths: &mut [usize], headers: &[&str], max_width: Option<usize>) {
    let Some(max_width) = max_width else {
        return;
    };

    let separators = widths.len().saturating_sub(1) * 2;
    let mut total = widths.iter().sum::<usize>() + separators;

    while total > max_width {
        // Shrink the widest column that is still above its minimum.
        let candidate = widths
            .iter()
            .enumerate()
            .filter(|(idx, width)| **width > display_len(headers[*idx]).max(MIN_COLUMN))
            .max_by_key(|(_, width)| **width)
            .map(|(idx, _)| idx);

        let Some(idx) = candidate else {
            break;
        };
        widths[idx] -= 1;
        total -= 1;
    }
}

fn truncate_text(value: &str, width: usize) -> String {
    if display_len(value) <= width {
        return value.to_string();
    }
    if width <= 1 {
        return "…".to_string();
    }

    let mut out: String = value.chars().take(width - 1).collect();
    out.push('…');
    out
}

fn looks_numeric(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|ch| ch.is_ascii_digit() || matches!(ch, '-' | '+' | '.' | ','))
}

fn pad(value: &str, width: usize, right_align: bool) -> String {
    let fill = " ".repeat(width.saturating_sub(display_len(value)));
    if right_align {
        format!("{fill}{value}")
    } else {
        format!("{value}{fill}")
    }
}

/// Color goal and exam statuses. Padding stays outside the escape codes.
fn colorize_status(value: &str, padded: String) -> String {
    let code = match value.to_ascii_lowercase().as_str() {
        "doing" | "passed" | "completed" | "true" => "32",
        "preparing" | "pending" | "suspended" => "33",
        "failed" | "false" => "31",
        _ => return padded,
    };
    let fill = &padded[value.len()..];
    format!("\u{1b}[{code}m{value}\u{1b}[0m{fill}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: TableOptions = TableOptions {
        max_width: None,
        color: false,
    };

    #[test]
    fn wide_characters_are_counted_once() {
        let rows = vec![vec!["代数基础".to_string(), "doing".to_string()]];
        let table = render_entity_table(&["name", "status"], &rows, PLAIN);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[2], "代数基础    doing");
    }

    #[test]
    fn narrow_terminal_truncates_widest_column() {
        let rows = vec![vec![
            "g-1".to_string(),
            "a goal name that is far too long to fit".to_string(),
        ]];
        let table = render_entity_table(
            &["id", "name"],
            &rows,
            TableOptions {
                max_width: Some(30),
                color: false,
            },
        );
        let row = table.lines().nth(2).expect("row line");
        assert!(row.chars().count() <= 30);
        assert!(row.ends_with('…'));
    }

    #[test]
    fn numbers_are_right_aligned() {
        let rows = vec![vec!["7".to_string()]];
        let table = render_entity_table(&["count"], &rows, PLAIN);
        assert_eq!(table.lines().nth(2), Some("     7"));
    }

    #[test]
    fn newlines_do_not_break_rows() {
        let rows = vec![vec!["line one\nline two".to_string()]];
        let table = render_entity_table(&["title"], &rows, PLAIN);
        assert_eq!(table.lines().count(), 3);
    }

    #[test]
    fn status_color_wraps_text_only() {
        let colored = colorize_status("failed", "failed  ".to_string());
        assert_eq!(colored, "\u{1b}[31mfailed\u{1b}[0m  ");
        assert_eq!(colorize_status("g-1", "g-1   ".to_string()), "g-1   ");
    }
}
