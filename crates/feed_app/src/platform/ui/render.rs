use feed_core::{format_timestamp, EventRowView, FeedViewModel};

use super::constants::*;

/// Renders the whole feed as terminal lines, header first.
pub fn render(view: &FeedViewModel) -> Vec<String> {
    let mut lines = vec![status_line(view)];

    if let Some(error) = &view.last_error {
        lines.push(format!("Last error: {error}"));
    }

    if view.loading && view.events.is_empty() {
        lines.push(LOADING_TEXT.to_string());
        return lines;
    }

    if view.events.is_empty() {
        lines.push(EMPTY_TEXT.to_string());
        return lines;
    }

    for row in &view.events {
        lines.extend(format_row(row));
    }
    lines
}

fn status_line(view: &FeedViewModel) -> String {
    let last_sync = view
        .last_sync
        .map(format_timestamp)
        .unwrap_or_else(|| NEVER_SYNCED.to_string());
    let syncing = if view.syncing { SYNCING_MARK } else { "" };

    let mut line = format!(
        "{TITLE} | Events: {} | Last sync: {last_sync}{syncing}",
        view.event_count
    );
    if let Some(label) = &view.new_events_label {
        line.push_str(" | ");
        line.push_str(label);
    }
    line
}

fn format_row(row: &EventRowView) -> [String; 2] {
    let branches = match (&row.from_branch, &row.to_branch) {
        (Some(from), Some(to)) => format!(" [{from} -> {to}]"),
        (None, Some(to)) => format!(" [{to}]"),
        (Some(from), None) => format!(" [{from}]"),
        (None, None) => String::new(),
    };
    [
        format!("[{}] {}", row.type_label.to_uppercase(), row.message),
        format!(
            "{ROW_INDENT}by {}{branches} at {}",
            row.author, row.timestamp
        ),
    ]
}
