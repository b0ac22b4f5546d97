//! Inline filter bar (protocol filter on the log table, type/category in history).

use ratatui::style::Modifier;
use ratatui::text::{Line, Span};

use crate::theme;

/// Render `labels` on one line with the active one bracketed.
pub fn render_sub_tabs<'a>(labels: &[&'a str], active_index: usize) -> Line<'a> {
    let mut spans = Vec::with_capacity(labels.len() * 2);

    for (i, label) in labels.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  ", theme::key_hint()));
        }

        if i == active_index {
            spans.push(Span::styled(
                format!("[{label}]"),
                theme::tab_active().add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(*label, theme::tab_inactive()));
        }
    }

    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brackets_only_the_active_label() {
        let line = render_sub_tabs(&["All", "SSH", "TELNET"], 1);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "All  [SSH]  TELNET");
    }
}
