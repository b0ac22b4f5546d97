//! Alerts screen — the unread notification feed.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use decoyscope_core::render::{self, NotificationItem};
use decoyscope_core::{DashboardState, DataSet, badge_text};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::placeholder;

pub struct AlertsScreen {
    focused: bool,
    table_state: TableState,
}

impl AlertsScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            table_state: TableState::default().with_selected(Some(0)),
        }
    }

    fn selected_index(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    fn move_selection(&mut self, delta: isize, len: usize) {
        let next = self
            .selected_index()
            .saturating_add_signed(delta)
            .min(len.saturating_sub(1));
        self.table_state.select(Some(next));
    }
}

/// Feed and history rows share this layout.
pub fn notification_row(item: &NotificationItem) -> Row<'static> {
    let color = theme::notification_color(item.kind);
    let mut flags = String::new();
    if item.critical {
        flags.push_str("CRIT ");
    } else if item.high_priority {
        flags.push_str("HIGH ");
    }
    let title_style = if item.read {
        theme::table_row()
    } else {
        Style::default().fg(theme::DIM_WHITE).add_modifier(Modifier::BOLD)
    };
    Row::new(vec![
        Cell::from(item.icon).style(Style::default().fg(color)),
        Cell::from(item.category.clone()).style(theme::key_hint()),
        Cell::from(item.title.clone()).style(title_style),
        Cell::from(item.message.clone()),
        Cell::from(item.source.clone().unwrap_or_default()).style(Style::default().fg(theme::CORAL)),
        Cell::from(item.timestamp.clone()),
        Cell::from(flags).style(Style::default().fg(theme::RED).add_modifier(Modifier::BOLD)),
    ])
    .style(theme::table_row())
}

pub fn notification_header() -> Row<'static> {
    Row::new(
        ["", "Category", "Title", "Message", "Source", "Time", ""]
            .map(|h| Cell::from(h).style(theme::table_header())),
    )
}

pub const NOTIFICATION_WIDTHS: [Constraint; 7] = [
    Constraint::Length(2),
    Constraint::Length(12),
    Constraint::Fill(2),
    Constraint::Fill(3),
    Constraint::Length(22),
    Constraint::Length(16),
    Constraint::Length(5),
];

impl Component for AlertsScreen {
    fn handle_key_event(&mut self, key: KeyEvent, state: &DashboardState) -> Result<Option<Action>> {
        let feed = render::unread_feed(state);
        let len = feed.rows().len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(1, len);
                Ok(None)
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(-1, len);
                Ok(None)
            }
            KeyCode::Char('m') | KeyCode::Enter => Ok(feed
                .rows()
                .get(self.selected_index())
                .map(|item| Action::Acknowledge(item.id.clone()))),
            KeyCode::Char('M') if len > 0 => Ok(Some(Action::AcknowledgeAll)),
            KeyCode::Char('H') => Ok(Some(Action::OpenHistory)),
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: &Action, state: &DashboardState) -> Result<Option<Action>> {
        if let Action::DataApplied(DataSet::UnreadNotifications) = action {
            let len = render::unread_feed(state).rows().len();
            if self.selected_index() >= len {
                self.table_state.select(Some(len.saturating_sub(1)));
            }
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect, state: &DashboardState) {
        let mut title = vec![Span::styled(" Unread Notifications ", theme::title_style())];
        if let Some(badge) = badge_text(state.unread_count()) {
            title.push(Span::styled(format!(" {badge} "), theme::badge()));
            title.push(Span::raw(" "));
        }
        let block = Block::default()
            .title(Line::from(title))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);

        let hints = Line::from(vec![
            Span::styled("  j/k ", theme::key_hint_key()),
            Span::styled("select  ", theme::key_hint()),
            Span::styled("m ", theme::key_hint_key()),
            Span::styled("mark read  ", theme::key_hint()),
            Span::styled("M ", theme::key_hint_key()),
            Span::styled("mark all read  ", theme::key_hint()),
            Span::styled("H ", theme::key_hint_key()),
            Span::styled("history", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), layout[1]);

        let feed = render::unread_feed(state);
        if placeholder::render(frame, layout[0], &feed) {
            return;
        }

        let rows: Vec<Row> = feed.rows().iter().map(notification_row).collect();
        let table = Table::new(rows, NOTIFICATION_WIDTHS)
            .header(notification_header())
            .row_highlight_style(theme::table_selected());
        let mut table_state = self.table_state;
        frame.render_stateful_widget(table, layout[0], &mut table_state);
    }

    fn focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &'static str {
        "Alerts"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crossterm::event::KeyModifiers;
    use decoyscope_core::{ConsoleConfig, DataUpdate, Payload, Scope};
    use serde_json::json;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn state_with_unread(ids: &[&str]) -> DashboardState {
        let mut state = DashboardState::new(&ConsoleConfig::default());
        let items = ids
            .iter()
            .map(|id| {
                serde_json::from_value(json!({
                    "id": id, "type": "ALERT", "category": "ATTACK",
                    "title": "Brute force", "message": "many attempts", "read": false
                }))
                .unwrap()
            })
            .collect();
        state.apply(DataUpdate {
            set: DataSet::UnreadNotifications,
            generation: 1,
            scope: Scope::Whole,
            result: Ok(Payload::UnreadNotifications(items)),
        });
        state
    }

    #[test]
    fn mark_read_targets_the_selected_item() {
        let state = state_with_unread(&["n1", "n2"]);
        let mut screen = AlertsScreen::new();
        screen.handle_key_event(key(KeyCode::Char('j')), &state).unwrap();
        let action = screen.handle_key_event(key(KeyCode::Char('m')), &state).unwrap();
        assert!(matches!(action, Some(Action::Acknowledge(id)) if id == "n2"));
    }

    #[test]
    fn mark_all_needs_something_unread() {
        let mut screen = AlertsScreen::new();
        let empty = state_with_unread(&[]);
        let none = screen.handle_key_event(key(KeyCode::Char('M')), &empty).unwrap();
        assert!(none.is_none());

        let full = state_with_unread(&["n1"]);
        let all = screen.handle_key_event(key(KeyCode::Char('M')), &full).unwrap();
        assert!(matches!(all, Some(Action::AcknowledgeAll)));
    }

    #[test]
    fn selection_is_clamped_when_the_feed_shrinks() {
        let mut screen = AlertsScreen::new();
        let three = state_with_unread(&["a", "b", "c"]);
        screen.handle_key_event(key(KeyCode::Down), &three).unwrap();
        screen.handle_key_event(key(KeyCode::Down), &three).unwrap();
        assert_eq!(screen.selected_index(), 2);

        let one = state_with_unread(&["a"]);
        screen
            .update(&Action::DataApplied(DataSet::UnreadNotifications), &one)
            .unwrap();
        assert_eq!(screen.selected_index(), 0);
    }
}
