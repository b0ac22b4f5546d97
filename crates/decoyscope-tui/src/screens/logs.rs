//! Logs screen — the paginated intrusion table with client-side filters.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use decoyscope_core::render::{self, LogRow, Section};
use decoyscope_core::{DashboardState, DataSet, Protocol};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::{placeholder, sub_tabs};

const PROTOCOL_TABS: [&str; 3] = ["All", "SSH", "TELNET"];

pub struct LogsScreen {
    focused: bool,
    table_state: TableState,
}

impl LogsScreen {
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
        if len == 0 {
            self.table_state.select(Some(0));
            return;
        }
        let next = self.selected_index().saturating_add_signed(delta).min(len - 1);
        self.table_state.select(Some(next));
    }

    fn clamp_selection(&mut self, len: usize) {
        if self.selected_index() >= len {
            self.table_state.select(Some(len.saturating_sub(1)));
        }
    }

    fn selected_row<'a>(&self, section: &'a Section<LogRow>) -> Option<&'a LogRow> {
        section.rows().get(self.selected_index())
    }
}

fn protocol_tab(state: &DashboardState) -> usize {
    match state.log_view.protocol_filter() {
        Some(Protocol::Ssh) => 1,
        Some(Protocol::Telnet) => 2,
        None | Some(Protocol::Other(_)) => 0,
    }
}

fn render_filters(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let mut line = sub_tabs::render_sub_tabs(&PROTOCOL_TABS, protocol_tab(state));
    let needle = state.log_view.ip_filter();
    line.spans.push(Span::styled("    IP ", theme::key_hint()));
    if needle.is_empty() {
        line.spans.push(Span::styled("any", theme::tab_inactive()));
    } else {
        line.spans
            .push(Span::styled(needle.to_owned(), theme::tab_active()));
    }
    frame.render_widget(Paragraph::new(line), area);
}

fn render_footer(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let footer = render::log_footer(&state.log_view);
    let nav = |enabled: bool| {
        if enabled {
            theme::key_hint_key()
        } else {
            theme::key_hint_disabled()
        }
    };
    let line = Line::from(vec![
        Span::styled("  ◀ h ", nav(footer.can_prev)),
        Span::styled(format!(" {} ", footer.label), theme::title_style()),
        Span::styled(" l ▶", nav(footer.can_next)),
        Span::styled("    j/k ", theme::key_hint_key()),
        Span::styled("select  ", theme::key_hint()),
        Span::styled("Enter ", theme::key_hint_key()),
        Span::styled("commands  ", theme::key_hint()),
        Span::styled("p ", theme::key_hint_key()),
        Span::styled("protocol  ", theme::key_hint()),
        Span::styled("/ ", theme::key_hint_key()),
        Span::styled("ip  ", theme::key_hint()),
        Span::styled("c ", theme::key_hint_key()),
        Span::styled("clear filters", theme::key_hint()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

impl Component for LogsScreen {
    fn handle_key_event(&mut self, key: KeyEvent, state: &DashboardState) -> Result<Option<Action>> {
        let section = render::log_table(state);
        let len = section.rows().len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(1, len);
                Ok(None)
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(-1, len);
                Ok(None)
            }
            KeyCode::Char('g') => {
                self.table_state.select(Some(0));
                Ok(None)
            }
            KeyCode::Char('G') => {
                self.table_state.select(Some(len.saturating_sub(1)));
                Ok(None)
            }
            KeyCode::Char('h') | KeyCode::Left => Ok(Some(Action::LogsPrevPage)),
            KeyCode::Char('l') | KeyCode::Right => Ok(Some(Action::LogsNextPage)),
            KeyCode::Char('p') => Ok(Some(Action::CycleProtocolFilter)),
            KeyCode::Char('/') => Ok(Some(Action::OpenIpFilter)),
            KeyCode::Char('c') => Ok(Some(Action::ClearLogFilters)),
            KeyCode::Enter | KeyCode::Char('v') => Ok(self
                .selected_row(&section)
                .map(|row| Action::OpenDetail(row.id.clone()))),
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: &Action, state: &DashboardState) -> Result<Option<Action>> {
        match action {
            Action::LogsPrevPage
            | Action::LogsNextPage
            | Action::CycleProtocolFilter
            | Action::SetIpFilter(_)
            | Action::ClearLogFilters => {
                self.table_state.select(Some(0));
            }
            Action::DataApplied(DataSet::Logs) => {
                self.clamp_selection(render::log_table(state).rows().len());
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect, state: &DashboardState) {
        let block = Block::default()
            .title(" Intrusion Logs ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([
            Constraint::Length(1), // filters
            Constraint::Min(1),    // table
            Constraint::Length(1), // footer
        ])
        .split(inner);

        render_filters(frame, layout[0], state);
        render_footer(frame, layout[2], state);

        let section = render::log_table(state);
        if placeholder::render(frame, layout[1], &section) {
            return;
        }

        let header = Row::new(
            [
                "Time",
                "Source IP",
                "Proto",
                "Username",
                "Password",
                "Last command",
                "Cmds",
            ]
            .map(|h| Cell::from(h).style(theme::table_header())),
        );

        let rows: Vec<Row> = section
            .rows()
            .iter()
            .map(|row| {
                let proto_color = match row.protocol.as_str() {
                    "SSH" => theme::SSH_COLOR,
                    "TELNET" => theme::TELNET_COLOR,
                    _ => theme::DIM_WHITE,
                };
                Row::new(vec![
                    Cell::from(row.timestamp.clone()),
                    Cell::from(row.source_ip.clone()).style(Style::default().fg(theme::CORAL)),
                    Cell::from(row.protocol.clone()).style(Style::default().fg(proto_color)),
                    Cell::from(row.username.clone()),
                    Cell::from(row.password.clone()),
                    Cell::from(row.last_command.clone()).style(Style::default().fg(theme::YELLOW)),
                    Cell::from(row.command_count.to_string()),
                ])
                .style(theme::table_row())
            })
            .collect();

        let widths = [
            Constraint::Length(16),
            Constraint::Length(15),
            Constraint::Length(7),
            Constraint::Length(18),
            Constraint::Length(18),
            Constraint::Fill(1),
            Constraint::Length(5),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(theme::table_selected());

        let mut table_state = self.table_state;
        frame.render_stateful_widget(table, layout[1], &mut table_state);
    }

    fn focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &'static str {
        "Logs"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crossterm::event::KeyModifiers;
    use decoyscope_core::{ConsoleConfig, DataUpdate, LogPage, Payload, Scope};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn state_with_logs() -> DashboardState {
        let mut state = DashboardState::new(&ConsoleConfig::default());
        let logs = serde_json::from_value(json!([
            {"id": "a", "sourceIp": "10.0.0.1", "protocol": "SSH", "commands": []},
            {"id": "b", "sourceIp": "10.0.0.2", "protocol": "TELNET", "commands": []}
        ]))
        .unwrap();
        let page = LogPage {
            logs,
            total_pages: Some(1),
        };
        state.apply(DataUpdate {
            set: DataSet::Logs,
            generation: 1,
            scope: Scope::LogPage(0),
            result: Ok(Payload::Logs(page)),
        });
        state
    }

    #[test]
    fn enter_opens_the_selected_row() {
        let state = state_with_logs();
        let mut screen = LogsScreen::new();
        screen.handle_key_event(key(KeyCode::Char('j')), &state).unwrap();
        let action = screen.handle_key_event(key(KeyCode::Enter), &state).unwrap();
        assert!(matches!(action, Some(Action::OpenDetail(id)) if id == "b"));
    }

    #[test]
    fn selection_stops_at_the_last_row() {
        let state = state_with_logs();
        let mut screen = LogsScreen::new();
        for _ in 0..5 {
            screen.handle_key_event(key(KeyCode::Down), &state).unwrap();
        }
        assert_eq!(screen.selected_index(), 1);
    }

    #[test]
    fn enter_on_an_empty_table_does_nothing() {
        let state = DashboardState::new(&ConsoleConfig::default());
        let mut screen = LogsScreen::new();
        let action = screen.handle_key_event(key(KeyCode::Enter), &state).unwrap();
        assert!(action.is_none());
    }

    #[test]
    fn filter_change_resets_selection() {
        let state = state_with_logs();
        let mut screen = LogsScreen::new();
        screen.handle_key_event(key(KeyCode::Down), &state).unwrap();
        screen.update(&Action::CycleProtocolFilter, &state).unwrap();
        assert_eq!(screen.selected_index(), 0);
    }

    #[test]
    fn paging_keys_map_to_actions() {
        let state = state_with_logs();
        let mut screen = LogsScreen::new();
        let prev = screen.handle_key_event(key(KeyCode::Char('h')), &state).unwrap();
        let next = screen.handle_key_event(key(KeyCode::Right), &state).unwrap();
        assert!(matches!(prev, Some(Action::LogsPrevPage)));
        assert!(matches!(next, Some(Action::LogsNextPage)));
    }
}
