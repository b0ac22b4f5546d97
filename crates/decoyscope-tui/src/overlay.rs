//! Overlays drawn on top of the active screen: session detail, notification
//! history, confirm dialog, help, and the toast.
//!
//! Rectangles are pure functions of the frame area so mouse handling can
//! hit-test against exactly what was drawn.

use decoyscope_core::render;
use decoyscope_core::{CATEGORIES, DashboardState, NotificationType, SessionView};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, TableState};

use crate::action::{ConfirmAction, Toast, ToastLevel};
use crate::screens::alerts::{NOTIFICATION_WIDTHS, notification_header, notification_row};
use crate::theme;
use crate::widgets::{placeholder, sub_tabs};

// ── Geometry ─────────────────────────────────────────────────────────

pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn scaled(area: Rect, pct: u32) -> Rect {
    let scale = |n: u16| u16::try_from(u32::from(n) * pct / 100).unwrap_or(n);
    centered(area, scale(area.width), scale(area.height))
}

pub fn detail_rect(area: Rect) -> Rect {
    scaled(area, 80)
}

pub fn history_rect(area: Rect) -> Rect {
    scaled(area, 90)
}

pub fn contains(rect: Rect, column: u16, row: u16) -> bool {
    rect.contains(Position::new(column, row))
}

fn modal(frame: &mut Frame, rect: Rect, title: String, border: Style) -> Rect {
    frame.render_widget(Clear, rect);
    let block = Block::default()
        .title(title)
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border)
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);
    inner
}

fn field<'a>(label: &'a str, value: String) -> [Span<'a>; 2] {
    [
        Span::styled(format!("  {label:<12}"), Style::default().fg(theme::DIM_WHITE)),
        Span::styled(value, Style::default().fg(theme::CYAN)),
    ]
}

// ── Session detail ───────────────────────────────────────────────────

pub fn render_detail(frame: &mut Frame, area: Rect, view: &SessionView) {
    let header = render::detail_header(view);
    let inner = modal(
        frame,
        detail_rect(area),
        format!(" Session {} ", header.session_id),
        theme::border_focused(),
    );

    let layout = Layout::vertical([
        Constraint::Length(5),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .split(inner);

    let mut first = Vec::new();
    first.extend(field("Source IP", header.source_ip));
    first.extend(field("Protocol", header.protocol));
    let mut second = Vec::new();
    second.extend(field("Started", header.started));
    second.extend(field("Commands", header.command_count.to_string()));
    let lines = vec![
        Line::from(""),
        Line::from(first),
        Line::from(second),
        Line::from(field("Credentials", header.credentials).to_vec()),
    ];
    frame.render_widget(Paragraph::new(lines), layout[0]);

    let transcript = render::transcript(view);
    if !placeholder::render(frame, layout[1], &transcript) {
        let rows: Vec<Row> = transcript
            .rows()
            .iter()
            .map(|line| {
                Row::new(vec![
                    Cell::from(line.timestamp.clone()).style(theme::key_hint()),
                    Cell::from(format!("$ {}", line.command))
                        .style(Style::default().fg(theme::YELLOW)),
                ])
            })
            .collect();
        let table = Table::new(rows, [Constraint::Length(18), Constraint::Fill(1)]).header(
            Row::new(["Time", "Command"].map(|h| Cell::from(h).style(theme::table_header()))),
        );
        frame.render_widget(table, layout[1]);
    }

    let hints = Line::from(vec![
        Span::styled("  x ", theme::key_hint_key()),
        Span::styled("close  ", theme::key_hint()),
        Span::styled("Esc ", theme::key_hint_key()),
        Span::styled("close  ", theme::key_hint()),
        Span::styled("click outside ", theme::key_hint_key()),
        Span::styled("close", theme::key_hint()),
    ]);
    frame.render_widget(Paragraph::new(hints), layout[2]);
}

// ── Notification history ─────────────────────────────────────────────

fn type_tabs(active: Option<NotificationType>) -> (Vec<&'static str>, usize) {
    let mut labels = vec!["All"];
    let mut index = 0;
    for (i, kind) in NotificationType::filterable().enumerate() {
        labels.push(kind.as_param());
        if Some(kind) == active {
            index = i + 1;
        }
    }
    (labels, index)
}

fn category_tabs(active: Option<&str>) -> (Vec<&'static str>, usize) {
    let mut labels = vec!["All"];
    labels.extend(CATEGORIES);
    let index = active
        .and_then(|c| CATEGORIES.iter().position(|known| *known == c))
        .map_or(0, |i| i + 1);
    (labels, index)
}

fn history_page_label(state: &DashboardState) -> String {
    let view = &state.history_view;
    match view.total_pages() {
        Some(total) => format!("Page {} of {}", view.page() + 1, total.max(1)),
        None => format!("Page {}", view.page() + 1),
    }
}

pub fn render_history(frame: &mut Frame, area: Rect, state: &DashboardState, table_state: TableState) {
    let inner = modal(
        frame,
        history_rect(area),
        " Notification History ".into(),
        theme::border_focused(),
    );

    let layout = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .split(inner);

    let view = &state.history_view;
    let (types, type_index) = type_tabs(view.kind());
    let mut type_line = sub_tabs::render_sub_tabs(&types, type_index);
    type_line.spans.insert(0, Span::styled("  Type      ", theme::key_hint()));
    frame.render_widget(Paragraph::new(type_line), layout[0]);

    let (categories, category_index) = category_tabs(view.category());
    let mut category_line = sub_tabs::render_sub_tabs(&categories, category_index);
    category_line
        .spans
        .insert(0, Span::styled("  Category  ", theme::key_hint()));
    frame.render_widget(Paragraph::new(category_line), layout[1]);

    let section = render::history(state);
    if !placeholder::render(frame, layout[2], &section) {
        let rows: Vec<Row> = section.rows().iter().map(notification_row).collect();
        let table = Table::new(rows, NOTIFICATION_WIDTHS)
            .header(notification_header())
            .row_highlight_style(theme::table_selected());
        let mut table_state = table_state;
        frame.render_stateful_widget(table, layout[2], &mut table_state);
    }

    let footer = Line::from(vec![
        Span::styled(format!("  {}  ", history_page_label(state)), theme::title_style()),
        Span::styled("[ ] ", theme::key_hint_key()),
        Span::styled("page  ", theme::key_hint()),
        Span::styled("t ", theme::key_hint_key()),
        Span::styled("type  ", theme::key_hint()),
        Span::styled("c ", theme::key_hint_key()),
        Span::styled("category  ", theme::key_hint()),
        Span::styled("C ", theme::key_hint_key()),
        Span::styled("clear  ", theme::key_hint()),
        Span::styled("m ", theme::key_hint_key()),
        Span::styled("read  ", theme::key_hint()),
        Span::styled("M ", theme::key_hint_key()),
        Span::styled("all read  ", theme::key_hint()),
        Span::styled("Esc ", theme::key_hint_key()),
        Span::styled("close", theme::key_hint()),
    ]);
    frame.render_widget(Paragraph::new(footer), layout[3]);
}

/// Number of rows the history overlay currently lists.
pub fn history_len(state: &DashboardState) -> usize {
    render::history(state).rows().len()
}

// ── Confirm / help / toast ───────────────────────────────────────────

pub fn render_confirm(frame: &mut Frame, area: Rect, confirm: ConfirmAction) {
    let prompt = confirm.to_string();
    let width = u16::try_from(prompt.chars().count() + 6).unwrap_or(u16::MAX).max(40);
    let inner = modal(
        frame,
        centered(area, width, 5),
        " Confirm ".into(),
        Style::default().fg(theme::YELLOW),
    );
    let text = vec![
        Line::from(Span::styled(
            format!("  {prompt}"),
            Style::default().fg(theme::DIM_WHITE),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  y ", theme::key_hint_key()),
            Span::styled("confirm    ", theme::key_hint()),
            Span::styled("n ", theme::key_hint_key()),
            Span::styled("cancel", theme::key_hint()),
        ]),
    ];
    frame.render_widget(Paragraph::new(text), inner);
}

const HELP: &[(&str, &str)] = &[
    ("1-3 Tab", "Switch screen"),
    ("r", "Refresh now"),
    ("S / T / R", "Start / stop / restart service"),
    ("D", "Delete all intrusion records"),
    ("e", "Export HTML report"),
    ("j/k ↑/↓", "Move selection"),
    ("h/l ←/→", "Previous / next log page"),
    ("p", "Cycle protocol filter"),
    ("/", "Filter logs by IP"),
    ("c", "Clear log filters"),
    ("Enter", "View session commands"),
    ("m / M", "Mark read / mark all read"),
    ("H", "Notification history"),
    ("x Esc", "Close overlay"),
    ("?", "This help"),
    ("q", "Quit"),
];

pub fn render_help(frame: &mut Frame, area: Rect) {
    let height = u16::try_from(HELP.len() + 4).unwrap_or(u16::MAX);
    let inner = modal(
        frame,
        centered(area, 56, height),
        " Keyboard Shortcuts ".into(),
        theme::border_focused(),
    );
    let mut lines = vec![Line::from("")];
    lines.extend(HELP.iter().map(|(keys, what)| {
        Line::from(vec![
            Span::styled(format!("  {keys:<12}"), theme::key_hint_key()),
            Span::styled(*what, theme::key_hint()),
        ])
    }));
    lines.push(Line::from(Span::styled(
        "                        Esc or ? to close",
        theme::key_hint(),
    )));
    frame.render_widget(Paragraph::new(lines), inner);
}

/// Bottom-right, above the status bar.
pub fn render_toast(frame: &mut Frame, area: Rect, toast: &Toast) {
    let len = u16::try_from(toast.message.chars().count()).unwrap_or(u16::MAX);
    let width = len.saturating_add(6).clamp(20, 70).min(area.width);
    let height = 3u16;
    let x = area.width.saturating_sub(width + 1);
    let y = area.height.saturating_sub(height + 2);
    let rect = Rect::new(area.x + x, area.y + y, width, height);

    let (color, icon) = match toast.level {
        ToastLevel::Success => (theme::GREEN, "✓"),
        ToastLevel::Error => (theme::RED, "✗"),
        ToastLevel::Warning => (theme::YELLOW, "!"),
        ToastLevel::Info => (theme::CYAN, "·"),
    };

    let inner = modal(frame, rect, String::new(), Style::default().fg(color));
    let line = Line::from(vec![
        Span::styled(format!(" {icon} "), Style::default().fg(color)),
        Span::styled(toast.message.as_str(), Style::default().fg(theme::DIM_WHITE)),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}
