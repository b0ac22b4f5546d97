//! Overview screen — service status, counters, ranked lists, and the two charts.
//!
//! Layout:
//! ┌─ Service ───────┐┌─ Total ─┐┌─ SSH ─┐┌─ Telnet ─┐┌─ Unique IPs ─┐
//! │ ● Online Active ││   42    ││  30   ││    12    ││      7       │
//! └─────────────────┘└─────────┘└───────┘└──────────┘└──────────────┘
//! ┌─ Top Attacking IPs ───────────┐┌─ Top Credentials ──────────────┐
//! │ #  IP            Hits  Last   ││ #  Credential        Hits      │
//! └───────────────────────────────┘└────────────────────────────────┘
//! ┌─ Protocol Share ──────────────┐┌─ Attacks per Hour ─────────────┐
//! │ SSH    ████████████ 71%       ││ ▂▅█▃▁ ...                      │
//! └───────────────────────────────┘└────────────────────────────────┘

use decoyscope_core::DashboardState;
use decoyscope_core::render::{self, RankedRow, Section};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Bar, BarChart, BarGroup, Block, BorderType, Borders, Cell, Paragraph, Row, Table,
};

use crate::component::Component;
use crate::theme;
use crate::widgets::placeholder;

pub struct OverviewScreen {
    focused: bool,
}

impl OverviewScreen {
    pub fn new() -> Self {
        Self { focused: false }
    }
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {title} "))
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_default())
}

fn render_status(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let indicator = render::status_indicator(state);
    let color = theme::service_color(indicator.state);
    let block = panel("Service");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let hint = |key: &'static str, label: &'static str, enabled: bool| {
        let style = if enabled {
            theme::key_hint()
        } else {
            theme::key_hint_disabled()
        };
        [
            Span::styled(key, theme::key_hint_key()),
            Span::styled(label, style),
        ]
    };
    let controls = indicator.controls;
    let mut control_spans = vec![Span::raw(" ")];
    control_spans.extend(hint("S ", "start  ", controls.start));
    control_spans.extend(hint("T ", "stop  ", controls.stop));
    control_spans.extend(hint("R ", "restart  ", controls.restart));
    control_spans.extend(hint("D ", "clear", controls.clear_logs));

    let mut lines = vec![
        Line::from(vec![
            Span::styled(" ● ", Style::default().fg(color)),
            Span::styled(
                indicator.state.to_string(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", indicator.subtitle), theme::key_hint()),
        ]),
        Line::from(control_spans),
    ];
    if let Some(pending) = state.pending_control {
        lines.push(Line::from(Span::styled(
            format!(" {pending} in progress..."),
            Style::default().fg(theme::YELLOW),
        )));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_counters(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let counters = render::counters(state);
    let chunks = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(area);
    for (counter, chunk) in counters.iter().zip(chunks.iter()) {
        let style = if counter.value == "Error" {
            theme::placeholder_error()
        } else {
            Style::default().fg(theme::CYAN).add_modifier(Modifier::BOLD)
        };
        let block = panel(counter.label);
        let inner = block.inner(*chunk);
        frame.render_widget(block, *chunk);
        frame.render_widget(
            Paragraph::new(counter.value.as_str())
                .style(style)
                .alignment(Alignment::Center),
            inner,
        );
    }
}

fn render_ranked(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    key_header: &'static str,
    section: &Section<RankedRow>,
    with_last_seen: bool,
) {
    let block = panel(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if placeholder::render(frame, inner, section) {
        return;
    }

    let mut header = vec![
        Cell::from("#").style(theme::table_header()),
        Cell::from(key_header).style(theme::table_header()),
        Cell::from("Hits").style(theme::table_header()),
    ];
    let mut widths = vec![
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(7),
    ];
    if with_last_seen {
        header.push(Cell::from("Last seen").style(theme::table_header()));
        widths.push(Constraint::Length(16));
    }

    let rows: Vec<Row> = section
        .rows()
        .iter()
        .map(|row| {
            let mut cells = vec![
                Cell::from(row.rank.to_string()).style(theme::key_hint()),
                Cell::from(row.key.clone()).style(Style::default().fg(theme::CORAL)),
                Cell::from(row.count.to_string()).style(Style::default().fg(theme::CYAN)),
            ];
            if with_last_seen {
                cells.push(Cell::from(
                    row.last_seen.clone().unwrap_or_else(|| "-".into()),
                ));
            }
            Row::new(cells).style(theme::table_row())
        })
        .collect();

    frame.render_widget(Table::new(rows, widths).header(Row::new(header)), inner);
}

fn render_protocol_chart(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let block = panel("Protocol Share");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let section = render::protocol_chart(state);
    if placeholder::render(frame, inner, &section) {
        return;
    }
    let Some(share) = section.rows().first() else {
        return;
    };

    let bars = [
        Bar::default()
            .label(Line::from("SSH"))
            .value(share.ssh)
            .text_value(format!("{} ({:.0}%)", share.ssh, share.ssh_pct))
            .style(Style::default().fg(theme::SSH_COLOR)),
        Bar::default()
            .label(Line::from("TELNET"))
            .value(share.telnet)
            .text_value(format!("{} ({:.0}%)", share.telnet, share.telnet_pct))
            .style(Style::default().fg(theme::TELNET_COLOR)),
    ];
    let chart = BarChart::default()
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, inner);
}

#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
fn render_timeline(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let block = panel("Attacks per Hour");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let section = render::timeline(state);
    if placeholder::render(frame, inner, &section) {
        return;
    }

    let points = section.rows();
    let bars: Vec<Bar> = points
        .iter()
        .map(|p| {
            Bar::default()
                .label(Line::from(p.label.clone()))
                .value(p.count)
                .style(Style::default().fg(theme::ACCENT))
        })
        .collect();
    // Fit every bucket on screen; labels get cut before bars do.
    let slots = points.len().max(1) as u16;
    let bar_width = (inner.width.saturating_sub(slots) / slots).clamp(1, 6);
    let chart = BarChart::default()
        .bar_width(bar_width)
        .bar_gap(1)
        .value_style(Style::default().fg(theme::BG_DARK).bg(theme::ACCENT))
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, inner);
}

impl Component for OverviewScreen {
    fn render(&self, frame: &mut Frame, area: Rect, state: &DashboardState) {
        let rows = Layout::vertical([
            Constraint::Length(5),
            Constraint::Percentage(50),
            Constraint::Min(8),
        ])
        .split(area);

        let top = Layout::horizontal([Constraint::Length(38), Constraint::Min(20)]).split(rows[0]);
        render_status(frame, top[0], state);
        render_counters(frame, top[1], state);

        let middle = Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(rows[1]);
        render_ranked(
            frame,
            middle[0],
            "Top Attacking IPs",
            "IP",
            &render::top_ips(state),
            true,
        );
        render_ranked(
            frame,
            middle[1],
            "Top Credentials",
            "Username / Password",
            &render::top_credentials(state),
            false,
        );

        let bottom = Layout::horizontal([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(rows[2]);
        render_protocol_chart(frame, bottom[0], state);
        render_timeline(frame, bottom[1], state);
    }

    fn focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &'static str {
        "Overview"
    }
}
