//! Application core — event loop, screen management, action dispatch.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use decoyscope_core::{
    ApiClient, Applied, CloseTrigger, ConsoleConfig, ControlAction, DashboardState, DataSet,
    LogRequest, NotificationQuery, RefreshEvent, RefreshOrchestrator, badge_text, render, report,
};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, TableState, Tabs},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::action::{Action, ConfirmAction, Toast};
use crate::bindings::ViewBindings;
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::overlay;
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;

const TOAST_TTL: Duration = Duration::from_secs(3);

/// Top-level application state and event loop.
pub struct App {
    /// Current active screen.
    active_screen: ScreenId,
    /// All screen components, keyed by ScreenId.
    screens: HashMap<ScreenId, Box<dyn Component>>,
    /// Whether the app should keep running.
    running: bool,
    /// Help overlay visibility.
    help_visible: bool,
    /// IP filter being typed; `Some` while the input line is open.
    ip_input: Option<String>,
    /// Terminal size for overlay hit-testing.
    terminal_size: (u16, u16),
    /// Action sender — components can dispatch actions through this.
    action_tx: mpsc::UnboundedSender<Action>,
    /// Action receiver — main loop drains this.
    action_rx: mpsc::UnboundedReceiver<Action>,
    /// Everything fetched so far, plus the view state around it.
    state: DashboardState,
    orchestrator: RefreshOrchestrator,
    /// Orchestrator tasks report here; the data bridge owns the receiver.
    event_tx: mpsc::UnboundedSender<RefreshEvent>,
    event_rx: Option<mpsc::UnboundedReceiver<RefreshEvent>>,
    refresh_interval: Duration,
    /// Cancellation token for the data bridge task.
    data_cancel: CancellationToken,
    bindings: ViewBindings,
    /// Pending confirmation dialog (blocks other input while active).
    pending_confirm: Option<ConfirmAction>,
    /// Active toast with display timestamp.
    toast: Option<(Toast, Instant)>,
    /// Selection inside the notification history overlay.
    history_table: TableState,
    /// Where exported reports are written.
    export_dir: PathBuf,
}

impl App {
    pub fn new(config: &ConsoleConfig, client: ApiClient, export_dir: PathBuf) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        Self {
            active_screen: ScreenId::Overview,
            screens: create_screens().into_iter().collect(),
            running: true,
            help_visible: false,
            ip_input: None,
            terminal_size: (0, 0),
            action_tx,
            action_rx,
            state: DashboardState::new(config),
            orchestrator: RefreshOrchestrator::new(Arc::new(client), config.top_limit),
            event_tx,
            event_rx: Some(event_rx),
            refresh_interval: config.refresh_interval,
            data_cancel: CancellationToken::new(),
            bindings: ViewBindings::new(),
            pending_confirm: None,
            toast: None,
            history_table: TableState::default().with_selected(Some(0)),
            export_dir,
        }
    }

    /// Initialize all screen components with the action sender.
    fn init_screens(&mut self) -> Result<()> {
        for screen in self.screens.values_mut() {
            screen.init(self.action_tx.clone())?;
        }
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
        Ok(())
    }

    /// Run the main event loop.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.terminal_size = tui.size().unwrap_or((80, 24));
        self.init_screens()?;

        if let Some(events) = self.event_rx.take() {
            let orchestrator = self.orchestrator.clone();
            let event_tx = self.event_tx.clone();
            let action_tx = self.action_tx.clone();
            let interval = self.refresh_interval;
            let cancel = self.data_cancel.clone();
            tokio::spawn(async move {
                crate::data_bridge::spawn_data_bridge(
                    orchestrator,
                    event_tx,
                    events,
                    action_tx,
                    interval,
                    cancel,
                )
                .await;
            });
        }

        // First cycle runs right away; the timer takes over from there.
        self.request_refresh();

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Mouse(mouse) => {
                    if let Some(action) = self.handle_mouse_event(mouse)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => {
                    self.action_tx.send(Action::Resize(w, h))?;
                }
                Event::Tick => {
                    self.action_tx.send(Action::Tick)?;
                }
                Event::Render => {
                    self.action_tx.send(Action::Render)?;
                }
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.data_cancel.cancel();
        events.stop();
        info!("TUI event loop ended");
        Ok(())
    }

    // ── Input ────────────────────────────────────────────────────────

    /// Map a key event to an action. Overlays capture input in stacking
    /// order; screen-specific keys are delegated to the active screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        // Confirmation dialog captures all input
        if self.pending_confirm.is_some() {
            return match key.code {
                KeyCode::Char('y' | 'Y') => Ok(Some(Action::ConfirmYes)),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Ok(Some(Action::ConfirmNo)),
                _ => Ok(None),
            };
        }

        if self.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Ok(Some(Action::ToggleHelp)),
                _ => Ok(None),
            };
        }

        if self.state.detail.is_open() {
            return match key.code {
                KeyCode::Char('x') => Ok(Some(Action::CloseDetail(CloseTrigger::CloseControl))),
                KeyCode::Esc => Ok(Some(Action::CloseDetail(CloseTrigger::CancelKey))),
                _ => Ok(None),
            };
        }

        if self.state.history_view.is_open() {
            return Ok(self.handle_history_key(key));
        }

        // The IP filter applies as it is typed
        if let Some(input) = self.ip_input.as_mut() {
            return match key.code {
                KeyCode::Esc => {
                    self.ip_input = None;
                    Ok(Some(Action::SetIpFilter(String::new())))
                }
                KeyCode::Enter => {
                    self.ip_input = None;
                    Ok(None)
                }
                KeyCode::Backspace => {
                    input.pop();
                    Ok(Some(Action::SetIpFilter(input.clone())))
                }
                KeyCode::Char(c) => {
                    input.push(c);
                    Ok(Some(Action::SetIpFilter(input.clone())))
                }
                _ => Ok(None),
            };
        }

        // Global keybindings
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('?')) => {
                return Ok(Some(Action::ToggleHelp));
            }
            (KeyModifiers::NONE, KeyCode::Char('r')) => return Ok(Some(Action::RequestRefresh)),
            (KeyModifiers::NONE, KeyCode::Char('e')) => return Ok(Some(Action::ExportReport)),

            // Service control
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('S')) => {
                return Ok(Some(Action::RequestControl(ControlAction::Start)));
            }
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('T')) => {
                return Ok(Some(Action::RequestControl(ControlAction::Stop)));
            }
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('R')) => {
                return Ok(Some(Action::RequestControl(ControlAction::Restart)));
            }
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('D')) => {
                return Ok(Some(Action::RequestControl(ControlAction::ClearLogs)));
            }

            // Screen navigation via number keys
            (KeyModifiers::NONE, KeyCode::Char(c)) if c.is_ascii_digit() => {
                let n = c.to_digit(10).and_then(|d| u8::try_from(d).ok());
                if let Some(screen) = n.and_then(ScreenId::from_number) {
                    return Ok(Some(Action::SwitchScreen(screen)));
                }
            }

            (KeyModifiers::NONE, KeyCode::Tab) => {
                return Ok(Some(Action::SwitchScreen(self.active_screen.next())));
            }
            (KeyModifiers::SHIFT, KeyCode::BackTab) => {
                return Ok(Some(Action::SwitchScreen(self.active_screen.prev())));
            }

            _ => {}
        }

        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            return screen.handle_key_event(key, &self.state);
        }

        Ok(None)
    }

    fn handle_history_key(&mut self, key: KeyEvent) -> Option<Action> {
        let section = render::history(&self.state);
        let len = section.rows().len();
        let selected = self.history_table.selected().unwrap_or(0);
        match key.code {
            KeyCode::Esc | KeyCode::Char('x') => Some(Action::CloseHistory),
            KeyCode::Char('j') | KeyCode::Down => {
                self.history_table
                    .select(Some((selected + 1).min(len.saturating_sub(1))));
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.history_table.select(Some(selected.saturating_sub(1)));
                None
            }
            KeyCode::Char('m') | KeyCode::Enter => section
                .rows()
                .get(selected)
                .filter(|item| !item.read)
                .map(|item| Action::Acknowledge(item.id.clone())),
            KeyCode::Char('M') => Some(Action::AcknowledgeAll),
            KeyCode::Char('t') => Some(Action::HistoryCycleType),
            KeyCode::Char('c') => Some(Action::HistoryCycleCategory),
            KeyCode::Char('C') => Some(Action::HistoryClearFilters),
            KeyCode::Char('[') | KeyCode::Left => Some(Action::HistoryPrevPage),
            KeyCode::Char(']') | KeyCode::Right => Some(Action::HistoryNextPage),
            _ => None,
        }
    }

    /// Clicks outside an open modal dismiss it; everything else goes to the screen.
    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        let clicked = matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left));
        let frame = self.frame_area();

        if self.state.detail.is_open() {
            let outside = !overlay::contains(overlay::detail_rect(frame), mouse.column, mouse.row);
            return Ok((clicked && outside).then_some(Action::CloseDetail(CloseTrigger::OutsideClick)));
        }
        if self.state.history_view.is_open() {
            let outside = !overlay::contains(overlay::history_rect(frame), mouse.column, mouse.row);
            return Ok((clicked && outside).then_some(Action::CloseHistory));
        }

        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            return screen.handle_mouse_event(mouse);
        }
        Ok(None)
    }

    fn frame_area(&self) -> Rect {
        let (width, height) = self.terminal_size;
        Rect::new(0, 0, width, height)
    }

    // ── Actions ──────────────────────────────────────────────────────

    /// Process a single action — update app state and propagate to components.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.running = false;
            }

            Action::Resize(w, h) => {
                self.terminal_size = (*w, *h);
            }

            Action::SwitchScreen(target) => {
                if *target != self.active_screen {
                    debug!("switching screen: {} → {}", self.active_screen, target);
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(false);
                    }
                    self.active_screen = *target;
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(true);
                    }
                }
            }

            Action::ToggleHelp => {
                self.help_visible = !self.help_visible;
            }

            Action::Render | Action::DataApplied(_) => {}

            Action::Tick => {
                if let Some((_, created)) = &self.toast {
                    if created.elapsed() > TOAST_TTL {
                        self.toast = None;
                    }
                }
            }

            Action::RequestRefresh => {
                if !self.request_refresh() {
                    self.notify(Toast::info("Refresh already in progress"))?;
                }
            }

            Action::Refresh(event) => self.handle_refresh(event.clone())?,

            // ── Log table ──
            Action::LogsPrevPage => {
                if self.state.log_view.previous_page() {
                    self.fetch_log_page();
                    self.forward(ScreenId::Logs, action)?;
                }
            }
            Action::LogsNextPage => {
                if self.state.log_view.can_go_forward() {
                    self.state.log_view.next_page();
                    self.fetch_log_page();
                    self.forward(ScreenId::Logs, action)?;
                }
            }
            Action::CycleProtocolFilter => {
                self.state.log_view.cycle_protocol_filter();
                self.forward(ScreenId::Logs, action)?;
            }
            Action::OpenIpFilter => {
                self.ip_input = Some(self.state.log_view.ip_filter().to_owned());
            }
            Action::SetIpFilter(needle) => {
                self.state.log_view.set_ip_filter(needle.clone());
                self.forward(ScreenId::Logs, action)?;
            }
            Action::ClearLogFilters => {
                self.ip_input = None;
                self.state.log_view.clear_filters();
                self.forward(ScreenId::Logs, action)?;
            }

            // ── Session detail ──
            Action::OpenDetail(log_id) => match self.state.open_detail(log_id) {
                Ok(()) => debug!(log_id, "session detail opened"),
                Err(e) => self.notify(Toast::error(e.to_string()))?,
            },
            Action::CloseDetail(trigger) => {
                if self.state.detail.close(*trigger) {
                    debug!(?trigger, "session detail closed");
                }
            }

            // ── Notifications ──
            Action::Acknowledge(id) => {
                self.orchestrator
                    .acknowledge(id.clone(), self.open_history_query(), &self.event_tx);
            }
            Action::AcknowledgeAll => {
                self.orchestrator
                    .acknowledge_all(self.open_history_query(), &self.event_tx);
            }
            Action::OpenHistory => {
                let query = self.state.history_view.open();
                self.fetch_history(query);
            }
            Action::CloseHistory => {
                self.state.history_view.close();
            }
            Action::HistoryCycleType => {
                let query = self.state.history_view.cycle_kind();
                self.fetch_history(query);
            }
            Action::HistoryCycleCategory => {
                let query = self.state.history_view.cycle_category();
                self.fetch_history(query);
            }
            Action::HistoryClearFilters => {
                let query = self.state.history_view.clear_filters();
                self.fetch_history(query);
            }
            Action::HistoryPrevPage => {
                if let Some(query) = self.state.history_view.previous_page() {
                    self.fetch_history(query);
                }
            }
            Action::HistoryNextPage => {
                if let Some(query) = self.state.history_view.next_page() {
                    self.fetch_history(query);
                }
            }

            // ── Service control ──
            Action::RequestControl(control) => {
                if !self.state.controls().allows(*control) {
                    self.notify(Toast::warning(format!("{control} is not available right now")))?;
                } else if control.requires_confirmation() {
                    self.pending_confirm = Some(ConfirmAction(*control));
                } else {
                    self.run_control(*control)?;
                }
            }
            Action::ConfirmYes => {
                if let Some(ConfirmAction(control)) = self.pending_confirm.take() {
                    self.run_control(control)?;
                }
            }
            Action::ConfirmNo => {
                self.pending_confirm = None;
            }

            Action::ExportReport => {
                match write_report(&self.export_dir, &self.state, Local::now()) {
                    Ok(path) => {
                        info!(path = %path.display(), "report exported");
                        self.notify(Toast::success(format!("Report saved to {}", path.display())))?;
                    }
                    Err(e) => {
                        warn!(error = %e, dir = %self.export_dir.display(), "report export failed");
                        self.notify(Toast::error(format!("Export failed: {e}")))?;
                    }
                }
            }

            Action::Notify(toast) => {
                self.toast = Some((toast.clone(), Instant::now()));
            }
        }

        Ok(())
    }

    fn handle_refresh(&mut self, event: RefreshEvent) -> Result<()> {
        match event {
            RefreshEvent::Data(update) => {
                let set = update.set;
                match self.state.apply(update) {
                    Applied::Updated => {
                        if set == DataSet::NotificationHistory {
                            let len = overlay::history_len(&self.state);
                            if self.history_table.selected().unwrap_or(0) >= len {
                                self.history_table.select(Some(len.saturating_sub(1)));
                            }
                        }
                        if let Some(id) = self.bindings.screen_for(set) {
                            self.forward(id, &Action::DataApplied(set))?;
                        }
                    }
                    Applied::Stale | Applied::OutOfScope => {
                        debug!(?set, "update discarded");
                    }
                }
            }

            RefreshEvent::CycleCompleted { at } => {
                self.state.complete_cycle(at);
            }

            RefreshEvent::TimerFired => {
                self.request_refresh();
            }

            RefreshEvent::Acknowledged { id, result } => {
                let toast = match (result, id) {
                    (Ok(()), Some(_)) => Toast::success("Notification marked as read"),
                    (Ok(()), None) => Toast::success("All notifications marked as read"),
                    (Err(e), _) => Toast::error(format!("Could not mark as read: {e}")),
                };
                self.notify(toast)?;
            }

            RefreshEvent::ControlFinished { action, result } => {
                self.state.pending_control = None;
                match result {
                    Ok(_) => {
                        if action == ControlAction::ClearLogs {
                            self.state.log_view.reset();
                            self.state.last_page.clear();
                            self.state.detail.close(CloseTrigger::CloseControl);
                            // The cycle below is dropped if one is in flight
                            self.fetch_log_page();
                        }
                        self.notify(Toast::success(action.success_message()))?;
                    }
                    Err(e) => self.notify(Toast::error(format!("{action} failed: {e}")))?,
                }
                self.orchestrator.fetch_status(&self.event_tx);
                self.request_refresh();
            }
        }
        Ok(())
    }

    /// Start a full cycle for the page the log table is on.
    fn request_refresh(&mut self) -> bool {
        let logs = LogRequest {
            page: self.state.log_view.page(),
            size: self.state.log_view.page_size(),
        };
        self.orchestrator.trigger(logs, &self.event_tx)
    }

    fn fetch_log_page(&mut self) {
        self.state.begin_log_fetch();
        let logs = LogRequest {
            page: self.state.log_view.page(),
            size: self.state.log_view.page_size(),
        };
        self.orchestrator.fetch_logs(logs, &self.event_tx);
    }

    fn fetch_history(&mut self, query: NotificationQuery) {
        self.state.begin_history_fetch();
        self.history_table.select(Some(0));
        self.orchestrator.fetch_history(query, &self.event_tx);
    }

    fn open_history_query(&self) -> Option<NotificationQuery> {
        self.state
            .history_view
            .is_open()
            .then(|| self.state.history_view.query())
    }

    fn run_control(&mut self, control: ControlAction) -> Result<()> {
        self.state.pending_control = Some(control);
        self.orchestrator.run_control(control, &self.event_tx);
        self.notify(Toast::info(format!("{control}...")))
    }

    fn notify(&self, toast: Toast) -> Result<()> {
        self.action_tx.send(Action::Notify(toast))?;
        Ok(())
    }

    /// Hand an action to one screen and dispatch whatever it answers with.
    fn forward(&mut self, id: ScreenId, action: &Action) -> Result<()> {
        if let Some(screen) = self.screens.get_mut(&id) {
            if let Some(follow_up) = screen.update(action, &self.state)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // Layout: [screen content] [tab bar] [status bar]
        let layout = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, layout[0], &self.state);
        }
        self.render_tab_bar(frame, layout[1]);
        self.render_status_bar(frame, layout[2]);

        // Overlays, last = topmost
        if let Some(view) = self.state.detail.view() {
            overlay::render_detail(frame, area, view);
        }
        if self.state.history_view.is_open() {
            overlay::render_history(frame, area, &self.state, self.history_table);
        }
        if let Some((ref toast, _)) = self.toast {
            overlay::render_toast(frame, area, toast);
        }
        if let Some(confirm) = self.pending_confirm {
            overlay::render_confirm(frame, area, confirm);
        }
        if self.help_visible {
            overlay::render_help(frame, area);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let badge = badge_text(self.state.unread_count());
        let titles: Vec<Line> = ScreenId::ALL
            .iter()
            .map(|&id| {
                let style = if id == self.active_screen {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                let mut spans = vec![Span::styled(format!(" {} {} ", id.number(), id.label()), style)];
                if let (ScreenId::Alerts, Some(badge)) = (id, badge.as_ref()) {
                    spans.push(Span::styled(format!(" {badge} "), theme::badge()));
                }
                Line::from(spans)
            })
            .collect();

        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(
                ScreenId::ALL
                    .iter()
                    .position(|&s| s == self.active_screen)
                    .unwrap_or(0),
            );

        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        if let Some(input) = &self.ip_input {
            let line = Line::from(vec![
                Span::styled(" IP ", Style::default().fg(theme::ACCENT)),
                Span::styled(input.as_str(), Style::default().fg(theme::CYAN)),
                Span::styled("█", Style::default().fg(theme::CYAN)),
                Span::styled("  Esc clear  Enter keep", theme::key_hint()),
            ]);
            frame.render_widget(Paragraph::new(line), area);
            return;
        }

        let indicator = render::status_indicator(&self.state);
        let color = theme::service_color(indicator.state);
        let mut spans = vec![
            Span::raw(" "),
            Span::styled(format!("● {}", indicator.state), Style::default().fg(color)),
            Span::styled(" │ ", theme::key_hint()),
            Span::styled(updated_label(self.state.last_updated), theme::key_hint()),
        ];
        if self.orchestrator.is_refreshing() {
            spans.push(Span::styled("  ◐ refreshing", Style::default().fg(theme::YELLOW)));
        }
        spans.push(Span::styled(
            " │ ? help  r refresh  e export  q quit",
            theme::key_hint(),
        ));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

fn updated_label(at: Option<DateTime<Local>>) -> String {
    at.map_or_else(
        || "Never updated".to_owned(),
        |at| format!("Updated {}", at.format("%H:%M:%S")),
    )
}

/// Write the HTML report into `dir` under a timestamped name.
fn write_report(dir: &Path, state: &DashboardState, now: DateTime<Local>) -> std::io::Result<PathBuf> {
    let path = dir.join(format!("decoyscope-report-{}.html", now.format("%Y%m%d-%H%M%S")));
    std::fs::write(&path, report::render_html(state, now))?;
    Ok(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use decoyscope_core::{ControlResponse, DataUpdate, LogPage, Payload, Scope, SystemStatus, Widget};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn app() -> App {
        let config = ConsoleConfig::default();
        let client = config.build_client().unwrap();
        let mut app = App::new(&config, client, PathBuf::from("."));
        app.terminal_size = (120, 40);
        app
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn drain_toast(app: &mut App) -> Option<Toast> {
        let mut last = None;
        while let Ok(action) = app.action_rx.try_recv() {
            if let Action::Notify(toast) = action {
                last = Some(toast);
            }
        }
        last
    }

    fn load_logs(app: &mut App) {
        let logs = serde_json::from_value(json!([
            {"id": "a", "sourceIp": "10.0.0.1", "protocol": "SSH",
             "commands": [{"command": "uname -a", "timestamp": "2024-06-15T10:30:00"}]}
        ]))
        .unwrap();
        let update = DataUpdate {
            set: DataSet::Logs,
            generation: 1,
            scope: Scope::LogPage(0),
            result: Ok(Payload::Logs(LogPage {
                logs,
                total_pages: Some(1),
            })),
        };
        app.process_action(&Action::Refresh(RefreshEvent::Data(update)))
            .unwrap();
    }

    fn set_running(app: &mut App, running: bool) {
        app.state.apply(DataUpdate {
            set: DataSet::Status,
            generation: 1,
            scope: Scope::Whole,
            result: Ok(Payload::Status(SystemStatus { running })),
        });
    }

    #[test]
    fn confirm_dialog_swallows_other_keys() {
        let mut app = app();
        app.pending_confirm = Some(ConfirmAction(ControlAction::ClearLogs));
        assert!(app.handle_key_event(key(KeyCode::Char('q'))).unwrap().is_none());
        assert!(matches!(
            app.handle_key_event(key(KeyCode::Char('y'))).unwrap(),
            Some(Action::ConfirmYes)
        ));
    }

    #[test]
    fn clearing_logs_asks_first() {
        let mut app = app();
        set_running(&mut app, true);
        app.process_action(&Action::RequestControl(ControlAction::ClearLogs))
            .unwrap();
        assert_eq!(
            app.pending_confirm,
            Some(ConfirmAction(ControlAction::ClearLogs))
        );
        app.process_action(&Action::ConfirmNo).unwrap();
        assert!(app.pending_confirm.is_none());
        assert!(app.state.pending_control.is_none());
    }

    #[tokio::test]
    async fn clearing_logs_drops_the_cached_page() {
        let mut app = app();
        app.state.log_view.next_page();
        let logs = serde_json::from_value(json!([{"id": "a", "protocol": "SSH"}])).unwrap();
        app.process_action(&Action::Refresh(RefreshEvent::Data(DataUpdate {
            set: DataSet::Logs,
            generation: 1,
            scope: Scope::LogPage(1),
            result: Ok(Payload::Logs(LogPage {
                logs,
                total_pages: Some(3),
            })),
        })))
        .unwrap();
        app.process_action(&Action::OpenDetail("a".into())).unwrap();
        assert!(app.state.detail.is_open());

        // A cycle already in flight swallows the post-clear trigger
        assert!(app.request_refresh());
        app.handle_refresh(RefreshEvent::ControlFinished {
            action: ControlAction::ClearLogs,
            result: Ok(ControlResponse::default()),
        })
        .unwrap();

        assert_eq!(app.state.log_view.page(), 0);
        assert_eq!(app.state.logs, Widget::Loading);
        assert!(app.state.last_page.entries().is_empty());
        assert!(!app.state.detail.is_open());
        assert!(app.state.open_detail("a").is_err());
    }

    #[test]
    fn stop_is_refused_while_the_service_is_stopped() {
        let mut app = app();
        set_running(&mut app, false);
        app.process_action(&Action::RequestControl(ControlAction::Stop))
            .unwrap();
        assert!(app.state.pending_control.is_none());
        let toast = drain_toast(&mut app).unwrap();
        assert_eq!(toast.message, "Stop is not available right now");
    }

    #[test]
    fn unknown_log_id_raises_a_toast() {
        let mut app = app();
        app.process_action(&Action::OpenDetail("ghost".into())).unwrap();
        assert!(!app.state.detail.is_open());
        assert!(drain_toast(&mut app).is_some());
    }

    #[test]
    fn detail_closes_on_escape_and_outside_click() {
        let mut app = app();
        load_logs(&mut app);
        app.process_action(&Action::OpenDetail("a".into())).unwrap();
        assert!(app.state.detail.is_open());

        // Inside the modal nothing happens
        assert!(app.handle_mouse_event(click(60, 20)).unwrap().is_none());
        let outside = app.handle_mouse_event(click(0, 0)).unwrap();
        assert!(matches!(
            outside,
            Some(Action::CloseDetail(CloseTrigger::OutsideClick))
        ));

        let esc = app.handle_key_event(key(KeyCode::Esc)).unwrap();
        assert!(matches!(esc, Some(Action::CloseDetail(CloseTrigger::CancelKey))));
        app.process_action(&esc.unwrap()).unwrap();
        assert!(!app.state.detail.is_open());
    }

    #[test]
    fn ip_filter_applies_while_typing() {
        let mut app = app();
        app.process_action(&Action::OpenIpFilter).unwrap();
        let first = app.handle_key_event(key(KeyCode::Char('1'))).unwrap();
        let second = app.handle_key_event(key(KeyCode::Char('0'))).unwrap();
        assert!(matches!(first, Some(Action::SetIpFilter(ref s)) if s == "1"));
        assert!(matches!(second, Some(Action::SetIpFilter(ref s)) if s == "10"));

        app.process_action(&second.unwrap()).unwrap();
        assert_eq!(app.state.log_view.ip_filter(), "10");

        let esc = app.handle_key_event(key(KeyCode::Esc)).unwrap();
        assert!(app.ip_input.is_none());
        app.process_action(&esc.unwrap()).unwrap();
        assert_eq!(app.state.log_view.ip_filter(), "");
    }

    #[test]
    fn digits_switch_screens_outside_the_ip_input() {
        let mut app = app();
        let action = app.handle_key_event(key(KeyCode::Char('2'))).unwrap();
        assert!(matches!(action, Some(Action::SwitchScreen(ScreenId::Logs))));
        app.process_action(&action.unwrap()).unwrap();
        assert_eq!(app.active_screen, ScreenId::Logs);
        assert!(app.handle_key_event(key(KeyCode::Char('9'))).unwrap().is_none());
    }

    #[test]
    fn toast_expires_on_tick() {
        let mut app = app();
        let shown = Instant::now().checked_sub(TOAST_TTL * 2).unwrap();
        app.toast = Some((Toast::info("hello"), shown));
        app.process_action(&Action::Tick).unwrap();
        assert!(app.toast.is_none());
    }

    #[test]
    fn report_lands_in_the_export_dir() {
        let dir = tempfile::tempdir().unwrap();
        let app = app();
        let now = Local::now();
        let path = write_report(dir.path(), &app.state, now).unwrap();
        assert!(path.starts_with(dir.path()));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("decoyscope-report-"));
        assert!(std::fs::read_to_string(&path).unwrap().contains("<html"));
    }

    #[test]
    fn never_updated_until_a_cycle_completes() {
        assert_eq!(updated_label(None), "Never updated");
    }
}
