// ── Capture service control ──

use decoyscope_api::{ControlCommand, SystemStatus};

use crate::state::Widget;

/// Operator actions that mutate the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub enum ControlAction {
    Start,
    Stop,
    Restart,
    #[strum(to_string = "Clear logs")]
    ClearLogs,
}

impl ControlAction {
    /// Irreversible actions ask first.
    pub fn requires_confirmation(self) -> bool {
        self.confirm_prompt().is_some()
    }

    /// Question shown before running the action, if it needs one.
    pub fn confirm_prompt(self) -> Option<&'static str> {
        match self {
            Self::ClearLogs => Some("Delete ALL intrusion records? This cannot be undone."),
            Self::Start | Self::Stop | Self::Restart => None,
        }
    }

    pub fn command(self) -> Option<ControlCommand> {
        match self {
            Self::Start => Some(ControlCommand::Start),
            Self::Stop => Some(ControlCommand::Stop),
            Self::Restart => Some(ControlCommand::Restart),
            Self::ClearLogs => None,
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            Self::Start => "Capture service started",
            Self::Stop => "Capture service stopped",
            Self::Restart => "Capture service restarted",
            Self::ClearLogs => "All intrusion records deleted",
        }
    }
}

/// Which control actions are currently offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ControlAvailability {
    pub start: bool,
    pub stop: bool,
    pub restart: bool,
    pub clear_logs: bool,
}

impl ControlAvailability {
    /// Derive availability from the last status and any action in flight.
    ///
    /// Unknown status (loading or failed) leaves everything enabled so the
    /// operator can still act on a service the console cannot see.
    pub fn from_status(status: &Widget<SystemStatus>, pending: Option<ControlAction>) -> Self {
        let mut availability = match status {
            Widget::Ready(SystemStatus { running }) => Self {
                start: !running,
                stop: *running,
                restart: true,
                clear_logs: true,
            },
            Widget::Loading | Widget::Failed(_) => Self {
                start: true,
                stop: true,
                restart: true,
                clear_logs: true,
            },
        };
        if let Some(action) = pending {
            availability.set(action, false);
        }
        availability
    }

    pub fn allows(&self, action: ControlAction) -> bool {
        match action {
            ControlAction::Start => self.start,
            ControlAction::Stop => self.stop,
            ControlAction::Restart => self.restart,
            ControlAction::ClearLogs => self.clear_logs,
        }
    }

    fn set(&mut self, action: ControlAction, enabled: bool) {
        match action {
            ControlAction::Start => self.start = enabled,
            ControlAction::Stop => self.stop = enabled,
            ControlAction::Restart => self.restart = enabled,
            ControlAction::ClearLogs => self.clear_logs = enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_service_offers_start_only() {
        let status = Widget::Ready(SystemStatus { running: false });
        let a = ControlAvailability::from_status(&status, None);
        assert!(a.start);
        assert!(!a.stop);
        assert!(a.restart);
    }

    #[test]
    fn running_service_offers_stop() {
        let status = Widget::Ready(SystemStatus { running: true });
        let a = ControlAvailability::from_status(&status, None);
        assert!(!a.start);
        assert!(a.stop);
    }

    #[test]
    fn unknown_status_enables_everything_but_pending() {
        let a = ControlAvailability::from_status(
            &Widget::Failed("down".into()),
            Some(ControlAction::Restart),
        );
        assert!(a.start && a.stop && a.clear_logs);
        assert!(!a.allows(ControlAction::Restart));
    }

    #[test]
    fn only_clear_logs_needs_confirmation() {
        use strum::IntoEnumIterator;
        let confirmed: Vec<_> = ControlAction::iter()
            .filter(|a| a.requires_confirmation())
            .collect();
        assert_eq!(confirmed, vec![ControlAction::ClearLogs]);
    }

    #[test]
    fn service_commands_have_no_prompt() {
        assert!(ControlAction::Stop.confirm_prompt().is_none());
        assert!(ControlAction::Restart.confirm_prompt().is_none());
        assert!(
            ControlAction::ClearLogs
                .confirm_prompt()
                .is_some_and(|p| p.contains("cannot be undone"))
        );
    }
}
