//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::fmt;

use decoyscope_core::{CloseTrigger, ControlAction, DataSet, RefreshEvent};

use crate::screen::ScreenId;

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A short-lived message in the bottom-right corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
}

impl Toast {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: ToastLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: ToastLevel::Error,
        }
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: ToastLevel::Warning,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: ToastLevel::Info,
        }
    }
}

/// An action waiting on a y/n answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmAction(pub ControlAction);

impl fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.confirm_prompt() {
            Some(prompt) => f.write_str(prompt),
            None => write!(f, "{}?", self.0),
        }
    }
}

/// Every state transition in the console is expressed as an Action.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenId),

    // ── Refresh ───────────────────────────────────────────────────
    RequestRefresh,
    /// Forwarded from the orchestrator by the data bridge.
    Refresh(RefreshEvent),
    /// A data set was applied to the dashboard state; sent to the bound screens.
    DataApplied(DataSet),

    // ── Log table ─────────────────────────────────────────────────
    LogsPrevPage,
    LogsNextPage,
    CycleProtocolFilter,
    OpenIpFilter,
    SetIpFilter(String),
    ClearLogFilters,

    // ── Session detail ────────────────────────────────────────────
    OpenDetail(String),
    CloseDetail(CloseTrigger),

    // ── Notifications ─────────────────────────────────────────────
    Acknowledge(String),
    AcknowledgeAll,
    OpenHistory,
    CloseHistory,
    HistoryCycleType,
    HistoryCycleCategory,
    HistoryClearFilters,
    HistoryPrevPage,
    HistoryNextPage,

    // ── Service control ───────────────────────────────────────────
    RequestControl(ControlAction),
    ConfirmYes,
    ConfirmNo,

    // ── Export ────────────────────────────────────────────────────
    ExportReport,

    // ── Overlays ──────────────────────────────────────────────────
    ToggleHelp,
    Notify(Toast),
}
