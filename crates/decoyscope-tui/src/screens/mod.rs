//! Screen implementations. Each screen is a top-level Component.

pub mod alerts;
pub mod logs;
pub mod overview;

use crate::component::Component;
use crate::screen::ScreenId;

/// Create screen components in tab-bar order.
pub fn create_screens() -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (ScreenId::Overview, Box::new(overview::OverviewScreen::new())),
        (ScreenId::Logs, Box::new(logs::LogsScreen::new())),
        (ScreenId::Alerts, Box::new(alerts::AlertsScreen::new())),
    ]
}
