//! Which screen shows which data set.
//!
//! Built once at startup. When a fetch result lands in the dashboard state,
//! the app looks up the bound screen here and notifies only that one; the
//! orchestrator never learns about screens.

use std::collections::HashMap;

use decoyscope_core::DataSet;
use strum::IntoEnumIterator;

use crate::screen::ScreenId;

pub struct ViewBindings {
    table: HashMap<DataSet, ScreenId>,
}

impl ViewBindings {
    pub fn new() -> Self {
        Self {
            table: DataSet::iter().map(|set| (set, home(set))).collect(),
        }
    }

    pub fn screen_for(&self, set: DataSet) -> Option<ScreenId> {
        self.table.get(&set).copied()
    }
}

fn home(set: DataSet) -> ScreenId {
    match set {
        DataSet::Status
        | DataSet::Stats
        | DataSet::UniqueIps
        | DataSet::TopIps
        | DataSet::TopCredentials
        | DataSet::ProtocolChart
        | DataSet::Timeline => ScreenId::Overview,
        DataSet::Logs => ScreenId::Logs,
        DataSet::UnreadNotifications | DataSet::NotificationHistory => ScreenId::Alerts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_data_set_has_a_screen() {
        let bindings = ViewBindings::new();
        for set in DataSet::iter() {
            assert!(bindings.screen_for(set).is_some(), "{set} is unbound");
        }
    }

    #[test]
    fn log_results_go_to_the_log_screen_only() {
        let bindings = ViewBindings::new();
        assert_eq!(bindings.screen_for(DataSet::Logs), Some(ScreenId::Logs));
        assert_eq!(
            bindings.screen_for(DataSet::UnreadNotifications),
            Some(ScreenId::Alerts)
        );
        assert_eq!(bindings.screen_for(DataSet::Timeline), Some(ScreenId::Overview));
    }
}
