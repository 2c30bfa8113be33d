//! Notifier and observer that report through `tracing`.

use crate::timers::{Notifier, Observer, Severity, views::Snapshot};
use parking_lot::Mutex;
use tracing::{error, info, trace, warn};

pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info | Severity::Success => info!(%severity, "{message}"),
            Severity::Warning => warn!(%severity, "{message}"),
            Severity::Error => error!(%severity, "{message}"),
        }
    }

    fn alert(&self, title: &str, message: &str) {
        warn!(title, "{message}");
    }
}

/// Logs the dashboard summary whenever its counts change.
#[derive(Default)]
pub struct DashboardLog {
    last: Mutex<Option<(usize, usize, usize)>>,
}

impl Observer for DashboardLog {
    fn refresh(&self, snapshot: &Snapshot) {
        let summary = &snapshot.summary;
        let counts = (summary.active, summary.warning, summary.urgent);

        let mut last = self.last.lock();
        if *last == Some(counts) {
            trace!(active = summary.active, "dashboard unchanged");
            return;
        }
        *last = Some(counts);

        match &summary.next_to_complete {
            Some(next) => info!(
                active = summary.active,
                warning = summary.warning,
                urgent = summary.urgent,
                next = %next.name,
                remaining = %next.countdown,
                "dashboard"
            ),
            None => info!(active = 0, "dashboard: no active timers"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timers::views::DashboardSummary;

    #[test]
    fn dashboard_log_tracks_last_counts() {
        let log = DashboardLog::default();
        let snapshot = Snapshot {
            timers: Vec::new(),
            summary: DashboardSummary {
                active: 2,
                urgent: 1,
                ..DashboardSummary::default()
            },
        };

        log.refresh(&snapshot);
        assert_eq!(Some((2, 0, 1)), *log.last.lock());

        log.refresh(&Snapshot::default());
        assert_eq!(Some((0, 0, 0)), *log.last.lock());
    }
}
