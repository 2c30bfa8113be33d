//! Derived, read-only views of the registry for presentation.
//!
//! Views are rebuilt from the timers on every refresh; nothing here is a
//! source of truth.

use crate::timers::{
    clock::TimeT,
    timer::{ProductId, Timer, TimerId, TimerKind, TimerStatus},
};

/// One cell of the timer grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerView {
    pub id: TimerId,
    pub product_id: ProductId,
    pub name: String,
    pub kind: TimerKind,
    pub status: TimerStatus,
    pub remaining_secs: i64,
    pub countdown: String,
    pub progress_percent: u8,
    pub rotate_pending: bool,
}

impl TimerView {
    pub fn new(timer: &Timer, now: TimeT) -> Self {
        let remaining_secs = timer.remaining_secs(now);
        Self {
            id: timer.id,
            product_id: timer.product_id.clone(),
            name: timer.name.clone(),
            kind: timer.kind,
            status: timer.status(),
            remaining_secs,
            countdown: format_countdown(remaining_secs),
            progress_percent: progress_percent(timer, now),
            rotate_pending: timer.rotate_at_secs().is_some() && !timer.rotate_notified(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardSummary {
    pub active: usize,
    pub normal: usize,
    pub warning: usize,
    pub urgent: usize,
    pub next_to_complete: Option<TimerView>,
}

/// Everything an observer needs to redraw: the grid (most urgent first) and
/// the dashboard summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub timers: Vec<TimerView>,
    pub summary: DashboardSummary,
}

impl Snapshot {
    pub fn build<'a>(timers: impl IntoIterator<Item = &'a Timer>, now: TimeT) -> Self {
        let mut views: Vec<TimerView> = timers
            .into_iter()
            .map(|timer| TimerView::new(timer, now))
            .collect();

        // Stable sort keeps registry order among equal remaining times.
        views.sort_by_key(|view| view.remaining_secs);

        let count_status = |status: TimerStatus| {
            views
                .iter()
                .filter(|view| view.status == status)
                .count()
        };

        let summary = DashboardSummary {
            active: views.len(),
            normal: count_status(TimerStatus::Normal),
            warning: count_status(TimerStatus::Warning),
            urgent: count_status(TimerStatus::Urgent),
            next_to_complete: views.first().cloned(),
        };

        Self {
            timers: views,
            summary,
        }
    }

    pub fn badge_count(&self) -> usize {
        self.summary.active
    }
}

/// `MM:SS` below an hour, `H:MM:SS` above. Negative values show as zero.
pub fn format_countdown(remaining_secs: i64) -> String {
    let secs = remaining_secs.max(0);
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// Short human form of a duration, e.g. `2 min` or `1 h 5 min`.
pub fn format_delta(secs: u64) -> String {
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    let parts: Vec<String> = [(hours, "h"), (minutes, "min"), (seconds, "sec")]
        .into_iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{value} {unit}"))
        .collect();

    if parts.is_empty() {
        "0 sec".to_owned()
    } else {
        parts.join(" ")
    }
}

fn progress_percent(timer: &Timer, now: TimeT) -> u8 {
    let duration = timer.duration_secs();
    if duration <= 0 {
        return 100;
    }
    let elapsed = timer.elapsed_secs(now).clamp(0, duration);
    // Widened so huge durations cannot overflow the multiplication.
    (i128::from(elapsed) * 100 / i128::from(duration)) as u8
}
