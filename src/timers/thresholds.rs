use crate::timers::timer::TimerStatus;

pub const DEFAULT_WARNING_THRESHOLD_SECS: i64 = 10 * 60;
pub const DEFAULT_CRITICAL_THRESHOLD_SECS: i64 = 5 * 60;

/// Remaining-time cutoffs used to classify a running timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub warning_secs: i64,
    pub critical_secs: i64,
}

impl Thresholds {
    pub fn new(warning_secs: i64, critical_secs: i64) -> Self {
        Self {
            warning_secs,
            critical_secs,
        }
    }

    pub fn classify(&self, remaining_secs: i64) -> TimerStatus {
        if remaining_secs <= self.critical_secs {
            TimerStatus::Urgent
        } else if remaining_secs <= self.warning_secs {
            TimerStatus::Warning
        } else {
            TimerStatus::Normal
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::new(
            DEFAULT_WARNING_THRESHOLD_SECS,
            DEFAULT_CRITICAL_THRESHOLD_SECS,
        )
    }
}
