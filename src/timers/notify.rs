use crate::timers::views::Snapshot;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => f.write_str("info"),
            Severity::Success => f.write_str("success"),
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// Delivers user-facing messages. `notify` is the passive toast channel,
/// `alert` the attention-grabbing one used for tray rotation.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, severity: Severity);
    fn alert(&self, title: &str, message: &str);
}

/// Presentation hook, called after every state change with fresh views.
pub trait Observer: Send + Sync {
    fn refresh(&self, snapshot: &Snapshot);
}
