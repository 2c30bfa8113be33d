use crate::timers::clock::{MS_PER_SECOND, TimeT};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// A Universally Unique Identifier (UUID) for Timers.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
pub struct TimerId(pub Uuid);

impl TimerId {
    pub fn new() -> Self {
        TimerId(Uuid::new_v4())
    }

    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TimerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TimerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(TimerId)
    }
}

/// Reference to the production item being timed. Opaque to the registry.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Default)]
pub struct ProductId(pub String);

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        ProductId(value.to_owned())
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum TimerKind {
    Proofing,
    Baking,
}

impl fmt::Display for TimerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerKind::Proofing => f.write_str("proofing"),
            TimerKind::Baking => f.write_str("baking"),
        }
    }
}

impl FromStr for TimerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "proofing" | "proof" => Ok(TimerKind::Proofing),
            "baking" | "bake" => Ok(TimerKind::Baking),
            other => Err(format!("unknown timer kind '{other}'")),
        }
    }
}

/// Classification of a timer by its remaining time.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Default)]
pub enum TimerStatus {
    #[default]
    Normal,
    Warning,
    Urgent,
}

impl fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerStatus::Normal => f.write_str("normal"),
            TimerStatus::Warning => f.write_str("warning"),
            TimerStatus::Urgent => f.write_str("urgent"),
        }
    }
}

pub type OnComplete = Box<dyn FnOnce() + Send>;

/// Caller-supplied configuration for a new timer.
pub struct TimerConfig {
    pub id: TimerId,
    pub product_id: ProductId,
    pub name: String,
    pub kind: TimerKind,
    pub duration_secs: i64,
    pub started_at: Option<TimeT>,
    pub rotate_at_secs: Option<u64>,
    pub on_complete: Option<OnComplete>,
}

impl TimerConfig {
    pub fn new(
        id: TimerId,
        product_id: ProductId,
        name: impl Into<String>,
        kind: TimerKind,
        duration_secs: i64,
    ) -> Self {
        Self {
            id,
            product_id,
            name: name.into(),
            kind,
            duration_secs,
            started_at: None,
            rotate_at_secs: None,
            on_complete: None,
        }
    }

    pub fn started_at(mut self, started_at: TimeT) -> Self {
        self.started_at = Some(started_at);
        self
    }

    pub fn rotate_at(mut self, secs: u64) -> Self {
        self.rotate_at_secs = Some(secs);
        self
    }

    pub fn on_complete(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timer {
    pub id: TimerId,
    pub product_id: ProductId,
    pub name: String,
    pub kind: TimerKind,
    duration_secs: i64,
    started_at: TimeT,
    rotate_at_secs: Option<i64>,
    rotate_notified: bool,
    status: TimerStatus,
}

/// Wall-clock instant at which a timer of this length reaches zero, or
/// `None` when it cannot be represented.
pub(crate) fn end_instant(started_at: TimeT, duration_secs: i64) -> Option<TimeT> {
    duration_secs
        .checked_mul(MS_PER_SECOND)
        .and_then(|ms| started_at.checked_add(ms))
}

impl Timer {
    /// Builds a timer from an already validated configuration. The rotation
    /// offset is dropped for anything but baking timers.
    pub(crate) fn new(
        id: TimerId,
        product_id: ProductId,
        name: String,
        kind: TimerKind,
        duration_secs: i64,
        started_at: TimeT,
        rotate_at_secs: Option<i64>,
    ) -> Self {
        let rotate_at_secs = match kind {
            TimerKind::Baking => rotate_at_secs,
            TimerKind::Proofing => None,
        };
        Self {
            id,
            product_id,
            name,
            kind,
            duration_secs,
            started_at,
            rotate_at_secs,
            rotate_notified: false,
            status: TimerStatus::Normal,
        }
    }

    pub fn duration_secs(&self) -> i64 {
        self.duration_secs
    }

    pub fn started_at(&self) -> TimeT {
        self.started_at
    }

    pub fn rotate_at_secs(&self) -> Option<i64> {
        self.rotate_at_secs
    }

    pub fn rotate_notified(&self) -> bool {
        self.rotate_notified
    }

    /// Status as of the last tick.
    pub fn status(&self) -> TimerStatus {
        self.status
    }

    /// Whole seconds since start, rounded down.
    pub fn elapsed_secs(&self, now: TimeT) -> i64 {
        now.saturating_sub(self.started_at).div_euclid(MS_PER_SECOND)
    }

    pub fn remaining_secs(&self, now: TimeT) -> i64 {
        self.duration_secs.saturating_sub(self.elapsed_secs(now))
    }

    pub(crate) fn rotation_due(&self, now: TimeT) -> bool {
        match self.rotate_at_secs {
            Some(rotate_at) => {
                !self.rotate_notified && self.elapsed_secs(now) >= rotate_at
            }
            None => false,
        }
    }

    pub(crate) fn mark_rotate_notified(&mut self) {
        self.rotate_notified = true;
    }

    pub(crate) fn set_status(&mut self, status: TimerStatus) {
        self.status = status;
    }

    /// Adds to the duration unless the new end instant would overflow.
    /// Leaves the timer untouched and returns false otherwise.
    pub(crate) fn try_extend(&mut self, delta_secs: i64) -> bool {
        let Some(extended) = self.duration_secs.checked_add(delta_secs) else {
            return false;
        };
        if end_instant(self.started_at, extended).is_none() {
            return false;
        }
        self.duration_secs = extended;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn timer(kind: TimerKind, rotate_at: Option<i64>) -> Timer {
        Timer::new(
            TimerId::new(),
            ProductId::from("sourdough"),
            "Sourdough".to_owned(),
            kind,
            600,
            10_000,
            rotate_at,
        )
    }

    #[test_case(10_000, 600; "at start")]
    #[test_case(10_999, 600; "partial second rounds down")]
    #[test_case(11_000, 599; "one second")]
    #[test_case(610_000, 0; "at zero")]
    #[test_case(620_000, -10; "overdue")]
    fn remaining_is_floored(now: TimeT, expected: i64) {
        assert_eq!(expected, timer(TimerKind::Proofing, None).remaining_secs(now));
    }

    #[test]
    fn elapsed_before_start_is_negative() {
        assert_eq!(-1, timer(TimerKind::Proofing, None).elapsed_secs(9_500));
    }

    #[test]
    fn proofing_timers_drop_rotation() {
        let timer = timer(TimerKind::Proofing, Some(300));
        assert_eq!(None, timer.rotate_at_secs());
        assert!(!timer.rotation_due(10_000 + 400 * MS_PER_SECOND));
    }

    #[test]
    fn rotation_due_once_marked() {
        let mut timer = timer(TimerKind::Baking, Some(300));
        let now = 10_000 + 300 * MS_PER_SECOND;
        assert!(!timer.rotation_due(now - 1));
        assert!(timer.rotation_due(now));

        timer.mark_rotate_notified();
        assert!(!timer.rotation_due(now));
        assert!(timer.rotate_notified());
    }

    #[test]
    fn extend_adds_to_remaining() {
        let mut timer = timer(TimerKind::Baking, None);
        let now = 10_000 + 100 * MS_PER_SECOND;
        let before = timer.remaining_secs(now);

        assert!(timer.try_extend(120));
        assert_eq!(720, timer.duration_secs());
        assert_eq!(before + 120, timer.remaining_secs(now));
    }

    #[test]
    fn extend_refuses_overflow() {
        let mut timer = timer(TimerKind::Baking, None);

        assert!(!timer.try_extend(i64::MAX));
        assert!(!timer.try_extend(i64::MAX / MS_PER_SECOND));
        assert_eq!(600, timer.duration_secs());
        assert_eq!(600, timer.remaining_secs(10_000));
    }

    #[test_case(10_000, 600, Some(610_000); "fits")]
    #[test_case(i64::MAX, 1, None; "start at max")]
    #[test_case(0, i64::MAX, None; "duration too long")]
    fn end_instant_is_checked(started_at: TimeT, duration: i64, expected: Option<TimeT>) {
        assert_eq!(expected, end_instant(started_at, duration));
    }

    #[test]
    fn far_past_start_does_not_overflow() {
        let timer = Timer::new(
            TimerId::new(),
            ProductId::from("rye"),
            "Rye".to_owned(),
            TimerKind::Proofing,
            60,
            i64::MIN,
            None,
        );
        assert!(timer.remaining_secs(i64::MAX) < 0);
    }

    #[test_case("Proofing", TimerKind::Proofing)]
    #[test_case("bake", TimerKind::Baking)]
    fn kind_parses(input: &str, expected: TimerKind) {
        assert_eq!(Ok(expected), input.parse());
    }
}
