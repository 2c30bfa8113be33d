use std::time::Duration;

pub type ScheduledFn = Box<dyn FnMut() + Send>;

/// Identifies one recurring schedule so it can be cancelled later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScheduleHandle(pub u64);

/// Runs callbacks on a fixed interval until cancelled.
///
/// Cancelling a handle that was already cancelled, or that never existed,
/// must be a no-op.
pub trait Scheduler: Send + Sync {
    fn every(&self, interval: Duration, callback: ScheduledFn) -> ScheduleHandle;
    fn cancel(&self, handle: ScheduleHandle);
}
