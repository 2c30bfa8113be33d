use crate::timers::{ScheduleHandle, ScheduledFn, Scheduler};
use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::{collections::HashMap, time::Duration};
use tokio::{
    runtime::Handle,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};

/// Runs each schedule as its own task on a tokio runtime.
pub struct TokioScheduler {
    runtime: Handle,
    tasks: Mutex<Tasks>,
}

#[derive(Default)]
struct Tasks {
    next: u64,
    running: HashMap<ScheduleHandle, JoinHandle<()>>,
}

impl TokioScheduler {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            tasks: Mutex::new(Tasks::default()),
        }
    }

    /// Binds to the runtime of the calling task.
    pub fn current() -> Result<Self> {
        let runtime = Handle::try_current().context("TokioScheduler needs a tokio runtime")?;
        Ok(Self::new(runtime))
    }

    pub fn active(&self) -> usize {
        self.tasks.lock().running.len()
    }
}

impl Scheduler for TokioScheduler {
    fn every(&self, period: Duration, mut callback: ScheduledFn) -> ScheduleHandle {
        let mut tasks = self.tasks.lock();
        let handle = ScheduleHandle(tasks.next);
        tasks.next += 1;

        let task = self.runtime.spawn(async move {
            // First tick one period from now, not immediately.
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticks.tick().await;
                callback();
            }
        });

        tasks.running.insert(handle, task);
        handle
    }

    fn cancel(&self, handle: ScheduleHandle) {
        if let Some(task) = self.tasks.lock().running.remove(&handle) {
            task.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.tasks.get_mut().running.drain() {
            task.abort();
        }
    }
}
