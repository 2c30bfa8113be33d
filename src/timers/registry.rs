use crate::timers::{
    clock::{Clock, TimeT},
    error::{Result, TimerError},
    notify::{Notifier, Observer, Severity},
    scheduler::{ScheduleHandle, Scheduler},
    thresholds::Thresholds,
    timer::{OnComplete, ProductId, Timer, TimerConfig, TimerId, TimerKind, end_instant},
    views::{Snapshot, format_delta},
};
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    sync::{Arc, Weak},
    time::Duration,
};
use tracing::{debug, trace};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// The registry behind the lock every scheduled tick goes through.
pub type SharedRegistry = Arc<Mutex<Registry>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrySettings {
    pub thresholds: Thresholds,
    pub tick_interval: Duration,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

/// A registered timer together with its own schedule.
struct Entry {
    seq: u64,
    timer: Timer,
    schedule: ScheduleHandle,
    on_complete: Option<OnComplete>,
}

/// Owns the active timers and advances each one on its own schedule.
///
/// The notifier and observer run while the registry lock is held and must not
/// call back into the same registry. `on_complete` callbacks run after the
/// lock is released; see [`RegistryHandle`].
pub struct Registry {
    this: Weak<Mutex<Registry>>,
    clock: Arc<dyn Clock>,
    scheduler: Arc<dyn Scheduler>,
    notifier: Arc<dyn Notifier>,
    observer: Option<Arc<dyn Observer>>,
    settings: RegistrySettings,
    next_seq: u64,
    lookup: HashMap<TimerId, Entry>,
}

impl Registry {
    pub fn shared(
        clock: Arc<dyn Clock>,
        scheduler: Arc<dyn Scheduler>,
        notifier: Arc<dyn Notifier>,
        observer: Option<Arc<dyn Observer>>,
        settings: RegistrySettings,
    ) -> SharedRegistry {
        Arc::new_cyclic(|this| {
            Mutex::new(Self {
                this: this.clone(),
                clock,
                scheduler,
                notifier,
                observer,
                settings,
                next_seq: 0,
                lookup: HashMap::new(),
            })
        })
    }

    pub fn settings(&self) -> RegistrySettings {
        self.settings
    }

    pub fn start(&mut self, config: TimerConfig) -> Result<Timer> {
        let TimerConfig {
            id,
            product_id,
            name,
            kind,
            duration_secs,
            started_at,
            rotate_at_secs,
            on_complete,
        } = config;

        if duration_secs <= 0 {
            return Err(TimerError::InvalidConfiguration(format!(
                "duration must be positive, got {duration_secs}s"
            )));
        }

        let now = self.clock.now();
        let started_at = started_at.unwrap_or(now);
        if end_instant(started_at, duration_secs).is_none() {
            return Err(TimerError::InvalidConfiguration(format!(
                "a {duration_secs}s timer started at {started_at} ends out of range"
            )));
        }

        let rotate_at_secs = rotate_at_secs
            .map(|secs| {
                i64::try_from(secs).map_err(|_| {
                    TimerError::InvalidConfiguration(format!("rotation offset {secs}s is too large"))
                })
            })
            .transpose()?;

        if self.lookup.contains_key(&id) {
            return Err(TimerError::InvalidConfiguration(format!(
                "a timer with id {id} is already running"
            )));
        }

        if kind == TimerKind::Proofing && rotate_at_secs.is_some() {
            debug!(%id, "ignoring rotation offset on proofing timer");
        }

        let mut timer = Timer::new(
            id,
            product_id,
            name,
            kind,
            duration_secs,
            started_at,
            rotate_at_secs,
        );
        timer.set_status(
            self.settings
                .thresholds
                .classify(timer.remaining_secs(now)),
        );

        let schedule = self.schedule_ticks(id);

        let seq = self.next_seq;
        self.next_seq += 1;
        self.lookup.insert(
            id,
            Entry {
                seq,
                timer: timer.clone(),
                schedule,
                on_complete,
            },
        );

        debug!(
            %id,
            name = %timer.name,
            kind = %timer.kind,
            duration_secs = timer.duration_secs(),
            "timer started"
        );
        self.notifier
            .notify(&format!("Timer started: {}", timer.name), Severity::Info);
        self.refresh(now);

        Ok(timer)
    }

    /// Advances one timer: fires the rotation reminder when due, finishes
    /// the timer at zero, otherwise reclassifies it. Returns the completion
    /// callback of a finished timer for the caller to run once unlocked.
    pub fn advance(&mut self, id: &TimerId) -> Result<Option<OnComplete>> {
        let now = self.clock.now();
        let thresholds = self.settings.thresholds;
        let entry = self
            .lookup
            .get_mut(id)
            .ok_or(TimerError::NotFound(*id))?;

        if entry.timer.kind == TimerKind::Baking && entry.timer.rotation_due(now) {
            entry.timer.mark_rotate_notified();
            debug!(%id, "rotation reminder due");
            self.notifier.alert(
                "Rotate Trays",
                &format!("Time to rotate the trays for {}", entry.timer.name),
            );
        }

        let remaining = entry.timer.remaining_secs(now);
        if remaining <= 0 {
            return self.finish(id);
        }

        let status = thresholds.classify(remaining);
        if status != entry.timer.status() {
            debug!(%id, %status, remaining, "timer status changed");
        }
        entry.timer.set_status(status);
        trace!(%id, remaining, "tick");

        self.refresh(now);
        Ok(None)
    }

    /// Finishes a timer: cancels its schedule and drops it from the registry.
    /// The completion callback is handed back rather than run under the lock.
    pub fn finish(&mut self, id: &TimerId) -> Result<Option<OnComplete>> {
        let entry = self.lookup.remove(id).ok_or(TimerError::NotFound(*id))?;
        self.scheduler.cancel(entry.schedule);

        debug!(%id, name = %entry.timer.name, "timer completed");
        self.notifier
            .notify(&format!("{} is done", entry.timer.name), Severity::Success);

        self.refresh(self.clock.now());
        Ok(entry.on_complete)
    }

    /// Cancels a timer without running its completion callback.
    pub fn stop(&mut self, id: &TimerId) -> Result<Timer> {
        let entry = self.lookup.remove(id).ok_or(TimerError::NotFound(*id))?;
        self.scheduler.cancel(entry.schedule);

        debug!(%id, name = %entry.timer.name, "timer stopped");
        self.notifier
            .notify(&format!("Timer stopped: {}", entry.timer.name), Severity::Info);
        self.refresh(self.clock.now());

        Ok(entry.timer)
    }

    pub fn extend(&mut self, id: &TimerId, delta_secs: i64) -> Result<Timer> {
        if delta_secs <= 0 {
            return Err(TimerError::InvalidConfiguration(format!(
                "extension must be positive, got {delta_secs}s"
            )));
        }

        let now = self.clock.now();
        let thresholds = self.settings.thresholds;
        let entry = self
            .lookup
            .get_mut(id)
            .ok_or(TimerError::NotFound(*id))?;

        if !entry.timer.try_extend(delta_secs) {
            return Err(TimerError::InvalidConfiguration(format!(
                "extending by {delta_secs}s runs out of range"
            )));
        }
        entry
            .timer
            .set_status(thresholds.classify(entry.timer.remaining_secs(now)));
        let timer = entry.timer.clone();

        debug!(%id, delta_secs, duration_secs = timer.duration_secs(), "timer extended");
        self.notifier.notify(
            &format!("Added {} to {}", format_delta(delta_secs.unsigned_abs()), timer.name),
            Severity::Info,
        );
        self.refresh(now);

        Ok(timer)
    }

    pub fn get(&self, id: &TimerId) -> Option<&Timer> {
        self.lookup.get(id).map(|entry| &entry.timer)
    }

    /// Active timers in the order they were started.
    pub fn list(&self) -> Vec<&Timer> {
        self.ordered().map(|entry| &entry.timer).collect()
    }

    pub fn count(&self) -> usize {
        self.lookup.len()
    }

    pub fn find_by_product(&self, product_id: &ProductId) -> Option<&Timer> {
        self.ordered()
            .map(|entry| &entry.timer)
            .find(|timer| &timer.product_id == product_id)
    }

    /// The timer with the least remaining time; the earliest started wins ties.
    pub fn next_to_complete(&self) -> Option<&Timer> {
        let now = self.clock.now();
        self.ordered()
            .map(|entry| &entry.timer)
            .min_by_key(|timer| timer.remaining_secs(now))
    }

    pub fn remaining_secs(&self, id: &TimerId) -> Option<i64> {
        self.get(id).map(|timer| timer.remaining_secs(self.clock.now()))
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot_at(self.clock.now())
    }

    fn snapshot_at(&self, now: TimeT) -> Snapshot {
        Snapshot::build(self.list(), now)
    }

    fn refresh(&self, now: TimeT) {
        if let Some(observer) = &self.observer {
            observer.refresh(&self.snapshot_at(now));
        }
    }

    fn ordered(&self) -> impl Iterator<Item = &Entry> {
        let mut entries: Vec<&Entry> = self.lookup.values().collect();
        entries.sort_by_key(|entry| entry.seq);
        entries.into_iter()
    }

    fn schedule_ticks(&self, id: TimerId) -> ScheduleHandle {
        let registry = self.this.clone();
        self.scheduler.every(
            self.settings.tick_interval,
            Box::new(move || {
                let Some(registry) = registry.upgrade() else {
                    return;
                };
                if let Err(err) = registry.tick(&id) {
                    // A tick can race with stop/complete.
                    trace!(%id, %err, "tick skipped");
                }
            }),
        )
    }
}

/// Lock-aware operations on a [`SharedRegistry`]. Completion callbacks run
/// with the lock released, so they may start or query timers.
pub trait RegistryHandle {
    fn tick(&self, id: &TimerId) -> Result<()>;
    fn complete(&self, id: &TimerId) -> Result<()>;
}

impl RegistryHandle for SharedRegistry {
    fn tick(&self, id: &TimerId) -> Result<()> {
        let on_complete = self.lock().advance(id)?;
        if let Some(on_complete) = on_complete {
            on_complete();
        }
        Ok(())
    }

    fn complete(&self, id: &TimerId) -> Result<()> {
        let on_complete = self.lock().finish(id)?;
        if let Some(on_complete) = on_complete {
            on_complete();
        }
        Ok(())
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        for entry in self.lookup.values() {
            self.scheduler.cancel(entry.schedule);
        }
    }
}
