mod clock;
pub use clock::{Clock, MS_PER_SECOND, SystemClock, TimeT};

mod error;
pub use error::TimerError;

mod notify;
pub use notify::{Notifier, Observer, Severity};

mod registry;
pub use registry::{
    DEFAULT_TICK_INTERVAL, Registry, RegistryHandle, RegistrySettings, SharedRegistry,
};

mod scheduler;
pub use scheduler::{ScheduleHandle, ScheduledFn, Scheduler};

mod thresholds;
pub use thresholds::{DEFAULT_CRITICAL_THRESHOLD_SECS, DEFAULT_WARNING_THRESHOLD_SECS, Thresholds};

mod timer;
pub use timer::{OnComplete, ProductId, Timer, TimerConfig, TimerId, TimerKind, TimerStatus};

mod timer_service;
pub use timer_service::{TimerService, TimerServiceEvent, TimerServiceReply};

pub mod views;
