use chrono::Utc;

/// Wall-clock time in milliseconds since the Unix epoch.
pub type TimeT = i64;

pub const MS_PER_SECOND: TimeT = 1000;

pub trait Clock: Send + Sync {
    fn now(&self) -> TimeT;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> TimeT {
        Utc::now().timestamp_millis()
    }
}

#[cfg(test)]
pub mod tests {
    use super::{Clock, MS_PER_SECOND, TimeT};
    use parking_lot::Mutex;

    pub struct FakeClock {
        current: Mutex<TimeT>,
    }

    impl FakeClock {
        pub fn new(start: TimeT) -> Self {
            Self {
                current: Mutex::new(start),
            }
        }

        pub fn advance(&self, duration: TimeT) {
            let mut guard = self.current.lock();
            *guard += duration;
        }

        pub fn advance_secs(&self, secs: i64) {
            self.advance(secs * MS_PER_SECOND);
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> TimeT {
            *self.current.lock()
        }
    }

    #[test]
    fn fake_clock_advances() {
        let clock = FakeClock::new(500);
        clock.advance(250);
        clock.advance_secs(2);
        assert_eq!(2750, clock.now());
    }
}
