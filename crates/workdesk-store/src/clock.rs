//! Time Source
//!
//! Wall-clock reads and async sleeps behind one trait so the cache and the
//! retry loop can be driven by a manual clock in tests.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait(?Send)]
pub trait Clock {
    /// Current wall-clock time
    fn now(&self) -> DateTime<Utc>;

    /// Suspend the current task for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Wall clock with tokio timers. Needs a runtime with time enabled; the
/// browser build uses its own gloo-timers clock instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[async_trait(?Send)]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
pub(crate) mod manual {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// Test clock: time only moves when told to (or when something sleeps)
    pub struct ManualClock {
        now: Cell<DateTime<Utc>>,
        pub slept: RefCell<Vec<Duration>>,
    }

    impl ManualClock {
        pub fn new() -> Self {
            Self {
                now: Cell::new(DateTime::parse_from_rfc3339("2024-08-09T09:00:00Z").unwrap().with_timezone(&Utc)),
                slept: RefCell::new(Vec::new()),
            }
        }

        pub fn advance(&self, duration: Duration) {
            let delta = chrono::Duration::from_std(duration).unwrap();
            self.now.set(self.now.get() + delta);
        }
    }

    #[async_trait(?Send)]
    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            self.now.get()
        }

        async fn sleep(&self, duration: Duration) {
            self.slept.borrow_mut().push(duration);
            self.advance(duration);
        }
    }
}
