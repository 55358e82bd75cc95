pub mod error;
pub mod role;
pub mod room;
pub mod signal;
pub mod time;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::sync::atomic::{AtomicU64, Ordering};

    use crate::time::Clock;

    /// A clock that only moves when told to.
    #[derive(Debug, Default)]
    pub struct ManualClock {
        now: AtomicU64,
    }

    impl ManualClock {
        pub fn starting_at(millis: u64) -> Self {
            Self {
                now: AtomicU64::new(millis),
            }
        }

        pub fn advance(&self, millis: u64) {
            self.now.fetch_add(millis, Ordering::SeqCst);
        }

        pub fn set(&self, millis: u64) {
            self.now.store(millis, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_millis(&self) -> u64 {
            self.now.load(Ordering::SeqCst)
        }
    }

}
