/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    let dur = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    dur.as_millis() as u64
}

/// Source of wall-clock time for room mutations.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u64;
}

/// The process clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        now_millis()
    }
}
