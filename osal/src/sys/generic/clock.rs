use crate::error::Result;
use crate::time::Timestamp;

use std::sync::OnceLock;
use std::thread;
use std::time::{Duration, Instant};

static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Nanoseconds since the first clock read in this process.
pub(crate) fn now_ns() -> u64 {
    let epoch = *EPOCH.get_or_init(Instant::now);
    u64::try_from(epoch.elapsed().as_nanos()).unwrap_or(u64::MAX)
}

/// Time left until `t`, `None` once reached.
pub(crate) fn until(t: Timestamp) -> Option<Duration> {
    let now = now_ns();
    (now < t.as_nanos()).then(|| Duration::from_nanos(t.as_nanos() - now))
}

pub(crate) fn sleep_until(t: Timestamp) -> Result<()> {
    while let Some(left) = until(t) {
        thread::sleep(left);
    }
    Ok(())
}
