use super::errno;
use crate::error::Result;
use crate::time::Timestamp;

use libc::{CLOCK_MONOTONIC, TIMER_ABSTIME, clock_gettime, clock_nanosleep, timespec};

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Reads `CLOCK_MONOTONIC` in nanoseconds.
pub(crate) fn now_ns() -> u64 {
    let mut ts = timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };

    // CLOCK_MONOTONIC is always present on Linux; the call cannot fail with a
    // valid pointer.
    unsafe { clock_gettime(CLOCK_MONOTONIC, &mut ts) };

    (ts.tv_sec as u64) * NANOS_PER_SEC + ts.tv_nsec as u64
}

/// Converts a monotonic timestamp into an absolute `timespec`.
pub(crate) fn to_timespec(t: Timestamp) -> timespec {
    let nanos = t.as_nanos();

    timespec {
        tv_sec: (nanos / NANOS_PER_SEC) as libc::time_t,
        tv_nsec: (nanos % NANOS_PER_SEC) as libc::c_long,
    }
}

/// Sleeps until `t` with `clock_nanosleep(TIMER_ABSTIME)`.
pub(crate) fn sleep_until(t: Timestamp) -> Result<()> {
    let ts = to_timespec(t);
    let rc = unsafe { clock_nanosleep(CLOCK_MONOTONIC, TIMER_ABSTIME, &ts, std::ptr::null_mut()) };
    errno::sleep(rc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timespec_split() {
        let ts = to_timespec(Timestamp::from_nanos(3 * NANOS_PER_SEC + 17));
        assert_eq!(ts.tv_sec, 3);
        assert_eq!(ts.tv_nsec, 17);
    }
}
