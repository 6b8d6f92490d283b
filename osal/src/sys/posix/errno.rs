//! Reduction of pthread return codes to [`Error`].
//!
//! One function per operation family, following the error lists POSIX gives
//! for each call. Codes a call is not documented to return map to
//! [`Error::Unavailable`].

use crate::error::{Error, Result};

use libc::{
    EAGAIN, EBUSY, EDEADLK, EINTR, EINVAL, ENOMEM, ENOTRECOVERABLE, ENOTSUP, EOWNERDEAD, EPERM,
    ESRCH, ETIMEDOUT, c_int,
};

#[inline]
fn check(rc: c_int, map: fn(c_int) -> Error) -> Result<()> {
    if rc == 0 { Ok(()) } else { Err(map(rc)) }
}

/// `*_init` and attribute setters.
pub(crate) fn init(rc: c_int) -> Result<()> {
    check(rc, |rc| match rc {
        EAGAIN => Error::SystemLimitReached,
        ENOMEM => Error::OutOfMemory,
        EPERM => Error::PermissionDenied,
        EINVAL => Error::InvalidParam,
        ENOTSUP => Error::NotImplemented,
        _ => Error::Unavailable,
    })
}

/// `pthread_mutex_{lock,trylock,clocklock}`.
pub(crate) fn lock(rc: c_int) -> Result<()> {
    check(rc, |rc| match rc {
        EAGAIN => Error::SystemLimitReached,
        EINVAL => Error::InvalidParam,
        EOWNERDEAD => Error::OwnerDead,
        ENOTRECOVERABLE => Error::NotRecoverable,
        EDEADLK => Error::DeadLock,
        EBUSY => Error::Busy,
        ETIMEDOUT => Error::Timeout,
        _ => Error::Unavailable,
    })
}

/// `pthread_mutex_unlock` and `pthread_mutex_consistent`.
pub(crate) fn unlock(rc: c_int) -> Result<()> {
    check(rc, |rc| match rc {
        EPERM => Error::PermissionDenied,
        EINVAL => Error::InvalidParam,
        _ => Error::Unavailable,
    })
}

/// `*_destroy`.
pub(crate) fn destroy(rc: c_int) -> Result<()> {
    check(rc, |rc| match rc {
        EBUSY => Error::Busy,
        EINVAL => Error::InvalidParam,
        _ => Error::Unavailable,
    })
}

/// `pthread_cond_{wait,timedwait}`.
pub(crate) fn wait(rc: c_int) -> Result<()> {
    check(rc, |rc| match rc {
        ETIMEDOUT => Error::Timeout,
        EOWNERDEAD => Error::OwnerDead,
        ENOTRECOVERABLE => Error::NotRecoverable,
        EPERM => Error::PermissionDenied,
        EINVAL => Error::InvalidParam,
        _ => Error::Unavailable,
    })
}

/// `pthread_cond_{signal,broadcast}`.
pub(crate) fn signal(rc: c_int) -> Result<()> {
    check(rc, |rc| match rc {
        EINVAL => Error::InvalidParam,
        _ => Error::Unavailable,
    })
}

/// `clock_nanosleep`.
pub(crate) fn sleep(rc: c_int) -> Result<()> {
    check(rc, |rc| match rc {
        EINTR => Error::Interrupted,
        EINVAL => Error::InvalidParam,
        _ => Error::Unavailable,
    })
}

/// Scheduling and affinity calls on a live thread.
pub(crate) fn sched(rc: c_int) -> Result<()> {
    check(rc, |rc| match rc {
        EPERM => Error::PermissionDenied,
        EINVAL => Error::InvalidParam,
        ENOTSUP => Error::NotImplemented,
        ESRCH => Error::NotFound,
        _ => Error::Unavailable,
    })
}

/// `mlockall` / `munlockall`, which report through `errno`.
pub(crate) fn memory(rc: c_int) -> Result<()> {
    if rc == 0 {
        return Ok(());
    }

    Err(match std::io::Error::last_os_error().raw_os_error() {
        Some(EAGAIN) => Error::SystemLimitReached,
        Some(ENOMEM) => Error::OutOfMemory,
        Some(EPERM) => Error::PermissionDenied,
        Some(EINVAL) => Error::InvalidParam,
        _ => Error::Unavailable,
    })
}
