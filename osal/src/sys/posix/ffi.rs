//! pthread entry points and constants the `libc` crate does not export for
//! every glibc target.

use libc::{c_int, clockid_t, pthread_mutex_t, pthread_mutexattr_t, timespec};

pub(crate) const PTHREAD_MUTEX_ROBUST: c_int = 1;

pub(crate) const PTHREAD_PRIO_NONE: c_int = 0;
pub(crate) const PTHREAD_PRIO_INHERIT: c_int = 1;
pub(crate) const PTHREAD_PRIO_PROTECT: c_int = 2;

unsafe extern "C" {
    pub(crate) fn pthread_mutexattr_setrobust(
        attr: *mut pthread_mutexattr_t,
        robustness: c_int,
    ) -> c_int;

    pub(crate) fn pthread_mutexattr_setprotocol(
        attr: *mut pthread_mutexattr_t,
        protocol: c_int,
    ) -> c_int;

    pub(crate) fn pthread_mutexattr_setprioceiling(
        attr: *mut pthread_mutexattr_t,
        prioceiling: c_int,
    ) -> c_int;

    pub(crate) fn pthread_mutex_consistent(mutex: *mut pthread_mutex_t) -> c_int;

    /// Available since glibc 2.30.
    pub(crate) fn pthread_mutex_clocklock(
        mutex: *mut pthread_mutex_t,
        clockid: clockid_t,
        abstime: *const timespec,
    ) -> c_int;
}
