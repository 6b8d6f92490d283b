use super::errno;
use crate::error::Result;

use libc::{MCL_CURRENT, MCL_FUTURE, mlockall, munlockall};

/// Locks current and future pages of the process into RAM.
pub(crate) fn lock_all() -> Result<()> {
    errno::memory(unsafe { mlockall(MCL_CURRENT | MCL_FUTURE) })
}

pub(crate) fn unlock_all() -> Result<()> {
    errno::memory(unsafe { munlockall() })
}
