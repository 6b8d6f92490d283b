use super::clock::to_timespec;
use super::errno;
use super::mutex::RawMutex;
use crate::error::Result;
use crate::time::Timestamp;

use libc::{
    CLOCK_MONOTONIC, PTHREAD_COND_INITIALIZER, pthread_cond_broadcast, pthread_cond_destroy,
    pthread_cond_init, pthread_cond_signal, pthread_cond_t, pthread_cond_timedwait,
    pthread_cond_wait, pthread_condattr_destroy, pthread_condattr_init,
    pthread_condattr_setclock, pthread_condattr_t,
};
use std::cell::UnsafeCell;
use std::mem::{ManuallyDrop, MaybeUninit};

/// Native condition variable bound to `CLOCK_MONOTONIC`.
pub(crate) struct RawCondvar {
    inner: ManuallyDrop<Box<UnsafeCell<pthread_cond_t>>>,
    destroyed: bool,
}

unsafe impl Send for RawCondvar {}
unsafe impl Sync for RawCondvar {}

impl RawCondvar {
    pub(crate) fn new() -> Result<Self> {
        let mut attr = MaybeUninit::<pthread_condattr_t>::uninit();
        errno::init(unsafe { pthread_condattr_init(attr.as_mut_ptr()) })?;

        let inner = Box::new(UnsafeCell::new(PTHREAD_COND_INITIALIZER));

        let rc = unsafe {
            let attr = attr.as_mut_ptr();
            let rc = match pthread_condattr_setclock(attr, CLOCK_MONOTONIC) {
                0 => pthread_cond_init(inner.get(), attr),
                rc => rc,
            };
            pthread_condattr_destroy(attr);
            rc
        };
        errno::init(rc)?;

        Ok(Self {
            inner: ManuallyDrop::new(inner),
            destroyed: false,
        })
    }

    #[inline]
    fn as_ptr(&self) -> *mut pthread_cond_t {
        self.inner.get()
    }

    /// Atomically releases `mutex` and waits; `mutex` is held again on return.
    pub(crate) fn wait(&self, mutex: &RawMutex) -> Result<()> {
        errno::wait(unsafe { pthread_cond_wait(self.as_ptr(), mutex.as_ptr()) })
    }

    pub(crate) fn timedwait(&self, mutex: &RawMutex, deadline: Timestamp) -> Result<()> {
        let ts = to_timespec(deadline);
        errno::wait(unsafe { pthread_cond_timedwait(self.as_ptr(), mutex.as_ptr(), &ts) })
    }

    pub(crate) fn signal(&self) -> Result<()> {
        errno::signal(unsafe { pthread_cond_signal(self.as_ptr()) })
    }

    pub(crate) fn broadcast(&self) -> Result<()> {
        errno::signal(unsafe { pthread_cond_broadcast(self.as_ptr()) })
    }

    pub(crate) fn destroy(&mut self) -> Result<()> {
        if !self.destroyed {
            errno::destroy(unsafe { pthread_cond_destroy(self.as_ptr()) })?;
            self.destroyed = true;
        }
        Ok(())
    }
}

impl Drop for RawCondvar {
    fn drop(&mut self) {
        if let Err(e) = self.destroy() {
            log::warn!("leaking native condition variable that failed to destroy: {e}");
            return;
        }

        unsafe { ManuallyDrop::drop(&mut self.inner) };
    }
}
