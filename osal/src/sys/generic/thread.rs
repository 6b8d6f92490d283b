//! Scheduling attributes are not reachable through std; every call reports
//! `NotImplemented`.

use crate::error::{Error, Result};
use crate::task::{CpuSet, SchedPolicy};

use std::thread::JoinHandle;

pub(crate) type Native = ();

pub(crate) fn native_of<T>(_handle: &JoinHandle<T>) -> Native {}

pub(crate) fn current() -> Native {}

pub(crate) fn set_scheduling(_thread: Native, _policy: SchedPolicy, _priority: i32) -> Result<()> {
    Err(Error::NotImplemented)
}

pub(crate) fn scheduling(_thread: Native) -> Result<(SchedPolicy, i32)> {
    Err(Error::NotImplemented)
}

pub(crate) fn set_affinity(_thread: Native, _cpus: &CpuSet) -> Result<()> {
    Err(Error::NotImplemented)
}

pub(crate) fn affinity(_thread: Native) -> Result<CpuSet> {
    Err(Error::NotImplemented)
}
