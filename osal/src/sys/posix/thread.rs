//! Scheduling attributes of native threads.

use super::errno;
use crate::error::{Error, Result};
use crate::task::{CpuSet, SchedPolicy};

use libc::{
    CPU_ISSET, CPU_SET, CPU_SETSIZE, CPU_ZERO, SCHED_FIFO, SCHED_OTHER, SCHED_RR, c_int,
    cpu_set_t, pthread_getaffinity_np, pthread_getschedparam, pthread_self,
    pthread_setaffinity_np, pthread_setschedparam, pthread_t, sched_get_priority_max,
    sched_get_priority_min, sched_param,
};
use std::mem;
use std::os::unix::thread::JoinHandleExt;
use std::thread::JoinHandle;

/// Native thread identifier.
pub(crate) type Native = pthread_t;

pub(crate) fn native_of<T>(handle: &JoinHandle<T>) -> Native {
    handle.as_pthread_t()
}

pub(crate) fn current() -> Native {
    unsafe { pthread_self() }
}

fn policy_to_native(policy: SchedPolicy) -> c_int {
    match policy {
        SchedPolicy::Other => SCHED_OTHER,
        SchedPolicy::Fifo => SCHED_FIFO,
        SchedPolicy::RoundRobin => SCHED_RR,
    }
}

fn policy_from_native(policy: c_int) -> SchedPolicy {
    match policy {
        SCHED_FIFO => SchedPolicy::Fifo,
        SCHED_RR => SchedPolicy::RoundRobin,
        // SCHED_BATCH and SCHED_IDLE are time-sharing variants.
        _ => SchedPolicy::Other,
    }
}

/// Valid priority range for `policy`.
pub(crate) fn priority_range(policy: SchedPolicy) -> Result<(i32, i32)> {
    let native = policy_to_native(policy);
    let (min, max) = unsafe { (sched_get_priority_min(native), sched_get_priority_max(native)) };

    if min < 0 || max < 0 {
        return Err(Error::NotImplemented);
    }
    Ok((min, max))
}

pub(crate) fn set_scheduling(thread: Native, policy: SchedPolicy, priority: i32) -> Result<()> {
    let (min, max) = priority_range(policy)?;
    if !(min..=max).contains(&priority) {
        return Err(Error::InvalidParam);
    }

    let param = sched_param {
        sched_priority: priority,
    };
    errno::sched(unsafe { pthread_setschedparam(thread, policy_to_native(policy), &param) })
}

pub(crate) fn scheduling(thread: Native) -> Result<(SchedPolicy, i32)> {
    let mut policy: c_int = 0;
    let mut param = sched_param { sched_priority: 0 };

    errno::sched(unsafe { pthread_getschedparam(thread, &mut policy, &mut param) })?;
    Ok((policy_from_native(policy), param.sched_priority))
}

pub(crate) fn set_affinity(thread: Native, cpus: &CpuSet) -> Result<()> {
    let mut set: cpu_set_t = unsafe { mem::zeroed() };
    unsafe { CPU_ZERO(&mut set) };

    for cpu in cpus.iter() {
        unsafe { CPU_SET(cpu, &mut set) };
    }

    errno::sched(unsafe { pthread_setaffinity_np(thread, mem::size_of::<cpu_set_t>(), &set) })
}

pub(crate) fn affinity(thread: Native) -> Result<CpuSet> {
    let mut set: cpu_set_t = unsafe { mem::zeroed() };

    errno::sched(unsafe {
        pthread_getaffinity_np(thread, mem::size_of::<cpu_set_t>(), &mut set)
    })?;

    let limit = CpuSet::MAX_CPUS.min(CPU_SETSIZE as usize);
    let mut cpus = CpuSet::new();
    for cpu in 0..limit {
        if unsafe { CPU_ISSET(cpu, &set) } {
            cpus.insert(cpu)?;
        }
    }
    Ok(cpus)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_mapping_is_bijective_on_known_values() {
        for p in [SchedPolicy::Other, SchedPolicy::Fifo, SchedPolicy::RoundRobin] {
            assert_eq!(policy_from_native(policy_to_native(p)), p);
        }
    }

    #[test]
    fn other_policy_only_accepts_zero() {
        assert_eq!(priority_range(SchedPolicy::Other), Ok((0, 0)));
        assert_eq!(
            set_scheduling(current(), SchedPolicy::Other, 5),
            Err(Error::InvalidParam)
        );
    }

    #[test]
    fn current_affinity_is_not_empty() {
        let cpus = affinity(current()).unwrap();
        assert!(!cpus.is_empty());
        set_affinity(current(), &cpus).unwrap();
    }
}
