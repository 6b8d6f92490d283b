use osal::{Deadline, Error, LockConfig, LockType, Osal, Spinlock};

use std::cell::UnsafeCell;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

struct Shared {
    lock: Spinlock,
    value: UnsafeCell<u64>,
}

unsafe impl Sync for Shared {}

#[test]
fn test_spinlock_mutual_exclusion() {
    let _osal = Osal::init().unwrap();
    let shared = Arc::new(Shared {
        lock: Spinlock::new(LockConfig::new()).unwrap(),
        value: UnsafeCell::new(0),
    });

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let shared = shared.clone();
            thread::spawn(move || {
                for _ in 0..10_000 {
                    let _guard = shared.lock.guard().unwrap();
                    unsafe { *shared.value.get() += 1 };
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    let _guard = shared.lock.guard().unwrap();
    assert_eq!(unsafe { *shared.value.get() }, 8 * 10_000);
}

/// All contenders pinned to one CPU: waiters must let the holder run.
#[cfg(all(target_os = "linux", target_env = "gnu", not(feature = "portable")))]
#[test]
fn test_spinlock_contention_on_one_cpu() {
    use osal::task::CpuSet;
    use osal::time::now;
    use osal::{Task, TaskConfig};

    let _osal = Osal::init().unwrap();

    let (release_tx, release_rx) = mpsc::channel::<()>();
    let mut sampler = Task::create(TaskConfig::new(), move || release_rx.recv().is_ok()).unwrap();
    let first = sampler.affinity().unwrap().iter().next().unwrap();
    release_tx.send(()).unwrap();
    sampler.join().unwrap();

    let shared = Arc::new(Shared {
        lock: Spinlock::new(LockConfig::new()).unwrap(),
        value: UnsafeCell::new(0),
    });
    let pinned = TaskConfig::new().affinity(CpuSet::single(first).unwrap());

    let start = now();
    let mut tasks: Vec<_> = (0..4)
        .map(|_| {
            let shared = shared.clone();
            Task::create(pinned.clone(), move || {
                for _ in 0..5_000 {
                    let _guard = shared.lock.guard().unwrap();
                    unsafe { *shared.value.get() += 1 };
                }
            })
            .unwrap()
        })
        .collect();

    for t in &mut tasks {
        t.join().unwrap();
    }

    assert!(
        start.elapsed() < Duration::from_secs(10),
        "single-CPU contention took {:?}",
        start.elapsed()
    );
    let _guard = shared.lock.guard().unwrap();
    assert_eq!(unsafe { *shared.value.get() }, 4 * 5_000);
}

#[test]
fn test_spinlock_recursive() {
    let _osal = Osal::init().unwrap();
    let lock = Spinlock::new(LockConfig::new().lock_type(LockType::Recursive)).unwrap();

    lock.lock().unwrap();
    lock.lock().unwrap();
    lock.trylock().unwrap();
    lock.unlock().unwrap();
    lock.unlock().unwrap();
    assert!(lock.is_owned());
    lock.unlock().unwrap();
    assert!(!lock.is_owned());
    assert_eq!(lock.unlock(), Err(Error::PermissionDenied));
}

#[test]
fn test_spinlock_timedlock_expires() {
    let _osal = Osal::init().unwrap();
    let lock = Arc::new(Spinlock::new(LockConfig::new()).unwrap());

    let (locked_tx, locked_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();

    let holder = {
        let lock = lock.clone();
        thread::spawn(move || {
            lock.lock().unwrap();
            locked_tx.send(()).unwrap();
            release_rx.recv().unwrap();
            lock.unlock().unwrap();
        })
    };

    locked_rx.recv().unwrap();
    assert_eq!(lock.trylock(), Err(Error::Busy));
    assert_eq!(lock.timedlock(Deadline::Immediate), Err(Error::Timeout));
    assert_eq!(
        lock.timedlock(Deadline::after(Duration::from_millis(5))),
        Err(Error::Timeout)
    );

    let other = lock.clone();
    assert_eq!(
        thread::spawn(move || other.unlock()).join().unwrap(),
        Err(Error::PermissionDenied),
        "only the holder may unlock"
    );

    release_tx.send(()).unwrap();
    holder.join().unwrap();

    lock.timedlock(Deadline::after(Duration::from_secs(5))).unwrap();
    lock.unlock().unwrap();
}

#[test]
fn test_spinlock_destroy_while_locked() {
    let _osal = Osal::init().unwrap();
    let mut lock = Spinlock::new(LockConfig::new()).unwrap();

    lock.lock().unwrap();
    assert_eq!(lock.destroy(), Err(Error::MutexIsLocked));
    lock.unlock().unwrap();
    lock.destroy().unwrap();
    assert_eq!(lock.lock(), Err(Error::InvalidParam));
}

#[test]
fn test_spinlock_never_robust() {
    let _osal = Osal::init().unwrap();
    let lock = Spinlock::new(LockConfig::new()).unwrap();
    assert_eq!(lock.make_consistent(), Err(Error::InvalidParam));
}
