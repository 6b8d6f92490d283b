use osal::task::{self, CpuSet, TaskState};
use osal::{Error, Osal, SchedPolicy, Task, TaskConfig};

use std::sync::mpsc;

const POSIX: bool = cfg!(all(
    target_os = "linux",
    target_env = "gnu",
    not(feature = "portable")
));

#[test]
fn test_join_returns_entry_result() {
    let _osal = Osal::init().unwrap();
    let input = 20;

    let mut t = Task::create(TaskConfig::new().name("adder"), move || input + 22).unwrap();
    assert_eq!(t.name(), Some("adder"));
    assert_eq!(t.state(), TaskState::Running);

    assert_eq!(t.join(), Ok(42));
    assert_eq!(t.state(), TaskState::Joined);
    assert_eq!(t.join(), Err(Error::InvalidParam), "a task joins only once");
    assert_eq!(t.detach(), Err(Error::InvalidParam));
}

#[test]
fn test_thread_gets_configured_name() {
    let _osal = Osal::init().unwrap();
    let mut t = Task::create(TaskConfig::new().name("named-task"), || {
        std::thread::current().name().map(str::to_owned)
    })
    .unwrap();

    assert_eq!(t.join().unwrap().as_deref(), Some("named-task"));
}

#[test]
fn test_exit_value_is_joined() {
    let _osal = Osal::init().unwrap();
    let mut t = Task::create(TaskConfig::new(), || -> u32 { task::exit(7u32) }).unwrap();

    assert_eq!(t.join(), Ok(7));
}

#[test]
fn test_panicking_entry_fails_join() {
    let _osal = Osal::init().unwrap();
    let mut t = Task::create(TaskConfig::new(), || -> u32 { panic!("entry failed") }).unwrap();

    assert_eq!(t.join(), Err(Error::OperationFailed));
}

#[test]
fn test_detach() {
    let _osal = Osal::init().unwrap();
    let (tx, rx) = mpsc::channel();

    let mut t = Task::create(TaskConfig::new(), move || tx.send(1).unwrap()).unwrap();
    t.detach().unwrap();

    assert_eq!(t.state(), TaskState::Detached);
    assert_eq!(t.join(), Err(Error::InvalidParam));
    assert_eq!(t.priority(), Err(Error::InvalidParam));
    assert_eq!(rx.recv().unwrap(), 1);
}

#[test]
fn test_invalid_name_rejected() {
    let _osal = Osal::init().unwrap();
    let r = Task::create(TaskConfig::new().name("bad\0name"), || ());
    assert!(matches!(r, Err(Error::InvalidParam)));
}

#[test]
fn test_priority_outside_range_rejected() {
    let _osal = Osal::init().unwrap();
    let config = TaskConfig::new().policy(SchedPolicy::Other).priority(1_000);
    let r = Task::create(config, || ());

    let expected = if POSIX {
        Error::InvalidParam
    } else {
        Error::NotImplemented
    };
    assert!(matches!(r, Err(e) if e == expected));
}

#[test]
fn test_realtime_policy_applies_or_is_refused() {
    let _osal = Osal::init().unwrap();
    let config = TaskConfig::new().policy(SchedPolicy::Fifo).priority(10);

    match Task::create(config, || ()) {
        Ok(mut t) => {
            assert!(POSIX);
            t.join().unwrap();
        }
        // Unprivileged processes may not use real-time policies.
        Err(Error::PermissionDenied) => assert!(POSIX),
        Err(e) => assert!(!POSIX && e == Error::NotImplemented, "unexpected {e:?}"),
    }
}

#[test]
fn test_scheduling_of_live_task() {
    let _osal = Osal::init().unwrap();
    let (release_tx, release_rx) = mpsc::channel::<()>();

    let mut t = Task::create(TaskConfig::new(), move || release_rx.recv().is_ok()).unwrap();

    if POSIX {
        assert_eq!(t.priority(), Ok((SchedPolicy::Other, 0)));

        let cpus = t.affinity().unwrap();
        assert!(!cpus.is_empty());
        t.set_affinity(cpus).unwrap();
        assert_eq!(t.affinity(), Ok(cpus));

        assert_eq!(t.set_affinity(CpuSet::new()), Err(Error::InvalidParam));
    } else {
        assert_eq!(t.priority(), Err(Error::NotImplemented));
        assert_eq!(t.affinity(), Err(Error::NotImplemented));
    }

    release_tx.send(()).unwrap();
    assert_eq!(t.join(), Ok(true));
}

#[test]
fn test_affinity_inherited_from_config() {
    if !POSIX {
        return;
    }
    let _osal = Osal::init().unwrap();

    let (release_tx, release_rx) = mpsc::channel::<()>();
    let mut sampler = Task::create(TaskConfig::new(), move || release_rx.recv().is_ok()).unwrap();
    let first = sampler.affinity().unwrap().iter().next().unwrap();
    release_tx.send(()).unwrap();
    sampler.join().unwrap();

    let pinned = CpuSet::single(first).unwrap();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let mut t = Task::create(TaskConfig::new().affinity(pinned), move || {
        release_rx.recv().is_ok()
    })
    .unwrap();

    assert_eq!(t.affinity(), Ok(pinned));
    release_tx.send(()).unwrap();
    t.join().unwrap();
}
