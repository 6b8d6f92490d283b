use osal::time::{Timestamp, now};
use osal::{BinarySemaphore, Deadline, Error, Osal};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

#[test]
fn test_post_wakes_blocked_waiter() {
    let _osal = Osal::init().unwrap();
    let sem = Arc::new(BinarySemaphore::new(false).unwrap());

    let waiter = {
        let sem = sem.clone();
        thread::spawn(move || sem.timedwait(Deadline::after(Duration::from_secs(10))))
    };

    thread::sleep(Duration::from_millis(20));
    sem.post().unwrap();

    assert_eq!(waiter.join().unwrap(), Ok(()));
    assert!(!sem.is_signaled(), "the waiter consumes the signal");
}

#[test]
fn test_expired_timedwait_returns_at_once() {
    let _osal = Osal::init().unwrap();
    let sem = BinarySemaphore::new(false).unwrap();

    let start = now();
    assert_eq!(
        sem.timedwait(Deadline::at(Timestamp::from_nanos(0))),
        Err(Error::Timeout)
    );
    assert!(start.elapsed() < Duration::from_millis(5));
}

#[test]
fn test_post_never_waits_for_a_parked_consumer() {
    let _osal = Osal::init().unwrap();
    let sem = Arc::new(BinarySemaphore::new(false).unwrap());

    let waiter = {
        let sem = sem.clone();
        thread::spawn(move || sem.timedwait(Deadline::after(Duration::from_secs(10))))
    };
    thread::sleep(Duration::from_millis(20));

    let start = now();
    sem.post().unwrap();
    assert!(start.elapsed() < Duration::from_millis(50));

    assert_eq!(waiter.join().unwrap(), Ok(()));
}

#[test]
fn test_repeated_posts_collapse() {
    let _osal = Osal::init().unwrap();
    let sem = BinarySemaphore::new(true).unwrap();

    sem.post().unwrap();
    sem.post().unwrap();

    sem.wait().unwrap();
    assert_eq!(
        sem.timedwait(Deadline::after(Duration::from_millis(5))),
        Err(Error::Timeout)
    );
}

#[test]
fn test_ping_pong_does_not_lose_signals() {
    let _osal = Osal::init().unwrap();
    let ping = Arc::new(BinarySemaphore::new(false).unwrap());
    let pong = Arc::new(BinarySemaphore::new(false).unwrap());
    let rounds = Arc::new(AtomicUsize::new(0));

    let peer = {
        let (ping, pong, rounds) = (ping.clone(), pong.clone(), rounds.clone());
        thread::spawn(move || {
            for _ in 0..10_000 {
                ping.wait().unwrap();
                rounds.fetch_add(1, Ordering::Relaxed);
                pong.post().unwrap();
            }
        })
    };

    for _ in 0..10_000 {
        ping.post().unwrap();
        pong.timedwait(Deadline::after(Duration::from_secs(10)))
            .unwrap();
    }

    peer.join().unwrap();
    assert_eq!(rounds.load(Ordering::Relaxed), 10_000);
}
