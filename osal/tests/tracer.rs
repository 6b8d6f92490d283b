use osal::time::{Timestamp, now};
use osal::trace::{Extent, Jitter};
use osal::{Deadline, Error, Osal, Tracer};

use std::thread;
use std::time::Duration;

fn feed(tracer: &mut Tracer, samples: impl IntoIterator<Item = u64>) {
    for s in samples {
        tracer.time(Timestamp::from_nanos(s)).unwrap();
    }
}

#[test]
fn test_one_swap_per_full_buffer() {
    let _osal = Osal::init().unwrap();
    let mut t = Tracer::alloc(4).unwrap();

    feed(&mut t, [1, 2, 3]);
    assert_eq!(t.timedwait(Deadline::Immediate), Err(Error::Timeout));

    feed(&mut t, [4]);
    assert_eq!(t.timedwait(Deadline::Immediate), Ok(()));
    assert_eq!(t.timedwait(Deadline::Immediate), Err(Error::Timeout));

    // Two more swaps before the reader looks: the handoff is a single flag.
    feed(&mut t, 5..13);
    assert_eq!(t.timedwait(Deadline::Immediate), Ok(()));
    assert_eq!(t.timedwait(Deadline::Immediate), Err(Error::Timeout));
}

#[test]
fn test_constant_interval_has_no_jitter() {
    let _osal = Osal::init().unwrap();
    let mut t = Tracer::alloc(100).unwrap();

    feed(&mut t, (0..100).map(|i| 1_000 + i * 250));

    let (jitter, extent) = t.analyze_min_max().unwrap();
    assert_eq!(
        jitter,
        Jitter {
            avg: 250,
            avg_jitter: 0,
            max_jitter: 0
        }
    );
    assert_eq!(extent, Extent { min: 250, max: 250 });
}

#[test]
fn test_expired_timedwait_returns_at_once() {
    let _osal = Osal::init().unwrap();
    let t = Tracer::alloc(4).unwrap();

    let start = now();
    assert_eq!(
        t.timedwait(Deadline::at(Timestamp::from_nanos(0))),
        Err(Error::Timeout)
    );
    assert!(start.elapsed() < Duration::from_millis(5));
}

#[test]
fn test_outlier_inside_buffer() {
    let _osal = Osal::init().unwrap();
    let (cnt, delta, k) = (11u64, 1_000u64, 300u64);
    let mut t = Tracer::alloc(cnt as usize).unwrap();

    // Sample 5 late by k: one interval grows by k, the next shrinks by k.
    feed(&mut t, (0..cnt).map(|i| i * delta + if i == 5 { k } else { 0 }));

    let (jitter, extent) = t.analyze_min_max().unwrap();
    assert_eq!(jitter.avg, delta);
    assert_eq!(jitter.max_jitter, k);
    assert!(jitter.avg_jitter > 0 && jitter.avg_jitter < k);
    assert_eq!(extent, Extent { min: delta - k, max: delta + k });
}

#[test]
fn test_outlier_on_last_sample() {
    let _osal = Osal::init().unwrap();
    let (cnt, delta) = (11u64, 1_000u64);
    let k = 50 * (cnt - 1);
    let mut t = Tracer::alloc(cnt as usize).unwrap();

    feed(
        &mut t,
        (0..cnt).map(|i| i * delta + if i == cnt - 1 { k } else { 0 }),
    );

    let jitter = t.analyze().unwrap();
    assert_eq!(jitter.avg, delta + k / (cnt - 1), "mean shifts by k/(cnt-1)");
    assert_eq!(jitter.max_jitter, k - k / (cnt - 1));
}

#[test]
fn test_relative_analysis_uses_raw_samples() {
    let _osal = Osal::init().unwrap();
    let mut t = Tracer::alloc(4).unwrap();

    feed(&mut t, [10, 20, 30, 40]);

    let (jitter, extent) = t.analyze_rel_min_max().unwrap();
    assert_eq!(jitter.avg, 25);
    assert_eq!(jitter.max_jitter, 15);
    // sqrt((225 + 25 + 25 + 225) / 4) = sqrt(125)
    assert_eq!(jitter.avg_jitter, 11);
    assert_eq!(extent, Extent { min: 10, max: 40 });
    assert_eq!(t.analyze_rel().unwrap(), jitter);
}

#[test]
fn test_analysis_reads_completed_buffer() {
    let _osal = Osal::init().unwrap();
    let mut t = Tracer::alloc(3).unwrap();

    feed(&mut t, [0, 100, 200]);
    // Partially fill the next buffer with a different period.
    feed(&mut t, [1_000, 1_500]);

    assert_eq!(t.analyze().unwrap().avg, 100);
    assert_eq!(t.last_time(), Timestamp::from_nanos(1_500));
}

#[test]
fn test_split_across_threads() {
    let _osal = Osal::init().unwrap();
    let (mut writer, mut reader) = Tracer::alloc(32).unwrap().split();
    assert_eq!(writer.capacity(), reader.capacity());

    let producer = thread::spawn(move || {
        for _ in 0..3 * 32 {
            writer.point().unwrap();
            thread::sleep(Duration::from_micros(200));
        }
        writer.last_time()
    });

    reader
        .timedwait(Deadline::after(Duration::from_secs(10)))
        .unwrap();
    let jitter = reader.analyze().unwrap();
    assert!(jitter.avg >= 200_000, "intervals include the sleep");

    let last = producer.join().unwrap();
    assert!(last > Timestamp::from_nanos(0));
}

#[test]
fn test_free_releases_tracer() {
    let _osal = Osal::init().unwrap();
    let t = Tracer::alloc(8).unwrap();
    assert_eq!(t.capacity(), 8);
    t.free();
}
