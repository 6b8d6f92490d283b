//! Latency-jitter tracer.
//!
//! A tracer records timestamps into one of two buffers of `cnt` samples.
//! When the active buffer is full the writer switches to the other one and
//! signals the reader, which can then analyze the completed buffer while the
//! writer keeps recording. Recording never takes a lock.
//!
//! The writer and reader halves can be separated with [`Tracer::split`] and
//! moved to different threads; each half is a unique owner, so there is
//! never more than one writer and one reader.
//!
//! # Examples
//!
//! ```rust,ignore
//! let (mut writer, mut reader) = Tracer::alloc(1000)?.split();
//!
//! // periodic thread
//! writer.point()?;
//!
//! // monitor thread
//! reader.timedwait(Deadline::after(Duration::from_secs(1)))?;
//! let jitter = reader.analyze()?;
//! ```

mod stats;

pub use stats::{Extent, Jitter};

use crate::error::{Error, Result};
use crate::sync::BinarySemaphore;
use crate::time::{Deadline, Timestamp, now};

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

struct Shared {
    cnt: usize,
    buffers: [Box<[AtomicU64]>; 2],
    /// Index of the buffer being written.
    active: AtomicUsize,
    /// Posted on every buffer switch.
    swapped: BinarySemaphore,
}

fn zeroed<T>(cnt: usize, zero: impl Fn() -> T) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(cnt)?;
    v.extend((0..cnt).map(|_| zero()));
    Ok(v)
}

/// Producer half of a [`Tracer`].
pub struct TraceWriter {
    shared: Arc<Shared>,
    act: usize,
    pos: usize,
}

impl TraceWriter {
    /// Records `ts` as the next sample.
    pub fn time(&mut self, ts: Timestamp) -> Result<()> {
        let shared = &*self.shared;
        shared.buffers[self.act][self.pos].store(ts.as_nanos(), Ordering::Relaxed);
        self.pos += 1;

        if self.pos == shared.cnt {
            self.act ^= 1;
            self.pos = 0;
            shared.active.store(self.act, Ordering::Release);
            shared.swapped.post()?;
        }
        Ok(())
    }

    /// Records the current time and returns it.
    pub fn point(&mut self) -> Result<Timestamp> {
        let ts = now();
        self.time(ts)?;
        Ok(ts)
    }

    /// The most recently recorded sample, zero before the first one.
    pub fn last_time(&self) -> Timestamp {
        let (buffer, index) = match self.pos {
            0 => (self.act ^ 1, self.shared.cnt - 1),
            pos => (self.act, pos - 1),
        };
        Timestamp::from_nanos(self.shared.buffers[buffer][index].load(Ordering::Relaxed))
    }

    /// Samples per buffer.
    pub fn capacity(&self) -> usize {
        self.shared.cnt
    }
}

/// Consumer half of a [`Tracer`].
///
/// Analysis always covers the buffer that is not being written, i.e. the
/// last completed one.
pub struct TraceReader {
    shared: Arc<Shared>,
    scratch: Vec<u64>,
}

impl TraceReader {
    /// Waits until the writer completes a buffer (`Timeout` on expiry).
    pub fn timedwait(&self, deadline: Deadline) -> Result<()> {
        self.shared.swapped.timedwait(deadline)
    }

    /// Copies the completed buffer into the scratch buffer.
    fn snapshot(&mut self) -> &mut [u64] {
        let done = self.shared.active.load(Ordering::Acquire) ^ 1;

        for (dst, src) in self.scratch.iter_mut().zip(self.shared.buffers[done].iter()) {
            *dst = src.load(Ordering::Relaxed);
        }
        &mut self.scratch
    }

    fn intervals(&mut self) -> Result<&[u64]> {
        if self.shared.cnt < 2 {
            return Err(Error::InvalidParam);
        }
        Ok(stats::deltas(self.snapshot()))
    }

    /// Statistics of the `cnt - 1` intervals between consecutive samples.
    ///
    /// `InvalidParam` when the tracer holds fewer than two samples per
    /// buffer.
    pub fn analyze(&mut self) -> Result<Jitter> {
        Ok(stats::jitter(self.intervals()?))
    }

    /// Like [`analyze`](Self::analyze), plus the shortest and longest
    /// interval.
    pub fn analyze_min_max(&mut self) -> Result<(Jitter, Extent)> {
        let intervals = self.intervals()?;
        Ok((stats::jitter(intervals), stats::extent(intervals)))
    }

    /// Statistics of the raw samples, for buffers that already hold
    /// relative values such as measured latencies.
    pub fn analyze_rel(&mut self) -> Result<Jitter> {
        Ok(stats::jitter(self.snapshot()))
    }

    /// Like [`analyze_rel`](Self::analyze_rel), plus the smallest and
    /// largest sample.
    pub fn analyze_rel_min_max(&mut self) -> Result<(Jitter, Extent)> {
        let samples = self.snapshot();
        Ok((stats::jitter(samples), stats::extent(samples)))
    }

    /// Samples per buffer.
    pub fn capacity(&self) -> usize {
        self.shared.cnt
    }
}

/// Double-buffered timestamp recorder.
pub struct Tracer {
    writer: TraceWriter,
    reader: TraceReader,
}

impl Tracer {
    /// Allocates a tracer with two buffers of `cnt` zeroed samples.
    ///
    /// # Errors
    ///
    /// - `InvalidParam` if `cnt` is 0,
    /// - `OutOfMemory` if the buffers cannot be allocated,
    /// - `Unavailable` without a live [`Osal`](crate::Osal) context.
    pub fn alloc(cnt: usize) -> Result<Self> {
        if cnt == 0 {
            return Err(Error::InvalidParam);
        }

        let a = zeroed(cnt, || AtomicU64::new(0))?;
        let b = zeroed(cnt, || AtomicU64::new(0))?;
        let scratch = zeroed(cnt, || 0u64)?;

        let shared = Arc::new(Shared {
            cnt,
            buffers: [a.into_boxed_slice(), b.into_boxed_slice()],
            active: AtomicUsize::new(0),
            swapped: BinarySemaphore::new(false)?,
        });

        Ok(Self {
            writer: TraceWriter {
                shared: shared.clone(),
                act: 0,
                pos: 0,
            },
            reader: TraceReader { shared, scratch },
        })
    }

    /// Separates the producer and consumer halves.
    pub fn split(self) -> (TraceWriter, TraceReader) {
        (self.writer, self.reader)
    }

    /// Releases the tracer.
    pub fn free(self) {
        drop(self);
    }

    /// See [`TraceWriter::capacity`].
    pub fn capacity(&self) -> usize {
        self.writer.capacity()
    }

    /// See [`TraceWriter::time`].
    pub fn time(&mut self, ts: Timestamp) -> Result<()> {
        self.writer.time(ts)
    }

    /// See [`TraceWriter::point`].
    pub fn point(&mut self) -> Result<Timestamp> {
        self.writer.point()
    }

    /// See [`TraceWriter::last_time`].
    pub fn last_time(&self) -> Timestamp {
        self.writer.last_time()
    }

    /// See [`TraceReader::timedwait`].
    pub fn timedwait(&self, deadline: Deadline) -> Result<()> {
        self.reader.timedwait(deadline)
    }

    /// See [`TraceReader::analyze`].
    pub fn analyze(&mut self) -> Result<Jitter> {
        self.reader.analyze()
    }

    /// See [`TraceReader::analyze_min_max`].
    pub fn analyze_min_max(&mut self) -> Result<(Jitter, Extent)> {
        self.reader.analyze_min_max()
    }

    /// See [`TraceReader::analyze_rel`].
    pub fn analyze_rel(&mut self) -> Result<Jitter> {
        self.reader.analyze_rel()
    }

    /// See [`TraceReader::analyze_rel_min_max`].
    pub fn analyze_rel_min_max(&mut self) -> Result<(Jitter, Extent)> {
        self.reader.analyze_rel_min_max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Osal;

    #[test]
    fn zero_capacity_is_rejected() {
        let _osal = Osal::init().unwrap();
        assert!(matches!(Tracer::alloc(0), Err(Error::InvalidParam)));
    }

    #[test]
    fn last_time_follows_buffer_switch() {
        let _osal = Osal::init().unwrap();
        let mut t = Tracer::alloc(2).unwrap();
        assert_eq!(t.last_time(), Timestamp::from_nanos(0));

        t.time(Timestamp::from_nanos(7)).unwrap();
        assert_eq!(t.last_time(), Timestamp::from_nanos(7));

        t.time(Timestamp::from_nanos(9)).unwrap();
        assert_eq!(t.writer.pos, 0);
        assert_eq!(t.last_time(), Timestamp::from_nanos(9));
    }

    #[test]
    fn single_sample_buffers_only_support_relative_analysis() {
        let _osal = Osal::init().unwrap();
        let mut t = Tracer::alloc(1).unwrap();
        t.time(Timestamp::from_nanos(40)).unwrap();

        assert_eq!(t.analyze(), Err(Error::InvalidParam));
        assert_eq!(
            t.analyze_rel().unwrap(),
            Jitter {
                avg: 40,
                avg_jitter: 0,
                max_jitter: 0
            }
        );
    }
}
