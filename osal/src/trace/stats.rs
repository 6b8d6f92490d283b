//! Interval statistics over a buffer of samples, in nanoseconds.

/// Mean and spread of a series of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Jitter {
    /// Integer mean.
    pub avg: u64,
    /// Population standard deviation around `avg`.
    pub avg_jitter: u64,
    /// Largest absolute deviation from `avg`.
    pub max_jitter: u64,
}

/// Smallest and largest value of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Extent {
    pub min: u64,
    pub max: u64,
}

/// Replaces `samples[i]` by `samples[i + 1] - samples[i]` and returns the
/// `len - 1` deltas. A sample earlier than its predecessor yields 0.
pub(crate) fn deltas(samples: &mut [u64]) -> &[u64] {
    let n = samples.len().saturating_sub(1);
    for i in 0..n {
        samples[i] = samples[i + 1].saturating_sub(samples[i]);
    }
    &samples[..n]
}

/// `values` must not be empty.
pub(crate) fn jitter(values: &[u64]) -> Jitter {
    let n = values.len() as u128;

    let sum: u128 = values.iter().map(|&v| v as u128).sum();
    let avg = (sum / n) as u64;

    let mut max_jitter = 0;
    let mut squares: u128 = 0;
    for &v in values {
        let dev = avg.abs_diff(v);
        max_jitter = max_jitter.max(dev);
        squares = squares.saturating_add((dev as u128) * (dev as u128));
    }

    Jitter {
        avg,
        avg_jitter: (squares / n).isqrt() as u64,
        max_jitter,
    }
}

/// `values` must not be empty.
pub(crate) fn extent(values: &[u64]) -> Extent {
    values.iter().fold(
        Extent {
            min: u64::MAX,
            max: 0,
        },
        |e, &v| Extent {
            min: e.min.min(v),
            max: e.max.max(v),
        },
    )
}
