//! Granularity policy: decides whether a byte count deserves a callback.
//!
//! Progress is split into buckets of `granularity` percent. A listener is
//! notified when the transfer enters a new bucket, plus unconditionally at
//! 0% and at completion. For a monotonically growing byte count this bounds
//! the number of callbacks per transfer to `ceil(100 / granularity) + 2`,
//! however many reads the consumer performs.

/// Largest meaningful granularity: one bucket for the whole transfer.
pub const MAX_GRANULARITY: f32 = 100.0;

/// Clamp a listener-provided granularity into `[0, 100]`.
///
/// Negative and NaN values mean "every update".
pub fn sanitize_granularity(granularity: f32) -> f32 {
    if granularity.is_nan() || granularity <= 0.0 {
        0.0
    } else {
        granularity.min(MAX_GRANULARITY)
    }
}

/// Bucket index of `current` bytes out of `total` for the given granularity.
///
/// Returns `None` when no bucket can be computed: unknown or zero total, or a
/// zero granularity.
pub fn bucket(current: u64, total: Option<u64>, granularity: f32) -> Option<u64> {
    let total = total.filter(|t| *t > 0)?;
    let granularity = sanitize_granularity(granularity);
    if granularity == 0.0 {
        return None;
    }
    let percent = 100.0 * current as f64 / total as f64;
    Some((percent / f64::from(granularity)).floor() as u64)
}

/// Decide whether an update for one transfer must reach its listener.
///
/// `last_bucket` is the bucket stored for this transfer; it is replaced when
/// a new bucket is entered. Completion, 0% and per-read granularity dispatch
/// without touching it. An unknown or zero `total` degrades to per-read
/// dispatch.
pub fn needs_dispatch(
    last_bucket: &mut Option<u64>,
    current: u64,
    total: Option<u64>,
    granularity: f32,
) -> bool {
    if current == 0 || Some(current) == total {
        return true;
    }
    let Some(bucket) = bucket(current, total, granularity) else {
        return true;
    };
    if *last_bucket == Some(bucket) {
        return false;
    }
    *last_bucket = Some(bucket);
    true
}
