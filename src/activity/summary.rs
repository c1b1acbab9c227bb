//! Range summaries and lap partitioning.

use chrono::{DateTime, FixedOffset};

use crate::sample::Sample;

/// Aggregates describing one contiguous range of samples.
///
/// Summaries exist only to populate a session or lap message and are never
/// stored beyond the message they feed.
pub(crate) struct Summary {
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    /// Elapsed seconds over the range, scaled by the repeat count.
    pub elapsed_s: f64,
    /// Distance covered over the range in meters, scaled by the repeat count.
    pub distance_m: f64,
    pub start_latitude: f64,
    pub start_longitude: f64,
}

impl Summary {
    /// Summarize `samples[start..end)`, scaling durations and distances by
    /// the repeat count.
    ///
    /// The distance reading is taken one past the range so adjacent lap
    /// summaries telescope; an `end` beyond the last sample falls back to
    /// the last sample. Empty ranges summarize to zero elapsed time and
    /// distance at the range's start sample.
    pub(crate) fn over(samples: &[Sample], start: usize, end: usize, repeat: u32) -> Self {
        let first = &samples[start];
        let last = &samples[end.saturating_sub(1).max(start)];
        let far = samples.get(end).unwrap_or(last);

        let elapsed = (last.time - first.time).num_milliseconds() as f64 / 1000.0;

        Summary {
            start_time: first.time,
            end_time: last.time,
            elapsed_s: elapsed * repeat as f64,
            distance_m: (far.distance - first.distance) * repeat as f64,
            start_latitude: first.latitude,
            start_longitude: first.longitude,
        }
    }
}

/// Split `[0, count)` into four contiguous ranges at quartile boundaries.
///
/// The final range absorbs the remainder. Small counts produce empty or
/// single-sample ranges; exactly four ranges come back regardless.
pub(crate) fn lap_bounds(count: usize) -> [(usize, usize); 4] {
    let quarter = |i: usize| i * count / 4;

    [
        (quarter(0), quarter(1)),
        (quarter(1), quarter(2)),
        (quarter(2), quarter(3)),
        (quarter(3), count),
    ]
}
