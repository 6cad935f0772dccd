//! Small unit and timing helpers.

/// Number of milliseconds in one second.
pub const MILLIS_PER_SEC: u64 = 1_000;

/// Convert degrees Celsius to Fahrenheit.
#[inline]
pub fn celsius_to_fahrenheit(c: f32) -> f32 {
    c * (9.0 / 5.0) + 32.0
}

/// True once at least `interval_ms` have elapsed from `since_ms` to `now_ms`.
/// A `now_ms` earlier than `since_ms` counts as no time elapsed.
#[inline]
pub fn interval_elapsed(now_ms: u64, since_ms: u64, interval_ms: u64) -> bool {
    now_ms.saturating_sub(since_ms) >= interval_ms
}

/// Ticks of `tick_ms` that fit into one report interval (at least 1).
#[inline]
pub fn ticks_per_report(interval_ms: u64, tick_ms: u64) -> u64 {
    (interval_ms / tick_ms.max(1)).max(1)
}
