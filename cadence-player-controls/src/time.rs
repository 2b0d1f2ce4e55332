use std::time::Duration;

/// Converts user supplied seconds into a position inside `[0, max]`.
/// Anything that is not a number lands on zero.
pub fn clamp_seconds(seconds: f64, max: Duration) -> Duration {
    if seconds.is_nan() || seconds <= 0.0 {
        return Duration::ZERO;
    }

    if seconds >= max.as_secs_f64() {
        return max;
    }

    Duration::from_secs_f64(seconds)
}

/// Absolute distance between two positions.
pub fn drift(a: Duration, b: Duration) -> Duration {
    a.abs_diff(b)
}

/// `m:ss`, with `0:00` for an empty or unknown length.
pub fn format_duration(seconds: u64) -> String {
    if seconds == 0 {
        return "0:00".to_string();
    }

    let minutes = seconds / 60;
    let remaining = seconds % 60;
    format!("{minutes}:{remaining:02}")
}
