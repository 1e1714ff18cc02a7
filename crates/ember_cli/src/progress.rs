//! Render progress reporting.

use std::fmt::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Format a duration as `1d02h03m04s`.
///
/// Leading zero units are omitted and every unit after the first is
/// zero-padded to two digits. Durations under one second give an empty
/// string.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let days = total / 86_400;
    let hours = total % 86_400 / 3600;
    let minutes = total % 3600 / 60;
    let seconds = total % 60;

    let mut out = String::new();
    let mut leading = true;
    for (value, unit) in [(days, 'd'), (hours, 'h'), (minutes, 'm'), (seconds, 's')] {
        if leading && value == 0 {
            continue;
        }
        if leading {
            let _ = write!(out, "{value}{unit}");
            leading = false;
        } else {
            let _ = write!(out, "{value:02}{unit}");
        }
    }
    out
}

/// Logs render progress in 10% steps with a remaining time estimate.
///
/// Safe to call from every worker thread at once; each step is logged once.
#[derive(Debug)]
pub struct ProgressReporter {
    start: Instant,
    last_step: AtomicUsize,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            last_step: AtomicUsize::new(0),
        }
    }

    /// Record that `done` of `total` buckets are finished.
    pub fn report(&self, done: usize, total: usize) {
        if total == 0 {
            return;
        }
        let step = done * 10 / total;
        if self.last_step.fetch_max(step, Ordering::Relaxed) >= step {
            return;
        }

        let elapsed = self.start.elapsed();
        let eta = estimate_remaining(elapsed, done, total);
        if eta.is_zero() || done == total {
            log::info!("{:3}% done", step * 10);
        } else {
            log::info!("{:3}% done, about {} remaining", step * 10, format_duration(eta));
        }
    }

    /// Log the total wall time since the reporter was created.
    pub fn finish(&self) {
        let elapsed = self.start.elapsed();
        let text = format_duration(elapsed);
        if text.is_empty() {
            log::info!("Finished in {} ms", elapsed.as_millis());
        } else {
            log::info!("Finished in {text}");
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Average time per finished unit times the units left.
pub fn estimate_remaining(elapsed: Duration, done: usize, total: usize) -> Duration {
    if done == 0 || done >= total {
        return Duration::ZERO;
    }
    let per_unit = elapsed.as_secs_f64() / done as f64;
    Duration::from_secs_f64(per_unit * (total - done) as f64)
}
