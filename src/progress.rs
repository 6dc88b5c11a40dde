//! Progress reporting, ETA estimation, and cancellation.
//!
//! This module provides [`ProgressEstimator`] for per-sample timing,
//! [`format_eta`] for human-readable remaining time, [`ProgressCallback`]
//! for observing a run, and [`CancellationToken`] for stopping one
//! cooperatively between samples.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use makepalette::{PaletteOptions, ProgressCallback, ProgressInfo};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("{:.1}% | ETA: {}", info.percentage, info.eta());
//!     }
//! }
//!
//! let options = PaletteOptions::new().with_progress(Arc::new(PrintProgress));
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

/// A snapshot of sampling progress, taken after one sample completes.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressInfo {
    /// Samples processed so far (1-based).
    pub current: u64,
    /// Samples planned for the run.
    pub total: u64,
    /// Completion percentage, `current / total * 100`.
    pub percentage: f64,
    /// Wall-clock time since sampling started.
    pub elapsed: Duration,
    /// Estimated whole seconds remaining.
    pub eta_seconds: u64,
    /// The frame index that was just sampled, when known.
    pub current_frame: Option<u64>,
    /// Gap between sampled frames.
    pub stride: u64,
    /// End of the sampled frame window (exclusive), when known.
    pub end_frame: Option<u64>,
}

impl ProgressInfo {
    /// Remaining time formatted by [`format_eta`].
    pub fn eta(&self) -> String {
        format_eta(self.eta_seconds)
    }
}

/// Trait for receiving progress updates during a run.
///
/// Implementations must be [`Send`] and [`Sync`] so they can be shared
/// through an [`Arc`] with a terminal renderer.
///
/// Callbacks observe but cannot halt the run. Use [`CancellationToken`]
/// for that.
pub trait ProgressCallback: Send + Sync {
    /// Called after each reported sample.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all notifications. The default when no callback is set.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clones share state. The sampling loop checks
/// [`is_cancelled`](CancellationToken::is_cancelled) before each sample.
///
/// # Example
///
/// ```
/// use makepalette::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(!token.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. All clones observe it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number of seconds as `"{s}s"`, `"{m}m {s}s"`, or
/// `"{h}h {m}m {s}s"`.
///
/// Floor division throughout, no zero padding.
///
/// # Example
///
/// ```
/// use makepalette::format_eta;
///
/// assert_eq!(format_eta(59), "59s");
/// assert_eq!(format_eta(60), "1m 0s");
/// assert_eq!(format_eta(3661), "1h 1m 1s");
/// ```
pub fn format_eta(seconds: u64) -> String {
    if seconds >= 3600 {
        let hours = seconds / 3600;
        let minutes = (seconds % 3600) / 60;
        format!("{hours}h {minutes}m {}s", seconds % 60)
    } else if seconds >= 60 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else {
        format!("{seconds}s")
    }
}

/// Estimate remaining whole seconds after `index` of `total` samples.
///
/// `floor(elapsed / index * (total - index))`, or 0 while `index <= 1`
/// since a single sample says nothing about throughput yet.
pub fn estimate_eta(elapsed: Duration, index: u64, total: u64) -> u64 {
    if index <= 1 {
        return 0;
    }
    let remaining = total.saturating_sub(index);
    let per_sample = elapsed.as_secs_f64() / index as f64;
    (per_sample * remaining as f64).floor() as u64
}

/// Tracks wall-clock time across a sampling run.
///
/// Each [`step`](ProgressEstimator::step) marks one more sample done and
/// returns a fresh [`ProgressInfo`].
#[derive(Debug)]
pub struct ProgressEstimator {
    start_time: Instant,
    total_samples: u64,
    index: u64,
    stride: u64,
    end_frame: Option<u64>,
}

impl ProgressEstimator {
    /// Start timing a run of `total_samples` samples.
    pub fn new(total_samples: u64) -> Self {
        Self {
            start_time: Instant::now(),
            total_samples,
            index: 0,
            stride: 1,
            end_frame: None,
        }
    }

    /// Report `stride` and the window end alongside each snapshot.
    #[must_use]
    pub fn with_window(mut self, stride: u64, end_frame: u64) -> Self {
        self.stride = stride;
        self.end_frame = Some(end_frame);
        self
    }

    /// Samples completed so far.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Record one completed sample, measuring elapsed time from the clock.
    pub fn step(&mut self, frame_number: Option<u64>) -> ProgressInfo {
        let elapsed = self.start_time.elapsed();
        self.step_with_elapsed(elapsed, frame_number)
    }

    /// Record one completed sample with an explicit elapsed time.
    pub fn step_with_elapsed(
        &mut self,
        elapsed: Duration,
        frame_number: Option<u64>,
    ) -> ProgressInfo {
        self.index += 1;
        let percentage = if self.total_samples > 0 {
            self.index as f64 / self.total_samples as f64 * 100.0
        } else {
            100.0
        };

        ProgressInfo {
            current: self.index,
            total: self.total_samples,
            percentage,
            elapsed,
            eta_seconds: estimate_eta(elapsed, self.index, self.total_samples),
            current_frame: frame_number,
            stride: self.stride,
            end_frame: self.end_frame,
        }
    }
}

/// Couples an estimator with a callback and a report cadence.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    estimator: ProgressEstimator,
    batch_size: u64,
    items_since_last_report: u64,
    pending: Option<ProgressInfo>,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        estimator: ProgressEstimator,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            estimator,
            batch_size: batch_size.max(1),
            items_since_last_report: 0,
            pending: None,
        }
    }

    /// Record one sample and fire the callback on batch boundaries and on
    /// the final planned sample.
    pub(crate) fn advance(&mut self, frame_number: u64) {
        let info = self.estimator.step(Some(frame_number));
        self.items_since_last_report += 1;

        if self.items_since_last_report >= self.batch_size || info.current >= info.total {
            self.callback.on_progress(&info);
            self.items_since_last_report = 0;
            self.pending = None;
        } else {
            self.pending = Some(info);
        }
    }

    /// Send the last snapshot if it has not been reported yet.
    pub(crate) fn finish(&mut self) {
        if let Some(info) = self.pending.take() {
            self.callback.on_progress(&info);
            self.items_since_last_report = 0;
        }
    }
}
