//! Time-bound resolution.
//!
//! Turns user-facing time bounds into a concrete [`TimeRange`] of frame
//! indices. Bounds come either as `hh:mm:ss` timestamps or as a
//! "center percentage" that keeps the middle N% of the source.
//!
//! # Example
//!
//! ```
//! use makepalette::{TimingOptions, resolve_timing_parameters};
//!
//! let timing = TimingOptions::new().with_center_percentage(50);
//! let range = resolve_timing_parameters(&timing, 24.0, 1000)?;
//! assert_eq!((range.start_frame, range.end_frame), (250, 750));
//! # Ok::<(), makepalette::PaletteError>(())
//! ```

use crate::error::PaletteError;

/// The timestamp that means "from the very beginning".
pub const DEFAULT_START_TIMESTAMP: &str = "00:00:00";

/// A half-open range of frame indices, `start_frame..end_frame`.
///
/// Always satisfies `start_frame <= end_frame <= total_frames` for the
/// source it was resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// First frame to consider (inclusive).
    pub start_frame: u64,
    /// One past the last frame to consider.
    pub end_frame: u64,
}

impl TimeRange {
    /// The whole source.
    pub fn full(total_frames: u64) -> Self {
        Self {
            start_frame: 0,
            end_frame: total_frames,
        }
    }

    /// Number of frames covered by the range.
    pub fn len(&self) -> u64 {
        self.end_frame - self.start_frame
    }

    /// Returns `true` if the range covers no frames.
    pub fn is_empty(&self) -> bool {
        self.start_frame == self.end_frame
    }
}

/// User-specified time bounds.
///
/// Explicit start/end timestamps win over
/// [`center_percentage`](TimingOptions::center_percentage): the timestamp
/// path is taken as soon as `start` differs from `"00:00:00"` or a
/// non-empty `end` is given.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct TimingOptions {
    /// Start timestamp, `hh:mm:ss`.
    pub start: String,
    /// End timestamp, `hh:mm:ss`. `None` or empty means end of source.
    pub end: Option<String>,
    /// Keep only the middle N% of the source, `0 < N <= 100`.
    pub center_percentage: Option<u32>,
}

impl Default for TimingOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingOptions {
    /// Whole-source timing.
    pub fn new() -> Self {
        Self {
            start: DEFAULT_START_TIMESTAMP.to_string(),
            end: None,
            center_percentage: None,
        }
    }

    /// Set the start timestamp.
    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.start = start.into();
        self
    }

    /// Set the end timestamp.
    pub fn with_end(mut self, end: impl Into<String>) -> Self {
        self.end = Some(end.into());
        self
    }

    /// Keep only the middle `percentage` percent of the source.
    pub fn with_center_percentage(mut self, percentage: u32) -> Self {
        self.center_percentage = Some(percentage);
        self
    }

    fn end_timestamp(&self) -> Option<&str> {
        self.end.as_deref().filter(|end| !end.trim().is_empty())
    }

    fn has_explicit_bounds(&self) -> bool {
        self.start != DEFAULT_START_TIMESTAMP || self.end_timestamp().is_some()
    }
}

/// Parse an `hh:mm:ss` timestamp into seconds.
///
/// Each field may be fractional (`00:01:15.5`), but all three must be
/// present, finite, and non-negative.
///
/// # Errors
///
/// Returns [`PaletteError::InvalidArgument`] for anything else.
pub fn parse_timestamp(timestamp: &str) -> Result<f64, PaletteError> {
    let trimmed = timestamp.trim();
    let fields: Vec<&str> = trimmed.split(':').collect();
    if fields.len() != 3 {
        return Err(PaletteError::invalid(format!(
            "timestamp {trimmed:?} is not in hh:mm:ss form"
        )));
    }

    let mut values = [0.0_f64; 3];
    for (slot, field) in values.iter_mut().zip(&fields) {
        let value = field.parse::<f64>().map_err(|_| {
            PaletteError::invalid(format!("timestamp {trimmed:?} has a non-numeric field"))
        })?;
        if !value.is_finite() || value < 0.0 {
            return Err(PaletteError::invalid(format!(
                "timestamp {trimmed:?} has a negative or non-finite field"
            )));
        }
        *slot = value;
    }

    let [hours, minutes, seconds] = values;
    Ok(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Convert an `hh:mm:ss` timestamp to a frame index at `frames_per_second`.
///
/// Uses `round(seconds * fps)`.
///
/// # Errors
///
/// Returns [`PaletteError::InvalidArgument`] for a malformed timestamp or a
/// non-positive frame rate.
///
/// # Example
///
/// ```
/// use makepalette::time_to_frame;
///
/// assert_eq!(time_to_frame("01:32:51", 24.0)?, 133_704);
/// # Ok::<(), makepalette::PaletteError>(())
/// ```
pub fn time_to_frame(timestamp: &str, frames_per_second: f64) -> Result<u64, PaletteError> {
    validate_frame_rate(frames_per_second)?;
    let seconds = parse_timestamp(timestamp)?;
    Ok((seconds * frames_per_second).round() as u64)
}

/// Resolve user time bounds into a frame range for one source.
///
/// # Errors
///
/// - [`PaletteError::InvalidArgument`] if a timestamp is malformed, the
///   frame rate is not positive, the start lands after the end, or the
///   center percentage is outside `(0, 100]`.
pub fn resolve_timing_parameters(
    timing: &TimingOptions,
    frames_per_second: f64,
    total_frames: u64,
) -> Result<TimeRange, PaletteError> {
    if timing.has_explicit_bounds() {
        let start_frame = time_to_frame(&timing.start, frames_per_second)?.min(total_frames);
        let end_frame = match timing.end_timestamp() {
            Some(end) => time_to_frame(end, frames_per_second)?.min(total_frames),
            None => total_frames,
        };
        if start_frame > end_frame {
            return Err(PaletteError::invalid(format!(
                "start frame {start_frame} lies after end frame {end_frame}"
            )));
        }
        log::debug!("Timestamp window resolved to frames {start_frame}..{end_frame}");
        return Ok(TimeRange {
            start_frame,
            end_frame,
        });
    }

    if let Some(percentage) = timing.center_percentage {
        if percentage == 0 || percentage > 100 {
            return Err(PaletteError::invalid(format!(
                "center percentage must be between 1 and 100, got {percentage}"
            )));
        }
        // floor((100 - p) / 200 * total), kept in integers.
        let excluded = (100 - percentage) as u128 * total_frames as u128 / 200;
        let start_frame = excluded as u64;
        let end_frame = total_frames - start_frame;
        log::debug!("Center {percentage}% resolved to frames {start_frame}..{end_frame}");
        return Ok(TimeRange {
            start_frame,
            end_frame,
        });
    }

    Ok(TimeRange::full(total_frames))
}

fn validate_frame_rate(frames_per_second: f64) -> Result<(), PaletteError> {
    if frames_per_second.is_finite() && frames_per_second > 0.0 {
        Ok(())
    } else {
        Err(PaletteError::invalid(format!(
            "frame rate must be positive, got {frames_per_second}"
        )))
    }
}
