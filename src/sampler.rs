//! Frame sampling.
//!
//! Decides which frames of a source get reduced to a color. The stride
//! depends on the whole source length and the output width, so a wider
//! canvas or a lower sampling rate samples more densely.

use std::iter::FusedIterator;

use crate::{error::PaletteError, timing::TimeRange};

/// Default sampling rate: roughly ten frames skipped per output column.
pub const DEFAULT_SAMPLING_RATE: u32 = 10;

/// Compute the gap between consecutive sampled frames.
///
/// `stride = max(1, floor(total_frames / target_width * sampling_rate))`.
///
/// # Errors
///
/// Returns [`PaletteError::InvalidArgument`] if `target_width` or
/// `sampling_rate` is zero.
///
/// # Example
///
/// ```
/// assert_eq!(makepalette::compute_stride(1000, 100, 10)?, 100);
/// assert_eq!(makepalette::compute_stride(10, 1920, 10)?, 1);
/// # Ok::<(), makepalette::PaletteError>(())
/// ```
pub fn compute_stride(
    total_frames: u64,
    target_width: u32,
    sampling_rate: u32,
) -> Result<u64, PaletteError> {
    if target_width == 0 {
        return Err(PaletteError::invalid("target output width must be at least 1"));
    }
    if sampling_rate == 0 {
        return Err(PaletteError::invalid("sampling rate must be at least 1"));
    }

    let stride = total_frames as u128 * sampling_rate as u128 / target_width as u128;
    Ok(u64::try_from(stride).unwrap_or(u64::MAX).max(1))
}

/// A lazy, one-shot cursor over the frame indices to sample.
///
/// Yields `start_frame, start_frame + stride, …` while below
/// `min(end_frame, total_frames)`. The cursor is consumed by the decode
/// loop and deliberately not `Clone`: sampling again means building a new
/// one.
#[derive(Debug)]
#[must_use]
pub struct SampleIndex {
    next: u64,
    limit: u64,
    stride: u64,
}

impl SampleIndex {
    /// Create the cursor for `range` within a source of `total_frames`.
    ///
    /// A zero `stride` is treated as 1.
    pub fn new(range: TimeRange, stride: u64, total_frames: u64) -> Self {
        Self {
            next: range.start_frame,
            limit: range.end_frame.min(total_frames),
            stride: stride.max(1),
        }
    }

    /// The stride between yielded indices.
    pub fn stride(&self) -> u64 {
        self.stride
    }

    fn remaining(&self) -> u64 {
        if self.next >= self.limit {
            0
        } else {
            (self.limit - self.next).div_ceil(self.stride)
        }
    }
}

impl Iterator for SampleIndex {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.next >= self.limit {
            return None;
        }
        let current = self.next;
        self.next = current.saturating_add(self.stride);
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining()).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SampleIndex {}

impl FusedIterator for SampleIndex {}

/// Build the sampling plan for one run.
///
/// Convenience wrapper over [`compute_stride`] and [`SampleIndex::new`].
///
/// # Errors
///
/// Same as [`compute_stride`].
pub fn sample_frames(
    total_frames: u64,
    target_width: u32,
    sampling_rate: u32,
    range: TimeRange,
) -> Result<SampleIndex, PaletteError> {
    let stride = compute_stride(total_frames, target_width, sampling_rate)?;
    Ok(SampleIndex::new(range, stride, total_frames))
}
