//! Internal utility functions.
//!
//! Pixel-plane copying and timestamp conversion shared by the video source.

use ffmpeg_next::{Rational, frame::Video as VideoFrame};

/// Copy an RGB24 plane into a tightly-packed buffer.
///
/// FFmpeg frames often pad each row (stride > width × 3). The padding is
/// stripped so the result can go straight into [`image::RgbImage::from_raw`].
pub(crate) fn frame_to_rgb_buffer(video_frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let row_length = (width as usize) * 3;
    let data = video_frame.data(0);

    if stride == row_length {
        data[..row_length * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_length * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + row_length]);
        }
        buffer
    }
}

/// Rescale a PTS value from stream time base to seconds.
pub(crate) fn pts_to_seconds(pts: i64, time_base: Rational) -> f64 {
    pts as f64 * f64::from(time_base.numerator()) / f64::from(time_base.denominator())
}

/// Rescale a PTS value to a frame index.
pub(crate) fn pts_to_frame_number(pts: i64, time_base: Rational, frames_per_second: f64) -> u64 {
    let seconds = pts_to_seconds(pts, time_base).max(0.0);
    (seconds * frames_per_second).round() as u64
}

/// Best-effort timestamp of a decoded frame, falling back to its PTS.
pub(crate) fn frame_timestamp(video_frame: &VideoFrame) -> Option<i64> {
    video_frame.timestamp().or_else(|| video_frame.pts())
}

/// Stream start time in stream time base; zero when the stream has none.
pub(crate) fn stream_start_pts(start_time: i64) -> i64 {
    if start_time == ffmpeg_next::ffi::AV_NOPTS_VALUE {
        0
    } else {
        start_time
    }
}

/// Frame index of a decoded frame.
///
/// The timestamp is taken relative to the stream start. A frame with no
/// timestamp follows the `previous` decoded frame, or is frame 0 if there
/// was none.
pub(crate) fn decoded_frame_number(
    timestamp: Option<i64>,
    stream_start: i64,
    time_base: Rational,
    frames_per_second: f64,
    previous: Option<u64>,
) -> u64 {
    match timestamp {
        Some(timestamp) => pts_to_frame_number(
            timestamp.saturating_sub(stream_start),
            time_base,
            frames_per_second,
        ),
        None => previous.map_or(0, |previous| previous + 1),
    }
}

/// Seek target for a frame index, in AV_TIME_BASE (microseconds).
///
/// Container-level seeking (`stream_index = -1`) expects this unit rather
/// than the stream time base.
pub(crate) fn frame_number_to_seek_timestamp(frame_number: u64, frames_per_second: f64) -> i64 {
    let seconds = frame_number as f64 / frames_per_second;
    (seconds * 1_000_000.0) as i64
}

/// Frames per second from a stream rate, or `None` for a zero rate.
pub(crate) fn rational_to_fps(rate: Rational) -> Option<f64> {
    if rate.numerator() > 0 && rate.denominator() > 0 {
        Some(f64::from(rate.numerator()) / f64::from(rate.denominator()))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_are_taken_from_stream_start() {
        let time_base = Rational::new(1, 90_000);
        // MPEG-TS style start at 1.4 s; 2 s in at 25 fps is frame 50.
        let start = 126_000;
        assert_eq!(
            decoded_frame_number(Some(start + 180_000), start, time_base, 25.0, None),
            50
        );
        assert_eq!(decoded_frame_number(Some(start), start, time_base, 25.0, None), 0);
    }

    #[test]
    fn frames_without_timestamps_count_forward() {
        let time_base = Rational::new(1, 25);
        assert_eq!(decoded_frame_number(None, 0, time_base, 25.0, None), 0);
        assert_eq!(decoded_frame_number(None, 0, time_base, 25.0, Some(0)), 1);
        assert_eq!(decoded_frame_number(None, 0, time_base, 25.0, Some(41)), 42);
    }

    #[test]
    fn missing_stream_start_counts_as_zero() {
        assert_eq!(stream_start_pts(ffmpeg_next::ffi::AV_NOPTS_VALUE), 0);
        assert_eq!(stream_start_pts(3003), 3003);
    }
}
