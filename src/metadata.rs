//! Source metadata types.
//!
//! [`SourceMetadata`] is read once when a source is opened and stays fixed
//! for the lifetime of the run.

use std::time::Duration;

/// What kind of input a source was opened from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// A single video file decoded through FFmpeg.
    Video,
    /// A directory of still images, one frame per file.
    ImageDirectory,
}

impl InputKind {
    /// Short lowercase label, as printed by the CLI.
    pub fn as_str(self) -> &'static str {
        match self {
            InputKind::Video => "video",
            InputKind::ImageDirectory => "images",
        }
    }
}

/// Metadata for a frame source.
///
/// # Example
///
/// ```no_run
/// use makepalette::{FrameSource, VideoSource};
///
/// let source = VideoSource::open("input.mp4")?;
/// let metadata = source.metadata();
/// println!("{}x{} @ {:.2} fps", metadata.width, metadata.height, metadata.frames_per_second);
/// # Ok::<(), makepalette::PaletteError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct SourceMetadata {
    /// Input kind.
    pub kind: InputKind,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second (approximate for variable-frame-rate video).
    pub frames_per_second: f64,
    /// Total addressable frames.
    pub frame_count: u64,
    /// Total running time.
    pub duration: Duration,
    /// Codec name for video (e.g. `"h264"`), `"image"` for directories.
    pub codec: String,
}

impl SourceMetadata {
    /// Duration as `h:mm:ss`, rounded to whole seconds.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use makepalette::{InputKind, SourceMetadata};
    ///
    /// let metadata = SourceMetadata {
    ///     kind: InputKind::Video,
    ///     width: 1920,
    ///     height: 1080,
    ///     frames_per_second: 24.0,
    ///     frame_count: 216_552,
    ///     duration: Duration::from_secs(9023),
    ///     codec: "h264".to_string(),
    /// };
    /// assert_eq!(metadata.length_timecode(), "2:30:23");
    /// ```
    pub fn length_timecode(&self) -> String {
        let seconds = self.duration.as_secs_f64().round() as u64;
        format!(
            "{}:{:02}:{:02}",
            seconds / 3600,
            (seconds % 3600) / 60,
            seconds % 60
        )
    }
}
