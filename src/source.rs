//! Frame sources.
//!
//! A [`FrameSource`] is an ordered, randomly addressable sequence of frames
//! with a frame rate and pixel size. Two implementations ship with the
//! crate:
//!
//! - [`VideoSource`] decodes a video file through FFmpeg, seeking to each
//!   requested frame.
//! - [`ImageSequence`] treats a directory of still images as frames, in
//!   file-name order.
//!
//! [`open_source`] picks between them based on the input path. Both release
//! their decoder and file handles when dropped, so every exit path of a run
//! closes the source.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    Rational,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::RgbImage;

use crate::{
    color::{Color, average_color, reduce_image_file},
    error::PaletteError,
    metadata::{InputKind, SourceMetadata},
};

/// File extensions recognised as still images inside an input directory.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "bmp", "gif", "tif", "tiff", "webp",
];

/// Frame rate assumed for image directories unless overridden.
pub const DEFAULT_IMAGE_FRAME_RATE: f64 = 1.0;

/// An ordered, seekable sequence of frames.
///
/// Frames are addressed by index in `0..metadata().frame_count`. The
/// pipeline requests strictly increasing indices, one at a time.
pub trait FrameSource {
    /// Metadata read when the source was opened.
    fn metadata(&self) -> &SourceMetadata;

    /// Decode one frame as RGB8.
    ///
    /// # Errors
    ///
    /// Returns [`PaletteError::DecodeError`] if the frame cannot be read.
    fn frame(&mut self, frame_number: u64) -> Result<RgbImage, PaletteError>;

    /// Decode one frame and reduce it to its average color.
    ///
    /// # Errors
    ///
    /// Same as [`frame`](FrameSource::frame), plus a decode error for a
    /// zero-pixel frame.
    fn sample_color(&mut self, frame_number: u64) -> Result<Color, PaletteError> {
        let image = self.frame(frame_number)?;
        average_color(&image, frame_number)
    }
}

/// Open the input at `path` as a frame source.
///
/// Directories become an [`ImageSequence`], anything else a
/// [`VideoSource`].
///
/// # Errors
///
/// Returns [`PaletteError::SourceNotFound`] if the path does not exist,
/// plus any error from the chosen source's constructor.
pub fn open_source<P: AsRef<Path>>(path: P) -> Result<Box<dyn FrameSource>, PaletteError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(PaletteError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }

    if path.is_dir() {
        Ok(Box::new(ImageSequence::open(path)?))
    } else {
        Ok(Box::new(VideoSource::open(path)?))
    }
}

/// A video file decoded through FFmpeg.
///
/// Holds the demuxer, one video decoder, and an RGB24 scaler for the run.
/// Each [`frame`](FrameSource::frame) call seeks to the nearest keyframe
/// before the target and decodes forward until it reaches it.
///
/// # Example
///
/// ```no_run
/// use makepalette::{FrameSource, VideoSource};
///
/// let mut source = VideoSource::open("input.mp4")?;
/// let color = source.sample_color(120)?;
/// println!("frame 120 averages to {color}");
/// # Ok::<(), makepalette::PaletteError>(())
/// ```
pub struct VideoSource {
    input_context: Input,
    decoder: VideoDecoder,
    scaler: ScalingContext,
    video_stream_index: usize,
    time_base: Rational,
    start_pts: i64,
    metadata: SourceMetadata,
    file_path: PathBuf,
    decoded_frame: VideoFrame,
    rgb_frame: VideoFrame,
}

impl Debug for VideoSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoSource")
            .field("metadata", &self.metadata)
            .field("video_stream_index", &self.video_stream_index)
            .field("file_path", &self.file_path)
            .finish_non_exhaustive()
    }
}

impl VideoSource {
    /// Open a video file.
    ///
    /// Initialises FFmpeg (idempotent), locates the best video stream, and
    /// reads its size, frame rate, and frame count. The frame count comes
    /// from the stream header when present, otherwise from duration × fps.
    ///
    /// # Errors
    ///
    /// - [`PaletteError::SourceNotFound`] if the path does not exist.
    /// - [`PaletteError::FileOpen`] if FFmpeg cannot open or probe it.
    /// - [`PaletteError::NoVideoStream`] if it carries no video.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PaletteError> {
        let path = path.as_ref();
        let file_path = path.to_path_buf();
        if !path.exists() {
            return Err(PaletteError::SourceNotFound { path: file_path });
        }

        let open_error = |reason: String| PaletteError::FileOpen {
            path: file_path.clone(),
            reason,
        };

        ffmpeg_next::init()
            .map_err(|error| open_error(format!("FFmpeg initialisation failed: {error}")))?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| open_error(error.to_string()))?;

        let (
            video_stream_index,
            time_base,
            start_pts,
            frames_per_second,
            stream_frames,
            stream_duration,
            decoder,
        ) = {
            let stream = input_context
                .streams()
                .best(Type::Video)
                .ok_or(PaletteError::NoVideoStream)?;

            let frames_per_second = crate::utilities::rational_to_fps(stream.avg_frame_rate())
                .or_else(|| crate::utilities::rational_to_fps(stream.rate()))
                .ok_or_else(|| open_error("video stream reports no frame rate".to_string()))?;

            let decoder_context = CodecContext::from_parameters(stream.parameters())
                .map_err(|error| open_error(format!("Failed to read video codec parameters: {error}")))?;
            let decoder = decoder_context
                .decoder()
                .video()
                .map_err(|error| open_error(format!("Failed to create video decoder: {error}")))?;

            (
                stream.index(),
                stream.time_base(),
                crate::utilities::stream_start_pts(stream.start_time()),
                frames_per_second,
                stream.frames(),
                stream.duration(),
                decoder,
            )
        };

        let container_duration = input_context.duration();
        let duration = if container_duration > 0 {
            Duration::from_micros(container_duration as u64)
        } else if stream_duration > 0 {
            Duration::from_secs_f64(crate::utilities::pts_to_seconds(stream_duration, time_base))
        } else {
            Duration::ZERO
        };

        let frame_count = if stream_frames > 0 {
            stream_frames as u64
        } else {
            (duration.as_secs_f64() * frames_per_second) as u64
        };

        let width = decoder.width();
        let height = decoder.height();
        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let scaler = ScalingContext::get(
            decoder.format(),
            width,
            height,
            Pixel::RGB24,
            width,
            height,
            ScalingFlags::BILINEAR,
        )
        .map_err(|error| open_error(format!("Failed to create RGB scaler: {error}")))?;

        let metadata = SourceMetadata {
            kind: InputKind::Video,
            width,
            height,
            frames_per_second,
            frame_count,
            duration,
            codec,
        };

        log::debug!(
            "Opened {} ({}x{} @ {:.3} fps, {} frames, {})",
            file_path.display(),
            width,
            height,
            frames_per_second,
            frame_count,
            metadata.codec
        );

        Ok(Self {
            input_context,
            decoder,
            scaler,
            video_stream_index,
            time_base,
            start_pts,
            metadata,
            file_path,
            decoded_frame: VideoFrame::empty(),
            rgb_frame: VideoFrame::empty(),
        })
    }

    /// Path the source was opened from.
    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

impl FrameSource for VideoSource {
    fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }

    fn frame(&mut self, frame_number: u64) -> Result<RgbImage, PaletteError> {
        let total_frames = self.metadata.frame_count;
        if total_frames > 0 && frame_number >= total_frames {
            return Err(PaletteError::decode(
                frame_number,
                format!("out of range (video has {total_frames} frames)"),
            ));
        }

        let frames_per_second = self.metadata.frames_per_second;
        let (width, height) = (self.metadata.width, self.metadata.height);
        let stream_offset =
            crate::utilities::pts_to_seconds(self.start_pts, self.time_base) * 1_000_000.0;
        let target_timestamp =
            crate::utilities::frame_number_to_seek_timestamp(frame_number, frames_per_second)
                + stream_offset as i64;

        self.input_context
            .seek(target_timestamp, ..target_timestamp)
            .map_err(|error| PaletteError::decode(frame_number, format!("seek failed: {error}")))?;
        self.decoder.flush();

        let mut previous = None;
        for (stream, packet) in self.input_context.packets() {
            if stream.index() != self.video_stream_index {
                continue;
            }

            self.decoder
                .send_packet(&packet)
                .map_err(|error| PaletteError::decode(frame_number, error))?;

            while self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
                let current = crate::utilities::decoded_frame_number(
                    crate::utilities::frame_timestamp(&self.decoded_frame),
                    self.start_pts,
                    self.time_base,
                    frames_per_second,
                    previous,
                );
                previous = Some(current);

                // A seek can land past the exact index; take the first
                // frame at or after the target.
                if current >= frame_number {
                    return convert_frame(
                        &mut self.scaler,
                        &self.decoded_frame,
                        &mut self.rgb_frame,
                        width,
                        height,
                        frame_number,
                    );
                }
            }
        }

        self.decoder
            .send_eof()
            .map_err(|error| PaletteError::decode(frame_number, error))?;
        while self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
            let current = crate::utilities::decoded_frame_number(
                crate::utilities::frame_timestamp(&self.decoded_frame),
                self.start_pts,
                self.time_base,
                frames_per_second,
                previous,
            );
            previous = Some(current);
            if current >= frame_number {
                return convert_frame(
                    &mut self.scaler,
                    &self.decoded_frame,
                    &mut self.rgb_frame,
                    width,
                    height,
                    frame_number,
                );
            }
        }

        Err(PaletteError::decode(
            frame_number,
            "frame not found in the video stream",
        ))
    }
}

/// Scale a decoded frame to RGB24 and wrap it as an [`RgbImage`].
fn convert_frame(
    scaler: &mut ScalingContext,
    decoded_frame: &VideoFrame,
    rgb_frame: &mut VideoFrame,
    width: u32,
    height: u32,
    frame_number: u64,
) -> Result<RgbImage, PaletteError> {
    scaler
        .run(decoded_frame, rgb_frame)
        .map_err(|error| PaletteError::decode(frame_number, error))?;
    let buffer = crate::utilities::frame_to_rgb_buffer(rgb_frame, width, height);
    RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
        PaletteError::decode(frame_number, "decoded frame does not match the stream size")
    })
}

/// A directory of still images treated as frames.
///
/// Files are matched by extension (see [`IMAGE_EXTENSIONS`]) and ordered
/// by file name. The frame rate defaults to
/// [`DEFAULT_IMAGE_FRAME_RATE`]; it only matters when time bounds are given
/// as timestamps.
#[derive(Debug, Clone)]
pub struct ImageSequence {
    directory: PathBuf,
    paths: Vec<PathBuf>,
    metadata: SourceMetadata,
}

impl ImageSequence {
    /// Scan `directory` for images.
    ///
    /// # Errors
    ///
    /// - [`PaletteError::SourceNotFound`] if the directory is missing or
    ///   holds no images.
    /// - [`PaletteError::FileOpen`] if the first image's size cannot be
    ///   read.
    pub fn open<P: AsRef<Path>>(directory: P) -> Result<Self, PaletteError> {
        let directory = directory.as_ref().to_path_buf();
        if !directory.is_dir() {
            return Err(PaletteError::SourceNotFound { path: directory });
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(&directory)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.is_file() && has_image_extension(path))
            .collect();
        paths.sort();

        let Some(first) = paths.first() else {
            return Err(PaletteError::SourceNotFound { path: directory });
        };

        let (width, height) =
            image::image_dimensions(first).map_err(|error| PaletteError::FileOpen {
                path: first.clone(),
                reason: error.to_string(),
            })?;

        let frame_count = paths.len() as u64;
        let metadata = SourceMetadata {
            kind: InputKind::ImageDirectory,
            width,
            height,
            frames_per_second: DEFAULT_IMAGE_FRAME_RATE,
            frame_count,
            duration: Duration::from_secs_f64(frame_count as f64 / DEFAULT_IMAGE_FRAME_RATE),
            codec: "image".to_string(),
        };

        log::debug!(
            "Found {frame_count} images in {} ({width}x{height})",
            directory.display()
        );

        Ok(Self {
            directory,
            paths,
            metadata,
        })
    }

    /// Override the frame rate used to map timestamps onto images.
    ///
    /// # Errors
    ///
    /// Returns [`PaletteError::InvalidArgument`] for a non-positive rate.
    pub fn with_frame_rate(mut self, frames_per_second: f64) -> Result<Self, PaletteError> {
        if !frames_per_second.is_finite() || frames_per_second <= 0.0 {
            return Err(PaletteError::invalid(format!(
                "frame rate must be positive, got {frames_per_second}"
            )));
        }
        self.metadata.frames_per_second = frames_per_second;
        self.metadata.duration =
            Duration::from_secs_f64(self.metadata.frame_count as f64 / frames_per_second);
        Ok(self)
    }

    /// The scanned directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Image paths in frame order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    fn path_for(&self, frame_number: u64) -> Result<&Path, PaletteError> {
        usize::try_from(frame_number)
            .ok()
            .and_then(|index| self.paths.get(index))
            .map(PathBuf::as_path)
            .ok_or_else(|| {
                PaletteError::decode(
                    frame_number,
                    format!("out of range (directory has {} images)", self.paths.len()),
                )
            })
    }
}

impl FrameSource for ImageSequence {
    fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }

    fn frame(&mut self, frame_number: u64) -> Result<RgbImage, PaletteError> {
        let path = self.path_for(frame_number)?;
        let image = image::open(path).map_err(|error| {
            PaletteError::decode(frame_number, format!("{}: {error}", path.display()))
        })?;
        Ok(image.into_rgb8())
    }

    fn sample_color(&mut self, frame_number: u64) -> Result<Color, PaletteError> {
        let path = self.path_for(frame_number)?;
        reduce_image_file(path, frame_number)
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(extension))
        })
}
