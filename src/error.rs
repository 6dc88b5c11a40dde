//! Error types for the `makepalette` crate.
//!
//! This module defines [`PaletteError`], the unified error type returned by
//! every fallible operation in the crate. Variants carry the path, frame
//! index, or upstream message needed to diagnose a failure without
//! re-running the job.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `makepalette` operations.
///
/// Argument and source errors are raised before any decoding starts.
/// [`DecodeError`](PaletteError::DecodeError) is normally absorbed by the
/// sampling loop, which stops early and keeps the colors gathered so far;
/// it only surfaces from single-frame calls or in strict mode.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PaletteError {
    /// A user-supplied value was malformed or out of range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The input path does not exist, or the image directory holds no images.
    #[error("Input not found: {path}")]
    SourceNotFound {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// The input exists but could not be opened as a media source.
    #[error("Failed to open input at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to the source constructor.
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The container does not carry a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A specific frame could not be decoded or read.
    #[error("Failed to decode frame {frame}: {reason}")]
    DecodeError {
        /// Index of the frame that failed.
        frame: u64,
        /// Underlying cause.
        reason: String,
    },

    /// No colors were gathered, so there is nothing to lay out.
    #[error("Palette is empty: no frames were sampled")]
    EmptyPalette,

    /// The output image could not be written.
    #[error("Failed to write output {path}: {reason}")]
    WriteError {
        /// Destination path.
        path: PathBuf,
        /// Underlying cause.
        reason: String,
    },

    /// The output path already exists and the overwrite policy refused it.
    #[error("Output already exists: {path}")]
    OutputExists {
        /// The existing output path.
        path: PathBuf,
    },

    /// The run was stopped through a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl From<FfmpegError> for PaletteError {
    fn from(error: FfmpegError) -> Self {
        PaletteError::FfmpegError(error.to_string())
    }
}

impl PaletteError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        PaletteError::InvalidArgument(message.into())
    }

    pub(crate) fn decode(frame: u64, reason: impl ToString) -> Self {
        PaletteError::DecodeError {
            frame,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        PaletteError::WriteError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
