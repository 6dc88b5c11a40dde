//! # makepalette
//!
//! Turn a video, or a directory of still images, into a color barcode: one
//! vertical stripe per sampled frame, each filled with that frame's average
//! color.
//!
//! Video decoding goes through FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate. Still
//! images, color reduction, and the output canvas use the
//! [`image`](https://crates.io/crates/image) crate.
//!
//! ## Quick Start
//!
//! ### Render a Palette
//!
//! ```no_run
//! use makepalette::{NoOverwrite, PaletteJob, PaletteOptions, Resolution, RunContext};
//!
//! let options = PaletteOptions::new().with_resolution(Resolution::new(1920, 1080));
//! let summary = PaletteJob::new(RunContext::new("input.mp4"), options).run(&NoOverwrite)?;
//! println!("{}", summary.output_path.display());
//! # Ok::<(), makepalette::PaletteError>(())
//! ```
//!
//! ### Sample Part of a Video
//!
//! ```no_run
//! use makepalette::{FrameSource, PaletteOptions, TimingOptions, VideoSource, sample_palette};
//!
//! let mut source = VideoSource::open("input.mp4")?;
//! let options = PaletteOptions::new()
//!     .with_sampling_rate(20)
//!     .with_timing(TimingOptions::new().with_center_percentage(80));
//! let palette = sample_palette(&mut source, 1920, &options)?;
//! for color in palette.colors() {
//!     println!("{color}");
//! }
//! # Ok::<(), makepalette::PaletteError>(())
//! ```
//!
//! ## How a Run Works
//!
//! 1. **Timing**: start/end timestamps or a center percentage become a
//!    half-open frame window ([`resolve_timing_parameters`]).
//! 2. **Sampling**: a stride is derived from the frame count, the canvas
//!    width, and the sampling rate ([`compute_stride`]); indices are
//!    produced lazily ([`SampleIndex`]).
//! 3. **Reduction**: each sampled frame is decoded and averaged to one
//!    [`Color`].
//! 4. **Assembly**: the colors are laid out as equal-width stripes
//!    ([`assemble_colors`]).
//!
//! A frame that fails to decode ends sampling early; the palette built so
//! far is still written. See [`PaletteOptions::with_strict_decoding`] to
//! turn that into an error instead.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod assembler;
pub mod color;
pub mod configuration;
pub mod error;
pub mod ffmpeg;
pub mod metadata;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod sampler;
pub mod source;
pub mod timing;
mod utilities;

pub use assembler::{assemble_colors, stripe_bounds, stripe_layout};
pub use color::{Color, average_color, reduce_image, reduce_image_file};
pub use configuration::{
    OutputSize, PaletteOptions, RESOLUTION_PRESETS, Resolution, parse_aspect_ratio,
};
pub use error::PaletteError;
pub use ffmpeg::{DecoderLogLevel, set_decoder_log_level};
pub use metadata::{InputKind, SourceMetadata};
pub use output::{
    DEFAULT_OUTPUT_EXTENSION, NoOverwrite, NoWorkspace, Overwrite, OverwritePolicy,
    SwatchDirectory, WorkspaceLifecycle, check_output, define_output_path, swatch_file_name,
    write_palette, write_placeholder, write_swatch,
};
pub use pipeline::{
    Palette, PaletteJob, RenderSummary, RunContext, render_palette, sample_palette,
};
pub use progress::{
    CancellationToken, ProgressCallback, ProgressEstimator, ProgressInfo, estimate_eta,
    format_eta,
};
pub use sampler::{DEFAULT_SAMPLING_RATE, SampleIndex, compute_stride, sample_frames};
pub use source::{
    DEFAULT_IMAGE_FRAME_RATE, FrameSource, IMAGE_EXTENSIONS, ImageSequence, VideoSource,
    open_source,
};
pub use timing::{
    DEFAULT_START_TIMESTAMP, TimeRange, TimingOptions, parse_timestamp,
    resolve_timing_parameters, time_to_frame,
};
