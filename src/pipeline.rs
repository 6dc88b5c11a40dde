//! The palette pipeline.
//!
//! [`sample_palette`] runs timing → sampling → color reduction against any
//! [`FrameSource`] and returns a [`Palette`]. [`PaletteJob`] wraps the whole
//! run for one input: open the source, settle the output path, claim it
//! with a placeholder, sample, assemble, and write.
//!
//! # Example
//!
//! ```no_run
//! use makepalette::{NoOverwrite, PaletteJob, PaletteOptions, Resolution, RunContext};
//!
//! let context = RunContext::new("input.mp4").with_output_dir("palettes");
//! let options = PaletteOptions::new().with_resolution("HD".parse::<Resolution>()?);
//! let summary = PaletteJob::new(context, options).run(&NoOverwrite)?;
//! println!("wrote {} stripes to {}", summary.sampled, summary.output_path.display());
//! # Ok::<(), makepalette::PaletteError>(())
//! ```

use std::path::PathBuf;

use image::RgbImage;

use crate::{
    assembler::assemble_colors,
    color::Color,
    configuration::{PaletteOptions, Resolution},
    error::PaletteError,
    metadata::{InputKind, SourceMetadata},
    output::{
        NoWorkspace, OverwritePolicy, WorkspaceLifecycle, check_output, define_output_path,
        write_palette, write_placeholder, write_swatch,
    },
    progress::{ProgressEstimator, ProgressTracker},
    sampler::{SampleIndex, compute_stride},
    source::{FrameSource, open_source},
    timing::{TimeRange, resolve_timing_parameters},
};

/// Colors gathered from one sampling run, in frame order.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct Palette {
    colors: Vec<Color>,
    /// Gap between sampled frames.
    pub stride: u64,
    /// Frame window that was sampled.
    pub range: TimeRange,
    /// Number of samples the plan called for.
    pub planned: u64,
    /// Frame index whose decode failure ended the run early, if any.
    pub truncated_at: Option<u64>,
}

impl Palette {
    /// The gathered colors.
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Number of gathered colors.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Returns `true` if nothing was gathered.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Returns `true` if a decode failure cut the run short.
    pub fn is_truncated(&self) -> bool {
        self.truncated_at.is_some()
    }

    /// Lay the colors out on a `resolution` canvas.
    ///
    /// # Errors
    ///
    /// Returns [`PaletteError::EmptyPalette`] if no colors were gathered.
    pub fn render(&self, resolution: Resolution) -> Result<RgbImage, PaletteError> {
        assemble_colors(&self.colors, resolution)
    }

    /// Take the colors out.
    pub fn into_colors(self) -> Vec<Color> {
        self.colors
    }
}

/// Sample `source` and reduce each sampled frame to a color.
///
/// Frames are decoded strictly one after another. If a frame fails to
/// decode, sampling stops and the colors gathered so far are returned with
/// [`Palette::truncated_at`] set, unless strict decoding is enabled, in
/// which case the decode error is returned.
///
/// # Errors
///
/// - [`PaletteError::InvalidArgument`] for bad timing, a zero sampling
///   rate, or a zero target width.
/// - [`PaletteError::Cancelled`] if the cancellation token fires.
/// - [`PaletteError::DecodeError`] in strict mode.
pub fn sample_palette(
    source: &mut dyn FrameSource,
    target_width: u32,
    options: &PaletteOptions,
) -> Result<Palette, PaletteError> {
    let plan = SamplingPlan::new(source.metadata(), target_width, options)?;
    plan.run(source, options, &mut NoWorkspace)
}

/// Frame window, stride, and indices for one run, settled before any
/// decoding.
struct SamplingPlan {
    range: TimeRange,
    stride: u64,
    indices: SampleIndex,
}

impl SamplingPlan {
    fn new(
        metadata: &SourceMetadata,
        target_width: u32,
        options: &PaletteOptions,
    ) -> Result<Self, PaletteError> {
        let total_frames = metadata.frame_count;
        let range =
            resolve_timing_parameters(&options.timing, metadata.frames_per_second, total_frames)?;
        let stride = compute_stride(total_frames, target_width, options.sampling_rate)?;
        Ok(Self {
            range,
            stride,
            indices: SampleIndex::new(range, stride, total_frames),
        })
    }

    fn run(
        self,
        source: &mut dyn FrameSource,
        options: &PaletteOptions,
        workspace: &mut dyn WorkspaceLifecycle,
    ) -> Result<Palette, PaletteError> {
        let Self {
            range,
            stride,
            indices,
        } = self;
        let planned = indices.len() as u64;

        log::debug!(
            "Sampling 1 frame every {stride} frames over {}..{} ({planned} samples)",
            range.start_frame,
            range.end_frame
        );

        let mut tracker = ProgressTracker::new(
            options.progress.clone(),
            ProgressEstimator::new(planned).with_window(stride, range.end_frame),
            options.batch_size,
        );
        let mut colors = Vec::with_capacity(usize::try_from(planned).unwrap_or(0));
        let mut truncated_at = None;

        for frame_number in indices {
            if options.is_cancelled() {
                return Err(PaletteError::Cancelled);
            }

            let color = match source.sample_color(frame_number) {
                Ok(color) => color,
                Err(error) if options.strict => return Err(error),
                Err(error) => {
                    log::warn!(
                        "Stopping after {} of {planned} samples: {error}",
                        colors.len()
                    );
                    truncated_at = Some(frame_number);
                    break;
                }
            };
            log::trace!("Frame {frame_number} -> {color}");

            if let Some(directory) = workspace.swatch_directory() {
                write_swatch(directory, colors.len(), color, options.swatch_size)?;
            }

            colors.push(color);
            tracker.advance(frame_number);
        }
        tracker.finish();

        Ok(Palette {
            colors,
            stride,
            range,
            planned,
            truncated_at,
        })
    }
}

/// Everything one run needs to know about its input and output.
///
/// Built once per run and passed down explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct RunContext {
    /// Input video file or image directory.
    pub input_path: PathBuf,
    /// Explicit output file; only its file name is used.
    pub output_file: Option<PathBuf>,
    /// Directory the output lands in. Current directory when `None`.
    pub output_dir: Option<PathBuf>,
}

impl RunContext {
    /// A context for `input_path` with default output naming.
    pub fn new(input_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_file: None,
            output_dir: None,
        }
    }

    /// Name the output file.
    pub fn with_output_file(mut self, output_file: impl Into<PathBuf>) -> Self {
        self.output_file = Some(output_file.into());
        self
    }

    /// Put the output in `output_dir`.
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(output_dir.into());
        self
    }

    /// Resolve the output path. Creates the output directory if needed.
    ///
    /// # Errors
    ///
    /// Same as [`define_output_path`].
    pub fn output_path(&self) -> Result<PathBuf, PaletteError> {
        define_output_path(
            &self.input_path,
            self.output_file.as_deref(),
            self.output_dir.as_deref(),
        )
    }
}

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSummary {
    /// Where the palette was written.
    pub output_path: PathBuf,
    /// Input kind that was sampled.
    pub input_kind: InputKind,
    /// Canvas size.
    pub resolution: Resolution,
    /// Gap between sampled frames.
    pub stride: u64,
    /// Frame window that was sampled.
    pub range: TimeRange,
    /// Samples the plan called for.
    pub planned: u64,
    /// Colors actually gathered, one stripe each.
    pub sampled: u64,
    /// Frame index whose decode failure ended the run early, if any.
    pub truncated_at: Option<u64>,
}

/// One complete input-to-image run.
///
/// The overwrite decision and workspace handling are injected so the job
/// can run without a terminal.
pub struct PaletteJob {
    context: RunContext,
    options: PaletteOptions,
    workspace: Box<dyn WorkspaceLifecycle>,
}

impl PaletteJob {
    /// Create a job with no workspace.
    pub fn new(context: RunContext, options: PaletteOptions) -> Self {
        Self {
            context,
            options,
            workspace: Box::new(NoWorkspace),
        }
    }

    /// Use `workspace` for scratch output during sampling.
    #[must_use]
    pub fn with_workspace(mut self, workspace: Box<dyn WorkspaceLifecycle>) -> Self {
        self.workspace = workspace;
        self
    }

    /// The job's run context.
    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// Open the input and run the job against it.
    ///
    /// # Errors
    ///
    /// [`PaletteError::SourceNotFound`] if the input is missing, plus
    /// everything [`run_with_source`](PaletteJob::run_with_source) returns.
    pub fn run(&mut self, overwrite: &dyn OverwritePolicy) -> Result<RenderSummary, PaletteError> {
        let mut source = open_source(&self.context.input_path)?;
        self.run_with_source(source.as_mut(), overwrite)
    }

    /// Run the job against an already opened source.
    ///
    /// Options are validated before anything touches the disk. After that
    /// the output path is resolved and checked against `overwrite`, a
    /// placeholder claims it, and the workspace is held for sampling only.
    ///
    /// # Errors
    ///
    /// - [`PaletteError::InvalidArgument`] for bad options.
    /// - [`PaletteError::OutputExists`] if the policy refuses to overwrite.
    /// - [`PaletteError::WriteError`] if the output cannot be written.
    /// - [`PaletteError::EmptyPalette`] if no frame could be sampled.
    /// - [`PaletteError::Cancelled`] if cancelled mid-run.
    pub fn run_with_source(
        &mut self,
        source: &mut dyn FrameSource,
        overwrite: &dyn OverwritePolicy,
    ) -> Result<RenderSummary, PaletteError> {
        let metadata: SourceMetadata = source.metadata().clone();
        let resolution = self
            .options
            .output_size
            .resolve(metadata.width, metadata.height)?;
        let plan = SamplingPlan::new(&metadata, resolution.width, &self.options)?;
        let output_path = self.context.output_path()?;

        check_output(&output_path, overwrite)?;
        write_placeholder(&output_path)?;

        log::debug!(
            "Rendering {} -> {} at {resolution}",
            self.context.input_path.display(),
            output_path.display()
        );

        self.workspace.prepare()?;
        let sampled = plan.run(source, &self.options, self.workspace.as_mut());
        self.workspace.release();
        let palette = sampled?;

        let canvas = palette.render(resolution)?;
        write_palette(&canvas, &output_path)?;

        Ok(RenderSummary {
            output_path,
            input_kind: metadata.kind,
            resolution,
            stride: palette.stride,
            range: palette.range,
            planned: palette.planned,
            sampled: palette.len() as u64,
            truncated_at: palette.truncated_at,
        })
    }
}

/// Shortcut: sample `source` and render it at `resolution` in one call.
///
/// # Errors
///
/// Same as [`sample_palette`] and [`Palette::render`].
pub fn render_palette(
    source: &mut dyn FrameSource,
    resolution: Resolution,
    options: &PaletteOptions,
) -> Result<RgbImage, PaletteError> {
    sample_palette(source, resolution.width, options)?.render(resolution)
}

