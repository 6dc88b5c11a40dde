//! Run configuration.
//!
//! [`PaletteOptions`] is a builder that threads output size, sampling
//! density, time bounds, progress callbacks, and cancellation through a
//! palette run without widening every function signature.
//! [`Resolution`] parses `"WxH"` literals and named presets.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use makepalette::{
//!     CancellationToken, PaletteOptions, ProgressCallback, ProgressInfo, Resolution,
//!     TimingOptions,
//! };
//!
//! struct LogProgress;
//! impl ProgressCallback for LogProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("{}/{} done", info.current, info.total);
//!     }
//! }
//!
//! let token = CancellationToken::new();
//! let options = PaletteOptions::new()
//!     .with_resolution("4K".parse::<Resolution>()?)
//!     .with_sampling_rate(5)
//!     .with_timing(TimingOptions::new().with_center_percentage(90))
//!     .with_progress(Arc::new(LogProgress))
//!     .with_cancellation(token.clone());
//! # Ok::<(), makepalette::PaletteError>(())
//! ```

use std::{
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    str::FromStr,
    sync::Arc,
};

use crate::{
    error::PaletteError,
    progress::{CancellationToken, NoOpProgress, ProgressCallback},
    sampler::DEFAULT_SAMPLING_RATE,
    timing::TimingOptions,
};

/// Named output sizes accepted wherever a resolution is parsed.
///
/// Lookup is case-insensitive. `u` and `16:9` are shorthands for
/// `ultrawide` and `HD`.
pub const RESOLUTION_PRESETS: &[(&str, u32, u32)] = &[
    ("HD", 1920, 1080),
    ("2K", 2560, 1440),
    ("4K", 3840, 2160),
    ("8K", 7680, 4320),
    ("ultrawide", 8976, 3544),
    ("u", 8976, 3544),
    ("phone", 1080, 1920),
    ("2.39", 4096, 1716),
    ("1.85", 4096, 2214),
    ("16:9", 1920, 1080),
    ("A4", 3508, 2480),
    ("A3", 4960, 3508),
    ("A5", 2480, 1748),
];

/// Output canvas size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    /// Canvas width; one column range per stripe.
    pub width: u32,
    /// Canvas height.
    pub height: u32,
}

impl Resolution {
    /// Build a resolution from explicit dimensions.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Look up a named preset such as `"4K"` or `"A4"`.
    pub fn preset(name: &str) -> Option<Self> {
        RESOLUTION_PRESETS
            .iter()
            .find(|(preset, _, _)| preset.eq_ignore_ascii_case(name))
            .map(|&(_, width, height)| Self::new(width, height))
    }

    /// Derive the height from `width / aspect_ratio`, truncated.
    ///
    /// # Errors
    ///
    /// Returns [`PaletteError::InvalidArgument`] if the width is zero or
    /// the ratio is not a positive finite number.
    ///
    /// # Example
    ///
    /// ```
    /// use makepalette::Resolution;
    ///
    /// let resolution = Resolution::from_aspect_ratio(4096, 2.39)?;
    /// assert_eq!(resolution, Resolution::new(4096, 1713));
    /// # Ok::<(), makepalette::PaletteError>(())
    /// ```
    pub fn from_aspect_ratio(width: u32, aspect_ratio: f64) -> Result<Self, PaletteError> {
        if width == 0 {
            return Err(PaletteError::invalid("width must be at least 1"));
        }
        if !aspect_ratio.is_finite() || aspect_ratio <= 0.0 {
            return Err(PaletteError::invalid(format!(
                "aspect ratio must be positive, got {aspect_ratio}"
            )));
        }
        let height = (f64::from(width) / aspect_ratio) as u32;
        Ok(Self::new(width, height.max(1)))
    }
}

impl Display for Resolution {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = PaletteError;

    /// Parse a preset name or a `WxH` literal.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if let Some(preset) = Self::preset(trimmed) {
            return Ok(preset);
        }

        let (width, height) = trimmed
            .split_once(['x', 'X'])
            .ok_or_else(|| PaletteError::invalid(format!("unknown resolution {trimmed:?}")))?;
        let width = width
            .trim()
            .parse::<u32>()
            .map_err(|error| PaletteError::invalid(format!("bad width in {trimmed:?}: {error}")))?;
        let height = height
            .trim()
            .parse::<u32>()
            .map_err(|error| PaletteError::invalid(format!("bad height in {trimmed:?}: {error}")))?;
        if width == 0 || height == 0 {
            return Err(PaletteError::invalid(format!(
                "resolution {trimmed:?} must be at least 1x1"
            )));
        }
        Ok(Self::new(width, height))
    }
}

/// Parse an aspect ratio written as a decimal (`2.39`) or a ratio (`16:9`).
///
/// # Errors
///
/// Returns [`PaletteError::InvalidArgument`] for anything that is not a
/// positive finite number.
pub fn parse_aspect_ratio(value: &str) -> Result<f64, PaletteError> {
    let trimmed = value.trim();
    let ratio = match trimmed.split_once(':') {
        Some((numerator, denominator)) => {
            let numerator = numerator.trim().parse::<f64>();
            let denominator = denominator.trim().parse::<f64>();
            match (numerator, denominator) {
                (Ok(numerator), Ok(denominator)) if denominator != 0.0 => numerator / denominator,
                _ => f64::NAN,
            }
        }
        None => trimmed.parse::<f64>().unwrap_or(f64::NAN),
    };

    if ratio.is_finite() && ratio > 0.0 {
        Ok(ratio)
    } else {
        Err(PaletteError::invalid(format!(
            "aspect ratio {trimmed:?} is not a positive number"
        )))
    }
}

/// How big the output canvas should be.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum OutputSize {
    /// Match the source frame dimensions.
    #[default]
    Source,
    /// Exact canvas size.
    Exact(Resolution),
    /// Fixed width, height derived from `width / aspect_ratio`.
    AspectRatio {
        /// Canvas width.
        width: u32,
        /// Width divided by height.
        aspect_ratio: f64,
    },
}

impl OutputSize {
    /// Resolve the canvas size given the source frame dimensions.
    ///
    /// For [`OutputSize::AspectRatio`] a zero width falls back to the
    /// source width.
    ///
    /// # Errors
    ///
    /// Returns [`PaletteError::InvalidArgument`] if the result would be
    /// empty or the aspect ratio is invalid.
    pub fn resolve(&self, source_width: u32, source_height: u32) -> Result<Resolution, PaletteError> {
        let resolution = match *self {
            OutputSize::Source => Resolution::new(source_width, source_height),
            OutputSize::Exact(resolution) => resolution,
            OutputSize::AspectRatio {
                width,
                aspect_ratio,
            } => {
                let width = if width == 0 { source_width } else { width };
                Resolution::from_aspect_ratio(width, aspect_ratio)?
            }
        };

        if resolution.width == 0 || resolution.height == 0 {
            return Err(PaletteError::invalid(format!(
                "output resolution must be at least 1x1, got {resolution}"
            )));
        }
        Ok(resolution)
    }
}

/// Configuration for one palette run.
///
/// All fields have defaults: source resolution, sampling rate 10, the
/// whole source, no progress callback, no cancellation, lenient decoding.
#[derive(Clone)]
pub struct PaletteOptions {
    pub(crate) output_size: OutputSize,
    pub(crate) sampling_rate: u32,
    pub(crate) timing: TimingOptions,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) cancellation: Option<CancellationToken>,
    /// How often the progress callback fires (every N samples).
    pub(crate) batch_size: u64,
    /// Fail on the first undecodable frame instead of truncating.
    pub(crate) strict: bool,
    /// Edge length of exported swatch images.
    pub(crate) swatch_size: u32,
}

impl Debug for PaletteOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("PaletteOptions")
            .field("output_size", &self.output_size)
            .field("sampling_rate", &self.sampling_rate)
            .field("timing", &self.timing)
            .field("has_cancellation", &self.cancellation.is_some())
            .field("batch_size", &self.batch_size)
            .field("strict", &self.strict)
            .field("swatch_size", &self.swatch_size)
            .finish()
    }
}

impl Default for PaletteOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl PaletteOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            output_size: OutputSize::Source,
            sampling_rate: DEFAULT_SAMPLING_RATE,
            timing: TimingOptions::new(),
            progress: Arc::new(NoOpProgress),
            cancellation: None,
            batch_size: 1,
            strict: false,
            swatch_size: 64,
        }
    }

    /// Use an exact output resolution.
    #[must_use]
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.output_size = OutputSize::Exact(resolution);
        self
    }

    /// Set the output size policy.
    #[must_use]
    pub fn with_output_size(mut self, output_size: OutputSize) -> Self {
        self.output_size = output_size;
        self
    }

    /// Set the sampling rate. Higher values sample more sparsely.
    ///
    /// Zero is rejected when the run starts.
    #[must_use]
    pub fn with_sampling_rate(mut self, sampling_rate: u32) -> Self {
        self.sampling_rate = sampling_rate;
        self
    }

    /// Set the time bounds.
    #[must_use]
    pub fn with_timing(mut self, timing: TimingOptions) -> Self {
        self.timing = timing;
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token.
    ///
    /// When the token fires, the run stops before the next sample and
    /// returns [`PaletteError::Cancelled`].
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Set how often the progress callback fires. Clamped to at least 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Fail the run on the first undecodable frame.
    ///
    /// By default a decode failure ends sampling early and the palette is
    /// built from the colors gathered so far.
    #[must_use]
    pub fn with_strict_decoding(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Edge length in pixels of swatch images written to a workspace.
    /// Clamped to at least 1.
    #[must_use]
    pub fn with_swatch_size(mut self, size: u32) -> Self {
        self.swatch_size = size.max(1);
        self
    }

    /// The configured sampling rate.
    pub fn sampling_rate(&self) -> u32 {
        self.sampling_rate
    }

    /// The configured time bounds.
    pub fn timing(&self) -> &TimingOptions {
        &self.timing
    }

    /// The configured output size policy.
    pub fn output_size(&self) -> OutputSize {
        self.output_size
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}
