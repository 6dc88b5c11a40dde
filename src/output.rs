//! Output naming, overwrite decisions, workspaces, and image writing.
//!
//! The core pipeline never talks to a terminal. Whether an existing output
//! may be replaced is decided by an injected [`OverwritePolicy`], and any
//! scratch directory a run needs is managed by an injected
//! [`WorkspaceLifecycle`].

use std::{
    fs,
    path::{Path, PathBuf},
};

use image::{ImageFormat, RgbImage};

use crate::{color::Color, error::PaletteError};

/// Extension given to outputs named after their input.
pub const DEFAULT_OUTPUT_EXTENSION: &str = "jpg";

/// Work out where the palette image goes.
///
/// With no `output_file`, the input's file name with a `.jpg` extension is
/// used. An explicit `output_file` contributes only its file name. The name
/// is joined onto `output_dir` (the current directory when `None`), which
/// is created if missing.
///
/// # Errors
///
/// - [`PaletteError::InvalidArgument`] if no file name can be derived.
/// - [`PaletteError::WriteError`] if the output directory cannot be
///   created.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
///
/// let path = makepalette::define_output_path(Path::new("movies/film.mkv"), None, None)?;
/// assert_eq!(path, Path::new("./film.jpg"));
/// # Ok::<(), makepalette::PaletteError>(())
/// ```
pub fn define_output_path(
    input: &Path,
    output_file: Option<&Path>,
    output_dir: Option<&Path>,
) -> Result<PathBuf, PaletteError> {
    let file_name = match output_file {
        Some(output) => output.file_name().map(PathBuf::from),
        None => input
            .file_name()
            .map(|name| PathBuf::from(name).with_extension(DEFAULT_OUTPUT_EXTENSION)),
    }
    .ok_or_else(|| {
        PaletteError::invalid(format!(
            "cannot derive an output file name from {}",
            output_file.unwrap_or(input).display()
        ))
    })?;

    let directory = match output_dir {
        Some(directory) => {
            fs::create_dir_all(directory).map_err(|error| PaletteError::write(directory, error))?;
            directory.to_path_buf()
        }
        None => PathBuf::from("."),
    };

    Ok(directory.join(file_name))
}

/// Decides whether an existing output file may be replaced.
pub trait OverwritePolicy {
    /// Return `true` to replace `path`, `false` to abort the run.
    fn allow_overwrite(&self, path: &Path) -> bool;
}

/// Always replaces existing outputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overwrite;

impl OverwritePolicy for Overwrite {
    fn allow_overwrite(&self, path: &Path) -> bool {
        log::info!("Overwriting {}", path.display());
        true
    }
}

/// Never replaces existing outputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverwrite;

impl OverwritePolicy for NoOverwrite {
    fn allow_overwrite(&self, _path: &Path) -> bool {
        false
    }
}

/// Consult `policy` if `path` already exists.
///
/// # Errors
///
/// Returns [`PaletteError::OutputExists`] if the policy refuses.
pub fn check_output(path: &Path, policy: &dyn OverwritePolicy) -> Result<(), PaletteError> {
    if path.exists() && !policy.allow_overwrite(path) {
        return Err(PaletteError::OutputExists {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Scratch space acquired for the duration of one run.
///
/// [`prepare`](WorkspaceLifecycle::prepare) runs before sampling and
/// [`release`](WorkspaceLifecycle::release) runs on every exit path after
/// it, including errors and cancellation.
pub trait WorkspaceLifecycle {
    /// Acquire the workspace.
    ///
    /// # Errors
    ///
    /// Implementation-specific; the run aborts before sampling.
    fn prepare(&mut self) -> Result<(), PaletteError>;

    /// Directory that receives one swatch image per sampled frame, if any.
    fn swatch_directory(&self) -> Option<&Path> {
        None
    }

    /// Give the workspace back. Failures are logged, not returned.
    fn release(&mut self);
}

/// No scratch space at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWorkspace;

impl WorkspaceLifecycle for NoWorkspace {
    fn prepare(&mut self) -> Result<(), PaletteError> {
        Ok(())
    }

    fn release(&mut self) {}
}

/// A directory that collects one solid swatch image per sampled frame.
///
/// The directory is created on prepare and removed on release unless
/// [`keep`](SwatchDirectory::keep) was requested. A directory that already
/// existed before the run is never removed.
#[derive(Debug, Clone)]
pub struct SwatchDirectory {
    path: PathBuf,
    keep: bool,
    created: bool,
}

impl SwatchDirectory {
    /// Collect swatches under `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            keep: false,
            created: false,
        }
    }

    /// Leave the swatches on disk after the run.
    #[must_use]
    pub fn keep(mut self, keep: bool) -> Self {
        self.keep = keep;
        self
    }

    /// The swatch directory.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WorkspaceLifecycle for SwatchDirectory {
    fn prepare(&mut self) -> Result<(), PaletteError> {
        if !self.path.exists() {
            fs::create_dir_all(&self.path).map_err(|error| PaletteError::write(&self.path, error))?;
            self.created = true;
        }
        log::debug!("Writing swatches to {}", self.path.display());
        Ok(())
    }

    fn swatch_directory(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn release(&mut self) {
        if self.keep || !self.created {
            return;
        }
        if let Err(error) = fs::remove_dir_all(&self.path) {
            log::warn!(
                "Failed to remove swatch directory {}: {error}",
                self.path.display()
            );
        }
        self.created = false;
    }
}

/// File name of the swatch for the `index`-th sample.
pub fn swatch_file_name(index: usize) -> String {
    format!("swatch_{index:06}.png")
}

/// Write one swatch image into `directory`.
///
/// # Errors
///
/// Returns [`PaletteError::WriteError`] if the image cannot be saved.
pub fn write_swatch(
    directory: &Path,
    index: usize,
    color: Color,
    size: u32,
) -> Result<PathBuf, PaletteError> {
    let path = directory.join(swatch_file_name(index));
    color
        .swatch(size, size)
        .save(&path)
        .map_err(|error| PaletteError::write(&path, error))?;
    Ok(path)
}

/// Claim `path` with a 1×1 black image in the format its extension names.
///
/// Run before any decoding so that a missing directory, a permission
/// problem, or an unknown extension fails fast.
///
/// # Errors
///
/// Returns [`PaletteError::WriteError`] with the underlying cause.
pub fn write_placeholder(path: &Path) -> Result<(), PaletteError> {
    let format = output_format(path)?;
    RgbImage::new(1, 1)
        .save_with_format(path, format)
        .map_err(|error| PaletteError::write(path, error))
}

/// Write the finished canvas over the placeholder.
///
/// # Errors
///
/// Returns [`PaletteError::WriteError`] with the underlying cause. The
/// placeholder is left in place on failure.
pub fn write_palette(canvas: &RgbImage, path: &Path) -> Result<(), PaletteError> {
    let format = output_format(path)?;
    canvas
        .save_with_format(path, format)
        .map_err(|error| PaletteError::write(path, error))?;
    log::info!(
        "Wrote {}x{} palette to {}",
        canvas.width(),
        canvas.height(),
        path.display()
    );
    Ok(())
}

fn output_format(path: &Path) -> Result<ImageFormat, PaletteError> {
    ImageFormat::from_path(path).map_err(|error| PaletteError::write(path, error))
}
