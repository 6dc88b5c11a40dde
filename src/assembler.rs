//! Palette assembly.
//!
//! Lays an ordered run of colors out as vertical stripes across a fixed
//! canvas. Stripe `i` of `n` covers columns
//! `floor(i * width / n)..floor((i + 1) * width / n)`, so the stripes
//! tile the canvas exactly and any remainder columns are spread by the
//! floor itself.
//!
//! Some older renderers laid out fixed `ceil(width / n)`-wide swatches
//! instead, which can run past the right edge on the last stripe. Only the
//! floor partition is implemented here.

use std::ops::Range;

use image::RgbImage;

use crate::{color::Color, configuration::Resolution, error::PaletteError};

/// Columns covered by stripe `index` out of `count` on a canvas `width`
/// pixels wide.
///
/// When `count > width` some stripes are empty.
///
/// # Errors
///
/// Returns [`PaletteError::EmptyPalette`] if `count` is zero.
///
/// # Example
///
/// ```
/// use makepalette::stripe_bounds;
///
/// assert_eq!(stripe_bounds(0, 3, 10)?, 0..3);
/// assert_eq!(stripe_bounds(1, 3, 10)?, 3..6);
/// assert_eq!(stripe_bounds(2, 3, 10)?, 6..10);
/// # Ok::<(), makepalette::PaletteError>(())
/// ```
pub fn stripe_bounds(index: usize, count: usize, width: u32) -> Result<Range<u32>, PaletteError> {
    if count == 0 {
        return Err(PaletteError::EmptyPalette);
    }
    let width = u64::from(width);
    let count = count as u64;
    let index = index as u64;
    let start = index * width / count;
    let end = (index + 1) * width / count;
    Ok(start as u32..end as u32)
}

/// Column ranges for every stripe, left to right.
///
/// # Errors
///
/// Returns [`PaletteError::EmptyPalette`] if `count` is zero.
pub fn stripe_layout(count: usize, width: u32) -> Result<Vec<Range<u32>>, PaletteError> {
    if count == 0 {
        return Err(PaletteError::EmptyPalette);
    }
    (0..count)
        .map(|index| stripe_bounds(index, count, width))
        .collect()
}

/// Paint `colors` as vertical stripes on a fresh canvas.
///
/// The first row is filled stripe by stripe, then replicated down the
/// canvas.
///
/// # Errors
///
/// - [`PaletteError::EmptyPalette`] if `colors` is empty.
/// - [`PaletteError::InvalidArgument`] if either canvas dimension is zero.
///
/// # Example
///
/// ```
/// use makepalette::{Color, Resolution, assemble_colors};
///
/// let colors = [Color::new(255, 0, 0), Color::new(0, 0, 255)];
/// let canvas = assemble_colors(&colors, Resolution::new(4, 2))?;
/// assert_eq!(canvas.get_pixel(1, 1).0, [255, 0, 0]);
/// assert_eq!(canvas.get_pixel(2, 0).0, [0, 0, 255]);
/// # Ok::<(), makepalette::PaletteError>(())
/// ```
pub fn assemble_colors(colors: &[Color], resolution: Resolution) -> Result<RgbImage, PaletteError> {
    if colors.is_empty() {
        return Err(PaletteError::EmptyPalette);
    }
    let Resolution { width, height } = resolution;
    if width == 0 || height == 0 {
        return Err(PaletteError::invalid(format!(
            "canvas must be at least 1x1, got {resolution}"
        )));
    }

    log::debug!(
        "Assembling {} stripes on a {resolution} canvas",
        colors.len()
    );

    let row_length = width as usize * 3;
    let mut row = vec![0_u8; row_length];
    for (index, color) in colors.iter().enumerate() {
        let stripe = stripe_bounds(index, colors.len(), width)?;
        let channels = color.channels();
        for column in stripe {
            let offset = column as usize * 3;
            row[offset..offset + 3].copy_from_slice(&channels);
        }
    }

    let mut buffer = Vec::with_capacity(row_length * height as usize);
    for _ in 0..height {
        buffer.extend_from_slice(&row);
    }

    RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
        PaletteError::invalid(format!("canvas buffer does not match {resolution}"))
    })
}
