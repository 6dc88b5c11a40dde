//! Color reduction.
//!
//! Every sampled frame collapses to one [`Color`]: the per-channel
//! arithmetic mean of all its pixels, truncated to 8 bits.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::Path,
};

use image::{DynamicImage, Rgb, RgbImage};

use crate::error::PaletteError;

/// An 8-bit RGB color with no alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    /// Red channel.
    pub red: u8,
    /// Green channel.
    pub green: u8,
    /// Blue channel.
    pub blue: u8,
}

impl Color {
    /// Build a color from its channels.
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// The channels as an `[r, g, b]` array.
    pub const fn channels(self) -> [u8; 3] {
        [self.red, self.green, self.blue]
    }

    /// A solid `width × height` image of this color.
    pub fn swatch(self, width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb(self.channels()))
    }
}

impl From<Rgb<u8>> for Color {
    fn from(pixel: Rgb<u8>) -> Self {
        let [red, green, blue] = pixel.0;
        Self { red, green, blue }
    }
}

impl From<Color> for Rgb<u8> {
    fn from(color: Color) -> Self {
        Rgb(color.channels())
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

/// Average an RGB frame down to a single color.
///
/// Channel sums are accumulated in `u64` and divided by the pixel count
/// with integer division, so fractional means are truncated, never rounded.
///
/// # Errors
///
/// Returns [`PaletteError::DecodeError`] for a zero-pixel frame; `frame`
/// is the index reported in that error.
pub fn average_color(image: &RgbImage, frame: u64) -> Result<Color, PaletteError> {
    let pixel_count = u64::from(image.width()) * u64::from(image.height());
    if pixel_count == 0 {
        return Err(PaletteError::decode(frame, "frame has no pixels"));
    }

    let mut sums = [0_u64; 3];
    for pixel in image.as_raw().chunks_exact(3) {
        sums[0] += u64::from(pixel[0]);
        sums[1] += u64::from(pixel[1]);
        sums[2] += u64::from(pixel[2]);
    }

    Ok(Color::new(
        (sums[0] / pixel_count) as u8,
        (sums[1] / pixel_count) as u8,
        (sums[2] / pixel_count) as u8,
    ))
}

/// Average any decoded image, converting it to RGB8 first.
///
/// Alpha and extra precision are dropped by the conversion.
///
/// # Errors
///
/// Same as [`average_color`].
pub fn reduce_image(image: &DynamicImage, frame: u64) -> Result<Color, PaletteError> {
    match image {
        DynamicImage::ImageRgb8(rgb) => average_color(rgb, frame),
        other => average_color(&other.to_rgb8(), frame),
    }
}

/// Load a still image from disk and average it.
///
/// # Errors
///
/// Returns [`PaletteError::DecodeError`] if the file cannot be read or
/// decoded, or if it has no pixels.
pub fn reduce_image_file<P: AsRef<Path>>(path: P, frame: u64) -> Result<Color, PaletteError> {
    let path = path.as_ref();
    let image = image::open(path)
        .map_err(|error| PaletteError::decode(frame, format!("{}: {error}", path.display())))?;
    reduce_image(&image, frame)
}
