//! Color count reduction for modes without dithering.
//!
//! The palette is computed by Wu's quantizer (see the [`wu`](crate::wu) module) and every pixel is
//! then replaced by its nearest palette color under squared euclidean distance in sRGB.

use crate::{wu, ColorBudget, PaletteSize, Result};
use image::RgbImage;
use palette::{
    cast::{self, ComponentsAs, IntoComponents},
    Srgb,
};
#[cfg(feature = "threads")]
use rayon::prelude::*;

/// Views the pixels of `image` as a slice of colors.
fn colors(image: &RgbImage) -> &[Srgb<u8>] {
    let pixels = image.width() as usize * image.height() as usize;
    image.as_raw()[..(pixels * 3)].components_as()
}

/// Squared euclidean distance between two colors.
#[inline]
fn squared_distance(x: [u8; 3], y: [u8; 3]) -> u32 {
    x.into_iter()
        .zip(y)
        .map(|(a, b)| {
            let d = u32::from(a.abs_diff(b));
            d * d
        })
        .sum()
}

/// Returns the color in `palette` nearest to `color`, preferring earlier entries on ties.
#[inline]
fn nearest(palette: &[Srgb<u8>], color: Srgb<u8>) -> Srgb<u8> {
    let color = cast::into_array(color);
    palette
        .iter()
        .copied()
        .min_by_key(|&p| squared_distance(cast::into_array(p), color))
        .unwrap_or(Srgb::new(0, 0, 0))
}

/// Replaces each pixel of `image` with its nearest color in `palette`.
///
/// The output uses only colors from `palette`. An empty palette maps everything to black.
#[must_use]
pub fn remap(image: &RgbImage, palette: &[Srgb<u8>]) -> RgbImage {
    let (width, height) = image.dimensions();
    let buf = colors(image)
        .iter()
        .map(|&color| nearest(palette, color))
        .collect::<Vec<_>>()
        .into_components();

    #[allow(clippy::expect_used)]
    {
        // one output color per input pixel, so buf is exactly large enough
        RgbImage::from_vec(width, height, buf).expect("large enough buffer")
    }
}

/// Reduces `image` to at most `palette_size` distinct colors.
#[must_use]
pub fn quantize_with(image: &RgbImage, palette_size: PaletteSize) -> RgbImage {
    let palette = wu::palette(colors(image), palette_size).palette;
    remap(image, &palette)
}

/// Reduces `image` to at most `colors` distinct colors.
///
/// # Errors
/// Returns [`Error::InvalidColorBudget`](crate::Error::InvalidColorBudget)
/// if `colors` is not in the range `2..=256`.
pub fn quantize(image: &RgbImage, colors: u16) -> Result<RgbImage> {
    Ok(quantize_with(image, colors.try_into()?))
}

/// Applies a mode's [`ColorBudget`] to `image`.
///
/// An [`Unconstrained`](ColorBudget::Unconstrained) budget returns an unchanged copy of `image`
/// without running the quantizer.
///
/// # Errors
/// Returns [`Error::InvalidColorBudget`](crate::Error::InvalidColorBudget)
/// if a limited budget is not in the range `2..=256`.
pub fn quantize_budget(image: &RgbImage, budget: ColorBudget) -> Result<RgbImage> {
    match budget {
        ColorBudget::Limited(k) => quantize(image, k),
        ColorBudget::Unconstrained => Ok(image.clone()),
    }
}

/// Replaces each pixel of `image` with its nearest color in `palette` in parallel.
#[cfg(feature = "threads")]
#[must_use]
pub fn remap_par(image: &RgbImage, palette: &[Srgb<u8>]) -> RgbImage {
    let (width, height) = image.dimensions();
    let buf = colors(image)
        .par_iter()
        .map(|&color| nearest(palette, color))
        .collect::<Vec<_>>()
        .into_components();

    #[allow(clippy::expect_used)]
    {
        // one output color per input pixel, so buf is exactly large enough
        RgbImage::from_vec(width, height, buf).expect("large enough buffer")
    }
}

/// Reduces `image` to at most `palette_size` distinct colors in parallel.
#[cfg(feature = "threads")]
#[must_use]
pub fn quantize_with_par(image: &RgbImage, palette_size: PaletteSize) -> RgbImage {
    let palette = wu::palette_par(colors(image), palette_size).palette;
    remap_par(image, &palette)
}

/// Reduces `image` to at most `colors` distinct colors in parallel.
///
/// # Errors
/// Returns [`Error::InvalidColorBudget`](crate::Error::InvalidColorBudget)
/// if `colors` is not in the range `2..=256`.
#[cfg(feature = "threads")]
pub fn quantize_par(image: &RgbImage, colors: u16) -> Result<RgbImage> {
    Ok(quantize_with_par(image, colors.try_into()?))
}
