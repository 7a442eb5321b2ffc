//! Contains the [`ModePipeline`] which renders a source image into a single mode.

use crate::{
    dither::OrderedDither,
    quantize::quantize_budget,
    resize::resize,
    DitherStrategy, ModeDescriptor, Result,
};
use image::{DynamicImage, GrayImage, RgbImage};

/// Expands a black and white image to an [`RgbImage`].
fn gray_to_rgb(image: GrayImage) -> RgbImage {
    DynamicImage::ImageLuma8(image).into_rgb8()
}

/// Renders images into a [`ModeDescriptor`]'s resolution and colors.
///
/// The steps are always, in order:
/// 1. resize to the mode's dimensions with nearest neighbor sampling,
/// 2. dither or quantize according to the mode's [`DitherStrategy`] and [`ColorBudget`](crate::ColorBudget),
/// 3. normalize the result to an [`RgbImage`].
///
/// The threshold matrix is tiled in output pixel space.
///
/// # Examples
/// ```
/// # use retromodes::{describe, ModePipeline};
/// # use image::{Rgb, RgbImage};
/// # fn main() -> Result<(), retromodes::Error> {
/// let source = RgbImage::from_pixel(512, 384, Rgb([255, 255, 255]));
/// let mode = describe("1bit")?;
///
/// let image = ModePipeline::new().render(&source, mode)?;
/// assert_eq!(image.dimensions(), (256, 192));
/// # Ok(())
/// # }
/// ```
#[must_use]
#[derive(Debug, Clone, Copy, Default)]
pub struct ModePipeline {
    /// The ditherer used for the ordered strategies.
    ditherer: OrderedDither,
}

impl ModePipeline {
    /// Creates a new [`ModePipeline`] with default options.
    pub const fn new() -> Self {
        Self { ditherer: OrderedDither::new() }
    }

    /// Sets the base threshold for the ordered dither strategies.
    ///
    /// The given `base` should be in the range `0.0..=1.0`,
    /// otherwise the default base threshold will be used as a fallback.
    ///
    /// The default value is [`OrderedDither::DEFAULT_BASE_THRESHOLD`].
    pub fn base_threshold(&mut self, base: f32) -> &mut Self {
        self.ditherer = OrderedDither::with_base_threshold(base).unwrap_or_default();
        self
    }

    /// Gets the ditherer used by this pipeline.
    pub const fn ditherer(&self) -> OrderedDither {
        self.ditherer
    }

    /// Renders `source` into `mode`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidDimensions`](crate::Error::InvalidDimensions) if the mode or
    /// the source has a zero dimension, and
    /// [`Error::InvalidColorBudget`](crate::Error::InvalidColorBudget)
    /// if the mode has an unsupported color budget.
    pub fn render(&self, source: &RgbImage, mode: &ModeDescriptor) -> Result<RgbImage> {
        let resized = resize(source, mode.width, mode.height)?;

        tracing::debug!(mode = mode.id, strategy = %mode.dither, colors = %mode.colors, "rendering");

        let image = match mode.dither {
            DitherStrategy::None => quantize_budget(&resized, mode.colors)?,
            DitherStrategy::Monochrome => gray_to_rgb(self.ditherer.monochrome(&resized)),
            DitherStrategy::InkOnPaper { ink } => self.ditherer.ink_on_paper(&resized, ink),
        };

        Ok(image)
    }
}

#[cfg(feature = "threads")]
impl ModePipeline {
    /// Renders `source` into `mode` in parallel.
    ///
    /// The result is identical to [`ModePipeline::render`].
    ///
    /// # Errors
    /// See [`ModePipeline::render`].
    pub fn render_par(&self, source: &RgbImage, mode: &ModeDescriptor) -> Result<RgbImage> {
        use crate::{quantize::quantize_par, ColorBudget};

        let resized = resize(source, mode.width, mode.height)?;

        tracing::debug!(mode = mode.id, strategy = %mode.dither, colors = %mode.colors, "rendering");

        let image = match (mode.dither, mode.colors) {
            (DitherStrategy::None, ColorBudget::Limited(k)) => quantize_par(&resized, k)?,
            (DitherStrategy::None, ColorBudget::Unconstrained) => resized,
            (DitherStrategy::Monochrome, _) => gray_to_rgb(self.ditherer.monochrome_par(&resized)),
            (DitherStrategy::InkOnPaper { ink }, _) => self.ditherer.ink_on_paper_par(&resized, ink),
        };

        Ok(image)
    }
}

/// Renders `source` into `mode` with the default [`ModePipeline`].
///
/// # Errors
/// See [`ModePipeline::render`].
pub fn render(source: &RgbImage, mode: &ModeDescriptor) -> Result<RgbImage> {
    ModePipeline::new().render(source, mode)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{describe, tests::*, ColorBudget, Error, DEFAULT_INK};
    use image::Rgb;
    use palette::Srgb;
    use std::collections::HashSet;

    fn custom_mode(width: u32, height: u32, colors: ColorBudget, dither: DitherStrategy) -> ModeDescriptor {
        ModeDescriptor { id: "custom", width, height, colors, dither }
    }

    #[test]
    fn solid_white_monochrome_is_white() {
        let source = RgbImage::from_pixel(512, 384, Rgb([255; 3]));
        let mode = custom_mode(64, 48, ColorBudget::Limited(2), DitherStrategy::Monochrome);
        let output = render(&source, &mode).unwrap();
        assert_eq!(output.dimensions(), (64, 48));
        assert!(output.pixels().all(|p| p.0 == [255; 3]));
    }

    #[test]
    fn solid_black_monochrome_is_black() {
        let source = RgbImage::from_pixel(512, 384, Rgb([0; 3]));
        let mode = custom_mode(64, 48, ColorBudget::Limited(2), DitherStrategy::Monochrome);
        let output = render(&source, &mode).unwrap();
        assert_eq!(output.dimensions(), (64, 48));
        assert!(output.pixels().all(|p| p.0 == [0; 3]));
    }

    #[test]
    fn ink_on_paper_same_size() {
        let source = noise_image(256, 192);
        let mode = custom_mode(
            256,
            192,
            ColorBudget::Limited(2),
            DitherStrategy::InkOnPaper { ink: Srgb::new(0, 215, 215) },
        );
        let output = render(&source, &mode).unwrap();
        assert_eq!(output.dimensions(), (256, 192));

        let allowed = [vec![0, 0, 0], vec![0, 215, 215]].into_iter().collect::<HashSet<_>>();
        assert!(distinct_colors(&output).is_subset(&allowed));
    }

    #[test]
    fn monochrome_output_is_black_and_white_rgb() {
        let output = render(&noise_image(300, 200), describe("1bit").unwrap()).unwrap();
        assert_eq!(output.dimensions(), (256, 192));

        let allowed = [vec![0; 3], vec![255; 3]].into_iter().collect::<HashSet<_>>();
        assert_eq!(distinct_colors(&output), allowed);
    }

    #[test]
    fn dither_happens_after_resize() {
        // a uniform gray tile pattern in output space, regardless of the source size
        let source = RgbImage::from_pixel(1000, 1000, Rgb([90; 3]));
        let mode = custom_mode(16, 16, ColorBudget::Limited(2), DitherStrategy::Monochrome);
        let output = render(&source, &mode).unwrap();
        for (x, y, pixel) in output.enumerate_pixels() {
            assert_eq!(pixel, output.get_pixel(x % 8, y % 8));
        }
    }

    #[test]
    fn quantized_mode() {
        let output = render(&noise_image(320, 240), describe("8bit-cpc").unwrap()).unwrap();
        assert_eq!(output.dimensions(), (160, 200));
        assert!(distinct_colors(&output).len() <= 16);
    }

    #[test]
    fn two_color_quantized_mode() {
        let mode = custom_mode(32, 8, ColorBudget::Limited(2), DitherStrategy::None);
        let output = render(&gradient_image(64, 16), &mode).unwrap();
        assert_eq!(distinct_colors(&output).len(), 2);
    }

    #[test]
    fn full_color_mode_is_resize_only() {
        let source = noise_image(160, 100);
        let mode = describe("8bit-plus").unwrap();
        let output = render(&source, mode).unwrap();
        assert_eq!(output, resize(&source, 320, 200).unwrap());
    }

    #[test]
    fn upscaling_is_allowed() {
        let source = noise_image(10, 10);
        let output = render(&source, describe("16bit").unwrap()).unwrap();
        assert_eq!(output.dimensions(), (320, 224));
    }

    #[test]
    fn invalid_modes() {
        let source = noise_image(10, 10);

        let mode = custom_mode(0, 10, ColorBudget::Unconstrained, DitherStrategy::None);
        assert!(matches!(render(&source, &mode), Err(Error::InvalidDimensions { .. })));

        let mode = custom_mode(10, 10, ColorBudget::Limited(1), DitherStrategy::None);
        assert!(matches!(render(&source, &mode), Err(Error::InvalidColorBudget(1))));
    }

    #[test]
    fn base_threshold_option() {
        let mut pipeline = ModePipeline::new();
        pipeline.base_threshold(0.25);
        assert!((pipeline.ditherer().base_threshold() - 0.25).abs() < f32::EPSILON);

        pipeline.base_threshold(4.0);
        assert!(
            (pipeline.ditherer().base_threshold() - OrderedDither::DEFAULT_BASE_THRESHOLD).abs()
                < f32::EPSILON
        );

        // a lower base threshold turns more pixels on
        let source = RgbImage::from_pixel(8, 8, Rgb([128; 3]));
        let mode = custom_mode(8, 8, ColorBudget::Limited(2), DitherStrategy::InkOnPaper { ink: DEFAULT_INK });
        let on = |pipeline: &ModePipeline| {
            pipeline
                .render(&source, &mode)
                .unwrap()
                .pixels()
                .filter(|p| p.0 != [0; 3])
                .count()
        };
        assert!(on(ModePipeline::new().base_threshold(0.25)) > on(&ModePipeline::new()));
    }

    #[test]
    #[cfg(feature = "threads")]
    fn single_and_multi_threaded_match() {
        let source = noise_image(200, 150);
        let pipeline = ModePipeline::new();
        for mode in crate::all_modes() {
            assert_eq!(
                pipeline.render(&source, mode).unwrap(),
                pipeline.render_par(&source, mode).unwrap(),
                "mode {}",
                mode.id
            );
        }
    }
}
