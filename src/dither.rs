//! Contains the ordered (Bayer) dither implementation.
//!
//! Every pixel is compared against a threshold taken from [`THRESHOLD_MATRIX`],
//! tiled over the image by `(y % 8, x % 8)`. Unlike error diffusion, the decision for a pixel
//! depends only on its own intensity and position, so identical inputs always produce
//! identical patterns and rows can be processed independently.
//!
//! The thresholding produces a binary "on"/"off" decision which is then turned into a pixel
//! by a [`Paint`] policy:
//! - [`Monochrome`] paints white on black as a [`GrayImage`].
//! - [`InkOnPaper`] paints a single ink color on black as an [`RgbImage`].

use image::{GrayImage, ImageBuffer, Luma, Pixel, Rgb, RgbImage};
use palette::Srgb;
#[cfg(feature = "threads")]
use rayon::prelude::*;

/// The side length of [`THRESHOLD_MATRIX`].
pub const MATRIX_SIZE: usize = 8;

/// The number of distinct threshold levels in [`THRESHOLD_MATRIX`].
pub const LEVELS: u8 = 64;

/// The 8x8 Bayer index matrix.
///
/// Each level in `0..64` appears exactly once.
/// The threshold for a cell is `level / 64`, so all thresholds lie in `[0, 1)`.
pub const THRESHOLD_MATRIX: [[u8; MATRIX_SIZE]; MATRIX_SIZE] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21],
];

/// Returns the matrix threshold in `[0, 1)` for the pixel at `(x, y)`.
#[must_use]
#[inline]
pub fn threshold(x: u32, y: u32) -> f32 {
    let level = THRESHOLD_MATRIX[y as usize % MATRIX_SIZE][x as usize % MATRIX_SIZE];
    f32::from(level) / f32::from(LEVELS)
}

/// ITU-R 601-2 luma of an 8-bit sRGB color, rounded to the nearest integer.
#[must_use]
#[inline]
pub fn luma([r, g, b]: [u8; 3]) -> u8 {
    let l = 19595 * u32::from(r) + 38470 * u32::from(g) + 7471 * u32::from(b) + 0x8000;
    #[allow(clippy::cast_possible_truncation)]
    {
        // the weights sum to 65536, so the result is <= 255
        (l >> 16) as u8
    }
}

/// Returns the 8-bit intensity of a pixel given its channels.
#[inline]
fn intensity(channels: &[u8]) -> u8 {
    match channels {
        [l] | [l, _] => *l,
        [r, g, b, ..] => luma([*r, *g, *b]),
        [] => 0,
    }
}

/// A policy for turning the binary decision of the ditherer into an output pixel.
pub trait Paint {
    /// The output pixel type.
    type Pixel: Pixel<Subpixel = u8>;

    /// Returns the pixel for an "on" (`true`) or "off" (`false`) decision.
    fn paint(&self, on: bool) -> Self::Pixel;
}

/// Paints "on" pixels white and "off" pixels black.
#[derive(Debug, Clone, Copy, Default)]
pub struct Monochrome;

impl Paint for Monochrome {
    type Pixel = Luma<u8>;

    #[inline]
    fn paint(&self, on: bool) -> Self::Pixel {
        Luma([if on { u8::MAX } else { 0 }])
    }
}

/// Paints "on" pixels with an ink color and leaves "off" pixels as black paper.
#[derive(Debug, Clone, Copy)]
pub struct InkOnPaper {
    /// The ink color.
    pub ink: Srgb<u8>,
}

impl InkOnPaper {
    /// Creates a new [`InkOnPaper`] with the given ink color.
    #[must_use]
    pub const fn new(ink: Srgb<u8>) -> Self {
        Self { ink }
    }
}

impl Paint for InkOnPaper {
    type Pixel = Rgb<u8>;

    #[inline]
    fn paint(&self, on: bool) -> Self::Pixel {
        if on {
            Rgb([self.ink.red, self.ink.green, self.ink.blue])
        } else {
            Rgb([0; 3])
        }
    }
}

/// Ordered dithering against [`THRESHOLD_MATRIX`].
///
/// The inner value is the base threshold, where `0.5` is mid-gray.
/// A pixel is "on" if its normalized intensity is greater than
/// `base - 0.5 + threshold(x, y)`.
#[derive(Debug, Clone, Copy)]
pub struct OrderedDither(f32);

impl OrderedDither {
    /// The default base threshold (mid-gray).
    pub const DEFAULT_BASE_THRESHOLD: f32 = 0.5;

    /// Creates a new [`OrderedDither`] with the default base threshold.
    #[must_use]
    pub const fn new() -> Self {
        Self(Self::DEFAULT_BASE_THRESHOLD)
    }

    /// Creates a new [`OrderedDither`] with the given base threshold.
    ///
    /// Lower values turn on more pixels, higher values fewer.
    ///
    /// This will return `None` if `base` is not in the range `0.0..=1.0`.
    #[must_use]
    pub fn with_base_threshold(base: f32) -> Option<Self> {
        if (0.0..=1.0).contains(&base) {
            Some(Self(base))
        } else {
            None
        }
    }

    /// Gets the base threshold for this [`OrderedDither`].
    #[must_use]
    pub const fn base_threshold(&self) -> f32 {
        self.0
    }

    /// Returns whether a pixel with the given normalized `intensity` at `(x, y)` is "on".
    #[must_use]
    #[inline]
    pub fn is_on(&self, intensity: f32, x: u32, y: u32) -> bool {
        intensity > self.0 - 0.5 + threshold(x, y)
    }

    /// Dithers a single row of raw input channels into raw output channels.
    #[inline]
    fn dither_row<Input, P>(&self, y: u32, input: &[u8], output: &mut [u8], paint: &P)
    where
        Input: Pixel<Subpixel = u8>,
        P: Paint,
    {
        let in_channels = usize::from(Input::CHANNEL_COUNT);
        let out_channels = usize::from(P::Pixel::CHANNEL_COUNT);

        for (x, (src, dst)) in input
            .chunks_exact(in_channels)
            .zip(output.chunks_exact_mut(out_channels))
            .enumerate()
        {
            let value = f32::from(intensity(src)) / f32::from(u8::MAX);
            #[allow(clippy::cast_possible_truncation)]
            let on = self.is_on(value, x as u32, y);
            dst.copy_from_slice(paint.paint(on).channels());
        }
    }

    /// Dithers `image`, painting each decision with `paint`.
    ///
    /// Color inputs are converted to intensity using ITU-R 601-2 luma
    /// and single channel inputs are used as is.
    #[must_use]
    pub fn dither<Input, P>(
        &self,
        image: &ImageBuffer<Input, Vec<u8>>,
        paint: &P,
    ) -> ImageBuffer<P::Pixel, Vec<u8>>
    where
        Input: Pixel<Subpixel = u8>,
        P: Paint,
    {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return ImageBuffer::new(width, height);
        }

        let in_row = width as usize * usize::from(Input::CHANNEL_COUNT);
        let out_row = width as usize * usize::from(P::Pixel::CHANNEL_COUNT);
        let mut buf = vec![0; out_row * height as usize];

        for (y, (input, output)) in image
            .as_raw()
            .chunks_exact(in_row)
            .zip(buf.chunks_exact_mut(out_row))
            .enumerate()
        {
            #[allow(clippy::cast_possible_truncation)]
            self.dither_row::<Input, P>(y as u32, input, output, paint);
        }

        #[allow(clippy::expect_used)]
        {
            // buf has exactly width * height pixels by construction
            ImageBuffer::from_raw(width, height, buf).expect("large enough buffer")
        }
    }

    /// Dithers `image` to a black and white [`GrayImage`].
    #[must_use]
    pub fn monochrome<Input>(&self, image: &ImageBuffer<Input, Vec<u8>>) -> GrayImage
    where
        Input: Pixel<Subpixel = u8>,
    {
        self.dither(image, &Monochrome)
    }

    /// Dithers `image` to an [`RgbImage`] containing only black and `ink`.
    #[must_use]
    pub fn ink_on_paper<Input>(&self, image: &ImageBuffer<Input, Vec<u8>>, ink: Srgb<u8>) -> RgbImage
    where
        Input: Pixel<Subpixel = u8>,
    {
        self.dither(image, &InkOnPaper::new(ink))
    }
}

#[cfg(feature = "threads")]
impl OrderedDither {
    /// Dithers `image` in parallel, painting each decision with `paint`.
    ///
    /// The output is identical to [`OrderedDither::dither`].
    #[must_use]
    pub fn dither_par<Input, P>(
        &self,
        image: &ImageBuffer<Input, Vec<u8>>,
        paint: &P,
    ) -> ImageBuffer<P::Pixel, Vec<u8>>
    where
        Input: Pixel<Subpixel = u8> + Sync,
        P: Paint + Sync,
    {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return ImageBuffer::new(width, height);
        }

        let in_row = width as usize * usize::from(Input::CHANNEL_COUNT);
        let out_row = width as usize * usize::from(P::Pixel::CHANNEL_COUNT);
        let mut buf = vec![0; out_row * height as usize];

        image
            .as_raw()
            .par_chunks_exact(in_row)
            .zip(buf.par_chunks_exact_mut(out_row))
            .enumerate()
            .for_each(|(y, (input, output))| {
                #[allow(clippy::cast_possible_truncation)]
                self.dither_row::<Input, P>(y as u32, input, output, paint);
            });

        #[allow(clippy::expect_used)]
        {
            // buf has exactly width * height pixels by construction
            ImageBuffer::from_raw(width, height, buf).expect("large enough buffer")
        }
    }

    /// Dithers `image` to a black and white [`GrayImage`] in parallel.
    #[must_use]
    pub fn monochrome_par<Input>(&self, image: &ImageBuffer<Input, Vec<u8>>) -> GrayImage
    where
        Input: Pixel<Subpixel = u8> + Sync,
    {
        self.dither_par(image, &Monochrome)
    }

    /// Dithers `image` to an [`RgbImage`] containing only black and `ink` in parallel.
    #[must_use]
    pub fn ink_on_paper_par<Input>(
        &self,
        image: &ImageBuffer<Input, Vec<u8>>,
        ink: Srgb<u8>,
    ) -> RgbImage
    where
        Input: Pixel<Subpixel = u8> + Sync,
    {
        self.dither_par(image, &InkOnPaper::new(ink))
    }
}

impl Default for OrderedDither {
    fn default() -> Self {
        Self::new()
    }
}

/// Dithers `image` to black and white with the default base threshold.
#[must_use]
pub fn monochrome_dither(image: &RgbImage) -> GrayImage {
    OrderedDither::new().monochrome(image)
}

/// Dithers `image` to black paper and `ink` with the default base threshold.
#[must_use]
pub fn ink_on_paper_dither(image: &RgbImage, ink: Srgb<u8>) -> RgbImage {
    OrderedDither::new().ink_on_paper(image, ink)
}
