//! Nearest neighbor resizing.
//!
//! No interpolation is performed, so the hard edges of pixel art survive any scale factor.

use crate::{Error, Result};
use image::{ImageBuffer, Pixel};

/// Returns the source coordinate sampled for the output coordinate `i`.
#[inline]
#[allow(clippy::cast_possible_truncation)]
fn source_index(i: u32, source_len: u32, target_len: u32) -> u32 {
    // i < target_len, so the quotient is < source_len
    (u64::from(i) * u64::from(source_len) / u64::from(target_len)) as u32
}

/// Resizes `image` to exactly `width` x `height` pixels using nearest neighbor sampling.
///
/// The output pixel at `(x, y)` is the input pixel at
/// `(floor(x * in_width / width), floor(y * in_height / height))`.
/// Upscaling is allowed and duplicates source pixels.
///
/// # Errors
/// Returns [`Error::InvalidDimensions`] if `width` or `height` is zero,
/// or if `image` itself has no pixels to sample.
pub fn resize<P>(
    image: &ImageBuffer<P, Vec<P::Subpixel>>,
    width: u32,
    height: u32,
) -> Result<ImageBuffer<P, Vec<P::Subpixel>>>
where
    P: Pixel,
{
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimensions { width, height });
    }

    let (in_width, in_height) = image.dimensions();
    if in_width == 0 || in_height == 0 {
        return Err(Error::InvalidDimensions { width: in_width, height: in_height });
    }

    if (in_width, in_height) == (width, height) {
        return Ok(image.clone());
    }

    let columns = (0..width)
        .map(|x| source_index(x, in_width, width))
        .collect::<Vec<_>>();

    Ok(ImageBuffer::from_fn(width, height, |x, y| {
        let sy = source_index(y, in_height, height);
        *image.get_pixel(columns[x as usize], sy)
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tests::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    #[test]
    fn same_size_is_identity() {
        let image = noise_image(37, 23);
        let resized = resize(&image, 37, 23).unwrap();
        assert_eq!(image, resized);
    }

    #[test]
    fn downscale_samples_floor() {
        // each pixel encodes its own coordinates
        let image = RgbImage::from_fn(8, 6, |x, y| Rgb([x as u8, y as u8, 0]));
        let resized = resize(&image, 3, 4).unwrap();
        assert_eq!(resized.dimensions(), (3, 4));

        for (x, y, pixel) in resized.enumerate_pixels() {
            let expected = [(x * 8 / 3) as u8, (y * 6 / 4) as u8, 0];
            assert_eq!(pixel.0, expected, "at ({x}, {y})");
        }
    }

    #[test]
    fn upscale_duplicates_pixels() {
        let image = GrayImage::from_raw(2, 1, vec![10, 200]).unwrap();
        let resized = resize(&image, 6, 2).unwrap();
        assert_eq!(resized.as_raw(), &[10, 10, 10, 200, 200, 200, 10, 10, 10, 200, 200, 200]);
    }

    #[test]
    fn no_new_colors() {
        let image = noise_image(64, 64);
        let resized = resize(&image, 31, 97).unwrap();
        let colors = distinct_colors(&image);
        assert!(distinct_colors(&resized).is_subset(&colors));
    }

    #[test]
    fn zero_dimensions() {
        let image = GrayImage::from_pixel(4, 4, Luma([0]));
        assert!(matches!(
            resize(&image, 0, 4),
            Err(Error::InvalidDimensions { width: 0, height: 4 })
        ));
        assert!(matches!(
            resize(&image, 4, 0),
            Err(Error::InvalidDimensions { width: 4, height: 0 })
        ));

        let empty = GrayImage::new(0, 0);
        assert!(matches!(resize(&empty, 4, 4), Err(Error::InvalidDimensions { .. })));
    }
}
