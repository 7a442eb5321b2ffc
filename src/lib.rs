//! A library for rendering one source image into a set of retro display modes.
//!
//! Each mode emulates the graphics of a historical platform: a target resolution,
//! a color budget, and a dithering strategy. For example, `1bit` is a 256x192 black and white
//! image with ordered dithering, while `8bit-cpc` is a 160x200 image with at most 16 colors.
//! See [`MODES`] for the full registry.
//!
//! # Features
//! `retromodes` has several `cargo` features that can be turned off or on:
//! - `threads`: exposes parallel versions of most functions via [`rayon`].
//! - `cli`: builds the `retromodes` command line binary (off by default).
//!
//! # Example
//! ```no_run
//! # use retromodes::{all_modes, generate_all, load_source, save_output_set};
//! # fn main() -> Result<(), retromodes::Error> {
//! let source = load_source("background.jpg")?;
//! let outputs = generate_all(&source, all_modes())?;
//!
//! // writes out/level1/1bit.png, out/level1/8bit-basic.png, ...
//! save_output_set(&outputs, "out", "level1")?;
//! # Ok(())
//! # }
//! ```
//!
//! For more control over individual modes, see [`ModePipeline`].

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::expect_used,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    clippy::missing_docs_in_private_items,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::many_single_char_names,
    clippy::missing_panics_doc,
    clippy::unreadable_literal,
    clippy::wildcard_imports
)]

mod batch;
mod error;
mod io;
mod mode;
mod pipeline;
mod quantize;
mod resize;
mod types;

pub mod dither;
pub mod wu;

pub use batch::*;
pub use error::*;
pub use io::*;
pub use mode::*;
pub use pipeline::*;
pub use quantize::*;
pub use resize::*;
pub use types::*;

/// The minimum supported number of palette colors is `2`.
pub const MIN_COLORS: u16 = 2;

/// The maximum supported number of palette colors is `256`.
pub const MAX_COLORS: u16 = u8::MAX as u16 + 1;

/// The default output level name.
pub const DEFAULT_LEVEL: &str = "level1";

#[cfg(test)]
pub(crate) mod tests {
    use image::{ImageBuffer, Pixel, Rgb, RgbImage};
    use palette::Srgb;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoroshiro128PlusPlus;
    use std::collections::HashSet;

    /// 1024 pseudo-random colors, the same on every call.
    pub fn test_data_1024() -> Vec<Srgb<u8>> {
        let mut rng = Xoroshiro128PlusPlus::seed_from_u64(0);
        (0..1024)
            .map(|_| Srgb::new(rng.gen(), rng.gen(), rng.gen()))
            .collect()
    }

    /// An image of pseudo-random pixels, the same for the same dimensions.
    pub fn noise_image(width: u32, height: u32) -> RgbImage {
        let mut rng = Xoroshiro128PlusPlus::seed_from_u64((u64::from(width) << 32) | u64::from(height));
        RgbImage::from_fn(width, height, |_, _| Rgb([rng.gen(), rng.gen(), rng.gen()]))
    }

    /// A horizontal gray ramp from black at `x = 0` to white at `x = width - 1`.
    pub fn gradient_image(width: u32, height: u32) -> RgbImage {
        let last = width.saturating_sub(1).max(1);
        RgbImage::from_fn(width, height, |x, _| {
            #[allow(clippy::cast_possible_truncation)]
            let v = (x * 255 / last) as u8;
            Rgb([v; 3])
        })
    }

    /// The set of distinct pixel values in `image`.
    pub fn distinct_colors<P: Pixel<Subpixel = u8>>(image: &ImageBuffer<P, Vec<u8>>) -> HashSet<Vec<u8>> {
        image.pixels().map(|p| p.channels().to_vec()).collect()
    }
}
