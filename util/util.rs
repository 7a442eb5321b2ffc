#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::OnceLock,
};

use image::{Rgb, RgbImage};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;

pub fn load_images(images: &[PathBuf]) -> Vec<(String, RgbImage)> {
    images
        .iter()
        .map(|path| {
            retromodes::load_source(path).map(|image| {
                (path.file_name().unwrap().to_owned().into_string().unwrap(), image)
            })
        })
        .collect::<Result<_, _>>()
        .expect("loaded each image")
}

pub fn load_image_dir(dir: impl AsRef<Path>) -> Vec<(String, RgbImage)> {
    let mut paths = std::fs::read_dir(dir)
        .expect("read img directory")
        .collect::<Result<Vec<_>, _>>()
        .expect("read each file")
        .iter()
        .map(std::fs::DirEntry::path)
        .collect::<Vec<_>>();

    paths.sort();

    load_images(&paths)
}

pub const BENCH_DIR: &str = "img/bench";

/// A smooth color field with noise on top, roughly the texture of a photographed background.
pub fn synthetic_image(width: u32, height: u32, seed: u64) -> RgbImage {
    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(seed);
    RgbImage::from_fn(width, height, |x, y| {
        let fx = x as f32 / width as f32;
        let fy = y as f32 / height as f32;
        let base = [
            255.0 * fx,
            255.0 * fy,
            255.0 * (0.5 + 0.5 * (8.0 * (fx + fy)).sin()),
        ];
        Rgb(base.map(|v| (v + rng.gen_range(-24.0..24.0)).clamp(0.0, 255.0) as u8))
    })
}

pub fn load_benchmark_images() -> Vec<(String, RgbImage)> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join(BENCH_DIR);
    if dir.is_dir() {
        load_image_dir(dir)
    } else {
        vec![
            ("synthetic_640x480".to_owned(), synthetic_image(640, 480, 0)),
            ("synthetic_1920x1080".to_owned(), synthetic_image(1920, 1080, 1)),
        ]
    }
}

static BENCHMARK_IMAGES: OnceLock<Vec<(String, RgbImage)>> = OnceLock::new();

pub fn benchmark_images() -> &'static [(String, RgbImage)] {
    BENCHMARK_IMAGES.get_or_init(load_benchmark_images)
}
