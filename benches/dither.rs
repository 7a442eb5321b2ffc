#[path = "../util/util.rs"]
mod util;

use util::benchmark_images;

use std::time::Duration;

use criterion::{
    criterion_group, criterion_main, measurement::WallTime, Bencher, BenchmarkId, Criterion,
    SamplingMode,
};
use image::RgbImage;
use retromodes::{
    all_modes, dither::OrderedDither, quantize, quantize_par, resize, ModeDescriptor, ModePipeline,
};

fn bench<Input>(
    c: &mut Criterion,
    group: &str,
    inputs: &[(String, Input)],
    mut f: impl FnMut(&mut Bencher<WallTime>, &Input),
) {
    let mut group = c.benchmark_group(group);
    group
        .sample_size(30)
        .noise_threshold(0.05)
        .sampling_mode(SamplingMode::Flat)
        .warm_up_time(Duration::from_secs(2));

    for (path, input) in inputs {
        group.bench_with_input(BenchmarkId::from_parameter(path), input, &mut f);
    }
}

fn mode_sized(mode: &ModeDescriptor) -> Vec<(String, RgbImage)> {
    benchmark_images()
        .iter()
        .map(|(path, image)| (path.clone(), resize(image, mode.width, mode.height).unwrap()))
        .collect()
}

fn dither_single(c: &mut Criterion) {
    let images = mode_sized(&all_modes()[0]);
    bench(c, "dither_single", &images, |b, image| {
        b.iter(|| OrderedDither::new().monochrome(image))
    })
}

fn dither_par(c: &mut Criterion) {
    let images = mode_sized(&all_modes()[0]);
    bench(c, "dither_par", &images, |b, image| {
        b.iter(|| OrderedDither::new().monochrome_par(image))
    })
}

fn quantize_single(c: &mut Criterion) {
    let images = mode_sized(&all_modes()[2]);
    bench(c, "quantize_single", &images, |b, image| {
        b.iter(|| quantize(image, 16).unwrap())
    })
}

fn quantize_multi(c: &mut Criterion) {
    let images = mode_sized(&all_modes()[2]);
    bench(c, "quantize_par", &images, |b, image| {
        b.iter(|| quantize_par(image, 16).unwrap())
    })
}

fn all_modes_single(c: &mut Criterion) {
    bench(c, "all_modes_single", benchmark_images(), |b, image| {
        b.iter(|| ModePipeline::new().render_all(image, all_modes()).unwrap())
    })
}

fn all_modes_par(c: &mut Criterion) {
    bench(c, "all_modes_par", benchmark_images(), |b, image| {
        b.iter(|| ModePipeline::new().render_all_par(image, all_modes()).unwrap())
    })
}

criterion_group!(
    benches,
    dither_single,
    dither_par,
    quantize_single,
    quantize_multi,
    all_modes_single,
    all_modes_par
);
criterion_main!(benches);
