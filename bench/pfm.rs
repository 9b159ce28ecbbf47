use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cv_stereo_data::pfm::{read_pfm, write_pfm};
use cv_stereo_data::prelude::*;
use ndarray::{Array2, Array3};
use rand::rngs::StdRng;
use rand::SeedableRng;

const WIDTH: usize = 960;
const HEIGHT: usize = 540;

fn pfm_bench(c: &mut Criterion) {

    // Encode a SceneFlow sized disparity map once
    let disp = Array2::from_shape_fn((HEIGHT, WIDTH), |(y, x)| (x as f32 * 0.1) + y as f32);
    let mut buf = Vec::new();
    write_pfm(&mut buf, &DynArray::from(disp), 1.0, ByteOrder::Little).unwrap();

    c.bench_function("read_pfm 960x540", |b| b.iter(|| read_pfm(black_box(&buf[..]))));
}

fn pipeline_bench(c: &mut Criterion) {

    // Build sample
    let image = Array3::from_shape_fn((HEIGHT, WIDTH, 3), |(y, x, c)| ((x + y + c) % 256) as u8);
    let disp = Array2::from_elem((HEIGHT, WIDTH), 40.0f32);
    let sample = Sample::new(image.clone(), image, disp);

    // Build pipeline
    let pipeline = Compose::default()
        .then(RandomRescale::new(OutputSize::Exact(HEIGHT, WIDTH)))
        .then(RandomCrop::new(384, 768))
        .then(ToTensor);

    let mut rng = StdRng::seed_from_u64(0);

    c.bench_function("rescale+crop+tensor 960x540", |b| {
        b.iter(|| pipeline.apply(black_box(sample.clone()), &mut rng))
    });
}

criterion_group!(benches, pfm_bench, pipeline_bench);
criterion_main!(benches);
