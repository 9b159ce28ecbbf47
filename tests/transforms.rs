//! # Sample transforms
//!
//! Behaviour of the rescale, crop and tensor conversion transforms on synthetic samples.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use cv_stereo_data::prelude::*;
use cv_stereo_data::{DType, Resample, SampleNames};
use ndarray::{Array2, Array3, ArrayD, Axis, IxDyn};
use rand::rngs::StdRng;
use rand::SeedableRng;

// -----------------------------------------------------------------------------------------------
// HELPERS
// -----------------------------------------------------------------------------------------------

/// Sample whose every element encodes its own `(row, column)` as `row * 1000 + column`.
fn position_sample(h: usize, w: usize) -> Sample {
    let code = |y: usize, x: usize| (y * 1000 + x) as f32;

    Sample::new(
        Array3::from_shape_fn((h, w, 3), |(y, x, _)| code(y, x)),
        Array3::from_shape_fn((h, w, 3), |(y, x, _)| code(y, x) + 0.5),
        Array2::from_shape_fn((h, w), |(y, x)| code(y, x))
    )
}

fn u8_sample(h: usize, w: usize, pixel: u8, disp: f32) -> Sample {
    Sample::new(
        Array3::from_elem((h, w, 3), pixel),
        Array3::from_elem((h, w, 3), pixel),
        Array2::from_elem((h, w), disp)
    )
}

/// Resizes by filling the new grid with the first input element.
struct FirstValue;

impl Resample for FirstValue {
    fn resize(
        &self,
        array: &ArrayD<f64>,
        new_h: usize,
        new_w: usize
    ) -> cv_stereo_data::Result<ArrayD<f64>> {
        let mut shape = array.shape().to_vec();
        shape[0] = new_h;
        shape[1] = new_w;
        let first = array.iter().next().cloned().unwrap_or(0.0);
        Ok(ArrayD::from_elem(IxDyn(&shape), first))
    }
}

fn f32_of(a: &DynArray) -> &ArrayD<f32> {
    a.as_f32().expect("float32 array")
}

fn all_close(a: &ArrayD<f32>, v: f32) -> bool {
    a.iter().all(|x| (x - v).abs() < 1e-6)
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[test]
fn crop_keeps_arrays_co_registered() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = StdRng::seed_from_u64(3);
    let crop = RandomCrop::new(4, 6);

    for _ in 0..50 {
        let out = crop.apply(position_sample(10, 16), &mut rng)?;

        assert_eq!(out.spatial_extent()?, (4, 6));
        assert_eq!(out.img_left.shape(), &[4, 6, 3]);
        assert_eq!(out.gt_disp.shape(), &[4, 6]);

        let left = f32_of(&out.img_left);
        let right = f32_of(&out.img_right);
        let disp = f32_of(&out.gt_disp);
        for y in 0..4 {
            for x in 0..6 {
                assert_eq!(left[[y, x, 0]], disp[[y, x]]);
                assert_eq!(right[[y, x, 2]], disp[[y, x]] + 0.5);
            }
        }
    }

    Ok(())
}

#[test]
fn crop_offsets_stay_in_bounds() -> Result<(), Box<dyn std::error::Error>> {
    let (h, w, ch, cw) = (12, 20, 8, 15);
    let mut rng = StdRng::seed_from_u64(11);
    let crop = RandomCrop::new(ch, cw);

    let mut tops = Vec::new();
    let mut lefts = Vec::new();
    for _ in 0..500 {
        let out = crop.apply(position_sample(h, w), &mut rng)?;
        let origin = f32_of(&out.gt_disp)[[0, 0]] as usize;
        tops.push(origin / 1000);
        lefts.push(origin % 1000);
    }

    assert!(tops.iter().all(|&t| t < h - ch));
    assert!(lefts.iter().all(|&l| l < w - cw));

    // Both ends of the range are reachable
    assert!(tops.contains(&0) && tops.contains(&(h - ch - 1)));
    assert!(lefts.contains(&0) && lefts.contains(&(w - cw - 1)));

    Ok(())
}

#[test]
fn crop_must_be_strictly_smaller() {
    let mut rng = StdRng::seed_from_u64(0);

    for &(ch, cw) in &[(10, 5), (5, 16), (10, 16), (11, 4)] {
        match RandomCrop::new(ch, cw).apply(position_sample(10, 16), &mut rng) {
            Err(Error::Range(_)) => {},
            other => panic!("expected range error for {}x{}, got {:?}", ch, cw, other)
        }
    }
}

#[test]
fn crop_works_on_planar_samples() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = StdRng::seed_from_u64(5);
    let planar = ToTensor.apply(position_sample(9, 9), &mut rng)?;

    let out = RandomCrop::square(4).apply(planar, &mut rng)?;
    assert_eq!(out.layout, Layout::Planar);
    assert_eq!(out.img_right.shape(), &[3, 4, 4]);
    assert_eq!(out.gt_disp.shape(), &[1, 4, 4]);
    assert_eq!(f32_of(&out.img_left)[[1, 2, 3]], f32_of(&out.gt_disp)[[0, 2, 3]]);

    Ok(())
}

#[test]
fn normalize_only_divides_disparity_by_32() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = StdRng::seed_from_u64(1);
    let rescale = RandomRescale::new(OutputSize::Short(256));
    assert_eq!(rescale.policy(), RescalePolicy::NormalizeOnly);

    let inputs = vec![
        DynArray::from(Array2::<f32>::from_elem((3, 4), 48.0)),
        DynArray::from(Array2::<f64>::from_elem((3, 4), 48.0)),
        DynArray::from(Array2::<u16>::from_elem((3, 4), 48))
    ];

    for gt_disp in inputs {
        let mut sample = u8_sample(3, 4, 51, 0.0);
        sample.gt_disp = gt_disp;

        let out = rescale.apply(sample, &mut rng)?;
        assert_eq!(out.gt_disp.dtype(), DType::F32);
        assert_eq!(out.gt_disp.shape(), &[3, 4]);
        assert!(f32_of(&out.gt_disp).iter().all(|&d| d == 1.5));
    }

    Ok(())
}

#[test]
fn rescale_normalises_intensities() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = StdRng::seed_from_u64(1);
    let out = RandomRescale::new(OutputSize::Short(4)).apply(u8_sample(2, 2, 255, 7.0), &mut rng)?;

    assert_eq!(out.img_left.dtype(), DType::F32);
    assert_eq!(out.img_left.shape(), &[2, 2, 3]);
    assert!(f32_of(&out.img_left).iter().all(|&v| v == 1.0));
    assert!(f32_of(&out.img_right).iter().all(|&v| v == 1.0));
    assert!(f32_of(&out.gt_disp).iter().all(|&v| v == 7.0 / 32.0));

    Ok(())
}

#[test]
fn resize_branch_scales_disparity_with_width() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = StdRng::seed_from_u64(1);
    let rescale = RandomRescale::new(OutputSize::Exact(4, 8))
        .with_policy(RescalePolicy::ResizeAndNormalize);

    let out = rescale.apply(u8_sample(2, 4, 102, 10.7), &mut rng)?;

    assert_eq!(out.img_left.shape(), &[4, 8, 3]);
    assert_eq!(out.gt_disp.shape(), &[4, 8]);
    assert!(all_close(f32_of(&out.img_left), 0.4));
    assert!(all_close(f32_of(&out.img_right), 0.4));

    // 10.7 truncates to 10, doubles with the width and lands in units of 1/32 pixel
    assert!(all_close(f32_of(&out.gt_disp), 20.0 / 32.0));

    Ok(())
}

#[test]
fn short_side_size_keeps_aspect_ratio() {
    assert_eq!(OutputSize::Short(256).resolve(540, 960), (256, 455));
    assert_eq!(OutputSize::Short(256).resolve(960, 540), (455, 256));
    assert_eq!(OutputSize::Short(4).resolve(2, 4), (4, 8));
    assert_eq!(OutputSize::Exact(7, 9).resolve(540, 960), (7, 9));
}

#[test]
fn random_policy_takes_both_branches() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = StdRng::seed_from_u64(42);
    let rescale = RandomRescale::new(OutputSize::Exact(6, 6)).with_policy(RescalePolicy::Random);

    let mut resized = 0;
    let mut kept = 0;
    for _ in 0..100 {
        let out = rescale.apply(u8_sample(3, 3, 0, 0.0), &mut rng)?;
        match out.spatial_extent()? {
            (6, 6) => resized += 1,
            (3, 3) => kept += 1,
            other => panic!("unexpected extent {:?}", other)
        }
    }

    assert!(resized > 0 && kept > 0);
    Ok(())
}

#[test]
fn to_tensor_moves_channels_first() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = StdRng::seed_from_u64(0);
    let rgb = [0.25f32, 0.5, 0.75];
    let image = Array3::from_shape_fn((5, 7, 3), |(_, _, c)| rgb[c]);
    let disp = Array2::from_shape_fn((5, 7), |(y, x)| (y * 7 + x) as f32);

    let out = ToTensor.apply(Sample::new(image.clone(), image, disp.clone()), &mut rng)?;
    assert_eq!(out.layout, Layout::Planar);
    assert_eq!(out.img_left.shape(), &[3, 5, 7]);
    assert_eq!(out.gt_disp.shape(), &[1, 5, 7]);

    for img in &[&out.img_left, &out.img_right] {
        let planes = f32_of(img);
        for (c, &value) in rgb.iter().enumerate() {
            assert!(planes.index_axis(Axis(0), c).iter().all(|&v| v == value));
        }
    }

    assert_eq!(f32_of(&out.gt_disp).index_axis(Axis(0), 0), disp.into_dyn());
    assert_eq!(out.spatial_extent()?, (5, 7));

    Ok(())
}

#[test]
fn to_tensor_rejects_planar_input() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = StdRng::seed_from_u64(0);
    let planar = ToTensor.apply(position_sample(2, 2), &mut rng)?;

    assert!(matches!(ToTensor.apply(planar, &mut rng), Err(Error::Shape(_))));
    Ok(())
}

#[test]
fn mismatched_extents_are_rejected() {
    let mut rng = StdRng::seed_from_u64(0);
    let mut sample = position_sample(6, 6);
    sample.gt_disp = DynArray::from(Array2::<f32>::zeros((6, 5)));

    assert!(matches!(sample.spatial_extent(), Err(Error::Shape(_))));
    assert!(matches!(RandomCrop::square(2).apply(sample, &mut rng), Err(Error::Shape(_))));
}

#[test]
fn composed_pipeline_runs_in_order() -> Result<(), Box<dyn std::error::Error>> {
    let names = SampleNames {
        left: "left/0006.png".into(),
        right: "right/0006.png".into(),
        disp: "disparity/0006.pfm".into()
    };

    let pipeline = Compose::default()
        .then(RandomRescale::new(OutputSize::Exact(16, 32)))
        .then(RandomCrop::new(8, 12))
        .then(ToTensor);
    assert_eq!(pipeline.len(), 3);

    let sample = u8_sample(16, 32, 255, 64.0).with_names(names.clone());
    let out = pipeline.apply(sample, &mut StdRng::seed_from_u64(9))?;

    assert_eq!(out.img_left.shape(), &[3, 8, 12]);
    assert_eq!(out.gt_disp.shape(), &[1, 8, 12]);
    assert!(all_close(f32_of(&out.img_left), 1.0));
    assert!(all_close(f32_of(&out.gt_disp), 2.0));
    assert_eq!(out.names, Some(names));

    Ok(())
}

#[test]
fn seeded_pipelines_are_reproducible() -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Compose::default()
        .then(RandomRescale::new(OutputSize::Exact(12, 12)).with_policy(RescalePolicy::Random))
        .then(RandomCrop::square(5));

    let a = pipeline.apply(position_sample(10, 10), &mut StdRng::seed_from_u64(77))?;
    let b = pipeline.apply(position_sample(10, 10), &mut StdRng::seed_from_u64(77))?;
    assert_eq!(a, b);

    Ok(())
}

#[test]
fn rescale_resizes_through_injected_resampler() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = StdRng::seed_from_u64(5);
    let rescale = RandomRescale::new(OutputSize::Exact(2, 4))
        .with_policy(RescalePolicy::ResizeAndNormalize)
        .with_resampler(FirstValue);

    let out = rescale.apply(u8_sample(4, 8, 51, 40.7), &mut rng)?;

    assert_eq!(out.img_left.shape(), &[2, 4, 3]);
    assert_eq!(out.img_right.shape(), &[2, 4, 3]);
    assert_eq!(out.gt_disp.shape(), &[2, 4]);
    assert!(all_close(f32_of(&out.img_left), 0.2));
    assert!(all_close(f32_of(&out.img_right), 0.2));

    // The resampler sees the truncated disparity, then the width halves it
    assert!(all_close(f32_of(&out.gt_disp), 40.0 * 0.5 / 32.0));

    Ok(())
}
