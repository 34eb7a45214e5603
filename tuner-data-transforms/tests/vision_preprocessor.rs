use std::sync::Once;

use anyhow::Result;
use image::{Rgb, RgbImage};
use ndarray::{Array2, Array3, ArrayD};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::NamedTempFile;
use test_case::test_case;
use tuner_data_transforms::{
    vision_preprocessor, vision_preprocessor_default, Phase, RawArray, Record, VisionPreprocessor,
    VisionPreprocessorOptions,
};

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

fn pattern_f64(height: usize, width: usize, channels: usize) -> Array3<f64> {
    Array3::from_shape_fn((height, width, channels), |(y, x, c)| {
        ((y * 31 + x * 17 + c * 7) % 256) as f64 / 255.0
    })
}

fn pattern_u8(height: usize, width: usize, channels: usize) -> Array3<u8> {
    Array3::from_shape_fn((height, width, channels), |(y, x, c)| ((y * 31 + x * 17 + c * 7) % 256) as u8)
}

fn write_png(width: u32, height: u32) -> Result<NamedTempFile> {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, ((x ^ y) % 256) as u8]));
    let file = NamedTempFile::with_suffix(".png")?;
    img.save(file.path())?;
    Ok(file)
}

fn chw(array: Array3<f64>) -> Array3<f64> {
    array.permuted_axes([2, 0, 1]).as_standard_layout().into_owned()
}

// ============================================================================
// Scenario grid
// ============================================================================

#[test_case(Phase::Train; "train")]
#[test_case(Phase::Validation; "validation")]
fn test_float_channel_last_to_channel_first(phase: Phase) -> Result<()> {
    init_tracing();
    let input = pattern_f64(256, 256, 3);
    let output = vision_preprocessor(&Record::from_tensor(input.clone()), 256, 256, -1, 0, phase)?;

    assert_eq!(output.dim(), (3, 256, 256));
    let as_input = output.permuted_axes([1, 2, 0]).mapv(f64::from);
    assert_ne!(as_input, input);
    Ok(())
}

#[test_case(Phase::Train; "train")]
#[test_case(Phase::Validation; "validation")]
fn test_float_channel_last_to_channel_last(phase: Phase) -> Result<()> {
    let input = pattern_f64(64, 48, 3);
    let output = vision_preprocessor(&Record::from_tensor(input.clone()), 64, 48, -1, -1, phase)?;

    assert_eq!(output.dim(), (64, 48, 3));
    assert_ne!(output.mapv(f64::from), input);
    Ok(())
}

#[test_case(Phase::Train, 0 => (3, 32, 40); "train channel first")]
#[test_case(Phase::Train, -1 => (32, 40, 3); "train channel last")]
#[test_case(Phase::Validation, 0 => (3, 32, 40); "validation channel first")]
#[test_case(Phase::Validation, -1 => (32, 40, 3); "validation channel last")]
fn test_channel_first_input(phase: Phase, target: isize) -> (usize, usize, usize) {
    let input = chw(pattern_f64(50, 60, 3));
    vision_preprocessor(&Record::from_tensor(input), 32, 40, 0, target, phase)
        .unwrap()
        .dim()
}

#[test_case(Phase::Train; "train")]
#[test_case(Phase::Validation; "validation")]
fn test_byte_input_gives_float_output(phase: Phase) -> Result<()> {
    let output = vision_preprocessor(&Record::from_tensor(pattern_u8(40, 40, 3)), 24, 24, -1, 0, phase)?;
    assert_eq!(output.dim(), (3, 24, 24));
    assert!(output.iter().all(|v| v.is_finite()));
    Ok(())
}

#[test_case(Phase::Train, 0 => (1, 28, 28); "train channel first")]
#[test_case(Phase::Validation, -1 => (28, 28, 1); "validation channel last")]
fn test_single_channel_is_preserved(phase: Phase, target: isize) -> (usize, usize, usize) {
    let record = Record::from_tensor(pattern_f64(30, 30, 1));
    vision_preprocessor(&record, 28, 28, -1, target, phase).unwrap().dim()
}

#[test]
fn test_two_dimensional_grayscale() -> Result<()> {
    let input = Array2::from_shape_fn((20, 30), |(y, x)| ((y + x) % 256) as u8);
    let output = vision_preprocessor(&Record::from_tensor(input), 16, 16, -1, 0, Phase::Validation)?;
    assert_eq!(output.dim(), (1, 16, 16));
    Ok(())
}

#[test_case(Phase::Train; "train")]
#[test_case(Phase::Validation; "validation")]
fn test_uri_record(phase: Phase) -> Result<()> {
    init_tracing();
    let file = write_png(512, 512)?;
    let record = Record::from_uri(file.path().to_string_lossy());

    let output = vision_preprocessor(&record, 512, 512, 1, 0, phase)?;
    assert_eq!(output.dim(), (3, 512, 512));
    assert!(output.iter().all(|v| v.is_finite()));
    Ok(())
}

#[test]
fn test_uri_record_with_file_scheme() -> Result<()> {
    let file = write_png(40, 30)?;
    let record = Record::from_uri(format!("file://{}", file.path().display()));

    let output = vision_preprocessor(&record, 30, 40, -1, -1, Phase::Validation)?;
    assert_eq!(output.dim(), (30, 40, 3));
    Ok(())
}

#[test]
fn test_layouts_agree_for_same_image() -> Result<()> {
    let hwc = pattern_f64(36, 36, 3);
    let from_hwc = vision_preprocessor(&Record::from_tensor(hwc.clone()), 20, 20, -1, 0, Phase::Validation)?;
    let from_chw = vision_preprocessor(&Record::from_tensor(chw(hwc)), 20, 20, 0, 0, Phase::Validation)?;

    assert_eq!(from_hwc.dim(), from_chw.dim());
    assert_eq!(from_hwc, from_chw);
    Ok(())
}

#[test]
fn test_default_call_form() -> Result<()> {
    let output = vision_preprocessor_default(&Record::from_tensor(pattern_u8(100, 120, 3)))?;
    assert_eq!(output.dim(), (3, 224, 224));
    Ok(())
}

// ============================================================================
// Errors
// ============================================================================

#[test_case(Phase::Train; "train")]
#[test_case(Phase::Validation; "validation")]
fn test_missing_source_is_reported(phase: Phase) {
    let err = vision_preprocessor(&Record::new(), 224, 224, -1, 0, phase).unwrap_err();
    assert!(err.is_missing_attribute());
}

#[test]
fn test_missing_file_is_not_missing_attribute() {
    let record = Record::from_uri("/nonexistent/image.png");
    let err = vision_preprocessor(&record, 8, 8, -1, 0, Phase::Validation).unwrap_err();
    assert!(!err.is_missing_attribute());
}

#[test]
fn test_unsupported_scheme() {
    let record = Record::from_uri("https://example.com/cat.png");
    assert!(vision_preprocessor(&record, 8, 8, -1, 0, Phase::Validation).is_err());
}

#[test_case(0, 8, -1, 0; "zero height")]
#[test_case(8, 8, -1, 1; "middle target axis")]
#[test_case(8, 8, 5, 0; "default axis out of range")]
fn test_invalid_arguments(height: usize, width: usize, default_axis: isize, target_axis: isize) {
    let record = Record::from_tensor(pattern_f64(8, 8, 3));
    assert!(vision_preprocessor(&record, height, width, default_axis, target_axis, Phase::Validation).is_err());
}

#[test_case(r#"{"augmentation": {"brightness_contrast_probability": 1.0, "brightness_limit": 1e300}}"#; "brightness limit overflows to infinity")]
#[test_case(r#"{"augmentation": {"blur_probability": 1.0, "blur_sigma": [1e30, 1e30]}}"#; "huge blur sigma")]
#[test_case(r#"{"augmentation": {"crop_scale": [0.5, 2.0]}}"#; "crop scale above one")]
#[test_case(r#"{"phase": "validation", "augmentation": {"contrast_limit": -1.0}}"#; "negative contrast in validation phase")]
fn test_out_of_range_augmentation_is_rejected_up_front(json: &str) -> Result<()> {
    let options = VisionPreprocessorOptions::from_json_str(json)?;
    assert!(VisionPreprocessor::new(options).is_err());
    Ok(())
}

#[test_case(Phase::Train, (0, 16, 3); "train zero height")]
#[test_case(Phase::Train, (16, 0, 1); "train zero width")]
#[test_case(Phase::Validation, (0, 16, 3); "validation zero height")]
#[test_case(Phase::Validation, (16, 0, 1); "validation zero width")]
fn test_empty_spatial_input(phase: Phase, shape: (usize, usize, usize)) -> Result<()> {
    let channels = shape.2;
    let record = Record::from_tensor(Array3::<f32>::zeros(shape));
    let output = vision_preprocessor(&record, 12, 10, -1, 0, phase)?;

    assert_eq!(output.dim(), (channels, 12, 10));
    // Zero-filled before normalization, so each channel is a single value
    for channel in output.outer_iter() {
        let first = channel[[0, 0]];
        assert!(channel.iter().all(|&v| (v - first).abs() < 1e-6));
    }
    Ok(())
}

#[test]
fn test_four_dimensional_input_is_rejected() {
    let record = Record::from_tensor(RawArray::F32(ArrayD::zeros(vec![2, 8, 8, 3])));
    assert!(vision_preprocessor(&record, 8, 8, -1, 0, Phase::Validation).is_err());
}

// ============================================================================
// Randomness
// ============================================================================

#[test]
fn test_train_phase_is_randomized() -> Result<()> {
    let record = Record::from_tensor(pattern_f64(64, 64, 3));
    let first = vision_preprocessor(&record, 32, 32, -1, 0, Phase::Train)?;
    let differs = (0..8).any(|_| {
        vision_preprocessor(&record, 32, 32, -1, 0, Phase::Train).is_ok_and(|other| other != first)
    });
    assert!(differs);
    Ok(())
}

#[test]
fn test_validation_phase_is_deterministic() -> Result<()> {
    let record = Record::from_tensor(pattern_f64(64, 64, 3));
    let first = vision_preprocessor(&record, 32, 32, -1, 0, Phase::Validation)?;
    let second = vision_preprocessor(&record, 32, 32, -1, 0, Phase::Validation)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_seeded_train_phase_is_reproducible() -> Result<()> {
    let preprocessor = VisionPreprocessor::new(VisionPreprocessorOptions::new(32, 32, -1, 0, Phase::Train))?;
    let record = Record::from_tensor(pattern_u8(48, 48, 3));

    let a = preprocessor.preprocess_with_rng(&record, &mut StdRng::seed_from_u64(17))?;
    let b = preprocessor.preprocess_with_rng(&record, &mut StdRng::seed_from_u64(17))?;
    assert_eq!(a, b);
    Ok(())
}

#[test]
fn test_options_from_json() -> Result<()> {
    let options = VisionPreprocessorOptions::from_json_str(
        r#"{
            "height": 16,
            "width": 12,
            "target_channel_axis": -1,
            "phase": "validation",
            "augmentation": {"validation_resize": "shorter_side_then_center_crop"}
        }"#,
    )?;
    let preprocessor = VisionPreprocessor::new(options)?;

    let output = preprocessor.preprocess(&Record::from_tensor(pattern_f64(40, 20, 3)))?;
    assert_eq!(output.dim(), (16, 12, 3));
    Ok(())
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_output_shape(
        src_height in 1usize..40,
        src_width in 1usize..40,
        height in 1usize..24,
        width in 1usize..24,
        channels in prop::sample::select(vec![1usize, 3, 4]),
        channel_first_input in any::<bool>(),
        channel_first_output in any::<bool>(),
        train in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let hwc = pattern_f64(src_height, src_width, channels);
        let (input, default_axis) = if channel_first_input { (chw(hwc), 0) } else { (hwc, -1) };
        let target_axis = if channel_first_output { 0 } else { -1 };
        let phase = if train { Phase::Train } else { Phase::Validation };

        let preprocessor = VisionPreprocessor::new(
            VisionPreprocessorOptions::new(height, width, default_axis, target_axis, phase),
        ).unwrap();
        let output = preprocessor
            .preprocess_with_rng(&Record::from_tensor(input), &mut StdRng::seed_from_u64(seed))
            .unwrap();

        let expected = if channel_first_output { (channels, height, width) } else { (height, width, channels) };
        prop_assert_eq!(output.dim(), expected);
        prop_assert!(output.iter().all(|v| v.is_finite()));
    }
}
