use hog_pairs::{crop_images_in_folder, CropBox, CropConfig, PipelineError};
use image::{Rgb, RgbImage};

#[test]
fn crops_images_and_ignores_other_files() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let out_dir = output.path().join("cropped");

    let mut img = RgbImage::new(40, 30);
    img.put_pixel(10, 5, Rgb([0, 255, 0]));
    img.save(input.path().join("one.png")).unwrap();
    RgbImage::new(40, 30).save(input.path().join("two.bmp")).unwrap();
    std::fs::write(input.path().join("readme.md"), "skip me").unwrap();

    let cfg = CropConfig::new(input.path(), &out_dir).with_crop_box(CropBox::new(10, 5, 30, 25));
    let report = crop_images_in_folder(&cfg).unwrap();

    assert_eq!(report.cropped, vec![out_dir.join("one.png"), out_dir.join("two.bmp")]);
    assert!(report.failed.is_empty());
    assert_eq!(report.ignored, 1);

    let cropped = image::open(out_dir.join("one.png")).unwrap().to_rgb8();
    assert_eq!(cropped.dimensions(), (20, 20));
    assert_eq!(cropped.get_pixel(0, 0), &Rgb([0, 255, 0]));
}

#[test]
fn corrupt_image_is_reported_not_fatal() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    std::fs::write(input.path().join("broken.png"), b"not really a png").unwrap();
    RgbImage::new(20, 20).save(input.path().join("fine.png")).unwrap();

    let cfg =
        CropConfig::new(input.path(), output.path()).with_crop_box(CropBox::new(0, 0, 10, 10));
    let report = crop_images_in_folder(&cfg).unwrap();

    assert_eq!(report.cropped.len(), 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].path, input.path().join("broken.png"));
}

#[test]
fn empty_crop_box_is_rejected_up_front() {
    let input = tempfile::tempdir().unwrap();
    let cfg = CropConfig::new(input.path(), input.path().join("out"))
        .with_crop_box(CropBox::new(5, 5, 5, 10));
    assert!(matches!(crop_images_in_folder(&cfg), Err(PipelineError::Config(_))));
    assert!(!input.path().join("out").exists());
}

#[test]
fn crops_of_different_sized_inputs_share_one_size() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    RgbImage::from_pixel(900, 500, Rgb([90, 90, 90])).save(input.path().join("big.png")).unwrap();
    RgbImage::from_pixel(800, 400, Rgb([90, 90, 90])).save(input.path().join("small.png")).unwrap();

    let report = crop_images_in_folder(&CropConfig::new(input.path(), output.path())).unwrap();
    assert_eq!(report.cropped.len(), 2);
    for path in &report.cropped {
        let img = image::open(path).unwrap();
        assert_eq!((img.width(), img.height()), (574, 310));
    }

    // the small input is padded with black past its right edge
    let small = image::open(output.path().join("small.png")).unwrap().to_rgb8();
    assert_eq!(small.get_pixel(0, 0), &Rgb([90, 90, 90]));
    assert_eq!(small.get_pixel(573, 0), &Rgb([0, 0, 0]));
}
