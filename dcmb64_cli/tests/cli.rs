mod utils;

use base64::prelude::{BASE64_STANDARD, Engine as _};
use image::{ColorType, DynamicImage, ImageFormat};
use predicates::prelude::*;

use utils::{TestImage, create_temp_file, dcmb64_cli, get_stdout};

/// Splits the CLI's output into its pathname and base64 lines.
///
fn output_lines(stdout: &str) -> (String, String) {
  let lines: Vec<&str> = stdout.lines().collect();
  assert_eq!(lines.len(), 2, "unexpected output: {stdout}");

  (lines[0].to_string(), lines[1].to_string())
}

fn decode_output_image(base64: &str) -> DynamicImage {
  let jpeg = BASE64_STANDARD.decode(base64).unwrap();

  image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg).unwrap()
}

#[test]
fn no_arguments() {
  dcmb64_cli()
    .assert()
    .success()
    .stdout("No arguments provided.\n");
}

#[test]
fn grayscale_8_bit() {
  let pixels = (0..64).map(|i| i * 4).collect();
  let file = TestImage::grayscale_u8(8, 8, pixels).to_temp_file();

  let assert = dcmb64_cli().arg(file.path()).assert().success();
  let (pathname, base64) = output_lines(&get_stdout(&assert));

  assert_eq!(pathname, format!("pathname: {}", file.path().display()));

  let image = decode_output_image(&base64);
  assert_eq!((image.width(), image.height()), (8, 8));
  assert_eq!(image.color(), ColorType::L8);
}

#[test]
fn grayscale_16_bit_signed() {
  let pixels = [-1000, 0, 50, 100, 150, 200, 250, 30000];
  let file = TestImage::grayscale_i16(2, 4, &pixels).to_temp_file();

  let assert = dcmb64_cli().arg(file.path()).assert().success();
  let (_, base64) = output_lines(&get_stdout(&assert));

  let image = decode_output_image(&base64);
  assert_eq!((image.width(), image.height()), (4, 2));
  assert_eq!(image.color(), ColorType::L8);
}

#[test]
fn rgb_8_bit() {
  let pixels = [0, 0, 255].repeat(16 * 16);
  let file = TestImage::rgb_u8(16, 16, pixels).to_temp_file();

  let assert = dcmb64_cli().arg(file.path()).assert().success();
  let (_, base64) = output_lines(&get_stdout(&assert));

  let image = decode_output_image(&base64);
  assert_eq!((image.width(), image.height()), (16, 16));
  assert_eq!(image.color(), ColorType::Rgb8);

  let pixel = image.as_rgb8().unwrap().get_pixel(8, 8);
  assert!(pixel[2] > 200 && pixel[0] < 60 && pixel[1] < 60);
}

#[test]
fn output_is_deterministic() {
  let pixels = (0..16).map(|i| i * 16).collect();
  let file = TestImage::grayscale_u8(4, 4, pixels).to_temp_file();

  let first = get_stdout(&dcmb64_cli().arg(file.path()).assert().success());
  let second = get_stdout(&dcmb64_cli().arg(file.path()).assert().success());

  assert_eq!(first, second);
}

#[test]
fn extra_arguments_are_ignored() {
  let file = TestImage::grayscale_u8(2, 2, vec![1, 2, 3, 4]).to_temp_file();

  let expected = get_stdout(&dcmb64_cli().arg(file.path()).assert().success());

  dcmb64_cli()
    .arg(file.path())
    .args(["second", "--third", "-x"])
    .assert()
    .success()
    .stdout(expected);
}

#[test]
fn jpg_quality_changes_output() {
  let pixels = (0..64).map(|i| (i * 37 % 256) as u8).collect();
  let file = TestImage::grayscale_u8(8, 8, pixels).to_temp_file();

  let default_quality =
    get_stdout(&dcmb64_cli().arg(file.path()).assert().success());
  let low_quality = get_stdout(
    &dcmb64_cli()
      .args(["--jpg-quality", "10"])
      .arg(file.path())
      .assert()
      .success(),
  );

  assert_ne!(default_quality, low_quality);

  dcmb64_cli()
    .args(["--jpg-quality", "0"])
    .arg(file.path())
    .assert()
    .failure();
}

/// Returns the mean luma of a decoded grayscale image.
///
fn mean_luma(image: &DynamicImage) -> f64 {
  let luma = image.to_luma8();
  let total: u64 = luma.pixels().map(|p| u64::from(p[0])).sum();

  total as f64 / f64::from(luma.width() * luma.height())
}

#[test]
fn select_frame() {
  let mut pixels = vec![0; 16];
  pixels.extend([200; 16]);

  let mut image = TestImage::grayscale_u8(4, 4, pixels);
  image.number_of_frames = Some(2);
  let file = image.to_temp_file();

  let assert = dcmb64_cli().arg(file.path()).assert().success();
  let (_, base64) = output_lines(&get_stdout(&assert));
  let first_frame = decode_output_image(&base64);
  assert!(mean_luma(&first_frame) < 10.0);

  let assert = dcmb64_cli()
    .args(["--frame", "1"])
    .arg(file.path())
    .assert()
    .success();
  let (_, base64) = output_lines(&get_stdout(&assert));
  let second_frame = decode_output_image(&base64);
  assert_eq!((second_frame.width(), second_frame.height()), (4, 4));
  assert!((mean_luma(&second_frame) - 200.0).abs() < 10.0);

  dcmb64_cli()
    .args(["--frame", "2"])
    .arg(file.path())
    .assert()
    .failure()
    .code(1)
    .stderr(predicate::str::contains("Frame not present"));
}

#[cfg(unix)]
#[test]
fn pathname_is_not_utf8() {
  use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join(OsStr::from_bytes(b"image-\xFF\xFE.dcm"));
  let image = TestImage::grayscale_u8(2, 2, vec![0; 4]);
  std::fs::write(&path, image.to_p10_bytes()).unwrap();

  let assert = dcmb64_cli().arg(&path).assert().success();

  let mut expected_first_line = b"pathname: ".to_vec();
  expected_first_line.extend_from_slice(path.as_os_str().as_bytes());
  expected_first_line.push(b'\n');

  let stdout = &assert.get_output().stdout;
  assert!(stdout.starts_with(&expected_first_line));
  assert_eq!(stdout.iter().filter(|b| **b == b'\n').count(), 2);
}

#[test]
fn missing_file() {
  let path = "/this/file/does/not/exist.dcm";

  dcmb64_cli()
    .arg(path)
    .assert()
    .failure()
    .code(1)
    .stdout(format!("pathname: {path}\n"));
}

#[test]
fn empty_file() {
  let file = create_temp_file(&[]);

  dcmb64_cli()
    .arg(file.path())
    .assert()
    .failure()
    .code(1)
    .stdout(format!("pathname: {}\n", file.path().display()));
}

#[test]
fn text_file() {
  let file = create_temp_file(b"This is not a DICOM file.\n");

  dcmb64_cli()
    .arg(file.path())
    .assert()
    .failure()
    .code(1)
    .stdout(format!("pathname: {}\n", file.path().display()))
    .stderr(predicate::str::contains("----- dcmb64 -----"));
}

#[test]
fn unsupported_transfer_syntax() {
  let mut bytes = vec![0u8; 128];
  bytes.extend_from_slice(b"DICM");
  bytes.extend(utils::explicit_vr_le(0x0002, 0x0010, "UI", b"1.2.3.4.5"));

  let file = create_temp_file(&bytes);

  dcmb64_cli()
    .arg(file.path())
    .assert()
    .failure()
    .code(1)
    .stdout(format!("pathname: {}\n", file.path().display()));
}
