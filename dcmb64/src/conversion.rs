//! Converts the pixel data in a DICOM data set into a base64-encoded JPEG
//! image.
//!
//! Single channel pixel data is always coerced to 8-bit grayscale by clamping
//! each stored value into the range 0-255. No windowing or rescaling is
//! applied. 8-bit RGB pixel data is encoded as RGB.

use std::path::Path;

use base64::prelude::{BASE64_STANDARD, Engine as _};
use image::{DynamicImage, GrayImage, RgbImage, codecs::jpeg::JpegEncoder};

use dcmb64_core::{
  DataError, DataSet, Dcmb64Error, TransferSyntax, dictionary,
  transfer_syntax,
};
use dcmb64_p10::P10Error;
use dcmb64_pixel_data::{
  DataSetPixelDataExtensions, PixelArray, PixelArrayData,
  PixelDataDecodeError,
};

pub use dcmb64_pixel_data::ColorMode;

/// Configuration used when converting a data set to a base64-encoded JPEG.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConversionConfig {
  pub(crate) jpeg_quality: u8,
  pub(crate) frame_index: usize,
}

impl Default for ConversionConfig {
  fn default() -> Self {
    Self {
      jpeg_quality: 75,
      frame_index: 0,
    }
  }
}

impl ConversionConfig {
  /// The quality of the encoded JPEG, in the range 1-100. Values outside this
  /// range are clamped.
  ///
  /// By default the quality is 75.
  ///
  pub fn jpeg_quality(mut self, value: u8) -> Self {
    self.jpeg_quality = value.clamp(1, 100);
    self
  }

  /// The index of the frame to convert in multi-frame pixel data.
  ///
  /// By default the first frame is converted.
  ///
  pub fn frame_index(mut self, value: usize) -> Self {
    self.frame_index = value;
    self
  }
}

/// An error that occurred converting DICOM pixel data to a JPEG image.
///
#[derive(Debug)]
pub enum ConversionError {
  /// The DICOM P10 data could not be read.
  P10Error(P10Error),

  /// A data element needed for conversion is missing or invalid.
  DataError(DataError),

  /// The pixel data could not be decoded.
  PixelDataDecodeError(PixelDataDecodeError),

  /// The JPEG image could not be encoded.
  ImageError(image::ImageError),

  /// The requested frame is not present in the pixel data.
  FrameNotPresent {
    frame_index: usize,
    frame_count: usize,
  },

  /// The decoded pixel data has no photographic image mode that can be
  /// encoded as a JPEG.
  ImageModeNotSupported { details: String },
}

impl ConversionError {
  /// Returns the name of the conversion error as a human-readable string.
  ///
  pub fn name(&self) -> &'static str {
    match self {
      Self::P10Error(e) => e.name(),
      Self::DataError(_) => "Data error",
      Self::PixelDataDecodeError(e) => e.name(),
      Self::ImageError(_) => "Image error",
      Self::FrameNotPresent { .. } => "Frame not present",
      Self::ImageModeNotSupported { .. } => "Image mode not supported",
    }
  }
}

impl From<P10Error> for ConversionError {
  fn from(e: P10Error) -> Self {
    Self::P10Error(e)
  }
}

impl From<DataError> for ConversionError {
  fn from(e: DataError) -> Self {
    Self::DataError(e)
  }
}

impl From<PixelDataDecodeError> for ConversionError {
  fn from(e: PixelDataDecodeError) -> Self {
    Self::PixelDataDecodeError(e)
  }
}

impl From<image::ImageError> for ConversionError {
  fn from(e: image::ImageError) -> Self {
    Self::ImageError(e)
  }
}

impl core::fmt::Display for ConversionError {
  fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
    match self {
      Self::P10Error(e) => write!(f, "{e}"),
      Self::DataError(e) => write!(f, "{e}"),
      Self::PixelDataDecodeError(e) => write!(f, "{e}"),
      Self::ImageError(e) => write!(f, "Image error: {e}"),
      Self::FrameNotPresent {
        frame_index,
        frame_count,
      } => write!(
        f,
        "Frame {frame_index} is not present, the pixel data has \
         {frame_count} frame(s)"
      ),
      Self::ImageModeNotSupported { details } => {
        write!(f, "Image mode not supported: {details}")
      }
    }
  }
}

impl Dcmb64Error for ConversionError {
  fn to_lines(&self, task_description: &str) -> Vec<String> {
    match self {
      Self::P10Error(e) => e.to_lines(task_description),
      Self::DataError(e) => e.to_lines(task_description),
      Self::PixelDataDecodeError(e) => e.to_lines(task_description),

      Self::ImageError(e) => vec![
        format!("Image error {task_description}"),
        "".to_string(),
        format!("  Error: {e}"),
      ],

      Self::FrameNotPresent {
        frame_index,
        frame_count,
      } => vec![
        format!("Conversion error {task_description}"),
        "".to_string(),
        format!("  Error: {}", self.name()),
        format!("  Frame index: {frame_index}"),
        format!("  Frame count: {frame_count}"),
      ],

      Self::ImageModeNotSupported { details } => vec![
        format!("Conversion error {task_description}"),
        "".to_string(),
        format!("  Error: {}", self.name()),
        format!("  Details: {details}"),
      ],
    }
  }
}

/// Reads a DICOM P10 file and converts its pixel data to a base64-encoded
/// JPEG image.
///
pub fn convert_file<P: AsRef<Path>>(
  filename: P,
  config: &ConversionConfig,
) -> Result<String, ConversionError> {
  let data_set = dcmb64_p10::read_file(filename)?;

  convert_data_set(&data_set, config)
}

/// Converts the pixel data in a data set to a base64-encoded JPEG image.
///
pub fn convert_data_set(
  data_set: &DataSet,
  config: &ConversionConfig,
) -> Result<String, ConversionError> {
  let pixel_array = decode_pixel_array(data_set, config)?;
  let image = to_photographic_image(&pixel_array)?;
  let jpeg = encode_jpeg(&image, config.jpeg_quality)?;

  log::debug!(
    "Encoded {}x{} {} JPEG of {} bytes",
    image.width(),
    image.height(),
    photographic_color_mode(&image),
    jpeg.len()
  );

  Ok(encode_base64(&jpeg))
}

/// Decodes the configured frame of pixel data in a data set.
///
/// The transfer syntax is taken from the *'(0002,0010) Transfer Syntax UID'*
/// data element. When it's absent the data is assumed to be 'Implicit VR
/// Little Endian'.
///
pub fn decode_pixel_array(
  data_set: &DataSet,
  config: &ConversionConfig,
) -> Result<PixelArray, ConversionError> {
  let transfer_syntax = data_set_transfer_syntax(data_set)?;
  let image_pixel_module = data_set.get_image_pixel_module()?;
  let frames = data_set.get_pixel_data_frames()?;

  let frame_count = frames.len();
  let Some(frame) = frames.get(config.frame_index) else {
    return Err(ConversionError::FrameNotPresent {
      frame_index: config.frame_index,
      frame_count,
    });
  };

  log::debug!(
    "Decoding frame {} of {} in {}",
    frame.index(),
    frame_count,
    transfer_syntax
  );

  let pixel_array = dcmb64_pixel_data::decode_frame(
    frame,
    transfer_syntax,
    &image_pixel_module,
  )?;

  log::debug!("Decoded pixel array {pixel_array}");

  Ok(pixel_array)
}

fn data_set_transfer_syntax(
  data_set: &DataSet,
) -> Result<&'static TransferSyntax, DataError> {
  let tag = dictionary::TRANSFER_SYNTAX_UID.tag;

  if !data_set.has(tag) {
    return Ok(&transfer_syntax::IMPLICIT_VR_LITTLE_ENDIAN);
  }

  let uid = data_set.get_string(tag)?;

  TransferSyntax::from_uid(uid).map_err(|_| {
    DataError::new_value_invalid(format!(
      "Transfer syntax '{uid}' is not recognized"
    ))
    .with_tag(tag)
  })
}

/// Converts a pixel array into an 8-bit image that can be encoded as a JPEG.
///
/// Single channel data becomes an 8-bit grayscale image. 8-bit data is used
/// as is, and wider or signed data has each sample clamped to 0-255. 8-bit
/// RGB data becomes an RGB image. 16-bit RGB data is not supported.
///
pub fn to_photographic_image(
  pixel_array: &PixelArray,
) -> Result<DynamicImage, ConversionError> {
  let width = u32::from(pixel_array.width());
  let height = u32::from(pixel_array.height());

  let grayscale = |pixels: Vec<u8>| {
    GrayImage::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8)
  };

  let image = match pixel_array.data() {
    PixelArrayData::U8(data) => grayscale(data.clone()),

    PixelArrayData::I8(data) => {
      grayscale(data.iter().map(|p| (*p).max(0) as u8).collect())
    }

    PixelArrayData::U16(data) => {
      grayscale(data.iter().map(|p| (*p).min(255) as u8).collect())
    }

    PixelArrayData::I16(data) => {
      grayscale(data.iter().map(|p| (*p).clamp(0, 255) as u8).collect())
    }

    PixelArrayData::U32(data) => {
      grayscale(data.iter().map(|p| (*p).min(255) as u8).collect())
    }

    PixelArrayData::I32(data) => {
      grayscale(data.iter().map(|p| (*p).clamp(0, 255) as u8).collect())
    }

    PixelArrayData::Rgb8(data) => {
      RgbImage::from_raw(width, height, data.clone())
        .map(DynamicImage::ImageRgb8)
    }

    PixelArrayData::Rgb16(_) => {
      return Err(ConversionError::ImageModeNotSupported {
        details: "16-bit RGB pixel data can't be encoded as a JPEG"
          .to_string(),
      });
    }
  };

  image.ok_or(ConversionError::PixelDataDecodeError(
    PixelDataDecodeError::ImageCreationFailed(
      "Pixel array dimensions do not match its data",
    ),
  ))
}

/// Returns whether an image produced by [`to_photographic_image()`] is
/// grayscale or RGB.
///
pub fn photographic_color_mode(image: &DynamicImage) -> ColorMode {
  if image.color().has_color() {
    ColorMode::Rgb
  } else {
    ColorMode::Grayscale
  }
}

/// Encodes an image as a baseline JPEG in memory with the given quality.
///
pub fn encode_jpeg(
  image: &DynamicImage,
  quality: u8,
) -> Result<Vec<u8>, ConversionError> {
  let mut jpeg = vec![];

  JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100)).encode(
    image.as_bytes(),
    image.width(),
    image.height(),
    image.color().into(),
  )?;

  Ok(jpeg)
}

/// Encodes bytes as standard base64 with padding and no line breaks.
///
pub fn encode_base64(bytes: &[u8]) -> String {
  BASE64_STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
  use base64::Engine as _;
  use dcmb64_core::{DataElementValue, ValueRepresentation};
  use image::ImageFormat;

  use super::*;

  fn pixel_array(width: u16, height: u16, data: PixelArrayData) -> PixelArray {
    PixelArray::new(width, height, data).unwrap()
  }

  fn data_set(
    photometric_interpretation: &str,
    samples_per_pixel: u16,
    bits_allocated: u16,
    pixel_representation: u16,
    pixel_data: Vec<u8>,
  ) -> DataSet {
    let mut data_set = DataSet::new();

    for (tag, value) in [
      (dictionary::SAMPLES_PER_PIXEL.tag, samples_per_pixel),
      (dictionary::ROWS.tag, 2),
      (dictionary::COLUMNS.tag, 2),
      (dictionary::BITS_ALLOCATED.tag, bits_allocated),
      (dictionary::BITS_STORED.tag, bits_allocated),
      (dictionary::PIXEL_REPRESENTATION.tag, pixel_representation),
    ] {
      data_set.insert(tag, DataElementValue::new_unsigned_short(&[value]));
    }

    data_set.insert(
      dictionary::PHOTOMETRIC_INTERPRETATION.tag,
      DataElementValue::new_code_string(photometric_interpretation),
    );
    data_set.insert(
      dictionary::PIXEL_DATA.tag,
      DataElementValue::new_binary(
        ValueRepresentation::OtherByteString,
        pixel_data,
      ),
    );

    data_set
  }

  fn decode_base64_jpeg(base64: &str) -> DynamicImage {
    let jpeg = BASE64_STANDARD.decode(base64).unwrap();

    image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg).unwrap()
  }

  #[test]
  fn grayscale_values_are_clamped() {
    let image = to_photographic_image(&pixel_array(
      4,
      1,
      PixelArrayData::I16(vec![-300, 0, 100, 4000]),
    ))
    .unwrap();
    assert_eq!(image.as_luma8().unwrap().as_raw(), &[0, 0, 100, 255]);

    let image = to_photographic_image(&pixel_array(
      3,
      1,
      PixelArrayData::U16(vec![255, 256, 65535]),
    ))
    .unwrap();
    assert_eq!(image.as_luma8().unwrap().as_raw(), &[255, 255, 255]);

    let image = to_photographic_image(&pixel_array(
      2,
      1,
      PixelArrayData::I8(vec![-128, 127]),
    ))
    .unwrap();
    assert_eq!(image.as_luma8().unwrap().as_raw(), &[0, 127]);

    let image = to_photographic_image(&pixel_array(
      2,
      1,
      PixelArrayData::I32(vec![i32::MIN, 70_000]),
    ))
    .unwrap();
    assert_eq!(image.as_luma8().unwrap().as_raw(), &[0, 255]);
  }

  #[test]
  fn eight_bit_data_is_unchanged() {
    let image = to_photographic_image(&pixel_array(
      2,
      1,
      PixelArrayData::U8(vec![7, 250]),
    ))
    .unwrap();
    assert_eq!(image.as_luma8().unwrap().as_raw(), &[7, 250]);
    assert_eq!(photographic_color_mode(&image), ColorMode::Grayscale);

    let image = to_photographic_image(&pixel_array(
      1,
      1,
      PixelArrayData::Rgb8(vec![1, 2, 3]),
    ))
    .unwrap();
    assert_eq!(image.as_rgb8().unwrap().as_raw(), &[1, 2, 3]);
    assert_eq!(photographic_color_mode(&image), ColorMode::Rgb);
  }

  #[test]
  fn sixteen_bit_rgb_is_not_supported() {
    assert!(matches!(
      to_photographic_image(&pixel_array(
        1,
        1,
        PixelArrayData::Rgb16(vec![1, 2, 3])
      )),
      Err(ConversionError::ImageModeNotSupported { .. })
    ));
  }

  #[test]
  fn encode_base64_uses_standard_alphabet() {
    assert_eq!(encode_base64(&[]), "");
    assert_eq!(encode_base64(&[0xFB, 0xFF]), "+/8=");
  }

  #[test]
  fn convert_grayscale_data_set() {
    let data_set = data_set("MONOCHROME2", 1, 8, 0, vec![0, 64, 128, 255]);

    let base64 =
      convert_data_set(&data_set, &ConversionConfig::default()).unwrap();

    assert!(!base64.contains('\n'));

    let image = decode_base64_jpeg(&base64);
    assert_eq!((image.width(), image.height()), (2, 2));
    assert_eq!(photographic_color_mode(&image), ColorMode::Grayscale);
  }

  #[test]
  fn convert_signed_16_bit_data_set() {
    let pixel_data = [-5i16, 10, 200, 1000]
      .iter()
      .flat_map(|p| p.to_le_bytes())
      .collect();
    let data_set = data_set("MONOCHROME2", 1, 16, 1, pixel_data);

    let pixel_array =
      decode_pixel_array(&data_set, &ConversionConfig::default()).unwrap();
    let image = to_photographic_image(&pixel_array).unwrap();

    assert_eq!(image.as_luma8().unwrap().as_raw(), &[0, 10, 200, 255]);
  }

  #[test]
  fn convert_rgb_data_set() {
    let data_set = data_set("RGB", 3, 8, 0, vec![255, 0, 0].repeat(4));

    let base64 =
      convert_data_set(&data_set, &ConversionConfig::default()).unwrap();

    let image = decode_base64_jpeg(&base64);
    assert_eq!(photographic_color_mode(&image), ColorMode::Rgb);

    let pixel = image.as_rgb8().unwrap().get_pixel(0, 0);
    assert!(pixel[0] > 200 && pixel[1] < 60 && pixel[2] < 60);
  }

  #[test]
  fn conversion_is_deterministic() {
    let data_set = data_set("MONOCHROME2", 1, 8, 0, vec![10, 20, 30, 40]);
    let config = ConversionConfig::default().jpeg_quality(90);

    assert_eq!(
      convert_data_set(&data_set, &config).unwrap(),
      convert_data_set(&data_set, &config).unwrap()
    );
  }

  #[test]
  fn frame_index_out_of_range() {
    let data_set = data_set("MONOCHROME2", 1, 8, 0, vec![0; 4]);

    assert!(matches!(
      convert_data_set(&data_set, &ConversionConfig::default().frame_index(1)),
      Err(ConversionError::FrameNotPresent {
        frame_index: 1,
        frame_count: 1,
      })
    ));
  }

  #[test]
  fn missing_pixel_data() {
    let full_data_set = data_set("MONOCHROME2", 1, 8, 0, vec![0; 4]);
    let data_set: DataSet = full_data_set
      .tags()
      .into_iter()
      .filter(|tag| *tag != dictionary::PIXEL_DATA.tag)
      .map(|tag| (tag, full_data_set.get_value(tag).unwrap().clone()))
      .collect();

    let error =
      convert_data_set(&data_set, &ConversionConfig::default()).unwrap_err();

    assert!(matches!(error, ConversionError::DataError(ref e)
      if e.is_tag_not_present()));
  }

  #[test]
  fn unrecognized_transfer_syntax() {
    let mut data_set = data_set("MONOCHROME2", 1, 8, 0, vec![0; 4]);
    data_set.insert(
      dictionary::TRANSFER_SYNTAX_UID.tag,
      DataElementValue::new_unique_identifier("1.2.3.4"),
    );

    assert!(matches!(
      convert_data_set(&data_set, &ConversionConfig::default()),
      Err(ConversionError::DataError(_))
    ));
  }

  #[test]
  fn empty_data_set() {
    assert!(
      convert_data_set(&DataSet::new(), &ConversionConfig::default()).is_err()
    );
  }

  #[test]
  fn jpeg_quality_is_clamped() {
    assert_eq!(ConversionConfig::default().jpeg_quality(0).jpeg_quality, 1);
    assert_eq!(
      ConversionConfig::default().jpeg_quality(200).jpeg_quality,
      100
    );
  }
}
