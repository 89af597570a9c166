use image::{DynamicImage, ImageFormat};

use crate::{
  PixelArray, PixelArrayData, PixelDataDecodeError,
  image_pixel_module::{BitsAllocated, ImagePixelModule},
};

/// Decodes 8-bit JPEG Baseline pixel data using the `image` crate. The
/// decoder performs any YBR to RGB conversion, so color frames are returned
/// as RGB.
///
pub fn decode(
  image_pixel_module: &ImagePixelModule,
  data: &[u8],
) -> Result<PixelArray, PixelDataDecodeError> {
  if image_pixel_module.bits_allocated() != BitsAllocated::Eight {
    return Err(PixelDataDecodeError::ImagePixelModuleNotSupported {
      details: format!(
        "JPEG Baseline pixel data with bits allocated of '{}' is not \
         supported",
        u8::from(image_pixel_module.bits_allocated())
      ),
    });
  }

  let image = image::load_from_memory_with_format(data, ImageFormat::Jpeg)
    .map_err(|e| PixelDataDecodeError::DataInvalid {
      details: format!("Failed reading JPEG data with '{e}'"),
    })?;

  if image.width() != u32::from(image_pixel_module.columns())
    || image.height() != u32::from(image_pixel_module.rows())
  {
    return Err(PixelDataDecodeError::DataInvalid {
      details: format!(
        "JPEG pixel data has dimensions {}x{} but {}x{} was expected",
        image.width(),
        image.height(),
        image_pixel_module.columns(),
        image_pixel_module.rows()
      ),
    });
  }

  let data = match (image, image_pixel_module.is_single_channel()) {
    (DynamicImage::ImageLuma8(image), true) => {
      PixelArrayData::U8(image.into_raw())
    }

    (image, true) => PixelArrayData::U8(image.into_luma8().into_raw()),

    (image, false) => PixelArrayData::Rgb8(image.into_rgb8().into_raw()),
  };

  PixelArray::new(
    image_pixel_module.columns(),
    image_pixel_module.rows(),
    data,
  )
  .map_err(PixelDataDecodeError::ImageCreationFailed)
}

#[cfg(test)]
mod tests {
  use image::{GrayImage, RgbImage, codecs::jpeg::JpegEncoder};

  use super::*;
  use crate::image_pixel_module::tests::image_pixel_module_data_set;

  fn module(
    photometric_interpretation: &str,
    samples_per_pixel: u16,
  ) -> ImagePixelModule {
    ImagePixelModule::from_data_set(&image_pixel_module_data_set(
      photometric_interpretation,
      samples_per_pixel,
      4,
      8,
      8,
      8,
      0,
    ))
    .unwrap()
  }

  fn encode(image: &DynamicImage) -> Vec<u8> {
    let mut jpeg = vec![];
    JpegEncoder::new_with_quality(&mut jpeg, 100)
      .encode(
        image.as_bytes(),
        image.width(),
        image.height(),
        image.color().into(),
      )
      .unwrap();
    jpeg
  }

  #[test]
  fn decode_grayscale() {
    let jpeg = encode(&DynamicImage::ImageLuma8(GrayImage::from_pixel(
      8,
      4,
      image::Luma([200]),
    )));

    let array = decode(&module("MONOCHROME2", 1), &jpeg).unwrap();

    assert_eq!((array.width(), array.height()), (8, 4));
    let PixelArrayData::U8(pixels) = array.into_data() else {
      panic!("Expected single channel data");
    };
    assert!(pixels.iter().all(|p| p.abs_diff(200) <= 2));
  }

  #[test]
  fn decode_color() {
    let jpeg = encode(&DynamicImage::ImageRgb8(RgbImage::from_pixel(
      8,
      4,
      image::Rgb([0, 0, 255]),
    )));

    let array = decode(&module("YBR_FULL_422", 3), &jpeg).unwrap();

    let PixelArrayData::Rgb8(pixels) = array.into_data() else {
      panic!("Expected RGB data");
    };
    assert_eq!(pixels.len(), 8 * 4 * 3);
    assert!(pixels[2] > 240 && pixels[0] < 16);
  }

  #[test]
  fn decode_wrong_dimensions() {
    let jpeg = encode(&DynamicImage::ImageLuma8(GrayImage::new(2, 2)));

    assert!(matches!(
      decode(&module("MONOCHROME2", 1), &jpeg),
      Err(PixelDataDecodeError::DataInvalid { .. })
    ));
  }

  #[test]
  fn decode_invalid_data() {
    assert!(matches!(
      decode(&module("MONOCHROME2", 1), &[0xFF, 0xD8, 0x00]),
      Err(PixelDataDecodeError::DataInvalid { .. })
    ));
  }
}
