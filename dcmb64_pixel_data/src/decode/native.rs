use byteorder::{ByteOrder, LittleEndian};

use crate::{
  PixelArray, PixelArrayData, PixelDataDecodeError,
  decode::ybr_to_rgb,
  image_pixel_module::{
    BitsAllocated, ImagePixelModule, PhotometricInterpretation,
    PlanarConfiguration, SamplesPerPixel,
  },
};

/// Decodes native pixel data using the planar configuration specified by the
/// Image Pixel Module.
///
pub fn decode(
  image_pixel_module: &ImagePixelModule,
  data: &[u8],
  data_bit_offset: usize,
) -> Result<PixelArray, PixelDataDecodeError> {
  let planar_configuration = match image_pixel_module.samples_per_pixel() {
    SamplesPerPixel::One => PlanarConfiguration::Interleaved,
    SamplesPerPixel::Three {
      planar_configuration,
    } => planar_configuration,
  };

  decode_with_planar_configuration(
    image_pixel_module,
    data,
    data_bit_offset,
    planar_configuration,
  )
}

/// Decodes native pixel data whose samples are interleaved regardless of the
/// planar configuration specified by the Image Pixel Module.
///
pub fn decode_interleaved(
  image_pixel_module: &ImagePixelModule,
  data: &[u8],
) -> Result<PixelArray, PixelDataDecodeError> {
  decode_with_planar_configuration(
    image_pixel_module,
    data,
    0,
    PlanarConfiguration::Interleaved,
  )
}

fn decode_with_planar_configuration(
  image_pixel_module: &ImagePixelModule,
  data: &[u8],
  data_bit_offset: usize,
  planar_configuration: PlanarConfiguration,
) -> Result<PixelArray, PixelDataDecodeError> {
  let required_bits =
    data_bit_offset as u64 + image_pixel_module.frame_size_in_bits();

  if (data.len() as u64) * 8 < required_bits {
    return Err(PixelDataDecodeError::DataInvalid {
      details: format!(
        "Pixel data has {} bytes but {} bytes are required",
        data.len(),
        required_bits.div_ceil(8)
      ),
    });
  }

  let pixels = if image_pixel_module.is_single_channel() {
    decode_single_channel(image_pixel_module, data, data_bit_offset)
  } else {
    decode_color(image_pixel_module, data, planar_configuration)?
  };

  PixelArray::new(
    image_pixel_module.columns(),
    image_pixel_module.rows(),
    pixels,
  )
  .map_err(PixelDataDecodeError::ImageCreationFailed)
}

/// Decodes single channel samples. Unused high bits are masked off unsigned
/// samples, and signed samples are sign extended from their high bit.
///
fn decode_single_channel(
  image_pixel_module: &ImagePixelModule,
  data: &[u8],
  data_bit_offset: usize,
) -> PixelArrayData {
  let pixel_count = image_pixel_module.pixel_count();
  let bits_stored = u32::from(image_pixel_module.bits_stored());
  let is_signed = image_pixel_module.pixel_representation().is_signed();

  match image_pixel_module.bits_allocated() {
    BitsAllocated::One => PixelArrayData::U8(
      (0..pixel_count)
        .map(|i| {
          let bit = data_bit_offset + i;
          (data[bit / 8] >> (bit % 8)) & 1
        })
        .collect(),
    ),

    BitsAllocated::Eight => {
      let shift = 8 - bits_stored;
      let data = &data[..pixel_count];

      if is_signed {
        let pixels: &[i8] = bytemuck::cast_slice(data);
        PixelArrayData::I8(
          pixels.iter().map(|p| (p << shift) >> shift).collect(),
        )
      } else {
        PixelArrayData::U8(
          data.iter().map(|p| p & (u8::MAX >> shift)).collect(),
        )
      }
    }

    BitsAllocated::Sixteen => {
      let shift = 16 - bits_stored;
      let mut pixels = vec![0u16; pixel_count];
      LittleEndian::read_u16_into(&data[..pixel_count * 2], &mut pixels);

      if is_signed {
        PixelArrayData::I16(
          pixels
            .into_iter()
            .map(|p| ((p as i16) << shift) >> shift)
            .collect(),
        )
      } else {
        for pixel in pixels.iter_mut() {
          *pixel &= u16::MAX >> shift;
        }

        PixelArrayData::U16(pixels)
      }
    }

    BitsAllocated::ThirtyTwo => {
      let shift = 32 - bits_stored;
      let mut pixels = vec![0u32; pixel_count];
      LittleEndian::read_u32_into(&data[..pixel_count * 4], &mut pixels);

      if is_signed {
        PixelArrayData::I32(
          pixels
            .into_iter()
            .map(|p| ((p as i32) << shift) >> shift)
            .collect(),
        )
      } else {
        for pixel in pixels.iter_mut() {
          *pixel &= u32::MAX >> shift;
        }

        PixelArrayData::U32(pixels)
      }
    }
  }
}

/// Decodes three-sample color data to interleaved RGB, converting from YBR
/// where required.
///
fn decode_color(
  image_pixel_module: &ImagePixelModule,
  data: &[u8],
  planar_configuration: PlanarConfiguration,
) -> Result<PixelArrayData, PixelDataDecodeError> {
  if image_pixel_module.pixel_representation().is_signed() {
    return Err(PixelDataDecodeError::ImagePixelModuleNotSupported {
      details: "Signed color pixel data is not supported".to_string(),
    });
  }

  let pixel_count = image_pixel_module.pixel_count();
  let bits_stored = image_pixel_module.bits_stored();
  let photometric_interpretation =
    image_pixel_module.photometric_interpretation();
  let is_ybr_422 =
    photometric_interpretation == PhotometricInterpretation::YbrFull422;

  if is_ybr_422 && pixel_count % 2 != 0 {
    return Err(PixelDataDecodeError::ImagePixelModuleNotSupported {
      details: "YBR_FULL_422 pixel data must have an even number of pixels"
        .to_string(),
    });
  }

  let sample_count = if is_ybr_422 {
    pixel_count * 2
  } else {
    pixel_count * 3
  };

  match image_pixel_module.bits_allocated() {
    BitsAllocated::Eight => {
      let samples = &data[..sample_count];

      let mut pixels = if is_ybr_422 {
        expand_ybr_422(samples, pixel_count)
      } else {
        interleave(samples, pixel_count, planar_configuration)
      };

      if photometric_interpretation.is_ybr() {
        ybr_to_rgb::convert_u8(&mut pixels, bits_stored);
      }

      Ok(PixelArrayData::Rgb8(pixels))
    }

    BitsAllocated::Sixteen => {
      let mut samples = vec![0u16; sample_count];
      LittleEndian::read_u16_into(&data[..sample_count * 2], &mut samples);

      let mut pixels = if is_ybr_422 {
        expand_ybr_422(&samples, pixel_count)
      } else {
        interleave(&samples, pixel_count, planar_configuration)
      };

      if photometric_interpretation.is_ybr() {
        ybr_to_rgb::convert_u16(&mut pixels, bits_stored);
      }

      Ok(PixelArrayData::Rgb16(pixels))
    }

    bits_allocated => {
      Err(PixelDataDecodeError::ImagePixelModuleNotSupported {
        details: format!(
          "Color pixel data with bits allocated of '{}' is not supported",
          u8::from(bits_allocated)
        ),
      })
    }
  }
}

/// Returns samples in color-by-pixel order.
///
fn interleave<T: Copy>(
  samples: &[T],
  pixel_count: usize,
  planar_configuration: PlanarConfiguration,
) -> Vec<T> {
  match planar_configuration {
    PlanarConfiguration::Interleaved => samples[..pixel_count * 3].to_vec(),

    PlanarConfiguration::Separate => (0..pixel_count)
      .flat_map(|i| {
        [
          samples[i],
          samples[pixel_count + i],
          samples[pixel_count * 2 + i],
        ]
      })
      .collect(),
  }
}

/// Expands YBR_FULL_422 samples, stored as Y1 Y2 CB CR for each pair of
/// pixels, into full YBR samples for every pixel.
///
fn expand_ybr_422<T: Copy>(samples: &[T], pixel_count: usize) -> Vec<T> {
  (0..pixel_count)
    .flat_map(|i| {
      let pair = &samples[(i / 2) * 4..(i / 2) * 4 + 4];
      [pair[i % 2], pair[2], pair[3]]
    })
    .collect()
}
