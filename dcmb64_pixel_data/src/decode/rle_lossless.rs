use byteorder::ByteOrder;

use crate::{
  PixelArray, PixelDataDecodeError,
  decode::native,
  image_pixel_module::{
    BitsAllocated, ImagePixelModule, PhotometricInterpretation,
  },
};

/// Decodes RLE Lossless pixel data. Each segment holds one byte plane of one
/// sample, ordered from the most significant byte, and the decoded planes
/// are recombined into interleaved little endian native pixel data.
///
pub fn decode(
  image_pixel_module: &ImagePixelModule,
  data: &[u8],
) -> Result<PixelArray, PixelDataDecodeError> {
  if image_pixel_module.photometric_interpretation()
    == PhotometricInterpretation::YbrFull422
  {
    return Err(PixelDataDecodeError::ImagePixelModuleNotSupported {
      details: "Photometric interpretation 'YBR_FULL_422' is not supported \
                for RLE Lossless"
        .to_string(),
    });
  }

  let pixel_count = image_pixel_module.pixel_count();
  let samples_per_pixel =
    usize::from(u8::from(image_pixel_module.samples_per_pixel()));

  if image_pixel_module.bits_allocated() == BitsAllocated::One {
    let segments =
      decode_rle_segments(data, image_pixel_module.frame_size_in_bytes())?;

    return match segments.as_slice() {
      [segment] => native::decode_interleaved(image_pixel_module, segment),
      _ => Err(segment_count_error(segments.len(), 1)),
    };
  }

  let bytes_per_sample =
    usize::from(u8::from(image_pixel_module.bits_allocated())) / 8;
  let expected_segment_count = samples_per_pixel * bytes_per_sample;

  let segments = decode_rle_segments(data, pixel_count)?;
  if segments.len() != expected_segment_count {
    return Err(segment_count_error(segments.len(), expected_segment_count));
  }

  let mut native_data = vec![0u8; pixel_count * expected_segment_count];

  for (i, segment) in segments.iter().enumerate() {
    let sample = i / bytes_per_sample;
    let byte = bytes_per_sample - 1 - (i % bytes_per_sample);

    for (pixel, value) in segment.iter().enumerate() {
      native_data
        [(pixel * samples_per_pixel + sample) * bytes_per_sample + byte] =
        *value;
    }
  }

  native::decode_interleaved(image_pixel_module, &native_data)
}

fn segment_count_error(actual: usize, expected: usize) -> PixelDataDecodeError {
  PixelDataDecodeError::DataInvalid {
    details: format!(
      "RLE Lossless data has {actual} segments but {expected} were expected"
    ),
  }
}

/// Reads the RLE Lossless header and decodes every segment it lists.
///
fn decode_rle_segments(
  data: &[u8],
  expected_length: usize,
) -> Result<Vec<Vec<u8>>, PixelDataDecodeError> {
  // Check there is a complete RLE Lossless header
  if data.len() < 64 {
    return Err(PixelDataDecodeError::DataInvalid {
      details: "RLE Lossless header is incomplete".to_string(),
    });
  }

  let number_of_segments = byteorder::LittleEndian::read_u32(data) as usize;
  if number_of_segments == 0 || number_of_segments > 15 {
    return Err(PixelDataDecodeError::DataInvalid {
      details: format!(
        "RLE Lossless data segment count '{number_of_segments}' is invalid"
      ),
    });
  }

  let mut segment_offsets = vec![0u32; number_of_segments];
  byteorder::LittleEndian::read_u32_into(
    &data[4..(4 + number_of_segments * 4)],
    &mut segment_offsets,
  );

  log::trace!("Decoding {number_of_segments} RLE Lossless segments");

  let mut segments = Vec::with_capacity(number_of_segments);

  for i in 0..number_of_segments {
    let segment_offset = segment_offsets[i] as usize;

    let next_segment_offset = if i + 1 == number_of_segments {
      data.len()
    } else {
      segment_offsets[i + 1] as usize
    };

    let Some(rle_data) = data.get(segment_offset..next_segment_offset) else {
      return Err(PixelDataDecodeError::DataInvalid {
        details: format!(
          "RLE Lossless data segment {i}'s bounds {segment_offset}-\
           {next_segment_offset} are invalid"
        ),
      });
    };

    let segment =
      decode_rle_segment(rle_data, expected_length).map_err(|_| {
        PixelDataDecodeError::DataInvalid {
          details: format!("RLE Lossless data segment {i} is invalid"),
        }
      })?;

    segments.push(segment);
  }

  Ok(segments)
}

/// Decodes a single PackBits-encoded segment. Decoding stops once the
/// expected length is reached, which skips any trailing padding.
///
fn decode_rle_segment(
  mut rle_data: &[u8],
  expected_length: usize,
) -> Result<Vec<u8>, ()> {
  let mut result = Vec::with_capacity(expected_length);

  while result.len() < expected_length {
    let (&n, rest) = rle_data.split_first().ok_or(())?;

    match n {
      // The next N+1 bytes are output literally
      0..=127 => {
        let length = usize::from(n) + 1;
        let literal = rest.get(..length).ok_or(())?;

        result.extend_from_slice(literal);
        rle_data = &rest[length..];
      }

      // No-op
      128 => rle_data = rest,

      // The next byte is repeated 257 - N times
      _ => {
        let repeated_byte = *rest.first().ok_or(())?;

        result.resize(result.len() + 257 - usize::from(n), repeated_byte);
        rle_data = &rest[1..];
      }
    }
  }

  result.truncate(expected_length);

  Ok(result)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::PixelArrayData;
  use crate::image_pixel_module::tests::image_pixel_module_data_set;

  /// Builds RLE Lossless frame data from already-encoded segments.
  ///
  fn rle_frame(segments: &[&[u8]]) -> Vec<u8> {
    let mut header = vec![0u8; 64];
    header[0..4].copy_from_slice(&(segments.len() as u32).to_le_bytes());

    let mut offset = 64u32;
    let mut body = vec![];

    for (i, segment) in segments.iter().enumerate() {
      header[4 + i * 4..8 + i * 4].copy_from_slice(&offset.to_le_bytes());
      body.extend_from_slice(segment);
      offset += segment.len() as u32;
    }

    header.extend(body);
    header
  }

  #[test]
  fn decode_segment() {
    assert_eq!(
      decode_rle_segment(&[2, 1, 2, 3, 0xFE, 9, 128, 0, 4], 7),
      Ok(vec![1, 2, 3, 9, 9, 9, 4])
    );

    // Trailing padding after the expected length is ignored
    assert_eq!(decode_rle_segment(&[0xFF, 5, 0], 2), Ok(vec![5, 5]));

    assert_eq!(decode_rle_segment(&[3, 1, 2], 4), Err(()));
    assert_eq!(decode_rle_segment(&[0xFD], 4), Err(()));
  }

  #[test]
  fn decode_u16_monochrome() {
    let module = ImagePixelModule::from_data_set(
      &image_pixel_module_data_set("MONOCHROME2", 1, 1, 3, 16, 16, 0),
    )
    .unwrap();

    // High bytes then low bytes
    let data = rle_frame(&[&[2, 0x01, 0x00, 0xFF], &[0xFE, 0x02]]);

    assert_eq!(
      decode(&module, &data).unwrap().into_data(),
      PixelArrayData::U16(vec![0x0102, 0x0002, 0xFF02])
    );
  }

  #[test]
  fn decode_rgb() {
    let module = ImagePixelModule::from_data_set(
      &image_pixel_module_data_set("RGB", 3, 1, 2, 8, 8, 0),
    )
    .unwrap();

    let data = rle_frame(&[&[0xFF, 10], &[1, 20, 21], &[0xFF, 30]]);

    assert_eq!(
      decode(&module, &data).unwrap().into_data(),
      PixelArrayData::Rgb8(vec![10, 20, 30, 10, 21, 30])
    );
  }

  #[test]
  fn decode_wrong_segment_count() {
    let module = ImagePixelModule::from_data_set(
      &image_pixel_module_data_set("MONOCHROME2", 1, 1, 2, 16, 16, 0),
    )
    .unwrap();

    assert!(matches!(
      decode(&module, &rle_frame(&[&[0xFF, 0]])),
      Err(PixelDataDecodeError::DataInvalid { .. })
    ));
  }

  #[test]
  fn decode_incomplete_header() {
    let module = ImagePixelModule::from_data_set(
      &image_pixel_module_data_set("MONOCHROME2", 1, 1, 1, 8, 8, 0),
    )
    .unwrap();

    assert!(decode(&module, &[1, 0, 0, 0]).is_err());
  }
}
