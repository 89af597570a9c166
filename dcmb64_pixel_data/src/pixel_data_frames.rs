//! Splits the value of the *'(7FE0,0010) Pixel Data'* data element into
//! individual frames.

use byteorder::ByteOrder;

use dcmb64_core::{DataElementValue, DataError, dictionary};

use crate::{BitsAllocated, ImagePixelModule, PixelDataFrame};

/// Splits native pixel data into frames using the frame size specified by the
/// Image Pixel Module. Frames of 1-bit pixel data may not start on a byte
/// boundary, in which case the frame's bit offset is set.
///
pub fn native_frames(
  data: &[u8],
  image_pixel_module: &ImagePixelModule,
) -> Result<Vec<PixelDataFrame>, DataError> {
  let number_of_frames = image_pixel_module.number_of_frames();
  let frame_size_in_bits = image_pixel_module.frame_size_in_bits();

  let required_bytes = frame_size_in_bits
    .checked_mul(number_of_frames as u64)
    .map(|bits| bits.div_ceil(8))
    .ok_or_else(|| {
      DataError::new_value_invalid(format!(
        "Pixel data size of {number_of_frames} frames of {frame_size_in_bits} \
         bits each is too large"
      ))
      .with_tag(dictionary::PIXEL_DATA.tag)
    })?;

  if (data.len() as u64) < required_bytes {
    return Err(
      DataError::new_value_invalid(format!(
        "Pixel data has {} bytes but {} frames require {} bytes",
        data.len(),
        number_of_frames,
        required_bytes
      ))
      .with_tag(dictionary::PIXEL_DATA.tag),
    );
  }

  let frames = (0..number_of_frames)
    .map(|index| {
      if image_pixel_module.bits_allocated() == BitsAllocated::One {
        let start_bit = index as u64 * frame_size_in_bits;
        let start = (start_bit / 8) as usize;
        let end = (start_bit + frame_size_in_bits).div_ceil(8) as usize;

        let mut frame = PixelDataFrame::new(index, data[start..end].to_vec());
        frame.set_bit_offset((start_bit % 8) as usize);
        frame
      } else {
        let frame_size = image_pixel_module.frame_size_in_bytes();
        let start = index * frame_size;

        PixelDataFrame::new(index, data[start..start + frame_size].to_vec())
      }
    })
    .collect();

  Ok(frames)
}

/// Splits encapsulated pixel data items into frames. The first item is the
/// Basic Offset Table, and the remaining items are fragments.
///
/// Fragments are assigned to frames as follows:
///
/// 1. A single frame is made up of all fragments.
/// 2. A Basic Offset Table, when present, specifies the first fragment of
///    each frame.
/// 3. Otherwise there must be exactly one fragment per frame.
///
pub fn encapsulated_frames(
  items: &[Vec<u8>],
  number_of_frames: usize,
) -> Result<Vec<PixelDataFrame>, DataError> {
  let invalid = |details: String| {
    DataError::new_value_invalid(details).with_tag(dictionary::PIXEL_DATA.tag)
  };

  let Some((basic_offset_table, fragments)) = items.split_first() else {
    return Err(invalid(
      "Encapsulated pixel data has no Basic Offset Table item".to_string(),
    ));
  };

  if number_of_frames == 1 {
    return Ok(vec![PixelDataFrame::new(0, fragments.concat())]);
  }

  if basic_offset_table.is_empty() {
    if fragments.len() != number_of_frames {
      return Err(invalid(format!(
        "Encapsulated pixel data has {} fragments for {} frames and no Basic \
         Offset Table",
        fragments.len(),
        number_of_frames
      )));
    }

    return Ok(
      fragments
        .iter()
        .enumerate()
        .map(|(index, fragment)| PixelDataFrame::new(index, fragment.clone()))
        .collect(),
    );
  }

  if basic_offset_table.len() % 4 != 0 {
    return Err(invalid(
      "Basic Offset Table length is not a multiple of 4".to_string(),
    ));
  }

  let mut offsets = vec![0u32; basic_offset_table.len() / 4];
  byteorder::LittleEndian::read_u32_into(basic_offset_table, &mut offsets);

  if offsets.len() != number_of_frames {
    return Err(invalid(format!(
      "Basic Offset Table has {} offsets for {} frames",
      offsets.len(),
      number_of_frames
    )));
  }

  // The offset of each fragment's item header relative to the first
  // fragment's item header
  let mut fragment_offsets = Vec::with_capacity(fragments.len());
  let mut offset = 0u64;
  for fragment in fragments {
    fragment_offsets.push(offset);
    offset += 8 + fragment.len() as u64;
  }

  let first_fragments = offsets
    .iter()
    .map(|offset| {
      fragment_offsets
        .iter()
        .position(|o| *o == u64::from(*offset))
        .ok_or_else(|| {
          invalid(format!(
            "Basic Offset Table offset {offset} does not point to a fragment"
          ))
        })
    })
    .collect::<Result<Vec<_>, _>>()?;

  if first_fragments[0] != 0 || !first_fragments.is_sorted_by(|a, b| a < b) {
    return Err(invalid(
      "Basic Offset Table offsets are not in ascending order from zero"
        .to_string(),
    ));
  }

  let frames = first_fragments
    .iter()
    .enumerate()
    .map(|(index, start)| {
      let end = first_fragments
        .get(index + 1)
        .copied()
        .unwrap_or(fragments.len());

      PixelDataFrame::new(index, fragments[*start..end].concat())
    })
    .collect();

  Ok(frames)
}

/// Returns the frames held in a pixel data value.
///
pub fn frames(
  value: &DataElementValue,
  image_pixel_module: &ImagePixelModule,
) -> Result<Vec<PixelDataFrame>, DataError> {
  let frames = if let Ok(items) = value.encapsulated_pixel_data() {
    encapsulated_frames(items, image_pixel_module.number_of_frames())?
  } else {
    let bytes = value.bytes().map_err(|_| {
      DataError::new_value_invalid(
        "Pixel data is not a binary value".to_string(),
      )
      .with_tag(dictionary::PIXEL_DATA.tag)
    })?;

    native_frames(bytes, image_pixel_module)?
  };

  log::debug!("Found {} frame(s) of pixel data", frames.len());

  Ok(frames)
}

#[cfg(test)]
mod tests {
  use dcmb64_core::{DataElementValue, ValueRepresentation};

  use super::*;
  use crate::image_pixel_module::tests::image_pixel_module_data_set;

  fn module(number_of_frames: i32, bits_allocated: u16) -> ImagePixelModule {
    let mut data_set = image_pixel_module_data_set(
      "MONOCHROME2",
      1,
      1,
      3,
      bits_allocated,
      bits_allocated,
      0,
    );
    data_set.insert(
      dictionary::NUMBER_OF_FRAMES.tag,
      DataElementValue::new_integer_string(&[number_of_frames]),
    );

    ImagePixelModule::from_data_set(&data_set).unwrap()
  }

  #[test]
  fn split_native_frames() {
    let frames = native_frames(&[1, 2, 3, 4, 5, 6, 0], &module(2, 8)).unwrap();

    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].data(), &[1, 2, 3]);
    assert_eq!(frames[1].data(), &[4, 5, 6]);
    assert_eq!(frames[1].index(), 1);
  }

  #[test]
  fn split_native_bitmap_frames() {
    let frames =
      native_frames(&[0b1010_1101, 0b0000_0011], &module(3, 1)).unwrap();

    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0].data(), &[0b1010_1101]);
    assert_eq!(frames[1].data(), &[0b1010_1101]);
    assert_eq!(frames[1].bit_offset(), 3);
    assert_eq!(frames[2].data(), &[0b1010_1101, 0b0000_0011]);
    assert_eq!(frames[2].bit_offset(), 6);
  }

  #[test]
  fn split_native_frames_data_too_short() {
    assert!(native_frames(&[1, 2, 3, 4, 5], &module(2, 8)).is_err());
  }

  #[test]
  fn split_native_frames_size_overflow() {
    let mut data_set =
      image_pixel_module_data_set("RGB", 3, 65535, 65535, 32, 32, 0);
    data_set.insert(
      dictionary::NUMBER_OF_FRAMES.tag,
      DataElementValue::new_integer_string(&[i32::MAX]),
    );
    let module = ImagePixelModule::from_data_set(&data_set).unwrap();

    assert!(native_frames(&[0; 16], &module).is_err());
  }

  #[test]
  fn frames_of_binary_and_encapsulated_values() {
    let native = DataElementValue::new_binary(
      ValueRepresentation::OtherByteString,
      vec![1, 2, 3],
    );
    assert_eq!(frames(&native, &module(1, 8)).unwrap().len(), 1);

    let encapsulated = DataElementValue::new_encapsulated_pixel_data(
      ValueRepresentation::OtherByteString,
      vec![vec![], vec![1], vec![2]],
    );
    assert_eq!(frames(&encapsulated, &module(2, 8)).unwrap().len(), 2);

    assert!(frames(&DataElementValue::new_sequence(1), &module(1, 8)).is_err());
  }

  #[test]
  fn split_single_encapsulated_frame() {
    let items = vec![vec![], vec![1, 2], vec![3]];

    let frames = encapsulated_frames(&items, 1).unwrap();

    assert_eq!(frames, vec![PixelDataFrame::new(0, vec![1, 2, 3])]);
  }

  #[test]
  fn split_encapsulated_frames_without_offset_table() {
    let items = vec![vec![], vec![1, 2], vec![3, 4]];

    let frames = encapsulated_frames(&items, 2).unwrap();

    assert_eq!(frames[0].data(), &[1, 2]);
    assert_eq!(frames[1].data(), &[3, 4]);

    assert!(encapsulated_frames(&items, 3).is_err());
  }

  #[test]
  fn split_encapsulated_frames_with_offset_table() {
    let mut basic_offset_table = vec![];
    basic_offset_table.extend_from_slice(&0u32.to_le_bytes());
    basic_offset_table.extend_from_slice(&20u32.to_le_bytes());

    let items = vec![basic_offset_table, vec![1, 2], vec![3, 4], vec![5, 6]];

    let frames = encapsulated_frames(&items, 2).unwrap();

    assert_eq!(frames[0].data(), &[1, 2, 3, 4]);
    assert_eq!(frames[1].data(), &[5, 6]);
  }

  #[test]
  fn split_encapsulated_frames_with_invalid_offset_table() {
    let mut basic_offset_table = vec![];
    basic_offset_table.extend_from_slice(&0u32.to_le_bytes());
    basic_offset_table.extend_from_slice(&7u32.to_le_bytes());

    let items = vec![basic_offset_table, vec![1, 2], vec![3, 4]];

    assert!(encapsulated_frames(&items, 2).is_err());
    assert!(encapsulated_frames(&[], 1).is_err());
  }
}
