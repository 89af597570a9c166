//! A data element value that holds binary data for a specific VR, the
//! fragments of encapsulated pixel data, or the placeholder for a sequence.
//! Data element values are usually stored in a [`DataSet`](crate::DataSet)
//! which maps data element tags to data element values.

use byteorder::ByteOrder;

use crate::{DataError, ValueRepresentation};

/// A DICOM data element value that holds one of the following types of data:
///
/// 1. Binary value. Raw bytes for a specific VR. This is the most common
///    case. The data is always little endian, and is parsed into a more
///    usable type on request.
///
/// 2. Encapsulated pixel data value. The raw items of an encapsulated pixel
///    data sequence, the first of which is the Basic Offset Table.
///
/// 3. Sequence value. Sequence content is not needed to render pixel data, so
///    only the number of items is kept.
///
#[derive(Clone, Debug, PartialEq)]
pub enum DataElementValue {
  Binary {
    vr: ValueRepresentation,
    bytes: Vec<u8>,
  },
  EncapsulatedPixelData {
    vr: ValueRepresentation,
    items: Vec<Vec<u8>>,
  },
  Sequence {
    item_count: usize,
  },
}

impl DataElementValue {
  /// Creates a new binary value. The bytes must be little endian.
  ///
  pub fn new_binary(vr: ValueRepresentation, bytes: Vec<u8>) -> Self {
    Self::Binary { vr, bytes }
  }

  /// Creates a new encapsulated pixel data value. The first item is the Basic
  /// Offset Table, which may be empty.
  ///
  pub fn new_encapsulated_pixel_data(
    vr: ValueRepresentation,
    items: Vec<Vec<u8>>,
  ) -> Self {
    Self::EncapsulatedPixelData { vr, items }
  }

  /// Creates a new sequence placeholder value.
  ///
  pub fn new_sequence(item_count: usize) -> Self {
    Self::Sequence { item_count }
  }

  /// Creates a new `US` value holding the given integers.
  ///
  pub fn new_unsigned_short(values: &[u16]) -> Self {
    let mut bytes = vec![0u8; values.len() * 2];
    byteorder::LittleEndian::write_u16_into(values, &mut bytes);

    Self::new_binary(ValueRepresentation::UnsignedShort, bytes)
  }

  /// Creates a new `IS` value holding the given integers.
  ///
  pub fn new_integer_string(values: &[i32]) -> Self {
    let value = values
      .iter()
      .map(|i| i.to_string())
      .collect::<Vec<_>>()
      .join("\\");

    Self::new_string(ValueRepresentation::IntegerString, &value)
  }

  /// Creates a new `CS` value.
  ///
  pub fn new_code_string(value: &str) -> Self {
    Self::new_string(ValueRepresentation::CodeString, value)
  }

  /// Creates a new `UI` value.
  ///
  pub fn new_unique_identifier(value: &str) -> Self {
    Self::new_string(ValueRepresentation::UniqueIdentifier, value)
  }

  /// Creates a new string value, padding it to even length. `UI` values are
  /// padded with a NULL byte and all other string values with a space.
  ///
  fn new_string(vr: ValueRepresentation, value: &str) -> Self {
    let mut bytes = value.as_bytes().to_vec();

    if bytes.len() % 2 == 1 {
      if vr == ValueRepresentation::UniqueIdentifier {
        bytes.push(0);
      } else {
        bytes.push(b' ');
      }
    }

    Self::new_binary(vr, bytes)
  }

  /// Returns the raw bytes of a binary value.
  ///
  pub fn bytes(&self) -> Result<&[u8], DataError> {
    match self {
      Self::Binary { bytes, .. } => Ok(bytes),
      _ => Err(DataError::new_value_not_present()),
    }
  }

  /// Returns the items of an encapsulated pixel data value.
  ///
  pub fn encapsulated_pixel_data(&self) -> Result<&[Vec<u8>], DataError> {
    match self {
      Self::EncapsulatedPixelData { items, .. } => Ok(items),
      _ => Err(DataError::new_value_not_present()),
    }
  }

  /// Returns the string held in a string value, with leading and trailing
  /// padding removed.
  ///
  pub fn get_string(&self) -> Result<&str, DataError> {
    match self {
      Self::Binary { vr, bytes } if vr.is_string() => {
        let value = core::str::from_utf8(bytes).map_err(|_| {
          DataError::new_value_invalid("String bytes are not UTF-8".to_string())
        })?;

        Ok(value.trim_matches(['\0', ' ']))
      }

      _ => Err(DataError::new_value_not_present()),
    }
  }

  /// Returns the integers held in a `US`, `SS`, `UL`, `SL` or `IS` value,
  /// converted to the requested integer type.
  ///
  pub fn get_ints<T: TryFrom<i64>>(&self) -> Result<Vec<T>, DataError> {
    let Self::Binary { vr, bytes } = self else {
      return Err(DataError::new_value_not_present());
    };

    let values: Vec<i64> = match vr {
      ValueRepresentation::UnsignedShort => {
        check_length(*vr, bytes, 2)?;
        bytes
          .chunks_exact(2)
          .map(|c| byteorder::LittleEndian::read_u16(c).into())
          .collect()
      }

      ValueRepresentation::SignedShort => {
        check_length(*vr, bytes, 2)?;
        bytes
          .chunks_exact(2)
          .map(|c| byteorder::LittleEndian::read_i16(c).into())
          .collect()
      }

      ValueRepresentation::UnsignedLong => {
        check_length(*vr, bytes, 4)?;
        bytes
          .chunks_exact(4)
          .map(|c| byteorder::LittleEndian::read_u32(c).into())
          .collect()
      }

      ValueRepresentation::SignedLong => {
        check_length(*vr, bytes, 4)?;
        bytes
          .chunks_exact(4)
          .map(|c| byteorder::LittleEndian::read_i32(c).into())
          .collect()
      }

      ValueRepresentation::IntegerString => {
        let value = self.get_string()?;
        if value.is_empty() {
          vec![]
        } else {
          value
            .split('\\')
            .map(|s| {
              s.trim().parse::<i64>().map_err(|_| {
                DataError::new_value_invalid(format!(
                  "Integer string '{s}' is invalid"
                ))
              })
            })
            .collect::<Result<_, _>>()?
        }
      }

      _ => return Err(DataError::new_value_not_present()),
    };

    values
      .into_iter()
      .map(|i| {
        T::try_from(i).map_err(|_| {
          DataError::new_value_invalid(format!(
            "Integer '{i}' is out of range for the requested type"
          ))
        })
      })
      .collect()
  }

  /// Returns the single integer held in a `US`, `SS`, `UL`, `SL` or `IS`
  /// value. Errors if there isn't exactly one integer present.
  ///
  pub fn get_int<T: TryFrom<i64>>(&self) -> Result<T, DataError> {
    let mut values = self.get_ints::<T>()?;

    match values.len() {
      1 => Ok(values.remove(0)),
      0 => Err(DataError::new_value_not_present()),
      n => Err(DataError::new_value_invalid(format!(
        "Expected a single integer but found {n}"
      ))),
    }
  }
}

fn check_length(
  vr: ValueRepresentation,
  bytes: &[u8],
  multiple_of: usize,
) -> Result<(), DataError> {
  if bytes.len() % multiple_of == 0 {
    Ok(())
  } else {
    Err(DataError::new_value_length_invalid(
      vr,
      bytes.len(),
      format!("Must be a multiple of {multiple_of} bytes"),
    ))
  }
}
