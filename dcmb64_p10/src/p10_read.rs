//! Reads a complete in-memory buffer of DICOM P10 data into a [`DataSet`].
//!
//! Only the parts of the data set needed to locate and interpret pixel data
//! are materialized. Sequences are parsed so that their extent is known, but
//! their content is skipped, and reading stops once the *'(7FE0,0010) Pixel
//! Data'* data element has been read.

use byteorder::ByteOrder;

use dcmb64_core::{
  DataElementTag, DataElementValue, DataSet, TransferSyntax,
  ValueRepresentation, dictionary,
  transfer_syntax::{self, Endianness, VrSerialization},
  value_representation::ValueLengthSize,
};

use crate::internal::byte_stream::{ByteStream, ByteStreamError};
use crate::internal::data_element_header::DataElementHeader;
use crate::internal::value_length::ValueLength;
use crate::{P10Error, P10ReadConfig};

/// A read context holds the state of a DICOM P10 read over a buffer of bytes.
///
#[derive(Debug)]
pub struct P10ReadContext {
  config: P10ReadConfig,
  stream: ByteStream,
  transfer_syntax: &'static TransferSyntax,
}

impl P10ReadContext {
  /// Creates a new read context for reading the given DICOM P10 data.
  ///
  pub fn new(bytes: Vec<u8>, config: Option<P10ReadConfig>) -> P10ReadContext {
    P10ReadContext {
      config: config.unwrap_or_default(),
      stream: ByteStream::new(bytes),
      transfer_syntax: &transfer_syntax::IMPLICIT_VR_LITTLE_ENDIAN,
    }
  }

  /// Reads the File Preamble, File Meta Information, and main data set. The
  /// returned data set includes the File Meta Information data elements.
  ///
  pub fn read_data_set(&mut self) -> Result<DataSet, P10Error> {
    self.read_file_preamble_and_dicm_prefix()?;

    let mut data_set = self.read_file_meta_information()?;

    if data_set.has(dictionary::TRANSFER_SYNTAX_UID.tag) {
      let uid = data_set
        .get_string(dictionary::TRANSFER_SYNTAX_UID.tag)
        .map_err(|e| P10Error::DataInvalid {
          when: "Reading File Meta Information".to_string(),
          details: e.to_string(),
          offset: self.stream.bytes_read(),
        })?;

      self.transfer_syntax = TransferSyntax::from_uid(uid).map_err(|_| {
        P10Error::TransferSyntaxNotSupported {
          transfer_syntax_uid: uid.to_string(),
        }
      })?;
    }

    log::debug!(
      "Reading data set with transfer syntax {}",
      self.transfer_syntax
    );

    if self.transfer_syntax.is_deflated {
      self.stream.start_zlib_inflate().map_err(|e| {
        self.map_byte_stream_error(e, "Inflating deflated data set")
      })?;
    }

    data_set.merge(self.read_main_data_set()?);

    Ok(data_set)
  }

  /// Reads the 128-byte File Preamble and the "DICM" prefix that follows it.
  /// If the prefix isn't present then it's assumed the data starts directly
  /// with the File Meta Information or the main data set, unless the prefix is
  /// configured as required.
  ///
  fn read_file_preamble_and_dicm_prefix(&mut self) -> Result<(), P10Error> {
    let has_prefix = self
      .stream
      .peek(132)
      .is_ok_and(crate::is_valid_bytes);

    if has_prefix {
      self
        .stream
        .skip(132)
        .map_err(|e| self.map_byte_stream_error(e, "Reading file header"))
    } else if self.config.require_dicm_prefix {
      Err(P10Error::DicmPrefixNotPresent)
    } else {
      log::debug!("No 'DICM' prefix present, reading from the first byte");
      Ok(())
    }
  }

  /// Reads the File Meta Information into a data set. If there is a
  /// *'(0002,0000) File Meta Information Group Length'* data element present
  /// then it is used to specify where the File Meta Information ends. If it is
  /// not present then data elements are read until one with a group other
  /// than 0x0002 is encountered.
  ///
  /// The File Meta Information is always encoded as 'Explicit VR Little
  /// Endian'.
  ///
  fn read_file_meta_information(&mut self) -> Result<DataSet, P10Error> {
    let mut fmi_data_set = DataSet::new();
    let mut ends_at: Option<u64> = None;

    loop {
      if let Some(ends_at) = ends_at {
        if self.stream.bytes_read() >= ends_at {
          break;
        }
      }

      // Stop when the next data element isn't in group 0x0002
      match self.stream.peek(2) {
        Ok(data) if byteorder::LittleEndian::read_u16(data) == 0x0002 => (),
        _ => break,
      }

      let header = self.read_data_element_header(
        &transfer_syntax::EXPLICIT_VR_LITTLE_ENDIAN,
      )?;

      let (Some(vr), ValueLength::Defined { length }) =
        (header.vr, header.length)
      else {
        return Err(P10Error::DataInvalid {
          when: "Reading File Meta Information".to_string(),
          details: format!("Data element '{header}' is not valid"),
          offset: self.stream.bytes_read(),
        });
      };

      let bytes = self
        .stream
        .read(length as usize)
        .map(<[u8]>::to_vec)
        .map_err(|e| {
          self.map_byte_stream_error(e, "Reading File Meta Information")
        })?;

      if header.tag == dictionary::FILE_META_INFORMATION_GROUP_LENGTH.tag {
        if bytes.len() != 4 {
          return Err(P10Error::DataInvalid {
            when: "Reading File Meta Information".to_string(),
            details: "Group length is invalid".to_string(),
            offset: self.stream.bytes_read(),
          });
        }

        ends_at = Some(
          self.stream.bytes_read()
            + u64::from(byteorder::LittleEndian::read_u32(&bytes)),
        );
      }

      fmi_data_set.insert(header.tag, DataElementValue::new_binary(vr, bytes));
    }

    Ok(fmi_data_set)
  }

  /// Reads the data elements of the main data set up to and including the
  /// pixel data.
  ///
  fn read_main_data_set(&mut self) -> Result<DataSet, P10Error> {
    let transfer_syntax = self.transfer_syntax;
    let mut data_set = DataSet::new();
    let mut previous_tag: Option<DataElementTag> = None;

    while !self.stream.is_fully_consumed() {
      let header = self.read_data_element_header(transfer_syntax)?;

      if DataElementHeader::is_item_or_delimiter(header.tag) {
        return Err(P10Error::DataInvalid {
          when: "Reading data element header".to_string(),
          details: format!("'{header}' found in the main data set"),
          offset: self.stream.bytes_read(),
        });
      }

      // File Meta Information data elements aren't allowed in the main data
      // set
      if header.tag.group == 0x0002 {
        return Err(P10Error::DataInvalid {
          when: "Reading data element header".to_string(),
          details: format!(
            "File Meta Information data element '{}' found in the main data \
             set",
            header.tag
          ),
          offset: self.stream.bytes_read(),
        });
      }

      self.check_data_element_ordering(previous_tag, &header)?;
      previous_tag = Some(header.tag);

      let value = self.read_data_element_value(&header, transfer_syntax)?;
      data_set.insert(header.tag, value);

      if header.tag == dictionary::PIXEL_DATA.tag {
        log::trace!(
          "Stopping read after pixel data with {} bytes unread",
          self.stream.bytes_remaining()
        );
        break;
      }
    }

    Ok(data_set)
  }

  /// Checks that the specified data element tag is greater than the previous
  /// one in the main data set.
  ///
  fn check_data_element_ordering(
    &self,
    previous_tag: Option<DataElementTag>,
    header: &DataElementHeader,
  ) -> Result<(), P10Error> {
    if !self.config.require_ordered_data_elements {
      return Ok(());
    }

    match previous_tag {
      Some(previous_tag) if header.tag <= previous_tag => {
        Err(P10Error::DataInvalid {
          when: "Reading data element header".to_string(),
          details: format!(
            "Data element '{}' is not in ascending order",
            header.tag
          ),
          offset: self.stream.bytes_read(),
        })
      }
      _ => Ok(()),
    }
  }

  /// Reads a data element header. Depending on the transfer syntax and the
  /// specific VR (for explicit VR transfer syntaxes), this reads either 8 or 12
  /// bytes in total.
  ///
  fn read_data_element_header(
    &mut self,
    transfer_syntax: &'static TransferSyntax,
  ) -> Result<DataElementHeader, P10Error> {
    let tag = match self.stream.peek(4) {
      Ok(data) => {
        let (group, element) = match transfer_syntax.endianness {
          Endianness::LittleEndian => (
            byteorder::LittleEndian::read_u16(&data[0..2]),
            byteorder::LittleEndian::read_u16(&data[2..4]),
          ),
          Endianness::BigEndian => (
            byteorder::BigEndian::read_u16(&data[0..2]),
            byteorder::BigEndian::read_u16(&data[2..4]),
          ),
        };

        Ok(DataElementTag::new(group, element))
      }

      Err(e) => {
        Err(self.map_byte_stream_error(e, "Reading data element header"))
      }
    }?;

    // The item and delimitation tags always use implicit VRs
    if DataElementHeader::is_item_or_delimiter(tag)
      || transfer_syntax.vr_serialization == VrSerialization::VrImplicit
    {
      self.read_implicit_vr_and_length(tag, transfer_syntax)
    } else {
      self.read_explicit_vr_and_length(tag, transfer_syntax)
    }
  }

  /// Reads the value length following a data element tag when the VR is
  /// implicit. The VR is looked up in the dictionary, and is `None` for items
  /// and delimitation items.
  ///
  fn read_implicit_vr_and_length(
    &mut self,
    tag: DataElementTag,
    transfer_syntax: &'static TransferSyntax,
  ) -> Result<DataElementHeader, P10Error> {
    let data = match self.stream.read(8) {
      Ok(data) => data,
      Err(e) => {
        return Err(
          self.map_byte_stream_error(e, "Reading data element header"),
        );
      }
    };

    let length = match transfer_syntax.endianness {
      Endianness::LittleEndian => {
        byteorder::LittleEndian::read_u32(&data[4..8])
      }
      Endianness::BigEndian => byteorder::BigEndian::read_u32(&data[4..8]),
    };

    let vr = if DataElementHeader::is_item_or_delimiter(tag) {
      None
    } else {
      Some(dictionary::implicit_vr(tag))
    };

    Ok(DataElementHeader {
      tag,
      vr,
      length: ValueLength::new(length),
    })
  }

  /// Reads the explicit VR and value length following a data element tag.
  ///
  fn read_explicit_vr_and_length(
    &mut self,
    tag: DataElementTag,
    transfer_syntax: &'static TransferSyntax,
  ) -> Result<DataElementHeader, P10Error> {
    let vr_bytes = match self.stream.peek(6) {
      Ok(data) => [data[4], data[5]],
      Err(e) => {
        return Err(self.map_byte_stream_error(
          e,
          "Reading explicit VR data element header",
        ));
      }
    };

    let vr = match ValueRepresentation::from_bytes(&vr_bytes) {
      Ok(vr) => vr,

      // If the VR is two spaces or two NULL characters then treat it as UN.
      // The DICOM standard doesn't allow this, but such data has been
      // observed in the wild.
      Err(()) => match vr_bytes {
        [0x00, 0x00] | [0x20, 0x20] => ValueRepresentation::Unknown,

        _ => {
          return Err(P10Error::DataInvalid {
            when: "Reading data element VR".to_string(),
            details: format!(
              "Unrecognized VR {:?} for tag '{}'",
              vr_bytes,
              dictionary::tag_with_name(tag)
            ),
            offset: self.stream.bytes_read(),
          });
        }
      },
    };

    let header_size = match vr.value_length_size() {
      ValueLengthSize::U32 => 12,
      ValueLengthSize::U16 => 8,
    };

    let data = match self.stream.read(header_size) {
      Ok(data) => data,
      Err(e) => {
        return Err(self.map_byte_stream_error(
          e,
          "Reading explicit VR data element header",
        ));
      }
    };

    let length = match (header_size, transfer_syntax.endianness) {
      (12, Endianness::LittleEndian) => {
        byteorder::LittleEndian::read_u32(&data[8..12])
      }
      (12, Endianness::BigEndian) => {
        byteorder::BigEndian::read_u32(&data[8..12])
      }
      (_, Endianness::LittleEndian) => {
        byteorder::LittleEndian::read_u16(&data[6..8]).into()
      }
      (_, Endianness::BigEndian) => {
        byteorder::BigEndian::read_u16(&data[6..8]).into()
      }
    };

    let length = ValueLength::new(length);

    // Known tags that were written with a VR of UN are given their dictionary
    // VR so their values can be interpreted
    let vr = if vr == ValueRepresentation::Unknown
      && matches!(length, ValueLength::Defined { .. })
    {
      dictionary::implicit_vr(tag)
    } else {
      vr
    };

    Ok(DataElementHeader {
      tag,
      vr: Some(vr),
      length,
    })
  }

  /// Reads the value of a data element following its header. Sequences are
  /// skipped, and undefined-length pixel data is read as encapsulated pixel
  /// data.
  ///
  fn read_data_element_value(
    &mut self,
    header: &DataElementHeader,
    transfer_syntax: &'static TransferSyntax,
  ) -> Result<DataElementValue, P10Error> {
    let vr = header.vr.unwrap_or(ValueRepresentation::Unknown);

    if header.tag == dictionary::PIXEL_DATA.tag
      && header.length == ValueLength::Undefined
    {
      return self.read_encapsulated_pixel_data(vr, transfer_syntax);
    }

    match (vr, header.length) {
      (ValueRepresentation::Sequence, _) | (_, ValueLength::Undefined) => {
        // Sequences with a VR of UN and an undefined length are always
        // encoded as 'Implicit VR Little Endian'. Ref: DICOM CP-246.
        let sequence_transfer_syntax = if vr == ValueRepresentation::Unknown {
          &transfer_syntax::IMPLICIT_VR_LITTLE_ENDIAN
        } else {
          transfer_syntax
        };

        let item_count =
          self.skip_sequence(header.length, sequence_transfer_syntax)?;

        log::trace!(
          "Skipped sequence {} with {} items",
          header.tag,
          item_count
        );

        Ok(DataElementValue::new_sequence(item_count))
      }

      (_, ValueLength::Defined { length }) => {
        let mut bytes = self
          .stream
          .read(length as usize)
          .map(<[u8]>::to_vec)
          .map_err(|e| {
            self.map_byte_stream_error(e, "Reading data element value")
          })?;

        if transfer_syntax.endianness == Endianness::BigEndian {
          swap_endianness(vr, &mut bytes);
        }

        Ok(DataElementValue::new_binary(vr, bytes))
      }
    }
  }

  /// Reads the items of encapsulated pixel data up to the sequence
  /// delimitation item. The first item is the Basic Offset Table.
  ///
  fn read_encapsulated_pixel_data(
    &mut self,
    vr: ValueRepresentation,
    transfer_syntax: &'static TransferSyntax,
  ) -> Result<DataElementValue, P10Error> {
    let mut items = vec![];

    loop {
      let header = self.read_data_element_header(transfer_syntax)?;

      if header.tag == dictionary::SEQUENCE_DELIMITATION_ITEM.tag {
        break;
      }

      let ValueLength::Defined { length } = header.length else {
        return Err(P10Error::DataInvalid {
          when: "Reading encapsulated pixel data item".to_string(),
          details: "Pixel data item has an undefined length".to_string(),
          offset: self.stream.bytes_read(),
        });
      };

      if header.tag != dictionary::ITEM.tag {
        return Err(P10Error::DataInvalid {
          when: "Reading encapsulated pixel data item".to_string(),
          details: format!("Unexpected data element '{header}'"),
          offset: self.stream.bytes_read(),
        });
      }

      let item = self
        .stream
        .read(length as usize)
        .map(<[u8]>::to_vec)
        .map_err(|e| {
          self.map_byte_stream_error(e, "Reading encapsulated pixel data item")
        })?;

      items.push(item);
    }

    log::debug!("Read encapsulated pixel data with {} items", items.len());

    Ok(DataElementValue::new_encapsulated_pixel_data(vr, items))
  }

  /// Skips over the content of a sequence, returning the number of items it
  /// contained. Nested sequences and items are tracked on an explicit stack.
  ///
  fn skip_sequence(
    &mut self,
    length: ValueLength,
    transfer_syntax: &'static TransferSyntax,
  ) -> Result<usize, P10Error> {
    let mut location = vec![];
    self.push_skipped_sequence(&mut location, length, transfer_syntax)?;

    let mut item_count = 0;

    while let Some(&current) = location.last() {
      if let SkipLocation::Sequence {
        ends_at: Some(ends_at),
        ..
      } = current
      {
        if self.stream.bytes_read() >= ends_at {
          location.pop();
          continue;
        }
      }

      match current {
        SkipLocation::Sequence {
          transfer_syntax, ..
        } => {
          let header = self.read_data_element_header(transfer_syntax)?;

          if header.tag == dictionary::SEQUENCE_DELIMITATION_ITEM.tag {
            location.pop();
            continue;
          }

          if header.tag != dictionary::ITEM.tag {
            return Err(P10Error::DataInvalid {
              when: "Reading sequence item".to_string(),
              details: format!("Expected an item but found '{header}'"),
              offset: self.stream.bytes_read(),
            });
          }

          if location.len() == 1 {
            item_count += 1;
          }

          match header.length {
            ValueLength::Defined { length } => {
              self.skip(length, "Skipping item")?
            }
            ValueLength::Undefined => {
              location.push(SkipLocation::Item { transfer_syntax })
            }
          }
        }

        SkipLocation::Item { transfer_syntax } => {
          let header = self.read_data_element_header(transfer_syntax)?;

          if header.tag == dictionary::ITEM_DELIMITATION_ITEM.tag {
            location.pop();
            continue;
          }

          match (header.vr, header.length) {
            (Some(ValueRepresentation::Sequence), _)
            | (_, ValueLength::Undefined) => {
              // Sequences with a VR of UN and an undefined length are
              // always 'Implicit VR Little Endian'
              let nested_transfer_syntax =
                if header.vr == Some(ValueRepresentation::Unknown) {
                  &transfer_syntax::IMPLICIT_VR_LITTLE_ENDIAN
                } else {
                  transfer_syntax
                };

              self.push_skipped_sequence(
                &mut location,
                header.length,
                nested_transfer_syntax,
              )?;
            }

            (_, ValueLength::Defined { length }) => {
              self.skip(length, "Skipping data element value")?
            }
          }
        }
      }
    }

    Ok(item_count)
  }

  /// Adds a sequence to the skip location, checking that doing so doesn't
  /// exceed the maximum sequence depth.
  ///
  fn push_skipped_sequence(
    &self,
    location: &mut Vec<SkipLocation>,
    length: ValueLength,
    transfer_syntax: &'static TransferSyntax,
  ) -> Result<(), P10Error> {
    // Sequences and items alternate on the stack
    let sequence_depth = location.len() / 2 + 1;

    if sequence_depth > self.config.max_sequence_depth {
      return Err(P10Error::MaximumExceeded {
        details: format!(
          "Maximum allowed sequence depth of {} was exceeded",
          self.config.max_sequence_depth
        ),
        offset: self.stream.bytes_read(),
      });
    }

    let ends_at = match length {
      ValueLength::Defined { length } => {
        Some(self.stream.bytes_read() + u64::from(length))
      }
      ValueLength::Undefined => None,
    };

    location.push(SkipLocation::Sequence {
      ends_at,
      transfer_syntax,
    });

    Ok(())
  }

  fn skip(&mut self, length: u32, when: &str) -> Result<(), P10Error> {
    self
      .stream
      .skip(length as usize)
      .map_err(|e| self.map_byte_stream_error(e, when))
  }

  fn map_byte_stream_error(
    &self,
    error: ByteStreamError,
    when: &str,
  ) -> P10Error {
    let offset = self.stream.bytes_read();

    match error {
      ByteStreamError::DataEnd => P10Error::DataEndedUnexpectedly {
        when: when.to_string(),
        offset,
      },

      ByteStreamError::ZlibDataError => P10Error::DataInvalid {
        when: when.to_string(),
        details: "Zlib data is invalid".to_string(),
        offset,
      },
    }
  }
}

/// A sequence or undefined-length item that is being skipped.
///
#[derive(Clone, Copy)]
enum SkipLocation {
  Sequence {
    ends_at: Option<u64>,
    transfer_syntax: &'static TransferSyntax,
  },
  Item {
    transfer_syntax: &'static TransferSyntax,
  },
}

/// Converts a big endian value to little endian, in place, by reversing the
/// bytes of each of its binary words.
///
fn swap_endianness(vr: ValueRepresentation, bytes: &mut [u8]) {
  let unit_size = vr.swap_unit_size();

  if unit_size > 1 {
    for chunk in bytes.chunks_exact_mut(unit_size) {
      chunk.reverse();
    }
  }
}
