//! The subset of the DICOM data dictionary needed to read image pixel data.
//!
//! Ref: PS3.6.

use crate::{DataElementTag, ValueRepresentation};

use ValueRepresentation as Vr;

/// A data dictionary entry, giving the name and VR of a tag.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Item {
  pub tag: DataElementTag,
  pub name: &'static str,
  pub vr: ValueRepresentation,
}

const fn item(
  group: u16,
  element: u16,
  name: &'static str,
  vr: ValueRepresentation,
) -> Item {
  Item {
    tag: DataElementTag::new(group, element),
    name,
    vr,
  }
}

pub const FILE_META_INFORMATION_GROUP_LENGTH: Item = item(
  0x0002,
  0x0000,
  "File Meta Information Group Length",
  Vr::UnsignedLong,
);
pub const MEDIA_STORAGE_SOP_CLASS_UID: Item = item(
  0x0002,
  0x0002,
  "Media Storage SOP Class UID",
  Vr::UniqueIdentifier,
);
pub const TRANSFER_SYNTAX_UID: Item =
  item(0x0002, 0x0010, "Transfer Syntax UID", Vr::UniqueIdentifier);
pub const SPECIFIC_CHARACTER_SET: Item =
  item(0x0008, 0x0005, "Specific Character Set", Vr::CodeString);
pub const SOP_CLASS_UID: Item =
  item(0x0008, 0x0016, "SOP Class UID", Vr::UniqueIdentifier);
pub const MODALITY: Item = item(0x0008, 0x0060, "Modality", Vr::CodeString);
pub const SAMPLES_PER_PIXEL: Item =
  item(0x0028, 0x0002, "Samples per Pixel", Vr::UnsignedShort);
pub const PHOTOMETRIC_INTERPRETATION: Item =
  item(0x0028, 0x0004, "Photometric Interpretation", Vr::CodeString);
pub const PLANAR_CONFIGURATION: Item =
  item(0x0028, 0x0006, "Planar Configuration", Vr::UnsignedShort);
pub const NUMBER_OF_FRAMES: Item =
  item(0x0028, 0x0008, "Number of Frames", Vr::IntegerString);
pub const ROWS: Item = item(0x0028, 0x0010, "Rows", Vr::UnsignedShort);
pub const COLUMNS: Item = item(0x0028, 0x0011, "Columns", Vr::UnsignedShort);
pub const BITS_ALLOCATED: Item =
  item(0x0028, 0x0100, "Bits Allocated", Vr::UnsignedShort);
pub const BITS_STORED: Item =
  item(0x0028, 0x0101, "Bits Stored", Vr::UnsignedShort);
pub const HIGH_BIT: Item = item(0x0028, 0x0102, "High Bit", Vr::UnsignedShort);
pub const PIXEL_REPRESENTATION: Item =
  item(0x0028, 0x0103, "Pixel Representation", Vr::UnsignedShort);
pub const PIXEL_DATA: Item =
  item(0x7FE0, 0x0010, "Pixel Data", Vr::OtherWordString);
pub const ITEM: Item = item(0xFFFE, 0xE000, "Item", Vr::Unknown);
pub const ITEM_DELIMITATION_ITEM: Item =
  item(0xFFFE, 0xE00D, "Item Delimitation Item", Vr::Unknown);
pub const SEQUENCE_DELIMITATION_ITEM: Item =
  item(0xFFFE, 0xE0DD, "Sequence Delimitation Item", Vr::Unknown);

static ITEMS: [Item; 21] = [
  FILE_META_INFORMATION_GROUP_LENGTH,
  MEDIA_STORAGE_SOP_CLASS_UID,
  TRANSFER_SYNTAX_UID,
  SPECIFIC_CHARACTER_SET,
  SOP_CLASS_UID,
  MODALITY,
  SAMPLES_PER_PIXEL,
  PHOTOMETRIC_INTERPRETATION,
  PLANAR_CONFIGURATION,
  NUMBER_OF_FRAMES,
  ROWS,
  COLUMNS,
  BITS_ALLOCATED,
  BITS_STORED,
  HIGH_BIT,
  PIXEL_REPRESENTATION,
  PIXEL_DATA,
  ITEM,
  ITEM_DELIMITATION_ITEM,
  SEQUENCE_DELIMITATION_ITEM,
  item(0xFFFC, 0xFFFC, "Data Set Trailing Padding", Vr::OtherByteString),
];

/// Looks up a tag in the dictionary.
///
#[allow(clippy::result_unit_err)]
pub fn find(tag: DataElementTag) -> Result<&'static Item, ()> {
  ITEMS.iter().find(|item| item.tag == tag).ok_or(())
}

/// Returns the VR to use for a tag when reading data that has implicit VRs.
/// Tags that aren't in the dictionary are read as [`Vr::Unknown`], and group
/// length tags are always [`Vr::UnsignedLong`].
///
pub fn implicit_vr(tag: DataElementTag) -> ValueRepresentation {
  if tag.element == 0x0000 {
    return Vr::UnsignedLong;
  }

  match find(tag) {
    Ok(item) => item.vr,
    Err(()) => Vr::Unknown,
  }
}

/// Formats a tag along with its name if it's in the dictionary, e.g.
/// `"(0028,0010) Rows"`.
///
pub fn tag_with_name(tag: DataElementTag) -> String {
  match find(tag) {
    Ok(item) => format!("{} {}", tag, item.name),
    Err(()) => tag.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tag_with_name_test() {
    assert_eq!(tag_with_name(ROWS.tag), "(0028,0010) Rows");
    assert_eq!(
      tag_with_name(DataElementTag::new(0x0029, 0x1000)),
      "(0029,1000)"
    );
  }

  #[test]
  fn implicit_vr_test() {
    assert_eq!(implicit_vr(BITS_ALLOCATED.tag), Vr::UnsignedShort);
    assert_eq!(
      implicit_vr(DataElementTag::new(0x0010, 0x0000)),
      Vr::UnsignedLong
    );
    assert_eq!(
      implicit_vr(DataElementTag::new(0x0010, 0x0010)),
      Vr::Unknown
    );
  }
}
