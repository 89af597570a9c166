use dcmb64_core::{DataElementTag, ValueRepresentation, dictionary};

use crate::internal::value_length::ValueLength;

/// The header of a single data element: its tag, VR, and value length. The VR
/// is `None` for items and delimitation items.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DataElementHeader {
  pub tag: DataElementTag,
  pub vr: Option<ValueRepresentation>,
  pub length: ValueLength,
}

impl DataElementHeader {
  /// Returns whether the tag is one of the item or delimitation item tags,
  /// which never have a VR.
  ///
  pub fn is_item_or_delimiter(tag: DataElementTag) -> bool {
    tag == dictionary::ITEM.tag
      || tag == dictionary::ITEM_DELIMITATION_ITEM.tag
      || tag == dictionary::SEQUENCE_DELIMITATION_ITEM.tag
  }
}

impl core::fmt::Display for DataElementHeader {
  fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
    let vr = match self.vr {
      Some(vr) => vr.to_str(),
      None => "--",
    };

    write!(
      f,
      "{}, {}, length: {}",
      dictionary::tag_with_name(self.tag),
      vr,
      self.length
    )
  }
}
