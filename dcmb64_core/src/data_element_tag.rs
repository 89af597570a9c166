//! A DICOM data element tag, made up of a 16-bit group and a 16-bit element.

/// A data element tag that identifies a data element in a data set.
///
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DataElementTag {
  pub group: u16,
  pub element: u16,
}

impl DataElementTag {
  /// Creates a new data element tag from a group and element.
  ///
  pub const fn new(group: u16, element: u16) -> Self {
    Self { group, element }
  }

  /// Returns whether this tag is a private tag, i.e. its group is odd.
  ///
  pub fn is_private(&self) -> bool {
    self.group % 2 == 1
  }

  /// Returns the tag as a single 32-bit integer, with the group in the high
  /// 16 bits.
  ///
  pub fn to_int(&self) -> u32 {
    (u32::from(self.group) << 16) | u32::from(self.element)
  }

  /// Formats the tag as eight uppercase hex digits, e.g. `"7FE00010"`.
  ///
  pub fn to_hex_string(&self) -> String {
    format!("{:04X}{:04X}", self.group, self.element)
  }
}

impl core::fmt::Display for DataElementTag {
  fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
    write!(f, "({:04X},{:04X})", self.group, self.element)
  }
}
