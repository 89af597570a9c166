/// The length of a data element value, which may be undefined for sequences,
/// items, and encapsulated pixel data.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ValueLength {
  Defined { length: u32 },
  Undefined,
}

impl ValueLength {
  /// The raw value used to indicate an undefined length.
  ///
  const UNDEFINED: u32 = 0xFFFFFFFF;

  /// Creates a new value length from its raw 32-bit value.
  ///
  pub fn new(length: u32) -> Self {
    if length == Self::UNDEFINED {
      Self::Undefined
    } else {
      Self::Defined { length }
    }
  }
}

impl core::fmt::Display for ValueLength {
  fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
    match self {
      Self::Defined { length } => write!(f, "{length} bytes"),
      Self::Undefined => f.write_str("UNDEFINED"),
    }
  }
}
