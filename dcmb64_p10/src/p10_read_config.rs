/// Configuration used when reading DICOM P10 data.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct P10ReadConfig {
  pub(crate) max_sequence_depth: usize,
  pub(crate) require_dicm_prefix: bool,
  pub(crate) require_ordered_data_elements: bool,
}

impl Default for P10ReadConfig {
  fn default() -> Self {
    Self {
      max_sequence_depth: 10_000,
      require_dicm_prefix: false,
      require_ordered_data_elements: true,
    }
  }
}

impl P10ReadConfig {
  /// The maximum sequence depth that can be read. This protects against
  /// malformed data that nests sequences without bound.
  ///
  /// By default the maximum sequence depth is ten thousand.
  ///
  pub fn max_sequence_depth(mut self, value: usize) -> Self {
    self.max_sequence_depth = value;
    self
  }

  /// Whether to error if the 128-byte File Preamble and "DICM" prefix aren't
  /// present. When this is false, data without them is read from the first
  /// byte.
  ///
  /// By default this requirement is not enforced.
  ///
  pub fn require_dicm_prefix(mut self, value: bool) -> Self {
    self.require_dicm_prefix = value;
    self
  }

  /// Whether to error if data elements in the root data set are not in
  /// ascending tag order, as the DICOM standard requires. This is the most
  /// reliable way of rejecting input that isn't DICOM P10 data at all.
  ///
  /// By default this requirement is enforced.
  ///
  pub fn require_ordered_data_elements(mut self, value: bool) -> Self {
    self.require_ordered_data_elements = value;
    self
  }
}
