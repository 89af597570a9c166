//! Errors that can occur when reading DICOM P10 data.

use dcmb64_core::Dcmb64Error;

/// An error that occurred when reading DICOM P10 data.
///
#[derive(Clone, Debug, PartialEq)]
pub enum P10Error {
  /// The transfer syntax specified in the File Meta Information is not
  /// recognized.
  TransferSyntaxNotSupported { transfer_syntax_uid: String },

  /// The 'DICM' prefix at offset 128 is required by the read config but is
  /// not present.
  DicmPrefixNotPresent,

  /// The DICOM P10 data is malformed.
  DataInvalid {
    when: String,
    details: String,
    offset: u64,
  },

  /// The DICOM P10 data ended before a complete data set was read.
  DataEndedUnexpectedly { when: String, offset: u64 },

  /// A limit set in the read config was exceeded.
  MaximumExceeded { details: String, offset: u64 },

  /// An error occurred opening or reading from a file or stream.
  FileError { when: String, details: String },
}

impl P10Error {
  /// Returns the name of the P10 error as a human-readable string.
  ///
  pub fn name(&self) -> &'static str {
    match self {
      Self::TransferSyntaxNotSupported { .. } => {
        "Transfer syntax not supported"
      }
      Self::DicmPrefixNotPresent => "'DICM' prefix is not present",
      Self::DataInvalid { .. } => "Invalid data",
      Self::DataEndedUnexpectedly { .. } => "Unexpected end of data",
      Self::MaximumExceeded { .. } => "Maximum exceeded",
      Self::FileError { .. } => "File I/O failure",
    }
  }

  /// Returns the byte offset into the DICOM P10 data at which the error
  /// occurred, if known.
  ///
  pub fn offset(&self) -> Option<u64> {
    match self {
      Self::DataInvalid { offset, .. }
      | Self::DataEndedUnexpectedly { offset, .. }
      | Self::MaximumExceeded { offset, .. } => Some(*offset),
      _ => None,
    }
  }
}

impl core::fmt::Display for P10Error {
  fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
    match self {
      Self::TransferSyntaxNotSupported {
        transfer_syntax_uid,
      } => write!(
        f,
        "DICOM P10 error: Transfer syntax '{transfer_syntax_uid}' is not \
         supported"
      ),
      Self::DicmPrefixNotPresent => {
        write!(f, "DICOM P10 error: 'DICM' prefix is not present")
      }
      Self::DataInvalid { when, details, .. } => {
        write!(f, "DICOM P10 error: {when}, details: {details}")
      }
      Self::DataEndedUnexpectedly { when, .. } => {
        write!(f, "DICOM P10 error: Unexpected end of data {when}")
      }
      Self::MaximumExceeded { details, .. } => {
        write!(f, "DICOM P10 error: Maximum exceeded, details: {details}")
      }
      Self::FileError { when, details } => {
        write!(f, "DICOM P10 error: {when}, details: {details}")
      }
    }
  }
}

impl Dcmb64Error for P10Error {
  fn to_lines(&self, task_description: &str) -> Vec<String> {
    let mut lines = vec![
      format!("DICOM P10 error {task_description}"),
      "".to_string(),
      format!("  Error: {}", self.name()),
    ];

    match self {
      Self::TransferSyntaxNotSupported {
        transfer_syntax_uid,
      } => {
        lines.push(format!("  Transfer syntax UID: {transfer_syntax_uid}"));
      }

      Self::DataInvalid { when, details, .. } => {
        lines.push(format!("  When: {when}"));
        lines.push(format!("  Details: {details}"));
      }

      Self::DataEndedUnexpectedly { when, .. } => {
        lines.push(format!("  When: {when}"));
      }

      Self::MaximumExceeded { details, .. } => {
        lines.push(format!("  Details: {details}"));
      }

      Self::FileError { when, details } => {
        lines.push(format!("  When: {when}"));
        lines.push(format!("  Details: {details}"));
      }

      Self::DicmPrefixNotPresent => (),
    }

    if let Some(offset) = self.offset() {
      lines.push(format!("  Offset: 0x{offset:X}"));
    }

    lines
  }
}
