//! Errors that occur when retrieving or interpreting data element values.

use crate::{DataElementTag, Dcmb64Error, ValueRepresentation, dictionary};

/// An error that occurred when retrieving or creating data. A data error can
/// be tagged with the data element it relates to, which is included in the
/// error's output.
///
#[derive(Clone, Debug, PartialEq)]
pub struct DataError {
  kind: DataErrorKind,
  tag: Option<DataElementTag>,
}

#[derive(Clone, Debug, PartialEq)]
enum DataErrorKind {
  /// The requested tag is not present in the data set.
  TagNotPresent,

  /// The value of the data element does not have the type that was requested,
  /// e.g. an integer was requested from a sequence.
  ValueNotPresent,

  /// The data element value has a length that is not valid for its VR.
  ValueLengthInvalid {
    vr: ValueRepresentation,
    length: usize,
    details: String,
  },

  /// The data element value was present but is not valid.
  ValueInvalid { details: String },
}

impl DataError {
  /// Constructs a new 'Tag not present' data error.
  ///
  pub fn new_tag_not_present() -> Self {
    Self {
      kind: DataErrorKind::TagNotPresent,
      tag: None,
    }
  }

  /// Constructs a new 'Value not present' data error.
  ///
  pub fn new_value_not_present() -> Self {
    Self {
      kind: DataErrorKind::ValueNotPresent,
      tag: None,
    }
  }

  /// Constructs a new 'Value length invalid' data error.
  ///
  pub fn new_value_length_invalid(
    vr: ValueRepresentation,
    length: usize,
    details: String,
  ) -> Self {
    Self {
      kind: DataErrorKind::ValueLengthInvalid {
        vr,
        length,
        details,
      },
      tag: None,
    }
  }

  /// Constructs a new 'Value invalid' data error.
  ///
  pub fn new_value_invalid(details: String) -> Self {
    Self {
      kind: DataErrorKind::ValueInvalid { details },
      tag: None,
    }
  }

  /// Returns the tag of the data element this error relates to, if known.
  ///
  pub fn tag(&self) -> Option<DataElementTag> {
    self.tag
  }

  /// Sets the tag of the data element this error relates to.
  ///
  pub fn with_tag(mut self, tag: DataElementTag) -> Self {
    self.tag = Some(tag);
    self
  }

  /// Returns whether this is a 'Tag not present' error.
  ///
  pub fn is_tag_not_present(&self) -> bool {
    self.kind == DataErrorKind::TagNotPresent
  }

  /// Returns the name of the data error as a human-readable string.
  ///
  pub fn name(&self) -> &'static str {
    match self.kind {
      DataErrorKind::TagNotPresent => "Tag not present",
      DataErrorKind::ValueNotPresent => "Value not present",
      DataErrorKind::ValueLengthInvalid { .. } => "Invalid value length",
      DataErrorKind::ValueInvalid { .. } => "Invalid value",
    }
  }

  fn details(&self) -> Option<&str> {
    match &self.kind {
      DataErrorKind::ValueLengthInvalid { details, .. }
      | DataErrorKind::ValueInvalid { details } => Some(details),
      _ => None,
    }
  }
}

impl core::fmt::Display for DataError {
  fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
    write!(f, "DICOM data error: {}", self.name())?;

    if let Some(tag) = self.tag {
      write!(f, ", tag: {}", dictionary::tag_with_name(tag))?;
    }

    if let Some(details) = self.details() {
      write!(f, ", details: {details}")?;
    }

    Ok(())
  }
}

impl Dcmb64Error for DataError {
  fn to_lines(&self, task_description: &str) -> Vec<String> {
    let mut lines = vec![
      format!("DICOM data error {task_description}"),
      "".to_string(),
      format!("  Error: {}", self.name()),
    ];

    if let Some(tag) = self.tag {
      lines.push(format!("  Tag: {}", dictionary::tag_with_name(tag)));
    }

    if let DataErrorKind::ValueLengthInvalid { vr, length, .. } = &self.kind {
      lines.push(format!("  VR: {vr}"));
      lines.push(format!("  Length: {length} bytes"));
    }

    if let Some(details) = self.details() {
      lines.push(format!("  Details: {details}"));
    }

    lines
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display() {
    assert_eq!(
      DataError::new_tag_not_present()
        .with_tag(dictionary::ROWS.tag)
        .to_string(),
      "DICOM data error: Tag not present, tag: (0028,0010) Rows"
    );

    assert_eq!(
      DataError::new_value_invalid("Bad".to_string()).to_string(),
      "DICOM data error: Invalid value, details: Bad"
    );
  }

  #[test]
  fn to_lines() {
    assert_eq!(
      DataError::new_value_length_invalid(
        ValueRepresentation::UnsignedShort,
        3,
        "Not a multiple of 2".to_string()
      )
      .with_tag(dictionary::COLUMNS.tag)
      .to_lines("reading columns"),
      vec![
        "DICOM data error reading columns",
        "",
        "  Error: Invalid value length",
        "  Tag: (0028,0011) Columns",
        "  VR: US",
        "  Length: 3 bytes",
        "  Details: Not a multiple of 2",
      ]
    );
  }
}
