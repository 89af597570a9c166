//! A DICOM data set, defined as a map of data element tags to data element
//! values.

use std::collections::BTreeMap;

use crate::{DataElementTag, DataElementValue, DataError};

/// A DICOM data set that is a mapping of data element tags to data element
/// values, ordered by tag.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DataSet(BTreeMap<DataElementTag, DataElementValue>);

impl DataSet {
  /// Returns a new empty data set.
  ///
  pub fn new() -> Self {
    Self(BTreeMap::new())
  }

  /// Returns the number of data elements in the data set.
  ///
  pub fn size(&self) -> usize {
    self.0.len()
  }

  /// Returns whether the data set is empty.
  ///
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// Returns whether a data element with the specified tag exists in the data
  /// set.
  ///
  pub fn has(&self, tag: DataElementTag) -> bool {
    self.0.contains_key(&tag)
  }

  /// Inserts a data element tag and value into the data set, replacing any
  /// existing value for the tag.
  ///
  pub fn insert(&mut self, tag: DataElementTag, value: DataElementValue) {
    self.0.insert(tag, value);
  }

  /// Returns the tags in the data set, in ascending order.
  ///
  pub fn tags(&self) -> Vec<DataElementTag> {
    self.0.keys().copied().collect()
  }

  /// Returns the data element value for the specified tag.
  ///
  pub fn get_value(
    &self,
    tag: DataElementTag,
  ) -> Result<&DataElementValue, DataError> {
    self
      .0
      .get(&tag)
      .ok_or_else(|| DataError::new_tag_not_present().with_tag(tag))
  }

  /// Returns the string value of the specified tag.
  ///
  pub fn get_string(&self, tag: DataElementTag) -> Result<&str, DataError> {
    self
      .get_value(tag)?
      .get_string()
      .map_err(|e| e.with_tag(tag))
  }

  /// Returns the single integer value of the specified tag.
  ///
  pub fn get_int<T: TryFrom<i64>>(
    &self,
    tag: DataElementTag,
  ) -> Result<T, DataError> {
    self.get_value(tag)?.get_int().map_err(|e| e.with_tag(tag))
  }

  /// Returns the single integer value of the specified tag, or the given
  /// default if the tag is not present.
  ///
  pub fn get_int_with_default<T: TryFrom<i64>>(
    &self,
    tag: DataElementTag,
    default: T,
  ) -> Result<T, DataError> {
    if self.has(tag) {
      self.get_int(tag)
    } else {
      Ok(default)
    }
  }

  /// Merges all data elements from another data set into this one.
  ///
  pub fn merge(&mut self, other: DataSet) {
    self.0.extend(other.0);
  }
}

impl FromIterator<(DataElementTag, DataElementValue)> for DataSet {
  fn from_iter<I: IntoIterator<Item = (DataElementTag, DataElementValue)>>(
    iter: I,
  ) -> Self {
    Self(iter.into_iter().collect())
  }
}
