//! Holds a single frame of pixel data in its raw form. Details of how to
//! interpret the data are not a concern of [`PixelDataFrame`].

/// A single frame of raw pixel data, which is either native pixel data or the
/// concatenated fragments of one encapsulated frame.
///
#[derive(Clone, Debug, PartialEq)]
pub struct PixelDataFrame {
  index: usize,
  data: Vec<u8>,
  bit_offset: usize,
}

impl PixelDataFrame {
  /// Creates a new frame of pixel data with the given index and data.
  ///
  pub fn new(index: usize, data: Vec<u8>) -> Self {
    Self {
      index,
      data,
      bit_offset: 0,
    }
  }

  /// Returns the index of this frame, i.e. 0 for the first frame in its data
  /// set, 1 for the second frame, etc.
  ///
  pub fn index(&self) -> usize {
    self.index
  }

  pub fn data(&self) -> &[u8] {
    &self.data
  }

  /// Returns the bit offset for this frame.
  ///
  /// The bit offset is only relevant to native multi-frame pixel data that has
  /// a *'(0028,0100) Bits Allocated'* value of 1, where frames don't have to
  /// start on a byte boundary. It specifies how many low bits of this frame's
  /// first byte belong to the previous frame. In all other cases it is zero.
  ///
  pub fn bit_offset(&self) -> usize {
    self.bit_offset
  }

  pub(crate) fn set_bit_offset(&mut self, bit_offset: usize) {
    self.bit_offset = bit_offset.clamp(0, 7);
  }

  /// The size in bytes of this frame of pixel data.
  ///
  pub fn len(&self) -> usize {
    self.data.len()
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }
}
