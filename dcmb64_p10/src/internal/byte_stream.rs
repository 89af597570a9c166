use std::io::Read;

/// A byte stream over a complete in-memory buffer of DICOM P10 data that
/// allows data to be read and peeked while tracking the read offset.
///
/// The unread remainder of the stream can optionally be passed through zlib
/// inflate, which is used for the deflated transfer syntax.
///
#[derive(Debug)]
pub struct ByteStream {
  bytes: Vec<u8>,
  position: usize,
  inflated_at: Option<u64>,
}

#[derive(Debug, PartialEq)]
pub enum ByteStreamError {
  /// Data was not read because it would go past the end of the byte stream.
  DataEnd,

  /// The data passed through zlib inflate was not valid deflate data.
  ZlibDataError,
}

impl ByteStream {
  /// Creates a new byte stream over the given bytes.
  ///
  pub fn new(bytes: Vec<u8>) -> ByteStream {
    ByteStream {
      bytes,
      position: 0,
      inflated_at: None,
    }
  }

  /// Returns the total number of bytes that have been successfully read out of
  /// the byte stream. Once zlib inflate is active this counts inflated bytes
  /// from the point at which inflate started.
  ///
  pub fn bytes_read(&self) -> u64 {
    match self.inflated_at {
      Some(offset) => offset + self.position as u64,
      None => self.position as u64,
    }
  }

  /// Returns the number of bytes that are yet to be read.
  ///
  pub fn bytes_remaining(&self) -> usize {
    self.bytes.len() - self.position
  }

  /// Returns whether the byte stream is fully consumed.
  ///
  pub fn is_fully_consumed(&self) -> bool {
    self.bytes_remaining() == 0
  }

  /// Reads bytes out of the byte stream.
  ///
  pub fn read(&mut self, byte_count: usize) -> Result<&[u8], ByteStreamError> {
    if byte_count > self.bytes_remaining() {
      return Err(ByteStreamError::DataEnd);
    }

    let start = self.position;
    self.position += byte_count;

    Ok(&self.bytes[start..self.position])
  }

  /// Peeks at the next bytes that will be read out of the byte stream without
  /// consuming them.
  ///
  pub fn peek(&self, byte_count: usize) -> Result<&[u8], ByteStreamError> {
    if byte_count > self.bytes_remaining() {
      return Err(ByteStreamError::DataEnd);
    }

    Ok(&self.bytes[self.position..(self.position + byte_count)])
  }

  /// Skips over the next bytes in the byte stream.
  ///
  pub fn skip(&mut self, byte_count: usize) -> Result<(), ByteStreamError> {
    self.read(byte_count).map(|_| ())
  }

  /// Passes all unread bytes through zlib inflate. All subsequent reads return
  /// inflated data.
  ///
  pub fn start_zlib_inflate(&mut self) -> Result<(), ByteStreamError> {
    let mut inflated = vec![];

    flate2::read::DeflateDecoder::new(&self.bytes[self.position..])
      .read_to_end(&mut inflated)
      .map_err(|_| ByteStreamError::ZlibDataError)?;

    self.inflated_at = Some(self.position as u64);
    self.bytes = inflated;
    self.position = 0;

    Ok(())
  }
}
