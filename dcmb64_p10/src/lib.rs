//! Reads the DICOM Part 10 (P10) binary format used to store and transmit
//! DICOM-based medical imaging information.

pub mod p10_error;
pub mod p10_read;
pub mod p10_read_config;

mod internal;

use std::{fs::File, io::Read, path::Path};

use dcmb64_core::DataSet;

pub use p10_error::P10Error;
pub use p10_read::P10ReadContext;
pub use p10_read_config::P10ReadConfig;

/// Returns whether the given bytes contain DICOM P10 data by checking for the
/// presence of the 'DICM' prefix at offset 128.
///
pub fn is_valid_bytes(bytes: &[u8]) -> bool {
  bytes.len() >= 132 && bytes[128..132] == *b"DICM".as_slice()
}

/// Reads DICOM P10 data from a file into an in-memory data set.
///
pub fn read_file<P: AsRef<Path>>(filename: P) -> Result<DataSet, P10Error> {
  read_file_with_config(filename, None)
}

/// Reads DICOM P10 data from a file into an in-memory data set using the
/// specified read config.
///
pub fn read_file_with_config<P: AsRef<Path>>(
  filename: P,
  config: Option<P10ReadConfig>,
) -> Result<DataSet, P10Error> {
  let filename = filename.as_ref();

  log::debug!("Reading DICOM P10 file \"{}\"", filename.display());

  match File::open(filename) {
    Ok(mut file) => read_stream_with_config(&mut file, config),
    Err(e) => Err(P10Error::FileError {
      when: "Opening file".to_string(),
      details: e.to_string(),
    }),
  }
}

/// Reads all remaining data in a read stream into an in-memory data set.
///
fn read_stream_with_config(
  stream: &mut impl Read,
  config: Option<P10ReadConfig>,
) -> Result<DataSet, P10Error> {
  let mut bytes = vec![];

  stream
    .read_to_end(&mut bytes)
    .map_err(|e| P10Error::FileError {
      when: "Reading from stream".to_string(),
      details: e.to_string(),
    })?;

  read_bytes_with_config(bytes, config)
}

/// Reads DICOM P10 data from a vector of bytes into a data set.
///
pub fn read_bytes(bytes: Vec<u8>) -> Result<DataSet, P10Error> {
  read_bytes_with_config(bytes, None)
}

/// Reads DICOM P10 data from a vector of bytes into a data set using the
/// specified read config.
///
pub fn read_bytes_with_config(
  bytes: Vec<u8>,
  config: Option<P10ReadConfig>,
) -> Result<DataSet, P10Error> {
  let mut context = P10ReadContext::new(bytes, config);

  context.read_data_set()
}
