use std::io::Write;

use assert_cmd::{Command, assert::Assert, cargo::cargo_bin_cmd};
use tempfile::NamedTempFile;

pub const EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1";

pub fn dcmb64_cli() -> Command {
  let mut cmd = cargo_bin_cmd!("dcmb64_cli");
  cmd.env_remove("RUST_LOG");
  cmd
}

pub fn get_stdout(assert: &Assert) -> String {
  String::from_utf8(assert.get_output().stdout.clone()).unwrap()
}

/// Writes the given bytes to a new temporary file. The file is deleted when
/// the returned value is dropped.
///
pub fn create_temp_file(bytes: &[u8]) -> NamedTempFile {
  let mut file = NamedTempFile::new().unwrap();
  file.write_all(bytes).unwrap();
  file.flush().unwrap();
  file
}

/// Serializes a data element in the Explicit VR Little Endian transfer
/// syntax. Values of odd length are padded.
///
pub fn explicit_vr_le(
  group: u16,
  element: u16,
  vr: &str,
  value: &[u8],
) -> Vec<u8> {
  let mut value = value.to_vec();
  if value.len() % 2 == 1 {
    value.push(if vr == "UI" || vr == "OB" { 0 } else { b' ' });
  }

  let mut bytes = vec![];
  bytes.extend_from_slice(&group.to_le_bytes());
  bytes.extend_from_slice(&element.to_le_bytes());
  bytes.extend_from_slice(vr.as_bytes());

  if ["OB", "OW", "SQ", "UN", "UT"].contains(&vr) {
    bytes.extend_from_slice(&[0, 0]);
    bytes.extend_from_slice(&(value.len() as u32).to_le_bytes());
  } else {
    bytes.extend_from_slice(&(value.len() as u16).to_le_bytes());
  }

  bytes.extend(value);
  bytes
}

fn us(group: u16, element: u16, value: u16) -> Vec<u8> {
  explicit_vr_le(group, element, "US", &value.to_le_bytes())
}

/// The layout of the image stored in a generated DICOM P10 file.
///
pub struct TestImage<'a> {
  pub photometric_interpretation: &'a str,
  pub samples_per_pixel: u16,
  pub rows: u16,
  pub columns: u16,
  pub bits_allocated: u16,
  pub pixel_representation: u16,
  pub number_of_frames: Option<u16>,
  pub pixel_data: Vec<u8>,
}

impl TestImage<'_> {
  pub fn grayscale_u8(rows: u16, columns: u16, pixels: Vec<u8>) -> Self {
    TestImage {
      photometric_interpretation: "MONOCHROME2",
      samples_per_pixel: 1,
      rows,
      columns,
      bits_allocated: 8,
      pixel_representation: 0,
      number_of_frames: None,
      pixel_data: pixels,
    }
  }

  pub fn grayscale_i16(rows: u16, columns: u16, pixels: &[i16]) -> Self {
    TestImage {
      bits_allocated: 16,
      pixel_representation: 1,
      pixel_data: pixels.iter().flat_map(|p| p.to_le_bytes()).collect(),
      ..Self::grayscale_u8(rows, columns, vec![])
    }
  }

  pub fn rgb_u8(rows: u16, columns: u16, pixels: Vec<u8>) -> Self {
    TestImage {
      photometric_interpretation: "RGB",
      samples_per_pixel: 3,
      ..Self::grayscale_u8(rows, columns, pixels)
    }
  }

  /// Serializes the image as a DICOM P10 file in the Explicit VR Little
  /// Endian transfer syntax.
  ///
  pub fn to_p10_bytes(&self) -> Vec<u8> {
    let mut bytes = vec![0u8; 128];
    bytes.extend_from_slice(b"DICM");

    let transfer_syntax = explicit_vr_le(
      0x0002,
      0x0010,
      "UI",
      EXPLICIT_VR_LITTLE_ENDIAN.as_bytes(),
    );
    bytes.extend(explicit_vr_le(
      0x0002,
      0x0000,
      "UL",
      &(transfer_syntax.len() as u32).to_le_bytes(),
    ));
    bytes.extend(transfer_syntax);

    bytes.extend(us(0x0028, 0x0002, self.samples_per_pixel));
    bytes.extend(explicit_vr_le(
      0x0028,
      0x0004,
      "CS",
      self.photometric_interpretation.as_bytes(),
    ));
    if self.samples_per_pixel == 3 {
      bytes.extend(us(0x0028, 0x0006, 0));
    }
    if let Some(number_of_frames) = self.number_of_frames {
      bytes.extend(explicit_vr_le(
        0x0028,
        0x0008,
        "IS",
        number_of_frames.to_string().as_bytes(),
      ));
    }
    bytes.extend(us(0x0028, 0x0010, self.rows));
    bytes.extend(us(0x0028, 0x0011, self.columns));
    bytes.extend(us(0x0028, 0x0100, self.bits_allocated));
    bytes.extend(us(0x0028, 0x0101, self.bits_allocated));
    bytes.extend(us(0x0028, 0x0102, self.bits_allocated - 1));
    bytes.extend(us(0x0028, 0x0103, self.pixel_representation));

    let pixel_data_vr = if self.bits_allocated == 8 { "OB" } else { "OW" };
    bytes.extend(explicit_vr_le(
      0x7FE0,
      0x0010,
      pixel_data_vr,
      &self.pixel_data,
    ));

    bytes
  }

  pub fn to_temp_file(&self) -> NamedTempFile {
    create_temp_file(&self.to_p10_bytes())
  }
}
