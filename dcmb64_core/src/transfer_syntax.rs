//! Defines the DICOM transfer syntaxes recognized when reading DICOM P10 data.
//!
//! Ref: PS3.5 10.

/// Describes a single DICOM transfer syntax, with its name, UID, and how it
/// serializes data element headers and values.
///
#[derive(Debug, PartialEq)]
pub struct TransferSyntax {
  pub name: &'static str,
  pub uid: &'static str,
  pub vr_serialization: VrSerialization,
  pub endianness: Endianness,
  pub is_deflated: bool,
  pub is_encapsulated: bool,
}

/// Whether data element VRs are serialized explicitly in the data element
/// header, or are implicit and must be inferred from the tag.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VrSerialization {
  VrImplicit,
  VrExplicit,
}

/// The byte order of data element headers and binary values.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Endianness {
  LittleEndian,
  BigEndian,
}

impl TransferSyntax {
  /// Returns the transfer syntax with the given UID. Trailing NULL and space
  /// padding on the UID is ignored.
  ///
  #[allow(clippy::result_unit_err)]
  pub fn from_uid(uid: &str) -> Result<&'static TransferSyntax, ()> {
    let uid = uid.trim_end_matches(['\0', ' ']);

    ALL.iter().copied().find(|ts| ts.uid == uid).ok_or(())
  }
}

impl core::fmt::Display for TransferSyntax {
  fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
    write!(f, "{} ({})", self.name, self.uid)
  }
}

const fn native(
  name: &'static str,
  uid: &'static str,
  vr_serialization: VrSerialization,
  endianness: Endianness,
  is_deflated: bool,
) -> TransferSyntax {
  TransferSyntax {
    name,
    uid,
    vr_serialization,
    endianness,
    is_deflated,
    is_encapsulated: false,
  }
}

const fn encapsulated(name: &'static str, uid: &'static str) -> TransferSyntax {
  TransferSyntax {
    name,
    uid,
    vr_serialization: VrSerialization::VrExplicit,
    endianness: Endianness::LittleEndian,
    is_deflated: false,
    is_encapsulated: true,
  }
}

pub const IMPLICIT_VR_LITTLE_ENDIAN: TransferSyntax = native(
  "Implicit VR Little Endian",
  "1.2.840.10008.1.2",
  VrSerialization::VrImplicit,
  Endianness::LittleEndian,
  false,
);

pub const EXPLICIT_VR_LITTLE_ENDIAN: TransferSyntax = native(
  "Explicit VR Little Endian",
  "1.2.840.10008.1.2.1",
  VrSerialization::VrExplicit,
  Endianness::LittleEndian,
  false,
);

pub const ENCAPSULATED_UNCOMPRESSED_EXPLICIT_VR_LITTLE_ENDIAN: TransferSyntax =
  encapsulated(
    "Encapsulated Uncompressed Explicit VR Little Endian",
    "1.2.840.10008.1.2.1.98",
  );

pub const DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN: TransferSyntax = native(
  "Deflated Explicit VR Little Endian",
  "1.2.840.10008.1.2.1.99",
  VrSerialization::VrExplicit,
  Endianness::LittleEndian,
  true,
);

pub const EXPLICIT_VR_BIG_ENDIAN: TransferSyntax = native(
  "Explicit VR Big Endian",
  "1.2.840.10008.1.2.2",
  VrSerialization::VrExplicit,
  Endianness::BigEndian,
  false,
);

pub const JPEG_BASELINE_8BIT: TransferSyntax =
  encapsulated("JPEG Baseline (Process 1)", "1.2.840.10008.1.2.4.50");

pub const JPEG_EXTENDED_12BIT: TransferSyntax =
  encapsulated("JPEG Extended (Process 2 & 4)", "1.2.840.10008.1.2.4.51");

pub const JPEG_LOSSLESS_NON_HIERARCHICAL: TransferSyntax = encapsulated(
  "JPEG Lossless, Non-Hierarchical (Process 14)",
  "1.2.840.10008.1.2.4.57",
);

pub const JPEG_LOSSLESS_NON_HIERARCHICAL_SV1: TransferSyntax = encapsulated(
  "JPEG Lossless, Non-Hierarchical, First-Order Prediction (Process 14 \
   [Selection Value 1])",
  "1.2.840.10008.1.2.4.70",
);

pub const JPEG_LS_LOSSLESS: TransferSyntax = encapsulated(
  "JPEG-LS Lossless Image Compression",
  "1.2.840.10008.1.2.4.80",
);

pub const JPEG_LS_LOSSY_NEAR_LOSSLESS: TransferSyntax = encapsulated(
  "JPEG-LS Lossy (Near-Lossless) Image Compression",
  "1.2.840.10008.1.2.4.81",
);

pub const JPEG_2000_LOSSLESS_ONLY: TransferSyntax = encapsulated(
  "JPEG 2000 Image Compression (Lossless Only)",
  "1.2.840.10008.1.2.4.90",
);

pub const JPEG_2000: TransferSyntax =
  encapsulated("JPEG 2000 Image Compression", "1.2.840.10008.1.2.4.91");

pub const RLE_LOSSLESS: TransferSyntax =
  encapsulated("RLE Lossless", "1.2.840.10008.1.2.5");

/// All transfer syntaxes recognized by [`TransferSyntax::from_uid()`].
///
pub const ALL: [&TransferSyntax; 14] = [
  &IMPLICIT_VR_LITTLE_ENDIAN,
  &EXPLICIT_VR_LITTLE_ENDIAN,
  &ENCAPSULATED_UNCOMPRESSED_EXPLICIT_VR_LITTLE_ENDIAN,
  &DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN,
  &EXPLICIT_VR_BIG_ENDIAN,
  &JPEG_BASELINE_8BIT,
  &JPEG_EXTENDED_12BIT,
  &JPEG_LOSSLESS_NON_HIERARCHICAL,
  &JPEG_LOSSLESS_NON_HIERARCHICAL_SV1,
  &JPEG_LS_LOSSLESS,
  &JPEG_LS_LOSSY_NEAR_LOSSLESS,
  &JPEG_2000_LOSSLESS_ONLY,
  &JPEG_2000,
  &RLE_LOSSLESS,
];

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn from_uid() {
    assert_eq!(
      TransferSyntax::from_uid("1.2.840.10008.1.2.1"),
      Ok(&EXPLICIT_VR_LITTLE_ENDIAN)
    );
    assert_eq!(
      TransferSyntax::from_uid("1.2.840.10008.1.2.4.50\0"),
      Ok(&JPEG_BASELINE_8BIT)
    );
    assert_eq!(TransferSyntax::from_uid("1.2.3"), Err(()));
  }

  #[test]
  fn encapsulated_syntaxes_are_explicit_little_endian() {
    for ts in ALL.iter().filter(|ts| ts.is_encapsulated) {
      assert_eq!(ts.vr_serialization, VrSerialization::VrExplicit);
      assert_eq!(ts.endianness, Endianness::LittleEndian);
    }
  }
}
