use dcmb64_core::{DataError, Dcmb64Error, TransferSyntax, transfer_syntax};

use crate::{ImagePixelModule, PixelArray, PixelDataFrame};

mod jpeg;
mod native;
mod rle_lossless;
mod ybr_to_rgb;

/// Errors that can occur when decoding frames of image data in a specific
/// transfer syntax.
///
#[derive(Clone, Debug, PartialEq)]
pub enum PixelDataDecodeError {
  /// The transfer syntax is not supported for decoding.
  TransferSyntaxNotSupported {
    transfer_syntax: &'static TransferSyntax,
  },

  /// The configuration of the Image Pixel Module is not supported for
  /// decoding, so decoding can't be attempted.
  ImagePixelModuleNotSupported { details: String },

  /// There was an error reading or parsing the provided raw pixel data, i.e. it
  /// is invalid for the given Image Pixel Module and transfer syntax.
  DataInvalid { details: String },

  /// Decode succeeded but there was an error when constructing the
  /// [`PixelArray`] to be returned.
  ImageCreationFailed(&'static str),
}

impl PixelDataDecodeError {
  /// Returns the name of the pixel data decode error as a human-readable
  /// string.
  ///
  pub fn name(&self) -> &'static str {
    match self {
      Self::TransferSyntaxNotSupported { .. } => {
        "Transfer syntax not supported"
      }
      Self::ImagePixelModuleNotSupported { .. } => {
        "Image pixel module not supported for decode"
      }
      Self::DataInvalid { .. } => "Data invalid",
      Self::ImageCreationFailed(..) => "Image creation failed",
    }
  }
}

impl From<DataError> for PixelDataDecodeError {
  fn from(e: DataError) -> Self {
    Self::DataInvalid {
      details: e.to_string(),
    }
  }
}

impl core::fmt::Display for PixelDataDecodeError {
  fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
    match self {
      Self::TransferSyntaxNotSupported { transfer_syntax } => {
        write!(
          f,
          "Transfer syntax '{}' is not supported",
          transfer_syntax.name
        )
      }
      Self::ImagePixelModuleNotSupported { details } => {
        write!(f, "Image pixel module not supported, details: {details}")
      }
      Self::DataInvalid { details } => {
        write!(f, "Data invalid, details: '{details}'")
      }
      Self::ImageCreationFailed(details) => {
        write!(f, "Image creation failed, details: '{details}'")
      }
    }
  }
}

impl Dcmb64Error for PixelDataDecodeError {
  fn to_lines(&self, task_description: &str) -> Vec<String> {
    let mut lines = vec![
      format!("Pixel data decode error {task_description}"),
      "".to_string(),
      format!("  Error: {}", self.name()),
    ];

    match self {
      Self::TransferSyntaxNotSupported { transfer_syntax } => {
        lines.push(format!("  Transfer syntax: {}", transfer_syntax.name));
      }
      Self::ImagePixelModuleNotSupported { details }
      | Self::DataInvalid { details } => {
        lines.push(format!("  Details: {details}"));
      }
      Self::ImageCreationFailed(details) => {
        lines.push(format!("  Details: {details}"));
      }
    }

    lines
  }
}

/// Decodes a frame of pixel data into a [`PixelArray`] of stored values.
///
/// Native pixel data is decoded directly. Of the encapsulated transfer
/// syntaxes, 'RLE Lossless' and 'JPEG Baseline (Process 1)' are supported.
///
pub fn decode_frame(
  frame: &PixelDataFrame,
  transfer_syntax: &'static TransferSyntax,
  image_pixel_module: &ImagePixelModule,
) -> Result<PixelArray, PixelDataDecodeError> {
  use transfer_syntax::*;

  log::debug!(
    "Decoding frame {} of {} bytes with transfer syntax '{}'",
    frame.index(),
    frame.len(),
    transfer_syntax.name
  );

  if transfer_syntax == &IMPLICIT_VR_LITTLE_ENDIAN
    || transfer_syntax == &EXPLICIT_VR_LITTLE_ENDIAN
    || transfer_syntax == &ENCAPSULATED_UNCOMPRESSED_EXPLICIT_VR_LITTLE_ENDIAN
    || transfer_syntax == &DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN
    || transfer_syntax == &EXPLICIT_VR_BIG_ENDIAN
  {
    native::decode(image_pixel_module, frame.data(), frame.bit_offset())
  } else if transfer_syntax == &RLE_LOSSLESS {
    rle_lossless::decode(image_pixel_module, frame.data())
  } else if transfer_syntax == &JPEG_BASELINE_8BIT {
    jpeg::decode(image_pixel_module, frame.data())
  } else {
    Err(PixelDataDecodeError::TransferSyntaxNotSupported { transfer_syntax })
  }
}
