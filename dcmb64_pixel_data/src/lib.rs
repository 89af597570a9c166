//! Access and decode pixel data in a DICOM data set.

pub mod decode;
mod image_pixel_module;
mod pixel_array;
mod pixel_data_frame;
mod pixel_data_frames;

pub use decode::{PixelDataDecodeError, decode_frame};
pub use image_pixel_module::{
  BitsAllocated, ImagePixelModule, PhotometricInterpretation,
  PixelRepresentation, PlanarConfiguration, SamplesPerPixel,
};
pub use pixel_array::{ColorMode, PixelArray, PixelArrayData};
pub use pixel_data_frame::PixelDataFrame;

use dcmb64_core::{DataError, DataSet, dictionary};

/// Adds functions to [`DataSet`] for accessing its pixel data.
///
pub trait DataSetPixelDataExtensions
where
  Self: Sized,
{
  /// Returns the Image Pixel Module specified by the data set.
  ///
  fn get_image_pixel_module(&self) -> Result<ImagePixelModule, DataError>;

  /// Returns the frames of pixel data present in a data set.
  ///
  /// The *'(7FE0,0010) Pixel Data'* data element must be present in the data
  /// set, and the *'(0028,0008) Number of Frames'* data element is used when
  /// present.
  ///
  fn get_pixel_data_frames(&self) -> Result<Vec<PixelDataFrame>, DataError>;
}

impl DataSetPixelDataExtensions for DataSet {
  fn get_image_pixel_module(&self) -> Result<ImagePixelModule, DataError> {
    ImagePixelModule::from_data_set(self)
  }

  fn get_pixel_data_frames(&self) -> Result<Vec<PixelDataFrame>, DataError> {
    let value = self.get_value(dictionary::PIXEL_DATA.tag)?;
    let image_pixel_module = self.get_image_pixel_module()?;

    pixel_data_frames::frames(value, &image_pixel_module)
  }
}
