//! Reads DICOM P10 files, decodes their pixel data, and converts it into
//! base64-encoded JPEG images.

pub use dcmb64_core as core;
pub use dcmb64_p10 as p10;
pub use dcmb64_pixel_data as pixel_data;

pub mod conversion;
