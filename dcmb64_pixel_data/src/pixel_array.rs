//! A decoded frame of pixel data, holding stored sample values at their
//! native width and signedness.

/// Whether a pixel array holds a single channel per pixel or interleaved RGB
/// samples.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColorMode {
  Grayscale,
  Rgb,
}

impl core::fmt::Display for ColorMode {
  fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
    match self {
      Self::Grayscale => f.write_str("grayscale"),
      Self::Rgb => f.write_str("RGB"),
    }
  }
}

/// The samples of a pixel array. Single channel variants hold one sample per
/// pixel, and RGB variants hold three interleaved samples per pixel.
///
#[derive(Clone, Debug, PartialEq)]
pub enum PixelArrayData {
  U8(Vec<u8>),
  I8(Vec<i8>),
  U16(Vec<u16>),
  I16(Vec<i16>),
  U32(Vec<u32>),
  I32(Vec<i32>),
  Rgb8(Vec<u8>),
  Rgb16(Vec<u16>),
}

impl PixelArrayData {
  fn len(&self) -> usize {
    match self {
      Self::U8(data) | Self::Rgb8(data) => data.len(),
      Self::I8(data) => data.len(),
      Self::U16(data) | Self::Rgb16(data) => data.len(),
      Self::I16(data) => data.len(),
      Self::U32(data) => data.len(),
      Self::I32(data) => data.len(),
    }
  }

  fn color_mode(&self) -> ColorMode {
    match self {
      Self::Rgb8(_) | Self::Rgb16(_) => ColorMode::Rgb,
      _ => ColorMode::Grayscale,
    }
  }

  fn name(&self) -> &'static str {
    match self {
      Self::U8(_) => "u8",
      Self::I8(_) => "i8",
      Self::U16(_) => "u16",
      Self::I16(_) => "i16",
      Self::U32(_) => "u32",
      Self::I32(_) => "i32",
      Self::Rgb8(_) => "rgb8",
      Self::Rgb16(_) => "rgb16",
    }
  }
}

/// A decoded two-dimensional frame of pixel data.
///
#[derive(Clone, Debug, PartialEq)]
pub struct PixelArray {
  width: u16,
  height: u16,
  data: PixelArrayData,
}

impl PixelArray {
  /// Creates a new pixel array, checking that the number of samples matches
  /// the dimensions.
  ///
  pub fn new(
    width: u16,
    height: u16,
    data: PixelArrayData,
  ) -> Result<Self, &'static str> {
    let samples_per_pixel = match data.color_mode() {
      ColorMode::Grayscale => 1,
      ColorMode::Rgb => 3,
    };

    let pixel_count = usize::from(width) * usize::from(height);

    if data.len() != pixel_count * samples_per_pixel {
      return Err("Pixel array data length does not match its dimensions");
    }

    Ok(Self {
      width,
      height,
      data,
    })
  }

  pub fn width(&self) -> u16 {
    self.width
  }

  pub fn height(&self) -> u16 {
    self.height
  }

  pub fn data(&self) -> &PixelArrayData {
    &self.data
  }

  pub fn into_data(self) -> PixelArrayData {
    self.data
  }

  pub fn color_mode(&self) -> ColorMode {
    self.data.color_mode()
  }
}

impl core::fmt::Display for PixelArray {
  fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
    write!(f, "{}x{} {}", self.width, self.height, self.data.name())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn new_checks_dimensions() {
    assert!(PixelArray::new(2, 2, PixelArrayData::U16(vec![0; 4])).is_ok());
    assert!(PixelArray::new(2, 2, PixelArrayData::Rgb8(vec![0; 12])).is_ok());
    assert!(PixelArray::new(2, 2, PixelArrayData::Rgb8(vec![0; 4])).is_err());
    assert!(PixelArray::new(3, 1, PixelArrayData::I8(vec![0; 2])).is_err());
  }

  #[test]
  fn color_mode() {
    let array = PixelArray::new(1, 1, PixelArrayData::I32(vec![-5])).unwrap();
    assert_eq!(array.color_mode(), ColorMode::Grayscale);
    assert_eq!(array.to_string(), "1x1 i32");

    let array =
      PixelArray::new(1, 1, PixelArrayData::Rgb16(vec![1, 2, 3])).unwrap();
    assert_eq!(array.color_mode(), ColorMode::Rgb);
  }
}
