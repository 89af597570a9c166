//! The values of the Image Pixel Module data elements that describe how to
//! interpret stored pixel data.

use dcmb64_core::{DataError, DataSet, dictionary};

/// Holds the values of the data elements needed to decode a frame of pixel
/// data.
///
#[derive(Clone, Debug, PartialEq)]
pub struct ImagePixelModule {
  samples_per_pixel: SamplesPerPixel,
  photometric_interpretation: PhotometricInterpretation,
  rows: u16,
  columns: u16,
  bits_allocated: BitsAllocated,
  bits_stored: u16,
  pixel_representation: PixelRepresentation,
  number_of_frames: usize,
}

impl core::fmt::Display for ImagePixelModule {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("ImagePixelModule")
      .field("samples_per_pixel", &self.samples_per_pixel)
      .field(
        "photometric_interpretation",
        &self.photometric_interpretation.to_string(),
      )
      .field("rows", &self.rows)
      .field("columns", &self.columns)
      .field("bits_allocated", &self.bits_allocated)
      .field("bits_stored", &self.bits_stored)
      .field("pixel_representation", &self.pixel_representation)
      .field("number_of_frames", &self.number_of_frames)
      .finish()
  }
}

impl ImagePixelModule {
  /// Reads an Image Pixel Module from the relevant data elements in a data
  /// set, validating that their values are consistent with each other.
  ///
  pub fn from_data_set(data_set: &DataSet) -> Result<Self, DataError> {
    let samples_per_pixel = SamplesPerPixel::from_data_set(data_set)?;

    let photometric_interpretation =
      PhotometricInterpretation::from_data_set(data_set)?;

    let rows = data_set.get_int::<u16>(dictionary::ROWS.tag)?;
    let columns = data_set.get_int::<u16>(dictionary::COLUMNS.tag)?;
    let bits_allocated = BitsAllocated::from_data_set(data_set)?;

    let bits_stored = data_set.get_int::<u16>(dictionary::BITS_STORED.tag)?;
    if bits_stored == 0 || bits_stored > u16::from(u8::from(bits_allocated)) {
      return Err(
        DataError::new_value_invalid(format!(
          "Bits stored value of '{bits_stored}' is invalid for bits allocated \
           of '{}'",
          u8::from(bits_allocated)
        ))
        .with_tag(dictionary::BITS_STORED.tag),
      );
    }

    let pixel_representation = PixelRepresentation::from_data_set(data_set)?;

    // A Number of Frames of zero is treated the same as it being absent
    let number_of_frames = data_set
      .get_int_with_default::<usize>(dictionary::NUMBER_OF_FRAMES.tag, 1)?
      .max(1);

    let module = Self {
      samples_per_pixel,
      photometric_interpretation,
      rows,
      columns,
      bits_allocated,
      bits_stored,
      pixel_representation,
      number_of_frames,
    };

    module.validate()?;

    Ok(module)
  }

  fn validate(&self) -> Result<(), DataError> {
    let expected_samples_per_pixel =
      if self.photometric_interpretation.is_color() && !self.is_palette_color()
      {
        3
      } else {
        1
      };

    if u8::from(self.samples_per_pixel) != expected_samples_per_pixel {
      return Err(
        DataError::new_value_invalid(format!(
          "Samples per pixel of '{}' is invalid for photometric \
           interpretation '{}'",
          u8::from(self.samples_per_pixel),
          self.photometric_interpretation
        ))
        .with_tag(dictionary::SAMPLES_PER_PIXEL.tag),
      );
    }

    if self.bits_allocated == BitsAllocated::One
      && self.samples_per_pixel != SamplesPerPixel::One
    {
      return Err(
        DataError::new_value_invalid(
          "Bits allocated of '1' requires a single sample per pixel"
            .to_string(),
        )
        .with_tag(dictionary::BITS_ALLOCATED.tag),
      );
    }

    Ok(())
  }

  pub fn samples_per_pixel(&self) -> SamplesPerPixel {
    self.samples_per_pixel
  }

  pub fn photometric_interpretation(&self) -> PhotometricInterpretation {
    self.photometric_interpretation
  }

  pub fn rows(&self) -> u16 {
    self.rows
  }

  pub fn columns(&self) -> u16 {
    self.columns
  }

  pub fn bits_allocated(&self) -> BitsAllocated {
    self.bits_allocated
  }

  pub fn bits_stored(&self) -> u16 {
    self.bits_stored
  }

  pub fn pixel_representation(&self) -> PixelRepresentation {
    self.pixel_representation
  }

  /// Returns the number of frames of pixel data, which is one when the
  /// *'(0028,0008) Number of Frames'* data element is absent.
  ///
  pub fn number_of_frames(&self) -> usize {
    self.number_of_frames
  }

  /// Returns the number of pixels in a single frame.
  ///
  pub fn pixel_count(&self) -> usize {
    usize::from(self.rows) * usize::from(self.columns)
  }

  /// Returns the number of bits used by a single pixel across all of its
  /// samples. YBR_FULL_422 data shares its chrominance samples between pairs
  /// of pixels, so averages two samples per pixel.
  ///
  pub fn pixel_size_in_bits(&self) -> usize {
    let samples_per_pixel = if self.photometric_interpretation
      == PhotometricInterpretation::YbrFull422
    {
      2
    } else {
      usize::from(u8::from(self.samples_per_pixel))
    };

    samples_per_pixel * usize::from(u8::from(self.bits_allocated))
  }

  /// Returns the number of bits consumed by a single frame of pixel data. The
  /// largest possible frame is under 2^39 bits.
  ///
  pub fn frame_size_in_bits(&self) -> u64 {
    u64::from(self.rows)
      * u64::from(self.columns)
      * self.pixel_size_in_bits() as u64
  }

  /// Returns the number of bytes consumed by a single frame of pixel data,
  /// rounded up to a whole number of bytes.
  ///
  pub fn frame_size_in_bytes(&self) -> usize {
    self.frame_size_in_bits().div_ceil(8) as usize
  }

  /// Returns whether the stored pixel data is a single channel. This includes
  /// PALETTE COLOR data, which stores single channel indices.
  ///
  pub fn is_single_channel(&self) -> bool {
    self.samples_per_pixel == SamplesPerPixel::One
  }

  fn is_palette_color(&self) -> bool {
    self.photometric_interpretation == PhotometricInterpretation::PaletteColor
  }

  /// Returns whether the number of bits stored is less than the number of bits
  /// allocated.
  ///
  pub fn has_unused_high_bits(&self) -> bool {
    self.bits_stored < u16::from(u8::from(self.bits_allocated))
  }
}

/// The number of samples per pixel.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SamplesPerPixel {
  One,

  /// Three samples per pixel, with a planar configuration that specifies
  /// whether the samples are interleaved or stored as separate planes.
  Three {
    planar_configuration: PlanarConfiguration,
  },
}

impl SamplesPerPixel {
  fn from_data_set(data_set: &DataSet) -> Result<Self, DataError> {
    let tag = dictionary::SAMPLES_PER_PIXEL.tag;

    match data_set.get_int::<u16>(tag)? {
      1 => Ok(Self::One),

      3 => Ok(Self::Three {
        planar_configuration: PlanarConfiguration::from_data_set(data_set)?,
      }),

      value => Err(
        DataError::new_value_invalid(format!(
          "Samples per pixel value of '{value}' is invalid"
        ))
        .with_tag(tag),
      ),
    }
  }
}

impl From<SamplesPerPixel> for u8 {
  fn from(samples_per_pixel: SamplesPerPixel) -> u8 {
    match samples_per_pixel {
      SamplesPerPixel::One => 1,
      SamplesPerPixel::Three { .. } => 3,
    }
  }
}

/// Specifies the intended interpretation of pixel data.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PhotometricInterpretation {
  /// A single monochrome image plane where the minimum sample value is
  /// intended to be displayed as white.
  Monochrome1,

  /// A single monochrome image plane where the minimum sample value is
  /// intended to be displayed as black.
  Monochrome2,

  /// A single sample per pixel that indexes into color lookup tables.
  PaletteColor,

  Rgb,

  /// One luminance and two chrominance planes.
  YbrFull,

  /// The same as [`PhotometricInterpretation::YbrFull`] except that the CB
  /// and CR values are sampled horizontally at half the Y rate.
  YbrFull422,
}

impl PhotometricInterpretation {
  fn from_data_set(data_set: &DataSet) -> Result<Self, DataError> {
    let tag = dictionary::PHOTOMETRIC_INTERPRETATION.tag;

    match data_set.get_string(tag)? {
      "MONOCHROME1" => Ok(Self::Monochrome1),
      "MONOCHROME2" => Ok(Self::Monochrome2),
      "PALETTE COLOR" => Ok(Self::PaletteColor),
      "RGB" => Ok(Self::Rgb),
      "YBR_FULL" => Ok(Self::YbrFull),
      "YBR_FULL_422" => Ok(Self::YbrFull422),

      value => Err(
        DataError::new_value_invalid(format!(
          "Photometric interpretation '{value}' is not supported"
        ))
        .with_tag(tag),
      ),
    }
  }

  /// Returns whether this photometric interpretation stores grayscale pixel
  /// data.
  ///
  pub fn is_grayscale(&self) -> bool {
    matches!(self, Self::Monochrome1 | Self::Monochrome2)
  }

  pub fn is_color(&self) -> bool {
    !self.is_grayscale()
  }

  /// Returns whether this photometric interpretation specifies YBR color data.
  ///
  pub fn is_ybr(&self) -> bool {
    matches!(self, Self::YbrFull | Self::YbrFull422)
  }
}

impl core::fmt::Display for PhotometricInterpretation {
  fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
    let s = match self {
      Self::Monochrome1 => "MONOCHROME1",
      Self::Monochrome2 => "MONOCHROME2",
      Self::PaletteColor => "PALETTE COLOR",
      Self::Rgb => "RGB",
      Self::YbrFull => "YBR_FULL",
      Self::YbrFull422 => "YBR_FULL_422",
    };

    f.write_str(s)
  }
}

/// Indicates whether three-sample pixel data is encoded color-by-pixel or
/// color-by-plane.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlanarConfiguration {
  /// The samples for each pixel are stored contiguously, e.g. R1, G1, B1, R2,
  /// G2, B2, etc.
  Interleaved,

  /// Each color plane is stored contiguously, e.g. R1, R2, R3, ..., G1, G2, G3,
  /// ..., B1, B2, B3, etc.
  Separate,
}

impl PlanarConfiguration {
  fn from_data_set(data_set: &DataSet) -> Result<Self, DataError> {
    let tag = dictionary::PLANAR_CONFIGURATION.tag;

    match data_set.get_int_with_default::<u16>(tag, 0)? {
      0 => Ok(Self::Interleaved),
      1 => Ok(Self::Separate),

      value => Err(
        DataError::new_value_invalid(format!(
          "Planar configuration value of '{value}' is invalid"
        ))
        .with_tag(tag),
      ),
    }
  }
}

/// The number of bits allocated to each pixel sample.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BitsAllocated {
  One,
  Eight,
  Sixteen,
  ThirtyTwo,
}

impl BitsAllocated {
  fn from_data_set(data_set: &DataSet) -> Result<Self, DataError> {
    let tag = dictionary::BITS_ALLOCATED.tag;

    match data_set.get_int::<u16>(tag)? {
      1 => Ok(Self::One),
      8 => Ok(Self::Eight),
      16 => Ok(Self::Sixteen),
      32 => Ok(Self::ThirtyTwo),

      value => Err(
        DataError::new_value_invalid(format!(
          "Bits allocated value of '{value}' is not supported"
        ))
        .with_tag(tag),
      ),
    }
  }
}

impl From<BitsAllocated> for u8 {
  fn from(bits_allocated: BitsAllocated) -> u8 {
    match bits_allocated {
      BitsAllocated::One => 1,
      BitsAllocated::Eight => 8,
      BitsAllocated::Sixteen => 16,
      BitsAllocated::ThirtyTwo => 32,
    }
  }
}

/// Whether stored pixel samples are unsigned integers or two's complement
/// signed integers.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PixelRepresentation {
  Unsigned,
  Signed,
}

impl PixelRepresentation {
  fn from_data_set(data_set: &DataSet) -> Result<Self, DataError> {
    let tag = dictionary::PIXEL_REPRESENTATION.tag;

    match data_set.get_int_with_default::<u16>(tag, 0)? {
      0 => Ok(Self::Unsigned),
      1 => Ok(Self::Signed),

      value => Err(
        DataError::new_value_invalid(format!(
          "Pixel representation value of '{value}' is invalid"
        ))
        .with_tag(tag),
      ),
    }
  }

  pub fn is_signed(&self) -> bool {
    *self == Self::Signed
  }
}
