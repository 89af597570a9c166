//! Conversion of full-range YBR color data to RGB.

/// Converts interleaved u8 YBR samples to RGB in place.
///
pub fn convert_u8(data: &mut [u8], bits_stored: u16) {
  let scale = ((1u64 << bits_stored) - 1) as f64;
  let one_over_scale = 1.0 / scale;

  for pixel in data.chunks_exact_mut(3) {
    let y = f64::from(pixel[0]) * one_over_scale;
    let cb = f64::from(pixel[1]) * one_over_scale;
    let cr = f64::from(pixel[2]) * one_over_scale;

    for (sample, value) in pixel.iter_mut().zip(ybr_to_rgb(y, cb, cr)) {
      *sample = (value * scale).round().clamp(0.0, scale) as u8;
    }
  }
}

/// Converts interleaved u16 YBR samples to RGB in place.
///
pub fn convert_u16(data: &mut [u16], bits_stored: u16) {
  let scale = ((1u64 << bits_stored) - 1) as f64;
  let one_over_scale = 1.0 / scale;

  for pixel in data.chunks_exact_mut(3) {
    let y = f64::from(pixel[0]) * one_over_scale;
    let cb = f64::from(pixel[1]) * one_over_scale;
    let cr = f64::from(pixel[2]) * one_over_scale;

    for (sample, value) in pixel.iter_mut().zip(ybr_to_rgb(y, cb, cr)) {
      *sample = (value * scale).round().clamp(0.0, scale) as u16;
    }
  }
}

fn ybr_to_rgb(y: f64, cb: f64, cr: f64) -> [f64; 3] {
  let r = y + 1.402 * (cr - 0.5);
  let g = y - 0.3441362862 * (cb - 0.5) - 0.7141362862 * (cr - 0.5);
  let b = y + 1.772 * (cb - 0.5);

  [r, g, b]
}
