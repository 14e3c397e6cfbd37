//! Two-pass color correction: white balance, then luminance equalization.
//!
//! Both passes are pure functions over an owned-or-borrowed raster and share
//! one clamped per-channel rescale. The passes read samples at 8-bit depth:
//! 16-bit sources are truncated by a right shift of 8, never rounded.
//!
//! ```text
//! raster → white_balance(scale%) → adjust_colors → RgbaImage
//! ```

pub mod equalize;
pub mod stats;
pub mod white_balance;

pub use equalize::adjust_colors;
pub use stats::{Channel, ChannelMeans};
pub use white_balance::white_balance;

use image::{ImageBuffer, Pixel, Primitive, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::CorrectionError;

/// A 16-bit-per-channel RGBA raster, the decoder's output depth.
pub type Rgba16Image = ImageBuffer<Rgba<u16>, Vec<u16>>;

/// Sample types the correction passes can read at 8-bit depth.
pub trait EightBit: Primitive + 'static {
    /// Truncate this sample to 8 bits.
    fn to_eight_bit(self) -> u8;
}

impl EightBit for u8 {
    fn to_eight_bit(self) -> u8 {
        self
    }
}

impl EightBit for u16 {
    fn to_eight_bit(self) -> u8 {
        (self >> 8) as u8
    }
}

/// Tunables applied uniformly to every image of one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrectionParameters {
    /// Offset of the white-balance target from the brightest channel mean, in percent
    pub white_balance_scale_percent: f64,
}

impl Default for CorrectionParameters {
    fn default() -> Self {
        Self {
            white_balance_scale_percent: -30.0,
        }
    }
}

/// Run the full correction: white balance followed by luminance equalization.
///
/// The order matters: equalization measures the white-balanced distribution.
pub fn correct<S>(
    image: &ImageBuffer<Rgba<S>, Vec<S>>,
    params: &CorrectionParameters,
) -> Result<RgbaImage, CorrectionError>
where
    S: EightBit,
    Rgba<S>: Pixel<Subpixel = S>,
{
    let balanced = white_balance(image, params.white_balance_scale_percent)?;
    adjust_colors::<u8>(&balanced)
}

/// Rescale R, G and B by per-channel factors, truncating and clamping to
/// `[0, 255]`. Alpha is copied through at 8-bit depth.
pub(crate) fn rescale<S>(image: &ImageBuffer<Rgba<S>, Vec<S>>, scales: [f64; 3]) -> RgbaImage
where
    S: EightBit,
    Rgba<S>: Pixel<Subpixel = S>,
{
    let (width, height) = image.dimensions();
    let mut corrected = RgbaImage::new(width, height);

    for (src, dst) in image.pixels().zip(corrected.pixels_mut()) {
        let [r, g, b, a] = src.0;
        *dst = Rgba([
            scale_sample(r.to_eight_bit(), scales[0]),
            scale_sample(g.to_eight_bit(), scales[1]),
            scale_sample(b.to_eight_bit(), scales[2]),
            a.to_eight_bit(),
        ]);
    }

    corrected
}

fn scale_sample(value: u8, scale: f64) -> u8 {
    // `as` truncates toward zero; the clamp keeps it inside u8.
    (f64::from(value) * scale).clamp(0.0, 255.0) as u8
}
