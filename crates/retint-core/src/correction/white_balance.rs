//! White balance: pull every channel mean toward a target derived from the
//! brightest channel.

use image::{ImageBuffer, Pixel, Rgba, RgbaImage};

use super::{rescale, ChannelMeans, EightBit};
use crate::error::CorrectionError;

/// Rescale each channel so its mean lands on
/// `max_mean + scale_percent / 100 * max_mean`.
///
/// A negative `scale_percent` places the target below the brightest channel.
/// An image without pixels comes back empty with the same dimensions.
pub fn white_balance<S>(
    image: &ImageBuffer<Rgba<S>, Vec<S>>,
    scale_percent: f64,
) -> Result<RgbaImage, CorrectionError>
where
    S: EightBit,
    Rgba<S>: Pixel<Subpixel = S>,
{
    let Some(means) = ChannelMeans::of(image) else {
        let (width, height) = image.dimensions();
        return Ok(RgbaImage::new(width, height));
    };

    let max_avg = means.max();
    let target = max_avg + (scale_percent / 100.0 * max_avg);
    let scales = means.scale_factors(target)?;
    tracing::trace!(?means, target, ?scales, "white balance");

    Ok(rescale(image, scales))
}
