//! Luminance equalization: force all three channel means to their average.

use image::{ImageBuffer, Pixel, Rgba, RgbaImage};

use super::{rescale, ChannelMeans, EightBit};
use crate::error::CorrectionError;

/// Rescale each channel so its mean equals the mean of the three channel means.
///
/// Meant to run on white-balanced output. An image without pixels comes back
/// empty with the same dimensions.
pub fn adjust_colors<S>(
    image: &ImageBuffer<Rgba<S>, Vec<S>>,
) -> Result<RgbaImage, CorrectionError>
where
    S: EightBit,
    Rgba<S>: Pixel<Subpixel = S>,
{
    let Some(means) = ChannelMeans::of(image) else {
        let (width, height) = image.dimensions();
        return Ok(RgbaImage::new(width, height));
    };

    let avg_light = means.average();
    let scales = means.scale_factors(avg_light)?;
    tracing::trace!(?means, avg_light, ?scales, "equalize");

    Ok(rescale(image, scales))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correction::test_support::{image_from_rgb, means, noisy_image};
    use crate::correction::{white_balance, Channel};

    #[test]
    fn test_equal_means_are_a_fixed_point() {
        // Per-pixel channels differ but the three means are all 20.
        let image = image_from_rgb(2, 2, &[[10, 20, 30], [30, 20, 10], [5, 25, 40], [35, 15, 0]]);
        let adjusted = adjust_colors(&image).unwrap();
        assert_eq!(adjusted, image);
    }

    #[test]
    fn test_reference_example_unchanged() {
        let image = image_from_rgb(
            2,
            2,
            &[[0, 0, 0], [70, 70, 70], [140, 140, 140], [35, 35, 35]],
        );
        assert_eq!(adjust_colors(&image).unwrap(), image);
    }

    #[test]
    fn test_output_means_converge() {
        let balanced = white_balance(&noisy_image(48, 48, 21), -30.0).unwrap();
        let adjusted = adjust_colors(&balanced).unwrap();
        let [r, g, b] = means(&adjusted);
        assert!((r - g).abs() < 1.0 && (g - b).abs() < 1.0 && (r - b).abs() < 1.0);
    }

    #[test]
    fn test_reapplying_moves_pixels_by_rounding_only() {
        let once = adjust_colors(&noisy_image(48, 48, 9)).unwrap();
        let twice = adjust_colors(&once).unwrap();
        let [r, g, b] = means(&once);
        let avg = (r + g + b) / 3.0;
        // Second-pass factors sit within truncation error of 1, so the largest
        // possible drift is that error scaled by the brightest sample.
        let max_scale_error = [r, g, b]
            .iter()
            .map(|m| (avg / m - 1.0).abs())
            .fold(0.0, f64::max);
        let bound = (255.0 * max_scale_error).ceil() as i32 + 1;
        for (a, b) in once.pixels().zip(twice.pixels()) {
            for c in 0..3 {
                let drift = (i32::from(a.0[c]) - i32::from(b.0[c])).abs();
                assert!(drift <= bound, "drift {drift} exceeds {bound}");
            }
        }
    }

    #[test]
    fn test_clamps_at_255() {
        // Red is much darker than the others, so its factor is > 1.
        let image = image_from_rgb(2, 1, &[[250, 250, 250], [2, 250, 250]]);
        let adjusted = adjust_colors(&image).unwrap();
        assert_eq!(adjusted.get_pixel(0, 0).0[0], 255);
    }

    #[test]
    fn test_empty_image() {
        let adjusted = adjust_colors(&RgbaImage::new(3, 0)).unwrap();
        assert_eq!(adjusted.dimensions(), (3, 0));
    }

    #[test]
    fn test_zero_mean_channel_is_an_error() {
        let image = image_from_rgb(1, 1, &[[0, 5, 5]]);
        assert_eq!(
            adjust_colors(&image).unwrap_err(),
            CorrectionError::ZeroChannelMean {
                channel: Channel::Red
            }
        );
    }
}
