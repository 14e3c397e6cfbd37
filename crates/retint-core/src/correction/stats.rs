//! Per-channel mean intensities.

use image::{ImageBuffer, Pixel, Rgba};
use serde::Serialize;
use std::fmt;

use super::EightBit;
use crate::error::CorrectionError;

/// A color channel, used to attribute numeric failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Red => write!(f, "red"),
            Channel::Green => write!(f, "green"),
            Channel::Blue => write!(f, "blue"),
        }
    }
}

/// Arithmetic mean of each color channel at 8-bit scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelMeans {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl ChannelMeans {
    /// Measure an image. Returns `None` when it has no pixels.
    pub fn of<S>(image: &ImageBuffer<Rgba<S>, Vec<S>>) -> Option<Self>
    where
        S: EightBit,
        Rgba<S>: Pixel<Subpixel = S>,
    {
        let mut sum_r = 0.0f64;
        let mut sum_g = 0.0f64;
        let mut sum_b = 0.0f64;
        let mut count = 0.0f64;

        for px in image.pixels() {
            let [r, g, b, _] = px.0;
            sum_r += f64::from(r.to_eight_bit());
            sum_g += f64::from(g.to_eight_bit());
            sum_b += f64::from(b.to_eight_bit());
            count += 1.0;
        }

        if count == 0.0 {
            return None;
        }

        Some(Self {
            red: sum_r / count,
            green: sum_g / count,
            blue: sum_b / count,
        })
    }

    /// Largest of the three means.
    pub fn max(&self) -> f64 {
        self.red.max(self.green.max(self.blue))
    }

    /// Average of the three means.
    pub fn average(&self) -> f64 {
        (self.red + self.green + self.blue) / 3.0
    }

    /// Factors that move every channel mean onto `target`, in R, G, B order.
    ///
    /// Fails on the first channel whose mean is exactly zero.
    pub fn scale_factors(&self, target: f64) -> Result<[f64; 3], CorrectionError> {
        let mut scales = [0.0; 3];
        for (slot, (channel, mean)) in scales.iter_mut().zip([
            (Channel::Red, self.red),
            (Channel::Green, self.green),
            (Channel::Blue, self.blue),
        ]) {
            if mean == 0.0 {
                return Err(CorrectionError::ZeroChannelMean { channel });
            }
            *slot = target / mean;
        }
        Ok(scales)
    }
}
