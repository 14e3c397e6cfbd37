//! JPEG encoding of corrected rasters.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};
use std::path::Path;

use crate::error::PipelineError;

/// Encodes corrected images as baseline JPEG.
#[derive(Debug, Clone, Copy)]
pub struct JpegWriter {
    quality: u8,
}

impl JpegWriter {
    pub fn new(quality: u8) -> Self {
        Self { quality }
    }

    /// Encode to an in-memory JPEG. Alpha is dropped; JPEG has no alpha channel.
    pub fn encode(&self, image: RgbaImage, path: &Path) -> Result<Vec<u8>, PipelineError> {
        let rgb = DynamicImage::ImageRgba8(image).to_rgb8();
        let (width, height) = rgb.dimensions();

        let mut buf = Vec::new();
        JpegEncoder::new_with_quality(&mut buf, self.quality)
            .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
            .map_err(|e| PipelineError::Encode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        Ok(buf)
    }
}
