//! Image encoding for uploaded backgrounds
//!
//! Turns raw image bytes into a size-bounded base64 data URL suitable for
//! storing alongside the other settings.

use crate::config::{DEFAULT_IMAGE_MAX_HEIGHT, DEFAULT_IMAGE_MAX_WIDTH, DEFAULT_IMAGE_QUALITY};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

/// Bounds applied when encoding an image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeOptions {
    pub max_width: u32,
    pub max_height: u32,
    /// JPEG quality in the 0..=1 range
    pub quality: f32,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_IMAGE_MAX_WIDTH,
            max_height: DEFAULT_IMAGE_MAX_HEIGHT,
            quality: DEFAULT_IMAGE_QUALITY,
        }
    }
}

#[async_trait]
pub trait ImageEncoder: Send + Sync {
    /// Encode `input` into a base64 data URL within `options` bounds
    async fn encode(&self, input: &[u8], options: EncodeOptions) -> Result<String>;
}

/// Re-encodes images as JPEG, downscaling to fit the bounds
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegDataUrlEncoder;

#[async_trait]
impl ImageEncoder for JpegDataUrlEncoder {
    async fn encode(&self, input: &[u8], options: EncodeOptions) -> Result<String> {
        let input = input.to_vec();

        tokio::task::spawn_blocking(move || encode_jpeg(&input, options))
            .await
            .map_err(|e| AppError::Generic(format!("Encoding task failed: {}", e)))?
    }
}

fn encode_jpeg(input: &[u8], options: EncodeOptions) -> Result<String> {
    let img = image::load_from_memory(input)
        .map_err(|e| AppError::Encoding(format!("Failed to decode image: {}", e)))?;

    // Downscale only, preserving aspect ratio
    let img = if img.width() > options.max_width || img.height() > options.max_height {
        img.resize(options.max_width, options.max_height, FilterType::Triangle)
    } else {
        img
    };

    let quality = (options.quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8;

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality).encode_image(&img.to_rgb8())?;

    tracing::debug!(
        "Encoded image {}x{} at quality {} ({} -> {} bytes)",
        img.width(),
        img.height(),
        quality,
        input.len(),
        jpeg.len()
    );

    Ok(file_to_data_url(&jpeg, "image/jpeg"))
}

/// Embed raw file bytes as a data URL without re-encoding
pub fn file_to_data_url(bytes: &[u8], mime_type: &str) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}
