// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Photo ingestion — decode uploaded photos, bound their size, and re-encode
// them as JPEG so every payload handed to the renderer has one format.

use defectsheet_core::ReportConfig;
use defectsheet_core::error::{ReportError, Result};
use image::DynamicImage;
use tracing::{debug, info, instrument};

use super::store::ImagePayload;

/// Normalises raw photo bytes into renderable payloads.
///
/// ```ignore
/// let ingestor = ImageIngestor::new(1600, 85);
/// let payload = ingestor.ingest_file("leak.png")?;
/// store.insert(entry.id, image_id, payload);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ImageIngestor {
    /// Longest allowed edge in pixels.
    max_dimension: u32,
    /// JPEG quality (1-100).
    jpeg_quality: u8,
}

impl ImageIngestor {
    pub fn new(max_dimension: u32, jpeg_quality: u8) -> Self {
        Self {
            max_dimension: max_dimension.max(1),
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(config.max_image_dimension, config.jpeg_quality)
    }

    /// Decode encoded bytes (JPEG, PNG, ...) and normalise them.
    #[instrument(skip(self, data), fields(data_len = data.len()))]
    pub fn ingest(&self, data: &[u8]) -> Result<ImagePayload> {
        let decoded = image::load_from_memory(data).map_err(|err| {
            ReportError::ImageError(format!("failed to decode image: {}", err))
        })?;
        debug!(
            width = decoded.width(),
            height = decoded.height(),
            "Image decoded from bytes"
        );
        self.normalise(decoded)
    }

    /// Read and normalise a photo from disk.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn ingest_file(&self, path: impl AsRef<std::path::Path>) -> Result<ImagePayload> {
        let decoded = image::open(path.as_ref()).map_err(|err| {
            ReportError::ImageError(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!(
            width = decoded.width(),
            height = decoded.height(),
            "Image loaded"
        );
        self.normalise(decoded)
    }

    /// Downscale to fit `max_dimension` (never upscale), then encode as JPEG.
    fn normalise(&self, photo: DynamicImage) -> Result<ImagePayload> {
        let photo = if photo.width() > self.max_dimension || photo.height() > self.max_dimension
        {
            let resized = photo.resize(
                self.max_dimension,
                self.max_dimension,
                image::imageops::FilterType::Lanczos3,
            );
            debug!(
                new_w = resized.width(),
                new_h = resized.height(),
                "Resize complete"
            );
            resized
        } else {
            photo
        };

        let rgb = photo.to_rgb8();
        let (width, height) = rgb.dimensions();
        let mut buffer = Vec::new();
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, self.jpeg_quality);
        rgb.write_with_encoder(encoder).map_err(|err| {
            ReportError::ImageError(format!("JPEG encoding failed: {}", err))
        })?;

        Ok(ImagePayload::new(buffer, width, height))
    }
}

impl Default for ImageIngestor {
    fn default() -> Self {
        Self::from_config(&ReportConfig::default())
    }
}
