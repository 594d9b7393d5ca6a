// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Report generation configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::policy::{CapacityPolicy, DEFAULT_OVERFLOW_BATCH_SIZE, SignaturePlacement};

/// Per-deployment report settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Images per overflow page.
    pub overflow_batch_size: usize,
    /// Pages that carry the signing block.
    pub signature_placement: SignaturePlacement,
    /// Paper size of every page.
    pub paper_size: crate::PaperSize,
    /// Print the project/room watermark on every page.
    pub watermark: bool,
    /// Longest edge, in pixels, of ingested photos.
    pub max_image_dimension: u32,
    /// JPEG quality (1-100) used when re-encoding ingested photos.
    pub jpeg_quality: u8,
    /// TrueType/OpenType font embedded for all page text. Builtin
    /// Helvetica (Latin only) when unset.
    pub font_path: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            overflow_batch_size: DEFAULT_OVERFLOW_BATCH_SIZE,
            signature_placement: SignaturePlacement::default(),
            paper_size: crate::PaperSize::A4,
            watermark: true,
            max_image_dimension: 1600,
            jpeg_quality: 85,
            font_path: None,
        }
    }
}

impl ReportConfig {
    /// Load settings from a JSON file. Missing keys take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value once, up front.
    pub fn validate(&self) -> Result<()> {
        self.capacity_policy()?;
        if self.max_image_dimension == 0 {
            return Err(ReportError::Configuration(
                "max image dimension must be at least 1 pixel".into(),
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ReportError::Configuration(format!(
                "JPEG quality must be within 1-100, got {}",
                self.jpeg_quality
            )));
        }
        let (width_mm, height_mm) = self.paper_size.dimensions_mm();
        if width_mm == 0 || height_mm == 0 {
            return Err(ReportError::Configuration(
                "paper size must have non-zero dimensions".into(),
            ));
        }
        Ok(())
    }

    pub fn capacity_policy(&self) -> Result<CapacityPolicy> {
        CapacityPolicy::new(self.overflow_batch_size)
    }

    /// Raw bytes of the configured font, if any.
    pub fn load_font(&self) -> Result<Option<Vec<u8>>> {
        let Some(path) = &self.font_path else {
            return Ok(None);
        };
        let bytes = std::fs::read(path).map_err(|err| {
            ReportError::Configuration(format!("cannot read font {}: {}", path.display(), err))
        })?;
        if bytes.is_empty() {
            return Err(ReportError::Configuration(format!(
                "font file {} is empty",
                path.display()
            )));
        }
        Ok(Some(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = ReportConfig::default();
        config.validate().unwrap();
        assert_eq!(config.capacity_policy().unwrap().overflow_batch_size(), 4);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "overflow_batch_size": 3, "watermark": false }}"#).unwrap();

        let config = ReportConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.overflow_batch_size, 3);
        assert!(!config.watermark);
        assert_eq!(config.jpeg_quality, 85);
        assert_eq!(config.signature_placement, SignaturePlacement::InfoAndMainPages);
    }

    #[test]
    fn zero_batch_size_fails_at_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "overflow_batch_size": 0 }}"#).unwrap();

        let err = ReportConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, ReportError::Configuration(_)));
    }

    #[test]
    fn out_of_range_quality_is_rejected() {
        let config = ReportConfig {
            jpeg_quality: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ReportError::Configuration(_))
        ));
    }

    #[test]
    fn font_is_optional() {
        assert_eq!(ReportConfig::default().load_font().unwrap(), None);
    }

    #[test]
    fn font_bytes_are_read_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"\x00\x01\x00\x00font").unwrap();
        let config = ReportConfig {
            font_path: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        assert_eq!(config.load_font().unwrap().unwrap().len(), 8);
    }

    #[test]
    fn unreadable_font_is_a_configuration_error() {
        let config = ReportConfig {
            font_path: Some("/nonexistent/THSarabunNew.ttf".into()),
            ..Default::default()
        };
        assert!(matches!(
            config.load_font(),
            Err(ReportError::Configuration(_))
        ));
    }

    #[test]
    fn signature_placement_reads_snake_case() {
        let config: ReportConfig =
            serde_json::from_str(r#"{ "signature_placement": "every_page" }"#).unwrap();
        assert_eq!(config.signature_placement, SignaturePlacement::EveryPage);
    }
}
