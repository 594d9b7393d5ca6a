// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Report generator — one call from document and photos to finished PDF bytes.

use std::time::Duration;

use defectsheet_core::ReportConfig;
use defectsheet_core::error::Result;
use defectsheet_core::types::ReportDocument;
use printpdf::PdfPage;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::driver::CompositionDriver;
use crate::export::{export_filename, fingerprint};
use crate::pdf::{PdfReportRenderer, parse_font};
use crate::photo::ImageStore;
use crate::planner::{Plan, Planner};

/// A finished report, ready to be written or shared.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedReport {
    pub filename: String,
    #[serde(skip)]
    pub pdf: Vec<u8>,
    /// Lowercase hex SHA-256 of `pdf`.
    pub sha256: String,
    pub total_pages: usize,
}

/// Configured pipeline: plan, render, serialise.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    config: ReportConfig,
    driver: CompositionDriver,
    /// Font file contents, already checked to parse.
    font: Option<Vec<u8>>,
}

impl ReportGenerator {
    /// Validate `config` and build the pipeline it describes.
    ///
    /// Fails when the paper cannot hold the configured layout or the font
    /// file is unreadable, before any photo is touched.
    pub fn new(config: ReportConfig) -> Result<Self> {
        config.validate()?;
        PdfReportRenderer::check_layout(&config)?;
        let font = config.load_font()?;
        if let Some(bytes) = &font {
            parse_font(bytes)?;
        }
        let planner =
            Planner::new(config.capacity_policy()?).with_signatures(config.signature_placement);
        Ok(Self {
            config,
            driver: CompositionDriver::new(planner),
            font,
        })
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn planner(&self) -> &Planner {
        self.driver.planner()
    }

    fn renderer<'s>(
        &self,
        document: &ReportDocument,
        images: &'s ImageStore,
    ) -> Result<PdfReportRenderer<'s>> {
        let missing = missing_payloads(document, images);
        if missing > 0 {
            warn!(missing, "Photos without a payload; their pages will fail");
        }
        let renderer = PdfReportRenderer::from_config(&document.header, images, &self.config);
        match &self.font {
            Some(bytes) => renderer.with_font(bytes),
            None => Ok(renderer),
        }
    }

    /// Page plan for `document` without rendering anything.
    pub fn plan<'a>(&self, document: &'a ReportDocument) -> Result<Plan<'a>> {
        self.driver.planner().plan(document)
    }

    /// Render `document` with photos from `images`.
    #[instrument(skip_all, fields(entries = document.entries.len(), images = images.len()))]
    pub async fn generate(
        &self,
        document: &ReportDocument,
        images: &ImageStore,
        cancel: &CancellationToken,
    ) -> Result<GeneratedReport> {
        let mut renderer = self.renderer(document, images)?;
        let composition = self.driver.compose(document, &mut renderer, cancel).await?;
        Ok(self.package(document, renderer, composition.pages, composition.total_pages))
    }

    /// `generate` bounded by a timeout for the whole run.
    #[instrument(skip_all, fields(limit_secs = limit.as_secs()))]
    pub async fn generate_with_timeout(
        &self,
        document: &ReportDocument,
        images: &ImageStore,
        cancel: &CancellationToken,
        limit: Duration,
    ) -> Result<GeneratedReport> {
        let mut renderer = self.renderer(document, images)?;
        let composition = self
            .driver
            .compose_with_timeout(document, &mut renderer, cancel, limit)
            .await?;
        Ok(self.package(document, renderer, composition.pages, composition.total_pages))
    }

    fn package(
        &self,
        document: &ReportDocument,
        renderer: PdfReportRenderer<'_>,
        pages: Vec<PdfPage>,
        total_pages: usize,
    ) -> GeneratedReport {
        let pdf = renderer.finish(pages);
        let report = GeneratedReport {
            filename: export_filename(&document.header),
            sha256: fingerprint(&pdf),
            pdf,
            total_pages,
        };
        info!(
            filename = %report.filename,
            total_pages,
            bytes = report.pdf.len(),
            sha256 = %report.sha256,
            "Report generated"
        );
        report
    }
}

/// Image references in `document` with no payload in `images`.
fn missing_payloads(document: &ReportDocument, images: &ImageStore) -> usize {
    document
        .entries
        .iter()
        .flat_map(|entry| entry.images.iter().map(move |image| (entry.id, image.id)))
        .filter(|&(entry, image)| !images.contains(entry, image))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photo::{ImageIngestor, ImagePayload};
    use defectsheet_core::error::ReportError;
    use defectsheet_core::policy::SignaturePlacement;
    use defectsheet_core::types::{
        DamageCategory, Entry, PageRef, PaperSize, ReportHeader, ResidenceType,
    };
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

    fn sample(image_counts: &[usize]) -> (ReportDocument, ImageStore) {
        let img = RgbImage::from_pixel(32, 32, Rgb([90u8, 90, 90]));
        let mut png = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        let payload = ImageIngestor::default().ingest(&png).unwrap();

        let mut store = ImageStore::new();
        let entries = image_counts
            .iter()
            .map(|&count| {
                let mut entry = Entry::new(DamageCategory::Water);
                entry.description = Some("Stain on the wall".into());
                for _ in 0..count {
                    let id = entry.push_image();
                    store.insert(entry.id, id, payload.clone());
                }
                entry
            })
            .collect();

        let header = ReportHeader {
            project_name: "Park Tower".into(),
            room_number: "88/12".into(),
            floor: "3".into(),
            resident_name: "Somchai".into(),
            residence_type: ResidenceType::Renter,
            residence_other: None,
            phone_number: None,
            email: None,
        };
        (ReportDocument::new(header, entries), store)
    }

    #[tokio::test]
    async fn generates_named_fingerprinted_pdf() {
        let (doc, store) = sample(&[1, 5]);
        let generator = ReportGenerator::new(ReportConfig::default()).unwrap();
        let report = generator
            .generate(&doc, &store, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.filename, "Park-Tower_3_88-12.pdf");
        assert_eq!(report.total_pages, 5);
        assert!(report.pdf.starts_with(b"%PDF"));
        assert_eq!(report.sha256, fingerprint(&report.pdf));
    }

    #[tokio::test]
    async fn empty_document_is_a_single_info_page() {
        let (doc, store) = sample(&[]);
        let report = ReportGenerator::new(ReportConfig::default())
            .unwrap()
            .generate(&doc, &store, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(report.total_pages, 1);
    }

    #[tokio::test]
    async fn corrupt_photo_yields_no_report() {
        let (doc, mut store) = sample(&[2]);
        let entry = &doc.entries[0];
        store.insert(entry.id, entry.images[1].id, ImagePayload::new(vec![0xFF, 0xD8], 1, 1));

        let err = ReportGenerator::new(ReportConfig::default())
            .unwrap()
            .generate(&doc, &store, &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(
            err.failed_page(),
            Some(PageRef::EntryOverflow {
                entry: entry.id,
                entry_index: 0,
                first_image_number: 2,
            })
        );
        assert!(matches!(err, ReportError::RenderFailure { page_number: 3, .. }));
    }

    #[tokio::test]
    async fn cancelled_before_start_renders_nothing() {
        let (doc, store) = sample(&[1]);
        let token = CancellationToken::new();
        token.cancel();
        let err = ReportGenerator::new(ReportConfig::default())
            .unwrap()
            .generate(&doc, &store, &token)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ReportError::Cancelled {
                rendered: 0,
                total: 2
            }
        ));
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let config = ReportConfig {
            overflow_batch_size: 0,
            ..ReportConfig::default()
        };
        assert!(matches!(
            ReportGenerator::new(config),
            Err(ReportError::Configuration(_))
        ));
    }

    #[test]
    fn paper_too_short_for_the_layout_is_rejected() {
        let config = ReportConfig {
            paper_size: PaperSize::Custom {
                width_mm: 148,
                height_mm: 110,
            },
            ..ReportConfig::default()
        };
        assert!(matches!(
            ReportGenerator::new(config),
            Err(ReportError::Configuration(_))
        ));

        let a5 = ReportConfig {
            paper_size: PaperSize::A5,
            ..ReportConfig::default()
        };
        assert!(ReportGenerator::new(a5).is_ok());
    }

    #[test]
    fn batch_larger_than_the_page_is_rejected() {
        let config = ReportConfig {
            overflow_batch_size: 12,
            ..ReportConfig::default()
        };
        assert!(matches!(
            ReportGenerator::new(config),
            Err(ReportError::Configuration(_))
        ));
    }

    #[test]
    fn unusable_font_file_is_rejected_up_front() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"not a font at all").unwrap();
        let config = ReportConfig {
            font_path: Some(path),
            ..ReportConfig::default()
        };
        assert!(matches!(
            ReportGenerator::new(config),
            Err(ReportError::FontError(_))
        ));
    }

    #[tokio::test]
    async fn configured_font_is_embedded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mono.ttf");
        std::fs::write(&path, include_bytes!("../testdata/DejaVuSansMono.ttf")).unwrap();
        let (mut doc, store) = sample(&[1]);
        doc.header.project_name = "ริทึ่ม".into();

        let config = ReportConfig {
            font_path: Some(path),
            ..ReportConfig::default()
        };
        let report = ReportGenerator::new(config)
            .unwrap()
            .generate(&doc, &store, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(report.total_pages, 2);
        assert!(report.pdf.starts_with(b"%PDF"));
    }

    #[test]
    fn missing_payloads_are_counted() {
        let (doc, store) = sample(&[2, 1]);
        assert_eq!(missing_payloads(&doc, &store), 0);
        let (_, unrelated) = sample(&[3]);
        assert_eq!(missing_payloads(&doc, &unrelated), 3);
    }

    #[test]
    fn plan_follows_configured_policy() {
        let (doc, _) = sample(&[7]);
        let config = ReportConfig {
            overflow_batch_size: 2,
            signature_placement: SignaturePlacement::EveryPage,
            ..ReportConfig::default()
        };
        let generator = ReportGenerator::new(config).unwrap();
        let plan = generator.plan(&doc).unwrap();
        // Info + main + ceil(6 / 2) overflow pages.
        assert_eq!(plan.total_pages(), 5);
        assert!(plan.pages().iter().all(|page| page.signing_block()));
    }
}
