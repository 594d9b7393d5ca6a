// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Report input files — JSON description of a report with photo file paths.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use defectsheet_core::types::{
    DamageCategory, Entry, EntryId, ImageId, ReportDocument, ReportHeader, RoomType,
    StructuralArea,
};
use defectsheet_document::{ImageIngestor, ImageStore};
use serde::Deserialize;
use tracing::{debug, info};

/// Top-level shape of a report input file.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportInput {
    pub header: ReportHeader,
    /// Defaults to today when absent.
    #[serde(default)]
    pub report_date: Option<NaiveDate>,
    #[serde(default)]
    pub entries: Vec<EntryInput>,
}

/// One damage point; photos are listed as file paths in display order.
#[derive(Debug, Clone, Deserialize)]
pub struct EntryInput {
    pub category: DamageCategory,
    #[serde(default)]
    pub room: Option<RoomType>,
    #[serde(default)]
    pub other_room: Option<String>,
    #[serde(default)]
    pub structural_area: Option<StructuralArea>,
    #[serde(default)]
    pub other_structural_area: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<PathBuf>,
}

/// Where the bytes for one image reference come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoSource {
    pub entry: EntryId,
    pub image: ImageId,
    pub path: PathBuf,
}

impl ReportInput {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading report file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing report file {}", path.display()))
    }

    /// Build the document. Image ordinals follow list order; relative photo
    /// paths are resolved against `base_dir`.
    pub fn into_document(self, base_dir: &Path) -> (ReportDocument, Vec<PhotoSource>) {
        let mut sources = Vec::new();
        let entries = self
            .entries
            .into_iter()
            .map(|input| {
                let mut entry = Entry::new(input.category);
                entry.room = input.room;
                entry.other_room = input.other_room;
                entry.structural_area = input.structural_area;
                entry.other_structural_area = input.other_structural_area;
                entry.location = input.location;
                entry.description = input.description;
                for path in input.images {
                    let image = entry.push_image();
                    sources.push(PhotoSource {
                        entry: entry.id,
                        image,
                        path: base_dir.join(path),
                    });
                }
                entry
            })
            .collect();

        let document = ReportDocument::new(self.header, entries);
        let document = match self.report_date {
            Some(date) => document.with_report_date(date),
            None => document,
        };
        (document, sources)
    }
}

/// Read and normalise every photo into a store.
pub fn ingest_photos(sources: &[PhotoSource], ingestor: &ImageIngestor) -> Result<ImageStore> {
    let mut store = ImageStore::new();
    for source in sources {
        let payload = ingestor
            .ingest_file(&source.path)
            .with_context(|| format!("loading photo {}", source.path.display()))?;
        debug!(path = %source.path.display(), bytes = payload.data().len(), "Photo ingested");
        store.insert(source.entry, source.image, payload);
    }
    info!(
        photos = store.len(),
        bytes = store.total_bytes(),
        "Photos ingested"
    );
    Ok(store)
}

/// Load a report file and resolve its photo paths relative to it.
pub fn load_report(path: &Path) -> Result<(ReportDocument, Vec<PhotoSource>)> {
    let input = ReportInput::from_file(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(input.into_document(base_dir))
}
