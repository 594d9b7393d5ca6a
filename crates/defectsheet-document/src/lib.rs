// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// defectsheet-document — Page planning and PDF composition for damage reports.
//
// A report is planned into an ordered list of page descriptors (info page,
// one main page per entry, overflow pages for further photos), then rendered
// page by page through a `PageRenderer`. The printpdf-backed renderer and the
// `ReportGenerator` facade turn a document plus its photos into PDF bytes.

pub mod descriptor;
pub mod driver;
pub mod export;
pub mod generator;
pub mod pdf;
pub mod photo;
pub mod planner;

pub use descriptor::{PageDescriptor, RunningMetadata};
pub use driver::{Composition, CompositionDriver, PageRenderer};
pub use export::{export_filename, fingerprint};
pub use generator::{GeneratedReport, ReportGenerator};
pub use pdf::PdfReportRenderer;
pub use photo::{ImageIngestor, ImagePayload, ImageStore};
pub use planner::{Plan, Planner};
